//! In-memory index-based lending pool.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use tracing::debug;

use super::token::InMemoryToken;
use crate::domain::money::{ceil_units, floor_units};
use crate::domain::{AccountId, Amount, Rate};
use crate::error::{Error, Result};
use crate::port::outbound::{LendingVenue, Settlement, WithdrawRequest};

/// Misbehaviour queued for the next state-changing call.
#[derive(Debug, Clone, PartialEq)]
pub enum Fault {
    /// The call errors out before reaching the pool.
    Error,
    /// The pool refuses the request; nothing moves.
    Reject,
    /// Only this fraction of the request settles.
    Partial(Decimal),
    /// The request settles in full but the acknowledgement arrives late.
    SlowAck(Duration),
}

#[derive(Debug)]
struct PoolState {
    index: Rate,
    scaled: HashMap<AccountId, Amount>,
    faults: VecDeque<Fault>,
}

/// Lending pool whose receipt balances are scaled by a growing liquidity index.
///
/// Receipt tokens are the scaled balances. Interest accrues by raising the
/// index with [`accrue`](Self::accrue), which also mints the matching want
/// tokens into the pool so every receipt stays redeemable.
#[derive(Debug)]
pub struct InMemoryLendingPool {
    address: AccountId,
    token: Arc<InMemoryToken>,
    state: Mutex<PoolState>,
}

impl InMemoryLendingPool {
    /// Create a pool at index 1 holding want tokens on `token`.
    #[must_use]
    pub fn new(address: AccountId, token: Arc<InMemoryToken>) -> Self {
        Self {
            address,
            token,
            state: Mutex::new(PoolState {
                index: Decimal::ONE,
                scaled: HashMap::new(),
                faults: VecDeque::new(),
            }),
        }
    }

    /// Start from a specific liquidity index.
    #[must_use]
    pub fn with_index(self, index: Rate) -> Self {
        self.state.lock().index = index;
        self
    }

    /// Current liquidity index.
    #[must_use]
    pub fn index(&self) -> Rate {
        self.state.lock().index
    }

    /// Grow the index by `rate` (0.01 = 1%) and fund the interest.
    pub fn accrue(&self, rate: Decimal) {
        let mut state = self.state.lock();
        let previous = state.index;
        state.index = previous * (Decimal::ONE + rate);
        let total_scaled: Amount = state.scaled.values().copied().sum();
        let interest = ceil_units(total_scaled * (state.index - previous));
        if interest > Decimal::ZERO {
            self.token.mint(&self.address, interest);
        }
        debug!(from = %previous, to = %state.index, interest = %interest, "Index accrued");
    }

    /// Force the index, e.g. below its current value to simulate bad debt.
    pub fn set_index(&self, index: Rate) {
        self.state.lock().index = index;
    }

    /// Queue a fault for the next deposit, withdrawal or transfer.
    pub fn inject(&self, fault: Fault) {
        self.state.lock().faults.push_back(fault);
    }

    /// Receipt tokens held by `holder`, read synchronously.
    #[must_use]
    pub fn scaled_balance(&self, holder: &AccountId) -> Amount {
        self.state
            .lock()
            .scaled
            .get(holder)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// Redemption value of `holder`'s receipt tokens.
    #[must_use]
    pub fn value_of(&self, holder: &AccountId) -> Amount {
        let state = self.state.lock();
        let scaled = state.scaled.get(holder).copied().unwrap_or(Decimal::ZERO);
        floor_units(scaled * state.index)
    }

    fn take_fault(&self) -> Option<Fault> {
        self.state.lock().faults.pop_front()
    }

    fn settle_deposit(
        &self,
        holder: &AccountId,
        amount: Amount,
        fill: Amount,
    ) -> Result<Settlement> {
        let mut state = self.state.lock();
        self.token.move_tokens(holder, &self.address, fill)?;
        let minted = floor_units(fill / state.index);
        *state.scaled.entry(holder.clone()).or_insert(Decimal::ZERO) += minted;

        if fill < amount {
            Ok(Settlement::Partial {
                underlying: fill,
                receipt: minted,
                shortfall: amount - fill,
            })
        } else {
            Ok(Settlement::Complete {
                underlying: fill,
                receipt: minted,
            })
        }
    }

    fn settle_withdraw(
        &self,
        holder: &AccountId,
        request: WithdrawRequest,
        fraction: Option<Decimal>,
    ) -> Result<Settlement> {
        let mut state = self.state.lock();
        let index = state.index;
        let balance = state.scaled.get(holder).copied().unwrap_or(Decimal::ZERO);

        let (requested, burn) = match request {
            WithdrawRequest::Underlying(amount) => {
                if amount <= Decimal::ZERO {
                    return Ok(Settlement::Rejected {
                        reason: "withdraw amount must be positive".to_string(),
                    });
                }
                let value = floor_units(balance * index);
                if amount > value {
                    return Err(Error::Venue(format!(
                        "withdraw {amount} exceeds {holder}'s balance {value}"
                    )));
                }
                (amount, ceil_units(amount / index).min(balance))
            }
            WithdrawRequest::Receipt(receipt) => {
                if receipt <= Decimal::ZERO {
                    return Ok(Settlement::Rejected {
                        reason: "receipt amount must be positive".to_string(),
                    });
                }
                if receipt > balance {
                    return Err(Error::Venue(format!(
                        "burn {receipt} exceeds {holder}'s receipt balance {balance}"
                    )));
                }
                (floor_units(receipt * index), receipt)
            }
        };

        let liquidity = self.token.balance(&self.address);
        let mut pay = match fraction {
            Some(fraction) => floor_units(requested * fraction),
            None => requested,
        };
        pay = pay.min(liquidity);
        let burn = if pay < requested {
            ceil_units(pay / index).min(burn)
        } else {
            burn
        };

        self.token.move_tokens(&self.address, holder, pay)?;
        state.scaled.insert(holder.clone(), balance - burn);

        if pay < requested {
            Ok(Settlement::Partial {
                underlying: pay,
                receipt: burn,
                shortfall: requested - pay,
            })
        } else {
            Ok(Settlement::Complete {
                underlying: pay,
                receipt: burn,
            })
        }
    }
}

#[async_trait]
impl LendingVenue for InMemoryLendingPool {
    fn address(&self) -> &AccountId {
        &self.address
    }

    async fn deposit(&self, holder: &AccountId, amount: Amount) -> Result<Settlement> {
        let fault = self.take_fault();
        match fault {
            Some(Fault::Error) => return Err(Error::Venue("deposit call failed".to_string())),
            Some(Fault::Reject) => {
                return Ok(Settlement::Rejected {
                    reason: "deposit rejected".to_string(),
                })
            }
            _ => {}
        }
        if amount <= Decimal::ZERO {
            return Ok(Settlement::Rejected {
                reason: "deposit amount must be positive".to_string(),
            });
        }

        let fill = match fault {
            Some(Fault::Partial(fraction)) => floor_units(amount * fraction),
            _ => amount,
        };
        let settlement = self.settle_deposit(holder, amount, fill)?;

        if let Some(Fault::SlowAck(delay)) = fault {
            tokio::time::sleep(delay).await;
        }
        Ok(settlement)
    }

    async fn withdraw(&self, holder: &AccountId, request: WithdrawRequest) -> Result<Settlement> {
        let fault = self.take_fault();
        let fraction = match fault {
            Some(Fault::Error) => return Err(Error::Venue("withdraw call failed".to_string())),
            Some(Fault::Reject) => {
                return Ok(Settlement::Rejected {
                    reason: "withdraw rejected".to_string(),
                })
            }
            Some(Fault::Partial(fraction)) => Some(fraction),
            _ => None,
        };
        let settlement = self.settle_withdraw(holder, request, fraction)?;

        if let Some(Fault::SlowAck(delay)) = fault {
            tokio::time::sleep(delay).await;
        }
        Ok(settlement)
    }

    async fn transfer(&self, from: &AccountId, to: &AccountId, receipt: Amount) -> Result<()> {
        if let Some(Fault::Error | Fault::Reject) = self.take_fault() {
            return Err(Error::Venue("receipt transfer reverted".to_string()));
        }
        let mut state = self.state.lock();
        let balance = state.scaled.get(from).copied().unwrap_or(Decimal::ZERO);
        if receipt < Decimal::ZERO || receipt > balance {
            return Err(Error::Venue(format!(
                "cannot move {receipt} receipt tokens from {from} holding {balance}"
            )));
        }
        if from == to || receipt.is_zero() {
            return Ok(());
        }
        state.scaled.insert(from.clone(), balance - receipt);
        *state.scaled.entry(to.clone()).or_insert(Decimal::ZERO) += receipt;
        Ok(())
    }

    async fn balance_of(&self, holder: &AccountId) -> Result<Amount> {
        Ok(self.scaled_balance(holder))
    }

    async fn exchange_rate(&self) -> Result<Rate> {
        Ok(self.index())
    }

    fn venue_name(&self) -> &'static str {
        "in-memory-pool"
    }
}
