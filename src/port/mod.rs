//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! Ports are the seams between the strategy core and everything it does not
//! own: the lending venue, the want-token ledger, the vault and the clock.
//!
//! ```text
//!                ┌──────────────────────────┐
//!                │   Strategy core          │
//!                │   (application layer)    │
//!                └──────────────────────────┘
//!                  │        │        │     │
//!                  ▼        ▼        ▼     ▼
//!             ┌───────┐ ┌───────┐ ┌─────┐ ┌─────┐
//!             │ Venue │ │ Token │ │Vault│ │Clock│
//!             └───────┘ └───────┘ └─────┘ └─────┘
//! ```

pub mod outbound;
