//! Sample business handlers served by the ingress binary.
//!
//! ```text
//! /hello                      → hello.rs
//! /clientes/{id}/transacoes   → accounts.rs (payload validation)
//! /clientes/{id}/extrato      → accounts.rs
//! ```

pub mod accounts;
pub mod hello;

pub use accounts::{AccountPath, Accounts, TransactionPayload, TransactionRejected};
pub use hello::Hello;

use crate::routing::{Router, RouterError};

/// Router with every sample handler registered.
pub fn ingress_router() -> Result<Router, RouterError> {
    Router::new().route("/hello", Hello)?.route("/clientes", Accounts)
}
