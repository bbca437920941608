//! Account endpoints under `/clientes`.
//!
//! Only the path and payload shape are checked here; no balances are kept.
//! A rejected payload is answered with 422 and `{"error": <reason>}`.

use futures_util::future::{self, BoxFuture, FutureExt};
use hyper::StatusCode;
use serde::Deserialize;
use thiserror::Error;

use crate::http::handler::{Handler, HandlerError, Reply};
use crate::http::request::Request;

const MAX_DESCRIPTION_CHARS: usize = 10;

/// Parsed `/clientes/{id}/{action}` path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountPath {
    Transactions(u32),
    Statement(u32),
}

impl AccountPath {
    /// Parse a request path. The query string is ignored.
    pub fn parse(path: &str) -> Option<Self> {
        let path = path.split('?').next().unwrap_or(path);
        let mut segments = path.strip_prefix("/clientes/")?.split('/');
        let id = segments.next()?;
        if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let id = id.parse().ok()?;
        let action = segments.next()?;
        if segments.next().is_some() {
            return None;
        }
        match action {
            "transacoes" => Some(Self::Transactions(id)),
            "extrato" => Some(Self::Statement(id)),
            _ => None,
        }
    }
}

/// Body of a transaction request.
#[derive(Debug, Clone, Deserialize)]
pub struct TransactionPayload {
    pub valor: i64,
    pub tipo: String,
    pub descricao: String,
}

/// Why a transaction payload was refused.
#[derive(Debug, Error)]
pub enum TransactionRejected {
    #[error("invalid payload: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("amount must be greater than 0")]
    Amount,
    #[error("type must be 'c' for credit or 'd' for debit")]
    Kind,
    #[error("description must have between 1 and 10 chars")]
    Description,
}

impl TransactionPayload {
    /// Decode and validate a request body.
    pub fn from_body(body: &[u8]) -> Result<Self, TransactionRejected> {
        let payload: Self = serde_json::from_slice(body)?;
        payload.validate()?;
        Ok(payload)
    }

    pub fn validate(&self) -> Result<(), TransactionRejected> {
        if self.valor <= 0 {
            return Err(TransactionRejected::Amount);
        }
        if self.tipo != "c" && self.tipo != "d" {
            return Err(TransactionRejected::Kind);
        }
        let chars = self.descricao.chars().count();
        if chars == 0 || chars > MAX_DESCRIPTION_CHARS {
            return Err(TransactionRejected::Description);
        }
        Ok(())
    }
}

/// Handler for every path under `/clientes`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Accounts;

impl Accounts {
    fn reply(&self, request: &Request) -> Reply {
        match AccountPath::parse(&request.path) {
            Some(AccountPath::Transactions(id)) => match TransactionPayload::from_body(&request.body) {
                Ok(payload) => {
                    tracing::debug!(id, valor = payload.valor, tipo = %payload.tipo, "Transaction accepted");
                    respond(format!("transacoes id{}", id))
                }
                Err(e) => {
                    tracing::debug!(id, error = %e, "Transaction rejected");
                    Reply::error(StatusCode::UNPROCESSABLE_ENTITY, &e.to_string())
                }
            },
            Some(AccountPath::Statement(id)) => respond(format!("extract id{}", id)),
            None => Reply::error(StatusCode::NOT_FOUND, "not found"),
        }
    }
}

fn respond(message: String) -> Reply {
    Reply::json(StatusCode::OK, &serde_json::json!({ "response": message }))
}

impl Handler for Accounts {
    fn call<'a>(&'a self, request: &'a Request) -> BoxFuture<'a, Result<Reply, HandlerError>> {
        future::ready(Ok(self.reply(request))).boxed()
    }
}
