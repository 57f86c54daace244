use thiserror::Error;
use uuid::Uuid;

use super::order::OrderStatus;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Order not found")]
    NotFound,
    #[error("Invalid order input: {0}")]
    InvalidOrderInput(String),
    #[error("Order references unknown products: {0:?}")]
    ProductResolutionGap(Vec<Uuid>),
    #[error("Cannot move order from '{from}' to '{to}'")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },
    #[error("User not found: {0}")]
    UnknownUser(Uuid),
    #[error("Transaction failed: {0}")]
    TransactionFailure(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A stored or configured value that does not name any variant of `kind`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl UnknownVariant {
    pub fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

impl From<UnknownVariant> for DomainError {
    fn from(e: UnknownVariant) -> Self {
        DomainError::Internal(e.to_string())
    }
}
