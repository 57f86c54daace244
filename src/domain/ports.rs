use uuid::Uuid;

use super::errors::DomainError;
use super::order::{ListResult, NewOrder, OrderStatus, OrderView, Placement, ProductPricing};

/// Read-only view of the product store.
pub trait ProductCatalog: Send + Sync + 'static {
    /// Price and loyalty rate for every id in `ids` that exists. Missing ids
    /// are simply absent from the result.
    fn pricing_for(&self, ids: &[Uuid]) -> Result<Vec<ProductPricing>, DomainError>;
}

pub trait OrderRepository: Send + Sync + 'static {
    /// Persist `order` and credit its loyalty points to the owning user as a
    /// single unit of work. On error nothing is written.
    fn place(&self, order: NewOrder) -> Result<Placement, DomainError>;
    fn find_by_id(&self, id: Uuid) -> Result<Option<OrderView>, DomainError>;
    fn list_by_user(&self, user_id: Uuid) -> Result<Vec<OrderView>, DomainError>;
    fn list(&self, page: i64, limit: i64) -> Result<ListResult, DomainError>;
    /// Returns `Ok(None)` when no order has this id.
    fn update_status(&self, id: Uuid, next: OrderStatus)
        -> Result<Option<OrderView>, DomainError>;
}
