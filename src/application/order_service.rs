use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::{
    ListResult, NewOrder, OrderStatus, OrderView, PlaceOrder, PlacedOrder,
};
use crate::domain::ports::{OrderRepository, ProductCatalog};
use crate::domain::pricing::{self, UnresolvedProductPolicy};

pub struct OrderService<R, C> {
    repo: R,
    catalog: C,
    unresolved_products: UnresolvedProductPolicy,
}

impl<R: OrderRepository, C: ProductCatalog> OrderService<R, C> {
    pub fn new(repo: R, catalog: C, unresolved_products: UnresolvedProductPolicy) -> Self {
        Self {
            repo,
            catalog,
            unresolved_products,
        }
    }

    /// Price the cart against the catalog, then write the order and the
    /// loyalty credit together. Invalid carts are refused before anything is
    /// read or written.
    pub fn place_order(&self, request: PlaceOrder) -> Result<PlacedOrder, DomainError> {
        pricing::validate(&request.items, &request.address)?;

        let product_ids = pricing::distinct_product_ids(&request.items);
        let catalog = self.catalog.pricing_for(&product_ids)?;
        let totals = pricing::price_items(&request.items, &catalog, self.unresolved_products)?;

        if !totals.unresolved.is_empty() {
            log::warn!(
                "order for user {} references unknown products {:?}; they are left out of the total",
                request.user_id,
                totals.unresolved
            );
        }
        if let Some(claimed) = &request.client_total {
            if *claimed != totals.total {
                log::warn!(
                    "client total {} for user {} differs from computed total {}",
                    claimed,
                    request.user_id,
                    totals.total
                );
            }
        }

        let user_id = request.user_id;
        let placement = self
            .repo
            .place(NewOrder {
                user_id,
                items: request.items,
                address: request.address,
                payment_mode: request.payment_mode,
                total: totals.total.clone(),
                loyalty_points_earned: totals.loyalty_points,
            })
            .inspect_err(|e| log::error!("order for user {} was not created: {}", user_id, e))?;

        log::info!(
            "order {} placed for user {}: total={} points={} balance={}",
            placement.order_id,
            user_id,
            totals.total,
            totals.loyalty_points,
            placement.new_total_points
        );

        let order = self.repo.find_by_id(placement.order_id)?.ok_or_else(|| {
            DomainError::Internal(format!(
                "order {} not readable after commit",
                placement.order_id
            ))
        })?;

        Ok(PlacedOrder {
            order,
            loyalty_points_earned: totals.loyalty_points,
            new_total_points: placement.new_total_points,
        })
    }

    pub fn get_order(&self, id: Uuid) -> Result<OrderView, DomainError> {
        self.repo.find_by_id(id)?.ok_or(DomainError::NotFound)
    }

    pub fn orders_for_user(&self, user_id: Uuid) -> Result<Vec<OrderView>, DomainError> {
        self.repo.list_by_user(user_id)
    }

    pub fn list_orders(&self, page: i64, limit: i64) -> Result<ListResult, DomainError> {
        self.repo.list(page.max(1), limit.clamp(1, 100))
    }

    pub fn update_status(&self, id: Uuid, next: OrderStatus) -> Result<OrderView, DomainError> {
        let order = self.repo.update_status(id, next)?.ok_or(DomainError::NotFound)?;
        log::info!("order {} moved to '{}'", id, next);
        Ok(order)
    }
}
