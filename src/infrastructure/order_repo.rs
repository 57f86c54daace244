use std::collections::HashMap;

use chrono::Utc;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::order::{
    ListResult, NewOrder, OrderItemView, OrderStatus, OrderView, Placement,
};
use crate::domain::ports::OrderRepository;
use crate::schema::{order_lines, orders, products, users};

use super::models::{NewOrderLineRow, NewOrderRow, OrderLineRow, OrderRow, ProductRow};

// ── Error conversions (infrastructure concern only) ──────────────────────────

impl From<diesel::result::Error> for DomainError {
    fn from(e: diesel::result::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}

impl From<r2d2::Error> for DomainError {
    fn from(e: r2d2::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}

// ── Row → view mapping ───────────────────────────────────────────────────────

/// Line items of every order in `order_ids`, with their products joined in.
/// A line whose product row is gone keeps `product: None`.
fn load_items(
    conn: &mut PgConnection,
    order_ids: &[Uuid],
) -> Result<HashMap<Uuid, Vec<OrderItemView>>, DomainError> {
    let rows: Vec<(OrderLineRow, Option<ProductRow>)> = order_lines::table
        .left_join(products::table.on(products::id.eq(order_lines::product_id)))
        .filter(order_lines::order_id.eq_any(order_ids))
        .order((order_lines::order_id, order_lines::position))
        .select((OrderLineRow::as_select(), Option::<ProductRow>::as_select()))
        .load(conn)?;

    let mut by_order: HashMap<Uuid, Vec<OrderItemView>> = HashMap::new();
    for (line, product) in rows {
        by_order.entry(line.order_id).or_default().push(OrderItemView {
            product_id: line.product_id,
            quantity: line.quantity,
            product: product.map(Into::into),
        });
    }
    Ok(by_order)
}

fn into_views(conn: &mut PgConnection, rows: Vec<OrderRow>) -> Result<Vec<OrderView>, DomainError> {
    let ids: Vec<Uuid> = rows.iter().map(|o| o.id).collect();
    let mut items = load_items(conn, &ids)?;

    rows.into_iter()
        .map(|o| -> Result<OrderView, DomainError> {
            Ok(OrderView {
                items: items.remove(&o.id).unwrap_or_default(),
                id: o.id,
                user_id: o.user_id,
                address: o.address,
                payment_mode: o.payment_mode.parse()?,
                status: o.status.parse()?,
                total: o.total,
                loyalty_points_earned: o.loyalty_points_earned,
                created_at: o.created_at,
                updated_at: o.updated_at,
            })
        })
        .collect()
}

fn find_on(conn: &mut PgConnection, id: Uuid) -> Result<Option<OrderView>, DomainError> {
    let order = orders::table
        .find(id)
        .select(OrderRow::as_select())
        .first(conn)
        .optional()?;

    let Some(order) = order else {
        return Ok(None);
    };
    Ok(into_views(conn, vec![order])?.pop())
}

/// Rows to skip for a 1-based `page`. `None` when the offset does not fit in
/// a `BIGINT`; such a page lies past the end of any real table.
fn page_offset(page: i64, limit: i64) -> Option<i64> {
    page.max(1).checked_sub(1)?.checked_mul(limit)
}

// ── Repository ────────────────────────────────────────────────────────────────

pub struct DieselOrderRepository {
    pool: DbPool,
}

impl DieselOrderRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl OrderRepository for DieselOrderRepository {
    fn place(&self, order: NewOrder) -> Result<Placement, DomainError> {
        let mut conn = self
            .pool
            .get()
            .map_err(|e| DomainError::TransactionFailure(e.to_string()))?;

        conn.transaction::<_, DomainError, _>(move |conn| {
            // 1. Insert the order
            let order_id = Uuid::new_v4();
            diesel::insert_into(orders::table)
                .values(&NewOrderRow {
                    id: order_id,
                    user_id: order.user_id,
                    address: order.address,
                    payment_mode: order.payment_mode.as_str().to_string(),
                    status: OrderStatus::Pending.as_str().to_string(),
                    total: order.total,
                    loyalty_points_earned: order.loyalty_points_earned,
                })
                .execute(conn)?;

            // 2. Insert its line items, keeping cart order
            let new_lines: Vec<NewOrderLineRow> = (0..)
                .zip(&order.items)
                .map(|(position, item)| NewOrderLineRow {
                    id: Uuid::new_v4(),
                    order_id,
                    position,
                    product_id: item.product_id,
                    quantity: item.quantity,
                })
                .collect();
            diesel::insert_into(order_lines::table)
                .values(&new_lines)
                .execute(conn)?;

            // 3. Credit the points. No row updated means no such user, which
            //    must undo steps 1 and 2.
            let new_total_points = diesel::update(users::table.find(order.user_id))
                .set(users::loyalty_points.eq(users::loyalty_points + order.loyalty_points_earned))
                .returning(users::loyalty_points)
                .get_result::<i64>(conn)
                .optional()?
                .ok_or(DomainError::UnknownUser(order.user_id))?;

            Ok(Placement {
                order_id,
                new_total_points,
            })
        })
        .map_err(|e| match e {
            DomainError::TransactionFailure(_) => e,
            other => DomainError::TransactionFailure(other.to_string()),
        })
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<OrderView>, DomainError> {
        let mut conn = self.pool.get()?;
        find_on(&mut conn, id)
    }

    fn list_by_user(&self, user_id: Uuid) -> Result<Vec<OrderView>, DomainError> {
        let mut conn = self.pool.get()?;

        let rows = orders::table
            .filter(orders::user_id.eq(user_id))
            .select(OrderRow::as_select())
            .order(orders::created_at.desc())
            .load(&mut conn)?;

        into_views(&mut conn, rows)
    }

    fn list(&self, page: i64, limit: i64) -> Result<ListResult, DomainError> {
        let mut conn = self.pool.get()?;

        let offset = page_offset(page, limit);
        conn.transaction::<_, DomainError, _>(|conn| {
            let total: i64 = orders::table.count().get_result(conn)?;

            let Some(offset) = offset else {
                return Ok(ListResult {
                    items: Vec::new(),
                    total,
                });
            };
            let rows = orders::table
                .select(OrderRow::as_select())
                .order(orders::created_at.desc())
                .limit(limit)
                .offset(offset)
                .load(conn)?;

            Ok(ListResult {
                items: into_views(conn, rows)?,
                total,
            })
        })
    }

    fn update_status(
        &self,
        id: Uuid,
        next: OrderStatus,
    ) -> Result<Option<OrderView>, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let current: Option<String> = orders::table
                .find(id)
                .select(orders::status)
                .for_update()
                .first(conn)
                .optional()?;

            let Some(current) = current else {
                return Ok(None);
            };
            let next = current.parse::<OrderStatus>()?.transition_to(next)?;

            diesel::update(orders::table.find(id))
                .set((
                    orders::status.eq(next.as_str()),
                    orders::updated_at.eq(Utc::now()),
                ))
                .execute(conn)?;

            find_on(conn, id)
        })
    }
}
