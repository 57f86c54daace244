use actix_web::{web, HttpResponse};
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::order::{
    LineItem, OrderItemView, OrderStatus, OrderView, PaymentMode, PlaceOrder, PlacedOrder,
    ProductSummary,
};
use crate::errors::AppError;
use crate::StorefrontService;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct OrderItemRequest {
    pub product: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub user: Uuid,
    pub items: Vec<OrderItemRequest>,
    /// Shipping address, stored as given.
    #[schema(value_type = Object)]
    pub address: Value,
    pub payment_mode: PaymentMode,
    /// Client-side total. Only compared against the server total, never stored.
    #[serde(default)]
    #[schema(value_type = Option<f64>)]
    pub total: Option<BigDecimal>,
    #[serde(default)]
    pub promo_applied: Option<bool>,
    #[serde(default)]
    pub points_used: Option<i64>,
}

impl From<CreateOrderRequest> for PlaceOrder {
    fn from(body: CreateOrderRequest) -> Self {
        PlaceOrder {
            user_id: body.user,
            items: body
                .items
                .into_iter()
                .map(|i| LineItem {
                    product_id: i.product,
                    quantity: i.quantity,
                })
                .collect(),
            address: body.address,
            payment_mode: body.payment_mode,
            client_total: body.total,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub id: Uuid,
    pub name: String,
    /// Decimal price as a string to avoid floating-point issues, e.g. "9.99"
    pub price: String,
    pub image_url: Option<String>,
    pub loyalty_points: i32,
}

impl From<ProductSummary> for ProductResponse {
    fn from(p: ProductSummary) -> Self {
        ProductResponse {
            id: p.id,
            name: p.name,
            price: p.price.to_string(),
            image_url: p.image_url,
            loyalty_points: p.loyalty_point_rate,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemResponse {
    pub product_id: Uuid,
    pub quantity: i32,
    /// `null` when the product no longer exists.
    pub product: Option<ProductResponse>,
}

impl From<OrderItemView> for OrderItemResponse {
    fn from(i: OrderItemView) -> Self {
        OrderItemResponse {
            product_id: i.product_id,
            quantity: i.quantity,
            product: i.product.map(Into::into),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: Uuid,
    pub user: Uuid,
    pub items: Vec<OrderItemResponse>,
    #[schema(value_type = Object)]
    pub address: Value,
    pub payment_mode: PaymentMode,
    pub status: OrderStatus,
    pub total: String,
    pub loyalty_points_earned: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl From<OrderView> for OrderResponse {
    fn from(o: OrderView) -> Self {
        OrderResponse {
            id: o.id,
            user: o.user_id,
            items: o.items.into_iter().map(Into::into).collect(),
            address: o.address,
            payment_mode: o.payment_mode,
            status: o.status,
            total: o.total.to_string(),
            loyalty_points_earned: o.loyalty_points_earned,
            created_at: o.created_at.to_rfc3339(),
            updated_at: o.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderResponse {
    pub order: OrderResponse,
    pub loyalty_points_earned: i64,
    pub new_total_points: i64,
}

impl From<PlacedOrder> for CreateOrderResponse {
    fn from(p: PlacedOrder) -> Self {
        CreateOrderResponse {
            order: p.order.into(),
            loyalty_points_earned: p.loyalty_points_earned,
            new_total_points: p.new_total_points,
        }
    }
}

// ── Pagination ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct ListOrdersParams {
    /// Page number (1-based). Defaults to 1.
    #[serde(default = "default_page")]
    pub page: i64,
    /// Number of items per page. Defaults to 20, maximum 100.
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    20
}

pub const TOTAL_COUNT_HEADER: &str = "X-Total-Count";

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /orders
///
/// Prices the cart on the server and creates the order. The order and the
/// user's loyalty credit are written in a single database transaction, so a
/// failure leaves neither behind.
#[utoipa::path(
    post,
    path = "/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created successfully", body = CreateOrderResponse),
        (status = 400, description = "Empty cart, bad quantity or unknown product"),
        (status = 500, description = "Order could not be created, retry later"),
    ),
    tag = "orders"
)]
pub async fn create_order(
    service: web::Data<StorefrontService>,
    body: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    if body.promo_applied.is_some() || body.points_used.is_some() {
        log::debug!(
            "ignoring promoApplied/pointsUsed on order for user {}",
            body.user
        );
    }

    let placed = web::block(move || service.place_order(body.into()))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(CreateOrderResponse::from(placed)))
}

/// GET /orders/{id}
///
/// Returns the order with product details filled in for each line item.
#[utoipa::path(
    get,
    path = "/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
    ),
    responses(
        (status = 200, description = "Order found", body = OrderResponse),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn get_order(
    service: web::Data<StorefrontService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();

    let order = web::block(move || service.get_order(order_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}

/// GET /orders/user/{id}
#[utoipa::path(
    get,
    path = "/orders/user/{id}",
    params(
        ("id" = Uuid, Path, description = "User UUID"),
    ),
    responses(
        (status = 200, description = "The user's orders, newest first", body = [OrderResponse]),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn get_user_orders(
    service: web::Data<StorefrontService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let user_id = path.into_inner();

    let orders = web::block(move || service.orders_for_user(user_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    let body: Vec<OrderResponse> = orders.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// GET /orders
///
/// Returns a page of orders, newest first. The total number of orders is
/// sent in the `X-Total-Count` header.
#[utoipa::path(
    get,
    path = "/orders",
    params(
        ("page" = Option<i64>, Query, description = "Page number (1-based, default 1)"),
        ("limit" = Option<i64>, Query, description = "Items per page (default 20, max 100)"),
    ),
    responses(
        (status = 200, description = "Paginated list of orders", body = [OrderResponse]),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn list_orders(
    service: web::Data<StorefrontService>,
    query: web::Query<ListOrdersParams>,
) -> Result<HttpResponse, AppError> {
    let params = query.into_inner();

    let result = web::block(move || service.list_orders(params.page, params.limit))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    let body: Vec<OrderResponse> = result.items.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok()
        .insert_header((TOTAL_COUNT_HEADER, result.total.to_string()))
        .json(body))
}

/// PATCH /orders/{id}
///
/// Moves the order to a new status. Only the moves in the status transition
/// table are accepted.
#[utoipa::path(
    patch,
    path = "/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
    ),
    request_body = UpdateOrderStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = OrderResponse),
        (status = 404, description = "Order not found"),
        (status = 409, description = "Transition not allowed from the current status"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn update_order_status(
    service: web::Data<StorefrontService>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateOrderStatusRequest>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    let next = body.into_inner().status;

    let order = web::block(move || service.update_status(order_id, next))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}
