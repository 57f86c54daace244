pub mod orders;

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        orders::create_order,
        orders::get_order,
        orders::get_user_orders,
        orders::list_orders,
        orders::update_order_status,
    ),
    tags((name = "orders", description = "Checkout and order history"))
)]
pub struct ApiDoc;
