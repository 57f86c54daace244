pub mod application;
pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod schema;

use std::fmt::Display;

use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use application::order_service::OrderService;
use domain::pricing::UnresolvedProductPolicy;
use errors::AppError;
use infrastructure::{DieselOrderRepository, DieselProductCatalog};

pub use config::AppConfig;
pub use db::{create_pool, DbPool};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// The order service wired to Postgres, as shared by the HTTP handlers.
pub type StorefrontService = OrderService<DieselOrderRepository, DieselProductCatalog>;

pub type MigrationError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) -> Result<(), MigrationError> {
    let mut conn = pool.get()?;
    conn.run_pending_migrations(MIGRATIONS)?;
    Ok(())
}

pub fn storefront_service(pool: DbPool, policy: UnresolvedProductPolicy) -> StorefrontService {
    OrderService::new(
        DieselOrderRepository::new(pool.clone()),
        DieselProductCatalog::new(pool),
        policy,
    )
}

fn bad_request(e: impl Display) -> actix_web::Error {
    AppError::BadRequest(e.to_string()).into()
}

/// Register the `/orders` routes. Malformed bodies, query strings and path
/// segments are answered with the same JSON error body as handler errors.
pub fn configure(cfg: &mut web::ServiceConfig) {
    use handlers::orders;

    cfg.app_data(web::JsonConfig::default().error_handler(|e, _| bad_request(e)))
        .app_data(web::QueryConfig::default().error_handler(|e, _| bad_request(e)))
        .app_data(web::PathConfig::default().error_handler(|e, _| bad_request(e)));

    cfg.service(
        web::scope("/orders")
            .route("", web::post().to(orders::create_order))
            .route("", web::get().to(orders::list_orders))
            .route("/user/{id}", web::get().to(orders::get_user_orders))
            .route("/{id}", web::get().to(orders::get_order))
            .route("/{id}", web::patch().to(orders::update_order_status)),
    );
}

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    service: web::Data<StorefrontService>,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    Ok(HttpServer::new(move || {
        App::new()
            .app_data(service.clone())
            .wrap(Logger::default())
            .configure(configure)
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", handlers::ApiDoc::openapi()),
            )
    })
    .bind((host.to_string(), port))?
    .run())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::test;
    use diesel::pg::PgConnection;
    use diesel::r2d2::{ConnectionManager, Pool};
    use serde_json::{json, Value};
    use uuid::Uuid;

    // Extraction fails before any handler touches the database, so a pool
    // that never connects is enough.
    fn offline_service() -> web::Data<StorefrontService> {
        let pool = Pool::builder()
            .build_unchecked(ConnectionManager::<PgConnection>::new("postgres://offline/none"));
        web::Data::new(storefront_service(pool, UnresolvedProductPolicy::Skip))
    }

    async fn error_body(req: test::TestRequest) -> (StatusCode, Value) {
        let app = test::init_service(
            App::new()
                .app_data(offline_service())
                .configure(configure),
        )
        .await;
        let resp = test::call_service(&app, req.to_request()).await;
        let status = resp.status();
        let body: Value = test::read_body_json(resp).await;
        (status, body)
    }

    #[actix_web::test]
    async fn unknown_payment_mode_gets_json_error() {
        let req = test::TestRequest::post().uri("/orders").set_json(json!({
            "user": Uuid::new_v4(),
            "items": [{"product": Uuid::new_v4(), "quantity": 1}],
            "address": {"city": "Pune"},
            "paymentMode": "BARTER"
        }));

        let (status, body) = error_body(req).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let message = body["error"].as_str().expect("error message");
        assert!(message.contains("BARTER"), "{message}");
    }

    #[actix_web::test]
    async fn fractional_quantity_gets_json_error() {
        let req = test::TestRequest::post().uri("/orders").set_json(json!({
            "user": Uuid::new_v4(),
            "items": [{"product": Uuid::new_v4(), "quantity": 1.5}],
            "address": {},
            "paymentMode": "COD"
        }));

        let (status, body) = error_body(req).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[actix_web::test]
    async fn malformed_page_gets_json_error() {
        let req = test::TestRequest::get().uri("/orders?page=first");

        let (status, body) = error_body(req).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[actix_web::test]
    async fn malformed_order_id_gets_json_error() {
        let req = test::TestRequest::get().uri("/orders/not-a-uuid");

        let (status, body) = error_body(req).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }
}
