use std::io;

use actix_web::web;
use dotenvy::dotenv;
use storefront_orders::{
    build_server, create_pool, run_migrations, storefront_service, AppConfig,
};

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = AppConfig::from_env().map_err(io::Error::other)?;

    let pool = create_pool(&config.database_url, config.pool_size).map_err(io::Error::other)?;
    run_migrations(&pool).map_err(io::Error::other)?;

    let service = web::Data::new(storefront_service(pool, config.unresolved_products));

    log::info!(
        "Starting server at http://{}:{} (unresolved products: {:?})",
        config.host,
        config.port,
        config.unresolved_products
    );

    build_server(service, &config.host, config.port)?.await
}
