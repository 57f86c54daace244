pub mod models;
pub mod order_repo;
pub mod product_catalog;

pub use order_repo::DieselOrderRepository;
pub use product_catalog::DieselProductCatalog;
