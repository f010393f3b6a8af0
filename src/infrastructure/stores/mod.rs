//! SeaORM store implementations

pub mod catalog_store;
pub mod loan_store;
pub mod patron_store;

pub use catalog_store::SeaOrmCatalogStore;
pub use loan_store::SeaOrmLoanStore;
pub use patron_store::SeaOrmPatronStore;
