//! Infrastructure layer: SeaORM store implementations and app state

pub mod state;
pub mod stores;

pub use state::AppState;
pub use stores::{SeaOrmCatalogStore, SeaOrmLoanStore, SeaOrmPatronStore};
