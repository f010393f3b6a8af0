//! Domain layer: error taxonomy and store contracts

pub mod errors;
pub mod stores;

pub use errors::LendingError;
pub use stores::{
    CatalogCounts, CatalogStore, CreatePatronInput, CreateTitleInput, LoanFilter, LoanRecord,
    LoanStore, LoanWithDetails, NewLoan, PatronRecord, PatronStore, TitleRecord,
};
