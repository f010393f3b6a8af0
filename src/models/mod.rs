pub mod loan;
pub mod patron;
pub mod title;
