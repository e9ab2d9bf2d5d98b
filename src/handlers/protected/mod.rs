pub mod dashboard;
pub mod orders;
pub mod products;
