pub mod health;
pub mod products;
pub mod query;
pub mod visitors;
