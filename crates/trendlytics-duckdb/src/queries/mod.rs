pub mod trends;
pub mod visitors;
