pub mod point;
pub mod store;
