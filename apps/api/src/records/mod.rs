pub mod fixtures;
pub mod handlers;
pub mod store;
