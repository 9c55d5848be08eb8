pub mod context;
pub mod progress;
pub mod store;
