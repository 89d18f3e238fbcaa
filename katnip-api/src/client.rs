pub mod api;
pub mod memory;
pub mod model;
pub mod traced;
pub mod types;
