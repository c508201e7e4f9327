pub mod client;
pub mod error;
pub mod filter;
pub mod model;
