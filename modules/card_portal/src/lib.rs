// === PUBLIC CONTRACT ===
pub mod contract;

pub use contract::{client, error, filter, model};

// === PORTAL ASSEMBLY ===
// Wires the session slot, request gateway, resource clients and views together.
pub mod portal;
pub use portal::CardPortal;

pub mod config;
pub use config::PortalConfig;

// === INTERNAL MODULES ===
// Public so the binary and integration tests can build screens directly.
pub mod domain;
pub mod gateways;
pub mod infra;
pub mod views;
