//! HTTP implementations of the contract traits, one per backend resource.

pub mod auth;
pub mod card_blocks;
pub mod cards;
pub mod users;

pub use auth::HttpAuthClient;
pub use card_blocks::HttpCardBlocksClient;
pub use cards::HttpCardsClient;
pub use users::HttpUsersClient;
