//! Screen controllers. Each owns its list state and turns failures into
//! notices instead of returning them.

pub mod admin_blocks;
pub mod admin_cards;
pub mod admin_users;
pub mod blocks;
pub mod cards;
pub mod nav;
pub mod state;
pub mod transfer;

#[cfg(test)]
pub(crate) mod testing;

pub use admin_blocks::AdminBlocksView;
pub use admin_cards::AdminCardsView;
pub use admin_users::AdminUsersView;
pub use blocks::BlocksView;
pub use cards::CardsView;
pub use nav::{Screen, Tab};
pub use state::{Confirm, FixedAnswer, LoadState, Listing, Notice, NoticeLevel, PageNav};
pub use transfer::{Availability, TransferForm, TransferView};
