pub mod session;

pub use session::{Phase, Session, SessionSlot, SessionSnapshot};
