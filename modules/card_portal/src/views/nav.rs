//! Which screens a session may reach.

use std::fmt;

use crate::domain::session::{Phase, SessionSnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tab {
    Cards,
    Blocks,
    Transfer,
    AdminUsers,
    AdminCards,
    AdminBlocks,
}

impl Tab {
    pub const ALL: [Tab; 6] = [
        Tab::Cards,
        Tab::Blocks,
        Tab::Transfer,
        Tab::AdminUsers,
        Tab::AdminCards,
        Tab::AdminBlocks,
    ];

    pub fn requires_admin(self) -> bool {
        matches!(self, Tab::AdminUsers | Tab::AdminCards | Tab::AdminBlocks)
    }

    pub fn title(self) -> &'static str {
        match self {
            Tab::Cards => "My cards",
            Tab::Blocks => "Block requests",
            Tab::Transfer => "Transfer",
            Tab::AdminUsers => "Users",
            Tab::AdminCards => "All cards",
            Tab::AdminBlocks => "All block requests",
        }
    }

    /// Tabs shown to this session, in display order.
    pub fn visible_to(session: &SessionSnapshot) -> Vec<Tab> {
        if !session.is_signed_in() {
            return Vec::new();
        }
        let admin = session.is_admin();
        Self::ALL
            .into_iter()
            .filter(|t| admin || !t.requires_admin())
            .collect()
    }

    pub fn is_reachable(self, session: &SessionSnapshot) -> bool {
        session.is_signed_in() && (session.is_admin() || !self.requires_admin())
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    /// Session restore still in flight.
    Loading,
    /// Signed out.
    Landing,
    Dashboard { tabs: Vec<Tab> },
}

impl Screen {
    pub fn resolve(session: &SessionSnapshot) -> Self {
        if session.phase == Phase::Loading {
            return Screen::Loading;
        }
        if !session.is_signed_in() {
            return Screen::Landing;
        }
        Screen::Dashboard {
            tabs: Tab::visible_to(session),
        }
    }
}
