use std::sync::Arc;

use tracing::{debug, info};

use crate::config::PortalConfig;
use crate::contract::client::{AuthApi, CardBlocksApi, CardsApi, UsersApi};
use crate::contract::error::ApiError;
use crate::domain::session::{Session, SessionSlot};
use crate::gateways::{HttpAuthClient, HttpCardBlocksClient, HttpCardsClient, HttpUsersClient};
use crate::infra::http::RequestGateway;
use crate::infra::storage::KeyValueStore;
use crate::views::{
    AdminBlocksView, AdminCardsView, AdminUsersView, BlocksView, CardsView, Screen, TransferView,
};

/// Everything one signed-in (or signed-out) client needs.
///
/// The session slot is created here and handed to both the gateway, which
/// reads the token, and the [`Session`], which is its only writer.
pub struct CardPortal {
    config: PortalConfig,
    gateway: Arc<RequestGateway>,
    session: Session,
    users: Arc<dyn UsersApi>,
    cards: Arc<dyn CardsApi>,
    blocks: Arc<dyn CardBlocksApi>,
}

impl CardPortal {
    pub fn new(config: PortalConfig, store: Arc<dyn KeyValueStore>) -> Result<Self, ApiError> {
        let slot = Arc::new(SessionSlot::new());
        let gateway = Arc::new(RequestGateway::from_config(&config, slot.clone())?);
        debug!(base_url = gateway.base_url(), "request gateway ready");

        let auth: Arc<dyn AuthApi> = Arc::new(HttpAuthClient::new(gateway.clone()));
        let users: Arc<dyn UsersApi> = Arc::new(HttpUsersClient::new(gateway.clone()));
        let cards: Arc<dyn CardsApi> = Arc::new(HttpCardsClient::new(gateway.clone()));
        let blocks: Arc<dyn CardBlocksApi> = Arc::new(HttpCardBlocksClient::new(gateway.clone()));

        Ok(Self {
            config,
            gateway,
            session: Session::new(slot, auth, store),
            users,
            cards,
            blocks,
        })
    }

    /// Build and restore any persisted session in one go.
    pub async fn start(config: PortalConfig, store: Arc<dyn KeyValueStore>) -> Result<Self, ApiError> {
        let portal = Self::new(config, store)?;
        portal.session.init().await?;
        info!(screen = ?portal.screen(), "card portal started");
        Ok(portal)
    }

    pub fn config(&self) -> &PortalConfig {
        &self.config
    }

    pub fn gateway(&self) -> &Arc<RequestGateway> {
        &self.gateway
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn screen(&self) -> Screen {
        Screen::resolve(&self.session.current())
    }

    pub fn users(&self) -> Arc<dyn UsersApi> {
        self.users.clone()
    }

    pub fn cards(&self) -> Arc<dyn CardsApi> {
        self.cards.clone()
    }

    pub fn blocks(&self) -> Arc<dyn CardBlocksApi> {
        self.blocks.clone()
    }

    pub fn cards_view(&self) -> CardsView {
        CardsView::new(self.cards(), self.blocks(), self.config.page_size)
    }

    pub fn blocks_view(&self) -> BlocksView {
        BlocksView::new(self.blocks(), self.config.page_size)
    }

    pub fn transfer_view(&self) -> TransferView {
        TransferView::new(self.cards())
    }

    pub fn admin_users_view(&self) -> AdminUsersView {
        AdminUsersView::new(self.users(), self.config.page_size)
    }

    pub fn admin_cards_view(&self) -> AdminCardsView {
        AdminCardsView::new(self.cards(), self.users(), self.config.page_size)
    }

    pub fn admin_blocks_view(&self) -> AdminBlocksView {
        AdminBlocksView::new(self.blocks(), self.config.page_size)
    }
}
