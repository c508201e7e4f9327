use async_trait::async_trait;

use crate::contract::error::ApiError;
use crate::contract::filter::CardFilter;
use crate::contract::model::{
    AuthResponse, BlockRequest, Card, CardStatus, Credentials, ExpiryMonth, Identity, NewCard,
    NewIdentity, Page, PageRequest, Role, TransferReceipt, TransferRequest,
};

/// Session endpoints: `/auth/*`.
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn register(&self, credentials: &Credentials) -> Result<AuthResponse, ApiError>;

    async fn login(&self, credentials: &Credentials) -> Result<AuthResponse, ApiError>;

    /// Validate the current bearer token and return its identity.
    async fn me(&self) -> Result<AuthResponse, ApiError>;
}

/// Account administration: `/user/*`.
///
/// Mutations return `None` when the server answers with 204 or an empty body.
#[async_trait]
pub trait UsersApi: Send + Sync {
    async fn list(&self, page: PageRequest) -> Result<Page<Identity>, ApiError>;

    async fn get(&self, id: i64) -> Result<Identity, ApiError>;

    async fn create(&self, new_identity: &NewIdentity) -> Result<Option<Identity>, ApiError>;

    async fn change_role(&self, id: i64, role: Role) -> Result<Option<Identity>, ApiError>;

    async fn toggle_lock(&self, id: i64) -> Result<Option<Identity>, ApiError>;

    async fn toggle_enable(&self, id: i64) -> Result<Option<Identity>, ApiError>;

    async fn delete(&self, id: i64) -> Result<(), ApiError>;
}

/// Cards: `/card/*`. Mutations return `None` on an empty success body.
#[async_trait]
pub trait CardsApi: Send + Sync {
    /// Cards owned by the signed-in account.
    async fn list_mine(
        &self,
        page: PageRequest,
        filter: &CardFilter,
    ) -> Result<Page<Card>, ApiError>;

    /// Every card (admin).
    async fn list_all(&self, page: PageRequest, filter: &CardFilter)
        -> Result<Page<Card>, ApiError>;

    async fn get(&self, id: i64) -> Result<Card, ApiError>;

    async fn get_mine(&self, id: i64) -> Result<Card, ApiError>;

    async fn create(&self, new_card: &NewCard) -> Result<Option<Card>, ApiError>;

    /// Move balance between two cards of the signed-in account.
    /// Fails locally, without a request, when both ids are equal.
    async fn transfer(&self, transfer: &TransferRequest) -> Result<TransferReceipt, ApiError>;

    async fn change_status(&self, id: i64, status: CardStatus) -> Result<Option<Card>, ApiError>;

    async fn change_expiry(&self, id: i64, expiry: ExpiryMonth) -> Result<Option<Card>, ApiError>;

    async fn delete(&self, id: i64) -> Result<(), ApiError>;
}

/// Card block requests: `/cardBlock/*`. Mutations return `None` on an
/// empty success body.
#[async_trait]
pub trait CardBlocksApi: Send + Sync {
    async fn list_mine(&self, page: PageRequest) -> Result<Page<BlockRequest>, ApiError>;

    async fn list_all(&self, page: PageRequest) -> Result<Page<BlockRequest>, ApiError>;

    async fn get(&self, id: i64) -> Result<BlockRequest, ApiError>;

    async fn get_mine(&self, id: i64) -> Result<BlockRequest, ApiError>;

    async fn create(&self, card_id: i64) -> Result<Option<BlockRequest>, ApiError>;

    /// Comment is mandatory; a blank one fails locally.
    async fn approve(&self, id: i64, comment: &str) -> Result<Option<BlockRequest>, ApiError>;

    /// Comment is mandatory; a blank one fails locally.
    async fn reject(&self, id: i64, comment: &str) -> Result<Option<BlockRequest>, ApiError>;

    async fn delete(&self, id: i64) -> Result<(), ApiError>;
}
