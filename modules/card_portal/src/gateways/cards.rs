use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, instrument};

use crate::contract::client::CardsApi;
use crate::contract::error::ApiError;
use crate::contract::filter::CardFilter;
use crate::contract::model::{
    Card, CardStatus, ExpiryChange, ExpiryMonth, NewCard, Page, PageRequest, StatusChange,
    TransferReceipt, TransferRequest,
};
use crate::infra::http::{ApiRequest, RequestGateway};

pub struct HttpCardsClient {
    gateway: Arc<RequestGateway>,
}

impl HttpCardsClient {
    pub fn new(gateway: Arc<RequestGateway>) -> Self {
        Self { gateway }
    }

    fn list_request(path: &str, page: PageRequest, filter: &CardFilter) -> ApiRequest {
        ApiRequest::get(path)
            .query(page.query_pairs())
            .query(filter.query_pairs())
    }
}

#[async_trait]
impl CardsApi for HttpCardsClient {
    #[instrument(name = "card_portal.cards.list_mine", skip_all, fields(page = page.page, size = page.size, filtered = !filter.is_empty()))]
    async fn list_mine(
        &self,
        page: PageRequest,
        filter: &CardFilter,
    ) -> Result<Page<Card>, ApiError> {
        self.gateway
            .fetch(Self::list_request("/card/my", page, filter))
            .await
    }

    #[instrument(name = "card_portal.cards.list_all", skip_all, fields(page = page.page, size = page.size, filtered = !filter.is_empty()))]
    async fn list_all(
        &self,
        page: PageRequest,
        filter: &CardFilter,
    ) -> Result<Page<Card>, ApiError> {
        self.gateway
            .fetch(Self::list_request("/card", page, filter))
            .await
    }

    #[instrument(name = "card_portal.cards.get", skip(self))]
    async fn get(&self, id: i64) -> Result<Card, ApiError> {
        self.gateway.fetch(ApiRequest::get(format!("/card/{id}"))).await
    }

    #[instrument(name = "card_portal.cards.get_mine", skip(self))]
    async fn get_mine(&self, id: i64) -> Result<Card, ApiError> {
        self.gateway
            .fetch(ApiRequest::get(format!("/card/{id}/my")))
            .await
    }

    #[instrument(name = "card_portal.cards.create", skip_all, fields(user_id = new_card.user_id))]
    async fn create(&self, new_card: &NewCard) -> Result<Option<Card>, ApiError> {
        let req = ApiRequest::post("/card").json(new_card)?;
        self.gateway.fetch_optional(req).await
    }

    #[instrument(
        name = "card_portal.cards.transfer",
        skip_all,
        fields(from = transfer.from_card_id, to = transfer.to_card_id)
    )]
    async fn transfer(&self, transfer: &TransferRequest) -> Result<TransferReceipt, ApiError> {
        transfer.validate()?;
        let req = ApiRequest::post("/card/transfer").json(transfer)?;
        let payload = self.gateway.send(req).await?;
        let receipt = TransferReceipt {
            message: payload.message(),
        };
        debug!(has_message = receipt.message.is_some(), "transfer accepted");
        Ok(receipt)
    }

    #[instrument(name = "card_portal.cards.change_status", skip(self, status), fields(status = %status))]
    async fn change_status(&self, id: i64, status: CardStatus) -> Result<Option<Card>, ApiError> {
        let req = ApiRequest::patch(format!("/card/{id}/status")).json(&StatusChange { status })?;
        self.gateway.fetch_optional(req).await
    }

    #[instrument(name = "card_portal.cards.change_expiry", skip(self, expiry), fields(expiry = %expiry))]
    async fn change_expiry(&self, id: i64, expiry: ExpiryMonth) -> Result<Option<Card>, ApiError> {
        let req = ApiRequest::patch(format!("/card/{id}/expiry")).json(&ExpiryChange {
            expiry_date: expiry,
        })?;
        self.gateway.fetch_optional(req).await
    }

    #[instrument(name = "card_portal.cards.delete", skip(self))]
    async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.gateway
            .execute(ApiRequest::delete(format!("/card/{id}")))
            .await
    }
}
