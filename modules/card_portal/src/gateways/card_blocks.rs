use std::sync::Arc;

use async_trait::async_trait;
use tracing::instrument;

use crate::contract::client::CardBlocksApi;
use crate::contract::error::ApiError;
use crate::contract::model::{BlockRequest, NewBlockRequest, Page, PageRequest};
use crate::infra::http::{ApiRequest, RequestGateway};

pub struct HttpCardBlocksClient {
    gateway: Arc<RequestGateway>,
}

impl HttpCardBlocksClient {
    pub fn new(gateway: Arc<RequestGateway>) -> Self {
        Self { gateway }
    }

    async fn decide(&self, id: i64, verb: &str, comment: &str) -> Result<Option<BlockRequest>, ApiError> {
        let comment = comment.trim();
        if comment.is_empty() {
            return Err(ApiError::precondition("An admin comment is required"));
        }
        let req = ApiRequest::patch(format!("/cardBlock/{id}/{verb}")).query([("comment", comment)]);
        self.gateway.fetch_optional(req).await
    }
}

#[async_trait]
impl CardBlocksApi for HttpCardBlocksClient {
    #[instrument(name = "card_portal.card_blocks.list_mine", skip_all, fields(page = page.page, size = page.size))]
    async fn list_mine(&self, page: PageRequest) -> Result<Page<BlockRequest>, ApiError> {
        let req = ApiRequest::get("/cardBlock/my").query(page.query_pairs());
        self.gateway.fetch(req).await
    }

    #[instrument(name = "card_portal.card_blocks.list_all", skip_all, fields(page = page.page, size = page.size))]
    async fn list_all(&self, page: PageRequest) -> Result<Page<BlockRequest>, ApiError> {
        let req = ApiRequest::get("/cardBlock").query(page.query_pairs());
        self.gateway.fetch(req).await
    }

    #[instrument(name = "card_portal.card_blocks.get", skip(self))]
    async fn get(&self, id: i64) -> Result<BlockRequest, ApiError> {
        self.gateway
            .fetch(ApiRequest::get(format!("/cardBlock/{id}")))
            .await
    }

    #[instrument(name = "card_portal.card_blocks.get_mine", skip(self))]
    async fn get_mine(&self, id: i64) -> Result<BlockRequest, ApiError> {
        self.gateway
            .fetch(ApiRequest::get(format!("/cardBlock/{id}/my")))
            .await
    }

    #[instrument(name = "card_portal.card_blocks.create", skip(self))]
    async fn create(&self, card_id: i64) -> Result<Option<BlockRequest>, ApiError> {
        let req = ApiRequest::post("/cardBlock").json(&NewBlockRequest { card_id })?;
        self.gateway.fetch_optional(req).await
    }

    #[instrument(name = "card_portal.card_blocks.approve", skip(self, comment))]
    async fn approve(&self, id: i64, comment: &str) -> Result<Option<BlockRequest>, ApiError> {
        self.decide(id, "approve", comment).await
    }

    #[instrument(name = "card_portal.card_blocks.reject", skip(self, comment))]
    async fn reject(&self, id: i64, comment: &str) -> Result<Option<BlockRequest>, ApiError> {
        self.decide(id, "reject", comment).await
    }

    #[instrument(name = "card_portal.card_blocks.delete", skip(self))]
    async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.gateway
            .execute(ApiRequest::delete(format!("/cardBlock/{id}")))
            .await
    }
}
