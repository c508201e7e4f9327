use std::sync::Arc;

use async_trait::async_trait;
use tracing::instrument;

use crate::contract::client::UsersApi;
use crate::contract::error::ApiError;
use crate::contract::model::{Identity, NewIdentity, Page, PageRequest, Role, RoleChange};
use crate::infra::http::{ApiRequest, RequestGateway};

pub struct HttpUsersClient {
    gateway: Arc<RequestGateway>,
}

impl HttpUsersClient {
    pub fn new(gateway: Arc<RequestGateway>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl UsersApi for HttpUsersClient {
    #[instrument(name = "card_portal.users.list", skip_all, fields(page = page.page, size = page.size))]
    async fn list(&self, page: PageRequest) -> Result<Page<Identity>, ApiError> {
        let req = ApiRequest::get("/user").query(page.query_pairs());
        self.gateway.fetch(req).await
    }

    #[instrument(name = "card_portal.users.get", skip(self))]
    async fn get(&self, id: i64) -> Result<Identity, ApiError> {
        self.gateway.fetch(ApiRequest::get(format!("/user/{id}"))).await
    }

    #[instrument(name = "card_portal.users.create", skip_all, fields(email = %new_identity.email, role = %new_identity.role))]
    async fn create(&self, new_identity: &NewIdentity) -> Result<Option<Identity>, ApiError> {
        new_identity.validate()?;
        let req = ApiRequest::post("/user").json(new_identity)?;
        self.gateway.fetch_optional(req).await
    }

    #[instrument(name = "card_portal.users.change_role", skip(self, role), fields(role = %role))]
    async fn change_role(&self, id: i64, role: Role) -> Result<Option<Identity>, ApiError> {
        let req = ApiRequest::patch(format!("/user/{id}/role")).json(&RoleChange { role })?;
        self.gateway.fetch_optional(req).await
    }

    #[instrument(name = "card_portal.users.toggle_lock", skip(self))]
    async fn toggle_lock(&self, id: i64) -> Result<Option<Identity>, ApiError> {
        self.gateway
            .fetch_optional(ApiRequest::patch(format!("/user/{id}/toggleLock")))
            .await
    }

    #[instrument(name = "card_portal.users.toggle_enable", skip(self))]
    async fn toggle_enable(&self, id: i64) -> Result<Option<Identity>, ApiError> {
        self.gateway
            .fetch_optional(ApiRequest::patch(format!("/user/{id}/toggleEnable")))
            .await
    }

    #[instrument(name = "card_portal.users.delete", skip(self))]
    async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.gateway
            .execute(ApiRequest::delete(format!("/user/{id}")))
            .await
    }
}
