use std::sync::Arc;

use async_trait::async_trait;
use tracing::instrument;

use crate::contract::client::AuthApi;
use crate::contract::error::ApiError;
use crate::contract::model::{AuthResponse, Credentials};
use crate::infra::http::{ApiRequest, RequestGateway};

pub struct HttpAuthClient {
    gateway: Arc<RequestGateway>,
}

impl HttpAuthClient {
    pub fn new(gateway: Arc<RequestGateway>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl AuthApi for HttpAuthClient {
    #[instrument(name = "card_portal.auth.register", skip_all, fields(email = %credentials.email))]
    async fn register(&self, credentials: &Credentials) -> Result<AuthResponse, ApiError> {
        credentials.validate()?;
        let req = ApiRequest::post("/auth/register").json(credentials)?;
        self.gateway.fetch(req).await
    }

    #[instrument(name = "card_portal.auth.login", skip_all, fields(email = %credentials.email))]
    async fn login(&self, credentials: &Credentials) -> Result<AuthResponse, ApiError> {
        credentials.validate()?;
        let req = ApiRequest::post("/auth/login").json(credentials)?;
        self.gateway.fetch(req).await
    }

    #[instrument(name = "card_portal.auth.me", skip_all)]
    async fn me(&self) -> Result<AuthResponse, ApiError> {
        self.gateway.fetch(ApiRequest::get("/auth/me")).await
    }
}
