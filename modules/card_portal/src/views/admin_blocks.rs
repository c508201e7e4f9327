use std::sync::Arc;

use tracing::info;

use crate::contract::client::CardBlocksApi;
use crate::contract::error::ApiError;
use crate::contract::model::BlockRequest;
use crate::views::state::{Confirm, Listing, Notice};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Reject,
}

impl Decision {
    fn past_tense(self) -> &'static str {
        match self {
            Self::Approve => "approved",
            Self::Reject => "rejected",
        }
    }
}

/// Every block request in the system, for admins.
pub struct AdminBlocksView {
    blocks: Arc<dyn CardBlocksApi>,
    listing: Listing<BlockRequest>,
}

impl AdminBlocksView {
    pub fn new(blocks: Arc<dyn CardBlocksApi>, page_size: u32) -> Self {
        Self {
            blocks,
            listing: Listing::new(page_size),
        }
    }

    pub fn listing(&self) -> &Listing<BlockRequest> {
        &self.listing
    }

    pub fn listing_mut(&mut self) -> &mut Listing<BlockRequest> {
        &mut self.listing
    }

    pub async fn reload(&mut self) {
        self.listing.begin_load();
        let result = self.blocks.list_all(self.listing.request()).await;
        self.listing.finish(result);
    }

    pub async fn set_page(&mut self, page: u32) {
        self.listing.set_page_index(page);
        self.reload().await;
    }

    pub async fn approve(&mut self, id: i64, comment: &str) {
        self.decide(id, Decision::Approve, comment).await;
    }

    pub async fn reject(&mut self, id: i64, comment: &str) {
        self.decide(id, Decision::Reject, comment).await;
    }

    async fn decide(&mut self, id: i64, decision: Decision, comment: &str) {
        if comment.trim().is_empty() {
            self.listing
                .notify(Notice::from(&ApiError::precondition("An admin comment is required")));
            return;
        }
        let decided = self
            .listing
            .items()
            .iter()
            .find(|r| r.id == id && !r.is_pending())
            .map(|r| r.status);
        if let Some(status) = decided {
            self.listing.notify(Notice::info(format!(
                "Block request {id} was already {}",
                status
            )));
            return;
        }

        let result = match decision {
            Decision::Approve => self.blocks.approve(id, comment).await,
            Decision::Reject => self.blocks.reject(id, comment).await,
        };
        match result {
            Ok(updated) => {
                let status = updated.map(|r| r.status.to_string());
                info!(block_id = id, status = status.as_deref(), "block request decided");
                self.listing.notify(Notice::success(format!(
                    "Block request {id} {}",
                    decision.past_tense()
                )));
                self.reload().await;
            }
            Err(e) => self.listing.notify(Notice::from(&e)),
        }
    }

    pub async fn delete(&mut self, id: i64, confirm: &dyn Confirm) {
        if !confirm.confirm(&format!("Delete block request {id}?")) {
            self.listing.notify(Notice::info("Deletion cancelled"));
            return;
        }
        match self.blocks.delete(id).await {
            Ok(()) => {
                self.listing.notify(Notice::success("Block request deleted"));
                self.reload().await;
            }
            Err(e) => self.listing.notify(Notice::from(&e)),
        }
    }

    pub fn empty_message(&self) -> Option<&'static str> {
        self.listing.is_empty().then_some("There are no block requests")
    }
}
