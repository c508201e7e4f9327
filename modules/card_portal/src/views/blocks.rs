use std::sync::Arc;

use crate::contract::client::CardBlocksApi;
use crate::contract::model::BlockRequest;
use crate::views::state::{Confirm, Listing, Notice};

pub const NO_BLOCK_REQUESTS: &str = "You have not requested any card blocks";

/// The signed-in user's block requests.
pub struct BlocksView {
    blocks: Arc<dyn CardBlocksApi>,
    listing: Listing<BlockRequest>,
}

impl BlocksView {
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
        let result = self.blocks.list_mine(self.listing.request()).await;
        self.listing.finish(result);
    }

    pub async fn set_page(&mut self, page: u32) {
        self.listing.set_page_index(page);
        self.reload().await;
    }

    /// Withdraw a request that no admin has decided on yet.
    pub async fn cancel(&mut self, id: i64, confirm: &dyn Confirm) {
        let decided = self
            .listing
            .items()
            .iter()
            .find(|r| r.id == id && !r.is_pending())
            .map(|r| r.status);
        if let Some(status) = decided {
            self.listing.notify(Notice::info(format!(
                "Block request {id} is already {} and cannot be cancelled",
                status
            )));
            return;
        }
        if !confirm.confirm(&format!("Cancel block request {id}?")) {
            self.listing.notify(Notice::info("Cancellation aborted"));
            return;
        }

        match self.blocks.delete(id).await {
            Ok(()) => {
                self.listing.notify(Notice::success("Block request cancelled"));
                self.reload().await;
            }
            Err(e) => self.listing.notify(Notice::from(&e)),
        }
    }

    pub fn empty_message(&self) -> Option<&'static str> {
        self.listing.is_empty().then_some(NO_BLOCK_REQUESTS)
    }
}
