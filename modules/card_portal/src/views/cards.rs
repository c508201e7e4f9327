use std::sync::Arc;

use tracing::debug;

use crate::contract::client::{CardBlocksApi, CardsApi};
use crate::contract::filter::CardFilter;
use crate::contract::model::{Card, CardStatus};
use crate::views::state::{Listing, Notice};

pub const NO_CARDS: &str = "You have no cards yet";
pub const NO_MATCHING_CARDS: &str = "No cards match the filters";

/// The signed-in user's own cards.
pub struct CardsView {
    cards: Arc<dyn CardsApi>,
    blocks: Arc<dyn CardBlocksApi>,
    listing: Listing<Card>,
    draft: CardFilter,
    applied: CardFilter,
}

impl CardsView {
    pub fn new(cards: Arc<dyn CardsApi>, blocks: Arc<dyn CardBlocksApi>, page_size: u32) -> Self {
        Self {
            cards,
            blocks,
            listing: Listing::new(page_size),
            draft: CardFilter::default(),
            applied: CardFilter::default(),
        }
    }

    pub fn listing(&self) -> &Listing<Card> {
        &self.listing
    }

    pub fn listing_mut(&mut self) -> &mut Listing<Card> {
        &mut self.listing
    }

    /// Filters being edited; they apply on the next [`search`](Self::search).
    pub fn draft_mut(&mut self) -> &mut CardFilter {
        &mut self.draft
    }

    pub fn applied(&self) -> &CardFilter {
        &self.applied
    }

    pub async fn reload(&mut self) {
        self.listing.begin_load();
        let result = self.cards.list_mine(self.listing.request(), &self.applied).await;
        self.listing.finish(result);
    }

    pub async fn set_page(&mut self, page: u32) {
        self.listing.set_page_index(page);
        self.reload().await;
    }

    pub async fn search(&mut self) {
        self.search_at(0).await;
    }

    /// Apply the draft filters and open `page` with a single request.
    pub async fn search_at(&mut self, page: u32) {
        self.applied = self.draft.normalized();
        self.listing.set_page_index(page);
        self.reload().await;
    }

    pub async fn clear_filters(&mut self) {
        self.draft = CardFilter::default();
        self.applied = CardFilter::default();
        self.listing.set_page_index(0);
        self.reload().await;
    }

    /// Ask an admin to block one of the listed cards.
    pub async fn request_block(&mut self, card_id: i64) {
        let listed = self.listing.items().iter().find(|c| c.id == card_id);
        if listed.is_some_and(|c| c.status_name == CardStatus::Blocked) {
            self.listing.notify(Notice::info(format!("Card {card_id} is already blocked")));
            return;
        }

        match self.blocks.create(card_id).await {
            Ok(request) => {
                debug!(block_id = request.map(|r| r.id), card_id, "block requested");
                self.listing.notify(Notice::success("Block request created"));
                self.reload().await;
            }
            Err(e) => self.listing.notify(Notice::from(&e)),
        }
    }

    /// Message for an empty result, if the last load came back empty.
    pub fn empty_message(&self) -> Option<&'static str> {
        if !self.listing.is_empty() {
            return None;
        }
        Some(if self.applied.is_empty() {
            NO_CARDS
        } else {
            NO_MATCHING_CARDS
        })
    }
}
