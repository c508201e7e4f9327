use std::sync::Arc;

use tracing::{debug, warn};

use crate::contract::client::{CardsApi, UsersApi};
use crate::contract::error::ApiError;
use crate::contract::filter::CardFilter;
use crate::contract::model::{Card, CardStatus, ExpiryMonth, Identity, NewCard, PageRequest};
use crate::views::cards::NO_MATCHING_CARDS;
use crate::views::state::{Confirm, Listing, Notice};

/// Empty state of the unfiltered system-wide list.
pub const NO_CARDS_ISSUED: &str = "No cards have been issued yet";

/// Owners offered when creating a card.
pub const OWNER_PAGE_SIZE: u32 = 100;

/// Every card in the system, for admins.
pub struct AdminCardsView {
    cards: Arc<dyn CardsApi>,
    users: Arc<dyn UsersApi>,
    listing: Listing<Card>,
    draft: CardFilter,
    applied: CardFilter,
    owners: Vec<Identity>,
    all_owners_loaded: bool,
}

impl AdminCardsView {
    pub fn new(cards: Arc<dyn CardsApi>, users: Arc<dyn UsersApi>, page_size: u32) -> Self {
        Self {
            cards,
            users,
            listing: Listing::new(page_size),
            draft: CardFilter::default(),
            applied: CardFilter::default(),
            owners: Vec::new(),
            all_owners_loaded: false,
        }
    }

    pub fn listing(&self) -> &Listing<Card> {
        &self.listing
    }

    pub fn listing_mut(&mut self) -> &mut Listing<Card> {
        &mut self.listing
    }

    pub fn draft_mut(&mut self) -> &mut CardFilter {
        &mut self.draft
    }

    pub fn applied(&self) -> &CardFilter {
        &self.applied
    }

    pub fn owners(&self) -> &[Identity] {
        &self.owners
    }

    pub async fn reload(&mut self) {
        self.listing.begin_load();
        let result = self.cards.list_all(self.listing.request(), &self.applied).await;
        self.listing.finish(result);
    }

    /// Fetch the owner choices. Failure leaves the list empty and is only logged.
    pub async fn load_owners(&mut self) {
        match self.users.list(PageRequest::first(OWNER_PAGE_SIZE)).await {
            Ok(page) => {
                self.all_owners_loaded = page.content.len() as u64 >= page.total_elements;
                if !self.all_owners_loaded {
                    debug!(
                        loaded = page.content.len(),
                        total = page.total_elements,
                        "owner list is partial"
                    );
                }
                self.owners = page.content;
            }
            Err(e) => warn!(error = %e, "cannot load card owners"),
        }
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

    /// An owner id is only checked locally when every account is in the
    /// owner list; otherwise the server decides.
    pub async fn create(&mut self, new_card: &NewCard) {
        let known = self.owners.iter().any(|o| o.id == new_card.user_id);
        if self.all_owners_loaded && !self.owners.is_empty() && !known {
            let err = ApiError::precondition(format!("Unknown owner {}", new_card.user_id));
            self.listing.notify(Notice::from(&err));
            return;
        }
        let result = self.cards.create(new_card).await;
        self.settle(result, "Card created").await;
    }

    pub async fn change_status(&mut self, id: i64, status: CardStatus) {
        let result = self.cards.change_status(id, status).await;
        self.settle(result, "Card status updated").await;
    }

    pub async fn change_expiry(&mut self, id: i64, expiry: ExpiryMonth) {
        let result = self.cards.change_expiry(id, expiry).await;
        self.settle(result, "Card expiry updated").await;
    }

    pub async fn delete(&mut self, id: i64, confirm: &dyn Confirm) {
        if !confirm.confirm(&format!("Delete card {id}?")) {
            self.listing.notify(Notice::info("Deletion cancelled"));
            return;
        }
        let result = self.cards.delete(id).await;
        self.settle(result, "Card deleted").await;
    }

    async fn settle<T>(&mut self, result: Result<T, ApiError>, success: &str) {
        match result {
            Ok(_) => {
                self.listing.notify(Notice::success(success));
                self.reload().await;
            }
            Err(e) => self.listing.notify(Notice::from(&e)),
        }
    }

    pub fn empty_message(&self) -> Option<&'static str> {
        if !self.listing.is_empty() {
            return None;
        }
        Some(if self.applied.is_empty() {
            NO_CARDS_ISSUED
        } else {
            NO_MATCHING_CARDS
        })
    }
}
