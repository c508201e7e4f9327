//! In-memory stand-ins for the resource clients, used by the view tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use rust_decimal::Decimal;

use crate::contract::client::{CardBlocksApi, CardsApi, UsersApi};
use crate::contract::error::ApiError;
use crate::contract::filter::CardFilter;
use crate::contract::model::{
    BlockRequest, BlockStatus, Card, CardStatus, ExpiryMonth, Identity, NewCard, NewIdentity,
    Page, PageRequest, Role, TransferReceipt, TransferRequest,
};

pub fn card(id: i64) -> Card {
    Card {
        id,
        masked_card_number: format!("**** **** **** {:04}", id),
        owner_email: "owner@example.com".into(),
        expiry_date: ExpiryMonth::new(2030, 1).unwrap(),
        status_name: CardStatus::Active,
        balance: Decimal::new(id * 10, 0),
    }
}

pub fn block(id: i64, status: BlockStatus) -> BlockRequest {
    BlockRequest {
        id,
        request_date: "2025-01-02T10:00:00".into(),
        card_id: id * 100,
        user_id: 1,
        status,
        admin_comment: None,
    }
}

pub fn user(id: i64, role: Role) -> Identity {
    Identity {
        id,
        email: format!("user{id}@example.com"),
        role_name: role,
        is_enabled: true,
        is_non_locked: true,
        cards: Vec::new(),
    }
}

fn paginate<T: Clone>(items: &[T], page: PageRequest) -> Page<T> {
    let size = page.size.max(1) as usize;
    let total_pages = items.len().div_ceil(size) as u32;
    let content = items
        .iter()
        .skip(page.page as usize * size)
        .take(size)
        .cloned()
        .collect();
    Page {
        content,
        total_elements: items.len() as u64,
        total_pages,
        size: page.size,
        number: page.page,
    }
}

fn matches(card: &Card, filter: &CardFilter) -> bool {
    let f = filter.normalized();
    f.last_four_digits
        .as_deref()
        .is_none_or(|d| card.masked_card_number.ends_with(d))
        && f.status.is_none_or(|s| card.status_name == s)
        && f.min_balance.is_none_or(|m| card.balance >= m)
        && f.max_balance.is_none_or(|m| card.balance <= m)
}

fn take_failure(slot: &Mutex<Option<ApiError>>) -> Result<(), ApiError> {
    match slot.lock().take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

fn not_found(what: &str, id: i64) -> ApiError {
    ApiError::status(404, format!("{what} {id} not found"))
}

#[derive(Default)]
pub struct FakeCards {
    cards: Mutex<Vec<Card>>,
    lists: Mutex<Vec<(PageRequest, CardFilter)>>,
    transfers: Mutex<Vec<TransferRequest>>,
    fail_next: Mutex<Option<ApiError>>,
}

impl FakeCards {
    pub fn with_cards(cards: Vec<Card>) -> Self {
        Self {
            cards: Mutex::new(cards),
            ..Self::default()
        }
    }

    pub fn fail_next(&self, err: ApiError) {
        *self.fail_next.lock() = Some(err);
    }

    pub fn list_calls(&self) -> usize {
        self.lists.lock().len()
    }

    pub fn last_list(&self) -> Option<(PageRequest, CardFilter)> {
        self.lists.lock().last().cloned()
    }

    pub fn transfers(&self) -> Vec<TransferRequest> {
        self.transfers.lock().clone()
    }

    pub fn snapshot(&self) -> Vec<Card> {
        self.cards.lock().clone()
    }

    fn list(&self, page: PageRequest, filter: &CardFilter) -> Result<Page<Card>, ApiError> {
        self.lists.lock().push((page, filter.clone()));
        take_failure(&self.fail_next)?;
        let cards: Vec<Card> = self
            .cards
            .lock()
            .iter()
            .filter(|c| matches(c, filter))
            .cloned()
            .collect();
        Ok(paginate(&cards, page))
    }

    fn update(&self, id: i64, f: impl FnOnce(&mut Card)) -> Result<Card, ApiError> {
        take_failure(&self.fail_next)?;
        let mut cards = self.cards.lock();
        let card = cards
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| not_found("Card", id))?;
        f(card);
        Ok(card.clone())
    }
}

#[async_trait]
impl CardsApi for FakeCards {
    async fn list_mine(&self, page: PageRequest, filter: &CardFilter) -> Result<Page<Card>, ApiError> {
        self.list(page, filter)
    }

    async fn list_all(&self, page: PageRequest, filter: &CardFilter) -> Result<Page<Card>, ApiError> {
        self.list(page, filter)
    }

    async fn get(&self, id: i64) -> Result<Card, ApiError> {
        self.update(id, |_| {})
    }

    async fn get_mine(&self, id: i64) -> Result<Card, ApiError> {
        self.update(id, |_| {})
    }

    async fn create(&self, new_card: &NewCard) -> Result<Option<Card>, ApiError> {
        take_failure(&self.fail_next)?;
        let mut cards = self.cards.lock();
        let id = cards.iter().map(|c| c.id).max().unwrap_or(0) + 1;
        let mut created = card(id);
        created.expiry_date = new_card.expiry_date;
        created.status_name = new_card.status;
        created.balance = new_card.balance;
        cards.push(created.clone());
        Ok(Some(created))
    }

    async fn transfer(&self, transfer: &TransferRequest) -> Result<TransferReceipt, ApiError> {
        self.transfers.lock().push(transfer.clone());
        take_failure(&self.fail_next)?;
        Ok(TransferReceipt::default())
    }

    async fn change_status(&self, id: i64, status: CardStatus) -> Result<Option<Card>, ApiError> {
        self.update(id, |c| c.status_name = status).map(Some)
    }

    async fn change_expiry(&self, id: i64, expiry: ExpiryMonth) -> Result<Option<Card>, ApiError> {
        self.update(id, |c| c.expiry_date = expiry).map(Some)
    }

    async fn delete(&self, id: i64) -> Result<(), ApiError> {
        take_failure(&self.fail_next)?;
        let mut cards = self.cards.lock();
        let before = cards.len();
        cards.retain(|c| c.id != id);
        if cards.len() == before {
            return Err(not_found("Card", id));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeBlocks {
    requests: Mutex<Vec<BlockRequest>>,
    created: Mutex<Vec<i64>>,
    deleted: Mutex<Vec<i64>>,
    list_calls: Mutex<usize>,
    fail_next: Mutex<Option<ApiError>>,
    without_body: Mutex<bool>,
}

impl FakeBlocks {
    pub fn with_requests(requests: Vec<BlockRequest>) -> Self {
        Self {
            requests: Mutex::new(requests),
            ..Self::default()
        }
    }

    pub fn fail_next(&self, err: ApiError) {
        *self.fail_next.lock() = Some(err);
    }

    /// Decisions succeed with an empty body, like a 204.
    pub fn answer_without_body(&self) {
        *self.without_body.lock() = true;
    }

    pub fn created(&self) -> Vec<i64> {
        self.created.lock().clone()
    }

    pub fn deleted(&self) -> Vec<i64> {
        self.deleted.lock().clone()
    }

    pub fn list_calls(&self) -> usize {
        *self.list_calls.lock()
    }

    fn list(&self, page: PageRequest) -> Result<Page<BlockRequest>, ApiError> {
        *self.list_calls.lock() += 1;
        take_failure(&self.fail_next)?;
        Ok(paginate(&self.requests.lock(), page))
    }

    fn find(&self, id: i64) -> Result<BlockRequest, ApiError> {
        self.requests
            .lock()
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| not_found("Block request", id))
    }

    fn decide(
        &self,
        id: i64,
        status: BlockStatus,
        comment: &str,
    ) -> Result<Option<BlockRequest>, ApiError> {
        take_failure(&self.fail_next)?;
        let mut requests = self.requests.lock();
        let request = requests
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| not_found("Block request", id))?;
        request.status = status;
        request.admin_comment = Some(comment.to_string());
        Ok((!*self.without_body.lock()).then(|| request.clone()))
    }
}

#[async_trait]
impl CardBlocksApi for FakeBlocks {
    async fn list_mine(&self, page: PageRequest) -> Result<Page<BlockRequest>, ApiError> {
        self.list(page)
    }

    async fn list_all(&self, page: PageRequest) -> Result<Page<BlockRequest>, ApiError> {
        self.list(page)
    }

    async fn get(&self, id: i64) -> Result<BlockRequest, ApiError> {
        self.find(id)
    }

    async fn get_mine(&self, id: i64) -> Result<BlockRequest, ApiError> {
        self.find(id)
    }

    async fn create(&self, card_id: i64) -> Result<Option<BlockRequest>, ApiError> {
        self.created.lock().push(card_id);
        take_failure(&self.fail_next)?;
        let mut requests = self.requests.lock();
        let id = requests.iter().map(|r| r.id).max().unwrap_or(0) + 1;
        let mut created = block(id, BlockStatus::Pending);
        created.card_id = card_id;
        requests.push(created.clone());
        Ok(Some(created))
    }

    async fn approve(&self, id: i64, comment: &str) -> Result<Option<BlockRequest>, ApiError> {
        self.decide(id, BlockStatus::Approved, comment)
    }

    async fn reject(&self, id: i64, comment: &str) -> Result<Option<BlockRequest>, ApiError> {
        self.decide(id, BlockStatus::Rejected, comment)
    }

    async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.deleted.lock().push(id);
        take_failure(&self.fail_next)?;
        self.requests.lock().retain(|r| r.id != id);
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeUsers {
    users: Mutex<Vec<Identity>>,
    list_calls: Mutex<Vec<PageRequest>>,
    fail_next: Mutex<Option<ApiError>>,
    without_body: Mutex<bool>,
}

impl FakeUsers {
    pub fn with_users(users: Vec<Identity>) -> Self {
        Self {
            users: Mutex::new(users),
            ..Self::default()
        }
    }

    pub fn fail_next(&self, err: ApiError) {
        *self.fail_next.lock() = Some(err);
    }

    pub fn list_calls(&self) -> Vec<PageRequest> {
        self.list_calls.lock().clone()
    }

    pub fn snapshot(&self) -> Vec<Identity> {
        self.users.lock().clone()
    }

    /// Updates succeed with an empty body, like a 204.
    pub fn answer_without_body(&self) {
        *self.without_body.lock() = true;
    }

    fn mutate(&self, id: i64, f: impl FnOnce(&mut Identity)) -> Result<Option<Identity>, ApiError> {
        let updated = self.update(id, f)?;
        Ok((!*self.without_body.lock()).then_some(updated))
    }

    fn update(&self, id: i64, f: impl FnOnce(&mut Identity)) -> Result<Identity, ApiError> {
        take_failure(&self.fail_next)?;
        let mut users = self.users.lock();
        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| not_found("User", id))?;
        f(user);
        Ok(user.clone())
    }
}

#[async_trait]
impl UsersApi for FakeUsers {
    async fn list(&self, page: PageRequest) -> Result<Page<Identity>, ApiError> {
        self.list_calls.lock().push(page);
        take_failure(&self.fail_next)?;
        Ok(paginate(&self.users.lock(), page))
    }

    async fn get(&self, id: i64) -> Result<Identity, ApiError> {
        self.update(id, |_| {})
    }

    async fn create(&self, new_identity: &NewIdentity) -> Result<Option<Identity>, ApiError> {
        take_failure(&self.fail_next)?;
        let mut users = self.users.lock();
        let id = users.iter().map(|u| u.id).max().unwrap_or(0) + 1;
        let mut created = user(id, new_identity.role);
        created.email = new_identity.email.clone();
        users.push(created.clone());
        Ok(Some(created))
    }

    async fn change_role(&self, id: i64, role: Role) -> Result<Option<Identity>, ApiError> {
        self.mutate(id, |u| u.role_name = role)
    }

    async fn toggle_lock(&self, id: i64) -> Result<Option<Identity>, ApiError> {
        self.mutate(id, |u| u.is_non_locked = !u.is_non_locked)
    }

    async fn toggle_enable(&self, id: i64) -> Result<Option<Identity>, ApiError> {
        self.mutate(id, |u| u.is_enabled = !u.is_enabled)
    }

    async fn delete(&self, id: i64) -> Result<(), ApiError> {
        take_failure(&self.fail_next)?;
        self.users.lock().retain(|u| u.id != id);
        Ok(())
    }
}
