use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::info;

use crate::contract::client::CardsApi;
use crate::contract::error::ApiError;
use crate::contract::filter::CardFilter;
use crate::contract::model::{Card, PageRequest, TransferRequest};
use crate::views::state::{LoadState, Notice};

/// Source and destination choices come from one page of this size.
pub const CARD_CHOICES: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    NoCards,
    NeedMoreCards,
    Ready,
}

/// Transfer form fields; every one is required.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferForm {
    pub from_card_id: Option<i64>,
    pub to_card_id: Option<i64>,
    pub amount: Option<Decimal>,
}

/// Money movement between the signed-in user's own cards.
pub struct TransferView {
    cards: Arc<dyn CardsApi>,
    state: LoadState,
    own_cards: Vec<Card>,
    form: TransferForm,
    notices: Vec<Notice>,
}

impl TransferView {
    pub fn new(cards: Arc<dyn CardsApi>) -> Self {
        Self {
            cards,
            state: LoadState::Idle,
            own_cards: Vec::new(),
            form: TransferForm::default(),
            notices: Vec::new(),
        }
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn own_cards(&self) -> &[Card] {
        &self.own_cards
    }

    pub fn form_mut(&mut self) -> &mut TransferForm {
        &mut self.form
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub async fn reload(&mut self) {
        self.state = LoadState::Loading;
        let page = PageRequest::first(CARD_CHOICES);
        match self.cards.list_mine(page, &CardFilter::default()).await {
            Ok(page) => {
                self.own_cards = page.content;
                self.state = LoadState::Loaded;
            }
            Err(e) => {
                self.state = LoadState::Errored;
                self.notices.push(Notice::from(&e));
            }
        }
    }

    pub fn availability(&self) -> Availability {
        match self.own_cards.len() {
            0 => Availability::NoCards,
            1 => Availability::NeedMoreCards,
            _ => Availability::Ready,
        }
    }

    fn validated(&self) -> Result<TransferRequest, ApiError> {
        let (Some(from), Some(to), Some(amount)) =
            (self.form.from_card_id, self.form.to_card_id, self.form.amount)
        else {
            return Err(ApiError::precondition("Please fill in all fields"));
        };
        if from == to {
            return Err(ApiError::precondition(TransferRequest::SAME_CARD_MESSAGE));
        }
        if amount < Decimal::new(1, 2) {
            return Err(ApiError::precondition("Amount must be at least 0.01"));
        }
        Ok(TransferRequest {
            from_card_id: from,
            to_card_id: to,
            amount,
        })
    }

    /// Send the filled-in form. Success clears it and refreshes balances.
    pub async fn submit(&mut self) {
        let request = match self.validated() {
            Ok(request) => request,
            Err(e) => {
                self.notices.push(Notice::from(&e));
                return;
            }
        };

        match self.cards.transfer(&request).await {
            Ok(receipt) => {
                info!(
                    from = request.from_card_id,
                    to = request.to_card_id,
                    "transfer completed"
                );
                let text = receipt
                    .message
                    .unwrap_or_else(|| "Transfer completed".to_string());
                self.notices.push(Notice::success(text));
                self.form = TransferForm::default();
                self.reload().await;
            }
            Err(e) => self.notices.push(Notice::from(&e)),
        }
    }
}
