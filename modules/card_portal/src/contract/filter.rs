use rust_decimal::Decimal;

use crate::contract::model::CardStatus;

/// Optional card search criteria. Every field is independent.
///
/// Only present fields reach the query string: the backend reads an empty
/// parameter as "match the empty string", which is not the same as no filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardFilter {
    pub last_four_digits: Option<String>,
    pub status: Option<CardStatus>,
    pub min_balance: Option<Decimal>,
    pub max_balance: Option<Decimal>,
}

impl CardFilter {
    pub fn with_last_four_digits(mut self, digits: impl Into<String>) -> Self {
        self.last_four_digits = Some(digits.into());
        self
    }

    pub fn with_status(mut self, status: CardStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_min_balance(mut self, min: Decimal) -> Self {
        self.min_balance = Some(min);
        self
    }

    pub fn with_max_balance(mut self, max: Decimal) -> Self {
        self.max_balance = Some(max);
        self
    }

    /// Same filter with blank text fields folded into "absent".
    pub fn normalized(&self) -> Self {
        Self {
            last_four_digits: self
                .last_four_digits
                .as_deref()
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_owned),
            ..self.clone()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.normalized() == Self::default()
    }

    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let f = self.normalized();
        let mut pairs = Vec::new();
        if let Some(digits) = f.last_four_digits {
            pairs.push(("lastFourDigits", digits));
        }
        if let Some(status) = f.status {
            pairs.push(("status", status.to_string()));
        }
        if let Some(min) = f.min_balance {
            pairs.push(("minBalance", min.to_string()));
        }
        if let Some(max) = f.max_balance {
            pairs.push(("maxBalance", max.to_string()));
        }
        pairs
    }
}
