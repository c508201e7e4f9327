use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::contract::error::ApiError;

macro_rules! wire_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $wire:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $wire)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $wire),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ApiError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(wanted))
                    .ok_or_else(|| {
                        ApiError::precondition(format!(
                            "Unknown {} '{}'",
                            stringify!($name),
                            wanted
                        ))
                    })
            }
        }
    };
}

wire_enum! {
    /// Closed set of account roles.
    Role { User => "USER", Admin => "ADMIN" }
}

wire_enum! {
    CardStatus { Active => "ACTIVE", Blocked => "BLOCKED", Expired => "EXPIRED" }
}

wire_enum! {
    BlockStatus { Pending => "PENDING", Approved => "APPROVED", Rejected => "REJECTED" }
}

/// Card expiry as a calendar month, `YYYY-MM` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ExpiryMonth {
    year: i32,
    month: u32,
}

impl ExpiryMonth {
    pub fn new(year: i32, month: u32) -> Result<Self, ApiError> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(|_| Self { year, month })
            .ok_or_else(|| ApiError::precondition(format!("Invalid expiry month {year}-{month}")))
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }
}

impl fmt::Display for ExpiryMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for ExpiryMonth {
    type Err = ApiError;

    /// Accepts `YYYY-MM`, and `YYYY-MM-DD` as sent by date-typed backends.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || ApiError::precondition(format!("Expiry must be YYYY-MM, got '{s}'"));

        if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            return Self::new(chrono::Datelike::year(&date), chrono::Datelike::month(&date));
        }

        let (year, month) = s.split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.is_empty() || month.len() > 2 {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        Self::new(year, month)
    }
}

impl Serialize for ExpiryMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ExpiryMonth {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Authenticated account as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id: i64,
    pub email: String,
    pub role_name: Role,
    pub is_enabled: bool,
    /// Inverted lock flag: `false` means the account is locked.
    pub is_non_locked: bool,
    #[serde(default)]
    pub cards: Vec<Card>,
}

impl Identity {
    pub fn is_admin(&self) -> bool {
        self.role_name == Role::Admin
    }

    pub fn is_locked(&self) -> bool {
        !self.is_non_locked
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: i64,
    /// Display-only, never the real PAN.
    pub masked_card_number: String,
    pub owner_email: String,
    pub expiry_date: ExpiryMonth,
    pub status_name: CardStatus,
    pub balance: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockRequest {
    pub id: i64,
    pub request_date: String,
    pub card_id: i64,
    pub user_id: i64,
    pub status: BlockStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_comment: Option<String>,
}

impl BlockRequest {
    pub fn is_pending(&self) -> bool {
        self.status == BlockStatus::Pending
    }

    /// Calendar day of the request, whatever timestamp flavour the server used.
    pub fn requested_on(&self) -> Option<NaiveDate> {
        let raw = self.request_date.trim();
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.date_naive())
            .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").map(|dt| dt.date()))
            .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
            .ok()
    }
}

/// A bounded slice of a server-side result set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub total_elements: u64,
    pub total_pages: u32,
    pub size: u32,
    pub number: u32,
}

impl<T> Page<T> {
    /// Create an empty page with the given size
    pub fn empty(size: u32) -> Self {
        Self {
            content: Vec::new(),
            total_elements: 0,
            total_pages: 0,
            size,
            number: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// `content.len() <= size` and `number < total_pages` (or no pages at all).
    pub fn is_consistent(&self) -> bool {
        let fits = self.content.len() <= self.size as usize;
        let in_range = self.total_pages == 0 || self.number < self.total_pages;
        fits && in_range
    }

    /// Map items while preserving paging metadata.
    pub fn map_items<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            total_elements: self.total_elements,
            total_pages: self.total_pages,
            size: self.size,
            number: self.number,
        }
    }
}

/// Zero-based page index plus page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
}

impl PageRequest {
    pub const DEFAULT_SIZE: u32 = 10;

    pub fn new(page: u32, size: u32) -> Self {
        Self { page, size }
    }

    pub fn first(size: u32) -> Self {
        Self::new(0, size)
    }

    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![("page", self.page.to_string()), ("size", self.size.to_string())]
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(0, Self::DEFAULT_SIZE)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ApiError> {
        if self.email.trim().is_empty() || self.password.is_empty() {
            return Err(ApiError::precondition("Email and password are required"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: Identity,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewIdentity {
    pub email: String,
    pub password: String,
    pub role: Role,
}

impl NewIdentity {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.email.trim().is_empty() || self.password.is_empty() {
            return Err(ApiError::precondition("Email and password are required"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RoleChange {
    pub role: Role,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCard {
    pub user_id: i64,
    pub expiry_date: ExpiryMonth,
    pub status: CardStatus,
    #[serde(with = "rust_decimal::serde::float")]
    pub balance: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusChange {
    pub status: CardStatus,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpiryChange {
    pub expiry_date: ExpiryMonth,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    pub from_card_id: i64,
    pub to_card_id: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
}

impl TransferRequest {
    pub const SAME_CARD_MESSAGE: &'static str = "Cannot transfer to the same card";

    pub fn validate(&self) -> Result<(), ApiError> {
        if self.from_card_id == self.to_card_id {
            return Err(ApiError::precondition(Self::SAME_CARD_MESSAGE));
        }
        if self.amount <= Decimal::ZERO {
            return Err(ApiError::precondition("Amount must be greater than zero"));
        }
        Ok(())
    }
}

/// Whatever the backend said about a completed transfer, if anything.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TransferReceipt {
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBlockRequest {
    pub card_id: i64,
}
