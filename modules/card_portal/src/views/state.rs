//! Building blocks shared by every screen: load state, paging, notices and
//! the delete confirmation seam.

use std::fmt;

use tracing::warn;

use crate::contract::error::ApiError;
use crate::contract::model::{Page, PageRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loading,
    Loaded,
    Errored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Info,
    Error,
}

/// A one-shot message for the user, the terminal stand-in for a toast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            text: text.into(),
        }
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            text: text.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}

impl From<&ApiError> for Notice {
    fn from(err: &ApiError) -> Self {
        Self::error(err.to_string())
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Previous/next availability for the current page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageNav {
    pub page: u32,
    pub total_pages: u32,
    pub prev_disabled: bool,
    pub next_disabled: bool,
}

impl PageNav {
    pub fn new(page: u32, total_pages: u32) -> Self {
        // Signed so that zero pages disables "next" instead of wrapping.
        let last = i64::from(total_pages) - 1;
        Self {
            page,
            total_pages,
            prev_disabled: page == 0,
            next_disabled: i64::from(page) >= last,
        }
    }
}

/// Asked before anything is deleted.
pub trait Confirm: Send + Sync {
    fn confirm(&self, prompt: &str) -> bool;
}

/// A confirmation with a predetermined answer (`--yes`, tests).
#[derive(Debug, Clone, Copy)]
pub struct FixedAnswer(pub bool);

impl Confirm for FixedAnswer {
    fn confirm(&self, _prompt: &str) -> bool {
        self.0
    }
}

/// One paginated list plus the notices produced while working with it.
#[derive(Debug, Clone)]
pub struct Listing<T> {
    page: u32,
    size: u32,
    state: LoadState,
    current: Option<Page<T>>,
    notices: Vec<Notice>,
}

impl<T> Listing<T> {
    pub fn new(size: u32) -> Self {
        Self {
            page: 0,
            size: size.max(1),
            state: LoadState::Idle,
            current: None,
            notices: Vec::new(),
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn current(&self) -> Option<&Page<T>> {
        self.current.as_ref()
    }

    pub fn items(&self) -> &[T] {
        self.current.as_ref().map_or(&[], |p| p.content.as_slice())
    }

    /// Loaded successfully and nothing came back.
    pub fn is_empty(&self) -> bool {
        self.state == LoadState::Loaded && self.items().is_empty()
    }

    pub fn nav(&self) -> PageNav {
        PageNav::new(self.page, self.current.as_ref().map_or(0, |p| p.total_pages))
    }

    pub fn request(&self) -> PageRequest {
        PageRequest::new(self.page, self.size)
    }

    pub(crate) fn set_page_index(&mut self, page: u32) {
        self.page = page;
    }

    pub(crate) fn begin_load(&mut self) {
        self.state = LoadState::Loading;
    }

    /// Settle a load. A failure keeps the previous page on screen.
    pub(crate) fn finish(&mut self, result: Result<Page<T>, ApiError>) {
        match result {
            Ok(page) => {
                if !page.is_consistent() {
                    warn!(
                        number = page.number,
                        total_pages = page.total_pages,
                        size = page.size,
                        items = page.content.len(),
                        "server returned an inconsistent page"
                    );
                }
                self.current = Some(page);
                self.state = LoadState::Loaded;
            }
            Err(e) => {
                self.state = LoadState::Errored;
                self.notices.push(Notice::from(&e));
            }
        }
    }

    pub fn notify(&mut self, notice: Notice) {
        self.notices.push(notice);
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }
}
