use std::sync::Arc;

use crate::contract::client::UsersApi;
use crate::contract::error::ApiError;
use crate::contract::model::{Identity, NewIdentity, Role};
use crate::views::state::{Confirm, Listing, Notice};

/// Account administration.
pub struct AdminUsersView {
    users: Arc<dyn UsersApi>,
    listing: Listing<Identity>,
}

impl AdminUsersView {
    pub fn new(users: Arc<dyn UsersApi>, page_size: u32) -> Self {
        Self {
            users,
            listing: Listing::new(page_size),
        }
    }

    pub fn listing(&self) -> &Listing<Identity> {
        &self.listing
    }

    pub fn listing_mut(&mut self) -> &mut Listing<Identity> {
        &mut self.listing
    }

    pub async fn reload(&mut self) {
        self.listing.begin_load();
        let result = self.users.list(self.listing.request()).await;
        self.listing.finish(result);
    }

    pub async fn set_page(&mut self, page: u32) {
        self.listing.set_page_index(page);
        self.reload().await;
    }

    pub async fn create(&mut self, new_identity: &NewIdentity) {
        let result = match new_identity.validate() {
            Ok(()) => self.users.create(new_identity).await,
            Err(e) => Err(e),
        };
        self.settle(result, "User created").await;
    }

    pub async fn change_role(&mut self, id: i64, role: Role) {
        let result = self.users.change_role(id, role).await;
        self.settle(result, "User role updated").await;
    }

    pub async fn toggle_lock(&mut self, id: i64) {
        let result = self.users.toggle_lock(id).await;
        self.settle(result, "User lock status updated").await;
    }

    pub async fn toggle_enable(&mut self, id: i64) {
        let result = self.users.toggle_enable(id).await;
        self.settle(result, "User activity status updated").await;
    }

    pub async fn delete(&mut self, id: i64, confirm: &dyn Confirm) {
        if !confirm.confirm(&format!("Delete user {id}?")) {
            self.listing.notify(Notice::info("Deletion cancelled"));
            return;
        }
        let result = self.users.delete(id).await;
        self.settle(result, "User deleted").await;
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
}
