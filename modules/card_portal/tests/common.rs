#![allow(dead_code)]

use std::sync::Arc;

use card_portal::infra::storage::MemoryStore;
use card_portal::{CardPortal, PortalConfig};
use httpmock::MockServer;
use serde_json::{json, Value};

pub fn config_for(server: &MockServer) -> PortalConfig {
    PortalConfig::with_base_url(server.url("/api"))
}

pub fn portal(server: &MockServer, store: Arc<MemoryStore>) -> CardPortal {
    CardPortal::new(config_for(server), store).expect("portal")
}

pub fn identity_json(id: i64, role: &str) -> Value {
    json!({
        "id": id,
        "email": format!("user{id}@bank.test"),
        "roleName": role,
        "isEnabled": true,
        "isNonLocked": true,
        "cards": []
    })
}

pub fn card_json(id: i64, status: &str, balance: f64) -> Value {
    json!({
        "id": id,
        "maskedCardNumber": format!("**** **** **** {:04}", id),
        "ownerEmail": "user1@bank.test",
        "expiryDate": "2028-04",
        "statusName": status,
        "balance": balance
    })
}

pub fn block_json(id: i64, status: &str, comment: Option<&str>) -> Value {
    json!({
        "id": id,
        "requestDate": "2025-03-01T09:30:00",
        "cardId": 40 + id,
        "userId": 1,
        "status": status,
        "adminComment": comment
    })
}

pub fn page_json(content: Vec<Value>, total_pages: u32, number: u32) -> Value {
    json!({
        "totalElements": content.len(),
        "content": content,
        "totalPages": total_pages,
        "size": 10,
        "number": number
    })
}

pub fn auth_json(token: &str, user: Value) -> Value {
    json!({ "token": token, "user": user })
}
