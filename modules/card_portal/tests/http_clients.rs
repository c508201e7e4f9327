//! Resource clients against a mock backend: paths, query strings and bodies.

mod common;

use std::sync::Arc;

use card_portal::contract::client::{CardBlocksApi, CardsApi, UsersApi};
use card_portal::contract::filter::CardFilter;
use card_portal::contract::model::{
    BlockStatus, CardStatus, ExpiryMonth, NewCard, PageRequest, Role, TransferRequest,
};
use card_portal::gateways::{HttpCardBlocksClient, HttpCardsClient, HttpUsersClient};
use card_portal::infra::http::{NoToken, RequestGateway};
use common::{block_json, card_json, config_for, identity_json, page_json};
use httpmock::prelude::*;
use rust_decimal::Decimal;
use serde_json::json;

fn gateway(server: &MockServer) -> Arc<RequestGateway> {
    Arc::new(RequestGateway::from_config(&config_for(server), Arc::new(NoToken)).unwrap())
}

#[tokio::test]
async fn unfiltered_card_list_sends_only_paging() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/api/card/my")
            .query_param("page", "0")
            .query_param("size", "10")
            .query_param_missing("lastFourDigits")
            .query_param_missing("status")
            .query_param_missing("minBalance")
            .query_param_missing("maxBalance");
        then.status(200)
            .json_body(page_json(vec![card_json(1, "ACTIVE", 12.5)], 1, 0));
    });

    let client = HttpCardsClient::new(gateway(&server));
    let page = client
        .list_mine(PageRequest::default(), &CardFilter::default())
        .await
        .unwrap();

    mock.assert();
    assert_eq!(page.content[0].balance, Decimal::new(125, 1));
    assert_eq!(page.content[0].expiry_date.to_string(), "2028-04");
}

#[tokio::test]
async fn filtered_admin_list_sends_present_fields_only() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/api/card")
            .query_param("page", "2")
            .query_param("size", "5")
            .query_param("status", "BLOCKED")
            .query_param("minBalance", "100")
            .query_param_missing("lastFourDigits")
            .query_param_missing("maxBalance");
        then.status(200).json_body(page_json(vec![], 0, 2));
    });

    let client = HttpCardsClient::new(gateway(&server));
    let filter = CardFilter::default()
        .with_status(CardStatus::Blocked)
        .with_min_balance(Decimal::new(100, 0))
        .with_last_four_digits("");
    let page = client.list_all(PageRequest::new(2, 5), &filter).await.unwrap();

    mock.assert();
    assert!(page.is_empty());
}

#[tokio::test]
async fn same_card_transfer_never_reaches_the_server() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.any_request();
        then.status(200);
    });

    let client = HttpCardsClient::new(gateway(&server));
    let err = client
        .transfer(&TransferRequest {
            from_card_id: 3,
            to_card_id: 3,
            amount: Decimal::new(10, 0),
        })
        .await
        .unwrap_err();

    assert!(err.is_precondition());
    assert_eq!(err.to_string(), "Cannot transfer to the same card");
    mock.assert_hits(0);
}

#[tokio::test]
async fn transfer_posts_amount_as_a_number_and_keeps_the_message() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/api/card/transfer")
            .json_body(json!({"fromCardId": 1, "toCardId": 2, "amount": 25.5}));
        then.status(200).body("Transfer successful");
    });

    let client = HttpCardsClient::new(gateway(&server));
    let receipt = client
        .transfer(&TransferRequest {
            from_card_id: 1,
            to_card_id: 2,
            amount: Decimal::new(255, 1),
        })
        .await
        .unwrap();

    mock.assert();
    assert_eq!(receipt.message.as_deref(), Some("Transfer successful"));
}

#[tokio::test]
async fn card_admin_mutations_use_the_documented_routes() {
    let server = MockServer::start();
    let create = server.mock(|when, then| {
        when.method(POST).path("/api/card").json_body(json!({
            "userId": 4,
            "expiryDate": "2030-09",
            "status": "ACTIVE",
            "balance": 0.0
        }));
        then.status(201).json_body(card_json(9, "ACTIVE", 0.0));
    });
    let status = server.mock(|when, then| {
        when.method(PATCH)
            .path("/api/card/9/status")
            .json_body(json!({"status": "EXPIRED"}));
        then.status(200).json_body(card_json(9, "EXPIRED", 0.0));
    });
    let expiry = server.mock(|when, then| {
        when.method(PATCH)
            .path("/api/card/9/expiry")
            .json_body(json!({"expiryDate": "2031-01"}));
        then.status(200).json_body(card_json(9, "ACTIVE", 0.0));
    });
    let delete = server.mock(|when, then| {
        when.method(DELETE).path("/api/card/9");
        then.status(204);
    });

    let client = HttpCardsClient::new(gateway(&server));
    client
        .create(&NewCard {
            user_id: 4,
            expiry_date: ExpiryMonth::new(2030, 9).unwrap(),
            status: CardStatus::Active,
            balance: Decimal::ZERO,
        })
        .await
        .unwrap();
    let changed = client
        .change_status(9, CardStatus::Expired)
        .await
        .unwrap()
        .unwrap();
    client
        .change_expiry(9, ExpiryMonth::new(2031, 1).unwrap())
        .await
        .unwrap();
    client.delete(9).await.unwrap();

    create.assert();
    status.assert();
    expiry.assert();
    delete.assert();
    assert_eq!(changed.status_name, CardStatus::Expired);
}

#[tokio::test]
async fn block_decisions_carry_the_comment_in_the_query() {
    let server = MockServer::start();
    let reject = server.mock(|when, then| {
        when.method(PATCH)
            .path("/api/cardBlock/8/reject")
            .query_param("comment", "card is fine");
        then.status(200)
            .json_body(block_json(8, "REJECTED", Some("card is fine")));
    });

    let client = HttpCardBlocksClient::new(gateway(&server));
    let blank = client.approve(8, "  ").await.unwrap_err();
    let decided = client.reject(8, "card is fine").await.unwrap().unwrap();

    assert!(blank.is_precondition());
    reject.assert();
    assert_eq!(decided.status, BlockStatus::Rejected);
    assert_eq!(decided.admin_comment.as_deref(), Some("card is fine"));
}

#[tokio::test]
async fn block_request_creation_and_single_reads() {
    let server = MockServer::start();
    let create = server.mock(|when, then| {
        when.method(POST)
            .path("/api/cardBlock")
            .json_body(json!({"cardId": 42}));
        then.status(201).json_body(block_json(2, "PENDING", None));
    });
    let mine = server.mock(|when, then| {
        when.method(GET).path("/api/cardBlock/2/my");
        then.status(200).json_body(block_json(2, "PENDING", None));
    });
    let missing = server.mock(|when, then| {
        when.method(GET).path("/api/cardBlock/3");
        then.status(404).json_body(json!({"message": "Card block not found"}));
    });

    let client = HttpCardBlocksClient::new(gateway(&server));
    let created = client.create(42).await.unwrap().unwrap();
    let fetched = client.get_mine(2).await.unwrap();
    let err = client.get(3).await.unwrap_err();

    create.assert();
    mine.assert();
    missing.assert();
    assert_eq!(created, fetched);
    assert!(created.is_pending());
    assert_eq!(err.status_code(), Some(404));
    assert_eq!(err.to_string(), "Card block not found");
}

#[tokio::test]
async fn user_administration_routes() {
    let server = MockServer::start();
    let list = server.mock(|when, then| {
        when.method(GET)
            .path("/api/user")
            .query_param("page", "1")
            .query_param("size", "10");
        then.status(200)
            .json_body(page_json(vec![identity_json(11, "USER")], 2, 1));
    });
    let role = server.mock(|when, then| {
        when.method(PATCH)
            .path("/api/user/11/role")
            .json_body(json!({"role": "ADMIN"}));
        then.status(200).json_body(identity_json(11, "ADMIN"));
    });
    let lock = server.mock(|when, then| {
        when.method(PATCH).path("/api/user/11/toggleLock");
        then.status(200).json_body(identity_json(11, "ADMIN"));
    });
    let enable = server.mock(|when, then| {
        when.method(PATCH).path("/api/user/11/toggleEnable");
        then.status(200).json_body(identity_json(11, "ADMIN"));
    });
    let delete = server.mock(|when, then| {
        when.method(DELETE).path("/api/user/11");
        then.status(200);
    });

    let client = HttpUsersClient::new(gateway(&server));
    let page = client.list(PageRequest::new(1, 10)).await.unwrap();
    let promoted = client.change_role(11, Role::Admin).await.unwrap().unwrap();
    client.toggle_lock(11).await.unwrap();
    client.toggle_enable(11).await.unwrap();
    client.delete(11).await.unwrap();

    list.assert();
    role.assert();
    lock.assert();
    enable.assert();
    delete.assert();
    assert_eq!(page.number, 1);
    assert!(promoted.is_admin());
}

#[tokio::test]
async fn mutations_accept_no_content_replies() {
    let server = MockServer::start();
    let approve = server.mock(|when, then| {
        when.method(PATCH)
            .path("/api/cardBlock/5/approve")
            .query_param("comment", "ok");
        then.status(204);
    });
    let lock = server.mock(|when, then| {
        when.method(PATCH).path("/api/user/11/toggleLock");
        then.status(200);
    });
    let status = server.mock(|when, then| {
        when.method(PATCH).path("/api/card/9/status");
        then.status(204);
    });

    let gw = gateway(&server);
    let approved = HttpCardBlocksClient::new(gw.clone()).approve(5, "ok").await.unwrap();
    let locked = HttpUsersClient::new(gw.clone()).toggle_lock(11).await.unwrap();
    let blocked = HttpCardsClient::new(gw)
        .change_status(9, CardStatus::Blocked)
        .await
        .unwrap();

    approve.assert();
    lock.assert();
    status.assert();
    assert!(approved.is_none());
    assert!(locked.is_none());
    assert!(blocked.is_none());
}
