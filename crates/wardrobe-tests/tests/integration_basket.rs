// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Basket Lifecycle Integration Tests
//!
//! Service-level scenarios run against `AppState` directly; the `test_http_*`
//! tests drive the same flow through the router.

use serde_json::json;

use wardrobe_core::catalog::MAX_STOCK;
use wardrobe_core::{ItemId, OrderStatus, ShopError, UserId};
use wardrobe_tests::prelude::*;

// =============================================================================
// Reservation
// =============================================================================

#[tokio::test]
async fn test_sold_out_item_persists_nothing() {
    let app = TestApp::new();
    let item = app.seed_item(100, 0).await;
    let user = UserId::new(1);

    let err = app.state.baskets.add_item(user, item.id).await.unwrap_err();
    assert!(matches!(err, ShopError::ItemUnavailable { item_id } if item_id == item.id));

    // The refused add must not leave an empty basket behind.
    let err = app.state.baskets.get_basket(user).await.unwrap_err();
    assert!(matches!(err, ShopError::NoOpenBasket { .. }));
}

#[tokio::test]
async fn test_unknown_item_is_unavailable() {
    let app = TestApp::new();

    let err = app
        .state
        .baskets
        .add_item(UserId::new(1), ItemId::new(404))
        .await
        .unwrap_err();
    assert!(matches!(err, ShopError::ItemUnavailable { .. }));
}

#[tokio::test]
async fn test_reserving_last_unit_takes_item_off_sale() {
    let app = TestApp::new();
    let item = app.seed_item(250, 2).await;
    let user = UserId::new(3);

    app.state.baskets.add_item(user, item.id).await.unwrap();
    let basket = app.state.baskets.add_item(user, item.id).await.unwrap();
    assert_eq!(basket.quantity_of(item.id), 2);
    assert_eq!(basket.price, 500);

    let current = app.item(&item).await;
    assert_eq!(current.stock, 0);
    assert!(!current.is_available);

    let err = app.state.baskets.add_item(user, item.id).await.unwrap_err();
    assert!(matches!(err, ShopError::ItemUnavailable { .. }));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_reservations_never_oversell() {
    const SHOPPERS: i64 = 16;

    let app = TestApp::new();
    let item = app.seed_item(100, 1).await;

    let handles: Vec<_> = (1..=SHOPPERS)
        .map(|n| {
            let baskets = app.state.baskets.clone();
            let item_id = item.id;
            tokio::spawn(async move { baskets.add_item(UserId::new(n), item_id).await })
        })
        .collect();

    let mut granted = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(basket) => {
                granted += 1;
                assert_eq!(basket.quantity_of(item.id), 1);
            }
            Err(ShopError::ItemUnavailable { .. }) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
    assert_eq!(granted, 1);

    let current = app.item(&item).await;
    assert_eq!(current.stock, 0);
    assert!(!current.is_available);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_reserve_and_release_conserve_stock() {
    const ROUNDS: i64 = 8;

    let app = TestApp::new();
    let item = app.seed_item(100, 4).await;

    let handles: Vec<_> = (1..=ROUNDS)
        .map(|n| {
            let baskets = app.state.baskets.clone();
            let item_id = item.id;
            tokio::spawn(async move {
                let user = UserId::new(n);
                if baskets.add_item(user, item_id).await.is_ok() {
                    baskets.dec_item(user, item_id).await.unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap();
    }

    let current = app.item(&item).await;
    assert_eq!(current.stock, 4);
    assert!(current.is_available);
}

// =============================================================================
// Lines
// =============================================================================

#[tokio::test]
async fn test_decrement_removes_line_then_fails() {
    let app = TestApp::new();
    let item = app.seed_item(100, 5).await;
    let user = UserId::new(7);

    app.state.baskets.add_item(user, item.id).await.unwrap();
    let basket = app.state.baskets.dec_item(user, item.id).await.unwrap();
    assert!(basket.items.is_empty());
    assert_eq!(app.item(&item).await.stock, 5);

    let err = app.state.baskets.dec_item(user, item.id).await.unwrap_err();
    assert!(matches!(err, ShopError::LineNotFound { .. }));
    assert_eq!(app.item(&item).await.stock, 5);
}

#[tokio::test]
async fn test_decrement_without_basket() {
    let app = TestApp::new();
    let item = app.seed_item(100, 5).await;

    let err = app
        .state
        .baskets
        .dec_item(UserId::new(8), item.id)
        .await
        .unwrap_err();
    assert!(matches!(err, ShopError::LineNotFound { .. }));
}

#[tokio::test]
async fn test_release_restores_sold_out_item() {
    let app = TestApp::new();
    let item = app.seed_item(100, 1).await;
    let user = UserId::new(9);

    app.state.baskets.add_item(user, item.id).await.unwrap();
    assert!(!app.item(&item).await.is_available);

    app.state.baskets.dec_item(user, item.id).await.unwrap();
    let current = app.item(&item).await;
    assert_eq!(current.stock, 1);
    assert!(current.is_available);
}

#[tokio::test]
async fn test_release_leaves_pulled_item_off_sale() {
    let app = TestApp::new();
    let item = app.seed_item(100, 1).await;
    let user = UserId::new(10);

    app.state.baskets.add_item(user, item.id).await.unwrap();
    app.state.catalog.restock(item.id, 0, true).await.unwrap();

    app.state.baskets.dec_item(user, item.id).await.unwrap();
    let current = app.item(&item).await;
    assert_eq!(current.stock, 1);
    assert!(current.pulled);
    assert!(!current.is_available);

    let err = app.state.baskets.add_item(user, item.id).await.unwrap_err();
    assert!(matches!(err, ShopError::ItemUnavailable { .. }));
}

#[tokio::test]
async fn test_basket_total_overflow_is_refused() {
    let app = TestApp::new();
    let price = i64::MAX / 2 + 1;
    let item = app.seed_item(price, 5).await;
    let user = UserId::new(11);

    app.state.baskets.add_item(user, item.id).await.unwrap();
    let err = app.state.baskets.add_item(user, item.id).await.unwrap_err();
    assert!(matches!(err, ShopError::Validation(_)));

    // The refused unit stays in stock.
    assert_eq!(app.item(&item).await.stock, 4);
    let basket = app.state.baskets.get_basket(user).await.unwrap();
    assert_eq!(basket.quantity_of(item.id), 1);
    assert_eq!(basket.price, price);
}

#[tokio::test]
async fn test_restock_is_bounded() {
    let app = TestApp::new();
    let item = app.seed_item(100, 1).await;
    let user = UserId::new(12);
    app.state.baskets.add_item(user, item.id).await.unwrap();

    let err = app
        .state
        .catalog
        .restock(item.id, u32::MAX, false)
        .await
        .unwrap_err();
    assert!(matches!(err, ShopError::Validation(_)));

    app.state
        .catalog
        .restock(item.id, MAX_STOCK, false)
        .await
        .unwrap();
    app.state.baskets.dec_item(user, item.id).await.unwrap();
    assert_eq!(app.item(&item).await.stock, MAX_STOCK + 1);
}

// =============================================================================
// Commit
// =============================================================================

#[tokio::test]
async fn test_commit_produces_order_and_closes_basket() {
    let app = TestApp::new();
    let jacket = app.seed_item(100, 5).await;
    let scarf = app
        .state
        .catalog
        .create_item(ItemFixtures::scarf(30, 5))
        .await
        .unwrap();
    let user = UserId::new(11);

    app.state.baskets.add_item(user, jacket.id).await.unwrap();
    app.state.baskets.add_item(user, jacket.id).await.unwrap();
    app.state.baskets.add_item(user, scarf.id).await.unwrap();

    let order = app.state.baskets.commit(user).await.unwrap();
    assert_eq!(order.status, OrderStatus::Committed);
    assert_eq!(order.user_id, user);
    assert_eq!(order.price, 230);
    assert_eq!(order.items.len(), 2);

    let err = app.state.baskets.get_basket(user).await.unwrap_err();
    assert!(matches!(err, ShopError::NoOpenBasket { .. }));

    // Committed stock stays reserved.
    assert_eq!(app.item(&jacket).await.stock, 3);

    // A new add opens a fresh basket.
    let next = app.state.baskets.add_item(user, jacket.id).await.unwrap();
    assert_ne!(next.id, order.id);
}

#[tokio::test]
async fn test_commit_preconditions() {
    let app = TestApp::new();
    let item = app.seed_item(100, 5).await;
    let user = UserId::new(12);

    let err = app.state.baskets.commit(user).await.unwrap_err();
    assert!(matches!(err, ShopError::NoOpenBasket { .. }));

    app.state.baskets.add_item(user, item.id).await.unwrap();
    app.state.baskets.dec_item(user, item.id).await.unwrap();
    let err = app.state.baskets.commit(user).await.unwrap_err();
    assert!(matches!(err, ShopError::EmptyBasket { .. }));
}

#[tokio::test]
async fn test_baskets_are_per_user() {
    let app = TestApp::new();
    let item = app.seed_item(100, 5).await;

    let first = app.state.baskets.add_item(UserId::new(20), item.id).await.unwrap();
    let second = app.state.baskets.add_item(UserId::new(21), item.id).await.unwrap();
    assert_ne!(first.id, second.id);
    assert_eq!(app.item(&item).await.stock, 3);
}

// =============================================================================
// Over HTTP
// =============================================================================

#[tokio::test]
async fn test_http_basket_to_delivered_order() {
    let app = TestApp::new();
    let (token, user_id) = app.shopper("shopper1").await;
    let admin = app.admin().await;
    let item = app.seed_item(100, 3).await;
    let line = format!("/basket/{}", item.id);

    let missing = app.get("/basket", Some(&token)).await;
    assert_error(&missing, StatusCode::NOT_FOUND, "NO_OPEN_BASKET");

    assert_status(&app.post(&line, Some(&token), None).await, StatusCode::OK);
    let added = app.post(&line, Some(&token), None).await;
    assert_status(&added, StatusCode::OK);
    assert_eq!(added.body["price"], 200);

    let removed = app.delete(&line, Some(&token)).await;
    assert_status(&removed, StatusCode::OK);
    assert_eq!(removed.body["items"][0]["quantity"], 1);

    let basket = app.get("/basket", Some(&token)).await;
    assert_status(&basket, StatusCode::OK);
    assert_eq!(basket.body["price"], 100);

    let committed = app.post("/orders", Some(&token), None).await;
    assert_status(&committed, StatusCode::CREATED);
    assert_eq!(committed.body["status"], "committed");
    assert_eq!(committed.body["user_id"], user_id.get());
    let order_id = committed.body["id"].as_i64().unwrap();
    let order_path = format!("/orders/{}", order_id);

    let mine = app.get("/orders/my", Some(&token)).await;
    assert_status(&mine, StatusCode::OK);
    assert_eq!(mine.body["data"].as_array().unwrap().len(), 1);
    assert_eq!(mine.body["data"][0]["id"], order_id);

    let shipped = app
        .patch(&order_path, Some(&admin), json!({ "status": "shipped" }))
        .await;
    assert_status(&shipped, StatusCode::OK);
    assert_eq!(shipped.body["status"], "shipped");

    let backwards = app
        .patch(&order_path, Some(&admin), json!({ "status": "committed" }))
        .await;
    assert_error(&backwards, StatusCode::BAD_REQUEST, "INVALID_TRANSITION");

    let delivered = app
        .patch(&order_path, Some(&admin), json!({ "status": "delivered" }))
        .await;
    assert_status(&delivered, StatusCode::OK);

    let fetched = app.get(&order_path, Some(&admin)).await;
    assert_status(&fetched, StatusCode::OK);
    assert_eq!(fetched.body["status"], "delivered");
    assert_eq!(fetched.body["price"], 100);
}

#[tokio::test]
async fn test_http_lifecycle_errors() {
    let app = TestApp::new();
    let (token, _) = app.shopper("shopper2").await;
    let item = app.seed_item(100, 0).await;

    let sold_out = app
        .post(&format!("/basket/{}", item.id), Some(&token), None)
        .await;
    assert_error(&sold_out, StatusCode::BAD_REQUEST, "ITEM_UNAVAILABLE");
    assert_eq!(sold_out.body["error"]["details"]["item_id"], item.id.get());

    let no_line = app
        .delete(&format!("/basket/{}", item.id), Some(&token))
        .await;
    assert_error(&no_line, StatusCode::BAD_REQUEST, "LINE_NOT_FOUND");

    let nothing = app.post("/orders", Some(&token), None).await;
    assert_error(&nothing, StatusCode::NOT_FOUND, "NO_OPEN_BASKET");

    let bad_id = app.post("/basket/not-a-number", Some(&token), None).await;
    assert_error(&bad_id, StatusCode::BAD_REQUEST, "BAD_REQUEST");

    let pricey = app.seed_item(i64::MAX / 2 + 1, 2).await;
    let path = format!("/basket/{}", pricey.id);
    assert_status(&app.post(&path, Some(&token), None).await, StatusCode::OK);
    let overflow = app.post(&path, Some(&token), None).await;
    assert_error(&overflow, StatusCode::BAD_REQUEST, "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_http_admin_order_listing_filters_by_user() {
    let app = TestApp::new();
    let admin = app.admin().await;
    let item = app.seed_item(10, 10).await;

    let mut shoppers = Vec::new();
    for login in ["listing1", "listing2"] {
        let (token, user_id) = app.shopper(login).await;
        app.post(&format!("/basket/{}", item.id), Some(&token), None)
            .await;
        assert_status(
            &app.post("/orders", Some(&token), None).await,
            StatusCode::CREATED,
        );
        shoppers.push(user_id);
    }

    let all = app.get("/orders", Some(&admin)).await;
    assert_status(&all, StatusCode::OK);
    assert_eq!(all.body["data"].as_array().unwrap().len(), 2);

    let path = format!("/orders?user_id={}", shoppers[0]);
    let one = app.get(&path, Some(&admin)).await;
    assert_status(&one, StatusCode::OK);
    let data = one.body["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["user_id"], shoppers[0].get());

    let missing = app.get("/orders/9999", Some(&admin)).await;
    assert_error(&missing, StatusCode::NOT_FOUND, "NOT_FOUND");
}
