// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # PostgreSQL Store Tests
//!
//! Run against the database named by `DATABASE_URL`:
//!
//! ```text
//! DATABASE_URL=postgres://localhost/wardrobe_test cargo test -p wardrobe-store --features postgres
//! ```
//!
//! Each test is a no-op when the variable is unset. Items are created fresh per
//! test and user ids are derived from the clock, so runs do not interfere.

#![cfg(feature = "postgres")]

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use wardrobe_core::error::ShopError;
use wardrobe_core::store::ShopStore;
use wardrobe_core::types::{ItemId, NewItem, OrderStatus, UserId};
use wardrobe_core::{BasketService, OrderService};
use wardrobe_store::PgStore;

async fn connect() -> Option<Arc<PgStore>> {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL is not set, skipping");
        return None;
    };
    let store = PgStore::connect(&url, 20, Duration::from_secs(10))
        .await
        .expect("database is reachable");
    store.migrate().await.expect("schema applies");
    Some(Arc::new(store))
}

async fn seed(store: &PgStore, price: i64, stock: u32) -> ItemId {
    store
        .insert_item(NewItem {
            category: "coat".into(),
            size: "S".into(),
            price,
            sex: "female".into(),
            image_id: None,
            brand_id: 2,
            stock,
        })
        .await
        .expect("item is created")
        .id
}

fn user_base() -> i64 {
    Utc::now().timestamp_micros() * 100
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_pg_concurrent_adds_never_oversell() {
    let Some(store) = connect().await else { return };
    let item_id = seed(&store, 100, 1).await;
    let baskets = BasketService::new(store.clone());
    let base = user_base();

    let tasks: Vec<_> = (0..16)
        .map(|n| {
            let baskets = baskets.clone();
            tokio::spawn(async move { baskets.add_item(UserId::new(base + n), item_id).await })
        })
        .collect();

    let mut granted = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(_) => granted += 1,
            Err(ShopError::ItemUnavailable { .. }) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
    assert_eq!(granted, 1);

    let item = store.item(item_id).await.unwrap().unwrap();
    assert_eq!(item.stock, 0);
    assert!(!item.is_available);
}

#[tokio::test]
async fn test_pg_second_dec_item_releases_nothing() {
    let Some(store) = connect().await else { return };
    let item_id = seed(&store, 100, 3).await;
    let baskets = BasketService::new(store.clone());
    let user = UserId::new(user_base());

    baskets.add_item(user, item_id).await.unwrap();
    baskets.dec_item(user, item_id).await.unwrap();
    let err = baskets.dec_item(user, item_id).await.unwrap_err();
    assert!(matches!(err, ShopError::LineNotFound { .. }));

    assert_eq!(store.item(item_id).await.unwrap().unwrap().stock, 3);
}

#[tokio::test]
async fn test_pg_pulled_item_stays_off_sale() {
    let Some(store) = connect().await else { return };
    let item_id = seed(&store, 100, 1).await;
    let baskets = BasketService::new(store.clone());
    let user = UserId::new(user_base());

    baskets.add_item(user, item_id).await.unwrap();
    store.set_stock(item_id, 0, true).await.unwrap();
    baskets.dec_item(user, item_id).await.unwrap();

    let item = store.item(item_id).await.unwrap().unwrap();
    assert_eq!(item.stock, 1);
    assert!(item.pulled);
    assert!(!item.is_available);
}

#[tokio::test]
async fn test_pg_commit_and_list() {
    let Some(store) = connect().await else { return };
    let jacket = seed(&store, 100, 5).await;
    let scarf = seed(&store, 30, 5).await;
    let baskets = BasketService::new(store.clone());
    let orders = OrderService::new(store.clone());
    let user = UserId::new(user_base());

    baskets.add_item(user, jacket).await.unwrap();
    baskets.add_item(user, jacket).await.unwrap();
    baskets.add_item(user, scarf).await.unwrap();
    let order = baskets.commit(user).await.unwrap();
    assert_eq!(order.price, 230);
    assert_eq!(order.status, OrderStatus::Committed);

    let mine = orders.list_for_user(user).await.unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].items.len(), 2);
    assert_eq!(mine[0].price, 230);

    assert!(matches!(
        baskets.get_basket(user).await,
        Err(ShopError::NoOpenBasket { .. })
    ));
}
