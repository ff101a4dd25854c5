// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Catalog reads and administrative stock edits.

use std::sync::Arc;

use tracing::info;

use crate::error::{ShopError, ShopResult};
use crate::store::ShopStore;
use crate::types::{Item, ItemId, NewItem, Page};

/// Largest stock an administrator may set.
pub const MAX_STOCK: u32 = 1_000_000_000;

/// Catalog access.
#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn ShopStore>,
}

impl CatalogService {
    /// Creates a service over `store`.
    pub fn new(store: Arc<dyn ShopStore>) -> Self {
        Self { store }
    }

    /// Fetches one item.
    pub async fn item(&self, id: ItemId) -> ShopResult<Item> {
        self.store
            .item(id)
            .await?
            .ok_or_else(|| ShopError::not_found("item", id))
    }

    /// Lists items.
    pub async fn items(&self, page: Page) -> ShopResult<Vec<Item>> {
        Ok(self.store.items(page).await?)
    }

    /// Adds an item to the catalog.
    pub async fn create_item(&self, item: NewItem) -> ShopResult<Item> {
        if item.price < 0 {
            return Err(ShopError::validation("price must not be negative"));
        }
        check_stock(item.stock)?;
        let item = self.store.insert_item(item).await?;
        info!(item_id = %item.id, stock = item.stock, "Item created");
        Ok(item)
    }

    /// Sets the stock of an item.
    ///
    /// Availability follows the count unless `pull_from_sale` forces it off.
    /// A pulled item stays off sale until the next restock without the flag,
    /// even when basket releases bring its stock back above zero.
    pub async fn restock(&self, id: ItemId, stock: u32, pull_from_sale: bool) -> ShopResult<Item> {
        check_stock(stock)?;
        let item = self
            .store
            .set_stock(id, stock, pull_from_sale)
            .await?
            .ok_or_else(|| ShopError::not_found("item", id))?;
        info!(
            item_id = %id,
            stock,
            is_available = item.is_available,
            pulled = item.pulled,
            "Item restocked"
        );
        Ok(item)
    }
}

fn check_stock(stock: u32) -> ShopResult<()> {
    if stock > MAX_STOCK {
        return Err(ShopError::validation(format!(
            "stock must not exceed {MAX_STOCK}"
        )));
    }
    Ok(())
}
