// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! PostgreSQL store implementation.
//!
//! # Locking
//!
//! - The open basket row is taken `FOR UPDATE` before any stock row.
//! - A reservation is one conditional `UPDATE` on the item row; concurrent
//!   reservations of the same item queue on that row lock and re-check the
//!   predicate after the winner commits.
//! - A partial unique index keeps at most one `cart` row per user.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{FromRow, PgPool, Postgres, Row, Transaction, query, query_as};
use tracing::{debug, info};

use wardrobe_core::error::{StoreError, StoreResult};
use wardrobe_core::store::{BasketLedger, Reservation, ShopStore, ShopTransaction, StockLedger};
use wardrobe_core::types::{
    total_price, Basket, Item, ItemId, NewItem, NewUser, Order, OrderFilter, OrderId, OrderItem,
    OrderStatus, Page, Role, User, UserId,
};

const SCHEMA_SQL: &str = include_str!("../sql/schema.sql");
const RESERVE_ITEM_SQL: &str = include_str!("../sql/reserve_item.sql");
const RELEASE_ITEM_SQL: &str = include_str!("../sql/release_item.sql");
const LOCK_OPEN_BASKET_SQL: &str = include_str!("../sql/lock_open_basket.sql");
const CREATE_OPEN_BASKET_SQL: &str = include_str!("../sql/create_open_basket.sql");
const GET_ORDER_LINES_SQL: &str = include_str!("../sql/get_order_lines.sql");
const CLOSE_BASKET_SQL: &str = include_str!("../sql/close_basket.sql");
const GET_ORDERS_SQL: &str = include_str!("../sql/get_orders.sql");

const ITEM_COLUMNS: &str =
    "id, category, size, price, sex, image_id, brand_id, is_available, pulled, stock";

// =============================================================================
// Row mapping
// =============================================================================

struct ItemRow(Item);

impl<'r> FromRow<'r, PgRow> for ItemRow {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self(Item {
            id: ItemId::new(row.try_get("id")?),
            category: row.try_get("category")?,
            size: row.try_get("size")?,
            price: row.try_get("price")?,
            sex: row.try_get("sex")?,
            image_id: row.try_get("image_id")?,
            brand_id: row.try_get("brand_id")?,
            is_available: row.try_get("is_available")?,
            pulled: row.try_get("pulled")?,
            stock: try_get_count(row, "stock")?,
        }))
    }
}

struct LineRow(OrderItem);

impl<'r> FromRow<'r, PgRow> for LineRow {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self(OrderItem {
            item_id: ItemId::new(row.try_get("item_id")?),
            quantity: try_get_count(row, "quantity")?,
            unit_price: row.try_get("unit_price")?,
        }))
    }
}

struct UserRow(User);

impl<'r> FromRow<'r, PgRow> for UserRow {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let role: String = row.try_get("role")?;
        Ok(Self(User {
            id: UserId::new(row.try_get("id")?),
            login: row.try_get("login")?,
            name: row.try_get("name")?,
            role: role
                .parse::<Role>()
                .map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
            password_hash: row.try_get("password_hash")?,
        }))
    }
}

fn try_get_count(row: &PgRow, column: &str) -> sqlx::Result<u32> {
    let value: i64 = row.try_get(column)?;
    u32::try_from(value).map_err(|e| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })
}

/// One row of `get_orders.sql`: an order joined with one of its lines, or with
/// `NULL` line columns when the order has none.
#[derive(Debug, Clone, PartialEq)]
struct OrderLineRow {
    id: i64,
    user_id: i64,
    status: String,
    commit_date: Option<DateTime<Utc>>,
    price: i64,
    item_id: Option<i64>,
    quantity: Option<i64>,
    unit_price: Option<i64>,
}

impl<'r> FromRow<'r, PgRow> for OrderLineRow {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            status: row.try_get("status")?,
            commit_date: row.try_get("commit_date")?,
            price: row.try_get("price")?,
            item_id: row.try_get("item_id")?,
            quantity: row.try_get("quantity")?,
            unit_price: row.try_get("unit_price")?,
        })
    }
}

/// Folds joined rows, grouped by order, into orders.
fn fold_orders(rows: Vec<OrderLineRow>) -> StoreResult<Vec<Order>> {
    let mut orders: Vec<Order> = Vec::new();
    for row in rows {
        let id = OrderId::new(row.id);
        if orders.last().is_none_or(|order| order.id != id) {
            let status = row
                .status
                .parse::<OrderStatus>()
                .map_err(|e| StoreError::corrupt(format!("order {id}: {e}")))?;
            let date = row
                .commit_date
                .ok_or_else(|| StoreError::corrupt(format!("order {id} has no commit date")))?;
            orders.push(Order {
                id,
                date,
                user_id: UserId::new(row.user_id),
                items: Vec::new(),
                price: row.price,
                status,
            });
        }

        let Some(item_id) = row.item_id else {
            continue;
        };
        let (Some(quantity), Some(unit_price)) = (row.quantity, row.unit_price) else {
            return Err(StoreError::corrupt(format!("order {id} has a partial line")));
        };
        let quantity = u32::try_from(quantity)
            .map_err(|_| StoreError::corrupt(format!("order {id}: quantity {quantity} out of range")))?;
        if let Some(order) = orders.last_mut() {
            order.items.push(OrderItem {
                item_id: ItemId::new(item_id),
                quantity,
                unit_price,
            });
        }
    }
    Ok(orders)
}

fn store_error(context: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            StoreError::unavailable(format!("{context}: {err}"))
        }
        sqlx::Error::Database(ref db) if db.is_unique_violation() => StoreError::duplicate(context),
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) | sqlx::Error::ColumnNotFound(_) => {
            StoreError::corrupt(format!("{context}: {err}"))
        }
        other => StoreError::backend(context, other),
    }
}

// =============================================================================
// PgStore
// =============================================================================

/// PostgreSQL-backed store.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wraps an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects a pool to `url`.
    pub async fn connect(
        url: &str,
        max_connections: u32,
        acquire_timeout: Duration,
    ) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(acquire_timeout)
            .connect(url)
            .await
            .map_err(|e| store_error("connect", e))?;
        info!(max_connections, "Connected to PostgreSQL");
        Ok(Self::new(pool))
    }

    /// Creates missing tables and indexes.
    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::raw_sql(SCHEMA_SQL)
            .execute(&self.pool)
            .await
            .map_err(|e| store_error("migrate", e))?;
        debug!("Schema is up to date");
        Ok(())
    }

    async fn fetch_orders(
        &self,
        id: Option<OrderId>,
        user_id: Option<UserId>,
    ) -> StoreResult<Vec<Order>> {
        let rows = query_as::<Postgres, OrderLineRow>(GET_ORDERS_SQL)
            .bind(id.map(OrderId::get))
            .bind(user_id.map(UserId::get))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| store_error("get orders", e))?;
        fold_orders(rows)
    }
}

#[async_trait]
impl ShopStore for PgStore {
    fn name(&self) -> &'static str {
        "postgres"
    }

    async fn begin(&self) -> StoreResult<Box<dyn ShopTransaction>> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| store_error("begin", e))?;
        Ok(Box::new(PgTransaction { tx }))
    }

    async fn ping(&self) -> StoreResult<()> {
        query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| store_error("ping", e))?;
        Ok(())
    }

    async fn item(&self, id: ItemId) -> StoreResult<Option<Item>> {
        let sql = format!("SELECT {ITEM_COLUMNS} FROM items WHERE id = $1");
        let row = query_as::<Postgres, ItemRow>(&sql)
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| store_error("get item", e))?;
        Ok(row.map(|r| r.0))
    }

    async fn items(&self, page: Page) -> StoreResult<Vec<Item>> {
        let sql = format!("SELECT {ITEM_COLUMNS} FROM items ORDER BY id LIMIT $1 OFFSET $2");
        let rows = query_as::<Postgres, ItemRow>(&sql)
            .bind(i64::from(page.limit))
            .bind(i64::from(page.offset))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| store_error("list items", e))?;
        Ok(rows.into_iter().map(|r| r.0).collect())
    }

    async fn insert_item(&self, item: NewItem) -> StoreResult<Item> {
        let sql = format!(
            "INSERT INTO items (category, size, price, sex, image_id, brand_id, stock, is_available) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $7 > 0) RETURNING {ITEM_COLUMNS}"
        );
        let row = query_as::<Postgres, ItemRow>(&sql)
            .bind(item.category)
            .bind(item.size)
            .bind(item.price)
            .bind(item.sex)
            .bind(item.image_id)
            .bind(item.brand_id)
            .bind(i64::from(item.stock))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| store_error("insert item", e))?;
        Ok(row.0)
    }

    async fn set_stock(
        &self,
        id: ItemId,
        stock: u32,
        pulled: bool,
    ) -> StoreResult<Option<Item>> {
        let sql = format!(
            "UPDATE items SET stock = $2, pulled = $3, is_available = $2 > 0 AND NOT $3 \
             WHERE id = $1 RETURNING {ITEM_COLUMNS}"
        );
        let row = query_as::<Postgres, ItemRow>(&sql)
            .bind(id.get())
            .bind(i64::from(stock))
            .bind(pulled)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| store_error("set stock", e))?;
        Ok(row.map(|r| r.0))
    }

    async fn order(&self, id: OrderId) -> StoreResult<Option<Order>> {
        Ok(self.fetch_orders(Some(id), None).await?.into_iter().next())
    }

    async fn orders(&self, filter: OrderFilter) -> StoreResult<Vec<Order>> {
        self.fetch_orders(None, filter.user_id).await
    }

    async fn set_order_status(
        &self,
        id: OrderId,
        from: OrderStatus,
        to: OrderStatus,
    ) -> StoreResult<bool> {
        let rows_affected = query(
            "UPDATE orders SET status = $3 WHERE id = $1 AND status = $2 AND status <> 'cart'",
        )
        .bind(id.get())
        .bind(from.as_str())
        .bind(to.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| store_error("set order status", e))?
        .rows_affected();
        Ok(rows_affected == 1)
    }

    async fn insert_user(&self, user: NewUser) -> StoreResult<User> {
        let row = query_as::<Postgres, UserRow>(
            "INSERT INTO users (login, name, role, password_hash) VALUES ($1, $2, $3, $4) \
             RETURNING id, login, name, role, password_hash",
        )
        .bind(&user.login)
        .bind(&user.name)
        .bind(user.role.as_str())
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| store_error(&format!("login '{}'", user.login), e))?;
        Ok(row.0)
    }

    async fn user_by_login(&self, login: &str) -> StoreResult<Option<User>> {
        let row = query_as::<Postgres, UserRow>(
            "SELECT id, login, name, role, password_hash FROM users WHERE login = $1",
        )
        .bind(login)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| store_error("get user", e))?;
        Ok(row.map(|r| r.0))
    }
}

// =============================================================================
// PgTransaction
// =============================================================================

/// Transaction over a [`PgStore`]. Dropping it rolls back.
pub struct PgTransaction {
    tx: Transaction<'static, Postgres>,
}

impl PgTransaction {
    async fn lines(&mut self, order_id: OrderId) -> StoreResult<Vec<OrderItem>> {
        let rows = query_as::<Postgres, LineRow>(GET_ORDER_LINES_SQL)
            .bind(order_id.get())
            .fetch_all(&mut *self.tx)
            .await
            .map_err(|e| store_error("get order lines", e))?;
        Ok(rows.into_iter().map(|r| r.0).collect())
    }
}

#[async_trait]
impl StockLedger for PgTransaction {
    async fn reserve(&mut self, item_id: ItemId, quantity: u32) -> StoreResult<Reservation> {
        let price: Option<i64> = query(RESERVE_ITEM_SQL)
            .bind(item_id.get())
            .bind(i64::from(quantity))
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| store_error("reserve item", e))?
            .map(|row| row.try_get("price"))
            .transpose()
            .map_err(|e| store_error("decode reservation", e))?;

        Ok(match price {
            Some(unit_price) => Reservation::Reserved { unit_price },
            None => Reservation::Unavailable,
        })
    }

    async fn release(&mut self, item_id: ItemId, quantity: u32) -> StoreResult<()> {
        let rows_affected = query(RELEASE_ITEM_SQL)
            .bind(item_id.get())
            .bind(i64::from(quantity))
            .execute(&mut *self.tx)
            .await
            .map_err(|e| store_error("release item", e))?
            .rows_affected();
        if rows_affected != 1 {
            return Err(StoreError::corrupt(format!("released unknown item {item_id}")));
        }
        Ok(())
    }
}

#[async_trait]
impl BasketLedger for PgTransaction {
    async fn find_basket(&mut self, user_id: UserId) -> StoreResult<Option<Basket>> {
        let id: Option<i64> = query(LOCK_OPEN_BASKET_SQL)
            .bind(user_id.get())
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| store_error("lock basket", e))?
            .map(|row| row.try_get("id"))
            .transpose()
            .map_err(|e| store_error("decode basket", e))?;

        let Some(id) = id.map(OrderId::new) else {
            return Ok(None);
        };
        let items = self.lines(id).await?;
        Ok(Some(Basket::with_items(id, user_id, items)))
    }

    async fn open_basket(&mut self, user_id: UserId) -> StoreResult<Basket> {
        query(CREATE_OPEN_BASKET_SQL)
            .bind(user_id.get())
            .execute(&mut *self.tx)
            .await
            .map_err(|e| store_error("create basket", e))?;

        self.find_basket(user_id)
            .await?
            .ok_or_else(|| StoreError::corrupt(format!("basket of user {user_id} not visible")))
    }

    async fn write_lines(&mut self, basket: &Basket) -> StoreResult<()> {
        query("DELETE FROM order_items WHERE order_id = $1")
            .bind(basket.id.get())
            .execute(&mut *self.tx)
            .await
            .map_err(|e| store_error("clear basket lines", e))?;

        for (position, line) in basket.items.iter().enumerate() {
            query(
                "INSERT INTO order_items (order_id, item_id, position, quantity, unit_price) \
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(basket.id.get())
            .bind(line.item_id.get())
            .bind(position as i32)
            .bind(i64::from(line.quantity))
            .bind(line.unit_price)
            .execute(&mut *self.tx)
            .await
            .map_err(|e| store_error("write basket line", e))?;
        }

        query("UPDATE orders SET price = $2 WHERE id = $1 AND status = 'cart'")
            .bind(basket.id.get())
            .bind(total_price(&basket.items))
            .execute(&mut *self.tx)
            .await
            .map_err(|e| store_error("update basket price", e))?;
        Ok(())
    }

    async fn close_basket(
        &mut self,
        basket: &Basket,
        committed_at: DateTime<Utc>,
    ) -> StoreResult<Order> {
        let price = total_price(&basket.items);
        let rows_affected = query(CLOSE_BASKET_SQL)
            .bind(basket.id.get())
            .bind(committed_at)
            .bind(price)
            .execute(&mut *self.tx)
            .await
            .map_err(|e| store_error("close basket", e))?
            .rows_affected();
        if rows_affected != 1 {
            return Err(StoreError::corrupt(format!(
                "order {} is not an open basket",
                basket.id
            )));
        }

        Ok(Order {
            id: basket.id,
            date: committed_at,
            user_id: basket.user_id,
            items: basket.items.clone(),
            price,
            status: OrderStatus::Committed,
        })
    }
}

#[async_trait]
impl ShopTransaction for PgTransaction {
    async fn commit(self: Box<Self>) -> StoreResult<()> {
        self.tx
            .commit()
            .await
            .map_err(|e| store_error("commit", e))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn row(id: i64, line: Option<(i64, i64, i64)>) -> OrderLineRow {
        OrderLineRow {
            id,
            user_id: 7,
            status: "committed".into(),
            commit_date: Some(Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()),
            price: 230,
            item_id: line.map(|l| l.0),
            quantity: line.map(|l| l.1),
            unit_price: line.map(|l| l.2),
        }
    }

    #[test]
    fn test_fold_groups_lines_by_order() {
        let orders = fold_orders(vec![
            row(9, Some((1, 2, 100))),
            row(9, Some((2, 1, 30))),
            row(4, Some((1, 1, 100))),
        ])
        .unwrap();

        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].id, OrderId::new(9));
        assert_eq!(orders[0].items.len(), 2);
        assert_eq!(orders[0].items[1].item_id, ItemId::new(2));
        assert_eq!(orders[0].items[0].quantity, 2);
        assert_eq!(orders[0].status, OrderStatus::Committed);
        assert_eq!(orders[1].id, OrderId::new(4));
        assert_eq!(orders[1].items.len(), 1);
    }

    #[test]
    fn test_fold_keeps_order_without_lines() {
        let orders = fold_orders(vec![row(3, None), row(2, Some((5, 1, 10)))]).unwrap();

        assert_eq!(orders.len(), 2);
        assert!(orders[0].items.is_empty());
        assert_eq!(orders[0].price, 230);
        assert_eq!(orders[1].items.len(), 1);
    }

    #[test]
    fn test_fold_rejects_bad_rows() {
        let mut unknown = row(1, None);
        unknown.status = "lost".into();
        assert!(matches!(fold_orders(vec![unknown]), Err(StoreError::Corrupt { .. })));

        let mut undated = row(1, None);
        undated.commit_date = None;
        assert!(matches!(fold_orders(vec![undated]), Err(StoreError::Corrupt { .. })));

        let mut partial = row(1, Some((5, 1, 10)));
        partial.unit_price = None;
        assert!(matches!(fold_orders(vec![partial]), Err(StoreError::Corrupt { .. })));

        let negative = row(1, Some((5, -1, 10)));
        assert!(matches!(fold_orders(vec![negative]), Err(StoreError::Corrupt { .. })));
    }

    #[test]
    fn test_fold_empty() {
        assert!(fold_orders(Vec::new()).unwrap().is_empty());
    }
}
