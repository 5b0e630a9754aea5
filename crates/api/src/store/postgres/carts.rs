//! Cart store backed by `PostgreSQL`.
//!
//! `append_item` and `remove_item` write the line change and the recomputed
//! total inside one transaction, giving each engine mutation a single
//! atomicity boundary.

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgPool;

use emporium_core::{CartId, CartItemId, ProductId, UserId};

use super::quantity_from_row;
use crate::models::{Cart, CartItem, NewCartItem};
use crate::store::{CartStore, StoreError};

/// `PostgreSQL` implementation of [`CartStore`].
#[derive(Clone)]
pub struct PgCartStore {
    pool: PgPool,
}

impl PgCartStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Load a cart row together with its items.
    async fn load(&self, id: CartId) -> Result<Option<Cart>, StoreError> {
        let cart = sqlx::query_as::<_, CartRow>(
            "SELECT id, user_id, total_amount FROM carts WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(cart) = cart else {
            return Ok(None);
        };

        let items = sqlx::query_as::<_, CartItemRow>(
            "SELECT id, cart_id, product_id, quantity, unit_price, subtotal
             FROM cart_items WHERE cart_id = $1 ORDER BY id",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let items = items
            .into_iter()
            .map(CartItemRow::into_item)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(Cart {
            id: CartId::new(cart.id),
            user_id: UserId::new(cart.user_id),
            items,
            total_amount: cart.total_amount,
        }))
    }
}

#[derive(sqlx::FromRow)]
struct CartRow {
    id: i64,
    user_id: i64,
    total_amount: Decimal,
}

#[derive(sqlx::FromRow)]
struct CartItemRow {
    id: i64,
    cart_id: i64,
    product_id: i64,
    quantity: i32,
    unit_price: Decimal,
    subtotal: Decimal,
}

impl CartItemRow {
    fn into_item(self) -> Result<CartItem, StoreError> {
        Ok(CartItem {
            id: CartItemId::new(self.id),
            cart_id: CartId::new(self.cart_id),
            product_id: ProductId::new(self.product_id),
            quantity: quantity_from_row(self.quantity)?,
            unit_price: self.unit_price,
            subtotal: self.subtotal,
        })
    }
}

#[async_trait]
impl CartStore for PgCartStore {
    async fn find_by_user(&self, user_id: UserId) -> Result<Option<Cart>, StoreError> {
        let id: Option<(i64,)> = sqlx::query_as("SELECT id FROM carts WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        match id {
            Some((id,)) => self.load(CartId::new(id)).await,
            None => Ok(None),
        }
    }

    async fn create(&self, user_id: UserId) -> Result<Cart, StoreError> {
        let row = sqlx::query_as::<_, CartRow>(
            "INSERT INTO carts (user_id, total_amount) VALUES ($1, 0)
             RETURNING id, user_id, total_amount",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(Cart {
            id: CartId::new(row.id),
            user_id: UserId::new(row.user_id),
            items: Vec::new(),
            total_amount: row.total_amount,
        })
    }

    async fn get(&self, id: CartId) -> Result<Option<Cart>, StoreError> {
        self.load(id).await
    }

    async fn find_item(&self, item_id: CartItemId) -> Result<Option<CartItem>, StoreError> {
        let row = sqlx::query_as::<_, CartItemRow>(
            "SELECT id, cart_id, product_id, quantity, unit_price, subtotal
             FROM cart_items WHERE id = $1",
        )
        .bind(item_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(CartItemRow::into_item).transpose()
    }

    async fn append_item(
        &self,
        cart_id: CartId,
        item: NewCartItem,
        new_total: Decimal,
    ) -> Result<Cart, StoreError> {
        let quantity = i32::try_from(item.quantity).map_err(|_| {
            StoreError::DataCorruption(format!("quantity out of range: {}", item.quantity))
        })?;

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO cart_items (cart_id, product_id, quantity, unit_price, subtotal)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(cart_id)
        .bind(item.product_id)
        .bind(quantity)
        .bind(item.unit_price)
        .bind(item.subtotal)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE carts SET total_amount = $2 WHERE id = $1")
            .bind(cart_id)
            .bind(new_total)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        self.load(cart_id).await?.ok_or_else(|| {
            StoreError::DataCorruption(format!("cart {cart_id} vanished during append"))
        })
    }

    async fn remove_item(
        &self,
        cart_id: CartId,
        item_id: CartItemId,
        new_total: Decimal,
    ) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM cart_items WHERE id = $1")
            .bind(item_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE carts SET total_amount = $2 WHERE id = $1")
            .bind(cart_id)
            .bind(new_total)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn clear(&self, cart_id: CartId) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM cart_items WHERE cart_id = $1")
            .bind(cart_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE carts SET total_amount = 0 WHERE id = $1")
            .bind(cart_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}
