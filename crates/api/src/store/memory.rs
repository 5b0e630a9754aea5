//! In-memory store implementation.
//!
//! Backs the unit and router-level tests so the whole engine surface runs
//! hermetically; the Postgres implementations are the production path. The
//! semantics mirror the Postgres stores method for method: same conflict
//! mapping, same orderings, same atomicity per call.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;

use emporium_core::{
    CartId, CartItemId, CategoryId, Email, ImageId, OrderId, OrderItemId, ProductId, UserId,
};

use crate::models::{
    Cart, CartItem, Category, NewCartItem, NewImage, NewOrder, NewProduct, NewUser, Order,
    OrderItem, Product, ProductImage, ProductUpdate, User, UserUpdate,
};
use crate::store::{
    CartStore, CatalogStore, ImageStore, OrderStore, StoreError, UserStore,
};

#[derive(Default)]
struct Inner {
    // One id sequence across all tables; uniqueness is all callers rely on.
    next_id: i64,
    users: BTreeMap<i64, User>,
    categories: BTreeMap<i64, Category>,
    products: BTreeMap<i64, Product>,
    carts: BTreeMap<i64, CartRecord>,
    cart_items: BTreeMap<i64, CartItem>,
    orders: BTreeMap<i64, Order>,
    images: BTreeMap<i64, ProductImage>,
}

struct CartRecord {
    id: CartId,
    user_id: UserId,
    total_amount: Decimal,
}

impl Inner {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn cart_with_items(&self, record: &CartRecord) -> Cart {
        let items = self
            .cart_items
            .values()
            .filter(|item| item.cart_id == record.id)
            .cloned()
            .collect();

        Cart {
            id: record.id,
            user_id: record.user_id,
            items,
            total_amount: record.total_amount,
        }
    }
}

/// Shared in-memory implementation of every store trait.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create(&self, new: NewUser) -> Result<User, StoreError> {
        let mut inner = self.lock();

        if inner.users.values().any(|u| u.email == new.email) {
            return Err(StoreError::Conflict("email already exists".to_owned()));
        }

        let id = inner.next_id();
        let user = User {
            id: UserId::new(id),
            name: new.name,
            email: new.email,
            role: new.role,
            password_hash: new.password_hash,
        };
        inner.users.insert(id, user.clone());
        Ok(user)
    }

    async fn get(&self, id: UserId) -> Result<Option<User>, StoreError> {
        Ok(self.lock().users.get(&id.as_i64()).cloned())
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, StoreError> {
        Ok(self
            .lock()
            .users
            .values()
            .find(|u| &u.email == email)
            .cloned())
    }

    async fn list(&self) -> Result<Vec<User>, StoreError> {
        Ok(self.lock().users.values().cloned().collect())
    }

    async fn update(&self, id: UserId, update: UserUpdate) -> Result<Option<User>, StoreError> {
        let mut inner = self.lock();

        if let Some(new_email) = &update.email
            && inner
                .users
                .values()
                .any(|u| u.id != id && &u.email == new_email)
        {
            return Err(StoreError::Conflict("email already exists".to_owned()));
        }

        let Some(user) = inner.users.get_mut(&id.as_i64()) else {
            return Ok(None);
        };

        if let Some(name) = update.name {
            user.name = name;
        }
        if let Some(email) = update.email {
            user.email = email;
        }

        Ok(Some(user.clone()))
    }

    async fn delete(&self, id: UserId) -> Result<bool, StoreError> {
        Ok(self.lock().users.remove(&id.as_i64()).is_some())
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn create_category(&self, name: &str) -> Result<Category, StoreError> {
        let mut inner = self.lock();

        if inner.categories.values().any(|c| c.name == name) {
            return Err(StoreError::Conflict(
                "category name already exists".to_owned(),
            ));
        }

        let id = inner.next_id();
        let category = Category {
            id: CategoryId::new(id),
            name: name.to_owned(),
        };
        inner.categories.insert(id, category.clone());
        Ok(category)
    }

    async fn get_category(&self, id: CategoryId) -> Result<Option<Category>, StoreError> {
        Ok(self.lock().categories.get(&id.as_i64()).cloned())
    }

    async fn list_categories(&self) -> Result<Vec<Category>, StoreError> {
        let mut categories: Vec<Category> = self.lock().categories.values().cloned().collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn delete_category(&self, id: CategoryId) -> Result<bool, StoreError> {
        Ok(self.lock().categories.remove(&id.as_i64()).is_some())
    }

    async fn create_product(&self, new: NewProduct) -> Result<Product, StoreError> {
        let mut inner = self.lock();

        if inner.products.values().any(|p| p.name == new.name) {
            return Err(StoreError::Conflict(
                "product name already exists".to_owned(),
            ));
        }

        let id = inner.next_id();
        let now = Utc::now();
        let product = Product {
            id: ProductId::new(id),
            name: new.name,
            description: new.description,
            price: new.price,
            stock_quantity: new.stock_quantity,
            brand: new.brand,
            model: new.model,
            sku: new.sku,
            specifications: new.specifications,
            weight: new.weight,
            dimensions: new.dimensions,
            is_active: new.is_active,
            category_id: new.category_id,
            created_at: now,
            updated_at: now,
        };
        inner.products.insert(id, product.clone());
        Ok(product)
    }

    async fn product_name_exists(&self, name: &str) -> Result<bool, StoreError> {
        Ok(self.lock().products.values().any(|p| p.name == name))
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        Ok(self.lock().products.get(&id.as_i64()).cloned())
    }

    async fn find_product_by_sku(&self, sku: &str) -> Result<Option<Product>, StoreError> {
        Ok(self
            .lock()
            .products
            .values()
            .find(|p| p.sku.as_deref() == Some(sku))
            .cloned())
    }

    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        Ok(self.lock().products.values().cloned().collect())
    }

    async fn update_product(
        &self,
        id: ProductId,
        update: ProductUpdate,
    ) -> Result<Option<Product>, StoreError> {
        let mut inner = self.lock();

        if let Some(new_name) = &update.name
            && inner
                .products
                .values()
                .any(|p| p.id != id && &p.name == new_name)
        {
            return Err(StoreError::Conflict(
                "product name already exists".to_owned(),
            ));
        }

        let Some(product) = inner.products.get_mut(&id.as_i64()) else {
            return Ok(None);
        };

        if let Some(name) = update.name {
            product.name = name;
        }
        if let Some(description) = update.description {
            product.description = description;
        }
        if let Some(price) = update.price {
            product.price = price;
        }
        if let Some(stock_quantity) = update.stock_quantity {
            product.stock_quantity = stock_quantity;
        }
        if let Some(brand) = update.brand {
            product.brand = Some(brand);
        }
        if let Some(model) = update.model {
            product.model = Some(model);
        }
        if let Some(sku) = update.sku {
            product.sku = Some(sku);
        }
        if let Some(specifications) = update.specifications {
            product.specifications = Some(specifications);
        }
        if let Some(weight) = update.weight {
            product.weight = Some(weight);
        }
        if let Some(dimensions) = update.dimensions {
            product.dimensions = Some(dimensions);
        }
        if let Some(is_active) = update.is_active {
            product.is_active = is_active;
        }
        if let Some(category_id) = update.category_id {
            product.category_id = category_id;
        }
        product.updated_at = Utc::now();

        Ok(Some(product.clone()))
    }

    async fn delete_product(&self, id: ProductId) -> Result<bool, StoreError> {
        Ok(self.lock().products.remove(&id.as_i64()).is_some())
    }

    async fn search_products(&self, name_fragment: &str) -> Result<Vec<Product>, StoreError> {
        let fragment = name_fragment.to_lowercase();
        Ok(self
            .lock()
            .products
            .values()
            .filter(|p| p.name.to_lowercase().contains(&fragment))
            .cloned()
            .collect())
    }

    async fn products_in_category(
        &self,
        category_id: CategoryId,
    ) -> Result<Vec<Product>, StoreError> {
        Ok(self
            .lock()
            .products
            .values()
            .filter(|p| p.category_id == category_id)
            .cloned()
            .collect())
    }

    async fn products_by_brand(&self, brand: &str) -> Result<Vec<Product>, StoreError> {
        let fragment = brand.to_lowercase();
        Ok(self
            .lock()
            .products
            .values()
            .filter(|p| {
                p.brand
                    .as_ref()
                    .is_some_and(|b| b.to_lowercase().contains(&fragment))
            })
            .cloned()
            .collect())
    }

    async fn products_in_price_range(
        &self,
        min: Decimal,
        max: Decimal,
    ) -> Result<Vec<Product>, StoreError> {
        let mut products: Vec<Product> = self
            .lock()
            .products
            .values()
            .filter(|p| p.price >= min && p.price <= max)
            .cloned()
            .collect();
        products.sort_by(|a, b| a.price.cmp(&b.price));
        Ok(products)
    }

    async fn active_products(&self) -> Result<Vec<Product>, StoreError> {
        Ok(self
            .lock()
            .products
            .values()
            .filter(|p| p.is_active)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl CartStore for MemoryStore {
    async fn find_by_user(&self, user_id: UserId) -> Result<Option<Cart>, StoreError> {
        let inner = self.lock();
        Ok(inner
            .carts
            .values()
            .find(|c| c.user_id == user_id)
            .map(|record| inner.cart_with_items(record)))
    }

    async fn create(&self, user_id: UserId) -> Result<Cart, StoreError> {
        let mut inner = self.lock();
        let id = inner.next_id();
        let record = CartRecord {
            id: CartId::new(id),
            user_id,
            total_amount: Decimal::ZERO,
        };
        let cart = inner.cart_with_items(&record);
        inner.carts.insert(id, record);
        Ok(cart)
    }

    async fn get(&self, id: CartId) -> Result<Option<Cart>, StoreError> {
        let inner = self.lock();
        Ok(inner
            .carts
            .get(&id.as_i64())
            .map(|record| inner.cart_with_items(record)))
    }

    async fn find_item(&self, item_id: CartItemId) -> Result<Option<CartItem>, StoreError> {
        Ok(self.lock().cart_items.get(&item_id.as_i64()).cloned())
    }

    async fn append_item(
        &self,
        cart_id: CartId,
        item: NewCartItem,
        new_total: Decimal,
    ) -> Result<Cart, StoreError> {
        let mut inner = self.lock();

        if !inner.carts.contains_key(&cart_id.as_i64()) {
            return Err(StoreError::DataCorruption(format!(
                "cart {cart_id} vanished during append"
            )));
        }

        let id = inner.next_id();
        inner.cart_items.insert(
            id,
            CartItem {
                id: CartItemId::new(id),
                cart_id,
                product_id: item.product_id,
                quantity: item.quantity,
                unit_price: item.unit_price,
                subtotal: item.subtotal,
            },
        );

        if let Some(record) = inner.carts.get_mut(&cart_id.as_i64()) {
            record.total_amount = new_total;
        }

        let record = inner
            .carts
            .get(&cart_id.as_i64())
            .ok_or_else(|| StoreError::DataCorruption("cart vanished".to_owned()))?;
        Ok(inner.cart_with_items(record))
    }

    async fn remove_item(
        &self,
        cart_id: CartId,
        item_id: CartItemId,
        new_total: Decimal,
    ) -> Result<(), StoreError> {
        let mut inner = self.lock();
        inner.cart_items.remove(&item_id.as_i64());
        if let Some(record) = inner.carts.get_mut(&cart_id.as_i64()) {
            record.total_amount = new_total;
        }
        Ok(())
    }

    async fn clear(&self, cart_id: CartId) -> Result<(), StoreError> {
        let mut inner = self.lock();
        inner.cart_items.retain(|_, item| item.cart_id != cart_id);
        if let Some(record) = inner.carts.get_mut(&cart_id.as_i64()) {
            record.total_amount = Decimal::ZERO;
        }
        Ok(())
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn create(&self, new: NewOrder) -> Result<Order, StoreError> {
        let mut inner = self.lock();
        let order_id = OrderId::new(inner.next_id());

        let items = new
            .items
            .into_iter()
            .map(|item| {
                let id = inner.next_id();
                OrderItem {
                    id: OrderItemId::new(id),
                    order_id,
                    product_id: item.product_id,
                    quantity: item.quantity,
                    price: item.price,
                }
            })
            .collect();

        let order = Order {
            id: order_id,
            user_id: new.user_id,
            status: new.status,
            total_amount: new.total_amount,
            ordered_at: new.ordered_at,
            items,
        };
        inner.orders.insert(order_id.as_i64(), order.clone());
        Ok(order)
    }

    async fn get(&self, id: OrderId) -> Result<Option<Order>, StoreError> {
        Ok(self.lock().orders.get(&id.as_i64()).cloned())
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, StoreError> {
        let mut orders: Vec<Order> = self
            .lock()
            .orders
            .values()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.ordered_at.cmp(&a.ordered_at).then(b.id.cmp(&a.id)));
        Ok(orders)
    }
}

#[async_trait]
impl ImageStore for MemoryStore {
    async fn insert(&self, new: NewImage) -> Result<ProductImage, StoreError> {
        let mut inner = self.lock();
        let id = inner.next_id();
        let image = ProductImage {
            id: ImageId::new(id),
            product_id: new.product_id,
            file_name: new.file_name,
            original_file_name: new.original_file_name,
            content_type: new.content_type,
            size_bytes: new.size_bytes,
            url: new.url,
            is_primary: new.is_primary,
            display_order: new.display_order,
            uploaded_at: Utc::now(),
        };
        inner.images.insert(id, image.clone());
        Ok(image)
    }

    async fn get(&self, id: ImageId) -> Result<Option<ProductImage>, StoreError> {
        Ok(self.lock().images.get(&id.as_i64()).cloned())
    }

    async fn list_for_product(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<ProductImage>, StoreError> {
        let mut images: Vec<ProductImage> = self
            .lock()
            .images
            .values()
            .filter(|i| i.product_id == product_id)
            .cloned()
            .collect();
        images.sort_by(|a, b| a.display_order.cmp(&b.display_order).then(a.id.cmp(&b.id)));
        Ok(images)
    }

    async fn find_primary(
        &self,
        product_id: ProductId,
    ) -> Result<Option<ProductImage>, StoreError> {
        Ok(self
            .lock()
            .images
            .values()
            .find(|i| i.product_id == product_id && i.is_primary)
            .cloned())
    }

    async fn count_for_product(&self, product_id: ProductId) -> Result<i64, StoreError> {
        Ok(self
            .lock()
            .images
            .values()
            .filter(|i| i.product_id == product_id)
            .count() as i64)
    }

    async fn set_primary_flag(&self, id: ImageId, is_primary: bool) -> Result<(), StoreError> {
        if let Some(image) = self.lock().images.get_mut(&id.as_i64()) {
            image.is_primary = is_primary;
        }
        Ok(())
    }

    async fn set_display_order(
        &self,
        id: ImageId,
        display_order: i32,
    ) -> Result<Option<ProductImage>, StoreError> {
        let mut inner = self.lock();
        let Some(image) = inner.images.get_mut(&id.as_i64()) else {
            return Ok(None);
        };
        image.display_order = display_order;
        Ok(Some(image.clone()))
    }

    async fn delete(&self, id: ImageId) -> Result<bool, StoreError> {
        Ok(self.lock().images.remove(&id.as_i64()).is_some())
    }

    async fn delete_for_product(&self, product_id: ProductId) -> Result<(), StoreError> {
        self.lock()
            .images
            .retain(|_, image| image.product_id != product_id);
        Ok(())
    }
}
