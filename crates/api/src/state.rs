//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::ApiConfig;
use crate::services::{
    AuthService, CartService, CatalogService, FileStore, ImageService, LocalFileStore,
    MemoryFileStore, OrderService, UserService,
};
use crate::store::memory::MemoryStore;
use crate::store::postgres::{
    PgCartStore, PgCatalogStore, PgImageStore, PgOrderStore, PgUserStore,
};
use crate::store::{CartStore, CatalogStore, ImageStore, OrderStore, UserStore};

/// The store implementations the services are wired over.
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub catalog: Arc<dyn CatalogStore>,
    pub carts: Arc<dyn CartStore>,
    pub orders: Arc<dyn OrderStore>,
    pub images: Arc<dyn ImageStore>,
    pub files: Arc<dyn FileStore>,
}

impl Stores {
    /// Production wiring: `PostgreSQL` stores plus a local-disk file store
    /// rooted at the configured upload directory.
    #[must_use]
    pub fn postgres(pool: &PgPool, config: &ApiConfig) -> Self {
        Self {
            users: Arc::new(PgUserStore::new(pool.clone())),
            catalog: Arc::new(PgCatalogStore::new(pool.clone())),
            carts: Arc::new(PgCartStore::new(pool.clone())),
            orders: Arc::new(PgOrderStore::new(pool.clone())),
            images: Arc::new(PgImageStore::new(pool.clone())),
            files: Arc::new(LocalFileStore::new(config.upload_dir.clone())),
        }
    }

    /// Hermetic wiring over the in-memory stores; used by the test suite.
    #[must_use]
    pub fn in_memory() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            users: store.clone(),
            catalog: store.clone(),
            carts: store.clone(),
            orders: store.clone(),
            images: store,
            files: Arc::new(MemoryFileStore::new()),
        }
    }
}

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`; gives handlers access to the services and
/// configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ApiConfig,
    auth: AuthService,
    users: UserService,
    catalog: CatalogService,
    cart: CartService,
    orders: OrderService,
    images: ImageService,
    files: Arc<dyn FileStore>,
}

impl AppState {
    /// Wire the services over the given stores.
    #[must_use]
    pub fn new(config: ApiConfig, stores: Stores) -> Self {
        let auth = AuthService::new(stores.users.clone(), &config.jwt_secret);
        let users = UserService::new(stores.users.clone());
        let catalog = CatalogService::new(stores.catalog.clone());
        let cart = CartService::new(
            stores.carts.clone(),
            stores.users.clone(),
            stores.catalog.clone(),
        );
        let orders = OrderService::new(
            stores.orders.clone(),
            stores.users.clone(),
            stores.catalog.clone(),
        );
        let images = ImageService::new(
            stores.images.clone(),
            stores.catalog.clone(),
            stores.files.clone(),
            config.base_url.clone(),
        );

        Self {
            inner: Arc::new(AppStateInner {
                config,
                auth,
                users,
                catalog,
                cart,
                orders,
                images,
                files: stores.files,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn auth(&self) -> &AuthService {
        &self.inner.auth
    }

    #[must_use]
    pub fn users(&self) -> &UserService {
        &self.inner.users
    }

    #[must_use]
    pub fn catalog(&self) -> &CatalogService {
        &self.inner.catalog
    }

    #[must_use]
    pub fn cart(&self) -> &CartService {
        &self.inner.cart
    }

    #[must_use]
    pub fn orders(&self) -> &OrderService {
        &self.inner.orders
    }

    #[must_use]
    pub fn images(&self) -> &ImageService {
        &self.inner.images
    }

    #[must_use]
    pub fn files(&self) -> &Arc<dyn FileStore> {
        &self.inner.files
    }
}
