use sqlx::PgPool;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::services::{AccountService, OrderService, ShopService};
use crate::storage::ObjectStore;

/// Shared by every handler. Cloning is cheap: the pool and the rest are reference counted.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub pool: PgPool,
    pub store: Arc<dyn ObjectStore>,
}

impl AppState {
    pub fn new(config: AppConfig, pool: PgPool, store: Arc<dyn ObjectStore>) -> Self {
        Self {
            config: Arc::new(config),
            pool,
            store,
        }
    }

    pub fn accounts(&self) -> AccountService {
        AccountService::new(self.pool.clone())
    }

    pub fn shops(&self) -> ShopService {
        ShopService::new(self.pool.clone(), Arc::clone(&self.store), self.config.server.flavor)
    }

    pub fn orders(&self) -> OrderService {
        OrderService::new(self.pool.clone())
    }
}
