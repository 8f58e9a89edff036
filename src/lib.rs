pub mod api;
pub mod config;
pub mod db;
pub mod store;

pub use db::DbPool;

use chrono::{DateTime, Utc};
use config::Config;

use crate::store::{BibleStore, CategoryStore, ContentStore, SessionStore, UserStore};

pub struct AppState {
    pub config: Config,
    pub db: DbPool,
    pub users: UserStore,
    pub sessions: SessionStore,
    pub categories: CategoryStore,
    pub contents: ContentStore,
    pub bible: BibleStore,
    /// Process start, reported as uptime by /health.
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(config: Config, db: DbPool) -> Self {
        Self {
            config,
            users: UserStore::new(db.clone()),
            sessions: SessionStore::new(db.clone()),
            categories: CategoryStore::new(db.clone()),
            contents: ContentStore::new(db.clone()),
            bible: BibleStore::new(db.clone()),
            db,
            started_at: Utc::now(),
        }
    }
}
