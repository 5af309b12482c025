//! Composition root.
//!
//! Wires the SQLite stores and the JWT issuer into the two services from a
//! [`ServiceConfig`].

use std::sync::Arc;
use tracing::info;

use stockroom_db::{Database, DbConfig, DbError};

use crate::auth::AuthService;
use crate::config::ServiceConfig;
use crate::error::{ServiceError, ServiceResult};
use crate::inventory::InventoryService;
use crate::token::JwtIssuer;

impl From<DbError> for ServiceError {
    fn from(err: DbError) -> Self {
        tracing::error!(error = %err, "Database failure");
        ServiceError::Infrastructure(err.to_string())
    }
}

/// Both services over one database.
#[derive(Clone)]
pub struct Stockroom {
    pub inventory: InventoryService,
    pub auth: AuthService,
    db: Database,
}

impl Stockroom {
    /// Opens (and migrates) the database at `config.db_path`.
    pub async fn open(config: &ServiceConfig) -> ServiceResult<Self> {
        let db = Database::new(DbConfig::new(&config.db_path)).await?;
        Ok(Self::wire(db, config))
    }

    /// Same wiring over a throwaway in-memory database.
    pub async fn in_memory(config: &ServiceConfig) -> ServiceResult<Self> {
        let db = Database::new(DbConfig::in_memory()).await?;
        Ok(Self::wire(db, config))
    }

    fn wire(db: Database, config: &ServiceConfig) -> Self {
        let issuer = JwtIssuer::from_config(config);
        if config.jwt_secret.is_none() {
            tracing::warn!("No STOCKROOM_JWT_SECRET configured; logins will fail");
        }

        let inventory = InventoryService::new(Arc::new(db.products()));
        let auth = AuthService::new(Arc::new(db.credentials()), Arc::new(issuer))
            .with_token_lifetime(config.token_lifetime());

        info!(issuer = %config.jwt_issuer, "Services ready");
        Stockroom {
            inventory,
            auth,
            db,
        }
    }

    pub async fn health_check(&self) -> bool {
        self.db.health_check().await
    }

    pub async fn close(&self) {
        self.db.close().await;
    }
}
