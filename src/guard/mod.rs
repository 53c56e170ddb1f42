//! 会话守卫：受保护页面渲染前检查本地 token，管理页还要远程校验。

use crate::error::ApiError;
use crate::service;
use crate::session::ApiSession;
use crate::storage::repository::{CredentialRepository, KEY_TOKEN, KEY_USERNAME};
use async_trait::async_trait;
use log::{info, warn};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthState {
    #[default]
    Unknown,
    Authenticated {
        username: Option<String>,
    },
    Unauthenticated,
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::Authenticated { .. })
    }
}

/// 持久化的凭据存储（相当于浏览器的 localStorage）
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn load_token(&self) -> Result<Option<String>, ApiError>;
    async fn load_username(&self) -> Result<Option<String>, ApiError>;
    async fn save(&self, token: &str, username: &str) -> Result<(), ApiError>;
    async fn clear(&self) -> Result<(), ApiError>;
}

#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<(), ApiError>;
}

pub struct SqliteTokenStore {
    db: Arc<DatabaseConnection>,
}

impl SqliteTokenStore {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TokenStore for SqliteTokenStore {
    async fn load_token(&self) -> Result<Option<String>, ApiError> {
        Ok(CredentialRepository::get(&self.db, KEY_TOKEN).await?)
    }

    async fn load_username(&self) -> Result<Option<String>, ApiError> {
        Ok(CredentialRepository::get(&self.db, KEY_USERNAME).await?)
    }

    async fn save(&self, token: &str, username: &str) -> Result<(), ApiError> {
        Ok(CredentialRepository::save_login(&self.db, token, username).await?)
    }

    async fn clear(&self) -> Result<(), ApiError> {
        Ok(CredentialRepository::clear_login(&self.db).await?)
    }
}

#[async_trait]
impl TokenVerifier for ApiSession {
    async fn verify(&self, token: &str) -> Result<(), ApiError> {
        service::auth::verify(self, token).await
    }
}

pub struct SessionGuard {
    store: Arc<dyn TokenStore>,
    verifier: Arc<dyn TokenVerifier>,
}

impl SessionGuard {
    pub fn new(store: Arc<dyn TokenStore>, verifier: Arc<dyn TokenVerifier>) -> Self {
        Self { store, verifier }
    }

    /// 无 token -> 未登录；需要管理员权限时远程校验，
    /// 任何失败（网络或拒绝）都视为未登录并清除本地凭据。
    pub async fn check(&self, require_admin: bool) -> AuthState {
        let token = match self.store.load_token().await {
            Ok(Some(t)) if !t.trim().is_empty() => t,
            Ok(_) => return AuthState::Unauthenticated,
            Err(e) => {
                warn!("读取本地 token 失败: {}", e);
                return AuthState::Unauthenticated;
            }
        };

        if require_admin {
            if let Err(e) = self.verifier.verify(&token).await {
                warn!("token 校验失败，清除本地凭据: {}", e);
                if let Err(e) = self.store.clear().await {
                    warn!("清除本地凭据失败: {}", e);
                }
                return AuthState::Unauthenticated;
            }
            info!("token 校验通过");
        }

        let username = self.store.load_username().await.ok().flatten();
        AuthState::Authenticated { username }
    }
}
