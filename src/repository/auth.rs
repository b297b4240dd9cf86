// ==========================================
// 车队驾驶偏差管理系统 - 认证协作方
// ==========================================
// 职责: 登录 / 注册 / 登出 / 会话变化订阅
// 实现: SQLite 用户表 + argon2 密码哈希
// 约定:
// - 订阅时立即收到当前会话（可能为 None），之后每次变化都会收到
// - 会话只保存在进程内
// ==========================================

use crate::repository::error::{RepositoryError, RepositoryResult};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};
use tracing::{info, warn};
use uuid::Uuid;

/// 密码最小长度
pub const MIN_PASSWORD_LEN: usize = 6;

// ==========================================
// Session - 登录会话
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    pub email: String,
    pub access_token: String,
}

/// 会话变化回调
pub type SessionCallback = Arc<dyn Fn(Option<&Session>) + Send + Sync>;

// ==========================================
// AuthProvider Trait
// ==========================================
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> RepositoryResult<Session>;

    async fn sign_up(&self, email: &str, password: &str) -> RepositoryResult<Session>;

    async fn sign_out(&self) -> RepositoryResult<()>;

    fn current_session(&self) -> Option<Session>;

    /// 订阅会话变化（立即回调一次当前会话）
    fn on_session_change(&self, callback: SessionCallback) -> SessionSubscription;
}

// ==========================================
// SessionHub - 会话状态与订阅者
// ==========================================
// 回调在锁外执行，回调内可再次读取会话
#[derive(Default)]
struct HubInner {
    current: Mutex<Option<Session>>,
    listeners: Mutex<Vec<(u64, SessionCallback)>>,
    next_id: AtomicU64,
}

#[derive(Clone, Default)]
pub struct SessionHub {
    inner: Arc<HubInner>,
}

impl SessionHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<Session> {
        self.inner
            .current
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// 更新会话并通知所有订阅者
    pub fn set(&self, session: Option<Session>) {
        {
            let mut current = self.inner.current.lock().unwrap_or_else(|e| e.into_inner());
            *current = session.clone();
        }
        let listeners: Vec<SessionCallback> = self
            .inner
            .listeners
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(|(_, cb)| Arc::clone(cb))
            .collect();
        for callback in listeners {
            callback(session.as_ref());
        }
    }

    pub fn subscribe(&self, callback: SessionCallback) -> SessionSubscription {
        let id = self.inner.next_id.fetch_add(1, Ordering::SeqCst);
        self.inner
            .listeners
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((id, Arc::clone(&callback)));

        let current = self.current();
        callback(current.as_ref());

        SessionSubscription {
            id,
            hub: Arc::downgrade(&self.inner),
        }
    }

    pub fn listener_count(&self) -> usize {
        self.inner
            .listeners
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }
}

// ==========================================
// SessionSubscription - 订阅句柄
// ==========================================
pub struct SessionSubscription {
    id: u64,
    hub: Weak<HubInner>,
}

impl SessionSubscription {
    /// 取消订阅
    pub fn unsubscribe(self) {
        if let Some(hub) = self.hub.upgrade() {
            hub.listeners
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .retain(|(id, _)| *id != self.id);
        }
    }
}

// ==========================================
// SqliteAuthProvider
// ==========================================
pub struct SqliteAuthProvider {
    conn: Arc<Mutex<Connection>>,
    hub: SessionHub,
}

impl SqliteAuthProvider {
    /// 打开数据库（自动建表）
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        Ok(Self::from_connection(crate::db::open_shared(db_path)?))
    }

    /// 从已有连接创建
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self {
            conn,
            hub: SessionHub::new(),
        }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn start_session(&self, user_id: String, email: String) -> Session {
        let session = Session {
            user_id,
            email,
            access_token: Uuid::new_v4().to_string(),
        };
        self.hub.set(Some(session.clone()));
        session
    }
}

#[async_trait]
impl AuthProvider for SqliteAuthProvider {
    async fn sign_in(&self, email: &str, password: &str) -> RepositoryResult<Session> {
        let email = normalize_email(email);
        let row: Option<(String, String)> = {
            let conn = self.get_conn()?;
            conn.query_row(
                "SELECT user_id, password_hash FROM app_user WHERE email = ?1",
                params![email],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?
        };

        let (user_id, password_hash) = row.ok_or_else(|| {
            warn!(email = %email, "登录失败: 用户不存在");
            RepositoryError::AuthenticationFailed
        })?;

        if !verify_password(password, &password_hash)? {
            warn!(email = %email, "登录失败: 密码错误");
            return Err(RepositoryError::AuthenticationFailed);
        }

        info!(email = %email, "登录成功");
        Ok(self.start_session(user_id, email))
    }

    async fn sign_up(&self, email: &str, password: &str) -> RepositoryResult<Session> {
        let email = normalize_email(email);
        if email.is_empty() || !email.contains('@') {
            return Err(RepositoryError::InvalidInput(format!("邮箱格式无效: {}", email)));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(RepositoryError::InvalidInput(format!(
                "密码长度至少 {} 位",
                MIN_PASSWORD_LEN
            )));
        }

        let password_hash = hash_password(password)?;
        let user_id = Uuid::new_v4().to_string();
        {
            let conn = self.get_conn()?;
            let result = conn.execute(
                "INSERT INTO app_user (user_id, email, password_hash, created_at) VALUES (?1, ?2, ?3, ?4)",
                params![user_id, email, password_hash, Utc::now().to_rfc3339()],
            );
            match result.map_err(RepositoryError::from) {
                Ok(_) => {}
                Err(RepositoryError::UniqueConstraintViolation(_)) => {
                    return Err(RepositoryError::UserAlreadyExists(email));
                }
                Err(e) => return Err(e),
            }
        }

        info!(email = %email, "注册成功");
        Ok(self.start_session(user_id, email))
    }

    async fn sign_out(&self) -> RepositoryResult<()> {
        self.hub.set(None);
        info!("已登出");
        Ok(())
    }

    fn current_session(&self) -> Option<Session> {
        self.hub.current()
    }

    fn on_session_change(&self, callback: SessionCallback) -> SessionSubscription {
        self.hub.subscribe(callback)
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn hash_password(password: &str) -> RepositoryResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| RepositoryError::PasswordHashError(e.to_string()))
}

fn verify_password(password: &str, hash: &str) -> RepositoryResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| RepositoryError::PasswordHashError(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
