// ==========================================
// 存储 / 认证协作方替身 - 用于集成测试
// ==========================================

use async_trait::async_trait;
use fleet_deviation::domain::DeviationRecord;
use fleet_deviation::repository::{
    AuthProvider, DeviationStore, RepositoryError, RepositoryResult, Session, SessionCallback,
    SessionHub, SessionSubscription,
};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

// ==========================================
// InMemoryStore - 内存存储
// ==========================================
#[derive(Default)]
pub struct InMemoryStore {
    rows: Mutex<BTreeMap<String, DeviationRecord>>,
    upsert_calls: AtomicUsize,
}

impl InMemoryStore {
    pub fn with_records(records: Vec<DeviationRecord>) -> Self {
        let store = Self::default();
        {
            let mut rows = store.rows.lock().unwrap();
            for record in records {
                rows.insert(record.id.clone(), record);
            }
        }
        store
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    pub fn get(&self, id: &str) -> Option<DeviationRecord> {
        self.rows.lock().unwrap().get(id).cloned()
    }

    pub fn upsert_calls(&self) -> usize {
        self.upsert_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DeviationStore for InMemoryStore {
    async fn fetch_all(&self) -> RepositoryResult<Vec<DeviationRecord>> {
        let mut records: Vec<DeviationRecord> = self.rows.lock().unwrap().values().cloned().collect();
        records.sort_by(|a, b| b.date.cmp(&a.date));
        for record in &mut records {
            record.is_valid = true;
        }
        Ok(records)
    }

    async fn upsert(&self, records: &[DeviationRecord]) -> RepositoryResult<usize> {
        self.upsert_calls.fetch_add(1, Ordering::SeqCst);
        let mut rows = self.rows.lock().unwrap();
        for record in records {
            rows.insert(record.id.clone(), record.clone());
        }
        Ok(records.len())
    }

    async fn delete_by_id(&self, id: &str) -> RepositoryResult<()> {
        match self.rows.lock().unwrap().remove(id) {
            Some(_) => Ok(()),
            None => Err(RepositoryError::NotFound {
                entity: "deviation".to_string(),
                id: id.to_string(),
            }),
        }
    }
}

// ==========================================
// FailingStore - 所有操作均失败
// ==========================================
pub struct FailingStore;

#[async_trait]
impl DeviationStore for FailingStore {
    async fn fetch_all(&self) -> RepositoryResult<Vec<DeviationRecord>> {
        Err(RepositoryError::DatabaseConnectionError("offline".to_string()))
    }

    async fn upsert(&self, _records: &[DeviationRecord]) -> RepositoryResult<usize> {
        Err(RepositoryError::DatabaseConnectionError("offline".to_string()))
    }

    async fn delete_by_id(&self, _id: &str) -> RepositoryResult<()> {
        Err(RepositoryError::DatabaseConnectionError("offline".to_string()))
    }
}

// ==========================================
// MockAuth - 固定账号的认证替身
// ==========================================
pub struct MockAuth {
    email: String,
    password: String,
    hub: SessionHub,
}

impl MockAuth {
    pub fn new(email: &str, password: &str) -> Self {
        Self {
            email: email.to_string(),
            password: password.to_string(),
            hub: SessionHub::new(),
        }
    }

    fn session(&self) -> Session {
        Session {
            user_id: "user-1".to_string(),
            email: self.email.clone(),
            access_token: "token-1".to_string(),
        }
    }
}

#[async_trait]
impl AuthProvider for MockAuth {
    async fn sign_in(&self, email: &str, password: &str) -> RepositoryResult<Session> {
        if email != self.email || password != self.password {
            return Err(RepositoryError::AuthenticationFailed);
        }
        let session = self.session();
        self.hub.set(Some(session.clone()));
        Ok(session)
    }

    async fn sign_up(&self, email: &str, _password: &str) -> RepositoryResult<Session> {
        Err(RepositoryError::UserAlreadyExists(email.to_string()))
    }

    async fn sign_out(&self) -> RepositoryResult<()> {
        self.hub.set(None);
        Ok(())
    }

    fn current_session(&self) -> Option<Session> {
        self.hub.current()
    }

    fn on_session_change(&self, callback: SessionCallback) -> SessionSubscription {
        self.hub.subscribe(callback)
    }
}
