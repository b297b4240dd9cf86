// ==========================================
// 车队驾驶偏差管理系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 记录存储与认证协作方，屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod auth;
pub mod deviation_store;
pub mod error;

// 重导出核心仓储
pub use auth::{
    AuthProvider, Session, SessionCallback, SessionHub, SessionSubscription, SqliteAuthProvider,
};
pub use deviation_store::{storage_date, DeviationStore, SqliteDeviationStore};
pub use error::{RepositoryError, RepositoryResult};
