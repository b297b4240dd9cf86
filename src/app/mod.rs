// ==========================================
// 车队驾驶偏差管理系统 - 应用层
// ==========================================
// 职责: 记录集容器 + 协作方编排 + 用户提示
// ==========================================

pub mod state;
pub mod workspace;

// 重导出
pub use state::{AppState, Notice, NoticeKind};
pub use workspace::Workspace;
