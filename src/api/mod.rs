// ==========================================
// 车队驾驶偏差管理系统 - API 层
// ==========================================
// 职责: 面向界面层的业务接口
// ==========================================

pub mod dashboard_api;
pub mod error;
pub mod export_api;
pub mod import_api;

pub use dashboard_api::DashboardApi;
pub use error::{ApiError, ApiResult};
pub use export_api::ExportApi;
pub use import_api::ImportApi;
