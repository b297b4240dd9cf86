// ==========================================
// 车队驾驶偏差管理系统 - 配置层
// ==========================================
// 职责: 系统配置管理,支持覆写
// 存储: config_kv 表
// ==========================================

pub mod app_config;
pub mod config_manager;

// 重导出核心配置
pub use app_config::{get_default_db_path, AppConfig, StoreSettings, DB_PATH_ENV};
pub use config_manager::{config_keys, ConfigManager};
