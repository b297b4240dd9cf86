// ==========================================
// 车队驾驶偏差管理系统 - 应用配置
// ==========================================
// 职责: 清洗策略 / 排名截断 / 存储位置
// 来源: 默认值 → 环境变量 → config_kv 覆写（ConfigManager）
// ==========================================

use crate::domain::QuantityPolicy;
use crate::engine::AggregationLimits;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 存储路径环境变量
pub const DB_PATH_ENV: &str = "FLEET_DEVIATION_DB_PATH";

/// 未填写的占位路径
const PLACEHOLDER_MARKER: &str = "COLE_AQUI";

// ==========================================
// StoreSettings - 云同步存储设置
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSettings {
    pub db_path: Option<String>,
}

impl StoreSettings {
    pub fn new(db_path: impl Into<String>) -> Self {
        Self {
            db_path: Some(db_path.into()),
        }
    }

    /// 从环境变量读取
    pub fn from_env() -> Self {
        Self {
            db_path: std::env::var(DB_PATH_ENV).ok(),
        }
    }

    /// 路径缺失、空白或仍为占位值时视为未配置
    pub fn is_configured(&self) -> bool {
        match self.db_path.as_deref().map(str::trim) {
            Some(path) => !path.is_empty() && !path.contains(PLACEHOLDER_MARKER),
            None => false,
        }
    }

    /// 已配置时返回路径
    pub fn configured_path(&self) -> Option<&str> {
        if self.is_configured() {
            self.db_path.as_deref().map(str::trim)
        } else {
            None
        }
    }
}

// ==========================================
// AppConfig - 配置快照
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    pub quantity_policy: QuantityPolicy,
    pub limits: AggregationLimits,
    pub store: StoreSettings,
}

/// 默认数据库路径
///
/// # 顺序
/// 1. 环境变量 FLEET_DEVIATION_DB_PATH（非空）
/// 2. 用户数据目录 fleet-deviation/fleet_deviation.db
/// 3. ./fleet_deviation.db
pub fn get_default_db_path() -> String {
    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./fleet_deviation.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("fleet-deviation");
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("fleet_deviation.db");
        }
    }

    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_settings_is_configured() {
        assert!(!StoreSettings::default().is_configured());
        assert!(!StoreSettings::new("   ").is_configured());
        assert!(!StoreSettings::new("/dados/COLE_AQUI.db").is_configured());
        assert!(StoreSettings::new("/tmp/frota.db").is_configured());
        assert_eq!(
            StoreSettings::new(" /tmp/frota.db ").configured_path(),
            Some("/tmp/frota.db")
        );
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.quantity_policy, QuantityPolicy::Strict);
        assert_eq!(config.limits.top_drivers, 10);
        assert_eq!(config.limits.driver_detail, 50);
        assert!(!config.store.is_configured());
    }

    #[test]
    fn test_get_default_db_path_is_not_empty() {
        let path = get_default_db_path();
        assert!(path.ends_with(".db"));
    }
}
