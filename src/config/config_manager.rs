// ==========================================
// 车队驾驶偏差管理系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value)
// 规则: 缺失或格式错误的值回退为默认值（记录告警，不报错）
// ==========================================

use crate::config::app_config::{AppConfig, StoreSettings};
use crate::db::open_shared;
use crate::domain::QuantityPolicy;
use crate::repository::{RepositoryError, RepositoryResult};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use tracing::warn;

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 打开数据库（自动建表）
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        Ok(Self {
            conn: open_shared(db_path)?,
        })
    }

    /// 从已有连接创建 ConfigManager
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 读取配置值
    pub fn get_value(&self, key: &str) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;
        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// 写入配置值（覆写）
    pub fn set_value(&self, key: &str, value: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO config_kv (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    /// 删除配置值（恢复默认）
    pub fn remove_value(&self, key: &str) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM config_kv WHERE key = ?1", params![key])?;
        Ok(affected > 0)
    }

    /// 全部配置项（按键排序）
    pub fn snapshot(&self) -> RepositoryResult<BTreeMap<String, String>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare("SELECT key, value FROM config_kv ORDER BY key")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut map = BTreeMap::new();
        for row in rows {
            let (key, value) = row?;
            map.insert(key, value);
        }
        Ok(map)
    }

    /// 生成配置快照
    ///
    /// # 参数
    /// - store: 存储设置（由调用方从环境变量等处解析）
    pub fn load_app_config(&self, store: StoreSettings) -> RepositoryResult<AppConfig> {
        let mut config = AppConfig {
            store,
            ..AppConfig::default()
        };

        if let Some(raw) = self.get_value(config_keys::QUANTITY_POLICY)? {
            match raw.parse::<QuantityPolicy>() {
                Ok(policy) => config.quantity_policy = policy,
                Err(e) => warn!(key = config_keys::QUANTITY_POLICY, error = %e, "配置值无效，使用默认值"),
            }
        }

        config.limits.top_drivers = self.get_usize_or(
            config_keys::TOP_DRIVERS_LIMIT,
            config.limits.top_drivers,
        )?;
        config.limits.driver_detail = self.get_usize_or(
            config_keys::DRIVER_DETAIL_LIMIT,
            config.limits.driver_detail,
        )?;

        Ok(config)
    }

    fn get_usize_or(&self, key: &str, default: usize) -> RepositoryResult<usize> {
        Ok(match self.get_value(key)? {
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(v) if v > 0 => v,
                _ => {
                    warn!(key = key, value = %raw, "配置值无效，使用默认值");
                    default
                }
            },
            None => default,
        })
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 清洗
    pub const QUANTITY_POLICY: &str = "quantity_policy";

    // 统计
    pub const TOP_DRIVERS_LIMIT: &str = "top_drivers_limit";
    pub const DRIVER_DETAIL_LIMIT: &str = "driver_detail_limit";
}
