// ==========================================
// 车队驾驶偏差管理系统 - 偏差记录存储
// ==========================================
// 职责: 云端记录存储协作方（全量读取 / 按 id upsert / 按 id 删除）
// 红线: Repository 不含业务逻辑
// 约定:
// - upsert 以 id 为冲突键，后写覆盖（last-write-wins）
// - upsert 不写 is_valid；DATA 统一为 YYYY-MM-DD
// - 读取的记录一律 is_valid = true（信任已持久化数据）
// ==========================================

use crate::domain::{DeviationRecord, TreatmentStatus};
use crate::importer::DataCleanerImpl;
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

// ==========================================
// DeviationStore Trait
// ==========================================
// 用途: 注入式存储协作方
// 实现者: SqliteDeviationStore（测试中另有内存实现）
#[async_trait]
pub trait DeviationStore: Send + Sync {
    /// 读取全部记录（按 DATA 降序）
    async fn fetch_all(&self) -> RepositoryResult<Vec<DeviationRecord>>;

    /// 按 id 批量写入
    ///
    /// # 返回
    /// - Ok(usize): 写入条数
    /// - Err: 数据库错误（整个事务回滚）
    async fn upsert(&self, records: &[DeviationRecord]) -> RepositoryResult<usize>;

    /// 按 id 删除（不存在时返回 NotFound）
    async fn delete_by_id(&self, id: &str) -> RepositoryResult<()>;
}

/// 持久化时的日期格式：可解析则为 YYYY-MM-DD，否则保留原文
pub fn storage_date(raw: &str) -> String {
    DataCleanerImpl
        .parse_date_text(raw)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| raw.trim().to_string())
}

// ==========================================
// SqliteDeviationStore
// ==========================================
pub struct SqliteDeviationStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteDeviationStore {
    /// 打开数据库（自动建表）
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        Ok(Self {
            conn: crate::db::open_shared(db_path)?,
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }
}

#[async_trait]
impl DeviationStore for SqliteDeviationStore {
    async fn fetch_all(&self) -> RepositoryResult<Vec<DeviationRecord>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT
                id, driver, deviation_type, quantity, month,
                treated, treatment_action, event_date, status, applied_by,
                year, month_number, week
            FROM deviations
            ORDER BY event_date DESC, id ASC
            "#,
        )?;

        let records = stmt
            .query_map([], |row| {
                Ok(DeviationRecord {
                    id: row.get(0)?,
                    driver: row.get(1)?,
                    deviation_type: row.get(2)?,
                    quantity: row.get::<_, i64>(3)?.clamp(0, u32::MAX as i64) as u32,
                    month: row.get(4)?,
                    treated: TreatmentStatus::from_label(&row.get::<_, String>(5)?),
                    treatment_action: row.get(6)?,
                    date: row.get(7)?,
                    status: row.get(8)?,
                    applied_by: row.get(9)?,
                    year: row.get(10)?,
                    month_number: row.get(11)?,
                    week: row.get(12)?,
                    is_valid: true,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        debug!(count = records.len(), "读取偏差记录");
        Ok(records)
    }

    async fn upsert(&self, records: &[DeviationRecord]) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        let now = Utc::now().to_rfc3339();

        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO deviations (
                    id, driver, deviation_type, quantity, month,
                    treated, treatment_action, event_date, status, applied_by,
                    year, month_number, week, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
                ON CONFLICT(id) DO UPDATE SET
                    driver = excluded.driver,
                    deviation_type = excluded.deviation_type,
                    quantity = excluded.quantity,
                    month = excluded.month,
                    treated = excluded.treated,
                    treatment_action = excluded.treatment_action,
                    event_date = excluded.event_date,
                    status = excluded.status,
                    applied_by = excluded.applied_by,
                    year = excluded.year,
                    month_number = excluded.month_number,
                    week = excluded.week,
                    updated_at = excluded.updated_at
                "#,
            )?;

            for record in records {
                stmt.execute(params![
                    record.id,
                    record.driver,
                    record.deviation_type,
                    record.quantity as i64,
                    record.month,
                    record.treated.label(),
                    record.treatment_action,
                    storage_date(&record.date),
                    record.status,
                    record.applied_by,
                    record.year,
                    record.month_number,
                    record.week,
                    now,
                ])?;
            }
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        info!(count = records.len(), "偏差记录已写入");
        Ok(records.len())
    }

    async fn delete_by_id(&self, id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM deviations WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "deviation".to_string(),
                id: id.to_string(),
            });
        }
        debug!(id = %id, "偏差记录已删除");
        Ok(())
    }
}
