// ==========================================
// 车队驾驶偏差管理系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、筛选条件
// 红线: 不含数据访问逻辑,不含统计逻辑
// ==========================================

pub mod deviation;
pub mod filter;
pub mod types;

// 重导出核心类型
pub use deviation::{columns, CellValue, DeviationRecord, RawRow, RecordField, ValidationError};
pub use filter::{is_all, DeviationFilter, ALL};
pub use types::{month_name, month_number_of, QuantityPolicy, TreatmentStatus, MONTH_NAMES};
