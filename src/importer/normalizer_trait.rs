// ==========================================
// 车队驾驶偏差管理系统 - 清洗管道 Trait
// ==========================================
// 职责: 定义清洗管道各阶段接口（不包含实现）
// 管道: 解析 → 映射 → 清洗 → 派生 → 校验
// ==========================================

use crate::domain::{CellValue, DeviationRecord, QuantityPolicy, RawRow, ValidationError};
use crate::importer::error::ImportResult;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

// ==========================================
// RawDeviationRecord - 映射后的中间结构
// ==========================================
// 文本字段: 非空白时为 Some（未 TRIM）
// QTD / DATA 保留原始单元格，交由清洗阶段统一转换
#[derive(Debug, Clone, PartialEq)]
pub struct RawDeviationRecord {
    pub row_number: usize,
    pub driver: Option<String>,
    pub deviation_type: Option<String>,
    pub quantity: CellValue,
    pub month: Option<String>,
    pub treated: Option<String>,
    pub treatment_action: Option<String>,
    pub date: CellValue,
    pub status: Option<String>,
    pub applied_by: Option<String>,
}

// ==========================================
// CalendarFields - 日期派生字段
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarFields {
    pub year: i32,
    pub month_number: u32,
    pub week: u32,
}

// ==========================================
// NormalizeSummary - 清洗汇总
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizeSummary {
    pub total_rows: usize,
    pub valid: usize,
    pub invalid: usize,
    pub error_count: usize,
    pub errors_by_field: BTreeMap<String, usize>,
}

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 表格解析协作方（阶段 0）
// 实现者: ExcelParser, CsvParser
pub trait FileParser: Send + Sync {
    /// 解析文件为原始行（列名 → 单元格）
    fn parse_to_raw_rows(&self, file_path: &Path) -> ImportResult<Vec<RawRow>>;

    /// 解析内存中的字节流
    fn parse_bytes(&self, bytes: &[u8]) -> ImportResult<Vec<RawRow>>;
}

// ==========================================
// FieldMapper Trait
// ==========================================
// 用途: 列名映射（阶段 1），唯一的弱类型入口
// 实现者: FieldMapperImpl
pub trait FieldMapper: Send + Sync {
    /// 将原始行映射为 RawDeviationRecord
    ///
    /// # 参数
    /// - row: 原始行
    /// - row_number: 行号（从 1 开始）
    fn map_to_raw_deviation(&self, row: &RawRow, row_number: usize) -> RawDeviationRecord;
}

// ==========================================
// DataCleaner Trait
// ==========================================
// 用途: 数据清洗（阶段 2）
// 实现者: DataCleanerImpl
pub trait DataCleaner: Send + Sync {
    /// 清洗文本字段（TRIM，可选 UPPER）
    fn clean_text(&self, value: &str, uppercase: bool) -> String;

    /// 标准化 NULL 值（空字符串/空白 → None）
    fn normalize_null(&self, value: Option<String>) -> Option<String>;

    /// 解析数量（QTD），失败记 0，永不为负
    fn parse_quantity(&self, value: &CellValue, policy: QuantityPolicy) -> u32;

    /// 解析事件日期（Excel 序列号 / 文本日期）
    ///
    /// # 返回
    /// - Some(NaiveDate): 合法日历日期
    /// - None: 缺失或无法解析
    fn parse_date(&self, value: &CellValue) -> Option<NaiveDate>;
}

// ==========================================
// DerivationService Trait
// ==========================================
// 用途: 日历字段派生（阶段 3）
// 实现者: DerivationServiceImpl
pub trait DerivationService: Send + Sync {
    /// 派生 year / month_number / week
    fn derive_calendar(&self, date: NaiveDate) -> CalendarFields;

    /// 派生月份名
    ///
    /// # 规则
    /// - 原始 MÊS 非空 → 使用原始值（TRIM + UPPER）
    /// - 否则 → 月份表中 month_number 对应名称
    fn derive_month_label(&self, raw_month: Option<&str>, month_number: u32) -> String;
}

// ==========================================
// DqValidator Trait
// ==========================================
// 用途: 必填校验（阶段 4）
// 实现者: DqValidatorImpl
pub trait DqValidator: Send + Sync {
    /// 校验必填字段（MOTORISTAS / TIPO DE DESVIO / DATA）
    ///
    /// # 参数
    /// - row_number: 行号
    /// - driver / deviation_type: 清洗后的文本
    /// - date: 解析后的日期（缺失与非法合并为同一条错误）
    fn validate_required_fields(
        &self,
        row_number: usize,
        driver: &str,
        deviation_type: &str,
        date: Option<NaiveDate>,
    ) -> Vec<ValidationError>;

    /// 生成清洗汇总
    fn summarize(&self, records: &[DeviationRecord], errors: &[ValidationError])
        -> NormalizeSummary;
}

// ==========================================
// DeviationImporter Trait
// ==========================================
// 用途: 导入主接口（文件 → 清洗结果）
// 实现者: DeviationImporterImpl
#[async_trait::async_trait]
pub trait DeviationImporter: Send + Sync {
    /// 从文件导入（按扩展名选择解析器）
    ///
    /// # 返回
    /// - Ok(ImportReport): 批次信息 + 清洗结果
    /// - Err: 文件不存在、格式不支持、解析失败
    async fn import_file<P: AsRef<Path> + Send>(&self, file_path: P) -> ImportResult<ImportReport>;

    /// 从内存字节流导入（上传场景）
    async fn import_bytes(&self, file_name: &str, bytes: &[u8]) -> ImportResult<ImportReport>;

    /// 批量导入多个文件（并发执行）
    ///
    /// # 说明
    /// - 每个文件的导入互不影响，失败以字符串形式返回
    async fn batch_import<P: AsRef<Path> + Send + Sync>(
        &self,
        file_paths: Vec<P>,
    ) -> Vec<Result<ImportReport, String>>;
}

// ==========================================
// ImportReport - 单次导入结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportReport {
    pub batch_id: String,
    pub file_name: String,
    pub imported_at: chrono::DateTime<chrono::Utc>,
    pub elapsed_ms: u64,
    pub records: Vec<DeviationRecord>,
    pub errors: Vec<ValidationError>,
    pub summary: NormalizeSummary,
}
