// ==========================================
// 车队驾驶偏差管理系统 - 导入层
// ==========================================
// 职责: 外部表格导入，生成标准偏差记录
// 支持: Excel, CSV, JSON 行
// ==========================================

// 模块声明
pub mod data_cleaner;
pub mod derivation;
pub mod deviation_importer;
pub mod dq_validator;
pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod normalizer;
pub mod normalizer_trait;

// 重导出核心类型
pub use data_cleaner::DataCleaner as DataCleanerImpl;
pub use derivation::DerivationService as DerivationServiceImpl;
pub use deviation_importer::DeviationImporterImpl;
pub use dq_validator::{DqValidator as DqValidatorImpl, REQUIRED_FIELD_MESSAGE};
pub use error::{ImportError, ImportResult};
pub use field_mapper::FieldMapper as FieldMapperImpl;
pub use file_parser::{CsvParser, ExcelParser, UniversalFileParser};
pub use normalizer::{NormalizeOutcome, Normalizer};

// 重导出 Trait 接口
pub use normalizer_trait::{
    CalendarFields, DataCleaner, DerivationService, DeviationImporter, DqValidator, FieldMapper,
    FileParser, ImportReport, NormalizeSummary, RawDeviationRecord,
};
