// ==========================================
// 车队驾驶偏差管理系统 - 核心库
// ==========================================
// 职责: 偏差表格导入清洗、统计分析、导出与云同步
// 技术栈: Rust + SQLite
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "pt-BR");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 存储与认证协作方
pub mod repository;

// 引擎层 - 筛选与统计
pub mod engine;

// 导入层 - 表格解析与清洗
pub mod importer;

// 导出层 - 工作簿 / CSV / 汇报大纲
pub mod exporter;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 业务接口
pub mod api;

// 应用层 - 状态容器
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::{
    CellValue, DeviationFilter, DeviationRecord, QuantityPolicy, RawRow, RecordField,
    TreatmentStatus, ValidationError,
};

// 清洗与统计
pub use engine::{Aggregator, DashboardView};
pub use importer::{NormalizeOutcome, Normalizer};

// API
pub use api::{ApiError, ApiResult, DashboardApi, ExportApi, ImportApi};

// 应用
pub use app::{AppState, Notice, NoticeKind, Workspace};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "Gestão de Desvios";
