// ==========================================
// 车队驾驶偏差管理系统 - 引擎层
// ==========================================
// 职责: 筛选与统计（驾驶舱视图）
// 红线: 引擎不访问存储，不修改输入
// ==========================================

pub mod aggregation;
pub mod filter;
pub mod options;

// 重导出核心引擎
pub use aggregation::{
    AggregationLimits, Aggregator, DashboardKpis, DashboardView, DriverTreatmentDetail,
    MonthlyEvolution, NameValue,
};
pub use filter::RecordFilter;
pub use options::{month_vocabulary, order_months, FilterOptions};
