// ==========================================
// 车队驾驶偏差管理系统 - 导出层
// ==========================================
// 职责: 记录集 → 工作簿 / CSV / 汇报大纲
// ==========================================

pub mod csv_writer;
pub mod error;
pub mod report_deck;
pub mod sheet;
pub mod xlsx_writer;

pub use csv_writer::CsvExporter;
pub use error::{ExportError, ExportResult};
pub use report_deck::{ReportDeck, Slide, SummaryRow, REPORT_TITLE, SUMMARY_TITLE};
pub use sheet::{
    SheetBuilder, SheetTable, DEFAULT_EXPORT_FILE_NAME, SHEET_BASE_ATUAL, SHEET_BASE_TRATADA,
};
pub use xlsx_writer::XlsxExporter;
