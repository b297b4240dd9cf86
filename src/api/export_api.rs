// ==========================================
// 导出API
// ==========================================
// 职责: 工作簿 / CSV / 汇报大纲导出
// 规则:
// - 标准导出: BASE_ATUAL = 全部记录，BASE_TRATADA = 处理集中的有效记录
// - 筛选导出: 两张表都来自筛选后的记录
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::{DeviationFilter, DeviationRecord};
use crate::engine::{DashboardView, RecordFilter};
use crate::exporter::{
    CsvExporter, ReportDeck, SheetBuilder, SheetTable, XlsxExporter, SHEET_BASE_ATUAL,
    SHEET_BASE_TRATADA,
};
use chrono::NaiveDate;
use std::path::Path;
use tracing::info;

#[derive(Default)]
pub struct ExportApi;

impl ExportApi {
    pub fn new() -> Self {
        Self
    }

    /// 工作簿字节流
    pub fn export_workbook(
        &self,
        all: &[DeviationRecord],
        treated: &[DeviationRecord],
    ) -> ApiResult<Vec<u8>> {
        Ok(XlsxExporter::to_buffer(&SheetBuilder::workbook(all, treated))?)
    }

    /// 保存工作簿
    pub fn save_workbook<P: AsRef<Path>>(
        &self,
        all: &[DeviationRecord],
        treated: &[DeviationRecord],
        path: P,
    ) -> ApiResult<()> {
        XlsxExporter::save(&SheetBuilder::workbook(all, treated), path)?;
        Ok(())
    }

    /// 筛选导出（两张表均为筛选结果）
    pub fn export_filtered(
        &self,
        records: &[DeviationRecord],
        filter: &DeviationFilter,
    ) -> ApiResult<Vec<u8>> {
        let filtered: Vec<DeviationRecord> = RecordFilter::apply(records, filter)
            .into_iter()
            .cloned()
            .collect();
        info!(filter = %filter.describe(), count = filtered.len(), "筛选导出");
        self.export_workbook(&filtered, &filtered)
    }

    /// 单表 CSV
    ///
    /// # 参数
    /// - sheet_name: BASE_ATUAL 或 BASE_TRATADA
    pub fn export_csv(&self, records: &[DeviationRecord], sheet_name: &str) -> ApiResult<Vec<u8>> {
        let sheet: SheetTable = match sheet_name {
            SHEET_BASE_ATUAL => SheetBuilder::base_atual(records),
            SHEET_BASE_TRATADA => SheetBuilder::base_tratada(records),
            other => {
                return Err(ApiError::InvalidInput(format!("未知的工作表: {}", other)));
            }
        };
        Ok(CsvExporter::to_bytes(&sheet)?)
    }

    /// 汇报大纲
    pub fn build_report(&self, view: &DashboardView, generated_on: NaiveDate) -> ReportDeck {
        ReportDeck::build(view, generated_on)
    }
}
