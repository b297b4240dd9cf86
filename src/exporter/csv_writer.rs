// ==========================================
// 车队驾驶偏差管理系统 - CSV 导出
// ==========================================
// 一张 SheetTable 对应一个 CSV（逗号分隔，首行表头）
// ==========================================

use crate::exporter::error::ExportResult;
use crate::exporter::sheet::SheetTable;
use csv::WriterBuilder;
use std::path::Path;

pub struct CsvExporter;

impl CsvExporter {
    pub fn to_bytes(sheet: &SheetTable) -> ExportResult<Vec<u8>> {
        let mut writer = WriterBuilder::new().has_headers(false).from_writer(Vec::new());

        writer.write_record(&sheet.headers)?;
        for row in &sheet.rows {
            writer.write_record(row.iter().map(|cell| cell.to_text()))?;
        }

        writer
            .into_inner()
            .map_err(|e| anyhow::anyhow!("CSV 缓冲区写入失败: {}", e).into())
    }

    pub fn save<P: AsRef<Path>>(sheet: &SheetTable, path: P) -> ExportResult<()> {
        std::fs::write(path, Self::to_bytes(sheet)?)?;
        Ok(())
    }
}
