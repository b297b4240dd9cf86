// ==========================================
// 车队驾驶偏差管理系统 - Excel 导出
// ==========================================
// 工具: rust_xlsxwriter
// 每张 SheetTable 写入一个同名工作表，首行为加粗表头
// ==========================================

use crate::domain::CellValue;
use crate::exporter::error::ExportResult;
use crate::exporter::sheet::SheetTable;
use rust_xlsxwriter::{Format, Workbook};
use std::path::Path;
use tracing::info;

pub struct XlsxExporter;

impl XlsxExporter {
    /// 生成工作簿字节流
    pub fn to_buffer(sheets: &[SheetTable]) -> ExportResult<Vec<u8>> {
        let mut workbook = Self::build(sheets)?;
        Ok(workbook.save_to_buffer()?)
    }

    /// 保存工作簿到文件
    pub fn save<P: AsRef<Path>>(sheets: &[SheetTable], path: P) -> ExportResult<()> {
        let buffer = Self::to_buffer(sheets)?;
        std::fs::write(path.as_ref(), buffer)?;
        info!(
            path = %path.as_ref().display(),
            sheets = sheets.len(),
            "工作簿已保存"
        );
        Ok(())
    }

    fn build(sheets: &[SheetTable]) -> ExportResult<Workbook> {
        let mut workbook = Workbook::new();
        let header_format = Format::new().set_bold();

        for sheet in sheets {
            let worksheet = workbook.add_worksheet();
            worksheet.set_name(&sheet.name)?;

            for (col, header) in sheet.headers.iter().enumerate() {
                worksheet.write_string_with_format(0, col as u16, header, &header_format)?;
            }

            for (row_idx, row) in sheet.rows.iter().enumerate() {
                let row_num = (row_idx + 1) as u32;
                for (col, cell) in row.iter().enumerate() {
                    match cell {
                        CellValue::Number(n) => {
                            worksheet.write_number(row_num, col as u16, *n)?;
                        }
                        CellValue::Text(s) if !s.is_empty() => {
                            worksheet.write_string(row_num, col as u16, s)?;
                        }
                        _ => {}
                    }
                }
            }
        }

        Ok(workbook)
    }
}
