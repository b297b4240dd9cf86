// ==========================================
// 车队驾驶偏差管理系统 - 文件解析器实现
// ==========================================
// 阶段 0: 文件读取与解析（表格解析协作方）
// 支持: Excel (.xlsx/.xls) / CSV (.csv)
// 输出: 第一张工作表的行，列名 → 弱类型单元格
// ==========================================

use crate::domain::{CellValue, RawRow};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::normalizer_trait::FileParser;
use calamine::{open_workbook_auto, open_workbook_auto_from_rs, Data, Range, Reader, Sheets};
use csv::ReaderBuilder;
use std::io::{Cursor, Read, Seek};
use std::path::Path;
use tracing::debug;

/// 校验文件存在
fn ensure_exists(path: &Path) -> ImportResult<()> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }
    Ok(())
}

/// 文件扩展名（小写）
fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

/// 跳过完全空白的行
fn is_blank_row(row: &RawRow) -> bool {
    row.values().all(CellValue::is_blank)
}

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl FileParser for CsvParser {
    fn parse_to_raw_rows(&self, file_path: &Path) -> ImportResult<Vec<RawRow>> {
        ensure_exists(file_path)?;

        let ext = extension_of(file_path);
        if ext != "csv" {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let bytes = std::fs::read(file_path)?;
        self.parse_bytes(&bytes)
    }

    fn parse_bytes(&self, bytes: &[u8]) -> ImportResult<Vec<RawRow>> {
        // 跳过 UTF-8 BOM（Excel 另存为 CSV 时常见）
        let bytes = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(bytes);
        let delimiter = Self::sniff_delimiter(bytes);

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .delimiter(delimiter)
            .flexible(true) // 允许行长度不一致
            .from_reader(bytes);

        // 读取表头
        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        // 读取所有行
        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            let mut row = RawRow::new();

            for (col_idx, value) in record.iter().enumerate() {
                if let Some(header) = headers.get(col_idx) {
                    row.insert(header.clone(), Self::infer_cell(value));
                }
            }

            if is_blank_row(&row) {
                continue;
            }
            rows.push(row);
        }

        debug!(rows = rows.len(), delimiter = %(delimiter as char), "CSV 解析完成");
        Ok(rows)
    }
}

impl CsvParser {
    /// 推断单元格类型：可解析为数值 → Number，空白 → Empty，其余 → Text
    fn infer_cell(value: &str) -> CellValue {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return CellValue::Empty;
        }
        match trimmed.parse::<f64>() {
            Ok(n) if n.is_finite() => CellValue::Number(n),
            _ => CellValue::Text(value.to_string()),
        }
    }

    /// 根据表头行判断分隔符（';' 或 ','）
    fn sniff_delimiter(bytes: &[u8]) -> u8 {
        let header_line = bytes.split(|b| *b == b'\n').next().unwrap_or(&[]);
        let semicolons = header_line.iter().filter(|b| **b == b';').count();
        let commas = header_line.iter().filter(|b| **b == b',').count();
        if semicolons > commas {
            b';'
        } else {
            b','
        }
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
pub struct ExcelParser;

impl FileParser for ExcelParser {
    fn parse_to_raw_rows(&self, file_path: &Path) -> ImportResult<Vec<RawRow>> {
        ensure_exists(file_path)?;

        let ext = extension_of(file_path);
        if ext != "xlsx" && ext != "xls" {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let workbook = open_workbook_auto(file_path)?;
        Self::read_first_sheet(workbook)
    }

    fn parse_bytes(&self, bytes: &[u8]) -> ImportResult<Vec<RawRow>> {
        let workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;
        Self::read_first_sheet(workbook)
    }
}

impl ExcelParser {
    /// 读取第一张工作表
    fn read_first_sheet<RS: Read + Seek>(mut workbook: Sheets<RS>) -> ImportResult<Vec<RawRow>> {
        let sheet_names = workbook.sheet_names();
        let sheet_name = sheet_names
            .first()
            .cloned()
            .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无工作表".to_string()))?;

        let range = workbook.worksheet_range(&sheet_name)?;
        let rows = Self::range_to_rows(&range)?;

        debug!(sheet = %sheet_name, rows = rows.len(), "Excel 解析完成");
        Ok(rows)
    }

    /// 第一行为表头，其余为数据行
    fn range_to_rows(range: &Range<Data>) -> ImportResult<Vec<RawRow>> {
        let mut iter = range.rows();
        let header_row = iter
            .next()
            .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无数据行".to_string()))?;

        let headers: Vec<String> = header_row
            .iter()
            .map(|cell| cell.to_string().trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for data_row in iter {
            let mut row = RawRow::new();
            for (col_idx, cell) in data_row.iter().enumerate() {
                if let Some(header) = headers.get(col_idx) {
                    if header.is_empty() {
                        continue;
                    }
                    row.insert(header.clone(), Self::convert_cell(cell));
                }
            }

            if is_blank_row(&row) {
                continue;
            }
            rows.push(row);
        }

        Ok(rows)
    }

    /// calamine 单元格 → CellValue
    #[allow(unreachable_patterns)]
    fn convert_cell(cell: &Data) -> CellValue {
        match cell {
            Data::Int(i) => CellValue::Number(*i as f64),
            Data::Float(f) => CellValue::Number(*f),
            Data::String(s) if s.trim().is_empty() => CellValue::Empty,
            Data::String(s) => CellValue::Text(s.clone()),
            Data::Bool(b) => CellValue::Text(if *b { "TRUE" } else { "FALSE" }.to_string()),
            Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
            Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
            Data::Error(_) | Data::Empty => CellValue::Empty,
            _ => CellValue::Empty,
        }
    }
}

// ==========================================
// 通用文件解析器（根据扩展名自动选择）
// ==========================================
pub struct UniversalFileParser;

impl UniversalFileParser {
    pub fn parse<P: AsRef<Path>>(&self, file_path: P) -> ImportResult<Vec<RawRow>> {
        let path = file_path.as_ref();
        match extension_of(path).as_str() {
            "csv" => CsvParser.parse_to_raw_rows(path),
            "xlsx" | "xls" => ExcelParser.parse_to_raw_rows(path),
            other => Err(ImportError::UnsupportedFormat(other.to_string())),
        }
    }

    /// 按文件名扩展名解析字节流（上传场景）
    pub fn parse_bytes(&self, file_name: &str, bytes: &[u8]) -> ImportResult<Vec<RawRow>> {
        match extension_of(Path::new(file_name)).as_str() {
            "csv" => CsvParser.parse_bytes(bytes),
            "xlsx" | "xls" => ExcelParser.parse_bytes(bytes),
            other => Err(ImportError::UnsupportedFormat(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    fn csv_file(content: &str) -> tempfile::NamedTempFile {
        let mut temp_file = Builder::new().suffix(".csv").tempfile().unwrap();
        write!(temp_file, "{}", content).unwrap();
        temp_file
    }

    #[test]
    fn test_csv_parser_valid_file() {
        let temp_file = csv_file(
            "MOTORISTAS,TIPO DE DESVIO,QTD,DATA\n\
             joão,excesso de velocidade,3,2023-01-01\n\
             maria,frenagem brusca,1,44927\n",
        );

        let rows = CsvParser.parse_to_raw_rows(temp_file.path()).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["MOTORISTAS"], CellValue::text("joão"));
        assert_eq!(rows[0]["QTD"], CellValue::Number(3.0));
        assert_eq!(rows[0]["DATA"], CellValue::text("2023-01-01"));
        assert_eq!(rows[1]["DATA"], CellValue::Number(44927.0));
    }

    #[test]
    fn test_csv_parser_semicolon_and_bom() {
        let content = "\u{feff}MOTORISTAS;QTD\nana;2\n";
        let rows = CsvParser.parse_bytes(content.as_bytes()).unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["MOTORISTAS"], CellValue::text("ana"));
        assert_eq!(rows[0]["QTD"], CellValue::Number(2.0));
    }

    #[test]
    fn test_csv_parser_file_not_found() {
        let result = CsvParser.parse_to_raw_rows(Path::new("non_existent.csv"));
        assert!(matches!(result, Err(ImportError::FileNotFound(_))));
    }

    #[test]
    fn test_csv_parser_skip_empty_rows() {
        let temp_file = csv_file("MOTORISTAS,QTD\nana,2\n,\nbeto,3\n");
        let rows = CsvParser.parse_to_raw_rows(temp_file.path()).unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_universal_parser_rejects_unknown_extension() {
        let result = UniversalFileParser.parse("dados.pdf");
        assert!(matches!(result, Err(ImportError::UnsupportedFormat(ext)) if ext == "pdf"));

        let result = UniversalFileParser.parse_bytes("dados.txt", b"a,b");
        assert!(matches!(result, Err(ImportError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_excel_parser_rejects_garbage_bytes() {
        let result = ExcelParser.parse_bytes(b"not a workbook");
        assert!(result.is_err());
    }
}
