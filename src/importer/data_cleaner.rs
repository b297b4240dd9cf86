// ==========================================
// 车队驾驶偏差管理系统 - 数据清洗器实现
// ==========================================
// 职责: TRIM / UPPER / NULL 标准化 / 数量与日期转换
// 约束: 转换失败降级为安全默认值（数量 0 / 日期缺失），不报错
// ==========================================

use crate::domain::{CellValue, QuantityPolicy};
use crate::importer::normalizer_trait::DataCleaner as DataCleanerTrait;
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};

/// Excel 序列号 25569 = 1970-01-01
pub const EXCEL_UNIX_EPOCH_SERIAL: i64 = 25569;

/// Excel 可表示的最大序列号（9999-12-31）
pub const EXCEL_MAX_SERIAL: f64 = 2_958_465.0;

/// 文本日期支持的格式
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%d-%m-%Y"];

/// 文本日期时间支持的格式（取日期部分）
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

pub struct DataCleaner;

impl DataCleanerTrait for DataCleaner {
    fn clean_text(&self, value: &str, uppercase: bool) -> String {
        let trimmed = value.trim();
        if uppercase {
            trimmed.to_uppercase()
        } else {
            trimmed.to_string()
        }
    }

    fn normalize_null(&self, value: Option<String>) -> Option<String> {
        value.and_then(|v| {
            let trimmed = v.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        })
    }

    fn parse_quantity(&self, value: &CellValue, policy: QuantityPolicy) -> u32 {
        match value {
            CellValue::Empty => 0,
            CellValue::Number(n) => {
                if n.is_finite() && *n >= 0.0 && n.fract() == 0.0 {
                    n.min(u32::MAX as f64) as u32
                } else {
                    match policy {
                        QuantityPolicy::Strict => 0,
                        QuantityPolicy::ExtractDigits => self.extract_digits(&value.to_text()),
                    }
                }
            }
            CellValue::Text(text) => match policy {
                QuantityPolicy::Strict => text.trim().parse::<u32>().unwrap_or(0),
                QuantityPolicy::ExtractDigits => self.extract_digits(text),
            },
        }
    }

    fn parse_date(&self, value: &CellValue) -> Option<NaiveDate> {
        match value {
            CellValue::Empty => None,
            CellValue::Number(serial) => self
                .excel_serial_to_date(*serial)
                .or_else(|| self.parse_date_yyyymmdd_number(*serial)),
            CellValue::Text(text) => self.parse_date_text(text),
        }
    }
}

impl DataCleaner {
    /// Excel 序列号 → 日期
    ///
    /// # 规则
    /// - 日期 = 1970-01-01 + (serial - 25569) 天（小数部分为当天时间，舍去）
    /// - 有效范围: 1 ..= 2958465
    pub fn excel_serial_to_date(&self, serial: f64) -> Option<NaiveDate> {
        if !serial.is_finite() || !(1.0..EXCEL_MAX_SERIAL + 1.0).contains(&serial) {
            return None;
        }
        let days = serial.floor() as i64 - EXCEL_UNIX_EPOCH_SERIAL;
        NaiveDate::from_ymd_opt(1970, 1, 1)?.checked_add_signed(Duration::days(days))
    }

    /// 数值形式的 YYYYMMDD（如 20250120）
    fn parse_date_yyyymmdd_number(&self, value: f64) -> Option<NaiveDate> {
        if value.fract() != 0.0 || !(10_000_101.0..=99_991_231.0).contains(&value) {
            return None;
        }
        NaiveDate::parse_from_str(&format!("{}", value as i64), "%Y%m%d").ok()
    }

    /// 文本日期解析
    ///
    /// # 支持格式
    /// - 纯数字 4 位: 年份（取当年 1 月 1 日）
    /// - 纯数字 8 位: YYYYMMDD
    /// - 纯数字 5~7 位: Excel 序列号；其余位数不是日期
    /// - YYYY-MM-DD / YYYY/MM/DD / DD/MM/YYYY / DD-MM-YYYY
    /// - RFC 3339 / ISO 日期时间（换算到 UTC 取日期）
    pub fn parse_date_text(&self, value: &str) -> Option<NaiveDate> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return None;
        }

        if trimmed.chars().all(|c| c.is_ascii_digit()) {
            return match trimmed.len() {
                4 => trimmed
                    .parse::<i32>()
                    .ok()
                    .and_then(|year| NaiveDate::from_ymd_opt(year, 1, 1)),
                8 => NaiveDate::parse_from_str(trimmed, "%Y%m%d").ok(),
                5..=7 => trimmed
                    .parse::<f64>()
                    .ok()
                    .and_then(|serial| self.excel_serial_to_date(serial)),
                _ => None,
            };
        }

        for fmt in DATE_FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(trimmed, fmt) {
                return Some(date);
            }
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
            return Some(dt.with_timezone(&Utc).date_naive());
        }

        DATETIME_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
            .map(|dt| dt.date())
    }

    /// 剔除非数字字符后解析（溢出或无数字 → 0）
    fn extract_digits(&self, value: &str) -> u32 {
        let digits: String = value.chars().filter(|c| c.is_ascii_digit()).collect();
        digits.parse::<u32>().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_clean_text_basic() {
        let cleaner = DataCleaner;
        assert_eq!(cleaner.clean_text("  joão silva  ", false), "joão silva");
        assert_eq!(cleaner.clean_text("  joão silva  ", true), "JOÃO SILVA");
    }

    #[test]
    fn test_normalize_null() {
        let cleaner = DataCleaner;
        assert_eq!(cleaner.normalize_null(Some("  ".to_string())), None);
        assert_eq!(cleaner.normalize_null(Some("".to_string())), None);
        assert_eq!(
            cleaner.normalize_null(Some("  value  ".to_string())),
            Some("value".to_string())
        );
        assert_eq!(cleaner.normalize_null(None), None);
    }

    #[test]
    fn test_parse_quantity_numbers() {
        let cleaner = DataCleaner;
        for policy in [QuantityPolicy::Strict, QuantityPolicy::ExtractDigits] {
            assert_eq!(cleaner.parse_quantity(&CellValue::Number(4.0), policy), 4);
            assert_eq!(cleaner.parse_quantity(&CellValue::Empty, policy), 0);
            assert_eq!(cleaner.parse_quantity(&CellValue::text("12"), policy), 12);
            assert_eq!(cleaner.parse_quantity(&CellValue::text(" 7 "), policy), 7);
            assert_eq!(cleaner.parse_quantity(&CellValue::Number(f64::NAN), policy), 0);
        }
    }

    #[test]
    fn test_parse_quantity_strict_rejects_mixed_text() {
        let cleaner = DataCleaner;
        let policy = QuantityPolicy::Strict;
        assert_eq!(cleaner.parse_quantity(&CellValue::text("3x"), policy), 0);
        assert_eq!(cleaner.parse_quantity(&CellValue::text("-3"), policy), 0);
        assert_eq!(cleaner.parse_quantity(&CellValue::text("abc"), policy), 0);
        assert_eq!(cleaner.parse_quantity(&CellValue::Number(-3.0), policy), 0);
        assert_eq!(cleaner.parse_quantity(&CellValue::Number(2.5), policy), 0);
    }

    #[test]
    fn test_parse_quantity_extract_digits() {
        let cleaner = DataCleaner;
        let policy = QuantityPolicy::ExtractDigits;
        assert_eq!(cleaner.parse_quantity(&CellValue::text("3x"), policy), 3);
        assert_eq!(cleaner.parse_quantity(&CellValue::text("-3"), policy), 3);
        assert_eq!(cleaner.parse_quantity(&CellValue::text("abc"), policy), 0);
        assert_eq!(cleaner.parse_quantity(&CellValue::text("99999999999"), policy), 0);
        assert_eq!(cleaner.parse_quantity(&CellValue::Number(2.5), policy), 25);
    }

    #[test]
    fn test_excel_serial_to_date() {
        let cleaner = DataCleaner;
        assert_eq!(cleaner.excel_serial_to_date(44927.0), Some(ymd(2023, 1, 1)));
        assert_eq!(cleaner.excel_serial_to_date(25569.0), Some(ymd(1970, 1, 1)));
        // 小数部分为时间，舍去
        assert_eq!(cleaner.excel_serial_to_date(44927.75), Some(ymd(2023, 1, 1)));
        assert_eq!(cleaner.excel_serial_to_date(0.0), None);
        assert_eq!(cleaner.excel_serial_to_date(-5.0), None);
        assert_eq!(cleaner.excel_serial_to_date(f64::INFINITY), None);
        assert_eq!(cleaner.excel_serial_to_date(3_000_000.0), None);
    }

    #[test]
    fn test_parse_date_numbers() {
        let cleaner = DataCleaner;
        assert_eq!(
            cleaner.parse_date(&CellValue::Number(44927.0)),
            Some(ymd(2023, 1, 1))
        );
        assert_eq!(
            cleaner.parse_date(&CellValue::Number(20250120.0)),
            Some(ymd(2025, 1, 20))
        );
        assert_eq!(cleaner.parse_date(&CellValue::Number(20251320.0)), None);
        assert_eq!(cleaner.parse_date(&CellValue::Empty), None);
    }

    #[test]
    fn test_parse_date_text_formats() {
        let cleaner = DataCleaner;
        let expected = Some(ymd(2024, 3, 15));
        assert_eq!(cleaner.parse_date(&CellValue::text("2024-03-15")), expected);
        assert_eq!(cleaner.parse_date(&CellValue::text("2024/03/15")), expected);
        assert_eq!(cleaner.parse_date(&CellValue::text("15/03/2024")), expected);
        assert_eq!(cleaner.parse_date(&CellValue::text("20240315")), expected);
        assert_eq!(
            cleaner.parse_date(&CellValue::text("2024-03-15T10:30:00")),
            expected
        );
        assert_eq!(
            cleaner.parse_date(&CellValue::text("2024-03-15T23:30:00-03:00")),
            Some(ymd(2024, 3, 16))
        );
        assert_eq!(cleaner.parse_date(&CellValue::text("44927")), Some(ymd(2023, 1, 1)));
    }

    #[test]
    fn test_parse_date_invalid_text() {
        let cleaner = DataCleaner;
        assert_eq!(cleaner.parse_date(&CellValue::text("")), None);
        assert_eq!(cleaner.parse_date(&CellValue::text("ontem")), None);
        assert_eq!(cleaner.parse_date(&CellValue::text("2024-02-30")), None);
        assert_eq!(cleaner.parse_date(&CellValue::text("31/04/2024")), None);
        assert_eq!(cleaner.parse_date(&CellValue::text("12")), None);
        assert_eq!(cleaner.parse_date(&CellValue::text("123456789")), None);
    }

    #[test]
    fn test_parse_date_year_only_text() {
        let cleaner = DataCleaner;
        assert_eq!(cleaner.parse_date(&CellValue::text("2024")), Some(ymd(2024, 1, 1)));
        assert_eq!(cleaner.parse_date(&CellValue::text(" 1999 ")), Some(ymd(1999, 1, 1)));
        // 数值单元格仍按 Excel 序列号解析
        assert_eq!(cleaner.parse_date(&CellValue::Number(2024.0)), Some(ymd(1905, 7, 16)));
    }
}
