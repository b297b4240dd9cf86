// ==========================================
// 车队驾驶偏差管理系统 - 日历字段派生服务实现
// ==========================================
// 职责: ANO / MES_NUM / SEMANA / MÊS 派生
// ==========================================

use crate::domain::month_name;
use crate::importer::normalizer_trait::{
    CalendarFields, DerivationService as DerivationServiceTrait,
};
use chrono::{Datelike, Duration, NaiveDate};

pub struct DerivationService;

impl DerivationServiceTrait for DerivationService {
    fn derive_calendar(&self, date: NaiveDate) -> CalendarFields {
        CalendarFields {
            year: date.year(),
            month_number: date.month(),
            week: self.iso_week(date),
        }
    }

    fn derive_month_label(&self, raw_month: Option<&str>, month_number: u32) -> String {
        match raw_month.map(|m| m.trim().to_uppercase()) {
            Some(label) if !label.is_empty() => label,
            _ => month_name(month_number).unwrap_or_default().to_string(),
        }
    }
}

impl DerivationService {
    /// ISO-8601 周序号
    ///
    /// # 规则
    /// 1. 日期移到本周周四: date += 4 - weekday（周一=1 … 周日=7）
    /// 2. week = ceil((周四距其所在年 1 月 1 日的天数 + 1) / 7)
    ///
    /// # 示例
    /// - 2023-01-01（周日）→ 周四 2022-12-29 → 第 52 周
    pub fn iso_week(&self, date: NaiveDate) -> u32 {
        let weekday = date.weekday().number_from_monday() as i64;
        match date.checked_add_signed(Duration::days(4 - weekday)) {
            Some(thursday) => (thursday.ordinal0() + 1 + 6) / 7,
            None => date.iso_week().week(),
        }
    }
}
