// ==========================================
// 车队驾驶偏差管理系统 - 筛选选项
// ==========================================
// 职责: 为筛选下拉框提供可选值
// 规则: 始终基于未筛选的全量记录；去重、去空、排序；首项为 "ALL"
//       月份按月份表顺序排列，非标准月份名排在其后（字母序）
// ==========================================

use crate::domain::{month_number_of, DeviationRecord, ALL};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
    pub drivers: Vec<String>,
    pub deviation_types: Vec<String>,
    pub statuses: Vec<String>,
    pub months: Vec<String>,
    pub treatment_actions: Vec<String>,
}

impl FilterOptions {
    pub fn from_records(base: &[DeviationRecord]) -> Self {
        Self {
            drivers: with_all(distinct_sorted(base.iter().map(|r| r.driver.as_str()))),
            deviation_types: with_all(distinct_sorted(
                base.iter().map(|r| r.deviation_type.as_str()),
            )),
            statuses: with_all(distinct_sorted(base.iter().map(|r| r.status.as_str()))),
            months: with_all(month_vocabulary(base)),
            treatment_actions: with_all(distinct_sorted(
                base.iter().map(|r| r.treatment_action.as_str()),
            )),
        }
    }
}

/// 记录集中出现过的月份（按月份序号排序）
pub fn month_vocabulary(records: &[DeviationRecord]) -> Vec<String> {
    order_months(distinct_sorted(records.iter().map(|r| r.month.as_str())))
}

/// 月份排序：标准月份按序号，其余按字母序排在最后
pub fn order_months(mut months: Vec<String>) -> Vec<String> {
    months.sort_by(|a, b| {
        let key_a = month_number_of(a).unwrap_or(u32::MAX);
        let key_b = month_number_of(b).unwrap_or(u32::MAX);
        key_a.cmp(&key_b).then_with(|| a.cmp(b))
    });
    months
}

fn distinct_sorted<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    values
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn with_all(values: Vec<String>) -> Vec<String> {
    let mut out = Vec::with_capacity(values.len() + 1);
    out.push(ALL.to_string());
    out.extend(values);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TreatmentStatus;

    fn record(driver: &str, month: &str, action: &str) -> DeviationRecord {
        DeviationRecord {
            id: DeviationRecord::new_id(),
            driver: driver.to_string(),
            deviation_type: "X".to_string(),
            quantity: 1,
            month: month.to_string(),
            treated: TreatmentStatus::Nao,
            treatment_action: action.to_string(),
            date: String::new(),
            status: String::new(),
            applied_by: String::new(),
            year: None,
            month_number: None,
            week: None,
            is_valid: false,
        }
    }

    #[test]
    fn test_options_are_distinct_sorted_with_all_first() {
        let base = vec![
            record("BETO", "MARCO", "ADVERTÊNCIA"),
            record("ANA", "JANEIRO", ""),
            record("BETO", "DEZEMBRO", "ADVERTÊNCIA"),
        ];
        let options = FilterOptions::from_records(&base);

        assert_eq!(options.drivers, vec!["ALL", "ANA", "BETO"]);
        assert_eq!(options.months, vec!["ALL", "JANEIRO", "MARCO", "DEZEMBRO"]);
        assert_eq!(options.treatment_actions, vec!["ALL", "ADVERTÊNCIA"]);
        assert_eq!(options.statuses, vec!["ALL"]);
    }

    #[test]
    fn test_order_months_puts_unknown_labels_last() {
        let months = vec![
            "OUTUBRO".to_string(),
            "ZZZ".to_string(),
            "MARÇO".to_string(),
            "ABC".to_string(),
            "FEVEREIRO".to_string(),
        ];
        assert_eq!(
            order_months(months),
            vec!["FEVEREIRO", "MARÇO", "OUTUBRO", "ABC", "ZZZ"]
        );
    }
}
