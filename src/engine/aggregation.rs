// ==========================================
// 车队驾驶偏差管理系统 - 统计引擎（Aggregator）
// ==========================================
// 职责: 驾驶舱各视图的分组、汇总、排名
// 输入: 全量记录 + 筛选条件
// 输出: DashboardView（{name, value} 列表与嵌套分组）
// 红线: 无状态引擎，所有方法都是纯函数
// ==========================================
// 口径:
// - 合计均为 QTD 之和（u64）
// - 处理措施分布为记录条数（不是 QTD 之和）
// - 排名按合计降序，同值保持首次出现顺序（稳定排序）
// ==========================================

use crate::domain::{DeviationFilter, DeviationRecord, TreatmentStatus};
use crate::engine::filter::RecordFilter;
use crate::engine::options::{month_vocabulary, FilterOptions};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

// ==========================================
// 视图数据结构
// ==========================================

/// 图表通用数据点
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameValue {
    pub name: String,
    pub value: u64,
}

impl NameValue {
    pub fn new(name: impl Into<String>, value: u64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// 驾驶员处理明细
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverTreatmentDetail {
    pub driver: String,
    pub treated: u64,
    pub pending: u64,
    pub total: u64,
    pub deviation_types: Vec<String>,   // 出现过的偏差类型（首次出现顺序）
    pub treatment_actions: Vec<String>, // 已处理记录中的措施（去重）
}

/// 单一偏差类型的月度走势
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyEvolution {
    pub deviation_type: String,
    pub months: Vec<NameValue>,
    pub total: u64,
}

/// 指标卡
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardKpis {
    pub record_count: usize,
    pub total_quantity: u64,
    pub percent_treated: f64,
    pub top_driver: Option<NameValue>,
    pub top_deviation_type: Option<NameValue>,
}

/// 排名截断数量
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregationLimits {
    pub top_drivers: usize,   // 驾驶舱排名
    pub driver_detail: usize, // 处理明细表
}

impl Default for AggregationLimits {
    fn default() -> Self {
        Self {
            top_drivers: 10,
            driver_detail: 50,
        }
    }
}

/// 驾驶舱全部视图
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub filter: DeviationFilter,
    pub kpis: DashboardKpis,
    pub totals_by_type: Vec<NameValue>,
    pub driver_ranking: Vec<NameValue>,
    pub status_breakdown: Vec<NameValue>,
    pub action_distribution: Vec<NameValue>,
    pub driver_details: Vec<DriverTreatmentDetail>,
    pub monthly_evolution: Vec<MonthlyEvolution>,
    pub options: FilterOptions,
}

// ==========================================
// Aggregator
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    limits: AggregationLimits,
}

impl Aggregator {
    pub fn new(limits: AggregationLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> AggregationLimits {
        self.limits
    }

    /// 计算驾驶舱全部视图
    ///
    /// # 参数
    /// - base: 未筛选的全量记录（筛选选项与月份词表基于它）
    /// - filter: 筛选条件
    pub fn dashboard(&self, base: &[DeviationRecord], filter: &DeviationFilter) -> DashboardView {
        let filtered = RecordFilter::apply(base, filter);
        debug!(
            base = base.len(),
            filtered = filtered.len(),
            filter = %filter.describe(),
            "计算驾驶舱视图"
        );

        let months = month_vocabulary(base);
        let by_type = self.totals_by_type(&filtered);
        let by_driver = self.totals_by_driver(&filtered);

        DashboardView {
            filter: filter.clone(),
            kpis: self.kpis_from(&filtered, &by_type, &by_driver),
            driver_ranking: by_driver
                .iter()
                .take(self.limits.top_drivers)
                .cloned()
                .collect(),
            totals_by_type: by_type,
            status_breakdown: self.status_breakdown(&filtered),
            action_distribution: self.action_distribution(&filtered),
            driver_details: self.driver_treatment_details(&filtered),
            monthly_evolution: self.monthly_evolution(&filtered, &months),
            options: FilterOptions::from_records(base),
        }
    }

    // ==========================================
    // 单项视图
    // ==========================================

    /// 按偏差类型合计（类型 TRIM + UPPER 归并），降序
    pub fn totals_by_type(&self, records: &[&DeviationRecord]) -> Vec<NameValue> {
        sorted_desc(group_sum(records.iter().map(|r| {
            (r.deviation_type.trim().to_uppercase(), r.quantity as u64)
        })))
    }

    /// 按驾驶员合计，降序
    pub fn totals_by_driver(&self, records: &[&DeviationRecord]) -> Vec<NameValue> {
        sorted_desc(group_sum(
            records.iter().map(|r| (r.driver.clone(), r.quantity as u64)),
        ))
    }

    /// 合计前 N 名驾驶员
    pub fn top_drivers(&self, records: &[&DeviationRecord], n: usize) -> Vec<NameValue> {
        let mut totals = self.totals_by_driver(records);
        totals.truncate(n);
        totals
    }

    /// 处理率（%），保留一位小数；分母为 0 时为 0
    pub fn treatment_efficiency(&self, records: &[&DeviationRecord]) -> f64 {
        let total: u64 = records.iter().map(|r| r.quantity as u64).sum();
        if total == 0 {
            return 0.0;
        }
        let treated: u64 = records
            .iter()
            .filter(|r| r.treated.is_treated())
            .map(|r| r.quantity as u64)
            .sum();
        round_one_decimal(100.0 * treated as f64 / total as f64)
    }

    /// 处理状态分布 [SIM, NÃO]
    pub fn status_breakdown(&self, records: &[&DeviationRecord]) -> Vec<NameValue> {
        let (treated, pending) = split_treated(records.iter().copied());
        vec![
            NameValue::new(TreatmentStatus::SIM_LABEL, treated),
            NameValue::new(TreatmentStatus::NAO_LABEL, pending),
        ]
    }

    /// 处理措施分布（记录条数，忽略空措施），降序
    pub fn action_distribution(&self, records: &[&DeviationRecord]) -> Vec<NameValue> {
        sorted_desc(group_sum(
            records
                .iter()
                .filter(|r| !r.treatment_action.trim().is_empty())
                .map(|r| (r.treatment_action.trim().to_string(), 1)),
        ))
    }

    /// 驾驶员处理明细（按合计取前 driver_detail 名）
    pub fn driver_treatment_details(
        &self,
        records: &[&DeviationRecord],
    ) -> Vec<DriverTreatmentDetail> {
        let ranking = self.top_drivers(records, self.limits.driver_detail);

        ranking
            .into_iter()
            .map(|entry| {
                let own: Vec<&DeviationRecord> = records
                    .iter()
                    .copied()
                    .filter(|r| r.driver == entry.name)
                    .collect();
                let (treated, pending) = split_treated(own.iter().copied());

                let mut deviation_types = Vec::new();
                let mut treatment_actions = Vec::new();
                for record in &own {
                    push_distinct(&mut deviation_types, &record.deviation_type);
                    if record.treated.is_treated() {
                        push_distinct(&mut treatment_actions, &record.treatment_action);
                    }
                }

                DriverTreatmentDetail {
                    driver: entry.name,
                    treated,
                    pending,
                    total: entry.value,
                    deviation_types,
                    treatment_actions,
                }
            })
            .collect()
    }

    /// 各偏差类型的月度走势
    ///
    /// # 参数
    /// - months: 月份词表（来自未筛选全量记录，已按月份序号排序）
    ///
    /// # 说明
    /// - 类型按字母序输出
    /// - total 为该类型各月之和
    pub fn monthly_evolution(
        &self,
        records: &[&DeviationRecord],
        months: &[String],
    ) -> Vec<MonthlyEvolution> {
        let mut types: Vec<String> = records
            .iter()
            .map(|r| r.deviation_type.trim().to_uppercase())
            .collect();
        types.sort();
        types.dedup();

        types
            .into_iter()
            .map(|deviation_type| {
                let months: Vec<NameValue> = months
                    .iter()
                    .map(|month| {
                        let value = records
                            .iter()
                            .filter(|r| r.deviation_type.trim().to_uppercase() == deviation_type)
                            .filter(|r| r.month.trim() == month.as_str())
                            .map(|r| r.quantity as u64)
                            .sum();
                        NameValue::new(month.clone(), value)
                    })
                    .collect();
                let total = months.iter().map(|m| m.value).sum();
                MonthlyEvolution {
                    deviation_type,
                    months,
                    total,
                }
            })
            .collect()
    }

    /// 指标卡
    pub fn kpis(&self, records: &[&DeviationRecord]) -> DashboardKpis {
        let by_type = self.totals_by_type(records);
        let by_driver = self.totals_by_driver(records);
        self.kpis_from(records, &by_type, &by_driver)
    }

    fn kpis_from(
        &self,
        records: &[&DeviationRecord],
        by_type: &[NameValue],
        by_driver: &[NameValue],
    ) -> DashboardKpis {
        DashboardKpis {
            record_count: records.len(),
            total_quantity: records.iter().map(|r| r.quantity as u64).sum(),
            percent_treated: self.treatment_efficiency(records),
            top_driver: by_driver.first().cloned(),
            top_deviation_type: by_type.first().cloned(),
        }
    }
}

// ==========================================
// 内部工具函数
// ==========================================

/// 分组求和，保持首次出现顺序
fn group_sum(items: impl Iterator<Item = (String, u64)>) -> Vec<NameValue> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<NameValue> = Vec::new();
    for (name, value) in items {
        match index.get(&name) {
            Some(&pos) => groups[pos].value += value,
            None => {
                index.insert(name.clone(), groups.len());
                groups.push(NameValue::new(name, value));
            }
        }
    }
    groups
}

/// 降序稳定排序
fn sorted_desc(mut groups: Vec<NameValue>) -> Vec<NameValue> {
    groups.sort_by(|a, b| b.value.cmp(&a.value));
    groups
}

fn split_treated<'a>(records: impl Iterator<Item = &'a DeviationRecord>) -> (u64, u64) {
    records.fold((0, 0), |(treated, pending), r| {
        if r.treated.is_treated() {
            (treated + r.quantity as u64, pending)
        } else {
            (treated, pending + r.quantity as u64)
        }
    })
}

fn push_distinct(values: &mut Vec<String>, value: &str) {
    let value = value.trim();
    if !value.is_empty() && !values.iter().any(|v| v == value) {
        values.push(value.to_string());
    }
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(
        driver: &str,
        deviation_type: &str,
        quantity: u32,
        treated: TreatmentStatus,
        action: &str,
        month: &str,
    ) -> DeviationRecord {
        DeviationRecord {
            id: DeviationRecord::new_id(),
            driver: driver.to_string(),
            deviation_type: deviation_type.to_string(),
            quantity,
            month: month.to_string(),
            treated,
            treatment_action: action.to_string(),
            date: "2024-01-01".to_string(),
            status: String::new(),
            applied_by: String::new(),
            year: Some(2024),
            month_number: Some(1),
            week: Some(1),
            is_valid: true,
        }
    }

    fn sample() -> Vec<DeviationRecord> {
        use TreatmentStatus::{Nao, Sim};
        vec![
            record("ANA", "VELOCIDADE", 3, Sim, "ADVERTÊNCIA", "JANEIRO"),
            record("BETO", "CELULAR", 5, Nao, "", "FEVEREIRO"),
            record("ANA", "CELULAR", 2, Sim, "TREINAMENTO", "FEVEREIRO"),
            record("CAIO", " velocidade ", 5, Nao, "", "JANEIRO"),
            record("ANA", "VELOCIDADE", 1, Sim, "ADVERTÊNCIA", "MARCO"),
        ]
    }

    fn refs(records: &[DeviationRecord]) -> Vec<&DeviationRecord> {
        records.iter().collect()
    }

    #[test]
    fn test_totals_by_type_merges_casing() {
        let records = sample();
        let totals = Aggregator::default().totals_by_type(&refs(&records));
        assert_eq!(
            totals,
            vec![NameValue::new("VELOCIDADE", 9), NameValue::new("CELULAR", 7)]
        );
    }

    #[test]
    fn test_totals_by_driver_stable_ties() {
        let records = sample();
        let totals = Aggregator::default().totals_by_driver(&refs(&records));
        // ANA 6, BETO 5, CAIO 5：BETO 先出现
        assert_eq!(
            totals,
            vec![
                NameValue::new("ANA", 6),
                NameValue::new("BETO", 5),
                NameValue::new("CAIO", 5)
            ]
        );
        assert_eq!(Aggregator::default().top_drivers(&refs(&records), 2).len(), 2);
    }

    #[test]
    fn test_treatment_efficiency() {
        let records = sample();
        let agg = Aggregator::default();
        // 6 / 16 = 37.5%
        assert_eq!(agg.treatment_efficiency(&refs(&records)), 37.5);
        assert_eq!(agg.treatment_efficiency(&[]), 0.0);

        let zero = vec![record("A", "X", 0, TreatmentStatus::Sim, "", "JANEIRO")];
        assert_eq!(agg.treatment_efficiency(&refs(&zero)), 0.0);
    }

    #[test]
    fn test_treatment_efficiency_rounds_to_one_decimal() {
        use TreatmentStatus::{Nao, Sim};
        let records = vec![
            record("A", "X", 1, Sim, "", "JANEIRO"),
            record("B", "X", 2, Nao, "", "JANEIRO"),
        ];
        assert_eq!(Aggregator::default().treatment_efficiency(&refs(&records)), 33.3);
    }

    #[test]
    fn test_status_breakdown() {
        let records = sample();
        assert_eq!(
            Aggregator::default().status_breakdown(&refs(&records)),
            vec![NameValue::new("SIM", 6), NameValue::new("NÃO", 10)]
        );
    }

    #[test]
    fn test_action_distribution_counts_records() {
        let records = sample();
        assert_eq!(
            Aggregator::default().action_distribution(&refs(&records)),
            vec![
                NameValue::new("ADVERTÊNCIA", 2),
                NameValue::new("TREINAMENTO", 1)
            ]
        );
    }

    #[test]
    fn test_driver_treatment_details() {
        let records = sample();
        let details = Aggregator::default().driver_treatment_details(&refs(&records));

        assert_eq!(details.len(), 3);
        let ana = &details[0];
        assert_eq!(ana.driver, "ANA");
        assert_eq!((ana.treated, ana.pending, ana.total), (6, 0, 6));
        assert_eq!(ana.deviation_types, vec!["VELOCIDADE", "CELULAR"]);
        assert_eq!(ana.treatment_actions, vec!["ADVERTÊNCIA", "TREINAMENTO"]);

        let beto = &details[1];
        assert_eq!((beto.treated, beto.pending), (0, 5));
        assert!(beto.treatment_actions.is_empty());
    }

    #[test]
    fn test_driver_details_are_capped() {
        let records: Vec<DeviationRecord> = (0..60)
            .map(|i| record(&format!("D{}", i), "X", 1, TreatmentStatus::Nao, "", "MAIO"))
            .collect();
        let agg = Aggregator::new(AggregationLimits::default());
        assert_eq!(agg.driver_treatment_details(&refs(&records)).len(), 50);
    }

    #[test]
    fn test_monthly_evolution_uses_month_order() {
        let records = sample();
        let months = month_vocabulary(&records);
        let evolution = Aggregator::default().monthly_evolution(&refs(&records), &months);

        assert_eq!(evolution.len(), 2);
        assert_eq!(evolution[0].deviation_type, "CELULAR");
        assert_eq!(
            evolution[0].months,
            vec![
                NameValue::new("JANEIRO", 0),
                NameValue::new("FEVEREIRO", 7),
                NameValue::new("MARCO", 0)
            ]
        );
        assert_eq!(evolution[0].total, 7);
        assert_eq!(evolution[1].deviation_type, "VELOCIDADE");
        assert_eq!(evolution[1].total, 9);
    }

    #[test]
    fn test_dashboard_filtered_by_driver() {
        let records = sample();
        let filter = DeviationFilter::default().driver("beto");
        let view = Aggregator::default().dashboard(&records, &filter);

        assert_eq!(view.kpis.record_count, 1);
        assert_eq!(view.kpis.total_quantity, 5);
        assert_eq!(view.kpis.percent_treated, 0.0);
        assert_eq!(view.driver_ranking, vec![NameValue::new("BETO", 5)]);
        assert_eq!(view.totals_by_type, vec![NameValue::new("CELULAR", 5)]);
        // 月份词表与筛选选项来自全量记录
        assert_eq!(view.monthly_evolution[0].months.len(), 3);
        assert_eq!(view.options.drivers, vec!["ALL", "ANA", "BETO", "CAIO"]);
    }

    #[test]
    fn test_dashboard_empty() {
        let view = Aggregator::default().dashboard(&[], &DeviationFilter::default());
        assert_eq!(view.kpis.record_count, 0);
        assert_eq!(view.kpis.top_driver, None);
        assert_eq!(view.kpis.top_deviation_type, None);
        assert!(view.totals_by_type.is_empty());
        assert_eq!(view.status_breakdown[0].value, 0);
    }
}
