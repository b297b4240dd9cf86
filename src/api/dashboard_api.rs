// ==========================================
// 驾驶舱API
// ==========================================
// 职责: 为图表与表格组件提供统计视图
// 红线: 只读，不修改记录集
// ==========================================

use crate::domain::{DeviationFilter, DeviationRecord};
use crate::engine::{
    AggregationLimits, Aggregator, DashboardKpis, DashboardView, FilterOptions, NameValue,
    RecordFilter,
};

pub struct DashboardApi {
    aggregator: Aggregator,
}

impl DashboardApi {
    pub fn new(limits: AggregationLimits) -> Self {
        Self {
            aggregator: Aggregator::new(limits),
        }
    }

    /// 驾驶舱全部视图
    pub fn get_dashboard(
        &self,
        records: &[DeviationRecord],
        filter: &DeviationFilter,
    ) -> DashboardView {
        self.aggregator.dashboard(records, filter)
    }

    /// 指标卡
    pub fn get_kpis(&self, records: &[DeviationRecord], filter: &DeviationFilter) -> DashboardKpis {
        self.aggregator.kpis(&RecordFilter::apply(records, filter))
    }

    /// 驾驶员排名（前 N）
    pub fn get_driver_ranking(
        &self,
        records: &[DeviationRecord],
        filter: &DeviationFilter,
        n: usize,
    ) -> Vec<NameValue> {
        self.aggregator
            .top_drivers(&RecordFilter::apply(records, filter), n)
    }

    /// 筛选下拉选项（基于全量记录）
    pub fn get_filter_options(&self, records: &[DeviationRecord]) -> FilterOptions {
        FilterOptions::from_records(records)
    }

    /// 筛选后的记录（表格展示）
    pub fn filter_records(
        &self,
        records: &[DeviationRecord],
        filter: &DeviationFilter,
    ) -> Vec<DeviationRecord> {
        RecordFilter::apply(records, filter)
            .into_iter()
            .cloned()
            .collect()
    }
}

impl Default for DashboardApi {
    fn default() -> Self {
        Self::new(AggregationLimits::default())
    }
}
