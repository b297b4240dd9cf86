// ==========================================
// 车队驾驶偏差管理系统 - 记录筛选
// ==========================================
// 职责: 统计前的筛选预处理
// 规则: 每个非 ALL 条件都必须满足
//       - 驾驶员: 子串匹配，不区分大小写
//       - 其余条件: 去首尾空白后精确匹配（与下拉选项一致）
// 红线: 不修改输入，返回引用
// ==========================================

use crate::domain::{is_all, DeviationFilter, DeviationRecord};

pub struct RecordFilter;

impl RecordFilter {
    /// 单条记录是否满足筛选条件
    pub fn matches(filter: &DeviationFilter, record: &DeviationRecord) -> bool {
        if filter.valid_only && !record.is_valid {
            return false;
        }

        if !is_all(&filter.driver_name_contains) {
            let needle = filter.driver_name_contains.trim().to_lowercase();
            if !record.driver.to_lowercase().contains(&needle) {
                return false;
            }
        }

        exact(&filter.deviation_type, &record.deviation_type)
            && exact(&filter.status, &record.status)
            && exact(&filter.month, &record.month)
            && exact(&filter.treatment_action, &record.treatment_action)
    }

    /// 筛选记录集（保持原顺序）
    pub fn apply<'a>(
        records: &'a [DeviationRecord],
        filter: &DeviationFilter,
    ) -> Vec<&'a DeviationRecord> {
        records
            .iter()
            .filter(|record| Self::matches(filter, record))
            .collect()
    }
}

fn exact(criterion: &str, value: &str) -> bool {
    is_all(criterion) || criterion.trim() == value.trim()
}
