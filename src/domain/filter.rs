// ==========================================
// 车队驾驶偏差管理系统 - 统计筛选条件
// ==========================================
// 职责: 驾驶舱筛选配置（仅存在于界面状态，不持久化）
// 约定: "ALL"（或空串 / "TODOS"）表示不筛选
// ==========================================

use serde::{Deserialize, Serialize};

/// 不筛选哨兵值
pub const ALL: &str = "ALL";

/// 判断条件值是否为"不筛选"
pub fn is_all(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty() || trimmed == ALL || trimmed == "TODOS"
}

// ==========================================
// DeviationFilter - 筛选条件
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviationFilter {
    pub driver_name_contains: String, // 驾驶员名包含（不区分大小写）
    pub deviation_type: String,       // 精确匹配
    pub status: String,               // 精确匹配
    pub month: String,                // 精确匹配
    pub treatment_action: String,     // 精确匹配
    #[serde(default)]
    pub valid_only: bool, // 仅统计已校验记录
}

impl Default for DeviationFilter {
    fn default() -> Self {
        Self {
            driver_name_contains: String::new(),
            deviation_type: ALL.to_string(),
            status: ALL.to_string(),
            month: ALL.to_string(),
            treatment_action: ALL.to_string(),
            valid_only: false,
        }
    }
}

impl DeviationFilter {
    pub fn driver(mut self, needle: &str) -> Self {
        self.driver_name_contains = needle.to_string();
        self
    }

    pub fn deviation_type(mut self, value: &str) -> Self {
        self.deviation_type = value.to_string();
        self
    }

    pub fn status(mut self, value: &str) -> Self {
        self.status = value.to_string();
        self
    }

    pub fn month(mut self, value: &str) -> Self {
        self.month = value.to_string();
        self
    }

    pub fn treatment_action(mut self, value: &str) -> Self {
        self.treatment_action = value.to_string();
        self
    }

    pub fn valid_only(mut self, valid_only: bool) -> Self {
        self.valid_only = valid_only;
        self
    }

    /// 是否未设置任何条件
    pub fn is_unrestricted(&self) -> bool {
        is_all(&self.driver_name_contains)
            && is_all(&self.deviation_type)
            && is_all(&self.status)
            && is_all(&self.month)
            && is_all(&self.treatment_action)
            && !self.valid_only
    }

    /// 当前生效条件的文字描述（用于报告封面）
    pub fn describe(&self) -> String {
        let parts: Vec<String> = [
            ("MOTORISTA", &self.driver_name_contains),
            ("TIPO", &self.deviation_type),
            ("STATUS", &self.status),
            ("MÊS", &self.month),
            ("TRATATIVA", &self.treatment_action),
        ]
        .iter()
        .filter(|(_, value)| !is_all(value))
        .map(|(label, value)| format!("{}={}", label, value.trim()))
        .collect();

        if parts.is_empty() {
            ALL.to_string()
        } else {
            parts.join(" / ")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_all_sentinels() {
        assert!(is_all(""));
        assert!(is_all("  "));
        assert!(is_all("ALL"));
        assert!(is_all("TODOS"));
        assert!(!is_all("all"));
        assert!(!is_all("JANEIRO"));
    }

    #[test]
    fn test_default_is_unrestricted() {
        assert!(DeviationFilter::default().is_unrestricted());
        assert!(!DeviationFilter::default().month("MAIO").is_unrestricted());
        assert!(!DeviationFilter::default().valid_only(true).is_unrestricted());
    }

    #[test]
    fn test_describe() {
        assert_eq!(DeviationFilter::default().describe(), "ALL");
        let filter = DeviationFilter::default().driver("silva").month("JANEIRO");
        assert_eq!(filter.describe(), "MOTORISTA=silva / MÊS=JANEIRO");
    }
}
