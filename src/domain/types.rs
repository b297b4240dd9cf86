// ==========================================
// 车队驾驶偏差管理系统 - 领域类型定义
// ==========================================
// 职责: 处理状态 / 月份表 / 数量解析策略
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==========================================
// 处理状态 (TRATADO)
// ==========================================
// 序列化格式: "SIM" / "NÃO"（与导入表格一致）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TreatmentStatus {
    #[serde(rename = "SIM")]
    Sim, // 已处理
    #[default]
    #[serde(rename = "NÃO")]
    Nao, // 未处理
}

impl TreatmentStatus {
    pub const SIM_LABEL: &'static str = "SIM";
    pub const NAO_LABEL: &'static str = "NÃO";

    /// 从原始文本解析（TRIM + UPPER 后比较）
    ///
    /// 只有 "SIM" 视为已处理，其余一律为 NÃO
    pub fn from_label(raw: &str) -> Self {
        if raw.trim().to_uppercase() == Self::SIM_LABEL {
            TreatmentStatus::Sim
        } else {
            TreatmentStatus::Nao
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TreatmentStatus::Sim => Self::SIM_LABEL,
            TreatmentStatus::Nao => Self::NAO_LABEL,
        }
    }

    pub fn is_treated(&self) -> bool {
        matches!(self, TreatmentStatus::Sim)
    }
}

impl fmt::Display for TreatmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ==========================================
// 月份表 (MÊS)
// ==========================================
// 固定 12 项，1 = JANEIRO ... 12 = DEZEMBRO
// 三月写作 "MARCO"（无变音符）
pub const MONTH_NAMES: [&str; 12] = [
    "JANEIRO",
    "FEVEREIRO",
    "MARCO",
    "ABRIL",
    "MAIO",
    "JUNHO",
    "JULHO",
    "AGOSTO",
    "SETEMBRO",
    "OUTUBRO",
    "NOVEMBRO",
    "DEZEMBRO",
];

/// 月份序号 → 标准月份名
pub fn month_name(month_number: u32) -> Option<&'static str> {
    if (1..=12).contains(&month_number) {
        Some(MONTH_NAMES[(month_number - 1) as usize])
    } else {
        None
    }
}

/// 月份名 → 月份序号（兼容 "MARÇO"）
pub fn month_number_of(label: &str) -> Option<u32> {
    let normalized = label.trim().to_uppercase();
    let normalized = if normalized == "MARÇO" {
        "MARCO".to_string()
    } else {
        normalized
    };
    MONTH_NAMES
        .iter()
        .position(|m| *m == normalized)
        .map(|idx| idx as u32 + 1)
}

// ==========================================
// 数量解析策略 (QTD)
// ==========================================
// Strict: 文本必须是纯数字，否则记 0
// ExtractDigits: 剔除非数字字符后解析（"3x" → 3）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuantityPolicy {
    #[default]
    Strict,
    ExtractDigits,
}

impl fmt::Display for QuantityPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuantityPolicy::Strict => write!(f, "STRICT"),
            QuantityPolicy::ExtractDigits => write!(f, "EXTRACT_DIGITS"),
        }
    }
}

impl FromStr for QuantityPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "STRICT" => Ok(QuantityPolicy::Strict),
            "EXTRACT_DIGITS" => Ok(QuantityPolicy::ExtractDigits),
            other => Err(format!("未知的数量解析策略: {}", other)),
        }
    }
}
