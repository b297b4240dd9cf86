// ==========================================
// 车队驾驶偏差管理系统 - 导出表构建
// ==========================================
// 职责: 记录集 → 命名表（表头 + 行）
// 规则:
// - BASE_ATUAL: 全部记录（不筛选）
// - BASE_TRATADA: 给定记录集中 is_valid = true 的记录
// - 列顺序固定（columns::EXPORT_COLUMNS）
// ==========================================

use crate::domain::{columns, CellValue, DeviationRecord};
use serde::{Deserialize, Serialize};

pub const SHEET_BASE_ATUAL: &str = "BASE_ATUAL";
pub const SHEET_BASE_TRATADA: &str = "BASE_TRATADA";

/// 默认导出文件名
pub const DEFAULT_EXPORT_FILE_NAME: &str = "gestao_desvios_atualizada.xlsx";

// ==========================================
// SheetTable - 待序列化的命名表
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetTable {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl SheetTable {
    fn from_records<'a>(name: &str, records: impl Iterator<Item = &'a DeviationRecord>) -> Self {
        Self {
            name: name.to_string(),
            headers: columns::EXPORT_COLUMNS.iter().map(|c| c.to_string()).collect(),
            rows: records.map(DeviationRecord::export_cells).collect(),
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

pub struct SheetBuilder;

impl SheetBuilder {
    /// 全部记录
    pub fn base_atual(records: &[DeviationRecord]) -> SheetTable {
        SheetTable::from_records(SHEET_BASE_ATUAL, records.iter())
    }

    /// 已校验记录
    pub fn base_tratada(records: &[DeviationRecord]) -> SheetTable {
        SheetTable::from_records(SHEET_BASE_TRATADA, records.iter().filter(|r| r.is_valid))
    }

    /// 导出工作簿的两张表
    ///
    /// # 参数
    /// - all: 当前全部记录
    /// - treated: 当前筛选/清洗后的记录集（取其中已校验部分）
    pub fn workbook(all: &[DeviationRecord], treated: &[DeviationRecord]) -> Vec<SheetTable> {
        vec![Self::base_atual(all), Self::base_tratada(treated)]
    }
}
