// ==========================================
// 车队驾驶偏差管理系统 - 字段映射器实现
// ==========================================
// 职责: 表格列名 → 中间结构体
// 约束: 列名严格匹配，未识别列忽略
// ==========================================

use crate::domain::{columns, CellValue, RawRow};
use crate::importer::normalizer_trait::{FieldMapper as FieldMapperTrait, RawDeviationRecord};

pub struct FieldMapper;

impl FieldMapperTrait for FieldMapper {
    fn map_to_raw_deviation(&self, row: &RawRow, row_number: usize) -> RawDeviationRecord {
        RawDeviationRecord {
            row_number,
            driver: self.get_string(row, columns::DRIVER),
            deviation_type: self.get_string(row, columns::DEVIATION_TYPE),
            quantity: self.get_cell(row, columns::QUANTITY),
            month: self.get_string(row, columns::MONTH),
            treated: self.get_string(row, columns::TREATED),
            treatment_action: self.get_string(row, columns::TREATMENT_ACTION),
            date: self.get_cell(row, columns::DATE),
            status: self.get_string(row, columns::STATUS),
            applied_by: self.get_string(row, columns::APPLIED_BY),
        }
    }
}

impl FieldMapper {
    /// 提取文本字段（空白视为缺失）
    fn get_string(&self, row: &RawRow, key: &str) -> Option<String> {
        row.get(key)
            .filter(|cell| !cell.is_blank())
            .map(CellValue::to_text)
    }

    /// 提取原始单元格（缺失 → Empty）
    fn get_cell(&self, row: &RawRow, key: &str) -> CellValue {
        row.get(key).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, CellValue)]) -> RawRow {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_field_mapper_basic() {
        let raw = row(&[
            ("MOTORISTAS", CellValue::text(" joão ")),
            ("TIPO DE DESVIO", CellValue::text("frenagem brusca")),
            ("QTD", CellValue::Number(2.0)),
            ("DATA", CellValue::Number(44927.0)),
        ]);

        let mapper = FieldMapper;
        let record = mapper.map_to_raw_deviation(&raw, 1);

        assert_eq!(record.row_number, 1);
        assert_eq!(record.driver, Some(" joão ".to_string()));
        assert_eq!(record.deviation_type, Some("frenagem brusca".to_string()));
        assert_eq!(record.quantity, CellValue::Number(2.0));
        assert_eq!(record.date, CellValue::Number(44927.0));
        assert_eq!(record.month, None);
    }

    #[test]
    fn test_field_mapper_blank_as_none() {
        let raw = row(&[
            ("MOTORISTAS", CellValue::text("   ")),
            ("STATUS", CellValue::Empty),
        ]);

        let record = FieldMapper.map_to_raw_deviation(&raw, 4);

        assert_eq!(record.driver, None);
        assert_eq!(record.status, None);
        assert_eq!(record.quantity, CellValue::Empty);
        assert_eq!(record.date, CellValue::Empty);
    }

    #[test]
    fn test_field_mapper_column_names_are_exact() {
        let raw = row(&[
            ("motoristas", CellValue::text("ANA")),
            ("MES", CellValue::text("MAIO")),
            ("OBSERVAÇÃO", CellValue::text("ignorada")),
        ]);

        let record = FieldMapper.map_to_raw_deviation(&raw, 1);

        assert_eq!(record.driver, None);
        assert_eq!(record.month, None);
    }

    #[test]
    fn test_field_mapper_numeric_text_fields() {
        let raw = row(&[("APLICADO POR", CellValue::Number(1020.0))]);
        let record = FieldMapper.map_to_raw_deviation(&raw, 1);
        assert_eq!(record.applied_by, Some("1020".to_string()));
    }
}
