// ==========================================
// 车队驾驶偏差管理系统 - 偏差领域模型
// ==========================================
// 职责: 原始单元格 / 原始行 / 标准偏差记录 / 校验错误
// 对齐: 导入表格列名（MOTORISTAS, TIPO DE DESVIO, QTD ...）
// ==========================================

use crate::domain::types::TreatmentStatus;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

// ==========================================
// 列名常量
// ==========================================
// 列名严格匹配（区分大小写与变音符），未识别列忽略
pub mod columns {
    pub const DRIVER: &str = "MOTORISTAS";
    pub const DEVIATION_TYPE: &str = "TIPO DE DESVIO";
    pub const QUANTITY: &str = "QTD";
    pub const MONTH: &str = "MÊS";
    pub const TREATED: &str = "TRATADO";
    pub const TREATMENT_ACTION: &str = "TRATATIVA";
    pub const DATE: &str = "DATA";
    pub const STATUS: &str = "STATUS";
    pub const APPLIED_BY: &str = "APLICADO POR";

    // 派生列（仅导出）
    pub const YEAR: &str = "ANO";
    pub const MONTH_NUMBER: &str = "MES_NUM";
    pub const WEEK: &str = "SEMANA";

    /// 导入识别的列
    pub const IMPORT_COLUMNS: [&str; 9] = [
        DRIVER,
        DEVIATION_TYPE,
        QUANTITY,
        MONTH,
        TREATED,
        TREATMENT_ACTION,
        DATE,
        STATUS,
        APPLIED_BY,
    ];

    /// 导出列顺序（固定）
    pub const EXPORT_COLUMNS: [&str; 12] = [
        DRIVER,
        DEVIATION_TYPE,
        QUANTITY,
        MONTH,
        TREATED,
        TREATMENT_ACTION,
        DATE,
        STATUS,
        APPLIED_BY,
        YEAR,
        MONTH_NUMBER,
        WEEK,
    ];
}

// ==========================================
// CellValue - 原始单元格值
// ==========================================
// 表格解析器输出的弱类型值：文本 / 数值 / 空
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Empty,
    Number(f64),
    Text(String),
}

impl CellValue {
    pub fn text(value: impl Into<String>) -> Self {
        CellValue::Text(value.into())
    }

    /// 空值或空白文本
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            CellValue::Number(_) => false,
        }
    }

    /// 转换为文本形式（整数值不带小数点）
    pub fn to_text(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => {
                if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    n.to_string()
                }
            }
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_text())
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Number(value as f64)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(CellValue::Empty)
    }
}

/// 原始行：列名 → 单元格值
pub type RawRow = HashMap<String, CellValue>;

// ==========================================
// DeviationRecord - 标准偏差记录
// ==========================================
// 序列化字段名与表格列名一致
// 不变量: is_valid = true ⇒ year / month_number / week 均存在且与 date 一致
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviationRecord {
    pub id: String, // 唯一标识（创建后不可变）

    #[serde(rename = "MOTORISTAS")]
    pub driver: String, // 驾驶员（TRIM + UPPER）
    #[serde(rename = "TIPO DE DESVIO")]
    pub deviation_type: String, // 偏差类型（TRIM + UPPER）
    #[serde(rename = "QTD")]
    pub quantity: u32, // 发生次数（≥ 0）
    #[serde(rename = "MÊS")]
    pub month: String, // 月份名
    #[serde(rename = "TRATADO")]
    pub treated: TreatmentStatus, // 是否已处理
    #[serde(rename = "TRATATIVA")]
    pub treatment_action: String, // 处理措施（警告/培训/停职/解雇）
    #[serde(rename = "DATA")]
    pub date: String, // 事件日期（有效时为 YYYY-MM-DD）
    #[serde(rename = "STATUS")]
    pub status: String,
    #[serde(rename = "APLICADO POR")]
    pub applied_by: String, // 处理人

    // ===== 派生日历字段（仅日期有效时存在）=====
    #[serde(rename = "ANO", default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(rename = "MES_NUM", default, skip_serializing_if = "Option::is_none")]
    pub month_number: Option<u32>,
    #[serde(rename = "SEMANA", default, skip_serializing_if = "Option::is_none")]
    pub week: Option<u32>,

    #[serde(rename = "isValid", default)]
    pub is_valid: bool,
}

impl DeviationRecord {
    /// 生成新的唯一标识（UUID v4）
    pub fn new_id() -> String {
        uuid::Uuid::new_v4().to_string()
    }

    /// 空白模板行（表格新增行）
    ///
    /// QTD 默认 1，TRATADO 默认 NÃO，DATA 默认当天，未校验
    pub fn blank(today: NaiveDate) -> Self {
        Self {
            id: Self::new_id(),
            driver: String::new(),
            deviation_type: String::new(),
            quantity: 1,
            month: String::new(),
            treated: TreatmentStatus::Nao,
            treatment_action: String::new(),
            date: today.format("%Y-%m-%d").to_string(),
            status: String::new(),
            applied_by: String::new(),
            year: None,
            month_number: None,
            week: None,
            is_valid: false,
        }
    }

    /// 转换回原始行（用于重新清洗与导出）
    pub fn to_raw_row(&self) -> RawRow {
        let mut row = RawRow::new();
        row.insert(columns::DRIVER.to_string(), CellValue::text(&self.driver));
        row.insert(
            columns::DEVIATION_TYPE.to_string(),
            CellValue::text(&self.deviation_type),
        );
        row.insert(
            columns::QUANTITY.to_string(),
            CellValue::Number(self.quantity as f64),
        );
        row.insert(columns::MONTH.to_string(), CellValue::text(&self.month));
        row.insert(
            columns::TREATED.to_string(),
            CellValue::text(self.treated.label()),
        );
        row.insert(
            columns::TREATMENT_ACTION.to_string(),
            CellValue::text(&self.treatment_action),
        );
        row.insert(columns::DATE.to_string(), CellValue::text(&self.date));
        row.insert(columns::STATUS.to_string(), CellValue::text(&self.status));
        row.insert(
            columns::APPLIED_BY.to_string(),
            CellValue::text(&self.applied_by),
        );
        row
    }

    /// 按导出列顺序输出单元格
    pub fn export_cells(&self) -> Vec<CellValue> {
        vec![
            CellValue::text(&self.driver),
            CellValue::text(&self.deviation_type),
            CellValue::Number(self.quantity as f64),
            CellValue::text(&self.month),
            CellValue::text(self.treated.label()),
            CellValue::text(&self.treatment_action),
            CellValue::text(&self.date),
            CellValue::text(&self.status),
            CellValue::text(&self.applied_by),
            self.year.map(|y| CellValue::Number(y as f64)).unwrap_or_default(),
            self.month_number
                .map(|m| CellValue::Number(m as f64))
                .unwrap_or_default(),
            self.week.map(|w| CellValue::Number(w as f64)).unwrap_or_default(),
        ]
    }

    /// 单元格编辑（字段级替换，不重新校验）
    pub fn set_field(&mut self, field: RecordField, value: &CellValue) {
        match field {
            RecordField::Driver => self.driver = value.to_text(),
            RecordField::DeviationType => self.deviation_type = value.to_text(),
            RecordField::Quantity => self.quantity = edited_quantity(value),
            RecordField::Month => self.month = value.to_text(),
            RecordField::Treated => self.treated = TreatmentStatus::from_label(&value.to_text()),
            RecordField::TreatmentAction => self.treatment_action = value.to_text(),
            RecordField::Date => self.date = value.to_text(),
            RecordField::Status => self.status = value.to_text(),
            RecordField::AppliedBy => self.applied_by = value.to_text(),
        }
    }
}

/// 编辑后的数量：非负整数保留，其余记 0
fn edited_quantity(value: &CellValue) -> u32 {
    match value {
        CellValue::Number(n) if n.is_finite() && *n >= 0.0 && n.fract() == 0.0 => {
            n.min(u32::MAX as f64) as u32
        }
        CellValue::Text(s) => s.trim().parse::<u32>().unwrap_or(0),
        _ => 0,
    }
}

// ==========================================
// RecordField - 可编辑字段
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordField {
    Driver,
    DeviationType,
    Quantity,
    Month,
    Treated,
    TreatmentAction,
    Date,
    Status,
    AppliedBy,
}

impl RecordField {
    /// 字段对应的表格列名
    pub fn column(&self) -> &'static str {
        match self {
            RecordField::Driver => columns::DRIVER,
            RecordField::DeviationType => columns::DEVIATION_TYPE,
            RecordField::Quantity => columns::QUANTITY,
            RecordField::Month => columns::MONTH,
            RecordField::Treated => columns::TREATED,
            RecordField::TreatmentAction => columns::TREATMENT_ACTION,
            RecordField::Date => columns::DATE,
            RecordField::Status => columns::STATUS,
            RecordField::AppliedBy => columns::APPLIED_BY,
        }
    }

    /// 列名 → 字段（严格匹配）
    pub fn from_column(column: &str) -> Option<Self> {
        match column {
            columns::DRIVER => Some(RecordField::Driver),
            columns::DEVIATION_TYPE => Some(RecordField::DeviationType),
            columns::QUANTITY => Some(RecordField::Quantity),
            columns::MONTH => Some(RecordField::Month),
            columns::TREATED => Some(RecordField::Treated),
            columns::TREATMENT_ACTION => Some(RecordField::TreatmentAction),
            columns::DATE => Some(RecordField::Date),
            columns::STATUS => Some(RecordField::Status),
            columns::APPLIED_BY => Some(RecordField::AppliedBy),
            _ => None,
        }
    }
}

// ==========================================
// ValidationError - 行级校验错误
// ==========================================
// 临时数据，不持久化；不阻断记录生成
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    pub row: usize,      // 行号（从 1 开始）
    pub field: String,   // 字段列名
    pub message: String, // 原因
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "linha {} [{}]: {}", self.row, self.field, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> DeviationRecord {
        DeviationRecord {
            id: "r-1".to_string(),
            driver: "JOÃO SILVA".to_string(),
            deviation_type: "EXCESSO DE VELOCIDADE".to_string(),
            quantity: 3,
            month: "JANEIRO".to_string(),
            treated: TreatmentStatus::Sim,
            treatment_action: "ADVERTÊNCIA".to_string(),
            date: "2023-01-01".to_string(),
            status: "FECHADO".to_string(),
            applied_by: "ANA".to_string(),
            year: Some(2023),
            month_number: Some(1),
            week: Some(52),
            is_valid: true,
        }
    }

    #[test]
    fn test_cell_value_to_text() {
        assert_eq!(CellValue::Number(44927.0).to_text(), "44927");
        assert_eq!(CellValue::Number(2.5).to_text(), "2.5");
        assert_eq!(CellValue::text(" x ").to_text(), " x ");
        assert_eq!(CellValue::Empty.to_text(), "");
    }

    #[test]
    fn test_cell_value_is_blank() {
        assert!(CellValue::Empty.is_blank());
        assert!(CellValue::text("   ").is_blank());
        assert!(!CellValue::Number(0.0).is_blank());
        assert!(!CellValue::text("a").is_blank());
    }

    #[test]
    fn test_cell_value_json_shapes() {
        let row: RawRow = serde_json::from_str(r#"{"QTD": 3, "DATA": "2023-01-01", "MÊS": null}"#)
            .unwrap();
        assert_eq!(row["QTD"], CellValue::Number(3.0));
        assert_eq!(row["DATA"], CellValue::text("2023-01-01"));
        assert_eq!(row["MÊS"], CellValue::Empty);
    }

    #[test]
    fn test_record_serializes_with_sheet_labels() {
        let json = serde_json::to_value(sample_record()).unwrap();
        assert_eq!(json["MOTORISTAS"], "JOÃO SILVA");
        assert_eq!(json["TIPO DE DESVIO"], "EXCESSO DE VELOCIDADE");
        assert_eq!(json["TRATADO"], "SIM");
        assert_eq!(json["SEMANA"], 52);
        assert_eq!(json["isValid"], true);
    }

    #[test]
    fn test_blank_row_template() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 17).unwrap();
        let record = DeviationRecord::blank(today);
        assert_eq!(record.quantity, 1);
        assert_eq!(record.treated, TreatmentStatus::Nao);
        assert_eq!(record.date, "2024-05-17");
        assert!(!record.is_valid);
        assert!(!record.id.is_empty());
        assert_ne!(record.id, DeviationRecord::blank(today).id);
    }

    #[test]
    fn test_to_raw_row_uses_sheet_columns() {
        let row = sample_record().to_raw_row();
        assert_eq!(row[columns::DRIVER], CellValue::text("JOÃO SILVA"));
        assert_eq!(row[columns::QUANTITY], CellValue::Number(3.0));
        assert_eq!(row[columns::TREATED], CellValue::text("SIM"));
        assert_eq!(row.len(), columns::IMPORT_COLUMNS.len());
    }

    #[test]
    fn test_export_cells_order() {
        let cells = sample_record().export_cells();
        assert_eq!(cells.len(), columns::EXPORT_COLUMNS.len());
        assert_eq!(cells[0], CellValue::text("JOÃO SILVA"));
        assert_eq!(cells[2], CellValue::Number(3.0));
        assert_eq!(cells[11], CellValue::Number(52.0));

        let mut invalid = sample_record();
        invalid.year = None;
        invalid.month_number = None;
        invalid.week = None;
        let cells = invalid.export_cells();
        assert_eq!(cells[9], CellValue::Empty);
    }

    #[test]
    fn test_set_field_replaces_without_revalidation() {
        let mut record = sample_record();
        record.set_field(RecordField::Driver, &CellValue::text("maria"));
        record.set_field(RecordField::Quantity, &CellValue::Number(-2.0));
        record.set_field(RecordField::Treated, &CellValue::text("não"));

        assert_eq!(record.driver, "maria");
        assert_eq!(record.quantity, 0);
        assert_eq!(record.treated, TreatmentStatus::Nao);
        assert!(record.is_valid);

        record.set_field(RecordField::Quantity, &CellValue::text("7"));
        assert_eq!(record.quantity, 7);
    }

    #[test]
    fn test_record_field_columns_round_trip() {
        for column in columns::IMPORT_COLUMNS {
            let field = RecordField::from_column(column).unwrap();
            assert_eq!(field.column(), column);
        }
        assert_eq!(RecordField::from_column("motoristas"), None);
    }
}
