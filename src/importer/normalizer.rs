// ==========================================
// 车队驾驶偏差管理系统 - 偏差数据清洗器（Normalizer）
// ==========================================
// 职责: 弱类型原始行 → 标准 DeviationRecord 序列 + 校验错误
// 流程: 映射 → 清洗 → 日期解析 → 必填校验 → 日历派生
// 约束: 纯函数，不修改输入；无效行保留（is_valid = false）供界面修正
// ==========================================

use crate::domain::{
    CellValue, DeviationRecord, QuantityPolicy, RawRow, TreatmentStatus, ValidationError,
};
use crate::importer::data_cleaner::DataCleaner as DataCleanerImpl;
use crate::importer::derivation::DerivationService as DerivationServiceImpl;
use crate::importer::dq_validator::DqValidator as DqValidatorImpl;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_mapper::FieldMapper as FieldMapperImpl;
use crate::importer::normalizer_trait::{
    DataCleaner, DerivationService, DqValidator, FieldMapper, NormalizeSummary,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

// ==========================================
// NormalizeOutcome - 清洗结果
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizeOutcome {
    pub records: Vec<DeviationRecord>, // 与输入顺序一致
    pub errors: Vec<ValidationError>,  // 仅供展示，不影响记录生成
    pub summary: NormalizeSummary,
}

// ==========================================
// Normalizer
// ==========================================
pub struct Normalizer {
    quantity_policy: QuantityPolicy,
    field_mapper: Box<dyn FieldMapper>,
    data_cleaner: Box<dyn DataCleaner>,
    derivation_service: Box<dyn DerivationService>,
    dq_validator: Box<dyn DqValidator>,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(QuantityPolicy::default())
    }
}

impl Normalizer {
    /// 使用默认组件创建
    pub fn new(quantity_policy: QuantityPolicy) -> Self {
        Self::with_components(
            quantity_policy,
            Box::new(FieldMapperImpl),
            Box::new(DataCleanerImpl),
            Box::new(DerivationServiceImpl),
            Box::new(DqValidatorImpl),
        )
    }

    /// 注入自定义组件
    pub fn with_components(
        quantity_policy: QuantityPolicy,
        field_mapper: Box<dyn FieldMapper>,
        data_cleaner: Box<dyn DataCleaner>,
        derivation_service: Box<dyn DerivationService>,
        dq_validator: Box<dyn DqValidator>,
    ) -> Self {
        Self {
            quantity_policy,
            field_mapper,
            data_cleaner,
            derivation_service,
            dq_validator,
        }
    }

    pub fn quantity_policy(&self) -> QuantityPolicy {
        self.quantity_policy
    }

    /// 清洗原始行
    pub fn normalize(&self, rows: &[RawRow]) -> NormalizeOutcome {
        let mut records = Vec::with_capacity(rows.len());
        let mut errors = Vec::new();

        for (idx, row) in rows.iter().enumerate() {
            let (record, row_errors) = self.normalize_row(row, idx + 1);
            if !record.is_valid {
                debug!(row_number = idx + 1, violations = row_errors.len(), "行校验未通过");
            }
            records.push(record);
            errors.extend(row_errors);
        }

        let summary = self.dq_validator.summarize(&records, &errors);
        info!(
            total_rows = summary.total_rows,
            valid = summary.valid,
            invalid = summary.invalid,
            policy = %self.quantity_policy,
            "数据清洗完成"
        );
        if summary.invalid > 0 {
            warn!(invalid = summary.invalid, "存在待修正的无效行");
        }

        NormalizeOutcome {
            records,
            errors,
            summary,
        }
    }

    /// 重新清洗已有记录（"Tratar Dados"），记录 id 重新生成
    pub fn normalize_records(&self, records: &[DeviationRecord]) -> NormalizeOutcome {
        let rows: Vec<RawRow> = records.iter().map(DeviationRecord::to_raw_row).collect();
        self.normalize(&rows)
    }

    /// 清洗 JSON 形式的输入（对象数组）
    ///
    /// # 返回
    /// - Err(InvalidInputShape): 输入不是对象数组（调用方编程错误）
    pub fn normalize_json(&self, value: &serde_json::Value) -> ImportResult<NormalizeOutcome> {
        let items = value.as_array().ok_or_else(|| {
            ImportError::InvalidInputShape(format!("顶层类型为 {}", json_kind(value)))
        })?;

        let rows = items
            .iter()
            .enumerate()
            .map(|(idx, item)| {
                let object = item.as_object().ok_or_else(|| {
                    ImportError::InvalidInputShape(format!(
                        "第 {} 项类型为 {}",
                        idx + 1,
                        json_kind(item)
                    ))
                })?;
                Ok(object
                    .iter()
                    .map(|(key, value)| (key.clone(), json_to_cell(value)))
                    .collect::<RawRow>())
            })
            .collect::<ImportResult<Vec<RawRow>>>()?;

        Ok(self.normalize(&rows))
    }

    /// 清洗单行
    ///
    /// # 返回
    /// - DeviationRecord: 总是生成（新 id）
    /// - Vec<ValidationError>: 该行的必填错误
    pub fn normalize_row(
        &self,
        row: &RawRow,
        row_number: usize,
    ) -> (DeviationRecord, Vec<ValidationError>) {
        let cleaner = &self.data_cleaner;
        let raw = self.field_mapper.map_to_raw_deviation(row, row_number);

        // 步骤 1: 字段提取与转换
        let driver = cleaner.clean_text(raw.driver.as_deref().unwrap_or(""), true);
        let deviation_type = cleaner.clean_text(raw.deviation_type.as_deref().unwrap_or(""), true);
        let quantity = cleaner.parse_quantity(&raw.quantity, self.quantity_policy);
        let month_raw = cleaner
            .normalize_null(raw.month.clone())
            .map(|m| cleaner.clean_text(&m, true));
        let treated = TreatmentStatus::from_label(
            raw.treated.as_deref().unwrap_or(TreatmentStatus::NAO_LABEL),
        );
        let parsed_date = cleaner.parse_date(&raw.date);

        // 步骤 2: 必填校验
        let errors = self.dq_validator.validate_required_fields(
            row_number,
            &driver,
            &deviation_type,
            parsed_date,
        );

        let mut record = DeviationRecord {
            id: DeviationRecord::new_id(),
            driver,
            deviation_type,
            quantity,
            month: month_raw.clone().unwrap_or_default(),
            treated,
            treatment_action: cleaner.clean_text(raw.treatment_action.as_deref().unwrap_or(""), false),
            date: raw.date.to_text(),
            status: cleaner.clean_text(raw.status.as_deref().unwrap_or(""), false),
            applied_by: cleaner.clean_text(raw.applied_by.as_deref().unwrap_or(""), false),
            year: None,
            month_number: None,
            week: None,
            is_valid: false,
        };

        // 步骤 3: 日历派生（仅日期有效时）
        if let Some(date) = parsed_date {
            let calendar = self.derivation_service.derive_calendar(date);
            record.year = Some(calendar.year);
            record.month_number = Some(calendar.month_number);
            record.week = Some(calendar.week);
            record.month = self
                .derivation_service
                .derive_month_label(month_raw.as_deref(), calendar.month_number);
            record.date = date.format("%Y-%m-%d").to_string();
            record.is_valid = errors.is_empty();
        }

        (record, errors)
    }
}

/// JSON 值 → 单元格
fn json_to_cell(value: &serde_json::Value) -> CellValue {
    match value {
        serde_json::Value::Null => CellValue::Empty,
        serde_json::Value::Number(n) => n.as_f64().map(CellValue::Number).unwrap_or_default(),
        serde_json::Value::String(s) => CellValue::Text(s.clone()),
        serde_json::Value::Bool(b) => CellValue::Text(if *b { "TRUE" } else { "FALSE" }.to_string()),
        other => CellValue::Text(other.to_string()),
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
