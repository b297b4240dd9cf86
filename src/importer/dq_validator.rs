// ==========================================
// 车队驾驶偏差管理系统 - 必填校验器实现
// ==========================================
// 职责: 必填字段校验 + 清洗汇总
// 规则: 每个未满足的必填项生成一条 ValidationError
//       DATA 缺失与无法解析合并为同一条
// ==========================================

use crate::domain::{columns, DeviationRecord, ValidationError};
use crate::importer::normalizer_trait::{DqValidator as DqValidatorTrait, NormalizeSummary};
use chrono::NaiveDate;

/// 必填字段缺失提示
pub const REQUIRED_FIELD_MESSAGE: &str = "Campo obrigatório";

pub struct DqValidator;

impl DqValidatorTrait for DqValidator {
    fn validate_required_fields(
        &self,
        row_number: usize,
        driver: &str,
        deviation_type: &str,
        date: Option<NaiveDate>,
    ) -> Vec<ValidationError> {
        let mut violations = Vec::new();

        if driver.is_empty() {
            violations.push(self.required(row_number, columns::DRIVER));
        }
        if deviation_type.is_empty() {
            violations.push(self.required(row_number, columns::DEVIATION_TYPE));
        }
        if date.is_none() {
            violations.push(self.required(row_number, columns::DATE));
        }

        violations
    }

    fn summarize(
        &self,
        records: &[DeviationRecord],
        errors: &[ValidationError],
    ) -> NormalizeSummary {
        let valid = records.iter().filter(|r| r.is_valid).count();
        let mut summary = NormalizeSummary {
            total_rows: records.len(),
            valid,
            invalid: records.len() - valid,
            error_count: errors.len(),
            ..Default::default()
        };
        for error in errors {
            *summary.errors_by_field.entry(error.field.clone()).or_insert(0) += 1;
        }
        summary
    }
}

impl DqValidator {
    fn required(&self, row_number: usize, field: &str) -> ValidationError {
        ValidationError {
            row: row_number,
            field: field.to_string(),
            message: REQUIRED_FIELD_MESSAGE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_required_present() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 2);
        let errors = DqValidator.validate_required_fields(1, "ANA", "USO DE CELULAR", date);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_each_missing_field_yields_one_error() {
        let errors = DqValidator.validate_required_fields(7, "", "", None);
        assert_eq!(errors.len(), 3);
        assert!(errors.iter().all(|e| e.row == 7));
        assert!(errors.iter().all(|e| e.message == REQUIRED_FIELD_MESSAGE));

        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["MOTORISTAS", "TIPO DE DESVIO", "DATA"]);
    }

    #[test]
    fn test_summarize_counts_by_field() {
        let errors = vec![
            DqValidator.required(1, columns::DATE),
            DqValidator.required(2, columns::DATE),
            DqValidator.required(2, columns::DRIVER),
        ];
        let summary = DqValidator.summarize(&[], &errors);
        assert_eq!(summary.error_count, 3);
        assert_eq!(summary.errors_by_field.get("DATA"), Some(&2));
        assert_eq!(summary.errors_by_field.get("MOTORISTAS"), Some(&1));
        assert_eq!(summary.total_rows, 0);
    }
}
