// ==========================================
// 偏差数据导入API
// ==========================================
// 职责: 封装文件导入、JSON 行清洗、重新清洗
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::{DeviationRecord, QuantityPolicy, RawRow};
use crate::importer::{
    DeviationImporter, DeviationImporterImpl, ImportReport, NormalizeOutcome, Normalizer,
};
use std::path::Path;

/// 导入API
pub struct ImportApi {
    importer: DeviationImporterImpl,
}

impl ImportApi {
    pub fn new(quantity_policy: QuantityPolicy) -> Self {
        Self {
            importer: DeviationImporterImpl::new(Normalizer::new(quantity_policy)),
        }
    }

    /// 导入文件（.xlsx / .xls / .csv）
    pub async fn import_file<P: AsRef<Path> + Send>(&self, file_path: P) -> ApiResult<ImportReport> {
        Ok(self.importer.import_file(file_path).await?)
    }

    /// 导入上传的字节流
    pub async fn import_bytes(&self, file_name: &str, bytes: &[u8]) -> ApiResult<ImportReport> {
        if bytes.is_empty() {
            return Err(ApiError::InvalidInput(format!("文件为空: {}", file_name)));
        }
        Ok(self.importer.import_bytes(file_name, bytes).await?)
    }

    /// 批量导入（并发），每个文件一个结果
    pub async fn batch_import<P: AsRef<Path> + Send + Sync>(
        &self,
        file_paths: Vec<P>,
    ) -> Vec<Result<ImportReport, String>> {
        self.importer.batch_import(file_paths).await
    }

    /// 清洗已解析的行
    pub fn normalize_rows(&self, rows: &[RawRow]) -> NormalizeOutcome {
        self.importer.normalizer().normalize(rows)
    }

    /// 清洗 JSON 行（对象数组）
    pub fn normalize_json(&self, value: &serde_json::Value) -> ApiResult<NormalizeOutcome> {
        Ok(self.importer.normalizer().normalize_json(value)?)
    }

    /// 重新清洗当前记录（"Tratar Dados"）
    pub fn reclean(&self, records: &[DeviationRecord]) -> NormalizeOutcome {
        self.importer.normalizer().normalize_records(records)
    }
}

impl Default for ImportApi {
    fn default() -> Self {
        Self::new(QuantityPolicy::default())
    }
}
