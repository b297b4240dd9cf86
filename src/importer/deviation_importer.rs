// ==========================================
// 车队驾驶偏差管理系统 - 偏差数据导入器实现
// ==========================================
// 职责: 整合导入流程，从文件到标准记录
// 流程: 解析 → 映射 → 清洗 → 派生 → 校验
// 说明: 不落库；持久化由应用层的云同步负责
// ==========================================

use crate::domain::RawRow;
use crate::importer::error::ImportResult;
use crate::importer::file_parser::UniversalFileParser;
use crate::importer::normalizer::Normalizer;
use crate::importer::normalizer_trait::{DeviationImporter, ImportReport};
use chrono::Utc;
use std::path::Path;
use std::time::Instant;
use tracing::{error, info, instrument};
use uuid::Uuid;

// ==========================================
// DeviationImporterImpl
// ==========================================
pub struct DeviationImporterImpl {
    file_parser: UniversalFileParser,
    normalizer: Normalizer,
}

impl DeviationImporterImpl {
    pub fn new(normalizer: Normalizer) -> Self {
        Self {
            file_parser: UniversalFileParser,
            normalizer,
        }
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    fn build_report(&self, file_name: &str, rows: Vec<RawRow>, start: Instant) -> ImportReport {
        let outcome = self.normalizer.normalize(&rows);
        ImportReport {
            batch_id: Uuid::new_v4().to_string(),
            file_name: file_name.to_string(),
            imported_at: Utc::now(),
            elapsed_ms: start.elapsed().as_millis() as u64,
            records: outcome.records,
            errors: outcome.errors,
            summary: outcome.summary,
        }
    }
}

impl Default for DeviationImporterImpl {
    fn default() -> Self {
        Self::new(Normalizer::default())
    }
}

#[async_trait::async_trait]
impl DeviationImporter for DeviationImporterImpl {
    #[instrument(skip(self, file_path))]
    async fn import_file<P: AsRef<Path> + Send>(&self, file_path: P) -> ImportResult<ImportReport> {
        let start = Instant::now();
        let path = file_path.as_ref();
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();

        info!(file = %path.display(), "开始导入偏差数据");
        let rows = self.file_parser.parse(path).map_err(|e| {
            error!(error = %e, "文件解析失败");
            e
        })?;

        let report = self.build_report(&file_name, rows, start);
        info!(
            batch_id = %report.batch_id,
            total_rows = report.summary.total_rows,
            valid = report.summary.valid,
            elapsed_ms = report.elapsed_ms,
            "导入完成"
        );
        Ok(report)
    }

    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    async fn import_bytes(&self, file_name: &str, bytes: &[u8]) -> ImportResult<ImportReport> {
        let start = Instant::now();
        let rows = self.file_parser.parse_bytes(file_name, bytes)?;
        let report = self.build_report(file_name, rows, start);
        info!(batch_id = %report.batch_id, total_rows = report.summary.total_rows, "导入完成");
        Ok(report)
    }

    async fn batch_import<P: AsRef<Path> + Send + Sync>(
        &self,
        file_paths: Vec<P>,
    ) -> Vec<Result<ImportReport, String>> {
        use futures::future::join_all;

        info!(count = file_paths.len(), "开始批量导入文件");

        let import_tasks = file_paths.into_iter().map(|path| {
            let path_str = path.as_ref().display().to_string();
            async move {
                match self.import_file(path).await {
                    Ok(report) => Ok(report),
                    Err(e) => {
                        error!(file = %path_str, error = %e, "文件导入失败");
                        Err(format!("{}: {}", path_str, e))
                    }
                }
            }
        });

        let results = join_all(import_tasks).await;

        info!(
            total = results.len(),
            success = results.iter().filter(|r| r.is_ok()).count(),
            failed = results.iter().filter(|r| r.is_err()).count(),
            "批量导入完成"
        );

        results
    }
}
