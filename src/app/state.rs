// ==========================================
// 车队驾驶偏差管理系统 - 应用状态
// ==========================================
// 职责: 持有工作区、API 实例与外部协作方（存储 / 认证）
// 约定:
// - 未配置存储时降级为本地模式，云端操作返回 "未配置" 提示
// - 云端保存 / 删除失败不回滚本地修改（最后写入者生效）
// - 删除先改本地，再尽力删除云端
// - 驾驶舱视图按 (revision, filter) 缓存
// ==========================================

use crate::api::{ApiError, ApiResult, DashboardApi, ExportApi, ImportApi};
use crate::config::AppConfig;
use crate::domain::{CellValue, DeviationFilter, RecordField};
use crate::engine::{DashboardView, FilterOptions};
use crate::exporter::ReportDeck;
use crate::i18n::{t, t_with_args};
use crate::importer::{ImportReport, NormalizeOutcome};
use crate::repository::{
    AuthProvider, DeviationStore, RepositoryError, Session, SessionCallback, SessionSubscription,
    SqliteAuthProvider, SqliteDeviationStore,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::workspace::Workspace;

// ==========================================
// Notice - 操作结果提示
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoticeKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.kind == NoticeKind::Success
    }
}

struct CachedDashboard {
    revision: u64,
    filter: DeviationFilter,
    view: Arc<DashboardView>,
}

/// 应用状态
pub struct AppState {
    config: AppConfig,

    pub import_api: Arc<ImportApi>,
    pub dashboard_api: Arc<DashboardApi>,
    pub export_api: Arc<ExportApi>,

    workspace: Workspace,
    dashboard_cache: Option<CachedDashboard>,

    store: Option<Arc<dyn DeviationStore>>,
    auth: Option<Arc<dyn AuthProvider>>,
}

impl AppState {
    /// 注入协作方创建
    pub fn new(
        config: AppConfig,
        store: Option<Arc<dyn DeviationStore>>,
        auth: Option<Arc<dyn AuthProvider>>,
    ) -> Self {
        Self {
            import_api: Arc::new(ImportApi::new(config.quantity_policy)),
            dashboard_api: Arc::new(DashboardApi::new(config.limits)),
            export_api: Arc::new(ExportApi::new()),
            config,
            workspace: Workspace::new(),
            dashboard_cache: None,
            store,
            auth,
        }
    }

    /// 本地模式（无存储、无认证）
    pub fn local_only(config: AppConfig) -> Self {
        Self::new(config, None, None)
    }

    /// 按配置打开 SQLite 存储与认证
    ///
    /// 存储未配置时返回本地模式
    pub fn open(config: AppConfig) -> ApiResult<Self> {
        let Some(path) = config.store.configured_path().map(str::to_string) else {
            info!("存储未配置，使用本地模式");
            return Ok(Self::local_only(config));
        };

        let conn = crate::db::open_shared(&path).map_err(RepositoryError::from)?;
        info!(db_path = %path, "打开偏差存储");

        let store: Arc<dyn DeviationStore> =
            Arc::new(SqliteDeviationStore::from_connection(Arc::clone(&conn)));
        let auth: Arc<dyn AuthProvider> = Arc::new(SqliteAuthProvider::from_connection(conn));
        Ok(Self::new(config, Some(store), Some(auth)))
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn is_store_configured(&self) -> bool {
        self.store.is_some()
    }

    // ==========================================
    // 导入 / 清洗
    // ==========================================

    /// 导入文件，成功时替换工作区
    #[instrument(skip(self, file_path), fields(file = %file_path.as_ref().display()))]
    pub async fn import_file<P: AsRef<Path> + Send>(&mut self, file_path: P) -> Notice {
        let result = self.import_api.import_file(file_path).await;
        self.finish_import(result)
    }

    /// 导入上传内容，成功时替换工作区
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn import_bytes(&mut self, file_name: &str, bytes: &[u8]) -> Notice {
        let result = self.import_api.import_bytes(file_name, bytes).await;
        self.finish_import(result)
    }

    fn finish_import(&mut self, result: ApiResult<ImportReport>) -> Notice {
        match result {
            Ok(report) => {
                let total = report.summary.total_rows.to_string();
                let valid = report.summary.valid.to_string();
                self.workspace.replace_all(report.records, report.errors);
                Notice::success(t_with_args(
                    "import.done",
                    &[("total", &total), ("valid", &valid)],
                ))
            }
            Err(e) => {
                warn!(error = %e, "导入失败");
                Notice::error(t_with_args("import.failed", &[("error", &e.to_string())]))
            }
        }
    }

    /// 重新清洗当前记录（"Tratar Dados"）
    pub fn apply_treatment(&mut self) -> Notice {
        let NormalizeOutcome {
            records,
            errors,
            summary,
        } = self.import_api.reclean(self.workspace.records());
        self.workspace.replace_all(records, errors);
        Notice::success(t_with_args(
            "treatment.done",
            &[
                ("valid", &summary.valid.to_string()),
                ("invalid", &summary.invalid.to_string()),
            ],
        ))
    }

    // ==========================================
    // 表格编辑
    // ==========================================

    pub fn add_blank_row(&mut self, today: NaiveDate) -> String {
        self.workspace.add_blank_row(today)
    }

    pub fn update_cell(&mut self, id: &str, field: RecordField, value: &CellValue) -> bool {
        self.workspace.update_cell(id, field, value)
    }

    // ==========================================
    // 驾驶舱
    // ==========================================

    /// 驾驶舱视图（同一 revision + filter 复用结果）
    pub fn dashboard(&mut self, filter: &DeviationFilter) -> Arc<DashboardView> {
        let revision = self.workspace.revision();
        if let Some(cached) = &self.dashboard_cache {
            if cached.revision == revision && cached.filter == *filter {
                return Arc::clone(&cached.view);
            }
        }

        let view = Arc::new(
            self.dashboard_api
                .get_dashboard(self.workspace.records(), filter),
        );
        self.dashboard_cache = Some(CachedDashboard {
            revision,
            filter: filter.clone(),
            view: Arc::clone(&view),
        });
        view
    }

    pub fn filter_options(&self) -> FilterOptions {
        self.dashboard_api
            .get_filter_options(self.workspace.records())
    }

    /// 汇报大纲（基于当前筛选）
    pub fn report(&mut self, filter: &DeviationFilter, today: NaiveDate) -> ReportDeck {
        let view = self.dashboard(filter);
        self.export_api.build_report(&view, today)
    }

    // ==========================================
    // 导出
    // ==========================================

    /// 标准工作簿（BASE_ATUAL 全部 + BASE_TRATADA 有效）
    pub fn export_workbook(&self) -> ApiResult<Vec<u8>> {
        self.export_api
            .export_workbook(self.workspace.records(), &self.workspace.valid_records())
    }

    pub fn export_filtered(&self, filter: &DeviationFilter) -> ApiResult<Vec<u8>> {
        self.export_api
            .export_filtered(self.workspace.records(), filter)
    }

    pub fn save_workbook<P: AsRef<Path>>(&self, path: P) -> Notice {
        let path = path.as_ref();
        match self.export_api.save_workbook(
            self.workspace.records(),
            &self.workspace.valid_records(),
            path,
        ) {
            Ok(()) => Notice::success(t_with_args(
                "export.saved",
                &[("path", &path.display().to_string())],
            )),
            Err(e) => {
                warn!(error = %e, "导出失败");
                Notice::error(t_with_args("export.failed", &[("error", &e.to_string())]))
            }
        }
    }

    // ==========================================
    // 云同步
    // ==========================================

    /// 可用的远程存储（未配置 / 未登录时返回提示）
    fn remote_store(&self) -> Result<Arc<dyn DeviationStore>, Notice> {
        let store = self
            .store
            .as_ref()
            .ok_or_else(|| Notice::error(t("sync.not_configured")))?;
        if let Some(auth) = &self.auth {
            if auth.current_session().is_none() {
                return Err(Notice::error(t("sync.not_signed_in")));
            }
        }
        Ok(Arc::clone(store))
    }

    /// 从云端加载，成功时整体替换工作区
    #[instrument(skip(self))]
    pub async fn load_from_cloud(&mut self) -> Notice {
        let store = match self.remote_store() {
            Ok(store) => store,
            Err(notice) => return notice,
        };

        match store.fetch_all().await {
            Ok(records) => {
                let count = records.len().to_string();
                self.workspace.replace_all(records, Vec::new());
                info!(count = %count, "云端记录已加载");
                Notice::success(t_with_args("sync.loaded", &[("count", &count)]))
            }
            Err(e) => {
                warn!(error = %e, "云端加载失败");
                Notice::error(t_with_args("sync.load_failed", &[("error", &e.to_string())]))
            }
        }
    }

    /// 保存全部记录到云端
    #[instrument(skip(self))]
    pub async fn save_to_cloud(&self) -> Notice {
        let store = match self.remote_store() {
            Ok(store) => store,
            Err(notice) => return notice,
        };

        match store.upsert(self.workspace.records()).await {
            Ok(count) => Notice::success(t_with_args(
                "sync.saved",
                &[("count", &count.to_string())],
            )),
            Err(e) => {
                warn!(error = %e, "云端保存失败");
                Notice::error(t_with_args("sync.save_failed", &[("error", &e.to_string())]))
            }
        }
    }

    /// 删除记录
    ///
    /// # 返回
    /// - None: 本地模式，仅删除本地
    /// - Some(notice): 云端删除结果（本地删除不受影响）
    #[instrument(skip(self))]
    pub async fn delete_record(&mut self, id: &str) -> Option<Notice> {
        if self.workspace.remove(id).is_none() {
            warn!(id, "本地记录不存在");
        }

        if self.store.is_none() {
            return None;
        }
        let store = match self.remote_store() {
            Ok(store) => store,
            Err(notice) => return Some(notice),
        };

        Some(match store.delete_by_id(id).await {
            Ok(()) => Notice::success(t("sync.deleted")),
            Err(e) => {
                warn!(error = %e, "云端删除失败");
                Notice::error(t_with_args(
                    "sync.delete_failed",
                    &[("error", &e.to_string())],
                ))
            }
        })
    }

    // ==========================================
    // 认证
    // ==========================================

    fn auth_provider(&self) -> Result<Arc<dyn AuthProvider>, Notice> {
        self.auth
            .as_ref()
            .map(Arc::clone)
            .ok_or_else(|| Notice::error(t("sync.not_configured")))
    }

    #[instrument(skip(self, password))]
    pub async fn sign_in(&self, email: &str, password: &str) -> Notice {
        let auth = match self.auth_provider() {
            Ok(auth) => auth,
            Err(notice) => return notice,
        };
        match auth.sign_in(email, password).await {
            Ok(session) => Notice::success(t_with_args(
                "auth.signed_in",
                &[("email", &session.email)],
            )),
            Err(e) => auth_failed(e.into()),
        }
    }

    #[instrument(skip(self, password))]
    pub async fn sign_up(&self, email: &str, password: &str) -> Notice {
        let auth = match self.auth_provider() {
            Ok(auth) => auth,
            Err(notice) => return notice,
        };
        match auth.sign_up(email, password).await {
            Ok(session) => Notice::success(t_with_args(
                "auth.signed_up",
                &[("email", &session.email)],
            )),
            Err(e) => auth_failed(e.into()),
        }
    }

    #[instrument(skip(self))]
    pub async fn sign_out(&self) -> Notice {
        let auth = match self.auth_provider() {
            Ok(auth) => auth,
            Err(notice) => return notice,
        };
        match auth.sign_out().await {
            Ok(()) => Notice::success(t("auth.signed_out")),
            Err(e) => auth_failed(e.into()),
        }
    }

    pub fn session(&self) -> Option<Session> {
        self.auth.as_ref().and_then(|auth| auth.current_session())
    }

    /// 订阅会话变化（本地模式返回 None）
    pub fn on_session_change(&self, callback: SessionCallback) -> Option<SessionSubscription> {
        self.auth
            .as_ref()
            .map(|auth| auth.on_session_change(callback))
    }
}

fn auth_failed(error: ApiError) -> Notice {
    warn!(error = %error, "认证失败");
    Notice::error(t_with_args("auth.failed", &[("error", &error.to_string())]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 2).unwrap()
    }

    #[test]
    fn test_dashboard_is_memoized_per_revision_and_filter() {
        let mut state = AppState::local_only(AppConfig::default());
        state.add_blank_row(today());

        let filter = DeviationFilter::default();
        let first = state.dashboard(&filter);
        let second = state.dashboard(&filter);
        assert!(Arc::ptr_eq(&first, &second));

        let other = state.dashboard(&filter.clone().driver("x"));
        assert!(!Arc::ptr_eq(&first, &other));

        state.add_blank_row(today());
        let third = state.dashboard(&filter);
        assert!(!Arc::ptr_eq(&first, &third));
        assert_eq!(third.kpis.record_count, 2);
    }

    #[tokio::test]
    async fn test_local_only_sync_reports_not_configured() {
        let mut state = AppState::local_only(AppConfig::default());
        assert!(!state.is_store_configured());

        assert_eq!(state.load_from_cloud().await.kind, NoticeKind::Error);
        assert_eq!(state.save_to_cloud().await.kind, NoticeKind::Error);
        assert_eq!(state.sign_in("a@b.com", "secret").await.kind, NoticeKind::Error);
        assert!(state.session().is_none());
    }

    #[tokio::test]
    async fn test_local_only_delete_removes_locally() {
        let mut state = AppState::local_only(AppConfig::default());
        let id = state.add_blank_row(today());

        assert!(state.delete_record(&id).await.is_none());
        assert!(state.workspace().is_empty());
    }

    #[test]
    fn test_apply_treatment_validates_edited_rows() {
        let mut state = AppState::local_only(AppConfig::default());
        let id = state.add_blank_row(today());
        state.update_cell(&id, RecordField::Driver, &CellValue::text(" ana souza "));
        state.update_cell(&id, RecordField::DeviationType, &CellValue::text("freada brusca"));

        let notice = state.apply_treatment();
        assert!(notice.is_success());

        let record = &state.workspace().records()[0];
        assert_eq!(record.driver, "ANA SOUZA");
        assert_eq!(record.deviation_type, "FREADA BRUSCA");
        assert_eq!(record.date, "2024-05-02");
        assert!(record.is_valid);
    }
}
