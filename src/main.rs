// ==========================================
// 车队驾驶偏差管理系统 - 命令行入口
// ==========================================
// 用法:
//   fleet-deviation <input.xlsx|.xls|.csv> [output.xlsx]
//
// 导入并清洗表格，驾驶舱视图以 JSON 输出到 stdout，
// 指定 output 时写出 BASE_ATUAL / BASE_TRATADA 工作簿
// 日志格式: FLEET_LOG_FORMAT=json 输出 JSON 日志
// ==========================================

use anyhow::{bail, Context};
use fleet_deviation::config::{AppConfig, ConfigManager, StoreSettings};
use fleet_deviation::{logging, AppState, DeviationFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    let mut args = std::env::args().skip(1);
    let Some(input) = args.next() else {
        bail!("用法: fleet-deviation <input.xlsx|.xls|.csv> [output.xlsx]");
    };
    let output = args.next();

    tracing::info!(version = fleet_deviation::VERSION, "{}", fleet_deviation::APP_NAME);

    let config = load_config()?;
    let mut state = AppState::local_only(config);

    let notice = state.import_file(&input).await;
    if !notice.is_success() {
        bail!("{}", notice.message);
    }
    eprintln!("{}", notice.message);

    for error in state.workspace().errors() {
        tracing::warn!("{}", error);
    }

    let view = state.dashboard(&DeviationFilter::default());
    let json = serde_json::to_string_pretty(view.as_ref()).context("序列化驾驶舱视图失败")?;
    println!("{}", json);

    if let Some(output) = output {
        let notice = state.save_workbook(&output);
        if !notice.is_success() {
            bail!("{}", notice.message);
        }
        eprintln!("{}", notice.message);
    }

    Ok(())
}

/// 默认配置；存储已配置时读取 config_kv 覆写
fn load_config() -> anyhow::Result<AppConfig> {
    let store = StoreSettings::from_env();
    match store.configured_path() {
        Some(path) => {
            let manager = ConfigManager::new(path)
                .with_context(|| format!("无法打开配置存储: {}", path))?;
            Ok(manager.load_app_config(store.clone())?)
        }
        None => Ok(AppConfig {
            store,
            ..AppConfig::default()
        }),
    }
}
