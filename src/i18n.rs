// ==========================================
// 国际化 (i18n) 模块
// ==========================================
// 使用 rust-i18n 库
// 支持葡萄牙语（默认，pt-BR）和英文
// 用途: 面向用户的操作提示（同步 / 导入 / 清洗 / 导出）
// ==========================================
// 注意: rust_i18n::i18n! 宏已在 lib.rs 中初始化
// ==========================================

/// 默认语言
pub const DEFAULT_LOCALE: &str = "pt-BR";

/// 获取当前语言
pub fn current_locale() -> String {
    rust_i18n::locale().to_string()
}

/// 设置语言
///
/// # 参数
/// - locale: 语言代码（"pt-BR" 或 "en"）
pub fn set_locale(locale: &str) {
    rust_i18n::set_locale(locale);
}

/// 翻译消息（无参数）
///
/// # 示例
/// ```no_run
/// use fleet_deviation::i18n::t;
/// let msg = t("sync.not_configured");
/// ```
pub fn t(key: &str) -> String {
    rust_i18n::t!(key).to_string()
}

/// 翻译消息（带参数）
///
/// # 示例
/// ```no_run
/// use fleet_deviation::i18n::t_with_args;
/// let msg = t_with_args("sync.loaded", &[("count", "12")]);
/// ```
pub fn t_with_args(key: &str, args: &[(&str, &str)]) -> String {
    fill_args(rust_i18n::t!(key).to_string(), args)
}

/// 指定语言翻译（不修改全局语言）
pub fn t_in(locale: &str, key: &str, args: &[(&str, &str)]) -> String {
    fill_args(rust_i18n::t!(key, locale = locale).to_string(), args)
}

fn fill_args(mut message: String, args: &[(&str, &str)]) -> String {
    for (k, v) in args {
        let placeholder = format!("%{{{}}}", k);
        message = message.replace(&placeholder, v);
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translate_in_explicit_locale() {
        assert_eq!(t_in("pt-BR", "common.success", &[]), "Sucesso");
        assert_eq!(t_in("en", "common.success", &[]), "Success");
    }

    #[test]
    fn test_translate_with_args() {
        let msg = t_in("pt-BR", "sync.loaded", &[("count", "7")]);
        assert_eq!(msg, "7 registros carregados da nuvem.");

        let msg = t_in("en", "import.done", &[("total", "10"), ("valid", "8")]);
        assert_eq!(msg, "10 rows imported (8 valid).");
    }

    #[test]
    fn test_unknown_locale_falls_back_to_default() {
        assert_eq!(t_in("fr", "common.error", &[]), "Erro");
    }

    #[test]
    fn test_default_locale_messages_have_no_placeholders_left() {
        let msg = t_with_args("sync.save_failed", &[("error", "timeout")]);
        assert!(msg.contains("timeout"));
        assert!(!msg.contains("%{"));
    }
}
