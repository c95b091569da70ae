//! csslive - 实时 CSS 镜像：监听编辑区域中的 CSS 文本，净化后写入目标元素 style 属性或页面样式表

// 导出全局错误类型
pub use self::error::{CssLiveError, CssLiveResult};

// 导出配置模块
pub use self::config::{PropagationTarget, WatchOptions, WatchOptionsBuilder};

// 导出宿主接口
pub use self::host::{
    ContentSource, Host, MemoryDocument, MemoryElement, SourceKind, StyleSink, TargetId,
};

// 导出监听注册表
pub use self::watcher::{WatchHandle, WatchRegistry};

// 导出声明式引导
pub use self::bootstrap::{Bootstrapper, Declaration, DocumentScanner, ScannedElement};

// 导出内核类型
pub use csslive_engine::{
    ChangeGate, CleanRuleSet, CleanStylesheet, ExtractOutcome, ExtractionPolicy, RuleExtractor,
    Sanitized, SourceId, StylesheetOutcome, SuspiciousRejection, SuspiciousSignature,
    DEFAULT_RULE_SEPARATOR, SUSPICIOUS_PAYLOAD,
};

// 声明所有子模块
pub mod bootstrap;
pub mod config;
pub mod error;
pub mod host;
pub mod logging;
pub mod watcher;

/// 便捷接口：按默认策略提取行内样式，返回写入 style 属性的文本
pub fn extract_inline_style(raw: &str) -> String {
    RuleExtractor::new()
        .extract(raw, &ExtractionPolicy::default())
        .into_payload()
}

/// 便捷接口：加载 HTML 并激活其中全部声明
pub fn watch_document(
    html: &str,
) -> CssLiveResult<(MemoryDocument, WatchRegistry, Vec<WatchHandle>)> {
    let (mut document, declarations) = Bootstrapper::load(html)?;
    let mut registry = WatchRegistry::new();
    let handles = Bootstrapper::auto_register(&mut registry, &mut document, declarations);
    Ok((document, registry, handles))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_inline_style() {
        assert_eq!(
            extract_inline_style("a {color: red;}\nb {font-size: 2}"),
            "color: red; font-size: 2"
        );
        assert_eq!(
            extract_inline_style("a{background:url(javascript:alert(1))}"),
            SUSPICIOUS_PAYLOAD
        );
        assert_eq!(extract_inline_style(""), "");
    }

    #[test]
    fn test_watch_document_end_to_end() {
        let html = r##"<textarea id="src" data-cssliveupdate-target="#out">div { margin: 0 }</textarea>
            <p id="out"></p>"##;
        let (mut document, mut registry, handles) = watch_document(html).unwrap();
        assert_eq!(handles.len(), 1);
        assert_eq!(document.style_of("out"), Some("margin: 0"));

        let source = SourceId::new("src");
        document.set_value("src", "div { margin: 0; padding: 2px }");
        assert!(registry.notify_change(&mut document, &source));
        assert_eq!(document.style_of("out"), Some("margin: 0; padding: 2px"));

        assert!(registry.deactivate(&mut document, &source));
        document.set_value("src", "div { margin: 4px }");
        assert!(!registry.notify_change(&mut document, &source));
        assert_eq!(document.style_of("out"), Some("margin: 0; padding: 2px"));
    }
}
