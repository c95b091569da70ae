//! 规则提取器：把被监听元素中的原始文本转为安全、单行的 CSS 声明串
//! 流程：折叠换行 → 剥离注释 → 可疑扫描 → 规则块提取 → 输出可疑扫描
use once_cell::sync::Lazy;
use regex::Regex;

use super::normalizer::TextNormalizer;
use super::suspicious::{SuspiciousScanner, SuspiciousSignature};
use crate::outcome::{
    CleanRuleSet, CleanStylesheet, ExtractOutcome, Sanitized, StylesheetOutcome,
    SuspiciousRejection,
};
use crate::policy::ExtractionPolicy;
use crate::utils::{preview_compact, PREVIEW_LEN};

// 规则块：非贪婪匹配，每个 `{` 与其后第一个 `}` 配对
static RULESET_BLOCK_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\{(.*?)\}").unwrap()
});

/// 规则提取器（无状态，可跨注册共享）
#[derive(Debug, Default)]
pub struct RuleExtractor {
    normalizer: TextNormalizer,
    scanner: SuspiciousScanner,
}

impl RuleExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// 提取行内样式声明
    /// - 含 `{...}` 规则块：只保留块内声明，块外文本（选择器等）全部丢弃
    /// - 不含规则块：整体视为裸声明列表
    /// - 安全检查开启时，注释剥离后的文本与最终输出都要通过可疑扫描
    pub fn extract(&self, raw: &str, policy: &ExtractionPolicy) -> ExtractOutcome {
        if let Err(e) = policy.validate() {
            log::warn!("{}; joined output will be re-sealed", e);
        }

        let single_line = self.normalizer.fold_line_breaks(raw);
        let stripped = self
            .normalizer
            .strip_comments(&single_line, policy.strip_html_comments);

        if policy.enforce_safety_check {
            if let Some(signature) = self.scanner.scan(&stripped) {
                return self.reject(signature, raw);
            }
        }

        let rules = self.collect_rules(&stripped, &policy.rule_separator);

        // 去花括号可能把分散的片段拼成关键字（如 `ex{pression`）
        if policy.enforce_safety_check {
            if let Some(signature) = self.scanner.scan(&rules) {
                return self.reject(signature, raw);
            }
        }

        log::trace!(
            "Extracted rules [{}] from [{}]",
            preview_compact(&rules, PREVIEW_LEN),
            preview_compact(raw, PREVIEW_LEN)
        );
        Sanitized::Clean(CleanRuleSet::new(rules))
    }

    /// 净化整张样式表（页面级 `<style>` 模式）
    /// 保留选择器与换行结构，只移除注释并执行可疑扫描
    pub fn sanitize_stylesheet(&self, raw: &str, policy: &ExtractionPolicy) -> StylesheetOutcome {
        let stripped = self
            .normalizer
            .strip_comments(raw, policy.strip_html_comments);
        let sheet = stripped.trim();

        if policy.enforce_safety_check {
            if let Some(signature) = self.scanner.scan(sheet) {
                return self.reject(signature, raw);
            }
        }

        Sanitized::Clean(CleanStylesheet::new(sheet.to_string()))
    }

    /// 块模式：逐块按 `;` 拆分声明，清理后用分隔符拼接
    /// 裸模式：去掉残留的不配对花括号，压缩空白
    fn collect_rules(&self, text: &str, separator: &str) -> String {
        let mut declarations: Vec<String> = Vec::new();
        let mut block_found = false;

        for caps in RULESET_BLOCK_REGEX.captures_iter(text) {
            block_found = true;
            let body = caps.get(1).map_or("", |m| m.as_str());
            declarations.extend(
                body.split(';')
                    .map(|decl| self.normalizer.finalize_fragment(decl))
                    .filter(|decl| !decl.is_empty()),
            );
        }

        if block_found {
            self.normalizer.seal_joined(&declarations.join(separator))
        } else {
            self.normalizer.finalize_fragment(text)
        }
    }

    fn reject<T>(&self, signature: SuspiciousSignature, raw: &str) -> Sanitized<T> {
        log::warn!(
            "Suspicious content rejected (signature: {}): [{}]",
            signature,
            preview_compact(raw, PREVIEW_LEN)
        );
        Sanitized::Suspicious(SuspiciousRejection::new(signature))
    }
}
