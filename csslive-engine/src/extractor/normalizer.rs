//! 文本归一化：换行折叠、注释剥离、定界符清扫、空白压缩
use once_cell::sync::Lazy;
use regex::Regex;

// 正则常量（懒加载，避免重复编译）
static LINE_BREAK_REGEX: Lazy<Regex> = Lazy::new(|| {
    // CRLF 必须排在 CR / LF 之前，保证一次换行只产生一个空格
    Regex::new(r"\r\n|\r|\n|\t").unwrap()
});

static CSS_COMMENT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)/\*.*?\*/").unwrap()
});

static HTML_COMMENT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<!--.*?-->").unwrap()
});

static MULTI_WHITESPACE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s{2,}").unwrap()
});

/// 所有注释定界符，输出中一律不允许出现
pub const COMMENT_DELIMITERS: &[&str] = &["/*", "*/", "<!--", "-->"];

/// 文本归一化器（无状态，所有方法均为纯函数）
#[derive(Debug, Default)]
pub struct TextNormalizer;

impl TextNormalizer {
    /// 将 CR / LF / CRLF / TAB 各替换为单个空格，结果为单行文本
    pub fn fold_line_breaks(&self, text: &str) -> String {
        LINE_BREAK_REGEX.replace_all(text, " ").into_owned()
    }

    /// 移除注释
    /// 1. HTML 注释（仅 strip_html 开启时）：完整注释删除，未闭合的 `<!--` 吞掉其后全部内容
    /// 2. CSS 注释：完整注释删除，未闭合的 `/*` 吞掉其后全部内容（与浏览器CSS解析一致）
    /// 3. 清扫残留定界符，保证结果中不含任何注释定界符
    pub fn strip_comments(&self, text: &str, strip_html: bool) -> String {
        let mut out = text.to_string();

        if strip_html {
            out = HTML_COMMENT_REGEX.replace_all(&out, "").into_owned();
            truncate_at(&mut out, "<!--");
        }

        out = CSS_COMMENT_REGEX.replace_all(&out, "").into_owned();
        truncate_at(&mut out, "/*");

        self.scrub_delimiters(&out)
    }

    /// 反复移除注释定界符直到稳定
    /// 删除一个定界符可能让两侧字符拼出新的定界符（如 `**//`），因此需要循环
    pub fn scrub_delimiters(&self, text: &str) -> String {
        let mut out = text.to_string();
        while let Some(delim) = COMMENT_DELIMITERS.iter().find(|d| out.contains(**d)) {
            out = out.replace(*delim, "");
        }
        out
    }

    /// 移除所有 `{` `}`
    pub fn strip_braces(&self, text: &str) -> String {
        text.chars().filter(|c| *c != '{' && *c != '}').collect()
    }

    /// 连续 2 个及以上空白压缩为单个空格，并去除首尾空白
    pub fn collapse_whitespace(&self, text: &str) -> String {
        MULTI_WHITESPACE_REGEX.replace_all(text.trim(), " ").into_owned()
    }

    /// 输出片段收尾：去花括号 → 清扫定界符 → 压缩空白
    /// 去花括号可能拼出定界符（`/{*`），清扫定界符不会产生花括号，顺序不可颠倒
    pub fn finalize_fragment(&self, text: &str) -> String {
        let no_braces = self.strip_braces(text);
        let scrubbed = self.scrub_delimiters(&no_braces);
        self.collapse_whitespace(&scrubbed)
    }

    /// 拼接结果收尾：去花括号 → 清扫定界符，不改动空白（保留分隔符原样）
    /// 分隔符未经校验时，它与相邻片段可能拼出花括号或定界符
    pub fn seal_joined(&self, text: &str) -> String {
        let no_braces = self.strip_braces(text);
        self.scrub_delimiters(&no_braces)
    }
}

/// 从第一次出现 marker 的位置截断
fn truncate_at(text: &mut String, marker: &str) {
    if let Some(pos) = text.find(marker) {
        text.truncate(pos);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_line_breaks() {
        let n = TextNormalizer;
        assert_eq!(n.fold_line_breaks("a\r\nb\rc\nd\te"), "a b c d e");
        assert_eq!(n.fold_line_breaks("\r\n\r\n"), "  ");
    }

    #[test]
    fn test_strip_comments() {
        let n = TextNormalizer;
        assert_eq!(n.strip_comments("a /* x */ b /* y */ c", true), "a  b  c");
        assert_eq!(n.strip_comments("a <!-- x --> b", true), "a  b");
        // 未闭合注释吞掉剩余内容
        assert_eq!(n.strip_comments("color: red; /* oops", true), "color: red; ");
        assert_eq!(n.strip_comments("color: red; <!-- oops", true), "color: red; ");
    }

    #[test]
    fn test_html_flag_only_controls_content() {
        let n = TextNormalizer;
        // 关闭 HTML 注释剥离后，注释内容保留，但定界符仍被清除
        assert_eq!(n.strip_comments("a <!-- x --> b", false), "a  x  b");
    }

    #[test]
    fn test_scrub_delimiters_until_stable() {
        let n = TextNormalizer;
        assert_eq!(n.scrub_delimiters("a**//b"), "ab");
        assert_eq!(n.scrub_delimiters("x */ y"), "x  y");
        assert_eq!(n.scrub_delimiters("<!<!---->"), ">");
    }

    #[test]
    fn test_seal_joined() {
        let n = TextNormalizer;
        assert_eq!(n.seal_joined("x:/*y:1"), "x:y:1");
        assert_eq!(n.seal_joined("x:1}y:2"), "x:1y:2");
        assert_eq!(n.seal_joined("x:1  |  y:2"), "x:1  |  y:2");
    }

    #[test]
    fn test_finalize_fragment() {
        let n = TextNormalizer;
        assert_eq!(n.finalize_fragment("  color:   red  "), "color: red");
        assert_eq!(n.finalize_fragment("a/{*b"), "ab");
        assert_eq!(n.finalize_fragment("{ }"), "");
    }
}
