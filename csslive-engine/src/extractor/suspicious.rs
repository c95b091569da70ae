//! 可疑模式扫描：已知的 CSS / 标记注入手法特征库
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// 可疑特征类别，仅用于日志与诊断，拒绝时对外输出的载荷恒定不变
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SuspiciousSignature {
    /// 字母后紧跟 `//` 或 `//*`（伪装成单行注释）
    DisguisedComment,
    /// `/*/` 注释戏法
    SlashStarSlash,
    /// 任意反斜杠（CSS 转义可绕过关键字检测）
    Backslash,
    /// data: / eval / cookie / window / parent / this
    ScriptContext,
    /// moz-binding / @import / @charset
    CssDirective,
    /// behavior / expression / (java|vb)script / `<` / 反斜杠+单词字符
    DangerousKeyword,
    /// 低位控制字符
    ControlChar,
    /// 数字字符引用起始 `&#`
    CharReference,
}

impl Display for SuspiciousSignature {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SuspiciousSignature::DisguisedComment => write!(f, "disguised-comment"),
            SuspiciousSignature::SlashStarSlash => write!(f, "slash-star-slash"),
            SuspiciousSignature::Backslash => write!(f, "backslash"),
            SuspiciousSignature::ScriptContext => write!(f, "script-context"),
            SuspiciousSignature::CssDirective => write!(f, "css-directive"),
            SuspiciousSignature::DangerousKeyword => write!(f, "dangerous-keyword"),
            SuspiciousSignature::ControlChar => write!(f, "control-char"),
            SuspiciousSignature::CharReference => write!(f, "char-reference"),
        }
    }
}

// 特征库（懒加载，进程内只编译一次）
static SUSPICIOUS_PATTERNS: Lazy<Vec<(SuspiciousSignature, Regex)>> = Lazy::new(|| {
    vec![
        (SuspiciousSignature::DisguisedComment, Regex::new(r"\w//|\w//*\*").unwrap()),
        (SuspiciousSignature::SlashStarSlash, Regex::new(r"/\*/").unwrap()),
        (SuspiciousSignature::Backslash, Regex::new(r"\\").unwrap()),
        (
            SuspiciousSignature::ScriptContext,
            Regex::new(r"(?i)\bdata:\b|eval|cookie|\bwindow\b|\bparent\b|\bthis\b").unwrap(),
        ),
        (
            SuspiciousSignature::CssDirective,
            Regex::new(r"(?i)moz-binding|@import|@charset").unwrap(),
        ),
        (
            SuspiciousSignature::DangerousKeyword,
            Regex::new(r"(?i)behaviou?r|expression|(?:java|vb)?script|<|\\\w").unwrap(),
        ),
        (
            SuspiciousSignature::ControlChar,
            Regex::new(r"[\x00-\x08\x0B\x0C\x0E-\x1F]").unwrap(),
        ),
        (SuspiciousSignature::CharReference, Regex::new(r"&#").unwrap()),
    ]
});

/// 可疑模式扫描器
#[derive(Debug, Default)]
pub struct SuspiciousScanner;

impl SuspiciousScanner {
    /// 返回第一个命中的特征，未命中返回 None
    pub fn scan(&self, text: &str) -> Option<SuspiciousSignature> {
        SUSPICIOUS_PATTERNS
            .iter()
            .find(|(_, re)| re.is_match(text))
            .map(|(sig, _)| *sig)
    }

    pub fn is_suspicious(&self, text: &str) -> bool {
        self.scan(text).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(text: &str) -> Option<SuspiciousSignature> {
        SuspiciousScanner.scan(text)
    }

    #[test]
    fn test_clean_css_passes() {
        assert_eq!(scan("color: red; font-size: 2em"), None);
        assert_eq!(scan("background: url(http://example.com/a.png)"), None);
        assert_eq!(scan("a > b { margin: 0 auto }"), None);
        assert_eq!(scan(""), None);
    }

    #[test]
    fn test_signatures() {
        assert_eq!(scan("color: red//x"), Some(SuspiciousSignature::DisguisedComment));
        assert_eq!(scan("a/**"), Some(SuspiciousSignature::DisguisedComment));
        assert_eq!(scan("x /*/ y"), Some(SuspiciousSignature::SlashStarSlash));
        assert_eq!(scan(r"content: '\0'"), Some(SuspiciousSignature::Backslash));
        assert_eq!(scan("url(DATA:text/html)"), Some(SuspiciousSignature::ScriptContext));
        assert_eq!(scan("document.cookie"), Some(SuspiciousSignature::ScriptContext));
        assert_eq!(scan("top: window"), Some(SuspiciousSignature::ScriptContext));
        assert_eq!(scan("@IMPORT url(x.css)"), Some(SuspiciousSignature::CssDirective));
        assert_eq!(scan("-moz-binding: url(x)"), Some(SuspiciousSignature::CssDirective));
        assert_eq!(scan("behaviour: url(x.htc)"), Some(SuspiciousSignature::DangerousKeyword));
        assert_eq!(scan("width: Expression(1)"), Some(SuspiciousSignature::DangerousKeyword));
        assert_eq!(scan("url(VBScript:x)"), Some(SuspiciousSignature::DangerousKeyword));
        assert_eq!(scan("</style>"), Some(SuspiciousSignature::DangerousKeyword));
        assert_eq!(scan("a\x01b"), Some(SuspiciousSignature::ControlChar));
        assert_eq!(scan("a\x0Bb"), Some(SuspiciousSignature::ControlChar));
        assert_eq!(scan("&#106;avascript"), Some(SuspiciousSignature::DangerousKeyword));
        assert_eq!(scan("color: &#114;ed"), Some(SuspiciousSignature::CharReference));
    }

    #[test]
    fn test_word_boundaries() {
        // 独立单词才命中
        assert_eq!(scan("windows: 3"), None);
        assert_eq!(scan("apparent: yes"), None);
        // data: 后必须紧跟单词字符
        assert_eq!(scan("data: 1"), None);
    }

    #[test]
    fn test_tab_and_newline_are_not_control_hits() {
        assert_eq!(scan("a\tb\nc\rd"), None);
    }
}
