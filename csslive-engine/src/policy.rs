//! 提取策略：控制规则提取器的安全检查与输出格式

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// 默认规则分隔符
pub const DEFAULT_RULE_SEPARATOR: &str = "; ";

/// 分隔符中禁止出现的字符
/// 分隔符夹在两条声明之间，任何一个都可能与相邻字符拼出花括号或注释定界符
const FORBIDDEN_SEPARATOR_CHARS: &[char] = &['{', '}', '/', '*', '<', '>', '!', '-'];

/// 规则提取策略
/// - enforce_safety_check: 是否执行可疑模式扫描（默认开启）
/// - rule_separator: 拼接多条声明时使用的分隔符（默认 "; "）
/// - strip_html_comments: 是否移除 `<!-- ... -->` 注释内容（默认开启）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExtractionPolicy {
    pub enforce_safety_check: bool,
    pub rule_separator: String,
    pub strip_html_comments: bool,
}

impl Default for ExtractionPolicy {
    fn default() -> Self {
        Self {
            enforce_safety_check: true,
            rule_separator: DEFAULT_RULE_SEPARATOR.to_string(),
            strip_html_comments: true,
        }
    }
}

impl ExtractionPolicy {
    /// 关闭安全检查的策略（仅用于可信输入）
    pub fn unchecked() -> Self {
        Self {
            enforce_safety_check: false,
            ..Self::default()
        }
    }

    /// 替换分隔符（链式调用）
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.rule_separator = separator.into();
        self
    }

    /// 从 camelCase JSON 解析策略，缺省字段取默认值，解析后立即校验
    pub fn from_json(json: &str) -> CoreResult<Self> {
        let policy: Self = serde_json::from_str(json)?;
        policy.validate()?;
        Ok(policy)
    }

    /// 校验策略合法性
    pub fn validate(&self) -> CoreResult<()> {
        let sep = self.rule_separator.as_str();

        if sep.is_empty() {
            return Err(CoreError::InvalidPolicy(
                "rule separator must not be empty".to_string(),
            ));
        }

        if let Some(c) = sep.chars().find(|c| FORBIDDEN_SEPARATOR_CHARS.contains(c)) {
            return Err(CoreError::InvalidPolicy(format!(
                "rule separator {:?} contains forbidden character {:?}",
                sep, c
            )));
        }

        if sep.chars().any(|c| c.is_control()) {
            return Err(CoreError::InvalidPolicy(format!(
                "rule separator {:?} contains a control character",
                sep
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let policy = ExtractionPolicy::default();
        assert!(policy.enforce_safety_check);
        assert!(policy.strip_html_comments);
        assert_eq!(policy.rule_separator, "; ");
        assert!(policy.validate().is_ok());
    }

    #[test]
    fn test_from_json_partial() {
        let policy = ExtractionPolicy::from_json(r#"{"ruleSeparator": " | "}"#).unwrap();
        assert_eq!(policy.rule_separator, " | ");
        assert!(policy.enforce_safety_check);

        let policy = ExtractionPolicy::from_json(r#"{"enforceSafetyCheck": false}"#).unwrap();
        assert!(!policy.enforce_safety_check);
        assert_eq!(policy.rule_separator, DEFAULT_RULE_SEPARATOR);
    }

    #[test]
    fn test_rejects_forbidden_separator() {
        for sep in ["", "}", "{ ", " / ", "*", " > ", "!", " - ", "\n"] {
            let policy = ExtractionPolicy::default().with_separator(sep);
            assert!(
                matches!(policy.validate(), Err(CoreError::InvalidPolicy(_))),
                "separator {:?} should be rejected",
                sep
            );
        }
    }

    #[test]
    fn test_accepts_plain_separators() {
        for sep in ["; ", " ", ", ", " | ", ";"] {
            assert!(ExtractionPolicy::default().with_separator(sep).validate().is_ok());
        }
    }

    #[test]
    fn test_from_json_validates() {
        let err = ExtractionPolicy::from_json(r#"{"ruleSeparator": "*/"}"#).unwrap_err();
        assert!(matches!(err, CoreError::InvalidPolicy(_)));
    }

    #[test]
    fn test_from_json_malformed() {
        let err = ExtractionPolicy::from_json("{ruleSeparator").unwrap_err();
        assert!(matches!(err, CoreError::PolicyParseError(_)));
    }
}
