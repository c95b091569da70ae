//! 提取结果：干净输出 或 可疑拒绝
use serde::Serialize;
use std::fmt::{Display, Formatter};

use crate::extractor::suspicious::SuspiciousSignature;

/// 检测到可疑内容时替换输出的固定载荷
pub const SUSPICIOUS_PAYLOAD: &str = "/* Suspicious activity detected */";

/// 单行、分隔符拼接的 CSS 声明串
/// 不含花括号、选择器、注释定界符；空串是合法值，表示“无规则”
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct CleanRuleSet(String);

/// 页面级样式表文本：保留选择器与换行，但不含注释
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct CleanStylesheet(String);

macro_rules! impl_text_newtype {
    ($name:ident) => {
        impl $name {
            pub(crate) fn new(text: String) -> Self {
                Self(text)
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }

            pub fn into_string(self) -> String {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

impl_text_newtype!(CleanRuleSet);
impl_text_newtype!(CleanStylesheet);

/// 可疑拒绝：真实内容被整体丢弃，绝不部分应用
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SuspiciousRejection {
    signature: SuspiciousSignature,
}

impl SuspiciousRejection {
    pub(crate) fn new(signature: SuspiciousSignature) -> Self {
        Self { signature }
    }

    /// 命中的特征类别（诊断用）
    pub fn signature(&self) -> SuspiciousSignature {
        self.signature
    }

    pub fn payload(&self) -> &'static str {
        SUSPICIOUS_PAYLOAD
    }
}

/// 净化结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Sanitized<T> {
    Clean(T),
    Suspicious(SuspiciousRejection),
}

/// 行内样式提取结果
pub type ExtractOutcome = Sanitized<CleanRuleSet>;
/// 样式表净化结果
pub type StylesheetOutcome = Sanitized<CleanStylesheet>;

impl<T: AsRef<str>> Sanitized<T> {
    /// 交给输出端的文本：干净内容本身，或固定警告载荷
    pub fn payload(&self) -> &str {
        match self {
            Sanitized::Clean(text) => text.as_ref(),
            Sanitized::Suspicious(rejection) => rejection.payload(),
        }
    }

    pub fn is_suspicious(&self) -> bool {
        matches!(self, Sanitized::Suspicious(_))
    }

    pub fn clean(&self) -> Option<&T> {
        match self {
            Sanitized::Clean(text) => Some(text),
            Sanitized::Suspicious(_) => None,
        }
    }

    pub fn rejection(&self) -> Option<&SuspiciousRejection> {
        match self {
            Sanitized::Clean(_) => None,
            Sanitized::Suspicious(rejection) => Some(rejection),
        }
    }
}

impl<T: Into<String>> Sanitized<T> {
    pub fn into_payload(self) -> String {
        match self {
            Sanitized::Clean(text) => text.into(),
            Sanitized::Suspicious(rejection) => rejection.payload().to_string(),
        }
    }
}
