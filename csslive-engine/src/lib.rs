// 内核错误定义
pub mod error;
// 提取策略
pub mod policy;
// 规则提取 + 可疑扫描
pub mod extractor;
// 提取结果类型
pub mod outcome;
// 变更闸门
pub mod gate;
// 日志预览等工具
pub mod utils;

// 顶层导出常用类型
pub use error::{CoreError, CoreResult};
pub use extractor::{RuleExtractor, SuspiciousScanner, SuspiciousSignature, TextNormalizer};
pub use gate::{ChangeGate, SourceId};
pub use outcome::{
    CleanRuleSet, CleanStylesheet, ExtractOutcome, Sanitized, StylesheetOutcome,
    SuspiciousRejection, SUSPICIOUS_PAYLOAD,
};
pub use policy::{ExtractionPolicy, DEFAULT_RULE_SEPARATOR};
