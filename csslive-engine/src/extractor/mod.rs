//! 规则提取模块：归一化 + 可疑扫描 + 规则块提取
pub mod normalizer;
pub mod rule_extractor;
pub mod suspicious;

pub use self::normalizer::TextNormalizer;
pub use self::rule_extractor::RuleExtractor;
pub use self::suspicious::{SuspiciousScanner, SuspiciousSignature};
