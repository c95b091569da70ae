//! csslive-engine 内核错误定义
//! 内核层只有配置类错误：提取与变更判定本身是不会失败的纯函数
use thiserror::Error;

use serde_json::Error as SerdeJsonError;

/// 内核核心错误枚举
#[derive(Error, Debug)]
pub enum CoreError {
    // ===================== 策略相关错误 =====================
    /// 提取策略非法（分隔符中含有花括号、注释定界符或控制字符）
    #[error("Invalid extraction policy: {0}")]
    InvalidPolicy(String),

    /// 提取策略 JSON 解析失败
    #[error("Extraction policy parse failed: {0}")]
    PolicyParseError(#[from] SerdeJsonError),
}

/// 内核层全局Result类型别名
pub type CoreResult<T> = Result<T, CoreError>;
