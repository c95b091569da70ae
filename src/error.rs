//! 全局错误类型定义
//! 提取与变更判定不会失败，这里只覆盖配置、宿主查找与标记流式解析错误
use thiserror::Error;
use csslive_engine::CoreError;
use serde_json::Error as SerdeJsonError;

#[derive(Error, Debug)]
pub enum CssLiveError {
    // 内核错误（提取策略非法等）
    #[error("内核错误：{0}")]
    Core(#[from] CoreError),

    // 配置相关错误
    #[error("JSON解析失败：{0}")]
    JsonError(#[from] SerdeJsonError),
    #[error("监听选项无效：{0}")]
    InvalidOptions(String),

    // 宿主相关错误
    #[error("未找到被监听元素：{0}")]
    SourceNotFound(String),

    // 标记解析错误
    #[error("HTML流式解析失败：{0}")]
    HtmlRewriteError(String),

    // 日志桥接初始化失败
    #[error("日志初始化失败：{0}")]
    LoggerInit(String),
}

// 全局Result类型
pub type CssLiveResult<T> = Result<T, CssLiveError>;
