//! 配置模块：监听选项与构建器
pub mod options;

pub use self::options::{PropagationTarget, WatchOptions, WatchOptionsBuilder};
