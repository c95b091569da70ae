//! 监听注册与变更传播
pub mod registry;

pub use self::registry::{WatchHandle, WatchRegistry};
