//! 日志接入
//! 库内部统一使用 log 门面；启用 `tracing` 特性后可将 log 记录桥接到 tracing 订阅者

/// 将 log 记录转发到 tracing（进程内只需调用一次，重复调用返回错误）
#[cfg(feature = "tracing")]
pub fn init_tracing_bridge() -> crate::error::CssLiveResult<()> {
    tracing_log::LogTracer::init()
        .map_err(|e| crate::error::CssLiveError::LoggerInit(e.to_string()))
}

/// 测试日志初始化，多次调用安全
#[cfg(test)]
pub(crate) fn init_test_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}
