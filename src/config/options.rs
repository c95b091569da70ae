//! 监听选项：每个被监听源一份，激活时校验

use csslive_engine::ExtractionPolicy;
use serde::{Deserialize, Serialize};

use crate::error::{CssLiveError, CssLiveResult};

/// 写出目标
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropagationTarget {
    /// 页面级样式表（所有样式表模式的源聚合写入同一块）
    Stylesheet,
    /// 选择器命中的元素的 style 属性
    StyleAttribute(String),
}

/// 监听选项
/// - apply_immediately: 激活时立即应用一次（兼容 applyUponActivation / applyNow 写法）
/// - target: 目标选择器；缺省为样式表模式
/// - policy: 提取策略（JSON 中与本结构体字段平铺）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WatchOptions {
    #[serde(alias = "applyUponActivation", alias = "applyNow")]
    pub apply_immediately: bool,
    pub target: Option<String>,
    #[serde(flatten)]
    pub policy: ExtractionPolicy,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            apply_immediately: true,
            target: None,
            policy: ExtractionPolicy::default(),
        }
    }
}

impl WatchOptions {
    /// 样式表模式（默认）
    pub fn stylesheet() -> Self {
        Self::default()
    }

    /// style 属性模式
    pub fn style_attribute(selector: impl Into<String>) -> Self {
        Self {
            target: Some(selector.into()),
            ..Self::default()
        }
    }

    /// 从 camelCase JSON 解析，缺省字段取默认值，解析后立即校验
    pub fn from_json(json: &str) -> CssLiveResult<Self> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    pub fn propagation_target(&self) -> PropagationTarget {
        match &self.target {
            Some(selector) => PropagationTarget::StyleAttribute(selector.clone()),
            None => PropagationTarget::Stylesheet,
        }
    }

    /// 校验：提取策略合法 + 目标选择器非空白
    pub fn validate(&self) -> CssLiveResult<()> {
        self.policy.validate()?;

        if let Some(selector) = &self.target {
            if selector.trim().is_empty() {
                return Err(CssLiveError::InvalidOptions(
                    "target selector must not be blank".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// 自定义构建器（链式 API）
#[derive(Debug, Clone, Default)]
pub struct WatchOptionsBuilder {
    options: WatchOptions,
}

impl WatchOptionsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply_immediately(mut self, apply: bool) -> Self {
        self.options.apply_immediately = apply;
        self
    }

    pub fn target(mut self, selector: impl Into<String>) -> Self {
        self.options.target = Some(selector.into());
        self
    }

    pub fn stylesheet(mut self) -> Self {
        self.options.target = None;
        self
    }

    pub fn policy(mut self, policy: ExtractionPolicy) -> Self {
        self.options.policy = policy;
        self
    }

    pub fn rule_separator(mut self, separator: impl Into<String>) -> Self {
        self.options.policy.rule_separator = separator.into();
        self
    }

    pub fn enforce_safety_check(mut self, enforce: bool) -> Self {
        self.options.policy.enforce_safety_check = enforce;
        self
    }

    pub fn strip_html_comments(mut self, strip: bool) -> Self {
        self.options.policy.strip_html_comments = strip;
        self
    }

    /// 构建并校验
    pub fn build(self) -> CssLiveResult<WatchOptions> {
        self.options.validate()?;
        Ok(self.options)
    }
}
