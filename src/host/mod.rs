//! 宿主环境接口：读取被监听源内容、订阅变更通知、写出样式
//! 核心只通过这里的 trait 与 DOM 之类的宿主打交道
pub mod memory;

use csslive_engine::SourceId;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub use self::memory::{MemoryDocument, MemoryElement};

/// 写出目标元素标识
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TargetId(String);

impl TargetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for TargetId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TargetId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// 被监听源类别，注册时解析一次
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceKind {
    /// 表单控件（input / textarea / select），读取其值
    FormField,
    /// 可编辑区域（contenteditable 等普通元素），读取其文本
    EditableRegion,
}

impl SourceKind {
    /// 按标签名判定类别（大小写不敏感）
    pub fn from_tag(tag: &str) -> Self {
        if ["input", "textarea", "select"]
            .iter()
            .any(|t| tag.eq_ignore_ascii_case(t))
        {
            SourceKind::FormField
        } else {
            SourceKind::EditableRegion
        }
    }

    /// 按类别读取当前内容，无内容时返回空串
    pub fn read_content<H>(self, host: &H, source: &SourceId) -> String
    where
        H: ContentSource + ?Sized,
    {
        let content = match self {
            SourceKind::FormField => host.read_value(source),
            SourceKind::EditableRegion => host.read_text(source),
        };
        content.unwrap_or_default()
    }
}

/// 内容源：被监听元素一侧的宿主能力
pub trait ContentSource {
    /// 能力探测：源存在时返回其类别
    fn source_kind(&self, source: &SourceId) -> Option<SourceKind>;

    /// 表单控件的当前值
    fn read_value(&self, source: &SourceId) -> Option<String>;

    /// 普通元素的文本内容
    fn read_text(&self, source: &SourceId) -> Option<String>;

    /// 订阅内容变更通知（notifyOnChange）
    fn subscribe(&mut self, source: &SourceId);

    /// 取消订阅（cancelNotify）
    fn unsubscribe(&mut self, source: &SourceId);
}

/// 样式输出端：目标元素一侧的宿主能力
pub trait StyleSink {
    /// 解析目标选择器；无命中返回空集合（不是错误）
    fn resolve_targets(&self, selector: &str) -> Vec<TargetId>;

    /// 覆盖目标元素的 style 属性（空串同样写入）
    fn write_style_attribute(&mut self, target: &TargetId, value: &str);

    /// 替换（或创建）页面级样式表块
    fn write_stylesheet(&mut self, css_text: &str);
}

/// 完整宿主 = 内容源 + 样式输出端
pub trait Host: ContentSource + StyleSink {}

impl<T: ContentSource + StyleSink + ?Sized> Host for T {}
