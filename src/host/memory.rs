//! 内存文档宿主：用于测试、离线渲染与 HTML 引导加载后的承载
use csslive_engine::SourceId;
use rustc_hash::{FxHashMap, FxHashSet};

use super::{ContentSource, SourceKind, StyleSink, TargetId};

/// 内存中的元素
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryElement {
    pub tag: String,
    pub classes: Vec<String>,
    /// 表单控件的值
    pub value: Option<String>,
    /// 元素文本内容
    pub text: String,
    /// 最近一次写入的 style 属性
    pub style: Option<String>,
}

impl MemoryElement {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    pub fn with_classes<I, S>(mut self, classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.classes = classes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }
}

/// 内存文档：按 id 索引元素，记录写出次数便于观察
#[derive(Debug, Default)]
pub struct MemoryDocument {
    elements: FxHashMap<String, MemoryElement>,
    // 插入顺序，选择器命中结果按文档顺序返回
    order: Vec<String>,
    stylesheet: Option<String>,
    subscriptions: FxHashSet<SourceId>,
    style_writes: usize,
    stylesheet_writes: usize,
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// 插入或替换元素；替换时保留原文档位置
    pub fn insert(&mut self, id: impl Into<String>, element: MemoryElement) {
        let id = id.into();
        if self.elements.insert(id.clone(), element).is_none() {
            self.order.push(id);
        }
    }

    pub fn insert_form_field(
        &mut self,
        id: impl Into<String>,
        tag: impl Into<String>,
        value: impl Into<String>,
    ) {
        self.insert(id, MemoryElement::new(tag).with_value(value));
    }

    pub fn insert_editable(
        &mut self,
        id: impl Into<String>,
        tag: impl Into<String>,
        text: impl Into<String>,
    ) {
        self.insert(id, MemoryElement::new(tag).with_text(text));
    }

    pub fn element(&self, id: &str) -> Option<&MemoryElement> {
        self.elements.get(id)
    }

    /// 模拟用户修改表单值；元素不存在返回 false
    pub fn set_value(&mut self, id: &str, value: impl Into<String>) -> bool {
        match self.elements.get_mut(id) {
            Some(element) => {
                element.value = Some(value.into());
                true
            }
            None => false,
        }
    }

    /// 模拟用户修改可编辑区域文本
    pub fn set_text(&mut self, id: &str, text: impl Into<String>) -> bool {
        match self.elements.get_mut(id) {
            Some(element) => {
                element.text = text.into();
                true
            }
            None => false,
        }
    }

    pub fn style_of(&self, id: &str) -> Option<&str> {
        self.elements.get(id).and_then(|e| e.style.as_deref())
    }

    /// 页面级样式表块内容（从未写出过时为 None）
    pub fn stylesheet(&self) -> Option<&str> {
        self.stylesheet.as_deref()
    }

    pub fn is_subscribed(&self, source: &SourceId) -> bool {
        self.subscriptions.contains(source)
    }

    pub fn style_writes(&self) -> usize {
        self.style_writes
    }

    pub fn stylesheet_writes(&self) -> usize {
        self.stylesheet_writes
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// 单个简单选择器匹配：#id / .class / 标签名
    fn matches(&self, id: &str, element: &MemoryElement, selector: &str) -> bool {
        if let Some(wanted) = selector.strip_prefix('#') {
            id == wanted
        } else if let Some(class) = selector.strip_prefix('.') {
            element.has_class(class)
        } else {
            element.tag.eq_ignore_ascii_case(selector)
        }
    }
}

/// 是否为支持的简单选择器（不含组合符、伪类、属性选择器）
fn is_simple_selector(selector: &str) -> bool {
    let body = selector
        .strip_prefix('#')
        .or_else(|| selector.strip_prefix('.'))
        .unwrap_or(selector);
    !body.is_empty()
        && body
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
}

impl ContentSource for MemoryDocument {
    fn source_kind(&self, source: &SourceId) -> Option<SourceKind> {
        self.elements
            .get(source.as_str())
            .map(|e| SourceKind::from_tag(&e.tag))
    }

    fn read_value(&self, source: &SourceId) -> Option<String> {
        self.elements.get(source.as_str())?.value.clone()
    }

    fn read_text(&self, source: &SourceId) -> Option<String> {
        self.elements.get(source.as_str()).map(|e| e.text.clone())
    }

    fn subscribe(&mut self, source: &SourceId) {
        self.subscriptions.insert(source.clone());
    }

    fn unsubscribe(&mut self, source: &SourceId) {
        self.subscriptions.remove(source);
    }
}

impl StyleSink for MemoryDocument {
    fn resolve_targets(&self, selector: &str) -> Vec<TargetId> {
        let mut targets: Vec<TargetId> = Vec::new();

        for part in selector.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            if !is_simple_selector(part) {
                log::debug!("Unsupported selector [{}] matches nothing", part);
                continue;
            }
            for id in &self.order {
                let Some(element) = self.elements.get(id) else {
                    continue;
                };
                if self.matches(id, element, part) {
                    let target = TargetId::new(id.as_str());
                    if !targets.contains(&target) {
                        targets.push(target);
                    }
                }
            }
        }
        targets
    }

    fn write_style_attribute(&mut self, target: &TargetId, value: &str) {
        if let Some(element) = self.elements.get_mut(target.as_str()) {
            element.style = Some(value.to_string());
            self.style_writes += 1;
        }
    }

    fn write_stylesheet(&mut self, css_text: &str) {
        self.stylesheet = Some(css_text.to_string());
        self.stylesheet_writes += 1;
    }
}
