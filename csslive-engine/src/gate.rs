//! 变更闸门：决定一次内容变更通知是否需要重新提取并写出
//! 核心职责：
//! 1. 每个被监听源维护一份快照（最近一次看到的原始内容）
//! 2. 内容未变化时拦截通知，避免无意义的样式重写
//! 3. 激活时按 apply_immediately 决定是否立即触发一次写出
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

use crate::utils::{preview_compact, PREVIEW_LEN};

/// 被监听源的不透明标识
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SourceId(String);

impl SourceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for SourceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SourceId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for SourceId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// 快照：原始内容 + 激活序号（用于按激活顺序聚合样式表）
#[derive(Debug, Clone, PartialEq, Eq)]
struct Snapshot {
    raw: String,
    order: u64,
}

/// 变更闸门，快照由闸门独占
#[derive(Debug, Default)]
pub struct ChangeGate {
    snapshots: FxHashMap<SourceId, Snapshot>,
    next_order: u64,
}

impl ChangeGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// 激活监听
    /// - 已激活的源先完整停用，同一源任意时刻至多一份注册
    /// - 无论是否立即应用，都用当前内容初始化快照
    /// 返回：是否需要立即执行一次写出（即 apply_immediately）
    pub fn activate(
        &mut self,
        source: &SourceId,
        current_raw: impl Into<String>,
        apply_immediately: bool,
    ) -> bool {
        if self.deactivate(source) {
            log::debug!("Source [{}] re-activated, previous registration dropped", source);
        }

        let raw = current_raw.into();
        log::debug!(
            "Source [{}] activated (apply_immediately: {}), snapshot: [{}]",
            source,
            apply_immediately,
            preview_compact(&raw, PREVIEW_LEN)
        );

        let order = self.next_order;
        self.next_order += 1;
        self.snapshots.insert(source.clone(), Snapshot { raw, order });

        apply_immediately
    }

    /// 内容可能变化时调用
    /// - 未激活的源：恒为 false
    /// - 与快照一致：false（例如按下了不改变内容的按键）
    /// - 与快照不同：更新快照并返回 true
    pub fn should_propagate(&mut self, source: &SourceId, new_raw: &str) -> bool {
        let Some(snapshot) = self.snapshots.get_mut(source) else {
            log::trace!("Change notification for inactive source [{}] ignored", source);
            return false;
        };

        if snapshot.raw == new_raw {
            log::trace!("Source [{}] content unchanged, skip", source);
            return false;
        }

        snapshot.raw.clear();
        snapshot.raw.push_str(new_raw);
        log::debug!(
            "Source [{}] content changed: [{}]",
            source,
            preview_compact(new_raw, PREVIEW_LEN)
        );
        true
    }

    /// 停用监听并丢弃快照；幂等，返回此前是否处于激活状态
    pub fn deactivate(&mut self, source: &SourceId) -> bool {
        self.snapshots.remove(source).is_some()
    }

    pub fn is_active(&self, source: &SourceId) -> bool {
        self.snapshots.contains_key(source)
    }

    /// 最近一次被接受的原始内容
    pub fn snapshot(&self, source: &SourceId) -> Option<&str> {
        self.snapshots.get(source).map(|s| s.raw.as_str())
    }

    /// 按激活顺序返回所有激活中的源
    pub fn active_sources(&self) -> Vec<&SourceId> {
        let mut entries: Vec<(&SourceId, u64)> = self
            .snapshots
            .iter()
            .map(|(id, snapshot)| (id, snapshot.order))
            .collect();
        entries.sort_by_key(|(_, order)| *order);
        entries.into_iter().map(|(id, _)| id).collect()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_content_not_propagated_twice() {
        let mut gate = ChangeGate::new();
        let id = SourceId::new("editor");
        gate.activate(&id, "", false);

        assert!(gate.should_propagate(&id, "a {color: red}"));
        assert!(!gate.should_propagate(&id, "a {color: red}"));
        assert!(gate.should_propagate(&id, "a {color: blue}"));
        assert_eq!(gate.snapshot(&id), Some("a {color: blue}"));
    }

    #[test]
    fn test_activation_seeds_snapshot() {
        let mut gate = ChangeGate::new();
        let id = SourceId::new("editor");

        assert!(gate.activate(&id, "a {color: red}", true));
        assert!(!gate.should_propagate(&id, "a {color: red}"));

        // 延迟应用：激活本身不触发，未变化的通知同样不触发
        assert!(!gate.activate(&id, "a {color: red}", false));
        assert!(!gate.should_propagate(&id, "a {color: red}"));
        assert!(gate.should_propagate(&id, "a {color: green}"));
    }

    #[test]
    fn test_deactivate_is_idempotent_and_final() {
        let mut gate = ChangeGate::new();
        let id = SourceId::new("editor");
        gate.activate(&id, "x", true);

        assert!(gate.deactivate(&id));
        assert!(!gate.deactivate(&id));
        assert!(!gate.is_active(&id));
        assert!(!gate.should_propagate(&id, "y"));
        assert_eq!(gate.snapshot(&id), None);
    }

    #[test]
    fn test_unknown_source_never_propagates() {
        let mut gate = ChangeGate::new();
        assert!(!gate.should_propagate(&SourceId::new("ghost"), "a {}"));
        assert!(gate.is_empty());
    }

    #[test]
    fn test_reactivation_keeps_single_registration() {
        let mut gate = ChangeGate::new();
        let id = SourceId::new("editor");
        gate.activate(&id, "one", true);
        gate.activate(&id, "two", true);

        assert_eq!(gate.len(), 1);
        assert_eq!(gate.snapshot(&id), Some("two"));
    }

    #[test]
    fn test_sources_are_independent_and_ordered() {
        let mut gate = ChangeGate::new();
        let a = SourceId::new("a");
        let b = SourceId::new("b");
        let c = SourceId::new("c");
        gate.activate(&b, "", true);
        gate.activate(&a, "", true);
        gate.activate(&c, "", true);
        // 重新激活后排到末尾
        gate.activate(&b, "", true);

        assert!(gate.should_propagate(&a, "x"));
        assert!(gate.should_propagate(&c, "x"));
        assert_eq!(gate.snapshot(&b), Some(""));
        assert_eq!(gate.active_sources(), vec![&a, &c, &b]);
    }
}
