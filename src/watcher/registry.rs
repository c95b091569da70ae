//! 监听注册表：组合变更闸门、规则提取器与宿主，负责激活 / 变更通知 / 停用
use csslive_engine::utils::{preview_compact, PREVIEW_LEN};
use csslive_engine::{ChangeGate, RuleExtractor, SourceId};
use rustc_hash::FxHashMap;

use crate::config::{PropagationTarget, WatchOptions};
use crate::error::{CssLiveError, CssLiveResult};
use crate::host::{Host, SourceKind};

/// 激活凭证：generation 每次激活递增，用于识别过期句柄
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WatchHandle {
    source: SourceId,
    generation: u64,
}

impl WatchHandle {
    pub fn source(&self) -> &SourceId {
        &self.source
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Clone)]
struct Registration {
    kind: SourceKind,
    options: WatchOptions,
    generation: u64,
    // 是否已应用过（立即应用或首次被接受的变更），未应用的源不参与样式表聚合
    applied: bool,
}

/// 注册表由组合根持有并注入，不使用全局状态
#[derive(Debug, Default)]
pub struct WatchRegistry {
    gate: ChangeGate,
    extractor: RuleExtractor,
    registrations: FxHashMap<SourceId, Registration>,
    next_generation: u64,
}

impl WatchRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 激活监听
    /// 1. 校验选项
    /// 2. 已注册的源先完整停用
    /// 3. 解析源类别并订阅变更通知
    /// 4. 以当前内容初始化快照，apply_immediately 时立即写出一次
    pub fn activate<H>(
        &mut self,
        host: &mut H,
        source: &SourceId,
        options: WatchOptions,
    ) -> CssLiveResult<WatchHandle>
    where
        H: Host + ?Sized,
    {
        options.validate()?;

        let kind = host
            .source_kind(source)
            .ok_or_else(|| CssLiveError::SourceNotFound(source.to_string()))?;

        if self.deactivate(host, source) {
            log::debug!("Source [{}] was active, previous registration replaced", source);
        }

        host.subscribe(source);
        let raw = kind.read_content(host, source);
        let apply_now = self.gate.activate(source, raw, options.apply_immediately);

        self.next_generation += 1;
        let generation = self.next_generation;
        log::info!(
            "Watching [{}] as {:?} → {:?} (generation {})",
            source,
            kind,
            options.propagation_target(),
            generation
        );
        self.registrations.insert(
            source.clone(),
            Registration {
                kind,
                options,
                generation,
                applied: apply_now,
            },
        );

        if apply_now {
            self.propagate(host, source);
        }

        Ok(WatchHandle {
            source: source.clone(),
            generation,
        })
    }

    /// 宿主内容变更通知入口；返回本次是否触发了写出
    pub fn notify_change<H>(&mut self, host: &mut H, source: &SourceId) -> bool
    where
        H: Host + ?Sized,
    {
        let Some(registration) = self.registrations.get(source) else {
            log::trace!("Change notification for unwatched source [{}] ignored", source);
            return false;
        };

        let raw = registration.kind.read_content(host, source);
        if !self.gate.should_propagate(source, &raw) {
            return false;
        }

        if let Some(registration) = self.registrations.get_mut(source) {
            registration.applied = true;
        }
        self.propagate(host, source);
        true
    }

    /// 停用监听；幂等，返回此前是否处于激活状态
    /// 样式表模式的源被移除后重新聚合写出样式表
    pub fn deactivate<H>(&mut self, host: &mut H, source: &SourceId) -> bool
    where
        H: Host + ?Sized,
    {
        let Some(registration) = self.registrations.remove(source) else {
            return false;
        };

        self.gate.deactivate(source);
        host.unsubscribe(source);
        log::info!("Stopped watching [{}]", source);

        if registration.options.target.is_none() {
            self.write_stylesheet(host);
        }
        true
    }

    /// 仅当句柄仍指向当前注册时停用
    pub fn deactivate_handle<H>(&mut self, host: &mut H, handle: &WatchHandle) -> bool
    where
        H: Host + ?Sized,
    {
        if !self.is_current(handle) {
            log::debug!(
                "Stale handle for [{}] (generation {}) ignored",
                handle.source,
                handle.generation
            );
            return false;
        }
        self.deactivate(host, &handle.source)
    }

    /// 停用全部源，返回停用数量
    pub fn deactivate_all<H>(&mut self, host: &mut H) -> usize
    where
        H: Host + ?Sized,
    {
        let sources: Vec<SourceId> = self.registrations.keys().cloned().collect();
        sources
            .iter()
            .filter(|source| self.deactivate(host, source))
            .count()
    }

    pub fn is_current(&self, handle: &WatchHandle) -> bool {
        self.registrations
            .get(&handle.source)
            .is_some_and(|r| r.generation == handle.generation)
    }

    pub fn is_active(&self, source: &SourceId) -> bool {
        self.registrations.contains_key(source)
    }

    pub fn options(&self, source: &SourceId) -> Option<&WatchOptions> {
        self.registrations.get(source).map(|r| &r.options)
    }

    /// 按激活顺序返回激活中的源
    pub fn active_sources(&self) -> Vec<&SourceId> {
        self.gate.active_sources()
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// 聚合所有已应用的样式表模式源的净化结果（按激活顺序，换行拼接）
    pub fn stylesheet_text(&self) -> String {
        self.gate
            .active_sources()
            .into_iter()
            .filter_map(|source| {
                let registration = self.registrations.get(source)?;
                if registration.options.target.is_some() || !registration.applied {
                    return None;
                }
                let raw = self.gate.snapshot(source)?;
                let outcome = self
                    .extractor
                    .sanitize_stylesheet(raw, &registration.options.policy);
                Some(outcome.into_payload())
            })
            .filter(|css| !css.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// 以快照内容写出
    fn propagate<H>(&self, host: &mut H, source: &SourceId)
    where
        H: Host + ?Sized,
    {
        let Some(registration) = self.registrations.get(source) else {
            return;
        };

        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("propagate", source = %source).entered();

        match registration.options.propagation_target() {
            PropagationTarget::StyleAttribute(selector) => {
                let raw = self.gate.snapshot(source).unwrap_or_default();
                let outcome = self.extractor.extract(raw, &registration.options.policy);
                let targets = host.resolve_targets(&selector);
                if targets.is_empty() {
                    log::debug!("Selector [{}] matched no target, nothing written", selector);
                    return;
                }
                log::debug!(
                    "Writing [{}] to {} target(s) of [{}]",
                    preview_compact(outcome.payload(), PREVIEW_LEN),
                    targets.len(),
                    selector
                );
                for target in &targets {
                    host.write_style_attribute(target, outcome.payload());
                }
            }
            PropagationTarget::Stylesheet => self.write_stylesheet(host),
        }
    }

    fn write_stylesheet<H>(&self, host: &mut H)
    where
        H: Host + ?Sized,
    {
        let css = self.stylesheet_text();
        log::debug!("Writing page stylesheet: [{}]", preview_compact(&css, PREVIEW_LEN));
        host.write_stylesheet(&css);
    }
}
