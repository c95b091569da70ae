//! 声明式引导：从 HTML 标记中发现 data-cssliveupdate* 声明并批量激活
pub mod scanner;

use csslive_engine::SourceId;

use crate::config::WatchOptions;
use crate::error::CssLiveResult;
use crate::host::{Host, MemoryDocument, MemoryElement};
use crate::watcher::{WatchHandle, WatchRegistry};

pub use self::scanner::{
    DocumentScanner, ScannedElement, WatchMarker, OPTIONS_ATTR, TARGET_ATTR, WATCH_ATTR,
};

/// 一条监听声明
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub source: SourceId,
    pub options: WatchOptions,
}

#[derive(Debug, Default)]
pub struct Bootstrapper;

impl Bootstrapper {
    /// 解析 HTML：构建内存文档并收集监听声明
    pub fn load(html: &str) -> CssLiveResult<(MemoryDocument, Vec<Declaration>)> {
        let elements = DocumentScanner::scan(html)?;
        let declarations = Self::declarations(&elements);

        let mut document = MemoryDocument::new();
        for scanned in elements {
            let element = MemoryElement {
                tag: scanned.tag,
                classes: scanned.classes,
                value: scanned.value,
                text: scanned.text,
                style: None,
            };
            document.insert(scanned.id, element);
        }

        log::info!(
            "Loaded {} element(s), {} watch declaration(s)",
            document.len(),
            declarations.len()
        );
        Ok((document, declarations))
    }

    /// 把扫描结果中的标记转为声明；选项非法的元素跳过
    pub fn declarations(elements: &[ScannedElement]) -> Vec<Declaration> {
        elements
            .iter()
            .filter_map(|element| {
                let marker = element.marker.as_ref()?;
                match Self::marker_options(marker) {
                    Ok(options) => Some(Declaration {
                        source: SourceId::new(element.id.as_str()),
                        options,
                    }),
                    Err(e) => {
                        log::warn!("Declaration on [{}] skipped: {}", element.id, e);
                        None
                    }
                }
            })
            .collect()
    }

    /// 逐条激活，失败的声明记录日志后跳过
    pub fn auto_register<H>(
        registry: &mut WatchRegistry,
        host: &mut H,
        declarations: Vec<Declaration>,
    ) -> Vec<WatchHandle>
    where
        H: Host + ?Sized,
    {
        declarations
            .into_iter()
            .filter_map(|declaration| {
                match registry.activate(host, &declaration.source, declaration.options) {
                    Ok(handle) => Some(handle),
                    Err(e) => {
                        log::warn!("Failed to watch [{}]: {}", declaration.source, e);
                        None
                    }
                }
            })
            .collect()
    }

    /// 选项 JSON 为基础，目标属性优先于 JSON 中的 target
    fn marker_options(marker: &WatchMarker) -> CssLiveResult<WatchOptions> {
        let mut options = match marker.options_json.as_deref().map(str::trim) {
            Some(json) if !json.is_empty() => serde_json::from_str::<WatchOptions>(json)?,
            _ => WatchOptions::default(),
        };
        if let Some(target) = marker.target.as_deref() {
            options.target = Some(target.to_string());
        }
        options.validate()?;
        Ok(options)
    }
}
