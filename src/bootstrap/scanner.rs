//! 标记扫描器：流式解析 HTML，收集带 id 或 data-cssliveupdate* 标记的元素
use lol_html::html_content::EndTag;
use lol_html::{doc_text, element, EndTagHandler, HandlerResult, HtmlRewriter, Settings};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::cell::RefCell;
use std::rc::Rc;

use crate::error::{CssLiveError, CssLiveResult};

/// 样式表模式标记
pub const WATCH_ATTR: &str = "data-cssliveupdate";
/// style 属性模式标记，值为目标选择器
pub const TARGET_ATTR: &str = "data-cssliveupdate-target";
/// 逐元素监听选项（JSON）
pub const OPTIONS_ATTR: &str = "data-cssliveupdate-options";
/// 无 id 的声明元素使用的合成 id 前缀
pub const SYNTHETIC_ID_PREFIX: &str = "cssliveupdate-";

// 原始文本元素：内容中的实体按字面保留
const RAW_TEXT_TAGS: &[&str] = &["style", "script", "xmp", "iframe", "noembed", "noframes"];

// 只解码具名实体；数字字符引用保留原样，交给可疑扫描处理
static NAMED_ENTITY_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&(lt|gt|amp|quot|apos);").unwrap()
});

/// 元素上的监听声明
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchMarker {
    pub target: Option<String>,
    pub options_json: Option<String>,
}

/// 扫描到的元素
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScannedElement {
    pub id: String,
    pub tag: String,
    pub classes: Vec<String>,
    pub value: Option<String>,
    pub text: String,
    pub marker: Option<WatchMarker>,
}

#[derive(Debug, Default)]
struct ScanState {
    elements: Vec<ScannedElement>,
    // 尚未闭合、需要累积文本的元素下标
    open: Vec<usize>,
    synthetic: usize,
}

#[derive(Debug, Default)]
pub struct DocumentScanner;

impl DocumentScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// 扫描 HTML，按文档顺序返回元素
    pub fn scan(html: &str) -> CssLiveResult<Vec<ScannedElement>> {
        let state = Rc::new(RefCell::new(ScanState::default()));
        let element_state = Rc::clone(&state);
        let text_state = Rc::clone(&state);

        let settings = Settings {
            strict: false,
            element_content_handlers: vec![element!("*", move |el| {
                let marker = if el.has_attribute(WATCH_ATTR) || el.has_attribute(TARGET_ATTR) {
                    Some(WatchMarker {
                        target: el.get_attribute(TARGET_ATTR),
                        options_json: el.get_attribute(OPTIONS_ATTR),
                    })
                } else {
                    None
                };
                let id = el.get_attribute("id").filter(|id| !id.trim().is_empty());
                if id.is_none() && marker.is_none() {
                    return Ok(());
                }

                let index = {
                    let mut st = element_state.borrow_mut();
                    let id = id.unwrap_or_else(|| {
                        st.synthetic += 1;
                        format!("{}{}", SYNTHETIC_ID_PREFIX, st.synthetic)
                    });
                    st.elements.push(ScannedElement {
                        id,
                        tag: el.tag_name().to_ascii_lowercase(),
                        classes: el
                            .get_attribute("class")
                            .map(|c| c.split_whitespace().map(str::to_string).collect())
                            .unwrap_or_default(),
                        value: el.get_attribute("value").map(|v| decode_named_entities(&v)),
                        text: String::new(),
                        marker,
                    });
                    st.elements.len() - 1
                };

                // 空元素没有结束标签，也不会有文本
                if let Some(handlers) = el.end_tag_handlers() {
                    element_state.borrow_mut().open.push(index);
                    let end_state = Rc::clone(&element_state);
                    let on_end: EndTagHandler<'static> =
                        Box::new(move |_end: &mut EndTag<'_>| -> HandlerResult {
                            end_state.borrow_mut().open.retain(|i| *i != index);
                            Ok(())
                        });
                    handlers.push(on_end);
                }
                Ok(())
            })],
            document_content_handlers: vec![doc_text!(move |chunk| {
                let text = chunk.as_str();
                if text.is_empty() {
                    return Ok(());
                }
                let mut st = text_state.borrow_mut();
                let ScanState { elements, open, .. } = &mut *st;
                for &index in open.iter() {
                    elements[index].text.push_str(text);
                }
                Ok(())
            })],
            ..Settings::default()
        };

        let mut rewriter = HtmlRewriter::new(settings, |_: &[u8]| {});
        rewriter
            .write(html.as_bytes())
            .map_err(|e| CssLiveError::HtmlRewriteError(e.to_string()))?;
        rewriter
            .end()
            .map_err(|e| CssLiveError::HtmlRewriteError(e.to_string()))?;

        let mut elements = std::mem::take(&mut state.borrow_mut().elements);
        for element in &mut elements {
            if !RAW_TEXT_TAGS.contains(&element.tag.as_str()) {
                element.text = decode_named_entities(&element.text);
            }
            if element.tag == "textarea" {
                element.value = Some(element.text.clone());
            }
        }
        log::debug!("Scanned {} element(s) from markup", elements.len());
        Ok(elements)
    }
}

/// 解码 &lt; &gt; &amp; &quot; &apos;
pub fn decode_named_entities(text: &str) -> String {
    NAMED_ENTITY_REGEX
        .replace_all(text, |caps: &Captures| match &caps[1] {
            "lt" => "<",
            "gt" => ">",
            "amp" => "&",
            "quot" => "\"",
            _ => "'",
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_named_entities() {
        assert_eq!(decode_named_entities("a &gt; b &amp;&amp; c"), "a > b && c");
        assert_eq!(decode_named_entities("&quot;x&apos;"), "\"x'");
        // 数字引用保持原样
        assert_eq!(decode_named_entities("&#60;&lt;"), "&#60;<");
        assert_eq!(decode_named_entities("&amp;lt;"), "&lt;");
    }

    #[test]
    fn test_scan_collects_declared_and_identified_elements() {
        let html = r##"
            <html><body>
              <textarea id="editor" data-cssliveupdate-target="#demo">a {color: red}</textarea>
              <div id="demo" class="preview  box">Demo</div>
              <p>ignored</p>
              <pre data-cssliveupdate>p &gt; a { top: 0 }</pre>
              <input id="field" value="b {top: 1px}" data-cssliveupdate-target=".preview"
                     data-cssliveupdate-options='{"applyNow": false}'>
            </body></html>
        "##;
        let elements = DocumentScanner::scan(html).unwrap();
        let ids: Vec<&str> = elements.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["editor", "demo", "cssliveupdate-1", "field"]);

        let editor = &elements[0];
        assert_eq!(editor.tag, "textarea");
        assert_eq!(editor.value.as_deref(), Some("a {color: red}"));
        assert_eq!(
            editor.marker,
            Some(WatchMarker {
                target: Some("#demo".to_string()),
                options_json: None
            })
        );

        let demo = &elements[1];
        assert_eq!(demo.classes, vec!["preview", "box"]);
        assert_eq!(demo.text, "Demo");
        assert!(demo.marker.is_none());

        let pre = &elements[2];
        assert_eq!(pre.tag, "pre");
        assert_eq!(pre.text, "p > a { top: 0 }");
        assert_eq!(pre.marker.as_ref().and_then(|m| m.target.clone()), None);

        let field = &elements[3];
        assert_eq!(field.value.as_deref(), Some("b {top: 1px}"));
        assert_eq!(
            field.marker.as_ref().and_then(|m| m.options_json.as_deref()),
            Some(r#"{"applyNow": false}"#)
        );
    }

    #[test]
    fn test_nested_text_accumulates() {
        let html = r#"<div id="outer">a {<span id="inner">color: red</span>}</div>"#;
        let elements = DocumentScanner::scan(html).unwrap();
        assert_eq!(elements[0].text, "a {color: red}");
        assert_eq!(elements[1].text, "color: red");
    }

    #[test]
    fn test_raw_text_elements_not_decoded() {
        let html = r#"<style id="sheet">p &gt; a { top: 0 }</style><pre id="code">p &gt; a</pre>"#;
        let elements = DocumentScanner::scan(html).unwrap();
        assert_eq!(elements[0].text, "p &gt; a { top: 0 }");
        assert_eq!(elements[1].text, "p > a");
    }

    #[test]
    fn test_numeric_reference_kept_raw() {
        let html = r#"<pre id="src" data-cssliveupdate>a{b:&#106;avascript}</pre>"#;
        let elements = DocumentScanner::scan(html).unwrap();
        assert_eq!(elements[0].text, "a{b:&#106;avascript}");
    }
}
