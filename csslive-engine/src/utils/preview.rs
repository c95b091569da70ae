//! 日志预览：用户输入可能很长、跨多行，日志里只展示压缩后的前若干字符
use std::fmt::{self, Write};

/// 日志中内容预览的默认最大字符数
pub const PREVIEW_LEN: usize = 60;

/// 惰性格式化的内容预览，只在日志真正输出时才遍历原文
#[derive(Debug, Clone, Copy)]
pub struct CompactPreview<'a> {
    source: &'a str,
    limit: usize,
}

impl fmt::Display for CompactPreview<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut written = 0;
        let mut pending_space = false;

        for ch in self.source.trim_start().chars() {
            if ch.is_whitespace() {
                pending_space = true;
                continue;
            }
            // 空白折叠后的字符（含待写出的空格）都计入长度
            let width = if pending_space { 2 } else { 1 };
            if written + width > self.limit {
                return f.write_char('…');
            }
            if pending_space {
                f.write_char(' ')?;
                pending_space = false;
            }
            f.write_char(if ch.is_control() { '?' } else { ch })?;
            written += width;
        }
        Ok(())
    }
}

/// 空白折叠 + 控制字符替换 + 超长截断（追加 `…`），首尾空白不输出
pub fn preview_compact(s: &str, max_len: usize) -> CompactPreview<'_> {
    CompactPreview {
        source: s,
        limit: max_len,
    }
}
