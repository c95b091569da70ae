//! 内核通用工具
pub mod preview;

pub use self::preview::{preview_compact, CompactPreview, PREVIEW_LEN};
