//! 视图层模块
//!
//! - doc: 已转换的文档块 → 带样式的行（纯计算，不依赖终端库）

pub mod doc;

pub use doc::{
    clamp_scroll_offset, present, DocLine, DocSpan, DocSpanKind, RenderCache, RenderCacheKey,
};
