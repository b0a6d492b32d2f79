//! 核心工具模块
//!
//! - text_window: 按终端列宽截断、窗口化与折行

pub mod text_window;
