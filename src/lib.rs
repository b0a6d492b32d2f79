//! zdoc - Markdown 文档工作台库
//!
//! 模块结构：
//! - core: 文本宽度与窗口计算
//! - models: 数据模型（DocPath, NavTree, DraftBuffer）
//! - kernel: 核心逻辑（markdown 转换、语法高亮、图表渲染、Viewer/Editor 状态机、存储端口与适配器）
//! - views: 视图层（RenderedBlock → 带样式的行）
//! - app / tui: 终端前端（`tui` feature）

pub mod core;
pub mod kernel;
pub mod models;
pub mod views;

#[cfg(feature = "tui")]
pub mod app;
#[cfg(feature = "tui")]
pub mod tui;
