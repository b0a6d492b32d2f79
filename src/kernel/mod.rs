//! Headless document core: transformation, rendering and view/edit state.

pub mod diagram;
pub mod editor;
pub mod effect;
pub mod markdown;
pub mod nav;
pub mod services;
pub mod syntax;
pub mod viewer;

pub use diagram::{DiagramCache, DiagramJob, DiagramKey, DiagramRender, DiagramSlot};
pub use editor::{DocumentEditor, EditorMode, EditorPhase, EditorStatus, LeaveDecision};
pub use effect::{Effect, RequestId};
pub use markdown::{transform, RenderedBlock};
pub use nav::{NavActivation, NavRow, NavState};
pub use viewer::{DocumentState, DocumentViewer};
