//! 终端集成层（crossterm）
//!
//! 与 `kernel`/`models` 分离：核心逻辑不依赖任何终端库。

pub mod session;

#[cfg(unix)]
pub use session::watch_termination;
pub use session::{
    CrosstermSession, SessionBackend, SessionRestorer, SessionStep, TerminalSession,
    TerminationSignal,
};
