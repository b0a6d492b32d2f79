//! Terminal session for the viewer.
//!
//! Raw mode, the alternate screen and the bar cursor are entered one step at
//! a time and left in reverse order exactly once, whether from `Drop`, the
//! panic hook or the signal thread.

use std::io;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStep {
    RawMode,
    AlternateScreen,
    BarCursor,
}

impl SessionStep {
    /// Entry order; leaving runs it backwards.
    pub const ALL: [SessionStep; 3] = [
        SessionStep::RawMode,
        SessionStep::AlternateScreen,
        SessionStep::BarCursor,
    ];
}

pub trait SessionBackend: Send + Sync + 'static {
    fn enter(&self, step: SessionStep) -> io::Result<()>;
    fn leave(&self, step: SessionStep) -> io::Result<()>;
}

#[derive(Debug, Default)]
pub struct CrosstermSession;

impl SessionBackend for CrosstermSession {
    fn enter(&self, step: SessionStep) -> io::Result<()> {
        use crossterm::{cursor, execute, terminal};

        match step {
            SessionStep::RawMode => terminal::enable_raw_mode(),
            SessionStep::AlternateScreen => execute!(io::stdout(), terminal::EnterAlternateScreen),
            SessionStep::BarCursor => execute!(io::stdout(), cursor::SetCursorStyle::BlinkingBar),
        }
    }

    fn leave(&self, step: SessionStep) -> io::Result<()> {
        use crossterm::{cursor, execute, terminal};

        match step {
            SessionStep::RawMode => terminal::disable_raw_mode(),
            SessionStep::AlternateScreen => {
                execute!(io::stdout(), terminal::LeaveAlternateScreen, cursor::Show)
            }
            SessionStep::BarCursor => {
                execute!(io::stdout(), cursor::SetCursorStyle::DefaultUserShape)
            }
        }
    }
}

/// Steps currently in effect, shared by every handle on the session.
struct Entered {
    steps: Mutex<Vec<SessionStep>>,
    backend: Arc<dyn SessionBackend>,
}

impl Entered {
    fn take(&self) -> Vec<SessionStep> {
        let mut steps = self.steps.lock().unwrap_or_else(|e| e.into_inner());
        std::mem::take(&mut *steps)
    }

    /// Leaves every entered step; all run, the first error is returned.
    fn leave_all(&self) -> io::Result<()> {
        leave_steps(self.backend.as_ref(), &self.take())
    }
}

fn leave_steps(backend: &dyn SessionBackend, steps: &[SessionStep]) -> io::Result<()> {
    let mut first_err = None;
    for &step in steps.iter().rev() {
        if let Err(err) = backend.leave(step) {
            tracing::warn!(?step, error = %err, "terminal step not undone");
            first_err.get_or_insert(err);
        }
    }
    first_err.map_or(Ok(()), Err)
}

/// Cloneable handle that ends the session from another thread or a hook.
#[derive(Clone)]
pub struct SessionRestorer {
    entered: Arc<Entered>,
}

impl SessionRestorer {
    pub fn is_restored(&self) -> bool {
        self.entered
            .steps
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_empty()
    }

    pub fn restore(&self) -> io::Result<()> {
        self.entered.leave_all()
    }
}

pub struct TerminalSession {
    restorer: SessionRestorer,
}

impl TerminalSession {
    pub fn open() -> io::Result<Self> {
        Self::open_with(Arc::new(CrosstermSession))
    }

    /// Enters every step; on failure the steps already entered are undone.
    pub fn open_with(backend: Arc<dyn SessionBackend>) -> io::Result<Self> {
        let mut steps = Vec::with_capacity(SessionStep::ALL.len());
        for step in SessionStep::ALL {
            if let Err(err) = backend.enter(step) {
                let _ = leave_steps(backend.as_ref(), &steps);
                return Err(err);
            }
            steps.push(step);
        }
        Ok(Self {
            restorer: SessionRestorer {
                entered: Arc::new(Entered {
                    steps: Mutex::new(steps),
                    backend,
                }),
            },
        })
    }

    pub fn restorer(&self) -> SessionRestorer {
        self.restorer.clone()
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = self.restorer.restore();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationSignal {
    SigInt,
    SigTerm,
}

impl TerminationSignal {
    #[cfg(unix)]
    pub fn from_raw(signal: i32) -> Option<Self> {
        use signal_hook::consts::signal::{SIGINT, SIGTERM};

        match signal {
            SIGINT => Some(TerminationSignal::SigInt),
            SIGTERM => Some(TerminationSignal::SigTerm),
            _ => None,
        }
    }

    /// Shell convention: 128 + signal number.
    pub fn exit_code(self) -> i32 {
        match self {
            TerminationSignal::SigInt => 130,
            TerminationSignal::SigTerm => 143,
        }
    }
}

/// Forwards SIGINT/SIGTERM to `tx`. If the main loop has not shut down
/// within `grace`, the terminal is restored and the process exits.
#[cfg(unix)]
pub fn watch_termination(
    restorer: SessionRestorer,
    tx: std::sync::mpsc::Sender<TerminationSignal>,
    grace: std::time::Duration,
) -> io::Result<std::thread::JoinHandle<()>> {
    use signal_hook::consts::signal::{SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;

    let mut signals = Signals::new([SIGINT, SIGTERM])?;
    std::thread::Builder::new()
        .name("zdoc-signals".into())
        .spawn(move || {
            for signal in signals.forever().filter_map(TerminationSignal::from_raw) {
                tracing::info!(?signal, "termination requested");
                let _ = tx.send(signal);
                std::thread::sleep(grace);
                let _ = restorer.restore();
                std::process::exit(signal.exit_code());
            }
        })
}

#[cfg(test)]
#[path = "../../tests/unit/tui/session.rs"]
mod tests;
