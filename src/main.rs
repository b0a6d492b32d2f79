use crossterm::event::{self, Event};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{mpsc, Arc};
use std::time::{Duration, Instant};
use zdoc::app::App;
use zdoc::kernel::services::adapters::{
    ensure_settings_file, load_settings_from, AsyncRuntime, LocalDocStore, LocalStaticLookup,
};
use zdoc::kernel::services::ports::{Settings, StaticLookup};
use zdoc::models::DocPath;
use zdoc::tui::{TerminalSession, TerminationSignal};

mod logging;

#[derive(Debug, PartialEq, Eq)]
struct StartupPaths {
    root: PathBuf,
    open_doc: Option<DocPath>,
}

/// `zdoc [ROOT|FILE] [DOC]`. A file argument opens that document; its root
/// is `cwd` when the file lives under it, otherwise the file's directory.
fn resolve_startup_paths(
    cwd: &Path,
    target: Option<&str>,
    doc: Option<&str>,
) -> io::Result<StartupPaths> {
    let mut startup = match target {
        None => StartupPaths {
            root: cwd.to_path_buf(),
            open_doc: None,
        },
        Some(raw) => {
            let path = cwd.join(raw);
            let meta = std::fs::metadata(&path).map_err(|e| {
                io::Error::new(e.kind(), format!("{}: {e}", path.display()))
            })?;
            if meta.is_dir() {
                StartupPaths {
                    root: path,
                    open_doc: None,
                }
            } else {
                let root = if path.starts_with(cwd) {
                    cwd.to_path_buf()
                } else {
                    path.parent().map_or_else(|| cwd.to_path_buf(), Path::to_path_buf)
                };
                let open_doc = doc_path_under(&root, &path)?;
                StartupPaths {
                    root,
                    open_doc: Some(open_doc),
                }
            }
        }
    };

    if let Some(raw) = doc {
        startup.open_doc = Some(parse_doc_path(raw)?);
    }
    Ok(startup)
}

fn doc_path_under(root: &Path, file: &Path) -> io::Result<DocPath> {
    let relative = file.strip_prefix(root).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} is outside {}", file.display(), root.display()),
        )
    })?;
    let logical = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");
    parse_doc_path(&logical)
}

fn parse_doc_path(raw: &str) -> io::Result<DocPath> {
    DocPath::parse(raw).map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))
}

fn load_settings() -> Settings {
    match ensure_settings_file() {
        Ok(path) => load_settings_from(&path).unwrap_or_default(),
        Err(e) => {
            tracing::warn!(error = %e, "settings unavailable, using defaults");
            Settings::default()
        }
    }
}

/// Time the event loop gets to exit on its own after SIGINT/SIGTERM.
const SIGNAL_GRACE: Duration = Duration::from_secs(2);

fn main() -> io::Result<()> {
    let log_guard = logging::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "-h" || a == "--help") {
        println!("usage: zdoc [ROOT|FILE] [DOC]");
        if let Some(guard) = &log_guard {
            println!("logs: {}", guard.log_dir().display());
        }
        return Ok(());
    }

    let settings = load_settings();
    let cwd = std::env::current_dir()?;
    let default_root = settings.docs_root.as_deref();
    let startup = resolve_startup_paths(
        &cwd,
        args.first().map(String::as_str).or(default_root),
        args.get(1).map(String::as_str),
    )?;
    tracing::info!(root = %startup.root.display(), "starting");

    let store = Arc::new(LocalDocStore::new(&startup.root));
    let fallback = settings.static_root.as_ref().map(|dir| {
        Arc::new(LocalStaticLookup::new(startup.root.join(dir))) as Arc<dyn StaticLookup>
    });
    let (tx, rx) = mpsc::channel();
    let runtime = AsyncRuntime::new(tx, store, fallback)?;
    let mut app = App::new(runtime, rx, &settings);
    if let Some(doc) = startup.open_doc {
        app.open_document(doc);
    }

    let session = TerminalSession::open()?;
    let restorer = session.restorer();
    let default_hook = std::panic::take_hook();
    let panic_restorer = session.restorer();
    std::panic::set_hook(Box::new(move |info| {
        let _ = panic_restorer.restore();
        tracing::error!(panic = %info, "panic");
        default_hook(info);
    }));

    let (sig_tx, sig_rx) = mpsc::channel::<TerminationSignal>();
    #[cfg(unix)]
    zdoc::tui::watch_termination(restorer, sig_tx, SIGNAL_GRACE)?;
    #[cfg(not(unix))]
    drop((restorer, sig_tx));

    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
    terminal.clear()?;

    loop {
        app.tick(Instant::now());
        terminal.draw(|frame| {
            let area = frame.area();
            app.render(frame, area);
        })?;

        if app.should_quit() {
            break;
        }
        if let Ok(signal) = sig_rx.try_recv() {
            tracing::info!(?signal, "terminating");
            break;
        }

        if event::poll(app.poll_timeout(Instant::now()))? {
            match event::read()? {
                Event::Key(key) => app.handle_key(key),
                Event::Resize(_, _) => terminal.autoresize()?,
                _ => {}
            }
        }
    }

    drop(session);
    Ok(())
}

#[cfg(test)]
#[path = "../tests/unit/cli_startup_paths.rs"]
mod tests;
