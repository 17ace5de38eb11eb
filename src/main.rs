//! # ytm-browser
//!
//! A terminal browser for YouTube Music shelves, playlists and tracks, with
//! playlist downloads through `yt-dlp`.

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers,
        MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use ytm_browser::app_core::input::{AppKeyCode, AppKeyEvent, AppMouseEvent, AppMouseKind};
use ytm_browser::app_core::reducer;
use ytm_browser::app_core::state::{AppAction, AppState};
use ytm_browser::classifier::Classifier;
use ytm_browser::client::credentials::{
    account_name, import_curl_capture, read_credentials_from_file, search_credentials_in_dir,
    select_account,
};
use ytm_browser::client::{Credentials, Retrying, SyncClient};
use ytm_browser::download::{DownloadOptions, download_playlist};
use ytm_browser::session::Session;
use ytm_browser::{logging, paths, start_endpoints, theme, ui};

use std::io::{self, Read};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about,
    long_about = "ytm-browser: browse YouTube Music shelves, playlists and tracks in the terminal.\n\
                  Authenticates by replaying a browser request saved with \"Copy as cURL\"."
)]
struct Args {
    /// cURL capture or saved JSON credentials to use
    #[arg(short, long)]
    credentials: Option<PathBuf>,

    /// Directory searched for credentials when --credentials is not given
    #[arg(long)]
    credentials_dir: Option<PathBuf>,

    /// Saved account to use (defaults to the last one by name)
    #[arg(short, long)]
    account: Option<String>,

    /// Save a "Copy as cURL" capture (file, or `-` for stdin) as a new account and exit
    #[arg(long, value_name = "CAPTURE", requires = "name")]
    import: Option<PathBuf>,

    /// Account name for --import
    #[arg(long)]
    name: Option<String>,

    /// List saved accounts and exit
    #[arg(long)]
    accounts: bool,

    /// Directory playlists are downloaded into
    #[arg(short, long)]
    download_dir: Option<PathBuf>,

    /// UI theme (dracula, solarized, gruvbox, everforest_light)
    #[arg(short, long)]
    theme: Option<String>,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 10)]
    timeout: u64,

    /// Attempts per request before giving up
    #[arg(long, default_value_t = 3)]
    retries: usize,

    /// Show all paths used by the application (credentials, downloads, logs)
    #[arg(long)]
    config: bool,

    /// Print the start shelves and their contents instead of starting the TUI
    #[arg(long)]
    dump: bool,
}

const RETRY_DELAY: Duration = Duration::from_secs(1);

// ---------------------------------------------------------------------------
// Crossterm → reducer adapters
// ---------------------------------------------------------------------------

fn crossterm_to_app_key_event(
    code: KeyCode,
    modifiers: KeyModifiers,
    kind: KeyEventKind,
) -> Option<AppKeyEvent> {
    if matches!(kind, KeyEventKind::Release) {
        return None;
    }

    let key_code = match code {
        KeyCode::Char(c) => AppKeyCode::Char(c),
        KeyCode::Enter => AppKeyCode::Enter,
        KeyCode::Esc => AppKeyCode::Esc,
        KeyCode::Up => AppKeyCode::Up,
        KeyCode::Down => AppKeyCode::Down,
        KeyCode::Left => AppKeyCode::Left,
        KeyCode::Right => AppKeyCode::Right,
        KeyCode::Home => AppKeyCode::Home,
        KeyCode::End => AppKeyCode::End,
        KeyCode::PageUp => AppKeyCode::PageUp,
        KeyCode::PageDown => AppKeyCode::PageDown,
        KeyCode::Tab => AppKeyCode::Tab,
        KeyCode::BackTab => AppKeyCode::BackTab,
        _ => return None,
    };

    Some(AppKeyEvent {
        code: key_code,
        ctrl: modifiers.contains(KeyModifiers::CONTROL),
        is_release: false,
    })
}

fn crossterm_to_app_mouse_event(mouse: &event::MouseEvent) -> Option<AppMouseEvent> {
    let kind = match mouse.kind {
        MouseEventKind::Down(event::MouseButton::Left) => AppMouseKind::LeftDown,
        MouseEventKind::ScrollUp => AppMouseKind::ScrollUp,
        MouseEventKind::ScrollDown => AppMouseKind::ScrollDown,
        _ => return None,
    };
    Some(AppMouseEvent {
        kind,
        column: mouse.column,
        row: mouse.row,
    })
}

/// Picks the explicit credentials file, or an account saved in `dir`.
fn load_credentials(args: &Args, dir: &std::path::Path) -> Result<(String, Credentials)> {
    if let Some(path) = &args.credentials {
        let credentials = read_credentials_from_file(path)
            .with_context(|| format!("failed to load credentials from {}", path.display()))?;
        let label = path
            .file_name()
            .map(|n| account_name(&n.to_string_lossy()).to_string())
            .unwrap_or_else(|| path.display().to_string());
        return Ok((label, credentials));
    }

    let found = search_credentials_in_dir(dir);
    if found.is_empty() {
        anyhow::bail!(
            "No credentials found in {}.\n\
             Open music.youtube.com while signed in, copy any youtubei/v1/browse request \
             as cURL from the browser's network tab, and save it with \
             `--import <file> --name <account>` (or pass --credentials <file>).",
            dir.display()
        );
    }
    Ok(select_account(found, args.account.as_deref())?)
}

/// Reads a capture from `source` (`-` is stdin) and saves it under `name`.
fn import_account(source: &std::path::Path, name: &str, dir: &std::path::Path) -> Result<()> {
    let raw = if source.as_os_str() == "-" {
        let mut raw = String::new();
        io::stdin().read_to_string(&mut raw)?;
        raw
    } else {
        std::fs::read_to_string(source)
            .with_context(|| format!("failed to read {}", source.display()))?
    };
    let path = import_curl_capture(&raw, dir, name).with_context(|| {
        "the capture does not look like a cURL request, copy it with \"Copy as cURL\""
    })?;
    println!("Saved account '{}' to {}", name, path.display());
    Ok(())
}

/// Prints each start shelf followed by its children.
fn dump_tree(session: &Session) -> Result<()> {
    let roots = start_endpoints::endpoints(session.classifier())?;
    for root in &roots {
        println!("{}", root);
        match root.children(session) {
            Ok(children) => {
                for child in children {
                    println!("  {}", child);
                }
            }
            Err(err) => println!("  ! {}", err),
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let args = Args::parse();
    let app_version = format!("v{}", env!("CARGO_PKG_VERSION"));

    let theme_name = args.theme.as_deref().unwrap_or("dracula");
    let theme_enum = theme::Theme::from_str(theme_name).map_err(anyhow::Error::msg)?;
    let theme = theme_enum.config();

    let credentials_dir = match &args.credentials_dir {
        Some(dir) => dir.clone(),
        None => paths::get_credentials_dir()?,
    };
    let download_dir = match &args.download_dir {
        Some(dir) => dir.clone(),
        None => paths::get_download_dir()?,
    };
    let log_dir = paths::get_log_dir()?;

    if args.config {
        println!("App Paths:");
        println!("  Data:        {}", paths::get_data_dir()?.display());
        println!("  Credentials: {}", credentials_dir.display());
        println!("  Downloads:   {}", download_dir.display());
        println!("  Logs:        {}", log_dir.display());
        return Ok(());
    }

    let _log_guard = logging::init_logging(&log_dir)?;

    if let (Some(source), Some(name)) = (&args.import, &args.name) {
        return import_account(source, name, &credentials_dir);
    }

    if args.accounts {
        let found = search_credentials_in_dir(&credentials_dir);
        if found.is_empty() {
            println!("No accounts in {}", credentials_dir.display());
        }
        for file in found.keys() {
            println!("{}", account_name(file));
        }
        return Ok(());
    }

    let (account_label, credentials) = load_credentials(&args, &credentials_dir)?;
    tracing::info!(credentials = %account_label, "using credentials");

    let client = SyncClient::new(credentials, Duration::from_secs(args.timeout))?;
    let transport = Retrying::new(client, args.retries, RETRY_DELAY);
    let session = Session::new(Classifier::default(), Box::new(transport));

    if args.dump {
        return dump_tree(&session);
    }

    let roots = start_endpoints::endpoints(session.classifier())?;
    let mut app = AppState::new(
        session,
        roots,
        DownloadOptions::new(download_dir),
        theme,
        app_version,
        account_label,
    );

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    res
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut AppState,
) -> Result<()>
where
    B::Error: Send + Sync + 'static,
{
    terminal.draw(|f| ui::ui(f, app))?;

    loop {
        if app.should_quit {
            break;
        }

        match event::read()? {
            Event::Key(key) => {
                if let Some(event) = crossterm_to_app_key_event(key.code, key.modifiers, key.kind)
                {
                    reducer::handle_key_event(app, event);
                }
                if let Some(action) = app.pending_action.take() {
                    handle_action(terminal, app, action)?;
                }
                terminal.draw(|f| ui::ui(f, app))?;
            }
            Event::Mouse(mouse) => {
                let transitioned = crossterm_to_app_mouse_event(&mouse)
                    .is_some_and(|event| reducer::handle_mouse_event(app, event));
                if transitioned {
                    terminal.draw(|f| ui::ui(f, app))?;
                }
            }
            Event::Resize(_, _) => {
                terminal.draw(|f| ui::ui(f, app))?;
            }
            _ => {}
        }
    }
    Ok(())
}

/// Runs blocking work requested by the reducer, redrawing first so the
/// status bar shows what is happening.
fn handle_action<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut AppState,
    action: AppAction,
) -> Result<()>
where
    B::Error: Send + Sync + 'static,
{
    match action {
        AppAction::Expand(path) => {
            let label = app
                .node_at(&path)
                .map(|node| node.to_string())
                .unwrap_or_default();
            app.set_status(format!("Loading {}...", label), false);
            terminal.draw(|f| ui::ui(f, app))?;
            app.expand_path(path);
        }
        AppAction::DownloadQueue => {
            let queue = std::mem::take(&mut app.download_queue);
            let total = queue.len();
            let mut failed = Vec::new();
            for (idx, path) in queue.into_iter().enumerate() {
                let Some(label) = app.node_at(&path).map(|node| node.to_string()) else {
                    continue;
                };
                app.set_status(
                    format!("Downloading {}/{}: {}", idx + 1, total, label),
                    false,
                );
                terminal.draw(|f| ui::ui(f, app))?;
                // Resolve through the tree node so its children cache is reused
                let outcome = match app.node_at(&path) {
                    Some(playlist) => {
                        download_playlist(playlist, &app.session, &app.download_options)
                    }
                    None => continue,
                };
                match outcome {
                    Ok(report) => tracing::info!(
                        playlist = %label,
                        tracks = report.tracks,
                        dir = %report.directory.display(),
                        "download finished"
                    ),
                    Err(err) => {
                        tracing::error!(playlist = %label, error = ?err, "download failed");
                        failed.push(path);
                    }
                }
            }
            app.rebuild_rows();
            if failed.is_empty() {
                app.set_status(
                    format!(
                        "Downloaded {} playlist(s) to {}",
                        total,
                        app.download_options.target_dir.display()
                    ),
                    false,
                );
            } else {
                app.set_status(
                    format!(
                        "{} of {} download(s) failed, kept in queue (see log)",
                        failed.len(),
                        total
                    ),
                    true,
                );
                app.download_queue = failed;
            }
        }
    }

    Ok(())
}
