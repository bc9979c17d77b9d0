use std::io::stdout;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use crate::cli::Cli;
use crate::document::format_count;
use crate::loader::{self, LoadedDocument};
use crate::renderer;
use crate::watcher::{FileWatcher, WatchEvent};

/// Main application state and run loop.
pub struct App {
    pub path: PathBuf,
    pub top: usize,
    pub watch: bool,
    pub out: Option<PathBuf>,
    /// The currently displayed document. Replaced wholesale on every
    /// successful reload; a failed reload leaves it untouched.
    pub loaded: LoadedDocument,
    pub last_error: Option<String>,
    pub status_message: Option<String>,
    pub heatmap_scroll: usize,
    pub max_heatmap_scroll: usize,
    pub running: bool,
}

impl App {
    /// Build a new `App` from parsed CLI arguments. The initial load is
    /// fatal on failure -- there is no previous document to fall back to.
    pub fn new(cli: &Cli) -> Result<Self> {
        let path = cli.path.canonicalize().unwrap_or_else(|_| cli.path.clone());
        let loaded = loader::load(&path)?;

        Ok(Self {
            path,
            top: cli.top,
            watch: !cli.no_watch,
            out: cli.out.clone(),
            loaded,
            last_error: None,
            status_message: None,
            heatmap_scroll: 0,
            max_heatmap_scroll: 0,
            running: true,
        })
    }

    /// Re-read the stats file. On success the displayed document is replaced
    /// wholesale; on failure it is left exactly as it was and the error is
    /// surfaced in the status bar.
    pub fn reload(&mut self) {
        match loader::load(&self.path) {
            Ok(loaded) => {
                self.loaded = loaded;
                self.last_error = None;
                self.status_message = Some(format!(
                    "Reloaded at {}",
                    self.loaded.loaded_at.format("%H:%M:%S")
                ));
            }
            Err(e) => {
                self.last_error = Some(e.to_string());
                self.status_message = None;
            }
        }
    }

    /// Write the loaded document's raw text verbatim to the export target.
    /// No re-serialization: the output is byte-for-byte the file that was
    /// loaded, even if it has changed on disk since.
    pub fn export(&mut self) {
        let dest = self.out.clone().unwrap_or_else(|| {
            let ts = chrono::Local::now().format("%Y%m%d_%H%M%S");
            self.path
                .with_file_name(format!("pulseboard_export_{}.json", ts))
        });

        match std::fs::write(&dest, &self.loaded.raw) {
            Ok(()) => {
                self.status_message = Some(format!("Exported to {}", dest.display()));
            }
            Err(e) => {
                self.last_error = Some(format!("export failed: {}", e));
            }
        }
    }

    fn scroll_heatmap_left(&mut self) {
        self.heatmap_scroll = self.heatmap_scroll.saturating_sub(1);
    }

    fn scroll_heatmap_right(&mut self) {
        self.heatmap_scroll = self
            .heatmap_scroll
            .saturating_add(1)
            .min(self.max_heatmap_scroll);
    }

    /// Run the main TUI event loop.
    pub fn run(&mut self) -> Result<()> {
        // 1. Set up the file watcher (unless disabled).
        let watch_rx = if self.watch {
            match FileWatcher::new(&self.path) {
                Ok((watcher, rx)) => Some((watcher, rx)),
                Err(e) => {
                    // Watching is a convenience; the dashboard still works
                    // with manual reloads.
                    self.last_error = Some(format!("watcher unavailable: {}", e));
                    self.watch = false;
                    None
                }
            }
        } else {
            None
        };

        // 2. Set up the terminal.
        enable_raw_mode()?;
        let mut out = stdout();
        execute!(out, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(out);
        let mut terminal = Terminal::new(backend)?;

        // 3. Main loop.
        while self.running {
            // --- Draw ---
            let scroll = self.heatmap_scroll;
            let status = self.status_message.clone();
            let error = self.last_error.clone();
            let mut max_scroll_out = 0;
            terminal.draw(|frame| {
                max_scroll_out = renderer::render_ui(
                    frame,
                    &self.loaded,
                    self.top,
                    self.watch,
                    scroll,
                    status.as_deref(),
                    error.as_deref(),
                );
            })?;
            self.max_heatmap_scroll = max_scroll_out;
            self.heatmap_scroll = self.heatmap_scroll.min(self.max_heatmap_scroll);

            // --- Handle keyboard events ---
            if event::poll(Duration::from_millis(100))? {
                if let Event::Key(key) = event::read()? {
                    if key.code == KeyCode::Char('c')
                        && key.modifiers.contains(KeyModifiers::CONTROL)
                    {
                        break;
                    }

                    match key.code {
                        KeyCode::Char('q') | KeyCode::Char('Q') => break,
                        KeyCode::Char('r') | KeyCode::Char('R') => self.reload(),
                        KeyCode::Char('e') | KeyCode::Char('E') => self.export(),
                        KeyCode::Char('h') | KeyCode::Left => self.scroll_heatmap_left(),
                        KeyCode::Char('l') | KeyCode::Right => self.scroll_heatmap_right(),
                        _ => {}
                    }
                }
            }

            // --- Check for file changes (non-blocking) ---
            if let Some((_, ref rx)) = watch_rx {
                let mut changed = false;
                loop {
                    match rx.try_recv() {
                        Ok(WatchEvent::FileChanged) => changed = true,
                        Ok(WatchEvent::Error(e)) => {
                            self.last_error = Some(format!("watch error: {}", e));
                        }
                        Err(_) => break,
                    }
                }
                if changed {
                    // Drained above, so a burst of saves reloads once.
                    self.reload();
                }
            }
        }

        // 4. Cleanup -- restore the terminal.
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        // Print a short session summary.
        println!();
        println!("Document: {}", self.loaded.name);
        println!(
            "  {} messages from {} senders",
            format_count(self.loaded.document.summary.total_messages as f64),
            format_count(self.loaded.document.summary.unique_senders as f64),
        );
        println!();

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn cli_for(path: PathBuf) -> Cli {
        Cli {
            path,
            top: 8,
            no_watch: true,
            export: false,
            out: None,
        }
    }

    #[test]
    fn test_failed_reload_keeps_previous_document() {
        let path = std::env::temp_dir().join("pulseboard_test_app_reload.json");
        fs::write(&path, r#"{"summary": {"total_messages": 10}}"#).unwrap();

        let mut app = App::new(&cli_for(path.clone())).unwrap();
        assert_eq!(app.loaded.document.summary.total_messages, 10);

        // Corrupt the file, then reload: the displayed document must stay.
        fs::write(&path, "{ broken").unwrap();
        app.reload();
        assert_eq!(app.loaded.document.summary.total_messages, 10);
        assert!(app.last_error.is_some());

        // Fix the file: the next reload replaces the document wholesale.
        fs::write(&path, r#"{"summary": {"total_messages": 25}}"#).unwrap();
        app.reload();
        assert_eq!(app.loaded.document.summary.total_messages, 25);
        assert!(app.last_error.is_none());

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_initial_load_failure_is_fatal() {
        let path = std::env::temp_dir().join("pulseboard_test_app_missing.json");
        assert!(App::new(&cli_for(path)).is_err());
    }

    #[test]
    fn test_export_writes_raw_verbatim() {
        let path = std::env::temp_dir().join("pulseboard_test_app_export_src.json");
        let out = std::env::temp_dir().join("pulseboard_test_app_export_out.json");
        let body = "{\"summary\": {\"total_messages\": 3}}\n";
        fs::write(&path, body).unwrap();

        let mut cli = cli_for(path.clone());
        cli.out = Some(out.clone());
        let mut app = App::new(&cli).unwrap();
        app.export();

        assert_eq!(fs::read_to_string(&out).unwrap(), body);
        assert!(app.status_message.is_some());

        let _ = fs::remove_file(&path);
        let _ = fs::remove_file(&out);
    }
}
