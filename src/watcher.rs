use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use std::path::Path;
use std::sync::mpsc;

pub enum WatchEvent {
    FileChanged,
    Error(String),
}

pub struct FileWatcher {
    _watcher: RecommendedWatcher,
}

impl FileWatcher {
    /// Watch a single stats file for changes. The watch is placed on the
    /// parent directory because most editors replace the file on save, which
    /// would invalidate a watch on the file itself; events are filtered back
    /// down to the one path we care about.
    pub fn new(path: &Path) -> anyhow::Result<(Self, mpsc::Receiver<WatchEvent>)> {
        let (tx, rx) = mpsc::channel();

        let target = path.to_path_buf();
        let sender = tx.clone();
        let mut watcher =
            notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
                match res {
                    Ok(event) => {
                        // Only signal when the watched file is involved; the
                        // app reloads on signal rather than inspecting the
                        // event kind.
                        if event.paths.iter().any(|p| p == &target) {
                            let _ = sender.send(WatchEvent::FileChanged);
                        }
                    }
                    Err(e) => {
                        let _ = sender.send(WatchEvent::Error(e.to_string()));
                    }
                }
            })?;

        let watch_root = path.parent().filter(|p| !p.as_os_str().is_empty());
        match watch_root {
            Some(dir) => watcher.watch(dir, RecursiveMode::NonRecursive)?,
            None => watcher.watch(path, RecursiveMode::NonRecursive)?,
        }

        Ok((Self { _watcher: watcher }, rx))
    }
}
