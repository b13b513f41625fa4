//! File watching for live reload.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::Duration;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc as async_mpsc;

/// Events emitted by the file watcher.
#[derive(Debug, Clone, PartialEq)]
pub enum WatchEvent {
    /// The manifest document changed
    ManifestChanged(PathBuf),

    /// Some other file under the blocks root changed
    BlockChanged(PathBuf),

    /// File was deleted
    Deleted(PathBuf),
}

impl WatchEvent {
    /// The file the event is about.
    pub fn path(&self) -> &Path {
        match self {
            WatchEvent::ManifestChanged(path)
            | WatchEvent::BlockChanged(path)
            | WatchEvent::Deleted(path) => path,
        }
    }
}

/// Quiet period after the last raw event before changes are reported.
const DEBOUNCE: Duration = Duration::from_millis(100);

/// File watcher for detecting changes.
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
}

impl FileWatcher {
    /// Watch `paths` recursively, flagging changes to `manifest`.
    ///
    /// Returns the watcher and a channel to receive events. Dropping the
    /// watcher stops the events.
    pub fn new(
        paths: &[PathBuf],
        manifest: &Path,
    ) -> Result<(Self, async_mpsc::Receiver<WatchEvent>), std::io::Error> {
        let (sync_tx, sync_rx) = mpsc::channel();
        let (async_tx, async_rx) = async_mpsc::channel(100);

        let mut watcher = notify::recommended_watcher(move |res: Result<notify::Event, _>| {
            if let Ok(event) = res {
                let _ = sync_tx.send(event);
            }
        })
        .map_err(std::io::Error::other)?;

        for path in paths {
            if path.exists() {
                watcher
                    .watch(path, RecursiveMode::Recursive)
                    .map_err(std::io::Error::other)?;
            }
        }

        let manifest_name = manifest.file_name().map(|n| n.to_os_string());

        std::thread::spawn(move || debounce(sync_rx, async_tx, manifest_name, DEBOUNCE));

        Ok((Self { _watcher: watcher }, async_rx))
    }
}

/// Forward classified events once `window` passes without new raw events.
///
/// Editors emit bursts per save (truncate then write, temp file then rename).
/// Within a burst only the latest event per path is kept, so every path that
/// changed is reported once, after its last write.
fn debounce(
    rx: mpsc::Receiver<notify::Event>,
    tx: async_mpsc::Sender<WatchEvent>,
    manifest_name: Option<OsString>,
    window: Duration,
) {
    let mut pending: Vec<WatchEvent> = Vec::new();

    loop {
        let next = if pending.is_empty() {
            rx.recv().map_err(|_| RecvTimeoutError::Disconnected)
        } else {
            rx.recv_timeout(window)
        };

        match next {
            Ok(event) => {
                for path in &event.paths {
                    if let Some(e) = classify_event(path, &event.kind, manifest_name.as_deref()) {
                        pending.retain(|p| p.path() != e.path());
                        pending.push(e);
                    }
                }
            }
            Err(RecvTimeoutError::Timeout) => {
                if !flush(&mut pending, &tx) {
                    return;
                }
            }
            Err(RecvTimeoutError::Disconnected) => {
                flush(&mut pending, &tx);
                return;
            }
        }
    }
}

/// Send every pending event. Returns false once the receiver is gone.
fn flush(pending: &mut Vec<WatchEvent>, tx: &async_mpsc::Sender<WatchEvent>) -> bool {
    pending.drain(..).all(|e| tx.blocking_send(e).is_ok())
}

/// Classify a notify event into a WatchEvent.
fn classify_event(
    path: &Path,
    kind: &notify::EventKind,
    manifest_name: Option<&std::ffi::OsStr>,
) -> Option<WatchEvent> {
    use notify::EventKind;

    let is_manifest = manifest_name.is_some() && path.file_name() == manifest_name;

    match kind {
        EventKind::Create(_) | EventKind::Modify(_) => {
            if is_manifest {
                Some(WatchEvent::ManifestChanged(path.to_path_buf()))
            } else {
                Some(WatchEvent::BlockChanged(path.to_path_buf()))
            }
        }
        EventKind::Remove(_) => Some(WatchEvent::Deleted(path.to_path_buf())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, ModifyKind, RemoveKind};
    use notify::EventKind;
    use std::ffi::OsStr;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn classifies_manifest_changes() {
        let name = Some(OsStr::new("registry.json"));

        assert_eq!(
            classify_event(
                Path::new("/site/registry.json"),
                &EventKind::Modify(ModifyKind::Any),
                name
            ),
            Some(WatchEvent::ManifestChanged(PathBuf::from("/site/registry.json")))
        );
        assert_eq!(
            classify_event(
                Path::new("/site/blocks/hero.tsx"),
                &EventKind::Create(CreateKind::File),
                name
            ),
            Some(WatchEvent::BlockChanged(PathBuf::from("/site/blocks/hero.tsx")))
        );
        assert_eq!(
            classify_event(
                Path::new("/site/registry.json"),
                &EventKind::Remove(RemoveKind::File),
                name
            ),
            Some(WatchEvent::Deleted(PathBuf::from("/site/registry.json")))
        );
        assert_eq!(
            classify_event(Path::new("/site/x"), &EventKind::Any, name),
            None
        );
    }

    fn modified(path: &str) -> notify::Event {
        notify::Event::new(EventKind::Modify(ModifyKind::Any)).add_path(PathBuf::from(path))
    }

    fn run_debounce(events: Vec<notify::Event>) -> Vec<WatchEvent> {
        let (sync_tx, sync_rx) = mpsc::channel();
        let (async_tx, mut async_rx) = async_mpsc::channel(100);

        let handle = std::thread::spawn(move || {
            debounce(
                sync_rx,
                async_tx,
                Some(OsString::from("registry.json")),
                Duration::from_millis(50),
            )
        });

        for event in events {
            sync_tx.send(event).unwrap();
        }
        drop(sync_tx);
        handle.join().unwrap();

        let mut out = Vec::new();
        while let Ok(event) = async_rx.try_recv() {
            out.push(event);
        }
        out
    }

    #[test]
    fn burst_keeps_manifest_change_after_block_change() {
        let events = run_debounce(vec![
            modified("/site/blocks/hero.tsx"),
            modified("/site/registry.json"),
        ]);

        assert_eq!(
            events,
            vec![
                WatchEvent::BlockChanged(PathBuf::from("/site/blocks/hero.tsx")),
                WatchEvent::ManifestChanged(PathBuf::from("/site/registry.json")),
            ]
        );
    }

    #[test]
    fn repeated_writes_to_one_path_report_once() {
        let events = run_debounce(vec![
            modified("/site/registry.json"),
            modified("/site/registry.json"),
            modified("/site/registry.json"),
        ]);

        assert_eq!(
            events,
            vec![WatchEvent::ManifestChanged(PathBuf::from("/site/registry.json"))]
        );
    }

    #[tokio::test]
    async fn reports_manifest_write_after_block_write() {
        let temp = tempdir().unwrap();
        let manifest = temp.path().join("registry.json");
        fs::create_dir_all(temp.path().join("blocks")).unwrap();

        let (watcher, mut rx) = FileWatcher::new(&[temp.path().to_path_buf()], &manifest).unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;

        fs::write(temp.path().join("blocks/hero.tsx"), "export {}").unwrap();
        fs::write(&manifest, "{}").unwrap();

        let mut events = Vec::new();
        let deadline = tokio::time::Instant::now() + Duration::from_secs(3);
        while let Ok(Some(event)) = tokio::time::timeout_at(deadline, rx.recv()).await {
            let done = matches!(event, WatchEvent::ManifestChanged(_));
            events.push(event);
            if done {
                break;
            }
        }

        drop(watcher);

        assert!(
            events.iter().any(|e| matches!(e, WatchEvent::ManifestChanged(_))),
            "no manifest change in {:?}",
            events
        );
    }

    #[tokio::test]
    async fn watches_file_changes() {
        let temp = tempdir().unwrap();
        let manifest = temp.path().join("registry.json");

        let (watcher, mut rx) = FileWatcher::new(&[temp.path().to_path_buf()], &manifest).unwrap();

        // Give inotify time to set up
        tokio::time::sleep(Duration::from_millis(100)).await;

        fs::write(&manifest, "{}").unwrap();

        let event = tokio::time::timeout(Duration::from_secs(3), rx.recv()).await;

        drop(watcher);

        assert!(event.is_ok(), "timeout waiting for file watch event");
        assert!(event.unwrap().is_some(), "channel should not be closed");
    }
}
