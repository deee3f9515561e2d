//! Live rendering of a document
//!
//! Every block is mounted on an [`InstanceScheduler`]. A `notify` watcher on
//! the document's and the config file's directories feeds a channel:
//!
//! - document changed: unmount every block and mount the new set
//! - config changed: reload settings and remount everything under them
//! - Ctrl-C: global teardown

use std::path::{Path, PathBuf};
use std::sync::Arc;

use countdown_core::settings;
use countdown_core::{InstanceId, InstanceScheduler, SchedulerEvent, Settings};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::commands::{block_label, read_document};
use crate::terminal::TerminalSink;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchEvent {
    DocumentChanged,
    ConfigChanged,
}

/// Which watched file an event touches, if any
fn classify(event: &Event, document: &Path, config: Option<&Path>) -> Option<WatchEvent> {
    if !matches!(
        event.kind,
        EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
    ) {
        return None;
    }
    if event.paths.iter().any(|p| same_file(p, document)) {
        return Some(WatchEvent::DocumentChanged);
    }
    match config {
        Some(cfg) if event.paths.iter().any(|p| same_file(p, cfg)) => {
            Some(WatchEvent::ConfigChanged)
        }
        _ => None,
    }
}

/// Editors often replace files, so compare by name within the directory
fn same_file(candidate: &Path, target: &Path) -> bool {
    candidate == target
        || (candidate.file_name() == target.file_name()
            && candidate.parent().and_then(|p| p.canonicalize().ok())
                == target.parent().and_then(|p| p.canonicalize().ok()))
}

fn watch_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Send to the watch loop. Returns false once the loop has stopped.
fn forward(tx: &mpsc::UnboundedSender<WatchEvent>, kind: WatchEvent) -> bool {
    match tx.send(kind) {
        Ok(()) => true,
        Err(_) => {
            tracing::debug!(?kind, "Watch loop stopped, dropping event");
            false
        }
    }
}

fn start_watcher(
    document: &Path,
    config: Option<&Path>,
    tx: mpsc::UnboundedSender<WatchEvent>,
) -> Result<RecommendedWatcher, String> {
    let doc = document.to_path_buf();
    let cfg = config.map(Path::to_path_buf);

    let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
        Ok(event) => {
            if let Some(kind) = classify(&event, &doc, cfg.as_deref()) {
                forward(&tx, kind);
            }
        }
        Err(e) => tracing::warn!(error = %e, "File watcher error"),
    })
    .map_err(|e| format!("Failed to start file watcher: {}", e))?;

    let doc_dir = watch_dir(document);
    watcher
        .watch(&doc_dir, RecursiveMode::NonRecursive)
        .map_err(|e| format!("Failed to watch {}: {}", doc_dir.display(), e))?;

    if let Some(cfg_dir) = config.map(watch_dir)
        && cfg_dir != doc_dir
    {
        // A missing config directory only disables settings reloads
        if let Err(e) = watcher.watch(&cfg_dir, RecursiveMode::NonRecursive) {
            tracing::warn!(path = %cfg_dir.display(), error = %e, "Not watching settings");
        }
    }

    Ok(watcher)
}

/// Mount every block of the document. An unreadable document mounts nothing.
fn mount_document(scheduler: &mut InstanceScheduler, document: &Path) -> Vec<InstanceId> {
    let blocks = match read_document(document) {
        Ok(blocks) => blocks,
        Err(e) => {
            tracing::warn!(error = %e, "Document not mounted");
            return Vec::new();
        }
    };

    let ids: Vec<InstanceId> = blocks
        .iter()
        .map(|block| {
            let sink = Arc::new(TerminalSink::new(
                block_label(document, block),
                std::io::stdout(),
            ));
            scheduler.mount(block.source.clone(), sink)
        })
        .collect();

    tracing::info!(path = %document.display(), count = ids.len(), "Mounted document");
    ids
}

/// Render the document live until Ctrl-C.
pub async fn watch(
    document: &Path,
    config: Option<&Path>,
    settings: Settings,
) -> Result<(), String> {
    let document = document
        .canonicalize()
        .map_err(|e| format!("Failed to open {}: {}", document.display(), e))?;

    let (tx, mut rx) = mpsc::unbounded_channel();
    let _watcher = start_watcher(&document, config, tx)?;

    let mut scheduler = InstanceScheduler::new(settings);
    let mut mounted = mount_document(&mut scheduler, &document);

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            res = &mut ctrl_c => {
                if let Err(e) = res {
                    tracing::warn!(error = %e, "Ctrl-C handler failed");
                }
                scheduler.handle_event(SchedulerEvent::Teardown);
                break;
            }
            event = rx.recv() => {
                let Some(first) = event else {
                    scheduler.handle_event(SchedulerEvent::Teardown);
                    break;
                };

                // Editors emit bursts; handle each kind once
                let mut document_changed = first == WatchEvent::DocumentChanged;
                let mut config_changed = first == WatchEvent::ConfigChanged;
                while let Ok(next) = rx.try_recv() {
                    match next {
                        WatchEvent::DocumentChanged => document_changed = true,
                        WatchEvent::ConfigChanged => config_changed = true,
                    }
                }

                if config_changed
                    && let Some(path) = config
                {
                    match settings::load_settings_from(path) {
                        Ok(settings) => {
                            tracing::info!(path = %path.display(), "Settings changed");
                            scheduler.handle_event(SchedulerEvent::SettingsChanged(settings));
                        }
                        Err(e) => tracing::warn!(error = %e, "Keeping previous settings"),
                    }
                }

                if document_changed {
                    for id in mounted.drain(..) {
                        scheduler.unmount(&id);
                    }
                    mounted = mount_document(&mut scheduler, &document);
                }
            }
        }
    }

    println!("Stopped watching {}", document.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, ModifyKind};

    fn event(kind: EventKind, path: &str) -> Event {
        Event::new(kind).add_path(PathBuf::from(path))
    }

    #[test]
    fn test_classify() {
        let doc = Path::new("/notes/plan.md");
        let cfg = Path::new("/config/countdown-to.toml");

        let modified = event(EventKind::Modify(ModifyKind::Any), "/notes/plan.md");
        assert_eq!(
            classify(&modified, doc, Some(cfg)),
            Some(WatchEvent::DocumentChanged)
        );

        let created = event(EventKind::Create(CreateKind::File), "/config/countdown-to.toml");
        assert_eq!(classify(&created, doc, Some(cfg)), Some(WatchEvent::ConfigChanged));
        assert_eq!(classify(&created, doc, None), None);

        let other = event(EventKind::Modify(ModifyKind::Any), "/notes/other.md");
        assert_eq!(classify(&other, doc, Some(cfg)), None);

        let access = event(EventKind::Access(notify::event::AccessKind::Any), "/notes/plan.md");
        assert_eq!(classify(&access, doc, Some(cfg)), None);
    }

    #[test]
    fn test_forward_after_loop_stopped() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        assert!(forward(&tx, WatchEvent::DocumentChanged));
        assert_eq!(rx.try_recv().ok(), Some(WatchEvent::DocumentChanged));

        drop(rx);
        assert!(!forward(&tx, WatchEvent::ConfigChanged));
    }

    #[test]
    fn test_watch_dir() {
        assert_eq!(watch_dir(Path::new("plan.md")), PathBuf::from("."));
        assert_eq!(watch_dir(Path::new("/notes/plan.md")), PathBuf::from("/notes"));
    }
}
