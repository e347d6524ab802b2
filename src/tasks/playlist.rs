use std::path::{Path, PathBuf};

use anyhow::Result;
use notify::event::{CreateKind, ModifyKind, RemoveKind};
use notify::{Event, EventKind, RecursiveMode, Watcher, recommended_watcher};
use tokio::sync::mpsc::{self, Sender};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument, warn};
use walkdir::WalkDir;

use crate::config::CarouselConfig;
use crate::error::Error;
use crate::events::SequenceReplaced;
use crate::slides::{self, Slide, SlideEntry};

/// Assemble the slide sequence for one carousel and keep it current.
///
/// Inline entries come first, followed by media discovered in the assets
/// directory sorted by path. The directory is watched for its lifetime;
/// any change to a media file triggers a rescan and a fresh sequence
/// replacement (the engine's hard-reset path).
#[instrument(skip_all, fields(carousel = %cfg.name))]
pub async fn run(
    cfg: CarouselConfig,
    to_engine: Sender<SequenceReplaced>,
    cancel: CancellationToken,
) -> Result<()> {
    let sequence = build_sequence(&cfg)?;
    info!(slides = sequence.len(), "initial sequence assembled");
    let _ = to_engine.send(SequenceReplaced(sequence)).await;

    let Some(dir) = cfg.assets_dir.clone() else {
        // Static inline playlist; nothing to watch.
        cancel.cancelled().await;
        return Ok(());
    };

    // Bridge notify callback -> async channel
    let (watch_tx, mut watch_rx) = mpsc::channel::<notify::Result<Event>>(128);
    let mut _watcher = recommended_watcher(move |res| {
        let _ = watch_tx.blocking_send(res);
    })?;
    _watcher.watch(&dir, RecursiveMode::Recursive)?;
    match dir.canonicalize() {
        Ok(abs) => info!(watching = %abs.display(), "assets watcher initialized (recursive)"),
        Err(_) => info!(watching = %dir.display(), "assets watcher initialized (recursive)"),
    }

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                info!("cancel received; exiting playlist task");
                break;
            }

            Some(res) = watch_rx.recv() => match res {
                Ok(event) if touches_media(&event) => {
                    match build_sequence(&cfg) {
                        Ok(sequence) => {
                            info!(slides = sequence.len(), "assets changed; sequence rebuilt");
                            let _ = to_engine.send(SequenceReplaced(sequence)).await;
                        }
                        // Keep showing the previous sequence; the kiosk has
                        // no operator to fail loudly at.
                        Err(err) => warn!(%err, "rescan failed; keeping previous sequence"),
                    }
                }
                Ok(_) => {}
                Err(err) => error!("watch error: {err}"),
            }
        }
    }
    Ok(())
}

fn touches_media(event: &Event) -> bool {
    let relevant = matches!(
        &event.kind,
        EventKind::Create(CreateKind::File)
            | EventKind::Remove(RemoveKind::File)
            | EventKind::Modify(ModifyKind::Name(_))
    );
    relevant && event.paths.iter().any(|p| slides::is_media_file(p))
}

/// Inline entries plus the scanned assets directory, normalized together.
pub fn build_sequence(cfg: &CarouselConfig) -> Result<Vec<Slide>, Error> {
    let mut entries: Vec<SlideEntry> = cfg.slides.clone();
    if let Some(dir) = &cfg.assets_dir {
        for path in scan_media(dir)? {
            entries.push(SlideEntry::Locator(path.to_string_lossy().into_owned()));
        }
    }
    Ok(slides::normalize(&entries))
}

/// Recursive scan for media files, sorted by path for a stable order.
fn scan_media(dir: &Path) -> Result<Vec<PathBuf>, Error> {
    if !dir.is_dir() {
        return Err(Error::BadAssetDir(dir.display().to_string()));
    }
    let mut found: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path().to_path_buf())
        .filter(|p| slides::is_media_file(p))
        .collect();
    found.sort();
    Ok(found)
}
