use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::Result;
use tokio::select;
use tokio::sync::mpsc::{Receiver, Sender};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::events::{MediaReady, ProbeOutcome, ProbeRequest};
use crate::slides::{MediaKind, Slide};

// Resolves natural image dimensions with EXIF orientation applied. Only
// the header is decoded. Orientation handling is best-effort; if metadata
// is missing, the stored orientation is kept.
fn probe_image_dimensions(path: &Path) -> anyhow::Result<(u32, u32)> {
    let reader = image::ImageReader::open(path)?.with_guessed_format()?;
    let (w, h) = reader.into_dimensions()?;
    let orientation = read_orientation(path).unwrap_or(1);
    // Orientations 5-8 transpose the axes.
    Ok(if (5..=8).contains(&orientation) {
        (h, w)
    } else {
        (w, h)
    })
}

fn read_orientation(path: &Path) -> Option<u16> {
    let file = File::open(path).ok()?;
    let mut buf = BufReader::new(file);
    let exif = exif::Reader::new().read_from_container(&mut buf).ok()?;
    if let Some(field) = exif.get_field(exif::Tag::Orientation, exif::In::PRIMARY) {
        if let Some(val) = field.value.get_uint(0) {
            let o = val as u16;
            debug!("exif orientation {} for {}", o, path.display());
            return Some(o);
        }
    }
    None
}

fn probe_video(path: &Path) -> anyhow::Result<()> {
    let meta = std::fs::metadata(path)?;
    anyhow::ensure!(meta.is_file() && meta.len() > 0, "video file is empty");
    Ok(())
}

/// Best-effort readiness check for one slide. Failures are reported as
/// `Failed`, which the engine treats as readiness without dimensions.
fn resolve(slide: &Slide) -> ProbeOutcome {
    let path = Path::new(&slide.locator);
    match slide.kind {
        MediaKind::Image => match probe_image_dimensions(path) {
            Ok(natural) => ProbeOutcome::Ready {
                natural: Some(natural),
            },
            Err(err) => {
                debug!(locator = %slide.locator, %err, "image probe failed");
                ProbeOutcome::Failed
            }
        },
        MediaKind::Video => match probe_video(path) {
            Ok(()) => ProbeOutcome::Ready { natural: None },
            Err(err) => {
                debug!(locator = %slide.locator, %err, "video probe failed");
                ProbeOutcome::Failed
            }
        },
    }
}

/// Resolve readiness for transition targets off the carousel's event loop.
///
/// Probes run on the blocking pool through a `JoinSet`, at most
/// `max_in_flight` at a time; results flow back tagged with the generation
/// that requested them.
pub async fn run(
    mut probe_rx: Receiver<ProbeRequest>,
    to_engine: Sender<MediaReady>,
    cancel: CancellationToken,
    max_in_flight: usize,
) -> Result<()> {
    let mut tasks: JoinSet<MediaReady> = JoinSet::new();
    let mut in_flight = 0usize;

    loop {
        select! {
            _ = cancel.cancelled() => break,

            // Accept new probe requests while under limit
            Some(request) = probe_rx.recv(), if in_flight < max_in_flight => {
                in_flight += 1;
                tasks.spawn(async move {
                    let ProbeRequest { generation, slide } = request;
                    let locator = slide.locator.clone();
                    let outcome = tokio::task::spawn_blocking(move || resolve(&slide))
                        .await
                        .unwrap_or(ProbeOutcome::Failed);
                    MediaReady {
                        generation,
                        locator,
                        outcome,
                    }
                });
            }

            Some(join_res) = tasks.join_next() => {
                in_flight = in_flight.saturating_sub(1);
                if let Ok(ready) = join_res {
                    debug!(locator = %ready.locator, outcome = ?ready.outcome, "probe finished");
                    let _ = to_engine.send(ready).await;
                }
            }
        }
    }
    Ok(())
}
