use std::time::Duration;

use anyhow::Result;
use tokio::select;
use tokio::sync::mpsc::{Receiver, Sender};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

use crate::events::{HostEvent, RenderFrame};
use crate::slides::MediaKind;

use super::carousel::wait;

/// Log render frames and supply video end-of-playback signals.
///
/// This presenter has no media pipeline; a real display surface would
/// report the actual end of stream. A video slide is assumed to run for
/// `video_runtime` from the frame that restarts it.
#[instrument(skip_all, fields(carousel = %name))]
pub async fn run(
    name: String,
    mut frames_rx: Receiver<RenderFrame>,
    host_tx: Sender<HostEvent>,
    video_runtime: Duration,
    cancel: CancellationToken,
) -> Result<()> {
    let mut video_end: Option<Instant> = None;

    loop {
        select! {
            _ = cancel.cancelled() => break,

            Some(frame) = frames_rx.recv() => {
                describe(&frame);
                if frame
                    .layers
                    .iter()
                    .any(|l| l.restart && l.kind == MediaKind::Video)
                {
                    video_end = Some(Instant::now() + video_runtime);
                }
                if frame.is_empty() {
                    video_end = None;
                }
            }

            _ = wait(video_end), if video_end.is_some() => {
                video_end = None;
                let _ = host_tx.send(HostEvent::VideoEnded).await;
            }
        }
    }
    Ok(())
}

fn describe(frame: &RenderFrame) {
    match frame.layers.as_slice() {
        [] => info!(
            stage_w = frame.stage.width,
            stage_h = frame.stage.height,
            "no content to display"
        ),
        [current] => info!(
            locator = %current.locator,
            kind = ?current.kind,
            stage_w = frame.stage.width,
            stage_h = frame.stage.height,
            caption = frame.caption.as_deref().unwrap_or(""),
            "showing"
        ),
        [outgoing, incoming, ..] => info!(
            from = %outgoing.locator,
            to = %incoming.locator,
            style = ?frame.transition,
            duration_ms = frame.animation.as_millis() as u64,
            "transitioning"
        ),
    }
}
