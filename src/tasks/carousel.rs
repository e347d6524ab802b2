use std::future::pending;

use anyhow::Result;
use tokio::select;
use tokio::sync::mpsc::{Receiver, Sender};
use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use crate::engine::{PlaybackEngine, READY_FALLBACK};
use crate::events::{HostEvent, MediaReady, ProbeRequest, RenderFrame, SequenceReplaced};

/// Sleep until an optional deadline; no deadline waits forever.
pub(crate) async fn wait(deadline: Option<Instant>) {
    match deadline {
        Some(at) => sleep_until(at).await,
        None => pending().await,
    }
}

/// Drive one carousel's playback engine.
///
/// Every state transition happens inside this loop, one event at a time:
/// the hold deadline, the readiness fallback deadline, the commit deadline,
/// probe results, host signals, and sequence replacements. Replacing the
/// sequence clears all deadlines; together with the engine's generation
/// token that orphans every in-flight probe result.
#[instrument(skip_all, fields(carousel = %name))]
pub async fn run(
    name: String,
    mut engine: PlaybackEngine,
    mut sequence_rx: Receiver<SequenceReplaced>,
    mut ready_rx: Receiver<MediaReady>,
    mut host_rx: Receiver<HostEvent>,
    to_probe: Sender<ProbeRequest>,
    frames: Sender<RenderFrame>,
    cancel: CancellationToken,
) -> Result<()> {
    let mut hold_deadline: Option<Instant> = None;
    let mut ready_deadline: Option<Instant> = None;
    let mut commit_deadline: Option<Instant> = None;

    loop {
        select! {
            _ = cancel.cancelled() => {
                debug!("cancel received; tearing down carousel");
                break;
            }

            Some(SequenceReplaced(slides)) = sequence_rx.recv() => {
                engine.replace_sequence(slides);
                ready_deadline = None;
                commit_deadline = None;
                hold_deadline = engine.hold_wait().map(|d| Instant::now() + d);
                let _ = frames.send(engine.frame()).await;
            }

            _ = wait(hold_deadline), if hold_deadline.is_some() => {
                hold_deadline = None;
                if let Some(request) = engine.begin_transition() {
                    ready_deadline = Some(Instant::now() + READY_FALLBACK);
                    let _ = to_probe.send(request).await;
                    let _ = frames.send(engine.frame()).await;
                }
            }

            Some(ready) = ready_rx.recv() => {
                if engine.media_ready(&ready) {
                    ready_deadline = None;
                    commit_deadline = Some(Instant::now() + engine.animation());
                    let _ = frames.send(engine.frame()).await;
                } else {
                    debug!(generation = ready.generation, "discarding stale readiness signal");
                }
            }

            _ = wait(ready_deadline), if ready_deadline.is_some() => {
                ready_deadline = None;
                let generation = engine.generation();
                if engine.force_ready(generation) {
                    debug!("readiness signal never arrived; forcing the transition");
                    commit_deadline = Some(Instant::now() + engine.animation());
                    let _ = frames.send(engine.frame()).await;
                }
            }

            _ = wait(commit_deadline), if commit_deadline.is_some() => {
                commit_deadline = None;
                let generation = engine.generation();
                if engine.commit(generation) {
                    hold_deadline = engine.hold_wait().map(|d| Instant::now() + d);
                    let _ = frames.send(engine.frame()).await;
                }
            }

            Some(event) = host_rx.recv() => match event {
                HostEvent::VideoEnded => {
                    if let Some(request) = engine.video_ended() {
                        ready_deadline = Some(Instant::now() + READY_FALLBACK);
                        let _ = to_probe.send(request).await;
                        let _ = frames.send(engine.frame()).await;
                    }
                }
                HostEvent::ContainerResized { width, height, viewport_height } => {
                    engine.set_region(width, height, viewport_height);
                    let _ = frames.send(engine.frame()).await;
                }
            }
        }
    }
    Ok(())
}
