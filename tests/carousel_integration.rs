use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use signage_player::config::CarouselOptions;
use signage_player::engine::PlaybackEngine;
use signage_player::events::{
    HostEvent, MediaReady, Phase, ProbeOutcome, ProbeRequest, RenderFrame, SequenceReplaced,
};
use signage_player::slides::{MediaKind, Slide};
use signage_player::tasks::carousel;

fn image(locator: &str) -> Slide {
    Slide {
        locator: locator.to_string(),
        caption: String::new(),
        kind: MediaKind::Image,
    }
}

fn video(locator: &str) -> Slide {
    Slide {
        locator: locator.to_string(),
        caption: String::new(),
        kind: MediaKind::Video,
    }
}

fn options(hold_ms: u64, anim_ms: u64, start_delay_ms: u64) -> CarouselOptions {
    CarouselOptions {
        hold: Duration::from_millis(hold_ms),
        animation: Duration::from_millis(anim_ms),
        start_delay: Duration::from_millis(start_delay_ms),
        ..CarouselOptions::default()
    }
}

struct Rig {
    sequence_tx: mpsc::Sender<SequenceReplaced>,
    ready_tx: mpsc::Sender<MediaReady>,
    host_tx: mpsc::Sender<HostEvent>,
    probe_rx: mpsc::Receiver<ProbeRequest>,
    frames_rx: mpsc::Receiver<RenderFrame>,
    cancel: CancellationToken,
}

fn spawn_rig(options: CarouselOptions) -> Rig {
    let (sequence_tx, sequence_rx) = mpsc::channel(4);
    let (probe_tx, probe_rx) = mpsc::channel(4);
    let (ready_tx, ready_rx) = mpsc::channel(4);
    let (host_tx, host_rx) = mpsc::channel(8);
    let (frames_tx, frames_rx) = mpsc::channel(8);
    let cancel = CancellationToken::new();

    let engine = PlaybackEngine::new(options, 1080);
    tokio::spawn(carousel::run(
        "test".to_string(),
        engine,
        sequence_rx,
        ready_rx,
        host_rx,
        probe_tx,
        frames_tx,
        cancel.clone(),
    ));

    Rig {
        sequence_tx,
        ready_tx,
        host_tx,
        probe_rx,
        frames_rx,
        cancel,
    }
}

impl Rig {
    async fn replace(&self, slides: Vec<Slide>) {
        self.sequence_tx
            .send(SequenceReplaced(slides))
            .await
            .unwrap();
    }

    async fn next_frame(&mut self) -> RenderFrame {
        self.frames_rx.recv().await.expect("frames channel closed")
    }

    async fn next_probe(&mut self) -> ProbeRequest {
        self.probe_rx.recv().await.expect("probe channel closed")
    }

    async fn answer(&self, request: &ProbeRequest) {
        self.ready_tx
            .send(MediaReady {
                generation: request.generation,
                locator: request.slide.locator.clone(),
                outcome: ProbeOutcome::Ready { natural: None },
            })
            .await
            .unwrap();
    }
}

#[tokio::test(start_paused = true)]
async fn images_advance_in_round_robin_on_schedule() {
    let mut rig = spawn_rig(options(1000, 200, 0));
    let t0 = Instant::now();
    rig.replace(vec![image("a.jpg"), image("b.jpg")]).await;

    let initial = rig.next_frame().await;
    assert_eq!(initial.phase, Phase::Idle);
    assert_eq!(initial.layers[0].locator, "a.jpg");

    // The hold elapses at t=1000 and the transition to B begins.
    let request = rig.next_probe().await;
    assert_eq!(t0.elapsed(), Duration::from_millis(1000));
    assert_eq!(request.slide.locator, "b.jpg");
    let pending = rig.next_frame().await;
    assert_eq!(pending.phase, Phase::AwaitingReady);
    assert_eq!(pending.layers.len(), 1, "incoming hidden until ready");

    rig.answer(&request).await;
    let animating = rig.next_frame().await;
    assert_eq!(animating.phase, Phase::Animating);
    assert_eq!(animating.layers.len(), 2);

    // Commit lands at t=1200; B is current with nothing incoming.
    let committed = rig.next_frame().await;
    assert_eq!(t0.elapsed(), Duration::from_millis(1200));
    assert_eq!(committed.phase, Phase::Idle);
    assert_eq!(committed.layers.len(), 1);
    assert_eq!(committed.layers[0].locator, "b.jpg");

    // The next hold elapses at t=2200 and the cycle wraps back to A.
    let request = rig.next_probe().await;
    assert_eq!(t0.elapsed(), Duration::from_millis(2200));
    assert_eq!(request.slide.locator, "a.jpg");

    rig.cancel.cancel();
}

#[tokio::test(start_paused = true)]
async fn videos_ignore_hold_and_advance_on_end_signal() {
    let mut rig = spawn_rig(options(1000, 200, 0));
    rig.replace(vec![video("clip.mp4"), image("b.jpg")]).await;

    let initial = rig.next_frame().await;
    assert!(initial.layers[0].restart, "video starts from zero");

    // Far past the image hold duration: still no transition.
    tokio::time::sleep(Duration::from_millis(3000)).await;
    assert!(rig.probe_rx.try_recv().is_err(), "hold ignored for video");

    rig.host_tx.send(HostEvent::VideoEnded).await.unwrap();
    let request = rig.next_probe().await;
    assert_eq!(request.slide.locator, "b.jpg");
    let pending = rig.next_frame().await;
    assert_eq!(pending.phase, Phase::AwaitingReady);

    rig.answer(&request).await;
    let animating = rig.next_frame().await;
    assert_eq!(animating.phase, Phase::Animating);
    let committed = rig.next_frame().await;
    assert_eq!(committed.phase, Phase::Idle);
    assert_eq!(committed.layers[0].locator, "b.jpg");

    rig.cancel.cancel();
}

#[tokio::test(start_paused = true)]
async fn readiness_fallback_forces_forward_progress() {
    let mut rig = spawn_rig(options(1000, 200, 0));
    let t0 = Instant::now();
    rig.replace(vec![image("a.jpg"), image("never-loads.jpg")])
        .await;

    let _initial = rig.next_frame().await;
    let _request = rig.next_probe().await;
    let _pending = rig.next_frame().await;

    // No readiness signal ever arrives; the fallback fires at t=1800.
    let animating = rig.next_frame().await;
    assert_eq!(t0.elapsed(), Duration::from_millis(1800));
    assert_eq!(animating.phase, Phase::Animating);

    let committed = rig.next_frame().await;
    assert_eq!(t0.elapsed(), Duration::from_millis(2000));
    assert_eq!(committed.layers[0].locator, "never-loads.jpg");

    rig.cancel.cancel();
}

#[tokio::test(start_paused = true)]
async fn sequence_replacement_orphans_stale_readiness() {
    let mut rig = spawn_rig(options(1000, 200, 0));
    rig.replace(vec![image("a.jpg"), image("b.jpg")]).await;

    let _initial = rig.next_frame().await;
    let stale_request = rig.next_probe().await;
    let _pending = rig.next_frame().await;

    rig.replace(vec![image("c.jpg")]).await;
    let reset = rig.next_frame().await;
    assert_eq!(reset.phase, Phase::Idle);
    assert_eq!(reset.layers[0].locator, "c.jpg");

    // The stale probe result must not start an animation.
    rig.answer(&stale_request).await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(rig.frames_rx.try_recv().is_err(), "stale signal produced a frame");
    assert!(rig.probe_rx.try_recv().is_err());

    rig.cancel.cancel();
}

#[tokio::test(start_paused = true)]
async fn single_slide_sequences_never_transition() {
    let mut rig = spawn_rig(options(1000, 200, 0));
    rig.replace(vec![image("only.jpg")]).await;

    let initial = rig.next_frame().await;
    assert_eq!(initial.layers[0].locator, "only.jpg");

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert!(rig.probe_rx.try_recv().is_err());
    assert!(rig.frames_rx.try_recv().is_err());

    rig.cancel.cancel();
}

#[tokio::test(start_paused = true)]
async fn start_delay_offsets_only_the_first_cycle() {
    let mut rig = spawn_rig(options(1000, 200, 500));
    let t0 = Instant::now();
    rig.replace(vec![image("a.jpg"), image("b.jpg")]).await;
    let _initial = rig.next_frame().await;

    let request = rig.next_probe().await;
    assert_eq!(t0.elapsed(), Duration::from_millis(1500));
    let _pending = rig.next_frame().await;
    rig.answer(&request).await;
    let _animating = rig.next_frame().await;
    let _committed = rig.next_frame().await;
    assert_eq!(t0.elapsed(), Duration::from_millis(1700));

    // Second cycle uses the bare hold; no extra delay.
    let _request = rig.next_probe().await;
    assert_eq!(t0.elapsed(), Duration::from_millis(2700));

    rig.cancel.cancel();
}

#[tokio::test(start_paused = true)]
async fn resize_events_recompute_stage_geometry() {
    let mut rig = spawn_rig(options(1000, 200, 0));
    rig.replace(vec![image("a.jpg")]).await;
    let initial = rig.next_frame().await;

    rig.host_tx
        .send(HostEvent::ContainerResized {
            width: 500,
            height: 400,
            viewport_height: 800,
        })
        .await
        .unwrap();

    let resized = rig.next_frame().await;
    assert_ne!(resized.stage, initial.stage);
    assert!(resized.stage.width <= 500);
    assert!(resized.stage.width >= 360);
    assert!(resized.stage.height >= 240);

    rig.cancel.cancel();
}
