use std::time::Duration;

use crate::config::TransitionStyle;
use crate::geometry::StageSize;
use crate::slides::{MediaKind, Slide};

/// Sequence replacement from the playlist task. Any replacement is a hard
/// reset for the engine.
#[derive(Debug)]
pub struct SequenceReplaced(pub Vec<Slide>);

/// Host-side signals delivered to the carousel task for its mounted
/// lifetime.
#[derive(Debug)]
pub enum HostEvent {
    /// The presented video reached its end of stream.
    VideoEnded,
    /// The container box changed size.
    ContainerResized {
        width: u32,
        height: u32,
        viewport_height: u32,
    },
}

/// Readiness probe request for the incoming slide of one transition.
#[derive(Debug)]
pub struct ProbeRequest {
    pub generation: u64,
    pub slide: Slide,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// Media is decodable; images carry their natural dimensions.
    Ready { natural: Option<(u32, u32)> },
    /// Media could not be read. The engine treats this as readiness so a
    /// broken asset never blocks the show.
    Failed,
}

/// Probe result, tagged with the generation that requested it so stale
/// results are discarded.
#[derive(Debug)]
pub struct MediaReady {
    pub generation: u64,
    pub locator: String,
    pub outcome: ProbeOutcome,
}

/// Where the engine is in its cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Current slide fully shown; hold timer running or awaiting video end.
    Idle,
    /// Transition requested; incoming media is preloading, not yet revealed.
    AwaitingReady,
    /// Visual transition in progress.
    Animating,
}

/// Motion applied to one media layer during the current frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerMotion {
    Static,
    SlideOutLeft,
    SlideInRight,
    FadeOut,
    FadeIn,
}

/// One media layer of the paintable output.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub locator: String,
    pub kind: MediaKind,
    pub motion: LayerMotion,
    /// Clamped scale multiplier.
    pub zoom: f32,
    /// Render a blurred copy of the media behind letterboxing (cover mode).
    pub backdrop: bool,
    /// Restart playback from zero, muted, autoplaying. Set on the frame
    /// that commits a video as the new current slide.
    pub restart: bool,
}

/// Paintable description of one carousel at an instant: the stage box, one
/// or two media layers, and the caption overlay. Frames are plain values
/// sent over a channel; producing one has no other side effects.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderFrame {
    pub stage: StageSize,
    pub phase: Phase,
    pub transition: TransitionStyle,
    /// How long the layer motions of this frame run.
    pub animation: Duration,
    /// Current layer, plus the incoming layer only while animating. Empty
    /// when the sequence has no slides.
    pub layers: Vec<Layer>,
    pub caption: Option<String>,
    /// Whether the static decorative frame overlay renders around the
    /// stage.
    pub framed: bool,
}

impl RenderFrame {
    /// The defined no-content display state.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}
