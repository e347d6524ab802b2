use std::collections::HashMap;
use std::time::Duration;

use tracing::debug;

use crate::config::{AspectSource, CarouselOptions, FitMode, TransitionStyle};
use crate::events::{Layer, LayerMotion, MediaReady, Phase, ProbeOutcome, ProbeRequest, RenderFrame};
use crate::geometry::{self, Region, StageSize};
use crate::slides::{MediaKind, Slide};

/// Bounded wait for a readiness signal before a transition is forced
/// forward anyway. Applies to images and videos alike so a stalled preload
/// can never wedge the cycle.
pub const READY_FALLBACK: Duration = Duration::from_millis(800);

/// The playback state machine for one carousel.
///
/// All fields are owned by the single carousel task and mutated only from
/// its event loop; the generation counter invalidates any signal that
/// crossed an async boundary before a reset or a newer transition.
pub struct PlaybackEngine {
    options: CarouselOptions,
    slides: Vec<Slide>,
    current: usize,
    incoming: Option<usize>,
    phase: Phase,
    generation: u64,
    /// First-readiness-only guard; duplicate signals for one transition are
    /// ignored.
    ready_seen: bool,
    /// Whether the one-time start delay has been consumed since the last
    /// reset.
    started: bool,
    region: Region,
    viewport_height: u32,
    /// Natural aspect ratios learned from probes, keyed by locator.
    aspects: HashMap<String, f32>,
    /// The next emitted frame restarts the current video layer.
    video_restart: bool,
}

impl PlaybackEngine {
    pub fn new(options: CarouselOptions, viewport_height: u32) -> Self {
        let region = Region {
            width: options.region.width,
            height: options.region.height,
        };
        Self {
            options,
            slides: Vec::new(),
            current: 0,
            incoming: None,
            phase: Phase::Idle,
            generation: 0,
            ready_seen: false,
            started: false,
            region,
            viewport_height,
            aspects: HashMap::new(),
            video_restart: false,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn animation(&self) -> Duration {
        self.options.animation
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn incoming_index(&self) -> Option<usize> {
        self.incoming
    }

    pub fn current_slide(&self) -> Option<&Slide> {
        self.slides.get(self.current)
    }

    pub fn incoming_slide(&self) -> Option<&Slide> {
        self.incoming.and_then(|idx| self.slides.get(idx))
    }

    /// Replace the slide sequence. Hard reset: indices return to the start,
    /// any in-flight transition is abandoned, and the generation bump
    /// orphans every outstanding async signal.
    pub fn replace_sequence(&mut self, slides: Vec<Slide>) {
        self.slides = slides;
        self.current = 0;
        self.incoming = None;
        self.phase = Phase::Idle;
        self.generation = self.generation.wrapping_add(1);
        self.ready_seen = false;
        self.started = false;
        self.video_restart = matches!(
            self.current_slide().map(|s| s.kind),
            Some(MediaKind::Video)
        );
    }

    /// Wall-clock wait before the current slide auto-advances, measured
    /// from now. None for videos (end-of-playback driven), single-slide or
    /// empty sequences, and mid-transition states. The one-time start delay
    /// is folded into the first scheduled wait after a reset.
    pub fn hold_wait(&mut self) -> Option<Duration> {
        if self.phase != Phase::Idle || self.slides.len() <= 1 {
            return None;
        }
        if self.current_slide()?.kind == MediaKind::Video {
            return None;
        }
        let mut wait = self.options.hold;
        if !self.started {
            self.started = true;
            wait += self.options.start_delay;
        }
        Some(wait)
    }

    /// Start the next transition. None when the sequence cannot advance
    /// (length <= 1) or a transition is already in flight.
    pub fn begin_transition(&mut self) -> Option<ProbeRequest> {
        if self.slides.len() <= 1 || self.incoming.is_some() {
            return None;
        }
        let next = (self.current + 1) % self.slides.len();
        self.incoming = Some(next);
        self.generation = self.generation.wrapping_add(1);
        self.ready_seen = false;
        self.phase = Phase::AwaitingReady;
        Some(ProbeRequest {
            generation: self.generation,
            slide: self.slides[next].clone(),
        })
    }

    /// Apply a readiness signal. True when the signal starts the animation;
    /// stale generations and duplicate signals have no effect.
    pub fn media_ready(&mut self, ready: &MediaReady) -> bool {
        if let ProbeOutcome::Ready {
            natural: Some((w, h)),
        } = ready.outcome
        {
            if w > 0 && h > 0 {
                self.aspects
                    .insert(ready.locator.clone(), w as f32 / h as f32);
            }
        }
        self.force_ready(ready.generation)
    }

    /// Mark the incoming media ready (first signal for the generation only)
    /// and start the animation. Also the path taken when the readiness
    /// fallback elapses.
    pub fn force_ready(&mut self, generation: u64) -> bool {
        if generation != self.generation || self.phase != Phase::AwaitingReady || self.ready_seen {
            return false;
        }
        self.ready_seen = true;
        self.phase = Phase::Animating;
        true
    }

    /// Commit the in-flight transition: the incoming slide becomes current.
    /// A commit carrying any generation other than the one that started the
    /// transition has no observable effect.
    pub fn commit(&mut self, generation: u64) -> bool {
        if generation != self.generation || self.phase != Phase::Animating {
            return false;
        }
        let Some(next) = self.incoming.take() else {
            return false;
        };
        self.current = next;
        self.phase = Phase::Idle;
        self.ready_seen = false;
        self.video_restart = matches!(
            self.current_slide().map(|s| s.kind),
            Some(MediaKind::Video)
        );
        true
    }

    /// A video end signal advances only an idle video slide; anything else
    /// is a stray signal and ignored.
    pub fn video_ended(&mut self) -> Option<ProbeRequest> {
        match self.current_slide() {
            Some(slide) if slide.kind == MediaKind::Video && self.phase == Phase::Idle => {
                self.begin_transition()
            }
            _ => {
                debug!("ignoring video end signal outside an idle video slide");
                None
            }
        }
    }

    pub fn set_region(&mut self, width: u32, height: u32, viewport_height: u32) {
        self.region = Region { width, height };
        self.viewport_height = viewport_height;
    }

    fn target_aspect(&self) -> f32 {
        match self.options.aspect {
            AspectSource::Fixed(ratio) => ratio,
            AspectSource::Container => geometry::clamp_container_aspect(self.region.aspect()),
            AspectSource::Media => {
                let target = self.incoming_slide().or_else(|| self.current_slide());
                target
                    .and_then(|slide| self.aspects.get(&slide.locator).copied())
                    .unwrap_or(geometry::DEFAULT_MEDIA_ASPECT)
            }
        }
    }

    pub fn stage_size(&self) -> StageSize {
        geometry::compute_stage_size(
            self.target_aspect(),
            self.region,
            self.viewport_height,
            self.options.max_width_px,
            self.options.max_height_fraction,
        )
    }

    /// Build the paintable description of the carousel right now. Mutable
    /// because the frame that commits a video consumes the restart flag;
    /// later frames of the same slide must not restart it.
    pub fn frame(&mut self) -> RenderFrame {
        let stage = self.stage_size();
        let transition = self.options.transition;
        let animation = self.options.animation;

        let Some(current) = self.current_slide().cloned() else {
            return RenderFrame {
                stage,
                phase: Phase::Idle,
                transition,
                animation,
                layers: Vec::new(),
                caption: None,
                framed: false,
            };
        };

        let zoom = geometry::clamp_zoom(self.options.zoom, self.options.fit_mode);
        let backdrop = self.options.fit_mode == FitMode::Cover;
        let (out_motion, in_motion) = match transition {
            TransitionStyle::Slide => (LayerMotion::SlideOutLeft, LayerMotion::SlideInRight),
            TransitionStyle::Fade => (LayerMotion::FadeOut, LayerMotion::FadeIn),
        };

        let restart = std::mem::take(&mut self.video_restart);
        let mut layers = Vec::with_capacity(2);
        layers.push(Layer {
            locator: current.locator.clone(),
            kind: current.kind,
            motion: if self.phase == Phase::Animating {
                out_motion
            } else {
                LayerMotion::Static
            },
            zoom,
            backdrop,
            restart: restart && current.kind == MediaKind::Video,
        });
        if self.phase == Phase::Animating {
            if let Some(incoming) = self.incoming_slide() {
                layers.push(Layer {
                    locator: incoming.locator.clone(),
                    kind: incoming.kind,
                    motion: in_motion,
                    zoom,
                    backdrop,
                    restart: false,
                });
            }
        }

        let caption = if self.options.show_caption {
            let shown = if self.phase == Phase::Animating {
                self.incoming_slide().unwrap_or(&current)
            } else {
                &current
            };
            let text = shown.caption.trim();
            (!text.is_empty()).then(|| text.to_string())
        } else {
            None
        };

        RenderFrame {
            stage,
            phase: self.phase,
            transition,
            animation,
            layers,
            caption,
            framed: true,
        }
    }
}
