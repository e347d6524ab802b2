//! Stage sizing math: fit a fixed-aspect stage into the available region
//! under the configured caps without ever collapsing below the floors.

use crate::config::FitMode;

/// Smallest stage the player will ever report.
pub const MIN_STAGE_WIDTH: u32 = 360;
pub const MIN_STAGE_HEIGHT: u32 = 240;

/// Smallest region the engine will reason about; degenerate container
/// measurements clamp up to this.
pub const MIN_REGION_WIDTH: u32 = 320;
pub const MIN_REGION_HEIGHT: u32 = 240;

/// Assumed media aspect until natural dimensions are known.
pub const DEFAULT_MEDIA_ASPECT: f32 = 16.0 / 9.0;

// Container-derived aspect ratios outside this range produce absurd
// letterboxing on signage panels.
const MIN_CONTAINER_ASPECT: f32 = 0.45;
const MAX_CONTAINER_ASPECT: f32 = 2.4;

// The stage leaves a sliver of the region unused so the frame never feels
// jammed against the page chrome.
const WIDTH_MARGIN: f32 = 0.98;
const HEIGHT_MARGIN: f32 = 0.94;

/// The container box a carousel may occupy, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub width: u32,
    pub height: u32,
}

impl Region {
    /// Apply the region floors; a 0x0 container measurement still yields a
    /// usable box.
    pub fn clamped(self) -> Self {
        Self {
            width: self.width.max(MIN_REGION_WIDTH),
            height: self.height.max(MIN_REGION_HEIGHT),
        }
    }

    pub fn aspect(self) -> f32 {
        let c = self.clamped();
        c.width as f32 / c.height as f32
    }
}

/// Dimensions of the fixed-aspect render surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageSize {
    pub width: u32,
    pub height: u32,
}

/// Fit a stage of the given aspect into `avail`, capped by the configured
/// max width and by `max_height_fraction` of the viewport height. Whichever
/// dimension overflows its cap shrinks, then the floors apply.
pub fn compute_stage_size(
    aspect: f32,
    avail: Region,
    viewport_height: u32,
    max_width_px: u32,
    max_height_fraction: f32,
) -> StageSize {
    let avail = avail.clamped();
    let aspect = if aspect.is_finite() && aspect > 0.0 {
        aspect
    } else {
        DEFAULT_MEDIA_ASPECT
    };

    let max_w = max_width_px.min((avail.width as f32 * WIDTH_MARGIN).floor() as u32);
    let max_h = ((viewport_height as f32 * max_height_fraction).floor() as u32)
        .min((avail.height as f32 * HEIGHT_MARGIN).floor() as u32);

    let mut w = max_w;
    let mut h = (w as f32 / aspect).round() as u32;
    if h > max_h {
        h = max_h;
        w = (h as f32 * aspect).round() as u32;
    }

    StageSize {
        width: w.max(MIN_STAGE_WIDTH),
        height: h.max(MIN_STAGE_HEIGHT),
    }
}

/// Clamp a container-derived aspect to the sane signage range.
pub fn clamp_container_aspect(aspect: f32) -> f32 {
    if !aspect.is_finite() || aspect <= 0.0 {
        return DEFAULT_MEDIA_ASPECT;
    }
    aspect.clamp(MIN_CONTAINER_ASPECT, MAX_CONTAINER_ASPECT)
}

/// Clamp the configured zoom factor to the safe range for the fit mode.
/// `contain` never crops, so zooming in is disallowed; `cover` crops to
/// fill and tolerates zoom in either direction.
pub fn clamp_zoom(zoom: f32, fit: FitMode) -> f32 {
    let zoom = if zoom.is_finite() && zoom > 0.0 {
        zoom
    } else {
        1.0
    };
    match fit {
        FitMode::Contain => zoom.clamp(0.5, 1.0),
        FitMode::Cover => zoom.clamp(0.5, 1.5),
    }
}
