use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, ensure};
use serde::Deserialize;
use serde::de::{self, Deserializer, Visitor};

use crate::error::Error;
use crate::slides::SlideEntry;

/// Top-level deployment configuration: the display the carousels are laid
/// out on plus one entry per independently running carousel.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Configuration {
    /// Height of the display in pixels; stage height caps are expressed as
    /// a fraction of it.
    pub viewport_height: u32,
    pub carousels: Vec<CarouselConfig>,
}

impl Configuration {
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let s = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&s)?)
    }

    /// Validate runtime invariants that cannot be expressed via serde
    /// defaults alone.
    pub fn validated(self) -> Result<Self> {
        ensure!(self.viewport_height > 0, "viewport-height must be positive");
        ensure!(
            !self.carousels.is_empty(),
            "at least one carousel must be configured"
        );
        let mut names = HashSet::new();
        for carousel in &self.carousels {
            carousel
                .validate()
                .with_context(|| format!("invalid carousel '{}'", carousel.name))?;
            ensure!(
                names.insert(carousel.name.as_str()),
                "duplicate carousel name '{}'",
                carousel.name
            );
        }
        Ok(self)
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            viewport_height: 1080,
            carousels: Vec::new(),
        }
    }
}

/// One carousel: its name, playback options, and where its slides come
/// from (inline entries, a scanned assets directory, or both).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CarouselConfig {
    pub name: String,
    #[serde(flatten)]
    pub options: CarouselOptions,
    /// Slides listed inline in the deployment config.
    #[serde(default)]
    pub slides: Vec<SlideEntry>,
    /// Optional directory scanned (and watched) for additional media.
    #[serde(default)]
    pub assets_dir: Option<PathBuf>,
}

impl CarouselConfig {
    fn validate(&self) -> Result<()> {
        ensure!(!self.name.trim().is_empty(), "carousel name must be set");
        ensure!(
            !self.slides.is_empty() || self.assets_dir.is_some(),
            "carousel needs inline slides or an assets-dir"
        );
        self.options.validate()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct CarouselOptions {
    /// Time an image remains fully visible before auto-advancing. Videos
    /// ignore this and run to their end-of-playback signal.
    #[serde(with = "humantime_serde")]
    pub hold: Duration,
    /// Visual transition length.
    #[serde(with = "humantime_serde")]
    pub animation: Duration,
    /// One-time initial-cycle offset, for staggering concurrent carousels.
    #[serde(with = "humantime_serde")]
    pub start_delay: Duration,
    /// Stage width cap in pixels.
    pub max_width_px: u32,
    /// Stage height cap as a fraction of the viewport height.
    pub max_height_fraction: f32,
    /// Media scale multiplier; clamped to a safe range per fit mode.
    pub zoom: f32,
    pub fit_mode: FitMode,
    /// Whether to render the per-slide caption overlay.
    pub show_caption: bool,
    pub transition: TransitionStyle,
    /// Where the stage aspect ratio comes from.
    pub aspect: AspectSource,
    /// Container box this carousel may occupy on the page.
    pub region: RegionConfig,
    /// Runtime the presenter assumes for video slides when it cannot decode
    /// media itself.
    #[serde(with = "humantime_serde")]
    pub video_runtime: Duration,
    /// Maximum number of concurrent readiness probes.
    pub max_concurrent_probes: usize,
}

impl CarouselOptions {
    const fn default_hold() -> Duration {
        Duration::from_millis(6500)
    }

    const fn default_animation() -> Duration {
        Duration::from_millis(700)
    }

    const fn default_max_width_px() -> u32 {
        2400
    }

    const fn default_max_height_fraction() -> f32 {
        0.78
    }

    const fn default_zoom() -> f32 {
        1.08
    }

    const fn default_video_runtime() -> Duration {
        Duration::from_secs(10)
    }

    fn validate(&self) -> Result<()> {
        ensure!(self.hold > Duration::ZERO, "hold must be greater than zero");
        ensure!(
            self.animation > Duration::ZERO,
            "animation must be greater than zero"
        );
        ensure!(self.max_width_px > 0, "max-width-px must be positive");
        ensure!(
            self.max_height_fraction > 0.0 && self.max_height_fraction <= 1.0,
            "max-height-fraction must be within (0, 1]"
        );
        ensure!(
            self.zoom.is_finite() && self.zoom > 0.0,
            "zoom must be positive"
        );
        if let AspectSource::Fixed(ratio) = self.aspect {
            ensure!(
                (0.2..=5.0).contains(&ratio),
                "fixed aspect ratio {} is outside 0.2..=5.0",
                ratio
            );
        }
        ensure!(
            self.region.width > 0 && self.region.height > 0,
            "region dimensions must be positive"
        );
        ensure!(
            self.video_runtime > Duration::ZERO,
            "video-runtime must be greater than zero"
        );
        ensure!(
            self.max_concurrent_probes > 0,
            "max-concurrent-probes must be greater than zero"
        );
        Ok(())
    }
}

impl Default for CarouselOptions {
    fn default() -> Self {
        Self {
            hold: Self::default_hold(),
            animation: Self::default_animation(),
            start_delay: Duration::ZERO,
            max_width_px: Self::default_max_width_px(),
            max_height_fraction: Self::default_max_height_fraction(),
            zoom: Self::default_zoom(),
            fit_mode: FitMode::default(),
            show_caption: true,
            transition: TransitionStyle::default(),
            aspect: AspectSource::default(),
            region: RegionConfig::default(),
            video_runtime: Self::default_video_runtime(),
            max_concurrent_probes: 2,
        }
    }
}

/// Policy for mapping a media item's native aspect onto the stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FitMode {
    /// Letterbox; never crops, zooming in is disallowed.
    Contain,
    /// Crop to fill, blurred backdrop behind any letterboxing.
    Cover,
}

impl Default for FitMode {
    fn default() -> Self {
        Self::Cover
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransitionStyle {
    /// Directional translate: current exits left, incoming enters right.
    Slide,
    /// Opacity crossfade.
    Fade,
}

impl Default for TransitionStyle {
    fn default() -> Self {
        Self::Slide
    }
}

/// Where the stage aspect ratio comes from: the container's own measured
/// ratio, the transition target's natural media ratio, or a fixed value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AspectSource {
    Container,
    Media,
    Fixed(f32),
}

impl Default for AspectSource {
    fn default() -> Self {
        Self::Container
    }
}

impl<'de> Deserialize<'de> for AspectSource {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct AspectVisitor;

        impl<'de> Visitor<'de> for AspectVisitor {
            type Value = AspectSource;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("\"container\", \"media\", or an aspect ratio number")
            }

            fn visit_str<E>(self, raw: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                match raw {
                    "container" => Ok(AspectSource::Container),
                    "media" => Ok(AspectSource::Media),
                    other => Err(de::Error::unknown_variant(other, &["container", "media"])),
                }
            }

            fn visit_f64<E>(self, raw: f64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(AspectSource::Fixed(raw as f32))
            }

            fn visit_u64<E>(self, raw: u64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(AspectSource::Fixed(raw as f32))
            }

            fn visit_i64<E>(self, raw: i64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(AspectSource::Fixed(raw as f32))
            }
        }

        deserializer.deserialize_any(AspectVisitor)
    }
}

/// Container box dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct RegionConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 700,
        }
    }
}
