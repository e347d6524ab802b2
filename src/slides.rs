use std::ffi::OsStr;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

const VIDEO_EXTENSIONS: &[&str] = &["mp4", "webm", "mov"];
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MediaKind {
    Image,
    Video,
}

/// One unit of displayable media plus optional caption. Immutable once
/// normalized; the locator is guaranteed non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slide {
    pub locator: String,
    pub caption: String,
    pub kind: MediaKind,
}

/// One entry of a configured slide list: either a bare locator string or a
/// record with optional caption and kind.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SlideEntry {
    Locator(String),
    Record {
        #[serde(default)]
        locator: String,
        #[serde(default)]
        caption: String,
        #[serde(default)]
        kind: Option<MediaKind>,
    },
}

/// Media kind from the locator suffix. Unknown suffixes are images.
pub fn infer_kind(locator: &str) -> MediaKind {
    match extension_of(Path::new(locator)) {
        Some(ref ext) if VIDEO_EXTENSIONS.contains(&ext.as_str()) => MediaKind::Video,
        _ => MediaKind::Image,
    }
}

/// Whether a scanned file is playable media (image or video extension).
pub fn is_media_file(p: &Path) -> bool {
    matches!(
        extension_of(p),
        Some(ref ext) if IMAGE_EXTENSIONS.contains(&ext.as_str())
            || VIDEO_EXTENSIONS.contains(&ext.as_str())
    )
}

fn extension_of(p: &Path) -> Option<String> {
    p.extension()
        .and_then(OsStr::to_str)
        .map(|s| s.to_ascii_lowercase())
}

/// Turn a heterogeneous entry list into the ordered slide sequence.
///
/// Bare strings wrap with an empty caption and inferred kind; records fill
/// missing fields the same way. Entries without a usable locator are
/// dropped rather than failing the whole carousel.
pub fn normalize(entries: &[SlideEntry]) -> Vec<Slide> {
    entries
        .iter()
        .filter_map(|entry| {
            let (locator, caption, kind) = match entry {
                SlideEntry::Locator(s) => (s.clone(), String::new(), None),
                SlideEntry::Record {
                    locator,
                    caption,
                    kind,
                } => (locator.clone(), caption.clone(), *kind),
            };
            if locator.trim().is_empty() {
                debug!("dropping slide entry without a locator");
                return None;
            }
            let kind = kind.unwrap_or_else(|| infer_kind(&locator));
            Some(Slide {
                locator,
                caption,
                kind,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(locator: &str, caption: &str, kind: Option<MediaKind>) -> SlideEntry {
        SlideEntry::Record {
            locator: locator.to_string(),
            caption: caption.to_string(),
            kind,
        }
    }

    #[test]
    fn bare_locator_wraps_with_defaults() {
        let out = normalize(&[SlideEntry::Locator("hall/a.jpg".into())]);
        assert_eq!(
            out,
            vec![Slide {
                locator: "hall/a.jpg".into(),
                caption: String::new(),
                kind: MediaKind::Image,
            }]
        );
    }

    #[test]
    fn kind_is_inferred_from_suffix() {
        assert_eq!(infer_kind("promo.mp4"), MediaKind::Video);
        assert_eq!(infer_kind("promo.WEBM"), MediaKind::Video);
        assert_eq!(infer_kind("clip.mov"), MediaKind::Video);
        assert_eq!(infer_kind("poster.png"), MediaKind::Image);
        assert_eq!(infer_kind("no-extension"), MediaKind::Image);
    }

    #[test]
    fn explicit_kind_overrides_inference() {
        let out = normalize(&[record("stream-handle", "", Some(MediaKind::Video))]);
        assert_eq!(out[0].kind, MediaKind::Video);
    }

    #[test]
    fn entries_without_locator_are_dropped() {
        let out = normalize(&[
            record("", "orphan caption", None),
            SlideEntry::Locator("valid.jpg".into()),
            record("   ", "", None),
        ]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].locator, "valid.jpg");
    }

    #[test]
    fn captions_are_carried_through() {
        let out = normalize(&[record("b.mp4", "Now showing", None)]);
        assert_eq!(out[0].caption, "Now showing");
        assert_eq!(out[0].kind, MediaKind::Video);
    }

    #[test]
    fn media_file_filter_accepts_both_kinds() {
        assert!(is_media_file(Path::new("/assets/a.jpg")));
        assert!(is_media_file(Path::new("/assets/b.mp4")));
        assert!(!is_media_file(Path::new("/assets/readme.txt")));
        assert!(!is_media_file(Path::new("/assets/bare")));
    }
}
