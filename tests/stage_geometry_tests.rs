use signage_player::config::FitMode;
use signage_player::geometry::{
    DEFAULT_MEDIA_ASPECT, MIN_STAGE_HEIGHT, MIN_STAGE_WIDTH, Region, clamp_container_aspect,
    clamp_zoom, compute_stage_size,
};

fn assert_aspect_preserved(aspect: f32, w: u32, h: u32) {
    // Compare ratios within a small epsilon
    let actual = w as f32 / h as f32;
    assert!(
        (actual - aspect).abs() < 0.01,
        "aspect changed: {} vs {}",
        actual,
        aspect
    );
}

#[test]
fn wide_media_is_height_capped_in_a_landscape_region() {
    let avail = Region {
        width: 1200,
        height: 700,
    };
    let size = compute_stage_size(16.0 / 9.0, avail, 1080, 2400, 0.78);
    // Width cap is 1176 (98% of the region), height cap is 658 (94% of the
    // region, tighter than 78% of the viewport). Height binds.
    assert_eq!((size.width, size.height), (1170, 658));
    assert_aspect_preserved(16.0 / 9.0, size.width, size.height);
}

#[test]
fn narrow_region_is_width_capped() {
    let avail = Region {
        width: 800,
        height: 2000,
    };
    let size = compute_stage_size(16.0 / 9.0, avail, 2400, 2400, 0.9);
    assert_eq!(size.width, 784);
    assert_eq!(size.height, 441);
    assert_aspect_preserved(16.0 / 9.0, size.width, size.height);
}

#[test]
fn configured_max_width_binds_on_huge_regions() {
    let avail = Region {
        width: 8000,
        height: 4000,
    };
    let size = compute_stage_size(2.0, avail, 4000, 2400, 0.9);
    assert_eq!(size.width, 2400);
    assert_eq!(size.height, 1200);
}

#[test]
fn degenerate_container_applies_floors() {
    let avail = Region {
        width: 0,
        height: 0,
    };
    let size = compute_stage_size(16.0 / 9.0, avail, 1080, 2400, 0.78);
    assert_eq!(size.width, MIN_STAGE_WIDTH);
    assert_eq!(size.height, MIN_STAGE_HEIGHT);
}

#[test]
fn caps_and_floors_hold_for_arbitrary_regions() {
    let cases = [
        (1u32, 1u32),
        (100, 5000),
        (5000, 100),
        (1920, 1080),
        (640, 480),
        (3840, 2160),
    ];
    for (w, h) in cases {
        let avail = Region {
            width: w,
            height: h,
        };
        let size = compute_stage_size(16.0 / 9.0, avail, 1080, 2400, 0.78);
        assert!(size.width >= MIN_STAGE_WIDTH, "width floor for {w}x{h}");
        assert!(size.height >= MIN_STAGE_HEIGHT, "height floor for {w}x{h}");
        assert!(size.width <= 2400, "width cap for {w}x{h}");
    }
}

#[test]
fn nonsense_aspect_falls_back_to_default() {
    let avail = Region {
        width: 1200,
        height: 700,
    };
    let fallback = compute_stage_size(f32::NAN, avail, 1080, 2400, 0.78);
    let expected = compute_stage_size(DEFAULT_MEDIA_ASPECT, avail, 1080, 2400, 0.78);
    assert_eq!(fallback, expected);

    let negative = compute_stage_size(-2.0, avail, 1080, 2400, 0.78);
    assert_eq!(negative, expected);
}

#[test]
fn container_aspect_is_clamped_to_the_sane_range() {
    assert_eq!(clamp_container_aspect(10.0), 2.4);
    assert_eq!(clamp_container_aspect(0.1), 0.45);
    assert_eq!(clamp_container_aspect(1.5), 1.5);
    assert_eq!(clamp_container_aspect(f32::NAN), DEFAULT_MEDIA_ASPECT);
}

#[test]
fn contain_mode_disallows_zooming_in() {
    assert_eq!(clamp_zoom(1.08, FitMode::Contain), 1.0);
    assert_eq!(clamp_zoom(0.8, FitMode::Contain), 0.8);
    assert_eq!(clamp_zoom(0.1, FitMode::Contain), 0.5);
}

#[test]
fn cover_mode_allows_zoom_in_either_direction_within_bounds() {
    assert_eq!(clamp_zoom(1.08, FitMode::Cover), 1.08);
    assert_eq!(clamp_zoom(0.9, FitMode::Cover), 0.9);
    assert_eq!(clamp_zoom(3.0, FitMode::Cover), 1.5);
    assert_eq!(clamp_zoom(f32::NAN, FitMode::Cover), 1.0);
}
