use egui::{Color32, Pos2};
use graffiti_overlay::{DrawingSurface, PaintStyle, Snapshot, SnapshotHistory, Tool};
use image::{Rgba, RgbaImage};

const MAX: usize = 8;

fn surface() -> DrawingSurface {
    let style = PaintStyle {
        color: Color32::from_rgb(255, 0, 0),
        width: 3.0,
    };
    DrawingSurface::new(40, 40, style, MAX)
}

// Stroke `n` is a short horizontal line on its own row
fn stroke(surface: &mut DrawingSurface, n: usize) {
    let y = 2.0 + (n % 12) as f32 * 3.0;
    surface.begin_stroke(Pos2::new(2.0 + n as f32, y), Tool::Pen);
    surface.extend_stroke(Pos2::new(10.0 + n as f32, y));
    surface.end_stroke();
}

#[test]
fn test_n_strokes_give_n_plus_one_snapshots() {
    for n in 0..MAX {
        let mut surface = surface();
        for i in 0..n {
            stroke(&mut surface, i);
        }
        assert_eq!(surface.history().len(), n + 1);
        assert_eq!(surface.history().cursor(), n);
    }
}

#[test]
fn test_overflow_keeps_length_capped() {
    let mut surface = surface();
    for i in 0..MAX * 3 {
        stroke(&mut surface, i);
        assert!(surface.history().len() <= MAX);
    }
    assert_eq!(surface.history().len(), MAX);
    assert_eq!(surface.history().cursor(), MAX - 1);

    // Only MAX - 1 steps back are possible after eviction
    let mut undos = 0;
    while surface.undo() {
        undos += 1;
    }
    assert_eq!(undos, MAX - 1);
}

#[test]
fn test_k_undos_restore_push_n_minus_k() {
    let n = 5;
    let mut surface = surface();
    let mut frames = vec![surface.pixels().clone()];
    for i in 0..n {
        stroke(&mut surface, i);
        frames.push(surface.pixels().clone());
    }

    for k in 1..=n {
        assert!(surface.undo());
        assert_eq!(surface.pixels(), &frames[n - k], "after {} undo(s)", k);
        assert_eq!(surface.history().cursor(), n - k);
    }

    // Past the boundary nothing changes
    let revision = surface.revision();
    assert!(!surface.undo());
    assert!(!surface.undo());
    assert_eq!(surface.pixels(), &frames[0]);
    assert_eq!(surface.revision(), revision);
    assert_eq!(surface.history().len(), n + 1);
}

#[test]
fn test_stroke_after_undo_discards_future() {
    let mut surface = surface();
    stroke(&mut surface, 0);
    stroke(&mut surface, 1);
    stroke(&mut surface, 2);
    let discarded = surface.history().current().unwrap().id();

    surface.undo();
    surface.undo();
    stroke(&mut surface, 7);

    let history = surface.history();
    assert_eq!(history.len(), 3);
    assert_eq!(history.cursor(), 2);
    assert!((0..history.len()).all(|i| history.get(i).unwrap().id() != discarded));
}

#[test]
fn test_eraser_strokes_count_like_pen_strokes() {
    let mut surface = surface();
    stroke(&mut surface, 0);
    surface.begin_stroke(Pos2::new(0.0, 0.0), Tool::Eraser);
    surface.extend_stroke(Pos2::new(39.0, 39.0));
    surface.end_stroke();
    assert_eq!(surface.history().len(), 3);
}

#[test]
fn test_resize_snapshot_matches_new_size() {
    let mut surface = surface();
    stroke(&mut surface, 0);
    let before = surface.pixels().clone();

    surface.resize(25, 60);
    let snapshot = surface.history().current().unwrap();
    assert_eq!(snapshot.dimensions(), (25, 60));
    for y in 0..25 {
        for x in 0..25 {
            assert_eq!(surface.pixels().get_pixel(x, y), before.get_pixel(x, y));
        }
    }
    assert!((40..60).all(|y| surface.pixels().get_pixel(0, y)[3] == 0));
}

#[test]
fn test_history_stands_alone() {
    let mut history = SnapshotHistory::new(2);
    history.push(Snapshot::from_image(RgbaImage::from_pixel(1, 1, Rgba([1, 0, 0, 255]))));
    history.push(Snapshot::from_image(RgbaImage::from_pixel(1, 1, Rgba([2, 0, 0, 255]))));
    history.push(Snapshot::from_image(RgbaImage::from_pixel(1, 1, Rgba([3, 0, 0, 255]))));

    assert_eq!(history.len(), 2);
    assert_eq!(history.undo().unwrap().pixels().get_pixel(0, 0)[0], 2);
    assert!(history.undo().is_none());
}

#[test]
fn test_undo_during_stroke_keeps_pixels_in_step_with_history() {
    let mut surface = surface();
    stroke(&mut surface, 0);

    surface.begin_stroke(Pos2::new(5.0, 30.0), Tool::Pen);
    surface.extend_stroke(Pos2::new(30.0, 30.0));
    assert!(surface.undo());

    let history = surface.history();
    assert!(!surface.is_stroking());
    assert_eq!(history.len(), 3);
    assert_eq!(history.cursor(), 1);
    assert_eq!(surface.pixels(), history.current().unwrap().pixels());
    assert_eq!(surface.pixels().get_pixel(15, 30)[3], 0);

    // The very first stroke, undone while still drawing, lands on the blank frame
    let mut fresh = DrawingSurface::new(20, 20, PaintStyle::default(), MAX);
    fresh.begin_stroke(Pos2::new(2.0, 10.0), Tool::Pen);
    fresh.extend_stroke(Pos2::new(18.0, 10.0));
    assert!(fresh.undo());
    assert_eq!(fresh.history().len(), 2);
    assert_eq!(fresh.history().cursor(), 0);
    assert_eq!(fresh.pixels(), fresh.history().current().unwrap().pixels());
    assert!(fresh.pixels().pixels().all(|p| p[3] == 0));
}
