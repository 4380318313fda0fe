use crate::history::SnapshotHistory;
use crate::raster;
use crate::snapshot::Snapshot;
use crate::tool::{BlendMode, Tool};
use egui::{Color32, Pos2};
use image::RgbaImage;

/// Prompt shown before wiping the surface
pub const CLEAR_PROMPT: &str = "Are you sure you want to clear all drawings?";

/// Yes/no decision gate in front of destructive operations
pub trait ConfirmGate {
    fn confirm(&mut self, prompt: &str) -> bool;
}

impl<F: FnMut(&str) -> bool> ConfirmGate for F {
    fn confirm(&mut self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Color and line width applied to every segment.
/// Caps and joins are always round.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaintStyle {
    pub color: Color32,
    pub width: f32,
}

impl Default for PaintStyle {
    fn default() -> Self {
        Self {
            color: Color32::WHITE,
            width: 5.0,
        }
    }
}

// Transient state of one pointer-down-to-up interaction
#[derive(Debug, Clone, Copy)]
struct ActiveStroke {
    last: Pos2,
    mode: BlendMode,
}

/// Pixel canvas that strokes are rasterized into, together with its
/// snapshot history.
///
/// Every completed stroke, clear and resize pushes exactly one snapshot.
pub struct DrawingSurface {
    pixels: RgbaImage,
    style: PaintStyle,
    stroke: Option<ActiveStroke>,
    history: SnapshotHistory,
    /// Bumped on every pixel change so hosts know when to re-upload
    revision: u64,
}

impl DrawingSurface {
    /// Blank surface whose history is seeded with the empty frame
    pub fn new(width: u32, height: u32, style: PaintStyle, max_history: usize) -> Self {
        let pixels = RgbaImage::new(width, height);
        let mut history = SnapshotHistory::new(max_history);
        history.push(Snapshot::capture(&pixels));
        Self {
            pixels,
            style,
            stroke: None,
            history,
            revision: 0,
        }
    }

    /// Start a stroke at `point`. Nothing is drawn until the pointer moves.
    pub fn begin_stroke(&mut self, point: Pos2, tool: Tool) {
        if self.stroke.is_some() {
            // A down without a matching up; close the old stroke first
            self.end_stroke();
        }
        log::debug!("Begin {} stroke at ({:.1}, {:.1})", tool.name(), point.x, point.y);
        self.stroke = Some(ActiveStroke {
            last: point,
            mode: tool.into(),
        });
    }

    /// Draw a segment from the last point to `point`
    pub fn extend_stroke(&mut self, point: Pos2) {
        let Some(stroke) = self.stroke.as_mut() else {
            return;
        };
        raster::stroke_segment(
            &mut self.pixels,
            stroke.last,
            point,
            self.style.width,
            self.style.color,
            stroke.mode,
        );
        stroke.last = point;
        self.revision += 1;
    }

    /// Finalize the active stroke and record it in the history.
    /// Returns false if no stroke was active.
    pub fn end_stroke(&mut self) -> bool {
        if self.stroke.take().is_none() {
            return false;
        }
        self.push_snapshot();
        true
    }

    pub fn is_stroking(&self) -> bool {
        self.stroke.is_some()
    }

    /// Change the surface size, keeping the pixels in the overlapping region
    pub fn resize(&mut self, width: u32, height: u32) {
        self.end_stroke();
        let style = self.style;

        let kept = std::mem::replace(&mut self.pixels, RgbaImage::new(0, 0));
        self.pixels = raster::reframe(&kept, width, height);
        self.set_style(style);
        self.revision += 1;

        log::debug!("Surface resized to {}x{}", width, height);
        self.push_snapshot();
    }

    /// Erase everything after the gate agrees.
    /// Returns false (and changes nothing) when the gate declines.
    pub fn clear(&mut self, gate: &mut impl ConfirmGate) -> bool {
        if !gate.confirm(CLEAR_PROMPT) {
            log::debug!("Clear declined");
            return false;
        }
        self.stroke = None;
        self.pixels.pixels_mut().for_each(|px| px.0 = [0, 0, 0, 0]);
        self.revision += 1;
        self.push_snapshot();
        true
    }

    /// Replace the pixels with a snapshot's content.
    ///
    /// A snapshot taken at another size is anchored top-left and clipped;
    /// the surface keeps its current dimensions.
    pub fn restore(&mut self, snapshot: &Snapshot) {
        if snapshot.dimensions() == self.pixels.dimensions() {
            self.pixels.clone_from(snapshot.pixels());
        } else {
            let (width, height) = self.pixels.dimensions();
            self.pixels = raster::reframe(snapshot.pixels(), width, height);
        }
        self.revision += 1;
    }

    /// Step back one snapshot. Returns false when there is nothing to undo.
    ///
    /// A stroke still in progress is completed first, so it is the step
    /// that gets undone.
    pub fn undo(&mut self) -> bool {
        self.end_stroke();
        let Some(snapshot) = self.history.undo().cloned() else {
            return false;
        };
        self.restore(&snapshot);
        log::debug!("Undo to snapshot {} (cursor {})", snapshot.id(), self.history.cursor());
        true
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn history(&self) -> &SnapshotHistory {
        &self.history
    }

    /// Copy of the current pixels, not recorded in the history
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.pixels)
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn style(&self) -> PaintStyle {
        self.style
    }

    pub fn set_style(&mut self, style: PaintStyle) {
        self.style = style;
    }

    pub fn set_color(&mut self, color: Color32) {
        self.style.color = color;
    }

    pub fn set_width(&mut self, width: f32) {
        self.style.width = width;
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn push_snapshot(&mut self) {
        self.history.push(Snapshot::capture(&self.pixels));
        log::debug!(
            "Snapshot pushed, history {} / cursor {}",
            self.history.len(),
            self.history.cursor()
        );
    }
}
