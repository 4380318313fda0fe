use crate::config::OverlayConfig;
use crate::input::InputEvent;
use crate::surface::{ConfirmGate, DrawingSurface};
use crate::snapshot::Snapshot;
use crate::tool::{BrushSettings, Tool, to_hex_color};
use egui::{Color32, PointerButton};
use uuid::Uuid;

/// One enabled overlay: the drawing surface, its history and the brush.
///
/// Created when drawing is enabled and dropped when it is disabled, which
/// throws away all pixels and history.
pub struct OverlaySession {
    id: Uuid,
    surface: DrawingSurface,
    brush: BrushSettings,
    min_brush_size: f32,
    max_brush_size: f32,
}

impl OverlaySession {
    pub fn new(config: &OverlayConfig, width: u32, height: u32) -> Self {
        let id = Uuid::new_v4();
        log::info!("Overlay session {} started at {}x{}", id, width, height);
        Self {
            id,
            surface: DrawingSurface::new(
                width,
                height,
                config.initial_style(),
                config.max_history_length,
            ),
            brush: config.initial_brush(),
            min_brush_size: config.min_brush_size,
            max_brush_size: config.max_brush_size,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Route one pointer event to the surface
    pub fn handle_input(&mut self, event: &InputEvent) {
        match event {
            InputEvent::PointerDown {
                location,
                button: PointerButton::Primary,
            } => {
                self.surface.begin_stroke(location.position, self.brush.tool);
            }
            InputEvent::PointerMove { location, .. } => {
                self.surface.extend_stroke(location.position);
            }
            InputEvent::PointerUp {
                button: PointerButton::Primary,
                ..
            }
            | InputEvent::PointerLeave { .. } => {
                self.surface.end_stroke();
            }
            _ => {}
        }
    }

    pub fn brush(&self) -> BrushSettings {
        self.brush
    }

    /// Apply every field of `brush`, clamping the size
    pub fn set_brush(&mut self, brush: BrushSettings) {
        self.set_tool(brush.tool);
        self.set_color(brush.color);
        self.set_size(brush.size);
    }

    pub fn set_tool(&mut self, tool: Tool) {
        if self.brush.tool != tool {
            log::debug!("Tool changed to {}", tool.name());
        }
        self.brush.tool = tool;
    }

    pub fn set_color(&mut self, color: Color32) {
        if self.brush.color != color {
            log::debug!("Color changed to {}", to_hex_color(color));
        }
        self.brush.color = color;
        self.surface.set_color(color);
    }

    pub fn set_size(&mut self, size: f32) {
        // Bounds are inverted if the config skipped validation
        let size = size.max(self.min_brush_size).min(self.max_brush_size);
        self.brush.size = size;
        self.surface.set_width(size);
    }

    pub fn undo(&mut self) -> bool {
        self.surface.undo()
    }

    pub fn can_undo(&self) -> bool {
        self.surface.can_undo()
    }

    pub fn clear(&mut self, gate: &mut impl ConfirmGate) -> bool {
        self.surface.clear(gate)
    }

    /// Follow a viewport change. Same-size calls are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if (self.surface.width(), self.surface.height()) == (width, height) {
            return;
        }
        self.surface.resize(width, height);
    }

    /// Current drawing layer, for exporting
    pub fn drawing(&self) -> Snapshot {
        self.surface.snapshot()
    }

    pub fn surface(&self) -> &DrawingSurface {
        &self.surface
    }
}

impl Drop for OverlaySession {
    fn drop(&mut self) {
        log::info!(
            "Overlay session {} ended, dropping {} snapshot(s)",
            self.id,
            self.surface.history().len()
        );
    }
}
