use crate::export::ChromeState;
use crate::tool::{BrushSettings, Tool};
use egui::{Button, Slider};
use std::ops::RangeInclusive;

/// Buttons on the toolbar that the app acts on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolbarAction {
    Undo,
    Save,
    Clear,
}

/// Floating toolbar with tool, color and size pickers plus the actions.
///
/// Edits `brush` and `chrome.minimized` in place. Nothing is shown while
/// `chrome.visible` is false.
pub fn toolbar(
    ctx: &egui::Context,
    chrome: &mut ChromeState,
    brush: &mut BrushSettings,
    sizes: RangeInclusive<f32>,
    can_undo: bool,
    exporting: bool,
) -> Option<ToolbarAction> {
    if !chrome.visible {
        return None;
    }

    let mut action = None;
    egui::Window::new("✨ GraffitiTab")
        .id(egui::Id::new("graffiti_toolbar"))
        .default_pos(egui::pos2(16.0, 16.0))
        .resizable(false)
        .collapsible(false)
        .title_bar(!chrome.minimized)
        .show(ctx, |ui| {
            if chrome.minimized {
                if ui.button("✨").on_hover_text("Expand toolbar").clicked() {
                    chrome.minimized = false;
                }
                return;
            }

            ui.horizontal(|ui| {
                ui.selectable_value(&mut brush.tool, Tool::Pen, "✏ Pen");
                ui.selectable_value(&mut brush.tool, Tool::Eraser, "⌫ Eraser");
                if ui.small_button("−").on_hover_text("Minimize").clicked() {
                    chrome.minimized = true;
                }
            });
            ui.separator();

            ui.horizontal(|ui| {
                ui.label("Color:");
                egui::color_picker::color_edit_button_srgba(
                    ui,
                    &mut brush.color,
                    egui::color_picker::Alpha::Opaque,
                );
            });
            ui.horizontal(|ui| {
                ui.label("Size:");
                ui.add(Slider::new(&mut brush.size, sizes).suffix("px"));
            });
            ui.separator();

            ui.horizontal(|ui| {
                if ui
                    .add_enabled(can_undo, Button::new("↶ Undo"))
                    .on_hover_text("Undo last action (Ctrl+Z)")
                    .clicked()
                {
                    action = Some(ToolbarAction::Undo);
                }
                if ui
                    .add_enabled(!exporting, Button::new("💾 Save PNG"))
                    .clicked()
                {
                    action = Some(ToolbarAction::Save);
                }
                if ui.button("🗑 Clear All").clicked() {
                    action = Some(ToolbarAction::Clear);
                }
            });
        });

    action
}
