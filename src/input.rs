use egui::{Context, PointerButton, Pos2, Rect};

/// Represents the location where an input event occurred
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputLocation {
    /// The position in surface coordinates
    pub position: Pos2,
    /// Whether this position is within the surface bounds
    pub is_in_canvas: bool,
}

/// Pointer events the overlay reacts to.
///
/// Only one pointer stream is tracked; multi-touch collapses into it.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Pointer button was pressed
    PointerDown {
        location: InputLocation,
        button: PointerButton,
    },
    /// Pointer button was released
    PointerUp {
        location: InputLocation,
        button: PointerButton,
    },
    /// Pointer moved (with or without buttons pressed)
    PointerMove {
        location: InputLocation,
        /// Buttons that are currently held down
        held_buttons: Vec<PointerButton>,
    },
    /// Pointer left the surface
    PointerLeave { last_known_location: InputLocation },
}

impl InputEvent {
    /// Helper to check if an input event occurred within the canvas
    pub fn is_in_canvas(&self) -> bool {
        match self {
            InputEvent::PointerDown { location, .. }
            | InputEvent::PointerUp { location, .. }
            | InputEvent::PointerMove { location, .. } => location.is_in_canvas,
            InputEvent::PointerLeave { last_known_location } => last_known_location.is_in_canvas,
        }
    }
}

/// Converts raw egui pointer state into `InputEvent`s in surface coordinates
pub struct InputHandler {
    last_pointer_pos: Option<Pos2>,
    canvas_rect: Rect,
}

impl InputHandler {
    pub fn new(canvas_rect: Rect) -> Self {
        Self {
            last_pointer_pos: None,
            canvas_rect,
        }
    }

    /// Update the canvas rectangle (e.g. if window is resized)
    pub fn set_canvas_rect(&mut self, rect: Rect) {
        self.canvas_rect = rect;
    }

    /// Creates an InputLocation from a screen position
    fn make_location(&self, pos: Pos2) -> InputLocation {
        InputLocation {
            position: (pos - self.canvas_rect.min).to_pos2(),
            is_in_canvas: self.canvas_rect.contains(pos),
        }
    }

    /// Process raw egui input and generate our InputEvents.
    ///
    /// `blocked` is true while the pointer is over UI drawn above the
    /// canvas (the toolbar); the canvas then sees the pointer as gone.
    pub fn process_input(&mut self, ctx: &Context, blocked: bool) -> Vec<InputEvent> {
        let mut events = Vec::new();

        ctx.input(|input| {
            let hover = input
                .pointer
                .hover_pos()
                .filter(|pos| !blocked && self.canvas_rect.contains(*pos));

            match (hover, self.last_pointer_pos) {
                (Some(pos), last) if Some(pos) != last => {
                    let mut held_buttons = Vec::new();
                    for button in [PointerButton::Primary, PointerButton::Secondary, PointerButton::Middle] {
                        if input.pointer.button_down(button) {
                            held_buttons.push(button);
                        }
                    }
                    events.push(InputEvent::PointerMove {
                        location: self.make_location(pos),
                        held_buttons,
                    });
                }
                (None, Some(last)) => {
                    events.push(InputEvent::PointerLeave {
                        last_known_location: self.make_location(last),
                    });
                }
                _ => {}
            }
            self.last_pointer_pos = hover;

            let Some(pos) = hover else {
                return;
            };
            for button in [PointerButton::Primary, PointerButton::Secondary, PointerButton::Middle] {
                if input.pointer.button_pressed(button) {
                    events.push(InputEvent::PointerDown {
                        location: self.make_location(pos),
                        button,
                    });
                }
                if input.pointer.button_released(button) {
                    events.push(InputEvent::PointerUp {
                        location: self.make_location(pos),
                        button,
                    });
                }
            }
        });

        events
    }
}
