use crate::config::OverlayConfig;
use crate::control::{ControlMessage, Overlay};
use crate::error::{ConfigResult, ExportResult};
use crate::export::{ExportOutcome, ExportPipeline, FileDownloadSink};
use crate::host::{HostState, ScreenshotCapture, SharedHost, ToolbarChrome};
use crate::input::InputHandler;
use crate::panels::{ToolbarAction, toolbar};
use crate::surface::CLEAR_PROMPT;
use egui::{Color32, ColorImage, Rect, TextureHandle, TextureOptions, pos2, vec2};
use futures::FutureExt;
use futures::future::LocalBoxFuture;
use image::RgbaImage;
use std::path::PathBuf;
use std::task::{Context, Poll};

/// Window size the native host opens with
pub const INITIAL_WINDOW_SIZE: [f32; 2] = [1024.0, 768.0];

/// Native host: a page image with the drawing overlay on top of it.
pub struct GraffitiApp {
    overlay: Overlay,
    input: InputHandler,
    host: SharedHost,
    page: Option<TextureHandle>,
    drawing: Option<TextureHandle>,
    /// Surface revision last uploaded into `drawing`
    drawing_revision: Option<u64>,
    confirm_clear: bool,
    /// Drawing is switched on with the first frame, once the real size is known
    started: bool,
    export_task: Option<LocalBoxFuture<'static, ExportResult<ExportOutcome>>>,
    status: Option<String>,
}

impl GraffitiApp {
    /// Called once before the first frame. Fails on an invalid `config`.
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        config: OverlayConfig,
        page: Option<PathBuf>,
    ) -> ConfigResult<Self> {
        let page = page.and_then(|path| match image::open(&path) {
            Ok(image) => {
                log::info!("Loaded page image {}", path.display());
                Some(load_rgba(&cc.egui_ctx, "graffiti-page", &image.to_rgba8()))
            }
            Err(err) => {
                log::error!("Failed to open page image {}: {}", path.display(), err);
                None
            }
        });

        let [width, height] = INITIAL_WINDOW_SIZE;
        let initial = Rect::from_min_size(pos2(0.0, 0.0), vec2(width, height));
        let (width, height) = viewport_size(initial);

        Ok(Self {
            overlay: Overlay::new(config, width, height)?,
            input: InputHandler::new(initial),
            host: HostState::shared(),
            page,
            drawing: None,
            drawing_revision: None,
            confirm_clear: false,
            started: false,
            export_task: None,
            status: None,
        })
    }

    fn start_export(&mut self, ctx: &egui::Context) {
        if self.export_task.is_some() {
            return;
        }
        let Some(session) = self.overlay.session() else {
            return;
        };
        let config = self.overlay.config();
        let output_dir = config.output_dir.clone().unwrap_or_else(|| PathBuf::from("."));
        let mut pipeline = ExportPipeline::new(
            ScreenshotCapture::new(self.host.clone(), ctx.clone()),
            ToolbarChrome::new(self.host.clone()),
            FileDownloadSink::new(output_dir),
            config,
        );
        let drawing = session.drawing();
        self.export_task = Some(async move { pipeline.export_composite(&drawing).await }.boxed_local());
        self.status = Some("Saving…".to_owned());
    }

    fn poll_export(&mut self, ctx: &egui::Context) {
        let Some(task) = self.export_task.as_mut() else {
            return;
        };
        let mut cx = Context::from_waker(futures::task::noop_waker_ref());
        match task.poll_unpin(&mut cx) {
            Poll::Ready(Ok(outcome)) => {
                self.status = Some(format!("Saved {}", outcome.file_name));
                self.export_task = None;
            }
            Poll::Ready(Err(err)) => {
                log::error!("Export failed: {}", err);
                self.status = Some(format!("Export failed: {}", err));
                self.export_task = None;
            }
            Poll::Pending => ctx.request_repaint(),
        }
    }

    fn collect_screenshots(&mut self, ctx: &egui::Context) {
        ctx.input(|input| {
            for event in &input.raw.events {
                if let egui::Event::Screenshot { image, .. } = event {
                    if !self.host.lock().deliver_screenshot(image) {
                        log::debug!("Ignoring unrequested screenshot");
                    }
                }
            }
        });
    }

    fn handle_pointer(&mut self, ctx: &egui::Context) {
        // The toolbar, confirmation window and control button sit above the canvas
        let blocked = self.confirm_clear || ctx.is_pointer_over_area();
        let events = self.input.process_input(ctx, blocked);
        if let Some(session) = self.overlay.session_mut() {
            for event in &events {
                session.handle_input(event);
            }
        }
    }

    fn upload_drawing(&mut self, ctx: &egui::Context) {
        let Some(session) = self.overlay.session() else {
            self.drawing = None;
            self.drawing_revision = None;
            return;
        };
        let surface = session.surface();
        if self.drawing_revision == Some(surface.revision()) && self.drawing.is_some() {
            return;
        }
        let image = to_color_image(surface.pixels());
        match self.drawing.as_mut() {
            Some(texture) => texture.set(image, TextureOptions::NEAREST),
            None => self.drawing = Some(ctx.load_texture("graffiti-drawing", image, TextureOptions::NEAREST)),
        }
        self.drawing_revision = Some(surface.revision());
    }

    fn paint_canvas(&self, ctx: &egui::Context) {
        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| {
                let screen = ctx.screen_rect();
                let painter = ui.painter();
                match &self.page {
                    Some(page) => painter.image(page.id(), screen, full_uv(), Color32::WHITE),
                    None => painter.rect_filled(screen, 0.0, Color32::from_gray(40)),
                };

                if let (Some(texture), Some(session)) = (&self.drawing, self.overlay.session()) {
                    let surface = session.surface();
                    let rect = Rect::from_min_size(
                        screen.min,
                        vec2(surface.width() as f32, surface.height() as f32),
                    );
                    painter.image(texture.id(), rect, full_uv(), Color32::WHITE);
                }
            });
    }

    fn show_toolbar(&mut self, ctx: &egui::Context) {
        let exporting = self.export_task.is_some();
        let sizes = {
            let config = self.overlay.config();
            config.min_brush_size..=config.max_brush_size
        };
        let Some(session) = self.overlay.session_mut() else {
            return;
        };

        let mut chrome = self.host.lock().chrome();
        let mut brush = session.brush();
        let action = toolbar(ctx, &mut chrome, &mut brush, sizes, session.can_undo(), exporting);
        if !exporting {
            self.host.lock().set_chrome(chrome);
        }
        if brush != session.brush() {
            session.set_brush(brush);
        }

        match action {
            Some(ToolbarAction::Undo) => {
                session.undo();
            }
            Some(ToolbarAction::Clear) => self.confirm_clear = true,
            Some(ToolbarAction::Save) => self.start_export(ctx),
            None => {}
        }
    }

    fn show_clear_confirmation(&mut self, ctx: &egui::Context) {
        if !self.confirm_clear {
            return;
        }
        let mut decision = None;
        egui::Window::new("Clear drawings?")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(CLEAR_PROMPT);
                ui.horizontal(|ui| {
                    if ui.button("Yes").clicked() {
                        decision = Some(true);
                    }
                    if ui.button("No").clicked() {
                        decision = Some(false);
                    }
                });
            });

        if let Some(confirmed) = decision {
            self.confirm_clear = false;
            if let Some(session) = self.overlay.session_mut() {
                session.clear(&mut |_: &str| confirmed);
            }
        }
    }

    fn show_control(&mut self, ctx: &egui::Context) {
        if self.export_task.is_some() {
            return;
        }
        let enabled = self.overlay.is_enabled();
        let mut message = None;
        egui::Area::new(egui::Id::new("graffiti_control"))
            .anchor(egui::Align2::RIGHT_TOP, [-12.0, 12.0])
            .show(ctx, |ui| {
                let label = if enabled { "Disable drawing" } else { "Enable drawing" };
                if ui.button(label).clicked() {
                    message = Some(if enabled {
                        ControlMessage::Disable
                    } else {
                        ControlMessage::Enable
                    });
                }
                if let Some(status) = &self.status {
                    ui.label(status);
                }
            });

        if let Some(message) = message {
            let response = self.overlay.handle_message(message);
            log::info!("{:?} -> enabled: {}", message, response.enabled);
            if !response.enabled {
                self.confirm_clear = false;
            }
        }
    }
}

impl eframe::App for GraffitiApp {
    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.host.lock().begin_frame();
        self.collect_screenshots(ctx);

        let screen = ctx.screen_rect();
        let (width, height) = viewport_size(screen);
        self.overlay.set_viewport(width, height);
        self.input.set_canvas_rect(screen);
        if !self.started {
            self.overlay.enable();
            self.started = true;
        }

        if ctx.input_mut(|input| input.consume_key(egui::Modifiers::COMMAND, egui::Key::Z)) {
            if let Some(session) = self.overlay.session_mut() {
                session.undo();
            }
        }

        self.handle_pointer(ctx);
        self.upload_drawing(ctx);
        self.paint_canvas(ctx);
        self.show_toolbar(ctx);
        self.show_clear_confirmation(ctx);
        self.show_control(ctx);

        self.poll_export(ctx);
    }
}

fn full_uv() -> Rect {
    Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0))
}

fn viewport_size(screen: Rect) -> (u32, u32) {
    (screen.width().round().max(1.0) as u32, screen.height().round().max(1.0) as u32)
}

fn to_color_image(pixels: &RgbaImage) -> ColorImage {
    let (width, height) = pixels.dimensions();
    ColorImage::from_rgba_unmultiplied([width as usize, height as usize], pixels.as_raw())
}

fn load_rgba(ctx: &egui::Context, name: &str, pixels: &RgbaImage) -> TextureHandle {
    ctx.load_texture(name, to_color_image(pixels), TextureOptions::LINEAR)
}
