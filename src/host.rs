//! Collaborators backed by the native eframe window.
//!
//! Both halves share one `HostState` with the app: the app reports presented
//! frames and delivered screenshots into it, the export pipeline reads them
//! back through `ToolbarChrome` and `ScreenshotCapture`.

use crate::export::{CaptureRequest, CaptureSource, CapturedImage, ChromeState, OverlayChrome};
use crate::util::time::current_time_millis;
use image::RgbaImage;
use parking_lot::Mutex;
use std::future::Future;
use std::sync::Arc;
use std::task::Poll;
use std::time::Duration;

/// Screenshots that take longer than this are treated as failed
pub const CAPTURE_TIMEOUT: Duration = Duration::from_secs(5);

// Frames that must start after a chrome change before the change is known
// to be on screen: the frame that draws it, then the one after it.
const FRAMES_UNTIL_PRESENTED: u64 = 2;

pub struct HostState {
    chrome: ChromeState,
    /// Epoch millis of the last chrome change
    chrome_changed_at: u64,
    frames_since_change: u64,
    awaiting_screenshot: bool,
    screenshot: Option<CapturedImage>,
}

pub type SharedHost = Arc<Mutex<HostState>>;

impl HostState {
    pub fn shared() -> SharedHost {
        Arc::new(Mutex::new(Self {
            chrome: ChromeState {
                visible: true,
                minimized: false,
            },
            chrome_changed_at: current_time_millis(),
            frames_since_change: 0,
            awaiting_screenshot: false,
            screenshot: None,
        }))
    }

    pub fn chrome(&self) -> ChromeState {
        self.chrome
    }

    pub fn set_chrome(&mut self, state: ChromeState) {
        if self.chrome != state {
            self.chrome = state;
            self.chrome_changed_at = current_time_millis();
            self.frames_since_change = 0;
        }
    }

    /// Called at the start of every frame
    pub fn begin_frame(&mut self) {
        self.frames_since_change += 1;
    }

    pub fn awaiting_screenshot(&self) -> bool {
        self.awaiting_screenshot
    }

    /// Hand over a screenshot if one was asked for. Returns false otherwise.
    pub fn deliver_screenshot(&mut self, image: &egui::ColorImage) -> bool {
        if !self.awaiting_screenshot {
            return false;
        }
        self.awaiting_screenshot = false;
        match color_image_to_rgba(image) {
            Some(pixels) => self.screenshot = Some(CapturedImage::Pixels(pixels)),
            None => log::warn!("Screenshot has inconsistent size {:?}", image.size),
        }
        true
    }

    fn presented_for(&self, settle: Duration) -> bool {
        let elapsed = current_time_millis().saturating_sub(self.chrome_changed_at);
        self.frames_since_change >= FRAMES_UNTIL_PRESENTED && u128::from(elapsed) >= settle.as_millis()
    }
}

/// Convert egui's screenshot into straight-alpha pixels
pub fn color_image_to_rgba(image: &egui::ColorImage) -> Option<RgbaImage> {
    let [width, height] = image.size;
    let bytes = image
        .pixels
        .iter()
        .flat_map(|color| color.to_srgba_unmultiplied())
        .collect();
    RgbaImage::from_raw(width as u32, height as u32, bytes)
}

/// The floating toolbar as seen by the export pipeline
pub struct ToolbarChrome {
    shared: SharedHost,
}

impl ToolbarChrome {
    pub fn new(shared: SharedHost) -> Self {
        Self { shared }
    }
}

impl OverlayChrome for ToolbarChrome {
    fn chrome_state(&self) -> ChromeState {
        self.shared.lock().chrome()
    }

    fn apply_chrome_state(&mut self, state: ChromeState) {
        self.shared.lock().set_chrome(state);
    }

    fn hidden_presented(&mut self, settle: Duration) -> impl Future<Output = ()> {
        let shared = self.shared.clone();
        // The app polls every frame while an export runs, so no waker is kept.
        futures::future::poll_fn(move |_cx| {
            if shared.lock().presented_for(settle) {
                Poll::Ready(())
            } else {
                Poll::Pending
            }
        })
    }
}

/// Takes a screenshot of the whole viewport
pub struct ScreenshotCapture {
    shared: SharedHost,
    ctx: egui::Context,
}

impl ScreenshotCapture {
    pub fn new(shared: SharedHost, ctx: egui::Context) -> Self {
        Self { shared, ctx }
    }
}

impl CaptureSource for ScreenshotCapture {
    fn capture(&mut self, request: CaptureRequest) -> impl Future<Output = Option<CapturedImage>> {
        log::debug!("Capture requested: {:?}", request);
        {
            let mut host = self.shared.lock();
            host.screenshot = None;
            host.awaiting_screenshot = true;
        }
        self.ctx
            .send_viewport_cmd(egui::ViewportCommand::Screenshot(egui::UserData::default()));
        self.ctx.request_repaint();

        let shared = self.shared.clone();
        let deadline = current_time_millis().saturating_add(CAPTURE_TIMEOUT.as_millis() as u64);
        futures::future::poll_fn(move |_cx| {
            let mut host = shared.lock();
            if let Some(image) = host.screenshot.take() {
                Poll::Ready(Some(image))
            } else if !host.awaiting_screenshot {
                // Delivered but unusable
                Poll::Ready(None)
            } else if current_time_millis() >= deadline {
                log::warn!("No screenshot after {:?}", CAPTURE_TIMEOUT);
                host.awaiting_screenshot = false;
                Poll::Ready(None)
            } else {
                Poll::Pending
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::{Color32, ColorImage};

    #[test]
    fn test_chrome_presented_after_two_frames() {
        let shared = HostState::shared();
        let mut chrome = ToolbarChrome::new(shared.clone());
        chrome.apply_chrome_state(ChromeState::HIDDEN);
        assert_eq!(chrome.chrome_state(), ChromeState::HIDDEN);

        assert!(!shared.lock().presented_for(Duration::ZERO));
        shared.lock().begin_frame();
        assert!(!shared.lock().presented_for(Duration::ZERO));
        shared.lock().begin_frame();
        assert!(shared.lock().presented_for(Duration::ZERO));
        assert!(!shared.lock().presented_for(Duration::from_secs(3600)));
    }

    #[test]
    fn test_chrome_change_is_stamped_in_epoch_millis() {
        let shared = HostState::shared();
        let before = current_time_millis();
        shared.lock().set_chrome(ChromeState::HIDDEN);
        let stamped = shared.lock().chrome_changed_at;
        assert!(stamped >= before && stamped <= current_time_millis());

        // Re-applying the same state keeps the original stamp
        shared.lock().begin_frame();
        shared.lock().set_chrome(ChromeState::HIDDEN);
        assert_eq!(shared.lock().chrome_changed_at, stamped);
        assert_eq!(shared.lock().frames_since_change, 1);
    }

    #[test]
    fn test_screenshot_only_delivered_when_requested() {
        let shared = HostState::shared();
        let image = ColorImage::new([2, 2], Color32::RED);
        assert!(!shared.lock().deliver_screenshot(&image));

        shared.lock().awaiting_screenshot = true;
        assert!(shared.lock().deliver_screenshot(&image));
        assert!(!shared.lock().awaiting_screenshot());
        assert!(matches!(shared.lock().screenshot, Some(CapturedImage::Pixels(_))));
    }

    #[test]
    fn test_color_image_to_rgba() {
        let image = ColorImage::new([3, 1], Color32::from_rgb(10, 20, 30));
        let pixels = color_image_to_rgba(&image).unwrap();
        assert_eq!(pixels.dimensions(), (3, 1));
        assert_eq!(pixels.get_pixel(2, 0).0, [10, 20, 30, 255]);
    }
}
