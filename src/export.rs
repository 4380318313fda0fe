//! Saving the annotated page as a PNG.
//!
//! The pipeline hides the overlay's toolbar, waits for the hidden state to
//! reach the screen, asks the capture collaborator for a screenshot, puts the
//! toolbar back, and composites the drawing over the screenshot. When there
//! is no usable screenshot it saves the drawing layer alone.

use crate::config::OverlayConfig;
use crate::error::{CaptureDecodeError, ExportError, ExportResult};
use crate::raster;
use crate::snapshot::Snapshot;
use crate::util::time::unique_timestamp_millis;
use base64::Engine;
use image::{ImageFormat, RgbaImage};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::io::Cursor;
use std::path::PathBuf;
use std::time::Duration;

/// Request sent to the capture collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum CaptureRequest {
    #[serde(rename = "captureVisibleTab")]
    CaptureVisibleTab,
}

/// A screenshot handed back by the capture collaborator
#[derive(Debug, Clone)]
pub enum CapturedImage {
    /// `data:image/...;base64,...`
    DataUrl(String),
    /// Already decoded straight-alpha pixels
    Pixels(RgbaImage),
}

impl CapturedImage {
    pub fn decode(self) -> Result<RgbaImage, CaptureDecodeError> {
        let pixels = match self {
            CapturedImage::DataUrl(url) => {
                let bytes = decode_data_url(&url)?;
                image::load_from_memory(&bytes)?.to_rgba8()
            }
            CapturedImage::Pixels(pixels) => pixels,
        };
        if pixels.width() == 0 || pixels.height() == 0 {
            return Err(CaptureDecodeError::Empty);
        }
        Ok(pixels)
    }
}

/// Payload bytes of a base64 `data:` URL
pub fn decode_data_url(url: &str) -> Result<Vec<u8>, CaptureDecodeError> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| CaptureDecodeError::NotDataUrl(url.chars().take(32).collect()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| CaptureDecodeError::NotDataUrl(url.chars().take(32).collect()))?;
    if !header.ends_with(";base64") {
        return Err(CaptureDecodeError::NotBase64);
    }
    Ok(base64::engine::general_purpose::STANDARD.decode(payload.trim())?)
}

/// Supplies a raster of the visible page
pub trait CaptureSource {
    /// Resolves to `None` when no screenshot could be taken
    fn capture(&mut self, request: CaptureRequest) -> impl Future<Output = Option<CapturedImage>>;
}

/// Visibility of UI drawn in the same layer as the drawing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChromeState {
    pub visible: bool,
    pub minimized: bool,
}

impl ChromeState {
    pub const HIDDEN: ChromeState = ChromeState {
        visible: false,
        minimized: false,
    };
}

/// The overlay's own UI (toolbar) that must stay out of screenshots
pub trait OverlayChrome {
    fn chrome_state(&self) -> ChromeState;

    fn apply_chrome_state(&mut self, state: ChromeState);

    /// Resolves once the current chrome state has been presented on screen
    /// and at least `settle` has passed since it was applied.
    fn hidden_presented(&mut self, settle: Duration) -> impl Future<Output = ()>;
}

/// Receives the finished PNG
pub trait DownloadSink {
    fn save(&mut self, file_name: &str, png: &[u8]) -> ExportResult<()>;
}

/// Writes exports into a directory
#[derive(Debug, Clone)]
pub struct FileDownloadSink {
    dir: PathBuf,
}

impl FileDownloadSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl DownloadSink for FileDownloadSink {
    fn save(&mut self, file_name: &str, png: &[u8]) -> ExportResult<()> {
        let path = self.dir.join(file_name);
        std::fs::create_dir_all(&self.dir)
            .and_then(|_| std::fs::write(&path, png))
            .map_err(|source| ExportError::Download {
                file_name: file_name.to_owned(),
                source,
            })?;
        log::info!("Saved {} ({} bytes)", path.display(), png.len());
        Ok(())
    }
}

/// Why the background was left out of an export
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    CaptureFailed,
    DecodeFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    /// Screenshot with the drawing on top
    Composite,
    /// Drawing layer on a transparent background
    DrawingOnly(FallbackReason),
}

/// What an export produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOutcome {
    pub file_name: String,
    pub kind: ExportKind,
    pub width: u32,
    pub height: u32,
}

// Hides the chrome for as long as it lives, restoring the prior state on
// every exit path including a dropped future.
struct ChromeGuard<'a, H: OverlayChrome> {
    chrome: &'a mut H,
    prior: ChromeState,
}

impl<'a, H: OverlayChrome> ChromeGuard<'a, H> {
    fn hide(chrome: &'a mut H) -> Self {
        let prior = chrome.chrome_state();
        chrome.apply_chrome_state(ChromeState::HIDDEN);
        Self { chrome, prior }
    }
}

impl<H: OverlayChrome> Drop for ChromeGuard<'_, H> {
    fn drop(&mut self) {
        self.chrome.apply_chrome_state(self.prior);
    }
}

/// Composite export flow over pluggable collaborators.
pub struct ExportPipeline<C, H, S> {
    capture: C,
    chrome: H,
    sink: S,
    file_prefix: String,
    settle: Duration,
}

impl<C, H, S> ExportPipeline<C, H, S>
where
    C: CaptureSource,
    H: OverlayChrome,
    S: DownloadSink,
{
    pub fn new(capture: C, chrome: H, sink: S, config: &OverlayConfig) -> Self {
        Self {
            capture,
            chrome,
            sink,
            file_prefix: config.file_prefix.clone(),
            settle: config.capture_settle(),
        }
    }

    /// Save the page screenshot with `drawing` on top, or the drawing alone
    /// when no screenshot is available.
    ///
    /// The output has the drawing's dimensions; the screenshot is scaled to
    /// fit. Only encoding and saving can fail.
    pub async fn export_composite(&mut self, drawing: &Snapshot) -> ExportResult<ExportOutcome> {
        let captured = {
            let mut guard = ChromeGuard::hide(&mut self.chrome);
            guard.chrome.hidden_presented(self.settle).await;
            self.capture.capture(CaptureRequest::CaptureVisibleTab).await
        };

        let Some(captured) = captured else {
            log::warn!("Page capture failed, saving drawings only");
            return self.save_drawing_only(drawing, FallbackReason::CaptureFailed);
        };

        let background = match captured.decode() {
            Ok(background) => background,
            Err(err) => {
                log::warn!("Captured page could not be decoded ({}), saving drawings only", err);
                return self.save_drawing_only(drawing, FallbackReason::DecodeFailed);
            }
        };

        let (width, height) = drawing.dimensions();
        let composite = raster::composite_over(&background, drawing.pixels(), width, height);
        let file_name = format!("{}-{}.png", self.file_prefix, unique_timestamp_millis());
        self.sink.save(&file_name, &encode_png(&composite)?)?;

        Ok(ExportOutcome {
            file_name,
            kind: ExportKind::Composite,
            width,
            height,
        })
    }

    /// Save the drawing layer on a transparent background
    pub fn save_drawing_only(
        &mut self,
        drawing: &Snapshot,
        reason: FallbackReason,
    ) -> ExportResult<ExportOutcome> {
        let file_name = format!("{}-drawings-{}.png", self.file_prefix, unique_timestamp_millis());
        self.sink.save(&file_name, &encode_png(drawing.pixels())?)?;

        Ok(ExportOutcome {
            file_name,
            kind: ExportKind::DrawingOnly(reason),
            width: drawing.width(),
            height: drawing.height(),
        })
    }

    pub fn chrome(&self) -> &H {
        &self.chrome
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}

/// Encode straight-alpha pixels as PNG
pub fn encode_png(pixels: &RgbaImage) -> ExportResult<Vec<u8>> {
    let mut bytes = Vec::new();
    pixels.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

/// Wrap PNG bytes in a `data:` URL
pub fn to_data_url(png: &[u8]) -> String {
    format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(png)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_capture_request_wire_format() {
        assert_eq!(
            serde_json::to_string(&CaptureRequest::CaptureVisibleTab).unwrap(),
            r#"{"action":"captureVisibleTab"}"#
        );
    }

    #[test]
    fn test_decode_data_url() {
        let pixels = RgbaImage::from_pixel(3, 2, Rgba([1, 2, 3, 255]));
        let url = to_data_url(&encode_png(&pixels).unwrap());

        let decoded = CapturedImage::DataUrl(url).decode().unwrap();
        assert_eq!(decoded, pixels);
    }

    #[test]
    fn test_decode_rejects_bad_urls() {
        assert!(matches!(
            decode_data_url("http://example.com/a.png"),
            Err(CaptureDecodeError::NotDataUrl(_))
        ));
        assert!(matches!(
            decode_data_url("data:image/png,rawbytes"),
            Err(CaptureDecodeError::NotBase64)
        ));
        assert!(matches!(
            decode_data_url("data:image/png;base64,@@@"),
            Err(CaptureDecodeError::Base64(_))
        ));
        assert!(matches!(
            CapturedImage::DataUrl("data:image/png;base64,aGVsbG8=".to_owned()).decode(),
            Err(CaptureDecodeError::Image(_))
        ));
        assert!(matches!(
            CapturedImage::Pixels(RgbaImage::new(0, 0)).decode(),
            Err(CaptureDecodeError::Empty)
        ));
    }
}
