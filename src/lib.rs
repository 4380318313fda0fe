#![warn(clippy::all, rust_2018_idioms)]

pub mod app;
pub mod config;
pub mod control;
pub mod error;
pub mod export;
pub mod history;
pub mod host;
pub mod input;
pub mod panels;
pub mod raster;
pub mod session;
pub mod snapshot;
pub mod surface;
pub mod tool;
pub mod util;

pub use app::GraffitiApp;
pub use config::OverlayConfig;
pub use control::{ControlMessage, ControlResponse, Overlay};
pub use error::{ConfigError, ExportError};
pub use export::{
    CaptureRequest, CaptureSource, CapturedImage, ChromeState, DownloadSink, ExportKind,
    ExportOutcome, ExportPipeline, FileDownloadSink, OverlayChrome,
};
pub use history::SnapshotHistory;
pub use input::{InputEvent, InputLocation};
pub use session::OverlaySession;
pub use snapshot::Snapshot;
pub use surface::{ConfirmGate, DrawingSurface, PaintStyle};
pub use tool::{BrushSettings, Tool};
