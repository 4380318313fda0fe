use image::RgbaImage;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

// Static counter for generating unique IDs
static NEXT_SNAPSHOT_ID: AtomicUsize = AtomicUsize::new(1);

/// Immutable full-frame copy of the drawing surface.
///
/// Pixels are straight (non-premultiplied) RGBA. Cloning shares the buffer.
#[derive(Clone)]
pub struct Snapshot {
    id: usize,
    pixels: Arc<RgbaImage>,
}

impl Snapshot {
    /// Copy `pixels` into a new snapshot
    pub fn capture(pixels: &RgbaImage) -> Self {
        Self::from_image(pixels.clone())
    }

    /// Take ownership of an already detached buffer
    pub fn from_image(pixels: RgbaImage) -> Self {
        let id = NEXT_SNAPSHOT_ID.fetch_add(1, Ordering::SeqCst);
        Self {
            id,
            pixels: Arc::new(pixels),
        }
    }

    pub fn id(&self) -> usize {
        self.id
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

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }
}

impl std::fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Snapshot")
            .field("id", &self.id)
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}
