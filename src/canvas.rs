use image::{Rgba, RgbaImage};

// ============================================================================
// COLOR & COORDINATES
// ============================================================================

/// A straight (non-premultiplied) RGBA color, one byte per channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

impl From<Rgba<u8>> for Color {
    fn from(p: Rgba<u8>) -> Self {
        Self::rgba(p[0], p[1], p[2], p[3])
    }
}

impl From<Color> for Rgba<u8> {
    fn from(c: Color) -> Self {
        Rgba([c.r, c.g, c.b, c.a])
    }
}

/// Integer pixel position. Signed so that clicks landing left of / above the
/// image can be represented (and rejected) without wrapping.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Coordinate {
    pub x: i64,
    pub y: i64,
}

impl Coordinate {
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

// ============================================================================
// TOLERANCE
// ============================================================================

/// Largest possible distance between two RGBA colors: sqrt(4 * 255²).
pub const MAX_COLOR_DISTANCE: f32 = 510.0;

/// Lower end of the tolerance slider.
pub const TOLERANCE_MIN: f32 = 5.0;
/// Upper end of the tolerance slider.
pub const TOLERANCE_MAX: f32 = 100.0;

/// Maximum color distance a neighbor may have from the seed color to join a
/// selection.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct Tolerance(f32);

impl Tolerance {
    pub const DEFAULT: Tolerance = Tolerance(30.0);

    /// Exact tolerance, clamped to `[0, MAX_COLOR_DISTANCE]`. NaN becomes 0.
    pub fn new(value: f32) -> Self {
        if value.is_nan() {
            return Self(0.0);
        }
        Self(value.clamp(0.0, MAX_COLOR_DISTANCE))
    }

    /// Tolerance coming from the UI slider, clamped to `[TOLERANCE_MIN, TOLERANCE_MAX]`.
    pub fn from_ui(value: f32) -> Self {
        if value.is_nan() {
            return Self::DEFAULT;
        }
        Self(value.clamp(TOLERANCE_MIN, TOLERANCE_MAX))
    }

    pub fn value(self) -> f32 {
        self.0
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}

// ============================================================================
// RASTER BUFFER
// ============================================================================

/// Dense RGBA8 raster. Once handed to the history it is never mutated again;
/// every edit produces a fresh buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RasterBuffer {
    pixels: RgbaImage,
}

impl RasterBuffer {
    /// Fully transparent buffer.
    pub fn new(width: u32, height: u32) -> Self {
        Self { pixels: RgbaImage::new(width, height) }
    }

    /// Buffer filled with a single color.
    pub fn filled(width: u32, height: u32, color: Color) -> Self {
        Self { pixels: RgbaImage::from_pixel(width, height, color.into()) }
    }

    /// Wrap raw RGBA bytes. Returns `None` when the length is not `width * height * 4`.
    pub fn from_raw(width: u32, height: u32, bytes: Vec<u8>) -> Option<Self> {
        RgbaImage::from_raw(width, height, bytes).map(|pixels| Self { pixels })
    }

    pub fn from_image(pixels: RgbaImage) -> Self {
        Self { pixels }
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

    /// Whether `coord` addresses a pixel inside the buffer.
    pub fn contains(&self, coord: Coordinate) -> bool {
        coord.x >= 0
            && coord.y >= 0
            && coord.x < self.width() as i64
            && coord.y < self.height() as i64
    }

    /// Pixel at `coord`, or `None` when out of bounds.
    pub fn get(&self, coord: Coordinate) -> Option<Color> {
        if !self.contains(coord) {
            return None;
        }
        Some((*self.pixels.get_pixel(coord.x as u32, coord.y as u32)).into())
    }

    /// Pixel at an in-bounds position. Panics when out of bounds.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> Color {
        (*self.pixels.get_pixel(x, y)).into()
    }

    /// Set a pixel. Only for buffers that have not been published yet.
    pub fn put(&mut self, x: u32, y: u32, color: Color) {
        self.pixels.put_pixel(x, y, color.into());
    }

    pub fn as_raw(&self) -> &[u8] {
        self.pixels.as_raw()
    }

    pub(crate) fn as_raw_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    /// Size of the pixel data in bytes.
    pub fn memory_bytes(&self) -> usize {
        self.pixels.as_raw().len()
    }
}
