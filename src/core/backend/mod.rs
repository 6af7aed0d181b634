//=========================================================================
// Collaborator Interfaces
//=========================================================================
//
// Contract between the character core and the outside world.
//
// The core never rasterizes, mixes audio or touches device pins itself.
// It talks to three collaborators, each injected into the `Stage`:
//
// ```text
//   Character ──► Renderer         (surfaces, fonts, sprite draw, viewport)
//             ──► AudioBackend     (load sound, fire-and-forget playback)
//             ──► HardwareBackend  (device handles, sensor/pin events)
// ```
//
// All collaborators must be `Send + Sync`: handler tasks run on their own
// threads and call into them while holding the scheduler baton.
//
// `headless` provides in-memory implementations that record every call.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::fmt;
use std::path::{Path, PathBuf};

//=== Module Declarations =================================================

pub mod headless;

//=== Handles =============================================================

/// Opaque drawable surface owned by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceHandle {
    pub id: u64,
    pub width: u32,
    pub height: u32,
}

/// Opaque rasterized font owned by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FontHandle {
    pub id: u64,
    pub size: u32,
}

/// Opaque loaded sound owned by the audio backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SoundHandle {
    pub id: u64,
}

//=== Color ===============================================================

/// 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color(pub u8, pub u8, pub u8);

impl Color {
    pub const BLACK: Self = Self(0, 0, 0);
    pub const WHITE: Self = Self(255, 255, 255);
    pub const GRAY: Self = Self(125, 125, 125);
}

//=== Viewport ============================================================

/// Visible area in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for Viewport {
    /// 640 × 480, the classic stage size.
    fn default() -> Self {
        Self::new(640, 480)
    }
}

//=== Drawing Primitives ==================================================

/// Integer rectangle on a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// One positioned sprite submitted for the current frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpriteDraw {
    pub surface: SurfaceHandle,
    pub x: f64,
    pub y: f64,
    /// Negative values mirror the surface.
    pub scale_x: f64,
    pub scale_y: f64,
    pub angle: f64,
}

//=== Hardware Types ======================================================

/// Board pin identifier (e.g. `"D2"`, `"A0"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pin(String);

impl Pin {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Pin {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl fmt::Display for Pin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Kind of device bound to a pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceKind {
    Sensor,
    Button,
}

/// Handle to a created hardware device.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeviceHandle {
    pub id: u64,
    pub kind: DeviceKind,
    pub pin: Pin,
}

/// Device-side change observed during a poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HardwareEvent {
    SensorChange { pin: Pin, value: i32 },
    ButtonUp { pin: Pin },
    ButtonDown { pin: Pin },
}

//=== Collaborator Traits =================================================

/// Rendering collaborator: surfaces, fonts, text metrics and sprite output.
pub trait Renderer: Send + Sync {
    /// Current visible area.
    fn viewport(&self) -> Viewport;

    /// Loads an image file into a surface. `None` when the file cannot be
    /// decoded.
    fn load_image(&self, path: &Path) -> Option<SurfaceHandle>;

    /// Creates a blank surface of the given size.
    fn create_surface(&self, width: u32, height: u32) -> SurfaceHandle;

    /// Releases a surface that will not be drawn again.
    fn release_surface(&self, _surface: SurfaceHandle) {}

    fn fill_rect(&self, surface: SurfaceHandle, area: PixelRect, color: Color);

    fn draw_text(
        &self,
        surface: SurfaceHandle,
        x: u32,
        y: u32,
        text: &str,
        font: FontHandle,
        color: Color,
    );

    /// Rasterizes a font. Expensive; callers go through `Resources::font`.
    fn create_font(&self, size: u32) -> FontHandle;

    /// Rendered width of `text` in pixels.
    fn text_width(&self, font: FontHandle, text: &str) -> u32;

    /// Submits a positioned sprite for the current frame.
    fn draw_sprite(&self, sprite: &SpriteDraw);
}

/// Audio collaborator.
pub trait AudioBackend: Send + Sync {
    fn load_sound(&self, path: &Path) -> Option<SoundHandle>;

    /// Fire-and-forget playback.
    fn play(&self, sound: SoundHandle);
}

/// Hardware collaborator (boards, sensors, buttons).
pub trait HardwareBackend: Send + Sync {
    /// Creates the device bound to `pin`. Expensive; callers go through
    /// `Resources::device`.
    fn create_device(&self, kind: DeviceKind, pin: &Pin) -> DeviceHandle;

    /// Device events observed since the previous poll.
    fn poll_events(&self) -> Vec<HardwareEvent> {
        Vec::new()
    }
}

//=== AssetLocator ========================================================

/// Resolves asset names against a root directory.
#[derive(Debug, Clone)]
pub struct AssetLocator {
    root: PathBuf,
}

impl AssetLocator {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of an existing asset file, or `None` when nothing is there.
    pub fn resolve(&self, name: &str) -> Option<PathBuf> {
        let path = self.root.join(name);
        path.is_file().then_some(path)
    }
}

impl Default for AssetLocator {
    fn default() -> Self {
        Self::new("assets")
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn resolve_finds_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("car1.png"), b"png").unwrap();

        let assets = AssetLocator::new(dir.path());
        assert_eq!(assets.resolve("car1.png"), Some(dir.path().join("car1.png")));
    }

    #[test]
    fn resolve_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let assets = AssetLocator::new(dir.path());
        assert_eq!(assets.resolve("missing.png"), None);
    }

    #[test]
    fn resolve_directory_is_none() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sounds")).unwrap();

        let assets = AssetLocator::new(dir.path());
        assert_eq!(assets.resolve("sounds"), None);
    }

    #[test]
    fn pin_display_and_conversion() {
        let pin = Pin::from("D2");
        assert_eq!(pin.as_str(), "D2");
        assert_eq!(pin.to_string(), "D2");
    }
}
