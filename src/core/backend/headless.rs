//=========================================================================
// Headless Collaborators
//=========================================================================
//
// In-memory renderer, audio and hardware backends.
//
// Used when no real backend is plugged into the `StageBuilder`, and by the
// test suite to assert on what the core asked the collaborators to do.
// Nothing is rasterized: surfaces are bookkeeping records, text width is
// a fixed advance per character.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

//=== Internal Dependencies ===============================================

use super::{
    AudioBackend, Color, DeviceHandle, DeviceKind, FontHandle, HardwareBackend, HardwareEvent,
    Pin, PixelRect, Renderer, SoundHandle, SpriteDraw, SurfaceHandle, Viewport,
};
use crate::core::lock;

//=== SurfaceRecord =======================================================

/// Everything drawn onto one headless surface.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurfaceRecord {
    pub width: u32,
    pub height: u32,
    pub fills: Vec<(PixelRect, Color)>,
    /// `(x, y, text, color)` per `draw_text` call.
    pub texts: Vec<(u32, u32, String, Color)>,
}

//=== HeadlessRenderer ====================================================

/// Renderer that records surfaces and sprite submissions.
///
/// Every loaded image gets the same configurable size (32 × 32 unless set
/// otherwise), which keeps collision and clamp arithmetic predictable.
#[derive(Debug)]
pub struct HeadlessRenderer {
    viewport: Mutex<Viewport>,
    image_size: (u32, u32),
    next_id: AtomicU64,
    surfaces: Mutex<HashMap<u64, SurfaceRecord>>,
    drawn: Mutex<Vec<SpriteDraw>>,
    fonts_created: AtomicU64,
}

impl HeadlessRenderer {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport: Mutex::new(viewport),
            image_size: (32, 32),
            next_id: AtomicU64::new(1),
            surfaces: Mutex::new(HashMap::new()),
            drawn: Mutex::new(Vec::new()),
            fonts_created: AtomicU64::new(0),
        }
    }

    /// Sets the size reported for every loaded image.
    pub fn with_image_size(mut self, width: u32, height: u32) -> Self {
        self.image_size = (width, height);
        self
    }

    pub fn set_viewport(&self, viewport: Viewport) {
        *lock(&self.viewport) = viewport;
    }

    /// Sprites submitted since the last `take_drawn`.
    pub fn drawn(&self) -> Vec<SpriteDraw> {
        lock(&self.drawn).clone()
    }

    pub fn take_drawn(&self) -> Vec<SpriteDraw> {
        std::mem::take(&mut *lock(&self.drawn))
    }

    pub fn surface(&self, handle: SurfaceHandle) -> Option<SurfaceRecord> {
        lock(&self.surfaces).get(&handle.id).cloned()
    }

    /// Surfaces currently alive (created and not released).
    pub fn surface_count(&self) -> usize {
        lock(&self.surfaces).len()
    }

    pub fn fonts_created(&self) -> u64 {
        self.fonts_created.load(Ordering::Relaxed)
    }

    fn allocate(&self, width: u32, height: u32) -> SurfaceHandle {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        lock(&self.surfaces).insert(
            id,
            SurfaceRecord {
                width,
                height,
                ..SurfaceRecord::default()
            },
        );
        SurfaceHandle { id, width, height }
    }
}

impl Default for HeadlessRenderer {
    fn default() -> Self {
        Self::new(Viewport::default())
    }
}

impl Renderer for HeadlessRenderer {
    fn viewport(&self) -> Viewport {
        *lock(&self.viewport)
    }

    fn load_image(&self, _path: &Path) -> Option<SurfaceHandle> {
        let (width, height) = self.image_size;
        Some(self.allocate(width, height))
    }

    fn create_surface(&self, width: u32, height: u32) -> SurfaceHandle {
        self.allocate(width, height)
    }

    fn release_surface(&self, surface: SurfaceHandle) {
        lock(&self.surfaces).remove(&surface.id);
    }

    fn fill_rect(&self, surface: SurfaceHandle, area: PixelRect, color: Color) {
        if let Some(record) = lock(&self.surfaces).get_mut(&surface.id) {
            record.fills.push((area, color));
        }
    }

    fn draw_text(
        &self,
        surface: SurfaceHandle,
        x: u32,
        y: u32,
        text: &str,
        _font: FontHandle,
        color: Color,
    ) {
        if let Some(record) = lock(&self.surfaces).get_mut(&surface.id) {
            record.texts.push((x, y, text.to_string(), color));
        }
    }

    fn create_font(&self, size: u32) -> FontHandle {
        let id = self.fonts_created.fetch_add(1, Ordering::Relaxed) + 1;
        FontHandle { id, size }
    }

    /// Half the font size per character, at least one pixel.
    fn text_width(&self, font: FontHandle, text: &str) -> u32 {
        let advance = (font.size / 2).max(1);
        u32::try_from(text.chars().count())
            .unwrap_or(u32::MAX)
            .saturating_mul(advance)
    }

    fn draw_sprite(&self, sprite: &SpriteDraw) {
        lock(&self.drawn).push(*sprite);
    }
}

//=== HeadlessAudio =======================================================

/// Audio backend that accepts every file and records playback.
#[derive(Debug, Default)]
pub struct HeadlessAudio {
    next_id: AtomicU64,
    loaded: Mutex<Vec<PathBuf>>,
    played: Mutex<Vec<SoundHandle>>,
}

impl HeadlessAudio {
    pub fn new() -> Self {
        Self::default()
    }

    /// Paths loaded so far, in load order.
    pub fn loaded(&self) -> Vec<PathBuf> {
        lock(&self.loaded).clone()
    }

    pub fn played(&self) -> Vec<SoundHandle> {
        lock(&self.played).clone()
    }
}

impl AudioBackend for HeadlessAudio {
    fn load_sound(&self, path: &Path) -> Option<SoundHandle> {
        lock(&self.loaded).push(path.to_path_buf());
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        Some(SoundHandle { id })
    }

    fn play(&self, sound: SoundHandle) {
        lock(&self.played).push(sound);
    }
}

//=== HeadlessHardware ====================================================

/// Hardware backend with a scriptable event queue.
#[derive(Debug, Default)]
pub struct HeadlessHardware {
    next_id: AtomicU64,
    created: Mutex<Vec<(DeviceKind, Pin)>>,
    pending: Mutex<Vec<HardwareEvent>>,
}

impl HeadlessHardware {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues an event for the next `poll_events`.
    pub fn push_event(&self, event: HardwareEvent) {
        lock(&self.pending).push(event);
    }

    /// Devices created so far, in creation order.
    pub fn created(&self) -> Vec<(DeviceKind, Pin)> {
        lock(&self.created).clone()
    }
}

impl HardwareBackend for HeadlessHardware {
    fn create_device(&self, kind: DeviceKind, pin: &Pin) -> DeviceHandle {
        lock(&self.created).push((kind, pin.clone()));
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        DeviceHandle {
            id,
            kind,
            pin: pin.clone(),
        }
    }

    fn poll_events(&self) -> Vec<HardwareEvent> {
        std::mem::take(&mut *lock(&self.pending))
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renderer_records_surface_drawing() {
        let renderer = HeadlessRenderer::default();
        let surface = renderer.create_surface(40, 20);
        let font = renderer.create_font(16);

        renderer.fill_rect(
            surface,
            PixelRect { x: 0, y: 0, width: 40, height: 20 },
            Color::WHITE,
        );
        renderer.draw_text(surface, 6, 6, "hi", font, Color::BLACK);

        let record = renderer.surface(surface).unwrap();
        assert_eq!(record.fills.len(), 1);
        assert_eq!(record.texts, vec![(6, 6, "hi".to_string(), Color::BLACK)]);
    }

    #[test]
    fn released_surface_is_forgotten() {
        let renderer = HeadlessRenderer::default();
        let surface = renderer.create_surface(4, 4);
        assert_eq!(renderer.surface_count(), 1);

        renderer.release_surface(surface);
        assert_eq!(renderer.surface_count(), 0);
        assert!(renderer.surface(surface).is_none());
    }

    #[test]
    fn text_width_is_half_font_size_per_char() {
        let renderer = HeadlessRenderer::default();
        let font = renderer.create_font(16);
        assert_eq!(renderer.text_width(font, "abcde"), 40);
    }

    #[test]
    fn loaded_images_use_configured_size() {
        let renderer = HeadlessRenderer::default().with_image_size(20, 10);
        let surface = renderer.load_image(Path::new("car1.png")).unwrap();
        assert_eq!((surface.width, surface.height), (20, 10));
    }

    #[test]
    fn hardware_poll_drains_queue() {
        let hardware = HeadlessHardware::new();
        hardware.push_event(HardwareEvent::ButtonDown { pin: Pin::from("D2") });

        assert_eq!(hardware.poll_events().len(), 1);
        assert!(hardware.poll_events().is_empty());
    }
}
