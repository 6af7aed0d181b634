//=========================================================================
// Speech Balloon
//=========================================================================
//
// Wraps a message into fixed-width lines, renders it onto a framed
// surface and keeps that surface above its owner.
//
// Layout (all sizes in pixels):
// ```text
//   ┌───────────────────────────────┐  ← border color, FRAME_SIZE thick
//   │ ┌───────────────────────────┐ │  ← fill color
//   │ │  line 0                   │ │    MARGIN_SIZE inside the frame
//   │ │  line 1                   │ │    rows of font_size + 1
//   │ └───────────────────────────┘ │
//   └───────────────────────────────┘
// ```
//
// At most one balloon exists per character. Its position is recomputed on
// every draw: horizontally centered on the owner, directly above it, and
// clamped to the viewport on every edge.
//
//=========================================================================

//=== External Dependencies ===============================================

use log::debug;

//=== Internal Dependencies ===============================================

use super::motion::clamp_axis;
use super::Character;
use crate::core::backend::{Color, FontHandle, PixelRect, Renderer, SpriteDraw, SurfaceHandle, Viewport};
use crate::core::geometry::{DVec2, Rect};

//=== Constants ===========================================================

/// Characters per wrapped line.
pub const CHARS_PER_LINE: usize = 10;

pub const FRAME_SIZE: u32 = 3;

/// Padding between the frame and the text.
pub const MARGIN_SIZE: u32 = 3;

//=== BalloonStyle ========================================================

/// Font size and colors of a balloon.
///
/// # Default Values
///
/// - **font_size**: 16
/// - **border**: gray (125, 125, 125)
/// - **fill**: white
/// - **text**: black
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalloonStyle {
    pub font_size: u32,
    pub border: Color,
    pub fill: Color,
    pub text: Color,
}

impl Default for BalloonStyle {
    fn default() -> Self {
        Self {
            font_size: 16,
            border: Color::GRAY,
            fill: Color::WHITE,
            text: Color::BLACK,
        }
    }
}

//=== Line Wrapping =======================================================

/// Splits `message` on hard newlines, then into chunks of at most
/// [`CHARS_PER_LINE`] characters. Empty lines are dropped.
pub fn wrap_lines(message: &str) -> Vec<String> {
    message
        .lines()
        .flat_map(|line| {
            let chars: Vec<char> = line.chars().collect();
            chars
                .chunks(CHARS_PER_LINE)
                .map(|chunk| chunk.iter().collect::<String>())
                .collect::<Vec<_>>()
        })
        .collect()
}

//=== Balloon =============================================================

/// A rendered speech balloon.
#[derive(Debug, Clone, PartialEq)]
pub struct Balloon {
    surface: SurfaceHandle,
    lines: Vec<String>,
    position: DVec2,
}

impl Balloon {
    /// Renders `lines` onto a new surface sized to the widest line.
    pub(super) fn render(
        renderer: &dyn Renderer,
        font: FontHandle,
        lines: Vec<String>,
        style: &BalloonStyle,
    ) -> Self {
        let inset = FRAME_SIZE + MARGIN_SIZE;
        let line_height = font.size.saturating_add(1);
        let text_width = lines
            .iter()
            .map(|line| renderer.text_width(font, line))
            .max()
            .unwrap_or(0);
        let width = text_width.saturating_add(inset * 2);
        let height = stacked_height(lines.len(), line_height).saturating_add(inset * 2);

        let surface = renderer.create_surface(width, height);
        renderer.fill_rect(
            surface,
            PixelRect { x: 0, y: 0, width, height },
            style.border,
        );
        renderer.fill_rect(
            surface,
            PixelRect {
                x: FRAME_SIZE,
                y: FRAME_SIZE,
                width: width - FRAME_SIZE * 2,
                height: height - FRAME_SIZE * 2,
            },
            style.fill,
        );
        for (row, line) in lines.iter().enumerate() {
            let y = inset.saturating_add(stacked_height(row, line_height));
            renderer.draw_text(surface, inset, y, line, font, style.text);
        }

        Self {
            surface,
            lines,
            position: DVec2::ZERO,
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn surface(&self) -> SurfaceHandle {
        self.surface
    }

    pub fn width(&self) -> u32 {
        self.surface.width
    }

    pub fn height(&self) -> u32 {
        self.surface.height
    }

    /// Position computed by the latest draw.
    pub fn position(&self) -> DVec2 {
        self.position
    }

    /// Centers the balloon above `owner`, inside `viewport`.
    pub(super) fn place(&mut self, owner: Rect, viewport: Viewport) {
        let (width, height) = (f64::from(self.width()), f64::from(self.height()));
        self.position = DVec2::new(
            clamp_axis(owner.center().x - width / 2.0, width, f64::from(viewport.width)),
            clamp_axis(owner.y - height, height, f64::from(viewport.height)),
        );
    }

    pub(super) fn sprite(&self) -> SpriteDraw {
        SpriteDraw {
            surface: self.surface,
            x: self.position.x,
            y: self.position.y,
            scale_x: 1.0,
            scale_y: 1.0,
            angle: 0.0,
        }
    }
}

/// Pixel height of `rows` text rows, saturating at `u32::MAX`.
fn stacked_height(rows: usize, line_height: u32) -> u32 {
    u32::try_from(rows)
        .unwrap_or(u32::MAX)
        .saturating_mul(line_height)
}

//=== Character ===========================================================

impl Character {
    /// Shows `message` in a speech balloon with the stage's font size.
    /// An empty message removes the balloon.
    pub fn say(&self, message: &str) {
        let style = BalloonStyle {
            font_size: self.env().font_size,
            ..BalloonStyle::default()
        };
        self.say_with(message, style);
    }

    /// Like [`say`](Self::say) with an explicit style.
    pub fn say_with(&self, message: &str, style: BalloonStyle) {
        let env = self.env();
        let renderer = env.renderer.as_ref();

        let previous = self.state().balloon.take();
        if let Some(previous) = previous {
            renderer.release_surface(previous.surface());
        }

        let lines = wrap_lines(message);
        if lines.is_empty() {
            return;
        }

        let font = env.resources.font(renderer, style.font_size);
        let mut balloon = Balloon::render(renderer, font, lines, &style);
        let viewport = renderer.viewport();

        let mut state = self.state();
        balloon.place(state.rect(), viewport);
        debug!(
            target: "stage",
            "Character {} says {:?} ({} lines)",
            self.id(), message, balloon.lines().len()
        );
        state.balloon = Some(balloon);
    }

    /// The balloon currently shown, if any.
    pub fn balloon(&self) -> Option<Balloon> {
        self.state().balloon.clone()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::super::testing::fixture;
    use super::*;
    use crate::core::character::CharacterOptions;

    //=====================================================================
    // Wrapping Tests
    //=====================================================================

    #[test]
    fn wraps_every_ten_characters() {
        assert_eq!(wrap_lines("A short message"), vec!["A short me", "ssage"]);
    }

    #[test]
    fn keeps_hard_newlines_and_drops_empty_lines() {
        assert_eq!(
            wrap_lines("hello\n\nworld, how are you"),
            vec!["hello", "world, how", " are you"]
        );
        assert!(wrap_lines("").is_empty());
        assert!(wrap_lines("\n").is_empty());
    }

    #[test]
    fn wraps_by_characters_not_bytes() {
        assert_eq!(wrap_lines("こんにちは、世界のみなさん"), vec!["こんにちは、世界のみ", "なさん"]);
    }

    //=====================================================================
    // Layout Tests
    //=====================================================================

    #[test]
    fn two_line_balloon_height() {
        let fx = fixture((640, 480), 32);
        let car = fx.stage.create_character(CharacterOptions::new()).unwrap();

        car.say("A short message");
        let balloon = car.balloon().unwrap();

        assert_eq!(balloon.lines(), &["A short me", "ssage"]);
        assert_eq!(balloon.height(), 2 * (16 + 1) + 2 * (FRAME_SIZE + MARGIN_SIZE));
        assert_eq!(balloon.height(), 46);
        // 10 chars at 8px plus the inset on both sides
        assert_eq!(balloon.width(), 80 + 12);
    }

    #[test]
    fn stacked_height_saturates() {
        assert_eq!(stacked_height(3, 17), 51);
        assert_eq!(stacked_height(usize::MAX, 2), u32::MAX);
        assert_eq!(stacked_height(2, u32::MAX), u32::MAX);
    }

    #[test]
    fn oversized_font_saturates_instead_of_overflowing() {
        let fx = fixture((640, 480), 32);
        let car = fx.stage.create_character(CharacterOptions::new()).unwrap();

        car.say_with("hi\nthere", BalloonStyle { font_size: u32::MAX, ..BalloonStyle::default() });
        let balloon = car.balloon().unwrap();

        assert_eq!(balloon.lines().len(), 2);
        assert_eq!(balloon.height(), u32::MAX);
        assert_eq!(balloon.width(), u32::MAX);
    }

    #[test]
    fn balloon_surface_is_framed_and_filled() {
        let fx = fixture((640, 480), 32);
        let car = fx.stage.create_character(CharacterOptions::new()).unwrap();

        car.say("hi");
        let balloon = car.balloon().unwrap();
        let record = fx.renderer.surface(balloon.surface()).unwrap();

        assert_eq!(record.fills[0].1, Color::GRAY);
        assert_eq!(record.fills[1].0, PixelRect { x: 3, y: 3, width: balloon.width() - 6, height: balloon.height() - 6 });
        assert_eq!(record.fills[1].1, Color::WHITE);
        assert_eq!(record.texts, vec![(6, 6, "hi".to_string(), Color::BLACK)]);
    }

    #[test]
    fn empty_message_clears_and_releases() {
        let fx = fixture((640, 480), 32);
        let car = fx.stage.create_character(CharacterOptions::new()).unwrap();

        car.say("first");
        car.say("second");
        assert_eq!(fx.renderer.surface_count(), 1);
        assert_eq!(car.balloon().unwrap().lines(), &["second"]);

        car.say("");
        assert!(car.balloon().is_none());
        assert_eq!(fx.renderer.surface_count(), 0);
    }

    #[test]
    fn fonts_are_shared_between_characters() {
        let fx = fixture((640, 480), 32);
        let a = fx.stage.create_character(CharacterOptions::new()).unwrap();
        let b = fx.stage.create_character(CharacterOptions::new()).unwrap();

        a.say("one");
        b.say("two");
        b.say_with("big", BalloonStyle { font_size: 24, ..BalloonStyle::default() });

        assert_eq!(fx.renderer.fonts_created(), 2);
    }

    //=====================================================================
    // Placement Tests
    //=====================================================================

    #[test]
    fn balloon_is_centered_above_owner() {
        let fx = fixture((640, 480), 32);
        let car = fx
            .stage
            .create_character(CharacterOptions::new().at(200.0, 200.0).costume("car1.png"))
            .unwrap();

        car.say("hi");
        car.draw();
        let balloon = car.balloon().unwrap();

        let (width, height) = (f64::from(balloon.width()), f64::from(balloon.height()));
        assert_eq!(balloon.position(), DVec2::new(216.0 - width / 2.0, 200.0 - height));
    }

    #[test]
    fn balloon_follows_owner_and_stays_on_screen() {
        let fx = fixture((640, 480), 32);
        let car = fx
            .stage
            .create_character(CharacterOptions::new().at(0.0, 0.0).costume("car1.png"))
            .unwrap();

        car.say("A short message");
        car.draw();
        assert_eq!(car.balloon().unwrap().position(), DVec2::ZERO);

        car.set_position(630.0, 300.0);
        car.draw();
        let balloon = car.balloon().unwrap();
        assert_eq!(balloon.position().x, 640.0 - f64::from(balloon.width()));
        assert_eq!(balloon.position().y, 300.0 - f64::from(balloon.height()));

        let drawn = fx.renderer.take_drawn();
        assert_eq!(drawn.last().map(|d| d.surface), Some(balloon.surface()));
    }
}
