//! Touch overlay layout engine
//!
//! Owns the positioned sprites that make up the on-screen touch controls
//! (buttons, analog stick halves, FPS indicator) and recomputes their
//! placement whenever the game surface resizes, the stick moves, or the
//! frame rate changes. Other UI components subscribe for change
//! notifications instead of polling.

use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::{error, info};

use crate::canvas::Canvas;
use crate::constants::{fps, skin};
use crate::skin::{Skin, SkinSection};
use crate::sprite::Sprite;
use crate::subscription::{SubscriptionManager, SubscriptionToken};

/// Callbacks for overlay change notifications.
///
/// Dispatch is synchronous on the calling thread, in subscription order.
/// Callbacks receive a shared reference to the overlay, so they can read the
/// new layout but cannot mutate the overlay or its subscriber set.
pub trait OverlayListener {
    /// All visible elements have changed (surface resize).
    fn layout_changed(&mut self, overlay: &TouchOverlay);

    /// Just the analog stick has changed. Fractions are in [-1, 1].
    fn stick_changed(&mut self, overlay: &TouchOverlay, x_fraction: f32, y_fraction: f32);

    /// Just the FPS indicator has changed.
    fn fps_changed(&mut self, overlay: &TouchOverlay, fps: i32);
}

/// Outcome of loading a numeral glyph font.
///
/// Glyph loading is best-effort: slots that load stay loaded even when
/// others fail, and a missing glyph later suppresses that digit when the
/// FPS string is rendered. The outcome tells callers how much of the font
/// arrived so they can decide whether a partial indicator is acceptable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GlyphLoad {
    /// All ten numerals loaded.
    Loaded,
    /// Some numerals failed; `missing` holds the absent indices (0-9).
    Partial { missing: Vec<usize> },
    /// The font directory does not exist; no slot was touched.
    MissingDirectory,
    /// The skin section names no font.
    NotConfigured,
}

/// A button sprite plus the percentage anchors used to place it on resize.
struct ButtonSprite {
    sprite: Sprite,
    x_percent: i32,
    y_percent: i32,
}

/// The drawable touch control layout.
pub struct TouchOverlay {
    buttons: Vec<ButtonSprite>,

    analog_back: Option<Sprite>,
    analog_fore: Option<Sprite>,
    analog_x_percent: i32,
    analog_y_percent: i32,
    /// Maximum stick displacement from center, in pixels.
    analog_maximum: i32,

    fps_frame: Option<Sprite>,
    /// FPS frame anchor, in percent of the surface dimensions.
    fps_frame_x: i32,
    fps_frame_y: i32,
    /// FPS text centroid, in percent of the frame dimensions.
    fps_text_x: i32,
    fps_text_y: i32,
    fps_recompute_period: u32,
    fps_value: i32,
    fps_enabled: bool,
    fonts_dir: PathBuf,
    fps_digits: Vec<Sprite>,
    numerals: [Option<Sprite>; fps::NUMERAL_COUNT],

    subscribers: SubscriptionManager<Box<dyn OverlayListener>>,
}

impl TouchOverlay {
    /// `fps_enabled` gates the FPS indicator; `fonts_dir` is where numeral
    /// glyph fonts live (one subdirectory per font).
    pub fn new(fps_enabled: bool, fonts_dir: PathBuf) -> Self {
        Self {
            buttons: Vec::new(),
            analog_back: None,
            analog_fore: None,
            analog_x_percent: skin::DEFAULT_ANCHOR_PERCENT,
            analog_y_percent: skin::DEFAULT_ANCHOR_PERCENT,
            analog_maximum: 0,
            fps_frame: None,
            fps_frame_x: 0,
            fps_frame_y: 0,
            fps_text_x: skin::DEFAULT_ANCHOR_PERCENT,
            fps_text_y: skin::DEFAULT_ANCHOR_PERCENT,
            fps_recompute_period: fps::DEFAULT_RECOMPUTE_PERIOD,
            fps_value: 0,
            fps_enabled,
            fonts_dir,
            fps_digits: Vec::new(),
            numerals: std::array::from_fn(|_| None),
            subscribers: SubscriptionManager::new(),
        }
    }

    /// Reset all owned layout state to defaults. Does not notify listeners
    /// and does not touch the subscriber set.
    pub fn clear(&mut self) {
        self.buttons.clear();
        self.analog_back = None;
        self.analog_fore = None;
        self.analog_x_percent = skin::DEFAULT_ANCHOR_PERCENT;
        self.analog_y_percent = skin::DEFAULT_ANCHOR_PERCENT;
        self.analog_maximum = 0;
        self.fps_frame = None;
        self.fps_frame_x = 0;
        self.fps_frame_y = 0;
        self.fps_text_x = skin::DEFAULT_ANCHOR_PERCENT;
        self.fps_text_y = skin::DEFAULT_ANCHOR_PERCENT;
        self.fps_recompute_period = fps::DEFAULT_RECOMPUTE_PERIOD;
        self.fps_value = 0;
        self.fps_digits.clear();
        for slot in self.numerals.iter_mut() {
            *slot = None;
        }
    }

    /// Start receiving change notifications. The same listener may be
    /// subscribed more than once; each subscription notifies independently.
    pub fn subscribe(&mut self, listener: Box<dyn OverlayListener>) -> SubscriptionToken {
        self.subscribers.subscribe(listener)
    }

    /// Stop receiving change notifications. Unknown or already-removed
    /// tokens are a no-op.
    pub fn unsubscribe(&mut self, token: SubscriptionToken) {
        self.subscribers.unsubscribe(token);
    }

    /// The number of frames over which the FPS should be computed.
    /// Historically loaded with the skin assets, which is why it lives here
    /// rather than in user preferences.
    pub fn fps_recompute_period(&self) -> u32 {
        self.fps_recompute_period
    }

    pub fn fps_value(&self) -> i32 {
        self.fps_value
    }

    pub fn fps_enabled(&self) -> bool {
        self.fps_enabled
    }

    pub fn button_count(&self) -> usize {
        self.buttons.len()
    }

    pub fn analog_back(&self) -> Option<&Sprite> {
        self.analog_back.as_ref()
    }

    pub fn analog_fore(&self) -> Option<&Sprite> {
        self.analog_fore.as_ref()
    }

    pub fn fps_frame(&self) -> Option<&Sprite> {
        self.fps_frame.as_ref()
    }

    pub fn fps_digits(&self) -> &[Sprite] {
        &self.fps_digits
    }

    /// Recompute every sprite position for new surface dimensions, then
    /// notify all listeners that the whole layout changed.
    ///
    /// Non-positive dimensions are not special-cased: positions clamp into
    /// the degenerate rect.
    pub fn resize(&mut self, width: i32, height: i32) {
        // Buttons and the analog background sit at their percentage anchors
        for button in self.buttons.iter_mut() {
            let cx = (width as f32 * button.x_percent as f32 / 100.0) as i32;
            let cy = (height as f32 * button.y_percent as f32 / 100.0) as i32;
            button.sprite.fit_center(cx, cy, width, height);
        }
        if let Some(back) = self.analog_back.as_mut() {
            let cx = (width as f32 * self.analog_x_percent as f32 / 100.0) as i32;
            let cy = (height as f32 * self.analog_y_percent as f32 / 100.0) as i32;
            back.fit_center(cx, cy, width, height);
        }

        // Recenter the stick on the background
        if let (Some(back), Some(fore)) = (&self.analog_back, &mut self.analog_fore) {
            let cx = back.x + back.half_width;
            let cy = back.y + back.half_height;
            fore.fit_center_within(cx, cy, back.x, back.y, back.width, back.height);
        }

        if let Some(frame) = self.fps_frame.as_mut() {
            let cx = (width as f32 * self.fps_frame_x as f32 / 100.0) as i32;
            let cy = (height as f32 * self.fps_frame_y as f32 / 100.0) as i32;
            frame.fit_center(cx, cy, width, height);
        }
        self.refresh_fps_positions();

        let mut subs = self.subscribers.detach();
        for (_, listener) in subs.iter_mut() {
            listener.layout_changed(self);
        }
        self.subscribers.attach(subs);
    }

    /// Reposition the stick foreground for a new axis state. Fractions are
    /// expected in [-1, 1]. Listeners are always notified, even when the
    /// computed position is unchanged.
    pub fn update_stick(&mut self, x_fraction: f32, y_fraction: f32) {
        if let (Some(back), Some(fore)) = (&self.analog_back, &mut self.analog_fore) {
            let mut offset_x = back.half_width + (x_fraction * self.analog_maximum as f32) as i32;
            let mut offset_y = back.half_height - (y_fraction * self.analog_maximum as f32) as i32;

            // A negative offset would put the stick outside the background;
            // fall back to the half-extent rather than pinning to zero
            if offset_x < 0 {
                offset_x = back.half_width;
            }
            if offset_y < 0 {
                offset_y = back.half_height;
            }

            let cx = back.x + offset_x;
            let cy = back.y + offset_y;
            fore.fit_center_within(cx, cy, back.x, back.y, back.width, back.height);
        }

        let mut subs = self.subscribers.detach();
        for (_, listener) in subs.iter_mut() {
            listener.stick_changed(self, x_fraction, y_fraction);
        }
        self.subscribers.attach(subs);
    }

    /// Store a new FPS value and rebuild the digit sprites.
    ///
    /// The value is clamped to [0, 9999]. When the indicator is disabled, or
    /// the clamped value equals the one already displayed, nothing is
    /// recomputed and no listener fires.
    pub fn update_fps(&mut self, value: i32) {
        let value = value.clamp(0, fps::MAX_VALUE);

        if !self.fps_enabled || self.fps_value == value {
            return;
        }
        self.fps_value = value;

        self.refresh_fps_digits();
        self.refresh_fps_positions();

        let mut subs = self.subscribers.detach();
        for (_, listener) in subs.iter_mut() {
            listener.fps_changed(self, value);
        }
        self.subscribers.attach(subs);
    }

    /// Rebuild the digit sprite list from the current FPS value, leftmost
    /// digit first. Digits whose numeral glyph never loaded are skipped.
    fn refresh_fps_digits(&mut self) {
        self.fps_digits.clear();
        let text = self.fps_value.to_string();
        for ch in text.chars().take(fps::MAX_DIGITS) {
            let Some(numeral) = ch.to_digit(10) else {
                continue;
            };
            if let Some(glyph) = &self.numerals[numeral as usize] {
                self.fps_digits.push(glyph.clone());
            }
        }
    }

    /// Lay the digit sprites out around the text centroid inside the frame.
    fn refresh_fps_positions(&mut self) {
        let (centroid_x, centroid_y) = match &self.fps_frame {
            Some(frame) => (
                frame.x + (frame.width as f32 * self.fps_text_x as f32 / 100.0) as i32,
                frame.y + (frame.height as f32 * self.fps_text_y as f32 / 100.0) as i32,
            ),
            None => (0, 0),
        };

        let total_width: i32 = self.fps_digits.iter().map(|d| d.width).sum();
        let mut x = centroid_x - (total_width as f32 / 2.0) as i32;
        for digit in self.fps_digits.iter_mut() {
            digit.set_pos(x, centroid_y - digit.half_height);
            x += digit.width;
        }
    }

    /// Draw the button sprites in load order.
    pub fn draw_buttons(&self, canvas: &mut Canvas) {
        for button in &self.buttons {
            button.sprite.draw(canvas);
        }
    }

    /// Draw the analog stick, background before foreground.
    pub fn draw_analog(&self, canvas: &mut Canvas) {
        if let Some(back) = &self.analog_back {
            back.draw(canvas);
        }
        if let Some(fore) = &self.analog_fore {
            fore.draw(canvas);
        }
    }

    /// Draw the FPS indicator, frame before digits.
    pub fn draw_fps(&self, canvas: &mut Canvas) {
        if let Some(frame) = &self.fps_frame {
            frame.draw(canvas);
        }
        for digit in &self.fps_digits {
            digit.draw(canvas);
        }
    }

    /// Reset the overlay and load every section of a skin in file order.
    pub fn load_skin(&mut self, skin: &Skin) -> Result<()> {
        self.clear();
        for (name, section) in skin.sections() {
            let kind = section.kind(name);
            self.load_section(&skin.dir, name, section, kind)?;
        }
        info!(
            buttons = self.buttons.len(),
            analog = self.analog_back.is_some(),
            fps_frame = self.fps_frame.is_some(),
            "Loaded skin from {:?}",
            skin.dir
        );
        Ok(())
    }

    /// Load one skin section, dispatching on the asset kind tag: a tag
    /// containing `"fps"` loads the FPS indicator, one containing `"analog"`
    /// the stick pair, anything else a button sprite.
    pub fn load_section(
        &mut self,
        dir: &Path,
        name: &str,
        section: &SkinSection,
        kind: &str,
    ) -> Result<()> {
        if kind.contains("fps") {
            self.load_fps_indicator(dir, name, section)?;
            Ok(())
        } else if kind.contains("analog") {
            self.load_analog(dir, name, section)
        } else {
            self.load_button(dir, name, section)
        }
    }

    /// Load FPS indicator assets and properties.
    ///
    /// The frame image comes from `<dir>/<name>.png`. Percent fields `x`/`y`
    /// (default 0) anchor the frame on the surface, `numx`/`numy` (default
    /// 50) the digit centroid within the frame. `rate` (default 15) is the
    /// recompute period, floored at 2. When the section names a font, the
    /// ten numeral glyphs are loaded best-effort and the returned
    /// [`GlyphLoad`] says how much of the font arrived.
    pub fn load_fps_indicator(
        &mut self,
        dir: &Path,
        name: &str,
        section: &SkinSection,
    ) -> Result<GlyphLoad> {
        let path = dir.join(format!("{name}.{}", skin::IMAGE_EXT));
        self.fps_frame = Some(Sprite::load(&path)?);

        // Frame position, in percent of the surface dimensions
        self.fps_frame_x = section.get_int("x", 0);
        self.fps_frame_y = section.get_int("y", 0);

        // Text centroid, in percent of the frame dimensions
        self.fps_text_x = section.get_int("numx", skin::DEFAULT_ANCHOR_PERCENT);
        self.fps_text_y = section.get_int("numy", skin::DEFAULT_ANCHOR_PERCENT);

        let rate = section.get_int("rate", fps::DEFAULT_RECOMPUTE_PERIOD as i32);
        self.fps_recompute_period = rate.max(fps::MIN_RECOMPUTE_PERIOD as i32) as u32;

        let outcome = match section.get_str("font") {
            Some(font) if !font.is_empty() => self.load_numeral_font(font),
            _ => GlyphLoad::NotConfigured,
        };
        Ok(outcome)
    }

    /// Load the ten numeral glyphs `0.png`..`9.png` from
    /// `<fonts_dir>/<font>/`. Slots that load stay loaded even when others
    /// fail; failures are logged and reported in the outcome.
    fn load_numeral_font(&mut self, font: &str) -> GlyphLoad {
        let font_dir = self.fonts_dir.join(font);
        if !font_dir.is_dir() {
            error!("FPS font directory {:?} not found", font_dir);
            return GlyphLoad::MissingDirectory;
        }

        let mut missing = Vec::new();
        for numeral in 0..fps::NUMERAL_COUNT {
            let path = font_dir.join(format!("{numeral}.{}", skin::IMAGE_EXT));
            match Sprite::load(&path) {
                Ok(glyph) => self.numerals[numeral] = Some(glyph),
                Err(e) => {
                    error!("Problem loading FPS font glyph {:?}: {e:#}", path);
                    missing.push(numeral);
                }
            }
        }

        if missing.is_empty() {
            GlyphLoad::Loaded
        } else {
            GlyphLoad::Partial { missing }
        }
    }

    /// Load the analog stick pair: background from `<dir>/<name>.png`,
    /// foreground from the `fore` field (default `<name>-fore`). `x`/`y`
    /// (default 50) anchor the background; `travel` (default 0) is the
    /// maximum stick displacement in pixels.
    fn load_analog(&mut self, dir: &Path, name: &str, section: &SkinSection) -> Result<()> {
        let back = Sprite::load(&dir.join(format!("{name}.{}", skin::IMAGE_EXT)))?;
        let fore_name = section
            .get_str("fore")
            .map(str::to_owned)
            .unwrap_or_else(|| format!("{name}-fore"));
        let fore = Sprite::load(&dir.join(format!("{fore_name}.{}", skin::IMAGE_EXT)))?;

        self.analog_x_percent = section.get_int("x", skin::DEFAULT_ANCHOR_PERCENT);
        self.analog_y_percent = section.get_int("y", skin::DEFAULT_ANCHOR_PERCENT);
        self.analog_maximum = section.get_int("travel", 0);
        self.analog_back = Some(back);
        self.analog_fore = Some(fore);
        Ok(())
    }

    /// Load a button sprite from `<dir>/<name>.png` with `x`/`y` percent
    /// anchors (default 50). Buttons draw in load order.
    fn load_button(&mut self, dir: &Path, name: &str, section: &SkinSection) -> Result<()> {
        let sprite = Sprite::load(&dir.join(format!("{name}.{}", skin::IMAGE_EXT)))?;
        self.buttons.push(ButtonSprite {
            sprite,
            x_percent: section.get_int("x", skin::DEFAULT_ANCHOR_PERCENT),
            y_percent: section.get_int("y", skin::DEFAULT_ANCHOR_PERCENT),
        });
        Ok(())
    }
}
