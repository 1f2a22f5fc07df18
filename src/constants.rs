//! Application-wide constants
//!
//! Magic numbers and string literals used throughout the overlay,
//! providing a single source of truth for constant values.

/// FPS indicator constants
pub mod fps {
    /// Largest displayable FPS value (four digit slots)
    pub const MAX_VALUE: i32 = 9999;

    /// Maximum number of digit glyphs drawn for the FPS value
    pub const MAX_DIGITS: usize = 4;

    /// Number of numeral glyphs in a digit font (0 through 9)
    pub const NUMERAL_COUNT: usize = 10;

    /// Default number of frames between FPS recalculations
    pub const DEFAULT_RECOMPUTE_PERIOD: u32 = 15;

    /// At least two frames are needed to compute a frame rate
    pub const MIN_RECOMPUTE_PERIOD: u32 = 2;
}

/// Skin file constants
pub mod skin {
    /// Skin definition filename inside a skin directory
    pub const FILENAME: &str = "skin.toml";

    /// Default percentage anchor for assets that omit x/y
    pub const DEFAULT_ANCHOR_PERCENT: i32 = 50;

    /// Image asset extension
    pub const IMAGE_EXT: &str = "png";
}

/// Configuration file locations
pub mod config {
    /// Directory name under the platform config/data dirs
    pub const APP_DIR: &str = "n64-overlay";

    /// User preferences filename
    pub const PREFS_FILENAME: &str = "prefs.toml";

    /// Touchscreen control-profile store filename
    pub const TOUCHSCREEN_PROFILES: &str = "touchscreen-profiles.toml";
}
