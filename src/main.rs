#![forbid(unsafe_code)]

mod canvas;
mod constants;
mod overlay;
mod prefs;
mod profile;
mod skin;
mod sprite;
mod subscription;

use crate::profile::ProfileDomain;
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{Level as TraceLevel, debug, info, warn};
use tracing_subscriber::FmtSubscriber;

use canvas::Canvas;
use overlay::{OverlayListener, TouchOverlay};
use prefs::UserPrefs;
use profile::{EditorScreen, ProfileManager, TouchscreenProfiles};
use skin::Skin;

#[derive(Parser)]
#[command(name = "n64-overlay", about = "Touchscreen overlay renderer and profile manager")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Composite the touch overlay for a surface size and write it as a PNG
    Render {
        /// Skin directory (defaults to the skin from preferences)
        #[arg(long)]
        skin: Option<PathBuf>,

        /// Surface width in pixels
        #[arg(long, default_value_t = 1280)]
        width: i32,

        /// Surface height in pixels
        #[arg(long, default_value_t = 720)]
        height: i32,

        /// Analog stick axis fractions in [-1, 1]
        #[arg(long, num_args = 2, value_names = ["X", "Y"], allow_negative_numbers = true)]
        stick: Option<Vec<f32>>,

        /// FPS value to display (forces the indicator on)
        #[arg(long)]
        fps: Option<i32>,

        /// Output PNG path
        #[arg(long, default_value = "overlay.png")]
        out: PathBuf,
    },

    /// Manage touchscreen control profiles
    Profile {
        #[command(subcommand)]
        action: ProfileCommand,
    },
}

#[derive(Subcommand)]
enum ProfileCommand {
    /// List profiles; the default is marked with '*'
    List,

    /// Show or set the default profile
    Default {
        /// Profile to make the default
        name: Option<String>,

        /// Clear the default instead
        #[arg(long, conflicts_with = "name")]
        clear: bool,
    },

    /// Create an empty profile
    Add { name: String },

    /// Copy a profile under a new name
    Duplicate { source: String, dest: String },

    /// Delete a user profile
    Remove { name: String },

    /// Resolve the editor for a profile
    Edit { name: String },
}

/// Logs overlay notifications while the renderer drives the layout.
struct TraceListener;

impl OverlayListener for TraceListener {
    fn layout_changed(&mut self, overlay: &TouchOverlay) {
        debug!(buttons = overlay.button_count(), "overlay layout changed");
    }

    fn stick_changed(&mut self, _overlay: &TouchOverlay, x_fraction: f32, y_fraction: f32) {
        debug!(x = x_fraction, y = y_fraction, "analog stick moved");
    }

    fn fps_changed(&mut self, overlay: &TouchOverlay, fps: i32) {
        debug!(fps, period = overlay.fps_recompute_period(), "fps indicator updated");
    }
}

fn render(
    skin_dir: Option<PathBuf>,
    width: i32,
    height: i32,
    stick: Option<Vec<f32>>,
    fps: Option<i32>,
    out: PathBuf,
) -> Result<()> {
    let prefs = UserPrefs::load()?;
    let skin_dir = skin_dir.unwrap_or_else(|| prefs.skin_dir.clone());
    let skin = Skin::load(&skin_dir)?;
    if skin.is_empty() {
        warn!("Skin {:?} defines no asset sections", skin_dir);
    }

    let fps_enabled = prefs.fps_enabled || fps.is_some();
    let mut overlay = TouchOverlay::new(fps_enabled, prefs.fonts_dir.clone());
    overlay.subscribe(Box::new(TraceListener));
    overlay.load_skin(&skin)?;

    overlay.resize(width, height);
    if let Some(stick) = stick {
        overlay.update_stick(stick[0], stick[1]);
    }
    if let Some(fps) = fps {
        overlay.update_fps(fps);
    }

    let mut canvas = Canvas::new(width.max(1) as u32, height.max(1) as u32);
    overlay.draw_buttons(&mut canvas);
    overlay.draw_analog(&mut canvas);
    overlay.draw_fps(&mut canvas);
    canvas.save_png(&out)?;
    info!(
        "Rendered {}x{} overlay to {:?}",
        canvas.width(),
        canvas.height(),
        out
    );
    Ok(())
}

fn run_profile(action: ProfileCommand) -> Result<()> {
    let mut prefs = UserPrefs::load()?;
    let mut manager = ProfileManager::open(TouchscreenProfiles::new())?;

    match action {
        ProfileCommand::List => {
            let default = manager.default_profile(&prefs);
            for profile in manager.list() {
                let marker = if profile.name == default { "*" } else { " " };
                let origin = if manager.is_builtin(&profile.name) {
                    "builtin"
                } else {
                    "user"
                };
                println!("{marker} {:<24} ({origin})", profile.name);
            }
        }
        ProfileCommand::Default { name: Some(name), .. } => {
            manager.set_default(&mut prefs, Some(&name))?;
            prefs.save()?;
            println!("Default profile set to '{name}'");
        }
        ProfileCommand::Default { clear: true, .. } => {
            manager.set_default(&mut prefs, None)?;
            prefs.save()?;
            println!("Default profile cleared");
        }
        ProfileCommand::Default { .. } => {
            let default = manager.default_profile(&prefs);
            if default == manager.domain().no_default_sentinel() {
                println!("(no default profile)");
            } else {
                println!("{default}");
            }
        }
        ProfileCommand::Add { name } => {
            manager.add(&name)?;
            manager.save()?;
            println!("Created profile '{name}'");
        }
        ProfileCommand::Duplicate { source, dest } => {
            manager.duplicate(&source, &dest)?;
            manager.save()?;
            println!("Duplicated '{source}' as '{dest}'");
        }
        ProfileCommand::Remove { name } => {
            manager.remove(&name, &mut prefs)?;
            manager.save()?;
            prefs.save()?;
            println!("Deleted profile '{name}'");
        }
        ProfileCommand::Edit { name } => {
            let request = manager.edit(&name)?;
            let screen = match request.screen {
                EditorScreen::TouchscreenLayout => "touchscreen-layout",
            };
            println!("editor: {screen}  profile: {}", request.profile_name);
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    // Parse log level from environment variable
    let log_level = match std::env::var("LOG_LEVEL")
        .unwrap_or_else(|_| "info".to_string())
        .to_lowercase()
        .as_str()
    {
        "trace" => TraceLevel::TRACE,
        "debug" => TraceLevel::DEBUG,
        "warn" => TraceLevel::WARN,
        "error" => TraceLevel::ERROR,
        _ => TraceLevel::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();
    match cli.command {
        Command::Render {
            skin,
            width,
            height,
            stick,
            fps,
            out,
        } => render(skin, width, height, stick, fps, out),
        Command::Profile { action } => run_profile(action),
    }
}
