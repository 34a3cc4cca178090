// CLI definitions using clap

use chroma_device::{Direction, LedMode, LedType, Rgb};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "chromactl")]
#[command(author, version, about = "Razer Chroma Linux Driver")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Product ID of the device to use, in hex (default: first supported device)
    #[arg(long, global = true, value_parser = parse_hex_u16)]
    pub pid: Option<u16>,

    /// Config file path (default: ~/.config/chroma/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace); RUST_LOG takes precedence
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    // === Query Commands ===
    /// List attached supported devices
    #[command(visible_alias = "ls")]
    List,

    /// Show model, firmware version and serial number
    #[command(visible_aliases = ["version", "ver", "v"])]
    Info {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    // === Setting Commands ===
    /// Get or set brightness (0-100)
    #[command(visible_alias = "b")]
    Brightness {
        /// New brightness; omit to print the current one
        level: Option<f64>,
    },

    /// Get or set one LED zone
    #[command(visible_alias = "l")]
    Led {
        /// Zone (backlight, logo, scroll_wheel, game, macro, ...)
        led: LedType,

        #[command(subcommand)]
        action: Option<LedAction>,
    },

    /// Start a lighting effect
    #[command(visible_alias = "fx")]
    Effect {
        #[command(subcommand)]
        effect: EffectCommand,
    },

    /// Reset lighting: clear the matrix and stop effects
    Reset,

    // === Matrix Commands ===
    /// Paint the whole matrix one color
    Fill {
        /// Color (#rrggbb or name)
        color: Rgb,
    },

    /// Paint one matrix row
    Row {
        /// Row index
        row: usize,

        /// Colors from the first column on (#rrggbb or name)
        #[arg(required = true, num_args = 1..)]
        colors: Vec<Rgb>,

        /// First column to paint
        #[arg(long, default_value_t = 0)]
        start: usize,
    },

    /// Run a rainbow animation on the matrix until Ctrl-C
    #[command(visible_alias = "anim")]
    Animate {
        /// Frames per second
        #[arg(long, default_value_t = 15, value_parser = clap::value_parser!(u32).range(1..=60))]
        fps: u32,
    },
}

#[derive(Subcommand)]
pub enum LedAction {
    /// Show state, color, brightness and mode
    Get,

    /// Set color (#rrggbb or name)
    Color { color: Rgb },

    /// Set brightness (0-100)
    Brightness { level: f64 },

    /// Set mode (static, blink, pulse, spectrum)
    Mode { mode: LedMode },

    /// Turn the LED on
    On,

    /// Turn the LED off
    Off,
}

#[derive(Subcommand)]
pub enum EffectCommand {
    /// Turn effects off
    #[command(visible_alias = "none")]
    Disable,

    /// Single static color
    Static { color: Rgb },

    /// Wave across the keyboard
    Wave {
        /// left or right
        #[arg(default_value = "right")]
        direction: Direction,
    },

    /// Cycle through all colors
    Spectrum,

    /// Light keys as they are pressed
    Reactive {
        color: Rgb,
        /// 1 (fast) to 4 (slow)
        #[arg(short, long, default_value_t = 2)]
        speed: u8,
    },

    /// Breathing; no colors for random, one or two colors otherwise
    Breathe {
        #[arg(num_args = 0..=2)]
        colors: Vec<Rgb>,
    },

    /// Random twinkling keys
    Starlight {
        color: Rgb,
        /// 1 (fast) to 4 (slow)
        #[arg(short, long, default_value_t = 2)]
        speed: u8,
    },

    /// Show the last committed matrix frame
    #[command(visible_alias = "custom")]
    CustomFrame,
}

fn parse_hex_u16(s: &str) -> Result<u16, String> {
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    u16::from_str_radix(digits, 16).map_err(|e| format!("invalid PID \"{s}\": {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_pid() {
        assert_eq!(parse_hex_u16("0203"), Ok(0x0203));
        assert_eq!(parse_hex_u16("0x021e"), Ok(0x021E));
        assert!(parse_hex_u16("zz").is_err());
    }

    #[test]
    fn test_parse_effect_command() {
        let cli = Cli::try_parse_from([
            "chromactl", "--pid", "0203", "effect", "reactive", "#ff0000", "--speed", "3",
        ])
        .unwrap();
        assert_eq!(cli.pid, Some(0x0203));
        match cli.command {
            Some(Commands::Effect {
                effect: EffectCommand::Reactive { color, speed },
            }) => {
                assert_eq!(color, Rgb::RED);
                assert_eq!(speed, 3);
            }
            _ => panic!("expected reactive effect"),
        }
    }

    #[test]
    fn test_parse_led_command() {
        let cli = Cli::try_parse_from(["chromactl", "led", "logo", "color", "green"]).unwrap();
        match cli.command {
            Some(Commands::Led {
                led: LedType::Logo,
                action: Some(LedAction::Color { color }),
            }) => assert_eq!(color, Rgb::GREEN),
            _ => panic!("expected led color"),
        }
    }

    #[test]
    fn test_breathe_takes_at_most_two_colors() {
        assert!(Cli::try_parse_from(["chromactl", "effect", "breathe"]).is_ok());
        assert!(Cli::try_parse_from(["chromactl", "effect", "breathe", "red", "blue"]).is_ok());
        assert!(
            Cli::try_parse_from(["chromactl", "effect", "breathe", "red", "blue", "green"])
                .is_err()
        );
    }

    #[test]
    fn test_row_requires_colors() {
        assert!(Cli::try_parse_from(["chromactl", "row", "2"]).is_err());
        assert!(Cli::try_parse_from(["chromactl", "row", "2", "red", "#00ff00"]).is_ok());
    }

    #[test]
    fn test_bad_color_is_rejected() {
        assert!(Cli::try_parse_from(["chromactl", "fill", "#12345"]).is_err());
    }
}
