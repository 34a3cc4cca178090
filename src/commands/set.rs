//! Setting command handlers.

use super::{CommandResult, Context};
use crate::cli::{EffectCommand, LedAction};
use anyhow::bail;
use chroma_device::{BreatheColors, Effect, LedType};

/// Get or set device brightness
pub fn brightness(ctx: &Context, level: Option<f64>) -> CommandResult {
    let device = ctx.open()?;
    match level {
        None => println!("Brightness: {:.1}%", device.brightness()?),
        Some(level) => {
            if !(0.0..=100.0).contains(&level) {
                bail!("Brightness must be 0-100, got {level}");
            }
            device.set_brightness(level)?;
            println!("Brightness set to {:.1}%", device.brightness()?);
        }
    }
    Ok(())
}

/// Get or set one LED zone
pub fn led(ctx: &Context, led_type: LedType, action: Option<LedAction>) -> CommandResult {
    let device = ctx.open()?;
    let led = device.led(led_type)?;

    match action.unwrap_or(LedAction::Get) {
        LedAction::Get => {
            let state = led.get()?;
            println!("LED {}:", state.led_type);
            println!("  Enabled:    {}", if state.enabled { "on" } else { "off" });
            println!("  Color:      {}", state.color);
            println!("  Brightness: {:.1}%", state.brightness);
            println!("  Mode:       {}", state.mode.name());
        }
        LedAction::Color { color } => {
            led.set_color(color)?;
            println!("LED {led_type} color set to {color}");
        }
        LedAction::Brightness { level } => {
            led.set_brightness(level)?;
            println!("LED {led_type} brightness set to {:.1}%", led.brightness()?);
        }
        LedAction::Mode { mode } => {
            led.set_mode(mode)?;
            println!("LED {led_type} mode set to {}", mode.name());
        }
        LedAction::On => {
            led.set_enabled(true)?;
            println!("LED {led_type} on");
        }
        LedAction::Off => {
            led.set_enabled(false)?;
            println!("LED {led_type} off");
        }
    }
    Ok(())
}

/// Start a lighting effect
pub fn effect(ctx: &Context, command: EffectCommand) -> CommandResult {
    let effect = match command {
        EffectCommand::Disable => Effect::Disable,
        EffectCommand::Static { color } => Effect::Static(color),
        EffectCommand::Wave { direction } => Effect::Wave(direction),
        EffectCommand::Spectrum => Effect::Spectrum,
        EffectCommand::Reactive { color, speed } => Effect::Reactive { color, speed },
        EffectCommand::Breathe { colors } => Effect::Breathe(match colors.as_slice() {
            [] => BreatheColors::Random,
            [color] => BreatheColors::Single(*color),
            [first, second, ..] => BreatheColors::Dual(*first, *second),
        }),
        EffectCommand::Starlight { color, speed } => Effect::Starlight { color, speed },
        EffectCommand::CustomFrame => Effect::CustomFrame,
    };

    let device = ctx.open()?;
    device.set_effect(effect)?;
    println!("{}: {} effect started", device.name(), effect.kind());
    Ok(())
}

/// Clear the matrix and stop effects
pub fn reset(ctx: &Context) -> CommandResult {
    let device = ctx.open()?;
    device.reset()?;
    println!("{} reset", device.name());
    Ok(())
}
