//! Per-key matrix command handlers.

use std::sync::atomic::Ordering;
use std::thread;
use std::time::{Duration, Instant};

use super::{setup_interrupt_handler, CommandResult, Context};
use anyhow::anyhow;
use chroma_device::{ChromaDevice, Frame, Rgb};
use tracing::{debug, warn};

fn no_matrix(device: &ChromaDevice) -> anyhow::Error {
    anyhow!("{} has no per-key matrix", device.name())
}

/// Paint the whole matrix one color
pub fn fill(ctx: &Context, color: Rgb) -> CommandResult {
    let device = ctx.open()?;
    if !device.has_matrix() {
        return Err(no_matrix(&device));
    }
    device.with_frame(|frame| {
        frame.fill(color);
        Ok(())
    })?;
    let rows = device.show_frame()?;
    println!("Filled {rows} rows with {color}");
    Ok(())
}

/// Paint one row starting at `start`
pub fn row(ctx: &Context, row: usize, start: usize, colors: &[Rgb]) -> CommandResult {
    let device = ctx.open()?;
    if !device.has_matrix() {
        return Err(no_matrix(&device));
    }
    device.with_frame(|frame| frame.put_row(row, start, colors))?;
    device.show_frame()?;
    println!("Row {row} updated ({} keys)", colors.len());
    Ok(())
}

/// Stage one rainbow frame; `offset` shifts the hue per frame
fn paint_rainbow(frame: &mut Frame, offset: f32) {
    let width = frame.width();
    let height = frame.height();
    let colors: Vec<Rgb> = (0..width)
        .map(|col| Rgb::from_hsv(offset + col as f32 * 360.0 / width as f32, 1.0, 1.0))
        .collect();
    for row in 0..height {
        // put_row only fails out of bounds; rows and width come from the frame
        if let Err(e) = frame.put_row(row, 0, &colors) {
            warn!("Skipping row {row}: {e}");
        }
    }
}

/// Rainbow animation until Ctrl-C
pub fn animate(ctx: &Context, fps: u32) -> CommandResult {
    let device = ctx.open()?;
    if !device.has_matrix() {
        return Err(no_matrix(&device));
    }

    let running = setup_interrupt_handler();
    let interval = Duration::from_secs_f64(1.0 / f64::from(fps));
    let step = 360.0 / (2.0 * fps as f32);
    let mut offset = 0.0f32;
    let mut frames = 0u64;
    let mut custom_active = false;

    println!("Animating at {fps} fps, press Ctrl-C to stop");
    while running.load(Ordering::SeqCst) {
        let started = Instant::now();

        device.with_frame(|frame| {
            paint_rainbow(frame, offset);
            Ok(())
        })?;
        if custom_active {
            device.with_frame(|frame| frame.commit())?;
        } else {
            device.show_frame()?;
            custom_active = true;
        }

        frames += 1;
        offset = (offset + step) % 360.0;
        if let Some(rest) = interval.checked_sub(started.elapsed()) {
            thread::sleep(rest);
        }
    }

    debug!("Animation stopped after {frames} frames");
    println!("Stopped after {frames} frames");
    Ok(())
}
