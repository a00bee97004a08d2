//! Blend a synthetic horizontal pan and write the luma plane as a PGM file.
//!
//! Usage: `cargo run -p panorama --example synthetic_pan -- [output.pgm] [blend-type]`
//! where blend-type is one of none, full, pan, cylindrical, strip.

use std::io::Write;
use std::thread;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use glam::DVec2;

use panorama::prelude::*;

const FRAME_WIDTH: usize = 320;
const FRAME_HEIGHT: usize = 240;
const FRAME_COUNT: usize = 6;
const STEP: f64 = 180.0;
const ROLL_PER_FRAME: f64 = 0.01;

fn parse_blend_type(name: &str) -> Result<BlendType> {
    Ok(match name {
        "none" => BlendType::None,
        "full" => BlendType::Full,
        "pan" => BlendType::Pan,
        "cylindrical" => BlendType::CylindricalPan,
        "strip" => BlendType::HorizontalStrip,
        other => bail!("Unknown blend type {other:?}"),
    })
}

/// Frames cut from one smooth scene, each with its own exposure so the seams
/// would be visible without blending.
fn synthetic_frames() -> Result<Vec<Frame>> {
    (0..FRAME_COUNT)
        .map(|i| {
            let offset = DVec2::new(STEP * i as f64, 4.0 * i as f64);
            let exposure = 0.85 + 0.06 * i as f64;
            let n = FRAME_WIDTH * FRAME_HEIGHT;
            let (mut y, mut u, mut v) = (Vec::with_capacity(n), Vec::with_capacity(n), Vec::with_capacity(n));
            for row in 0..FRAME_HEIGHT {
                for col in 0..FRAME_WIDTH {
                    let sx = col as f64 + offset.x;
                    let sy = row as f64 + offset.y;
                    let luma = 120.0 + 50.0 * (sx * 0.02).sin() * (sy * 0.03).cos();
                    y.push((luma * exposure).clamp(0.0, 255.0) as u8);
                    u.push((128.0 + 20.0 * (sx * 0.01).cos()) as u8);
                    v.push((128.0 - 15.0 * (sy * 0.02).sin()) as u8);
                }
            }
            let transform = DMat3::euclidean(offset, ROLL_PER_FRAME * i as f64);
            Frame::new(FRAME_WIDTH, FRAME_HEIGHT, y, u, v, transform)
                .with_context(|| format!("Failed to build frame {i}"))
        })
        .collect()
}

fn write_pgm(path: &str, width: usize, height: usize, luma: &[u8]) -> Result<()> {
    let mut file =
        std::fs::File::create(path).with_context(|| format!("Failed to create {path}"))?;
    write!(file, "P5\n{width} {height}\n255\n")?;
    file.write_all(luma)?;
    Ok(())
}

fn main() -> Result<()> {
    common::log_setup::setup_logging("info");

    let mut args = std::env::args().skip(1);
    let output = args.next().unwrap_or_else(|| "panorama.pgm".to_string());
    let blend_type = parse_blend_type(args.next().as_deref().unwrap_or("cylindrical"))?;

    let frames = synthetic_frames()?;
    let blender = Blender::new(BlendConfig::default().with_blend_type(blend_type));
    let cancel = CancelFlag::new();
    let progress = Progress::new();

    let image = thread::scope(|scope| {
        let worker = scope.spawn(|| blender.run(&frames, &cancel, &progress));
        while !worker.is_finished() {
            tracing::info!("Blending {:.0}%", progress.get() * 100.0);
            thread::sleep(Duration::from_millis(200));
        }
        worker.join()
    })
    .map_err(|_| anyhow::anyhow!("Blending thread panicked"))?
    .context("Blending failed")?;

    tracing::info!(
        width = image.width,
        height = image.height,
        crop = ?image.crop,
        "Writing {output}"
    );
    write_pgm(&output, image.width, image.height, image.y_plane())
}
