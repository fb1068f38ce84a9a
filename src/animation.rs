//! Animated GIF assembly from rendered PNG frames.

use anyhow::{Context, Result, anyhow, bail};
use resvg::tiny_skia::Pixmap;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::info;

/// NeuQuant sampling speed, 1 (best) to 30 (fastest).
const QUANTIZE_SPEED: i32 = 10;

/// Frame delay in hundredths of a second for `fps` frames per second.
pub fn frame_delay(fps: u32) -> u16 {
    (100 / fps.max(1)).max(1) as u16
}

/// Writes `frames` to `output` as a looping GIF at `fps` frames per second.
///
/// Every frame must have the size of the first.
#[tracing::instrument(skip(frames, output), fields(frames = frames.len(), output = %output.display()))]
pub fn write_animation(frames: &[PathBuf], output: &Path, fps: u32) -> Result<()> {
    let Some(first) = frames.first() else {
        bail!("No frames to animate");
    };
    let first = load_frame(first)?;
    let (width, height) = (first.width(), first.height());
    let (w16, h16) = match (u16::try_from(width), u16::try_from(height)) {
        (Ok(w), Ok(h)) => (w, h),
        _ => bail!("Frame size {width}x{height} is too large for a GIF"),
    };

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(output).with_context(|| format!("Failed to create {}", output.display()))?;
    let mut encoder = gif::Encoder::new(file, w16, h16, &[])?;
    encoder.set_repeat(gif::Repeat::Infinite)?;

    let delay = frame_delay(fps);
    for (idx, path) in frames.iter().enumerate() {
        let pixmap = if idx == 0 { first.clone() } else { load_frame(path)? };
        if (pixmap.width(), pixmap.height()) != (width, height) {
            return Err(anyhow!(
                "Frame {} is {}x{}, expected {width}x{height}",
                path.display(),
                pixmap.width(),
                pixmap.height()
            ));
        }
        let mut rgba = demultiplied_rgba(&pixmap);
        let mut frame = gif::Frame::from_rgba_speed(w16, h16, &mut rgba, QUANTIZE_SPEED);
        frame.delay = delay;
        encoder.write_frame(&frame)?;
    }

    info!(frames = frames.len(), delay, "Animation written");
    Ok(())
}

fn load_frame(path: &Path) -> Result<Pixmap> {
    Pixmap::load_png(path).with_context(|| format!("Failed to read frame {}", path.display()))
}

fn demultiplied_rgba(pixmap: &Pixmap) -> Vec<u8> {
    pixmap
        .pixels()
        .iter()
        .flat_map(|p| {
            let c = p.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
        .collect()
}
