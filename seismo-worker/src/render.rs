//! PNG chart rendering
//!
//! Draws plain bar charts on an RGB canvas and encodes them as PNG. Charts
//! carry no text; axis meaning comes from the job type.

use image::{ImageFormat, Rgb, RgbImage};
use std::io::Cursor;
use thiserror::Error;

const WIDTH: u32 = 800;
const HEIGHT: u32 = 500;
const MARGIN: u32 = 40;

/// Width of the plot area in pixels; at most one bar per column
pub const PLOT_WIDTH: u32 = WIDTH - 2 * MARGIN;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const AXIS: Rgb<u8> = Rgb([40, 40, 40]);
const GRID: Rgb<u8> = Rgb([225, 225, 225]);
const BAR: Rgb<u8> = Rgb([70, 130, 180]);
const EMPTY: Rgb<u8> = Rgb([245, 245, 245]);

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("PNG encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}

/// Bar chart of `values`, one bar per entry, left to right.
///
/// More entries than `PLOT_WIDTH` are merged into adjacent groups first.
pub fn bar_chart(values: &[usize]) -> Result<Vec<u8>, RenderError> {
    let mut canvas = frame();
    let merged = fit_to_width(values, PLOT_WIDTH as usize);
    let values = merged.as_slice();

    let max = values.iter().copied().max().unwrap_or(0);
    if values.is_empty() || max == 0 {
        return encode(&canvas);
    }

    let plot_height = HEIGHT - 2 * MARGIN;
    let baseline = HEIGHT - MARGIN;

    let slot = PLOT_WIDTH / values.len() as u32;
    let bar_width = (slot * 4 / 5).max(1);

    for (i, &value) in values.iter().enumerate() {
        if value == 0 {
            continue;
        }
        let bar_height = ((value as u64 * plot_height as u64) / max as u64).max(1) as u32;
        let x0 = MARGIN + i as u32 * slot + (slot - bar_width) / 2;
        fill_rect(&mut canvas, x0, baseline - bar_height, bar_width, bar_height, BAR);
    }

    encode(&canvas)
}

/// Sums adjacent entries so that at most `width` remain
fn fit_to_width(values: &[usize], width: usize) -> Vec<usize> {
    if values.len() <= width {
        return values.to_vec();
    }
    let group = values.len().div_ceil(width);
    values.chunks(group).map(|chunk| chunk.iter().sum()).collect()
}

/// Chart frame with a shaded plot area, used when there is nothing to plot
pub fn placeholder() -> Result<Vec<u8>, RenderError> {
    let mut canvas = frame();
    fill_rect(
        &mut canvas,
        MARGIN + 1,
        MARGIN,
        PLOT_WIDTH - 1,
        HEIGHT - 2 * MARGIN,
        EMPTY,
    );
    encode(&canvas)
}

/// White canvas with axes and horizontal grid lines
fn frame() -> RgbImage {
    let mut canvas = RgbImage::from_pixel(WIDTH, HEIGHT, BACKGROUND);
    let baseline = HEIGHT - MARGIN;
    let plot_height = HEIGHT - 2 * MARGIN;

    for step in 1..=4 {
        let y = baseline - plot_height * step / 4;
        fill_rect(&mut canvas, MARGIN, y, WIDTH - 2 * MARGIN, 1, GRID);
    }

    fill_rect(&mut canvas, MARGIN, baseline, WIDTH - 2 * MARGIN, 2, AXIS);
    fill_rect(&mut canvas, MARGIN, MARGIN, 2, plot_height, AXIS);
    canvas
}

fn fill_rect(canvas: &mut RgbImage, x: u32, y: u32, width: u32, height: u32, color: Rgb<u8>) {
    let x_end = (x + width).min(canvas.width());
    let y_end = (y + height).min(canvas.height());
    for py in y..y_end {
        for px in x..x_end {
            canvas.put_pixel(px, py, color);
        }
    }
}

fn encode(canvas: &RgbImage) -> Result<Vec<u8>, RenderError> {
    let mut png = Vec::new();
    canvas.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
    Ok(png)
}
