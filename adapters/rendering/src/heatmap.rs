//! PNG export of per-item encounter heatmaps.

use std::{
    fs,
    path::{Path, PathBuf},
};

use ab_glyph::{FontRef, PxScale};
use anyhow::{Context, Result};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_text_mut, text_size};
use item_wheel_core::{ItemId, RaceProgress};
use item_wheel_system_heatmap::{HeatmapGrid, ProbabilityBucket};
use log::info;

const FONT_DATA: &[u8] = include_bytes!("../assets/DejaVuSans.ttf");

const CELL_SIZE: u32 = 48;
const MARGIN: u32 = 24;
const LINE_WIDTH: u32 = 2;
const TITLE_HEIGHT: u32 = 40;
const AXIS_TITLE_HEIGHT: u32 = 24;
const TICK_COLUMN_WIDTH: u32 = 40;
const TICK_ROW_HEIGHT: u32 = 24;
const TICK_PADDING: u32 = 6;
const LEGEND_GAP: u32 = 24;
const LEGEND_WIDTH: u32 = 32;
const LEGEND_LABEL_GAP: u32 = 8;
const LEGEND_LABEL_WIDTH: u32 = 56;

const GRID_LEFT: u32 = MARGIN + TICK_COLUMN_WIDTH;
const GRID_TOP: u32 = MARGIN + TITLE_HEIGHT + AXIS_TITLE_HEIGHT;

const TITLE_SCALE: f32 = 22.0;
const AXIS_SCALE: f32 = 16.0;
const TICK_SCALE: f32 = 14.0;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const LINE_COLOR: Rgb<u8> = Rgb([0, 0, 0]);
const TEXT_COLOR: Rgb<u8> = Rgb([0, 0, 0]);

/// Fill colour of a probability bucket.
#[must_use]
pub const fn bucket_color(bucket: ProbabilityBucket) -> Rgb<u8> {
    match bucket {
        ProbabilityBucket::Never => Rgb([244, 246, 204]),
        ProbabilityBucket::Low => Rgb([132, 178, 158]),
        ProbabilityBucket::High => Rgb([50, 107, 119]),
        ProbabilityBucket::Always => Rgb([18, 39, 64]),
    }
}

/// Chart title for `item`.
#[must_use]
pub fn title(item: ItemId) -> String {
    format!("{} - Item Encounter Rate", item.name())
}

/// File name the heatmap of `item` is saved under.
#[must_use]
pub fn file_name(item: ItemId) -> String {
    let stem = title(item).replace('-', "").replace(' ', "_");
    format!("{stem}.png")
}

/// Paints the grid with race position 0 on the top row and progress
/// increasing to the right.
///
/// The chart is titled, rows are labelled with race positions, columns with
/// one-based laps in half-lap steps, and the four bucket legend strip carries
/// its percentages.
pub fn render_heatmap(grid: &HeatmapGrid) -> Result<RgbImage> {
    let font = FontRef::try_from_slice(FONT_DATA).context("bundled heatmap font is unreadable")?;
    let heading = title(grid.item());

    let columns = grid.columns() as u32;
    let rows = grid.rows() as u32;
    let grid_width = columns * CELL_SIZE;
    let grid_height = rows * CELL_SIZE;
    let legend_x = GRID_LEFT + grid_width + LEGEND_GAP;
    let (title_width, _) = text_size(PxScale::from(TITLE_SCALE), &font, &heading);
    let width = (legend_x + LEGEND_WIDTH + LEGEND_LABEL_GAP + LEGEND_LABEL_WIDTH + MARGIN)
        .max(MARGIN + title_width + MARGIN);
    let height = GRID_TOP + grid_height + 2 * TICK_ROW_HEIGHT + MARGIN;

    let mut img = RgbImage::from_pixel(width, height, BACKGROUND);

    for (row, values) in grid.iter_rows().enumerate() {
        for (column, value) in values.iter().enumerate() {
            let color = bucket_color(ProbabilityBucket::from_probability(*value));
            fill_rect(
                &mut img,
                GRID_LEFT + column as u32 * CELL_SIZE,
                GRID_TOP + row as u32 * CELL_SIZE,
                CELL_SIZE,
                CELL_SIZE,
                color,
            );
        }
    }

    for column in 0..=columns {
        let x = (GRID_LEFT + column * CELL_SIZE).saturating_sub(LINE_WIDTH / 2);
        fill_rect(&mut img, x, GRID_TOP, LINE_WIDTH, grid_height, LINE_COLOR);
    }
    for row in 0..=rows {
        let y = (GRID_TOP + row * CELL_SIZE).saturating_sub(LINE_WIDTH / 2);
        fill_rect(&mut img, GRID_LEFT, y, grid_width, LINE_WIDTH, LINE_COLOR);
    }

    draw_label(&mut img, &font, TITLE_SCALE, MARGIN, MARGIN, &heading);
    draw_axes(&mut img, &font, grid, grid_width, grid_height);
    draw_legend(&mut img, &font, legend_x, grid_height);
    Ok(img)
}

/// Renders the grid and writes it into `dir` under [`file_name`].
pub fn save_heatmap(grid: &HeatmapGrid, dir: impl AsRef<Path>) -> Result<PathBuf> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create heatmap directory {}", dir.display()))?;

    let path = dir.join(file_name(grid.item()));
    render_heatmap(grid)?
        .save(&path)
        .with_context(|| format!("failed to write heatmap {}", path.display()))?;
    info!("wrote {} to {}", title(grid.item()), path.display());
    Ok(path)
}

fn draw_axes(
    img: &mut RgbImage,
    font: &FontRef<'_>,
    grid: &HeatmapGrid,
    grid_width: u32,
    grid_height: u32,
) {
    let first_position = u32::from(grid.first_position());
    for row in 0..grid.rows() as u32 {
        let label = (first_position + row).to_string();
        let (label_width, label_height) = text_size(PxScale::from(TICK_SCALE), font, &label);
        let x = GRID_LEFT.saturating_sub(label_width + TICK_PADDING);
        let y = GRID_TOP + row * CELL_SIZE + CELL_SIZE.saturating_sub(label_height) / 2;
        draw_label(img, font, TICK_SCALE, x, y, &label);
    }

    // Half-lap columns never exceed the u8 progress range.
    let first_step = grid.first_progress().half_laps();
    let tick_y = GRID_TOP + grid_height + TICK_PADDING;
    for (column, offset) in (0..=u8::MAX).take(grid.columns()).enumerate() {
        let progress = RaceProgress::from_half_laps(first_step.saturating_add(offset));
        let label = format!("{:.1}", progress.as_laps() + 1.0);
        let (label_width, _) = text_size(PxScale::from(TICK_SCALE), font, &label);
        let x = GRID_LEFT + column as u32 * CELL_SIZE + CELL_SIZE.saturating_sub(label_width) / 2;
        draw_label(img, font, TICK_SCALE, x, tick_y, &label);
    }

    let (lap_width, _) = text_size(PxScale::from(AXIS_SCALE), font, "Lap");
    let lap_x = GRID_LEFT + grid_width.saturating_sub(lap_width) / 2;
    draw_label(img, font, AXIS_SCALE, lap_x, tick_y + TICK_ROW_HEIGHT, "Lap");
    draw_label(
        img,
        font,
        AXIS_SCALE,
        MARGIN,
        GRID_TOP - AXIS_TITLE_HEIGHT,
        "Race Position",
    );
}

fn draw_legend(img: &mut RgbImage, font: &FontRef<'_>, x: u32, grid_height: u32) {
    let buckets = ProbabilityBucket::ALL.len() as u32;
    let block = grid_height / buckets;
    if block == 0 {
        return;
    }

    // Highest bucket on top, matching a vertical colour bar.
    let label_x = x + LEGEND_WIDTH + LEGEND_LABEL_GAP;
    for (index, bucket) in ProbabilityBucket::ALL.iter().rev().enumerate() {
        let y = GRID_TOP + index as u32 * block;
        fill_rect(img, x, y, LEGEND_WIDTH, block, bucket_color(*bucket));

        let (_, label_height) = text_size(PxScale::from(TICK_SCALE), font, bucket.label());
        let label_y = y + block.saturating_sub(label_height) / 2;
        draw_label(img, font, TICK_SCALE, label_x, label_y, bucket.label());
    }

    let legend_height = block * buckets;
    fill_rect(img, x, GRID_TOP, LEGEND_WIDTH, LINE_WIDTH, LINE_COLOR);
    fill_rect(img, x, GRID_TOP + legend_height - LINE_WIDTH, LEGEND_WIDTH, LINE_WIDTH, LINE_COLOR);
    fill_rect(img, x, GRID_TOP, LINE_WIDTH, legend_height, LINE_COLOR);
    fill_rect(img, x + LEGEND_WIDTH - LINE_WIDTH, GRID_TOP, LINE_WIDTH, legend_height, LINE_COLOR);
}

fn draw_label(img: &mut RgbImage, font: &FontRef<'_>, scale: f32, x: u32, y: u32, text: &str) {
    draw_text_mut(img, TEXT_COLOR, x as i32, y as i32, PxScale::from(scale), font, text);
}

fn fill_rect(img: &mut RgbImage, x: u32, y: u32, width: u32, height: u32, color: Rgb<u8>) {
    let x_end = (x + width).min(img.width());
    let y_end = (y + height).min(img.height());
    for py in y..y_end {
        for px in x..x_end {
            img.put_pixel(px, py, color);
        }
    }
}
