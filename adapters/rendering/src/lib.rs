#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Presentation adapters for item wheel statistics.
//!
//! [`report`] formats race states, drawn wheels and encounter percentages for
//! the console. [`heatmap`] paints per-item probability grids into PNG images.

pub mod heatmap;
pub mod report;

pub use heatmap::{bucket_color, file_name, render_heatmap, save_heatmap, title};
pub use report::{percentage_rows, StateReport};
