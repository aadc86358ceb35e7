//! Text renderers, one per dashboard screen.
//!
//! Renderers are pure: data in, text out. Fetching and cancellation live in
//! `main.rs`.

pub mod alerts;
pub mod charts;
pub mod details;
pub mod map;

/// Fixed-decimal rendering of an optional measure, `N/A` when missing
pub fn measure(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) => format!("{v:.decimals$}"),
        None => "N/A".to_string(),
    }
}
