//! Exploratory analysis of the labeled pixels.
//!
//! Each function reads the dataset and returns either a report or a
//! [`crate::chart::Figure`]; none of them print or draw by themselves
//! apart from [`stats::print_label_stats`].

pub mod figures;
pub mod kde;
pub mod stats;

pub use figures::{feature_plot, label_plot};
pub use stats::{LabelStats, label_stats, print_label_stats};

use crate::chart::Figure;
use crate::data::model::PixelDataset;
use crate::error::AnalysisError;

/// Run the whole analysis: the label report plus the label map and the
/// feature distributions, in that order.
pub fn analyze(dataset: &PixelDataset) -> Result<(LabelStats, Vec<Figure>), AnalysisError> {
    let report = label_stats(dataset)?;
    let figures = vec![label_plot(dataset)?, feature_plot(dataset)?];
    Ok((report, figures))
}
