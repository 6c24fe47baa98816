use crate::analysis::{self, LabelStats};
use crate::chart::Figure;
use crate::data::model::PixelDataset;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
#[derive(Default)]
pub struct AppState {
    /// Label statistics for the loaded dataset.
    pub report: Option<LabelStats>,

    /// Figures available as tabs.
    pub figures: Vec<Figure>,

    /// Index of the figure shown in the central panel.
    pub selected: usize,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(report: LabelStats, figures: Vec<Figure>) -> Self {
        Self {
            report: Some(report),
            figures,
            selected: 0,
            status_message: None,
        }
    }

    /// Recompute the report and figures for a newly loaded dataset.
    ///
    /// On failure the previous results stay on screen and the error is
    /// shown in the status line.
    pub fn set_dataset(&mut self, dataset: &PixelDataset) {
        match analysis::analyze(dataset) {
            Ok((report, figures)) => {
                self.report = Some(report);
                self.figures = figures;
                self.selected = 0;
                self.status_message = None;
            }
            Err(e) => {
                log::error!("Analysis failed: {e}");
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    pub fn current_figure(&self) -> Option<&Figure> {
        self.figures.get(self.selected)
    }

    /// Select a figure tab; out-of-range indices are ignored.
    pub fn select(&mut self, index: usize) {
        if index < self.figures.len() {
            self.selected = index;
        }
    }
}
