use eframe::egui;

use crate::analysis::LabelStats;
use crate::app::CloudEdaApp;
use crate::chart::{Figure, Series};
use crate::error::AnalysisError;
use crate::state::AppState;

const WINDOW_TITLE: &str = "Cloud EDA – Label Explorer";

// ---------------------------------------------------------------------------
// Renderer seam
// ---------------------------------------------------------------------------

/// Displays the analysis results.
pub trait ChartRenderer {
    fn render(&mut self, report: &LabelStats, figures: Vec<Figure>) -> Result<(), AnalysisError>;
}

// ---------------------------------------------------------------------------
// Native window
// ---------------------------------------------------------------------------

/// Opens an eframe window and blocks until the user closes it.
#[derive(Debug, Default)]
pub struct EguiRenderer;

impl ChartRenderer for EguiRenderer {
    fn render(&mut self, report: &LabelStats, figures: Vec<Figure>) -> Result<(), AnalysisError> {
        let state = AppState::new(report.clone(), figures);

        let options = eframe::NativeOptions {
            viewport: egui::ViewportBuilder::default()
                .with_inner_size([1400.0, 800.0])
                .with_min_inner_size([700.0, 400.0]),
            ..Default::default()
        };

        eframe::run_native(
            WINDOW_TITLE,
            options,
            Box::new(move |cc| {
                // Label colours are fixed greys and black; they need a light background.
                cc.egui_ctx.set_theme(egui::Theme::Light);
                Ok(Box::new(CloudEdaApp::new(state)))
            }),
        )?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Headless
// ---------------------------------------------------------------------------

/// Logs a one-line summary per figure instead of drawing anything.
#[derive(Debug, Default)]
pub struct LogRenderer;

impl ChartRenderer for LogRenderer {
    fn render(&mut self, _report: &LabelStats, figures: Vec<Figure>) -> Result<(), AnalysisError> {
        for fig in &figures {
            let points: usize = fig
                .subplots
                .iter()
                .flat_map(|s| &s.series)
                .map(|s: &Series| s.points().len())
                .sum();
            log::info!(
                "{}: {}×{} grid, {} subplots, {} points",
                fig.title,
                fig.layout.rows,
                fig.layout.cols,
                fig.subplots.len(),
                points
            );
        }
        Ok(())
    }
}
