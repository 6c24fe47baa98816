mod analysis;
mod app;
mod chart;
mod color;
mod data;
mod error;
mod render;
mod state;
mod ui;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use data::loader::{DataSource, FileSource};
use data::model::PixelDataset;
use render::{ChartRenderer, EguiRenderer, LogRenderer};

#[derive(Parser, Debug)]
#[command(
    name = "cloud-eda",
    about = "Label statistics, label maps and feature distributions for MISR cloud pixels"
)]
struct Args {
    /// Data files (imageN.txt, .csv, .json, .parquet). A file dialog opens when omitted.
    paths: Vec<PathBuf>,

    /// Print the report and build the figures without opening a window.
    /// Needs explicit PATHS, since the file dialog is a window too.
    #[arg(long, requires = "paths")]
    no_gui: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let paths = if args.paths.is_empty() {
        ui::panels::pick_data_files().context("no data files selected")?
    } else {
        args.paths
    };

    let dataset = FileSource::new(paths).load().inspect_err(|e| {
        log::error!("Failed to load data: {e:#}");
    })?;
    log::info!(
        "Loaded {} pixels from {} image(s)",
        dataset.len(),
        dataset.source_count()
    );

    if args.no_gui {
        run(&dataset, &mut LogRenderer)
    } else {
        run(&dataset, &mut EguiRenderer)
    }
}

/// Print the label report, build both figures and hand them to `renderer`.
fn run(dataset: &PixelDataset, renderer: &mut dyn ChartRenderer) -> Result<()> {
    let report = analysis::label_stats(dataset)?;
    analysis::print_label_stats(&report);

    let figures = vec![
        analysis::label_plot(dataset)?,
        analysis::feature_plot(dataset)?,
    ];
    renderer.render(&report, figures)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::LabelStats;
    use crate::chart::Figure;
    use crate::data::model::{Label, Observation, SourceId};
    use crate::error::AnalysisError;

    #[derive(Default)]
    struct Recording {
        calls: Vec<(usize, Vec<String>)>,
    }

    impl ChartRenderer for Recording {
        fn render(&mut self, report: &LabelStats, figures: Vec<Figure>) -> Result<(), AnalysisError> {
            self.calls.push((
                report.total_pixels,
                figures.into_iter().map(|f| f.title).collect(),
            ));
            Ok(())
        }
    }

    struct Failing;

    impl ChartRenderer for Failing {
        fn render(&mut self, _: &LabelStats, _: Vec<Figure>) -> Result<(), AnalysisError> {
            Err(AnalysisError::Rendering("no display".into()))
        }
    }

    fn dataset() -> PixelDataset {
        let rows = (0..12)
            .map(|i: i64| Observation {
                source: SourceId::Integer(i % 3),
                x: i,
                y: i / 3,
                label: Label::REPORT_ORDER[(i % 3) as usize],
                features: [i as f64, 1.0 + i as f64, 0.5 * i as f64, 1.0, 2.0, 3.0, 4.0, 5.0]
                    .map(|v| v + (i * i) as f64),
            })
            .collect();
        PixelDataset::from_observations(rows)
    }

    #[test]
    fn run_renders_label_map_then_distributions_once() {
        let mut renderer = Recording::default();
        run(&dataset(), &mut renderer).unwrap();
        assert_eq!(
            renderer.calls,
            [(12, vec!["Expert labels".to_string(), "Feature distributions".to_string()])]
        );
    }

    #[test]
    fn renderer_failure_propagates() {
        let err = run(&dataset(), &mut Failing).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AnalysisError>(),
            Some(AnalysisError::Rendering(msg)) if msg == "no display"
        ));
    }

    #[test]
    fn empty_dataset_is_not_rendered() {
        let mut renderer = Recording::default();
        assert!(run(&PixelDataset::default(), &mut renderer).is_err());
        assert!(renderer.calls.is_empty());
    }

    #[test]
    fn headless_renderer_accepts_figures() {
        run(&dataset(), &mut LogRenderer).unwrap();
    }

    #[test]
    fn cli_accepts_paths_and_flag() {
        let args = Args::parse_from(["cloud-eda", "image1.txt", "image2.txt", "--no-gui"]);
        assert_eq!(args.paths.len(), 2);
        assert!(args.no_gui);
    }

    #[test]
    fn headless_run_requires_paths() {
        let err = Args::try_parse_from(["cloud-eda", "--no-gui"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
        assert!(Args::try_parse_from(["cloud-eda"]).is_ok());
    }
}
