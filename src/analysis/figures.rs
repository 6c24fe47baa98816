use crate::analysis::kde::{GRID_POINTS, GaussianKde};
use crate::chart::{Figure, FigureLegend, GridLayout, LegendEntry, Series, Subplot};
use crate::color::{SourceColors, label_color};
use crate::data::model::{Feature, Label, PixelDataset, SourceId};
use crate::error::AnalysisError;

/// Screen-space marker radius for the label scatter, in points.
///
/// A 0.1 pt² marker plus its 1 pt edge comes out near one point across, so
/// neighbouring pixels touch and a dense grid reads as solid colour.
pub const SCATTER_RADIUS: f32 = 1.0;

fn image_name(source: &SourceId) -> String {
    format!("Image {source}")
}

// ---------------------------------------------------------------------------
// Feature distributions
// ---------------------------------------------------------------------------

/// One KDE subplot per feature (2×4), one curve per image.
pub fn feature_plot(dataset: &PixelDataset) -> Result<Figure, AnalysisError> {
    if dataset.is_empty() {
        return Err(AnalysisError::EmptyDataset);
    }

    let colors = SourceColors::new(dataset.sources());
    let groups = dataset.by_source();

    let mut subplots = Vec::with_capacity(Feature::ALL.len());
    for feature in Feature::ALL {
        let title = feature.display_name();
        let mut series = Vec::with_capacity(groups.len());

        for (&source, rows) in &groups {
            let values: Vec<f64> = rows.iter().map(|o| o.feature(feature)).collect();
            let kde = GaussianKde::new(&values).map_err(|e| AnalysisError::DegenerateSample {
                feature,
                image: source.clone(),
                reason: e.reason(),
            })?;
            log::debug!(
                "{feature} / image {source}: n = {}, bandwidth = {:.5}",
                values.len(),
                kde.bandwidth()
            );

            series.push(Series::Line {
                name: image_name(source),
                color: colors.color_for(source),
                points: kde.curve(GRID_POINTS),
            });
        }

        subplots.push(Subplot {
            title: format!("Distribution of {title}"),
            x_label: title.to_string(),
            y_label: "Density".to_string(),
            series,
            show_legend: true,
        });
    }

    log::info!(
        "Built feature distributions: {} subplots × {} images",
        subplots.len(),
        groups.len()
    );

    Ok(Figure {
        title: "Feature distributions".to_string(),
        layout: GridLayout::new(2, 4),
        subplots,
        legend: None,
    })
}

// ---------------------------------------------------------------------------
// Spatial label map
// ---------------------------------------------------------------------------

/// Scatter of every pixel at `(x, y)` coloured by label, one panel per image.
pub fn label_plot(dataset: &PixelDataset) -> Result<Figure, AnalysisError> {
    if dataset.is_empty() {
        return Err(AnalysisError::EmptyDataset);
    }

    let groups = dataset.by_source();

    let subplots: Vec<Subplot> = groups
        .iter()
        .map(|(&source, rows)| {
            let series = Label::REPORT_ORDER
                .into_iter()
                .map(|label| Series::Scatter {
                    name: label.legend_text().to_string(),
                    color: label_color(label),
                    radius: SCATTER_RADIUS,
                    points: rows
                        .iter()
                        .filter(|o| o.label == label)
                        .map(|o| [o.x as f64, o.y as f64])
                        .collect(),
                })
                .collect();

            Subplot {
                title: image_name(source),
                x_label: "x".to_string(),
                y_label: "y".to_string(),
                series,
                show_legend: false,
            }
        })
        .collect();

    let legend = FigureLegend {
        entries: Label::REPORT_ORDER
            .into_iter()
            .map(|label| LegendEntry {
                label: label.legend_text().to_string(),
                color: label_color(label),
            })
            .collect(),
    };

    log::info!("Built label map for {} images", subplots.len());

    Ok(Figure {
        title: "Expert labels".to_string(),
        layout: GridLayout::row(subplots.len()),
        subplots,
        legend: Some(legend),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{CLOUD_FREE, CLOUDY, UNLABELED};
    use crate::data::model::Observation;

    fn pixel(source: i64, x: i64, y: i64, label: Label, seed: f64) -> Observation {
        let mut features = [0.0; 8];
        for (i, f) in features.iter_mut().enumerate() {
            *f = seed * (i + 1) as f64 + (x * 3 + y) as f64 * 0.01;
        }
        Observation {
            source: SourceId::Integer(source),
            x,
            y,
            label,
            features,
        }
    }

    fn grid(sources: &[i64]) -> PixelDataset {
        let mut rows = Vec::new();
        for &s in sources {
            for x in 0..6 {
                for y in 0..4 {
                    let label = Label::REPORT_ORDER[((x + y) % 3) as usize];
                    rows.push(pixel(s, x, y, label, s as f64));
                }
            }
        }
        PixelDataset::from_observations(rows)
    }

    #[test]
    fn feature_plot_has_eight_panels_with_one_curve_per_image() {
        let fig = feature_plot(&grid(&[3, 1, 2])).unwrap();
        assert_eq!(fig.layout, GridLayout::new(2, 4));
        assert_eq!(fig.subplots.len(), 8);
        for (sub, feature) in fig.subplots.iter().zip(Feature::ALL) {
            assert_eq!(sub.title, format!("Distribution of {}", feature.display_name()));
            assert_eq!(sub.x_label, feature.display_name());
            assert!(sub.show_legend);
            let names: Vec<&str> = sub.series.iter().map(|s| s.name()).collect();
            assert_eq!(names, ["Image 1", "Image 2", "Image 3"]);
            assert!(sub.series.iter().all(|s| s.points().len() == GRID_POINTS));
        }
    }

    #[test]
    fn image_colour_is_consistent_across_panels() {
        let fig = feature_plot(&grid(&[1, 2])).unwrap();
        let first: Vec<_> = fig.subplots[0].series.iter().map(|s| s.color()).collect();
        for sub in &fig.subplots[1..] {
            let colors: Vec<_> = sub.series.iter().map(|s| s.color()).collect();
            assert_eq!(colors, first);
        }
    }

    #[test]
    fn constant_feature_is_reported() {
        let rows = vec![
            pixel(1, 0, 0, Label::Cloudy, 0.0),
            pixel(1, 0, 0, Label::Cloudy, 0.0),
        ];
        let err = feature_plot(&PixelDataset::from_observations(rows)).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::DegenerateSample {
                feature: Feature::Ndai,
                ..
            }
        ));
    }

    #[test]
    fn label_plot_has_one_panel_per_image_in_a_row() {
        let ds = grid(&[2, 1, 4, 3]);
        let fig = label_plot(&ds).unwrap();
        assert_eq!(fig.layout, GridLayout::row(4));
        let titles: Vec<&str> = fig.subplots.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, ["Image 1", "Image 2", "Image 3", "Image 4"]);

        for sub in &fig.subplots {
            let n: usize = sub.series.iter().map(|s| s.points().len()).sum();
            assert_eq!(n, 24);
        }
    }

    #[test]
    fn label_plot_colours_depend_only_on_label() {
        let ds = grid(&[1]);
        let fig = label_plot(&ds).unwrap();
        let sub = &fig.subplots[0];

        for series in &sub.series {
            let Series::Scatter { color, radius, points, .. } = series else {
                panic!("expected scatter series");
            };
            assert_eq!(*radius, SCATTER_RADIUS);
            let label = ds
                .observations
                .iter()
                .find(|o| label_color(o.label) == *color)
                .map(|o| o.label)
                .unwrap();
            let expected: Vec<[f64; 2]> = ds
                .observations
                .iter()
                .filter(|o| o.label == label)
                .map(|o| [o.x as f64, o.y as f64])
                .collect();
            assert_eq!(points, &expected);
        }

        let legend = fig.legend.unwrap();
        let entries: Vec<(&str, _)> = legend
            .entries
            .iter()
            .map(|e| (e.label.as_str(), e.color))
            .collect();
        assert_eq!(
            entries,
            [
                ("Cloudy (label = 1)", CLOUDY),
                ("Cloud-Free (label = -1)", CLOUD_FREE),
                ("Unlabeled (label = 0)", UNLABELED),
            ]
        );
    }

    #[test]
    fn figures_are_idempotent() {
        let ds = grid(&[1, 2, 3]);
        assert_eq!(label_plot(&ds).unwrap(), label_plot(&ds).unwrap());
        assert_eq!(feature_plot(&ds).unwrap(), feature_plot(&ds).unwrap());
    }

    #[test]
    fn label_markers_cover_at_least_half_a_point() {
        let fig = label_plot(&grid(&[1, 2])).unwrap();
        for series in fig.subplots.iter().flat_map(|s| &s.series) {
            let Series::Scatter { radius, .. } = series else {
                panic!("expected scatter series");
            };
            assert!(*radius >= 0.5, "radius {radius} is too small to see");
        }
    }

    #[test]
    fn empty_dataset_fails() {
        let ds = PixelDataset::default();
        assert!(matches!(feature_plot(&ds), Err(AnalysisError::EmptyDataset)));
        assert!(matches!(label_plot(&ds), Err(AnalysisError::EmptyDataset)));
    }
}
