use std::collections::HashMap;
use std::fmt;

use crate::data::model::{Label, PixelDataset, SourceId};
use crate::error::AnalysisError;

// ---------------------------------------------------------------------------
// Label statistics report
// ---------------------------------------------------------------------------

/// Descriptive statistics about the expert labels.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelStats {
    /// Pixels per image, ascending by source.
    pub pixel_counts: Vec<(SourceId, usize)>,
    /// Total number of pixels in the dataset.
    pub total_pixels: usize,
    /// Per-image label fractions in [`Label::REPORT_ORDER`]; each row sums to 1.
    pub label_fractions: Vec<(SourceId, [f64; 3])>,
    /// Unweighted mean of the per-image fractions.
    pub mean_fractions: [f64; 3],
    /// Number of `(x, y, source)` triples that occur more than once.
    pub duplicate_coordinates: usize,
}

impl LabelStats {
    pub fn has_duplicates(&self) -> bool {
        self.duplicate_coordinates > 0
    }
}

/// Compute pixel counts, per-class percentages and the duplicate check.
pub fn label_stats(dataset: &PixelDataset) -> Result<LabelStats, AnalysisError> {
    if dataset.is_empty() {
        return Err(AnalysisError::EmptyDataset);
    }

    let groups = dataset.by_source();

    let pixel_counts: Vec<(SourceId, usize)> = groups
        .iter()
        .map(|(source, rows)| ((*source).clone(), rows.len()))
        .collect();

    let label_fractions: Vec<(SourceId, [f64; 3])> = groups
        .iter()
        .map(|(source, rows)| {
            let mut counts = [0usize; 3];
            for obs in rows {
                counts[report_column(obs.label)] += 1;
            }
            let n = rows.len() as f64;
            ((*source).clone(), counts.map(|c| c as f64 / n))
        })
        .collect();

    // Mean across images, not a pooled percentage: images of different
    // size carry equal weight.
    let n_sources = label_fractions.len() as f64;
    let mut mean_fractions = [0.0; 3];
    for (_, fractions) in &label_fractions {
        for (acc, f) in mean_fractions.iter_mut().zip(fractions) {
            *acc += f;
        }
    }
    for acc in &mut mean_fractions {
        *acc /= n_sources;
    }

    let mut seen: HashMap<(i64, i64, &SourceId), usize> = HashMap::new();
    for obs in &dataset.observations {
        *seen.entry((obs.x, obs.y, &obs.source)).or_default() += 1;
    }
    let duplicate_coordinates = seen.values().filter(|&&n| n > 1).count();

    Ok(LabelStats {
        pixel_counts,
        total_pixels: dataset.len(),
        label_fractions,
        mean_fractions,
        duplicate_coordinates,
    })
}

/// Print the report to standard output.
pub fn print_label_stats(stats: &LabelStats) {
    if stats.has_duplicates() {
        log::warn!(
            "{} coordinate triple(s) appear more than once",
            stats.duplicate_coordinates
        );
    }
    print!("{stats}");
}

fn report_column(label: Label) -> usize {
    match label {
        Label::Cloudy => 0,
        Label::CloudFree => 1,
        Label::Unlabeled => 2,
    }
}

/// `0.35271` → `"35.27%"`.
pub fn format_percent(fraction: f64) -> String {
    format!("{:.2}%", fraction * 100.0)
}

// ---------------------------------------------------------------------------
// Text rendering
// ---------------------------------------------------------------------------

const TOTAL_ROW: &str = "Total";
const CELL_WIDTH: usize = 10;

impl fmt::Display for LabelStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key_width = self
            .pixel_counts
            .iter()
            .map(|(s, _)| s.to_string().len())
            .chain([TOTAL_ROW.len(), "source".len()])
            .max()
            .unwrap_or(0)
            + 2;

        writeln!(f, "> Number of pixels in each image:")?;
        writeln!(f, "{:<key_width$}", "source")?;
        for (source, count) in &self.pixel_counts {
            writeln!(f, "{:<key_width$}{count:>CELL_WIDTH$}", source.to_string())?;
        }
        writeln!(f, "{TOTAL_ROW:<key_width$}{:>CELL_WIDTH$}", self.total_pixels)?;
        writeln!(f)?;

        writeln!(f, "> Percentage of pixels in each class:")?;
        write!(f, "{:<key_width$}", "label")?;
        for label in Label::REPORT_ORDER {
            write!(f, "{:>CELL_WIDTH$}", label.to_string())?;
        }
        writeln!(f)?;
        writeln!(f, "{:<key_width$}", "source")?;
        let rows = self
            .label_fractions
            .iter()
            .map(|(s, fr)| (s.to_string(), fr))
            .chain([(TOTAL_ROW.to_string(), &self.mean_fractions)]);
        for (name, fractions) in rows {
            write!(f, "{name:<key_width$}")?;
            for fr in fractions {
                write!(f, "{:>CELL_WIDTH$}", format_percent(*fr))?;
            }
            writeln!(f)?;
        }
        writeln!(f)?;

        if self.has_duplicates() {
            writeln!(f, "> Detected observations with same coordinates")
        } else {
            writeln!(f, "> No observations with same coordinates found in each image")
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::data::model::tests::obs;
    use crate::data::model::Observation;

    /// `n` pixels of `label` in image `source`, on distinct coordinates
    /// starting at column `offset`.
    fn pixels(source: i64, label: Label, n: usize, offset: i64) -> Vec<Observation> {
        (0..n as i64)
            .map(|i| obs(source, offset + i, source, label))
            .collect()
    }

    /// Sources A=1, B=2, C=3 with label counts
    /// A:{1:30,-1:50,0:20}, B:{1:40,-1:40,0:20}, C:{1:25,-1:65,0:10}.
    fn three_images() -> PixelDataset {
        let mut rows = Vec::new();
        for (source, counts) in [(1, [30, 50, 20]), (2, [40, 40, 20]), (3, [25, 65, 10])] {
            let mut offset = 0;
            for (label, n) in Label::REPORT_ORDER.into_iter().zip(counts) {
                rows.extend(pixels(source, label, n, offset));
                offset += n as i64;
            }
        }
        PixelDataset::from_observations(rows)
    }

    #[test]
    fn counts_sum_to_total() {
        let stats = label_stats(&three_images()).unwrap();
        let sum: usize = stats.pixel_counts.iter().map(|(_, n)| n).sum();
        assert_eq!(sum, stats.total_pixels);
        assert_eq!(stats.total_pixels, 300);
        assert_eq!(stats.pixel_counts[0], (SourceId::Integer(1), 100));
    }

    #[test]
    fn fractions_per_image_sum_to_one() {
        let stats = label_stats(&three_images()).unwrap();
        for (_, fr) in &stats.label_fractions {
            assert_abs_diff_eq!(fr.iter().sum::<f64>(), 1.0, epsilon = 1e-4);
        }
        assert_eq!(stats.label_fractions[2].1, [0.25, 0.65, 0.10]);
    }

    #[test]
    fn total_row_is_unweighted_mean() {
        let stats = label_stats(&three_images()).unwrap();
        let shown: Vec<String> = stats.mean_fractions.iter().map(|f| format_percent(*f)).collect();
        assert_eq!(shown, ["31.67%", "51.67%", "16.67%"]);
    }

    #[test]
    fn mean_divides_by_actual_source_count() {
        let mut rows = pixels(1, Label::Cloudy, 10, 0);
        rows.extend(pixels(2, Label::CloudFree, 30, 0));
        let stats = label_stats(&PixelDataset::from_observations(rows)).unwrap();
        // A pooled percentage would give 25% cloudy; the mean gives 50%.
        assert_eq!(stats.mean_fractions, [0.5, 0.5, 0.0]);
    }

    #[test]
    fn absent_label_is_zero_percent() {
        let stats =
            label_stats(&PixelDataset::from_observations(pixels(4, Label::Unlabeled, 3, 0)))
                .unwrap();
        assert_eq!(stats.label_fractions[0].1, [0.0, 0.0, 1.0]);
    }

    #[test]
    fn duplicate_check_requires_same_image() {
        // Same (x, y) in different images is fine.
        let ds = PixelDataset::from_observations(vec![
            obs(1, 5, 5, Label::Cloudy),
            obs(2, 5, 5, Label::Cloudy),
        ]);
        let stats = label_stats(&ds).unwrap();
        assert!(!stats.has_duplicates());
        assert!(stats.to_string().contains("> No observations with same coordinates found"));

        let ds = PixelDataset::from_observations(vec![
            obs(1, 5, 5, Label::Cloudy),
            obs(1, 5, 5, Label::CloudFree),
            obs(1, 5, 5, Label::Unlabeled),
            obs(1, 6, 5, Label::Unlabeled),
        ]);
        let stats = label_stats(&ds).unwrap();
        assert_eq!(stats.duplicate_coordinates, 1);
        assert!(stats.to_string().contains("> Detected observations with same coordinates"));
    }

    #[test]
    fn empty_dataset_fails() {
        assert!(matches!(
            label_stats(&PixelDataset::default()),
            Err(AnalysisError::EmptyDataset)
        ));
    }

    #[test]
    fn report_lists_sections_and_total_rows() {
        let ds = three_images();
        let text = label_stats(&ds).unwrap().to_string();
        assert!(text.starts_with("> Number of pixels in each image:\n"));
        assert!(text.contains("> Percentage of pixels in each class:"));
        let total_lines: Vec<&str> = text.lines().filter(|l| l.starts_with("Total")).collect();
        assert_eq!(total_lines.len(), 2);
        assert!(total_lines[0].ends_with("300"));
        assert!(total_lines[1].contains("31.67%"));
        // Idempotent: no hidden state in the dataset or the computation.
        assert_eq!(text, label_stats(&ds).unwrap().to_string());
    }
}
