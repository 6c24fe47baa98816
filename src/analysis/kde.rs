use std::f64::consts::PI;

/// Number of evaluation points per density curve.
pub const GRID_POINTS: usize = 1000;

/// Why a sample cannot be smoothed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KdeError {
    TooFewSamples,
    ZeroVariance,
    NonFinite,
}

impl KdeError {
    pub fn reason(self) -> &'static str {
        match self {
            KdeError::TooFewSamples => "fewer than two samples",
            KdeError::ZeroVariance => "all samples are equal",
            KdeError::NonFinite => "sample contains NaN or infinite values",
        }
    }
}

/// Gaussian kernel density estimate with Scott's rule bandwidth.
#[derive(Debug, Clone)]
pub struct GaussianKde<'a> {
    samples: &'a [f64],
    bandwidth: f64,
}

impl<'a> GaussianKde<'a> {
    pub fn new(samples: &'a [f64]) -> Result<Self, KdeError> {
        if samples.len() < 2 {
            return Err(KdeError::TooFewSamples);
        }
        if samples.iter().any(|v| !v.is_finite()) {
            return Err(KdeError::NonFinite);
        }
        let n = samples.len() as f64;
        let mean = samples.iter().sum::<f64>() / n;
        let var = samples.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
        if var <= 0.0 {
            return Err(KdeError::ZeroVariance);
        }
        // Scott: h = σ · n^(-1/5)
        let bandwidth = var.sqrt() * n.powf(-0.2);
        Ok(Self { samples, bandwidth })
    }

    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    pub fn density(&self, x: f64) -> f64 {
        let h = self.bandwidth;
        let norm = 1.0 / (self.samples.len() as f64 * h * (2.0 * PI).sqrt());
        let sum: f64 = self
            .samples
            .iter()
            .map(|&xi| {
                let u = (x - xi) / h;
                (-0.5 * u * u).exp()
            })
            .sum();
        norm * sum
    }

    /// Evaluate on `points` evenly spaced values covering the sample range
    /// padded by half the range on each side.
    pub fn curve(&self, points: usize) -> Vec<[f64; 2]> {
        let (min, max) = self
            .samples
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        let pad = 0.5 * (max - min);
        let (start, end) = (min - pad, max + pad);
        let step = if points > 1 {
            (end - start) / (points - 1) as f64
        } else {
            0.0
        };
        (0..points)
            .map(|i| {
                let x = start + step * i as f64;
                [x, self.density(x)]
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    use super::*;

    #[test]
    fn scott_bandwidth() {
        // mean 3, sample variance 2.5
        let s = [1.0, 2.0, 3.0, 4.0, 5.0];
        let kde = GaussianKde::new(&s).unwrap();
        assert_relative_eq!(kde.bandwidth(), 2.5f64.sqrt() * 5f64.powf(-0.2), epsilon = 1e-12);
    }

    #[test]
    fn density_integrates_to_about_one() {
        let s: Vec<f64> = (0..200).map(|i| (i as f64 * 0.37).sin() * 3.0).collect();
        let kde = GaussianKde::new(&s).unwrap();
        let curve = kde.curve(GRID_POINTS);
        assert_eq!(curve.len(), GRID_POINTS);
        let area: f64 = curve
            .windows(2)
            .map(|w| (w[1][0] - w[0][0]) * (w[0][1] + w[1][1]) / 2.0)
            .sum();
        assert_abs_diff_eq!(area, 1.0, epsilon = 0.02);
    }

    #[test]
    fn curve_spans_padded_range() {
        let s = [0.0, 10.0, 4.0];
        let curve = GaussianKde::new(&s).unwrap().curve(11);
        assert_relative_eq!(curve[0][0], -5.0);
        assert_relative_eq!(curve[10][0], 15.0);
        assert_relative_eq!(curve[1][0] - curve[0][0], 2.0);
    }

    #[test]
    fn symmetric_sample_peaks_in_the_middle() {
        let s = [-1.0, 0.0, 1.0];
        let kde = GaussianKde::new(&s).unwrap();
        assert!(kde.density(0.0) > kde.density(0.5));
        assert_relative_eq!(kde.density(0.7), kde.density(-0.7), epsilon = 1e-12);
    }

    #[test]
    fn degenerate_samples_are_rejected() {
        assert_eq!(GaussianKde::new(&[1.0]).unwrap_err(), KdeError::TooFewSamples);
        assert_eq!(GaussianKde::new(&[2.0, 2.0, 2.0]).unwrap_err(), KdeError::ZeroVariance);
        assert_eq!(GaussianKde::new(&[1.0, f64::NAN]).unwrap_err(), KdeError::NonFinite);
    }
}
