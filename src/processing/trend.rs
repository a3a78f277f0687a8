//! LOWESS trend smoothing
//!
//! Locally weighted linear regression with tricube distance weights and
//! bisquare robustness re-weighting. The robustness passes run eagerly when
//! the curve is built; the final smoothing pass is evaluated point by point
//! as the `TrendCurve` iterator is consumed.

use statrs::statistics::{Data, Median};
use std::iter::FusedIterator;

use crate::config::TrendConfig;

/// Residual scale multiplier for bisquare weights
const ROBUSTNESS_SCALE: f64 = 6.0;
/// Relative median residual below which the fit is treated as exact
const RESIDUAL_NOISE_FLOOR: f64 = 1e-12;

/// Smoothed `(x, y)` pairs ordered by x. Finite and consumed once.
#[derive(Debug, Clone)]
pub struct TrendCurve {
    xs: Vec<f64>,
    ys: Vec<f64>,
    robustness: Vec<f64>,
    neighbours: usize,
    pos: usize,
    window_start: usize,
}

impl TrendCurve {
    /// Number of points in the neighbourhood of each local fit.
    pub const fn neighbours(&self) -> usize {
        self.neighbours
    }
}

impl Iterator for TrendCurve {
    type Item = (f64, f64);

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.xs.len() {
            return None;
        }
        let i = self.pos;
        self.window_start = advance_window(&self.xs, i, self.neighbours, self.window_start);
        let fitted = local_fit(&self.xs, &self.ys, &self.robustness, i, self.window_start, self.neighbours);
        self.pos += 1;
        Some((self.xs[i], fitted))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.xs.len() - self.pos;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for TrendCurve {}
impl FusedIterator for TrendCurve {}

/// Smooth `ys` against `xs`.
///
/// Pairs where either coordinate is not finite are dropped and the rest are
/// sorted by x. With fewer than two points the input is returned unchanged.
pub fn lowess(xs: &[f64], ys: &[f64], config: &TrendConfig) -> TrendCurve {
    let mut points: Vec<(f64, f64)> = xs
        .iter()
        .zip(ys)
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .map(|(&x, &y)| (x, y))
        .collect();
    points.sort_by(|a, b| a.0.total_cmp(&b.0));

    let n = points.len();
    let (xs, ys): (Vec<f64>, Vec<f64>) = points.into_iter().unzip();

    let frac = if config.frac.is_finite() && config.frac > 0.0 {
        config.frac.min(1.0)
    } else {
        1.0
    };
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    let neighbours = ((frac * n as f64).floor() as usize).max(2).min(n);

    let mut robustness = vec![1.0; n];
    let noise_floor = RESIDUAL_NOISE_FLOOR * ys.iter().fold(1.0_f64, |m, y| m.max(y.abs()));
    if n >= 2 {
        for _ in 0..config.iterations {
            let mut window_start = 0;
            let residuals: Vec<f64> = (0..n)
                .map(|i| {
                    window_start = advance_window(&xs, i, neighbours, window_start);
                    ys[i] - local_fit(&xs, &ys, &robustness, i, window_start, neighbours)
                })
                .collect();

            let scale = Data::new(residuals.iter().map(|r| r.abs()).collect::<Vec<_>>()).median();
            if scale <= noise_floor {
                break;
            }
            for (w, r) in robustness.iter_mut().zip(&residuals) {
                *w = bisquare(r / (ROBUSTNESS_SCALE * scale));
            }
        }
    }

    TrendCurve {
        xs,
        ys,
        robustness,
        neighbours,
        pos: 0,
        window_start: 0,
    }
}

/// Slide the `k`-wide window so it holds the k nearest neighbours of `xs[i]`.
fn advance_window(xs: &[f64], i: usize, k: usize, mut start: usize) -> usize {
    let n = xs.len();
    while start + k < n && xs[i] - xs[start] > xs[start + k] - xs[i] {
        start += 1;
    }
    start
}

fn local_fit(xs: &[f64], ys: &[f64], robustness: &[f64], i: usize, start: usize, k: usize) -> f64 {
    let x0 = xs[i];
    let end = (start + k).min(xs.len());
    let radius = (x0 - xs[start]).max(xs[end - 1] - x0);

    let mut sum_w = 0.0;
    let mut sum_wx = 0.0;
    let mut sum_wy = 0.0;
    let weights: Vec<f64> = (start..end)
        .map(|j| {
            let distance = if radius > 0.0 { (xs[j] - x0).abs() / radius } else { 0.0 };
            let w = tricube(distance) * robustness[j];
            sum_w += w;
            sum_wx += w * xs[j];
            sum_wy += w * ys[j];
            w
        })
        .collect();

    if sum_w <= 0.0 {
        return ys[i];
    }
    let mean_x = sum_wx / sum_w;
    let mean_y = sum_wy / sum_w;

    let (mut sxx, mut sxy) = (0.0, 0.0);
    for (offset, w) in weights.iter().enumerate() {
        let j = start + offset;
        let dx = xs[j] - mean_x;
        sxx += w * dx * dx;
        sxy += w * dx * (ys[j] - mean_y);
    }

    if sxx > f64::EPSILON * radius.max(1.0).powi(2) {
        mean_y + (sxy / sxx) * (x0 - mean_x)
    } else {
        mean_y
    }
}

fn tricube(u: f64) -> f64 {
    if u >= 1.0 {
        0.0
    } else {
        (1.0 - u.powi(3)).powi(3)
    }
}

fn bisquare(u: f64) -> f64 {
    if u.abs() >= 1.0 {
        0.0
    } else {
        (1.0 - u * u).powi(2)
    }
}
