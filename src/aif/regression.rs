//! Ordinary least-squares fit of `y = intercept + slope * x`.

/// Result of a simple linear regression
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    /// Fitted slope
    pub slope: f64,
    /// Fitted intercept
    pub intercept: f64,
    /// Coefficient of determination
    pub r_squared: f64,
    /// R² adjusted for one predictor; `None` with two or fewer points
    pub adjusted_r_squared: Option<f64>,
    /// Number of points fitted
    pub n: usize,
}

/// Fit `points` as `(x, y)` pairs
///
/// Returns `None` for fewer than two points or when `x` or `y` has no
/// variance (slope or R² undefined).
pub fn linear_fit(points: &[(f64, f64)]) -> Option<LinearFit> {
    let n = points.len();
    if n < 2 {
        return None;
    }
    let nf = n as f64;
    let mean_x = points.iter().map(|p| p.0).sum::<f64>() / nf;
    let mean_y = points.iter().map(|p| p.1).sum::<f64>() / nf;

    let (mut sxx, mut sxy, mut syy) = (0.0, 0.0, 0.0);
    for &(x, y) in points {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxx += dx * dx;
        sxy += dx * dy;
        syy += dy * dy;
    }
    if sxx <= 0.0 || syy <= 0.0 {
        return None;
    }

    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;
    let r_squared = (sxy * sxy) / (sxx * syy);
    let adjusted_r_squared = (n > 2).then(|| 1.0 - (1.0 - r_squared) * (nf - 1.0) / (nf - 2.0));

    Some(LinearFit {
        slope,
        intercept,
        r_squared,
        adjusted_r_squared,
        n,
    })
}

/// Round `value` to `decimals` places
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
