//! Ordinary least squares of tract outcome on tract mean nitrate
//!
//! Fits `outcome = intercept + slope * mean_nitrate` and reports the slope's
//! two-sided p-value and 95% confidence interval from Student's t with
//! `n - 2` degrees of freedom.

use nitrogis_core::{Error, Result};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, StudentsT};

use super::zonal::ZonalRow;

/// Fewest usable rows for a fit with a residual degree of freedom
pub const MIN_OBSERVATIONS: usize = 3;

/// Result of one OLS fit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionResult {
    /// Rows used in the fit
    pub n: usize,
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
    /// Two-sided p-value of the slope
    pub p_value: f64,
    /// 95% confidence interval of the slope
    pub slope_ci: (f64, f64),
    /// IDW power the predictor surface was built with
    pub power: f64,
}

/// Fit OLS over the rows that have both a finite mean and a finite outcome.
pub fn fit_ols(rows: &[ZonalRow], power: f64) -> Result<RegressionResult> {
    let (x, y): (Vec<f64>, Vec<f64>) = rows
        .iter()
        .filter_map(|r| match (r.mean_nitrate, r.outcome) {
            (Some(m), Some(o)) if m.is_finite() && o.is_finite() => Some((m, o)),
            _ => None,
        })
        .unzip();

    let mut result = ols(&x, &y)?;
    result.power = power;
    Ok(result)
}

/// Simple linear regression of `y` on `x`.
///
/// # Errors
/// - `InsufficientData` with fewer than [`MIN_OBSERVATIONS`] pairs
/// - `DegenerateInput` when `x` has no spread
/// - `InvalidParameter` when `x` and `y` differ in length
pub fn ols(x: &[f64], y: &[f64]) -> Result<RegressionResult> {
    if x.len() != y.len() {
        return Err(Error::invalid_parameter(
            "y",
            y.len(),
            format!("length must match x ({})", x.len()),
        ));
    }
    let n = x.len();
    if n < MIN_OBSERVATIONS {
        return Err(Error::InsufficientData {
            valid: n,
            required: MIN_OBSERVATIONS,
        });
    }
    let nf = n as f64;

    let mean_x = x.iter().sum::<f64>() / nf;
    let mean_y = y.iter().sum::<f64>() / nf;

    let (mut sxx, mut sxy, mut syy) = (0.0, 0.0, 0.0);
    for (&xi, &yi) in x.iter().zip(y) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        sxx += dx * dx;
        sxy += dx * dy;
        syy += dy * dy;
    }

    // spread below ~1e-12 of the predictor's magnitude is rounding noise
    let scale = x.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
    if sxx <= nf * (1e-12 * scale).powi(2) {
        return Err(Error::DegenerateInput(format!(
            "predictor has no variance across {} rows",
            n
        )));
    }

    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;

    let ss_res = y
        .iter()
        .zip(x)
        .map(|(&yi, &xi)| {
            let e = yi - (intercept + slope * xi);
            e * e
        })
        .sum::<f64>();
    let r_squared = if syy > 0.0 {
        (1.0 - ss_res / syy).clamp(0.0, 1.0)
    } else {
        0.0
    };

    let df = nf - 2.0;
    let se = (ss_res / df / sxx).sqrt();

    let t_dist = StudentsT::new(0.0, 1.0, df)
        .map_err(|e| Error::Other(format!("t distribution with {} df: {}", df, e)))?;

    let (p_value, slope_ci) = if se > 0.0 {
        let t = slope / se;
        let half_width = t_dist.inverse_cdf(0.975) * se;
        (
            (2.0 * t_dist.sf(t.abs())).min(1.0),
            (slope - half_width, slope + half_width),
        )
    } else if slope == 0.0 {
        // flat response: no evidence of a relationship
        (1.0, (0.0, 0.0))
    } else {
        (0.0, (slope, slope))
    };

    Ok(RegressionResult {
        n,
        slope,
        intercept,
        r_squared,
        p_value,
        slope_ci,
        power: f64::NAN,
    })
}
