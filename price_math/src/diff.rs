//! Differencing operators for integrated models
//!
//! A differencing scheme `(1 - B)^d (1 - B^s)^D` is represented as the
//! coefficient vector of the expanded backshift polynomial, lowest lag first.
//! The same vector is used to difference a series and to integrate forecasts
//! back onto the original scale.

use crate::{MathError, Result};

/// Multiply two polynomials given as coefficient vectors (lowest power first)
pub fn poly_mul(a: &[f64], b: &[f64]) -> Vec<f64> {
    if a.is_empty() || b.is_empty() {
        return Vec::new();
    }

    let mut product = vec![0.0; a.len() + b.len() - 1];
    for (i, &x) in a.iter().enumerate() {
        if x == 0.0 {
            continue;
        }
        for (j, &y) in b.iter().enumerate() {
            product[i + j] += x * y;
        }
    }
    product
}

/// Build the expanded polynomial of `(1 - B)^d (1 - B^period)^seasonal_d`
///
/// # Examples
///
/// ```
/// use price_math::difference_operator;
///
/// assert_eq!(difference_operator(1, 0, 0), vec![1.0, -1.0]);
/// assert_eq!(difference_operator(2, 0, 0), vec![1.0, -2.0, 1.0]);
/// ```
pub fn difference_operator(d: usize, seasonal_d: usize, period: usize) -> Vec<f64> {
    let mut operator = vec![1.0];

    for _ in 0..d {
        operator = poly_mul(&operator, &[1.0, -1.0]);
    }

    if period > 0 {
        let mut seasonal = vec![0.0; period + 1];
        seasonal[0] = 1.0;
        seasonal[period] = -1.0;
        for _ in 0..seasonal_d {
            operator = poly_mul(&operator, &seasonal);
        }
    }

    operator
}

/// Apply a differencing operator to a series
///
/// The first `operator.len() - 1` observations are consumed as initial
/// conditions, so the result is that much shorter than the input.
pub fn apply_operator(series: &[f64], operator: &[f64]) -> Vec<f64> {
    let order = operator.len().saturating_sub(1);
    if operator.is_empty() || series.len() <= order {
        return Vec::new();
    }

    (order..series.len())
        .map(|t| {
            operator
                .iter()
                .enumerate()
                .map(|(k, &coef)| coef * series[t - k])
                .sum()
        })
        .collect()
}

/// Integrate values on the differenced scale back to the original scale
///
/// `history` is the original series the forecasts continue from; it must hold
/// at least `operator.len() - 1` observations.
pub fn integrate_operator(
    differenced: &[f64],
    history: &[f64],
    operator: &[f64],
) -> Result<Vec<f64>> {
    let order = operator.len().saturating_sub(1);
    if operator.first().copied() != Some(1.0) {
        return Err(MathError::InvalidInput(
            "Differencing operator must be monic".to_string(),
        ));
    }
    if history.len() < order {
        return Err(MathError::InsufficientData(format!(
            "Integration needs {} past observations, got {}",
            order,
            history.len()
        )));
    }

    let mut extended = history[history.len() - order..].to_vec();
    let mut integrated = Vec::with_capacity(differenced.len());

    for &w in differenced {
        let t = extended.len();
        let carried: f64 = operator
            .iter()
            .enumerate()
            .skip(1)
            .map(|(k, &coef)| coef * extended[t - k])
            .sum();
        let value = w - carried;
        extended.push(value);
        integrated.push(value);
    }

    Ok(integrated)
}

/// Apply ordinary differencing `d` times
pub fn difference(series: &[f64], d: usize) -> Vec<f64> {
    apply_operator(series, &difference_operator(d, 0, 0))
}

/// Apply seasonal differencing `seasonal_d` times with the given period
pub fn seasonal_difference(series: &[f64], seasonal_d: usize, period: usize) -> Vec<f64> {
    apply_operator(series, &difference_operator(0, seasonal_d, period))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_poly_mul() {
        // (1 - 0.5B)(1 + 0.2B) = 1 - 0.3B - 0.1B^2
        let product = poly_mul(&[1.0, -0.5], &[1.0, 0.2]);
        assert_eq!(product.len(), 3);
        assert_relative_eq!(product[0], 1.0);
        assert_relative_eq!(product[1], -0.3);
        assert_relative_eq!(product[2], -0.1);

        assert!(poly_mul(&[], &[1.0]).is_empty());
    }

    #[test]
    fn test_seasonal_operator_shape() {
        // (1 - B)(1 - B^24) = 1 - B - B^24 + B^25
        let op = difference_operator(1, 1, 24);
        assert_eq!(op.len(), 26);
        assert_eq!(op[0], 1.0);
        assert_eq!(op[1], -1.0);
        assert_eq!(op[24], -1.0);
        assert_eq!(op[25], 1.0);
        assert!(op[2..24].iter().all(|&c| c == 0.0));
    }

    #[test]
    fn test_difference_linear_trend() {
        let series: Vec<f64> = (0..10).map(|i| 3.0 + 2.0 * i as f64).collect();

        let first = difference(&series, 1);
        assert_eq!(first.len(), 9);
        assert!(first.iter().all(|&v| (v - 2.0).abs() < 1e-12));

        let second = difference(&series, 2);
        assert_eq!(second.len(), 8);
        assert!(second.iter().all(|v| v.abs() < 1e-12));
    }

    #[test]
    fn test_seasonal_difference_removes_cycle() {
        let series: Vec<f64> = (0..48).map(|i| (i % 4) as f64 * 10.0).collect();
        let diffed = seasonal_difference(&series, 1, 4);
        assert_eq!(diffed.len(), 44);
        assert!(diffed.iter().all(|v| v.abs() < 1e-12));
    }

    #[test]
    fn test_integrate_reverses_difference() {
        let series: Vec<f64> = (0..80)
            .map(|i| 50.0 + 0.3 * i as f64 + ((i % 24) as f64).sin() * 4.0)
            .collect();
        let op = difference_operator(1, 1, 24);

        let split = 60;
        let tail_diffed = apply_operator(&series, &op)[split - (op.len() - 1)..].to_vec();
        let rebuilt = integrate_operator(&tail_diffed, &series[..split], &op).unwrap();

        assert_eq!(rebuilt.len(), series.len() - split);
        for (rebuilt, original) in rebuilt.iter().zip(&series[split..]) {
            assert_relative_eq!(*rebuilt, *original, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_integrate_needs_history() {
        let op = difference_operator(1, 1, 24);
        let result = integrate_operator(&[1.0], &[1.0; 10], &op);
        assert!(matches!(result, Err(MathError::InsufficientData(_))));
    }

    #[test]
    fn test_short_series_yields_empty() {
        assert!(apply_operator(&[1.0, 2.0], &difference_operator(2, 0, 0)).is_empty());
        assert_eq!(difference(&[1.0, 2.0], 0), vec![1.0, 2.0]);
    }
}
