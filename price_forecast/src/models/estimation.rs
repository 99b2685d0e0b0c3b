//! Conditional sum of squares estimation for (seasonal) ARIMA models
//!
//! The series is differenced with `(1 - B)^d (1 - B^s)^D`, a multiplicative
//! ARMA model `φ(B)Φ(B^s) w_t = θ(B)Θ(B^s) e_t` is fitted to the result by
//! minimizing the sum of squared one-step errors, and forecasts are integrated
//! back through the same operator.

use crate::error::{ForecastError, Result};
use price_math::{
    apply_operator, difference_operator, integrate_operator, nelder_mead, poly_mul,
    NelderMeadConfig,
};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};
use std::f64::consts::PI;
use tracing::{debug, warn};

/// Coefficient bound keeping each AR/MA factor away from the unit circle
const COEFFICIENT_BOUND: f64 = 0.99;

/// Non-seasonal and seasonal orders of a model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelOrder {
    pub p: usize,
    pub d: usize,
    pub q: usize,
    pub seasonal_p: usize,
    pub seasonal_d: usize,
    pub seasonal_q: usize,
    /// Season length in observations; 0 when there is no seasonal part
    pub period: usize,
}

impl ModelOrder {
    /// ARIMA(p, d, q)
    pub fn non_seasonal(p: usize, d: usize, q: usize) -> Self {
        Self {
            p,
            d,
            q,
            seasonal_p: 0,
            seasonal_d: 0,
            seasonal_q: 0,
            period: 0,
        }
    }

    /// ARIMA(p, d, q)(P, D, Q)s
    pub fn seasonal(
        (p, d, q): (usize, usize, usize),
        (seasonal_p, seasonal_d, seasonal_q, period): (usize, usize, usize, usize),
    ) -> Self {
        Self {
            p,
            d,
            q,
            seasonal_p,
            seasonal_d,
            seasonal_q,
            period,
        }
    }

    pub fn has_seasonal_terms(&self) -> bool {
        self.seasonal_p + self.seasonal_d + self.seasonal_q > 0
    }

    /// A constant is estimated only for undifferenced models
    pub fn includes_mean(&self) -> bool {
        self.d + self.seasonal_d == 0
    }

    /// Number of estimated coefficients, excluding the innovation variance
    pub fn parameter_count(&self) -> usize {
        self.p + self.q + self.seasonal_p + self.seasonal_q + usize::from(self.includes_mean())
    }

    /// Highest AR lag after expanding the seasonal product
    pub fn ar_lag(&self) -> usize {
        self.p + self.seasonal_p * self.period
    }

    /// Highest MA lag after expanding the seasonal product
    pub fn ma_lag(&self) -> usize {
        self.q + self.seasonal_q * self.period
    }

    /// Observations consumed by differencing
    pub fn differencing_lag(&self) -> usize {
        self.d + self.seasonal_d * self.period
    }

    pub fn validate(&self) -> Result<()> {
        if self.has_seasonal_terms() && self.period < 2 {
            return Err(ForecastError::ValidationError(format!(
                "Seasonal period must be at least 2, got {}",
                self.period
            )));
        }
        if self.d > 2 || self.seasonal_d > 1 {
            return Err(ForecastError::ValidationError(format!(
                "Differencing orders d={} D={} are not supported (max d=2, D=1)",
                self.d, self.seasonal_d
            )));
        }
        Ok(())
    }

    /// Minimum series length the model can be fitted on
    pub fn min_observations(&self) -> usize {
        self.differencing_lag() + self.ar_lag().max(self.ma_lag()) + self.parameter_count() + 2
    }
}

/// Expand a lag polynomial `1 + sign * (c_1 B^step + c_2 B^(2 step) + ...)`
fn lag_polynomial(coefficients: &[f64], step: usize, sign: f64) -> Vec<f64> {
    let mut poly = vec![0.0; coefficients.len() * step + 1];
    poly[0] = 1.0;
    for (i, &c) in coefficients.iter().enumerate() {
        poly[(i + 1) * step] = sign * c;
    }
    poly
}

/// Non-zero lags of the expanded AR and MA recursions
///
/// AR entries `(k, a_k)` enter as `a_k * w_{t-k}` and MA entries `(k, m_k)`
/// as `m_k * e_{t-k}`.
#[derive(Debug, Clone, PartialEq)]
struct ExpandedLags {
    ar: Vec<(usize, f64)>,
    ma: Vec<(usize, f64)>,
    /// Full AR polynomial `φ(B)Φ(B^s)`
    ar_poly: Vec<f64>,
    /// Full MA polynomial `θ(B)Θ(B^s)`
    ma_poly: Vec<f64>,
}

impl ExpandedLags {
    fn new(coefficients: &Coefficients, period: usize) -> Self {
        let ar_poly = poly_mul(
            &lag_polynomial(&coefficients.ar, 1, -1.0),
            &lag_polynomial(&coefficients.seasonal_ar, period.max(1), -1.0),
        );
        let ma_poly = poly_mul(
            &lag_polynomial(&coefficients.ma, 1, 1.0),
            &lag_polynomial(&coefficients.seasonal_ma, period.max(1), 1.0),
        );

        let ar = ar_poly
            .iter()
            .enumerate()
            .skip(1)
            .filter(|(_, c)| **c != 0.0)
            .map(|(k, c)| (k, -c))
            .collect();
        let ma = ma_poly
            .iter()
            .enumerate()
            .skip(1)
            .filter(|(_, c)| **c != 0.0)
            .map(|(k, c)| (k, *c))
            .collect();

        Self {
            ar,
            ma,
            ar_poly,
            ma_poly,
        }
    }
}

/// Estimated coefficients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coefficients {
    /// Constant (mean of the differenced series), zero when differenced
    pub mean: f64,
    pub ar: Vec<f64>,
    pub ma: Vec<f64>,
    pub seasonal_ar: Vec<f64>,
    pub seasonal_ma: Vec<f64>,
}

impl Coefficients {
    fn from_vector(order: &ModelOrder, params: &[f64]) -> Self {
        let mut offset = 0;
        let mut take = |n: usize| {
            let slice = params[offset..offset + n].to_vec();
            offset += n;
            slice
        };

        let mean = if order.includes_mean() { take(1)[0] } else { 0.0 };
        Self {
            mean,
            ar: take(order.p),
            ma: take(order.q),
            seasonal_ar: take(order.seasonal_p),
            seasonal_ma: take(order.seasonal_q),
        }
    }
}

/// One-step errors of the expanded recursion, zero before `start`
fn css_residuals(w: &[f64], mean: f64, lags: &ExpandedLags, start: usize) -> Vec<f64> {
    let mut residuals = vec![0.0; w.len()];
    for t in start..w.len() {
        let mut pred = mean;
        for &(k, a) in &lags.ar {
            pred += a * (w[t - k] - mean);
        }
        for &(k, m) in &lags.ma {
            if k <= t {
                pred += m * residuals[t - k];
            }
        }
        residuals[t] = w[t] - pred;
    }
    residuals
}

/// A model fitted by conditional sum of squares
#[derive(Debug, Clone)]
pub struct CssFit {
    order: ModelOrder,
    coefficients: Coefficients,
    lags: ExpandedLags,
    operator: Vec<f64>,
    history: Vec<f64>,
    differenced: Vec<f64>,
    residuals: Vec<f64>,
    start: usize,
    sigma2: f64,
    log_likelihood: f64,
    aic: f64,
    bic: f64,
    iterations: usize,
    converged: bool,
}

impl CssFit {
    /// Fit `order` to `values`
    pub fn fit(order: ModelOrder, values: &[f64]) -> Result<Self> {
        order.validate()?;
        let needed = order.min_observations();
        if values.len() < needed {
            return Err(ForecastError::InsufficientData {
                needed,
                got: values.len(),
            });
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::DataError(
                "Training series contains non-finite values".to_string(),
            ));
        }

        let operator = difference_operator(order.d, order.seasonal_d, order.period);
        let differenced = apply_operator(values, &operator);
        let start = order.ar_lag();
        let n_eff = differenced.len() - start;

        let mean_w = differenced.iter().sum::<f64>() / differenced.len() as f64;
        let objective = |params: &[f64]| {
            let coefficients = Coefficients::from_vector(&order, params);
            let lags = ExpandedLags::new(&coefficients, order.period);
            let residuals = css_residuals(&differenced, coefficients.mean, &lags, start);
            residuals[start..].iter().map(|e| e * e).sum::<f64>() / n_eff as f64
        };

        let (initial, bounds) = initial_guess(&order, mean_w);
        let initial_value = objective(&initial);
        let config = NelderMeadConfig {
            max_iter: 1000 + 200 * initial.len(),
            tolerance: 1e-10 * initial_value.abs().max(1.0),
            ..Default::default()
        };

        // Restart once from the first optimum to escape a collapsed simplex
        let first = nelder_mead(&objective, &initial, Some(&bounds), &config);
        let result = nelder_mead(&objective, &first.point, Some(&bounds), &config);
        let iterations = first.iterations + result.iterations;
        if !result.converged {
            warn!(
                "CSS optimization for {:?} stopped after {} iterations without converging",
                order, iterations
            );
        }

        let coefficients = Coefficients::from_vector(&order, &result.point);
        let lags = ExpandedLags::new(&coefficients, order.period);
        let residuals = css_residuals(&differenced, coefficients.mean, &lags, start);
        let css: f64 = residuals[start..].iter().map(|e| e * e).sum();
        let sigma2 = css / n_eff as f64;
        if !sigma2.is_finite() {
            return Err(ForecastError::ForecastingError(
                "Model fit produced a non-finite residual variance".to_string(),
            ));
        }

        // Exact fits would give an infinite likelihood
        let n = n_eff as f64;
        let log_likelihood = -0.5 * n * (1.0 + (2.0 * PI * sigma2.max(1e-12)).ln());
        let k = (order.parameter_count() + 1) as f64;
        let aic = -2.0 * log_likelihood + 2.0 * k;
        let bic = -2.0 * log_likelihood + k * n.ln();

        debug!(
            "Fitted {:?}: sigma2={:.6}, aic={:.3}, bic={:.3}, iterations={}",
            order, sigma2, aic, bic, iterations
        );

        Ok(Self {
            order,
            coefficients,
            lags,
            operator,
            history: values.to_vec(),
            differenced,
            residuals,
            start,
            sigma2,
            log_likelihood,
            aic,
            bic,
            iterations,
            converged: result.converged,
        })
    }

    /// Point forecasts for the next `horizon` observations
    pub fn forecast(&self, horizon: usize) -> Result<Vec<f64>> {
        if horizon == 0 {
            return Ok(Vec::new());
        }

        let n = self.differenced.len();
        let mean = self.coefficients.mean;
        let mut w = self.differenced.clone();
        let mut e = self.residuals.clone();
        w.reserve(horizon);
        e.reserve(horizon);

        for _ in 0..horizon {
            let t = w.len();
            let mut pred = mean;
            for &(k, a) in &self.lags.ar {
                pred += a * (w[t - k] - mean);
            }
            for &(k, m) in &self.lags.ma {
                if k <= t {
                    pred += m * e[t - k];
                }
            }
            w.push(pred);
            // Future innovations have zero expectation
            e.push(0.0);
        }

        Ok(integrate_operator(&w[n..], &self.history, &self.operator)?)
    }

    /// Forecast standard errors for steps `1..=horizon`
    pub fn forecast_std_errors(&self, horizon: usize) -> Vec<f64> {
        let ar_with_diff = poly_mul(&self.lags.ar_poly, &self.operator);
        let psi = psi_weights(&ar_with_diff, &self.lags.ma_poly, horizon);
        let mut cumulative = 0.0;
        psi.iter()
            .map(|w| {
                cumulative += w * w;
                (self.sigma2 * cumulative).sqrt()
            })
            .collect()
    }

    /// Point forecasts with symmetric normal intervals at `level`
    pub fn forecast_with_intervals(
        &self,
        horizon: usize,
        level: f64,
    ) -> Result<(Vec<f64>, Vec<(f64, f64)>)> {
        if !(level > 0.0 && level < 1.0) {
            return Err(ForecastError::ValidationError(format!(
                "Interval level must be between 0 and 1, got {}",
                level
            )));
        }

        let values = self.forecast(horizon)?;
        let normal = Normal::new(0.0, 1.0)
            .map_err(|e| ForecastError::ForecastingError(e.to_string()))?;
        let z = normal.inverse_cdf(0.5 + level / 2.0);

        let intervals = values
            .iter()
            .zip(self.forecast_std_errors(horizon))
            .map(|(v, se)| (v - z * se, v + z * se))
            .collect();
        Ok((values, intervals))
    }

    pub fn order(&self) -> &ModelOrder {
        &self.order
    }

    pub fn coefficients(&self) -> &Coefficients {
        &self.coefficients
    }

    /// One-step errors after the conditioning observations
    pub fn residuals(&self) -> &[f64] {
        &self.residuals[self.start..]
    }

    /// Innovation variance estimate
    pub fn sigma2(&self) -> f64 {
        self.sigma2
    }

    pub fn log_likelihood(&self) -> f64 {
        self.log_likelihood
    }

    pub fn aic(&self) -> f64 {
        self.aic
    }

    pub fn bic(&self) -> f64 {
        self.bic
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn converged(&self) -> bool {
        self.converged
    }
}

/// Starting point and bounds for the optimizer, in parameter vector order
fn initial_guess(order: &ModelOrder, mean: f64) -> (Vec<f64>, Vec<(f64, f64)>) {
    let mut initial = Vec::with_capacity(order.parameter_count());
    let mut bounds = Vec::with_capacity(order.parameter_count());

    if order.includes_mean() {
        initial.push(mean);
        bounds.push((f64::NEG_INFINITY, f64::INFINITY));
    }
    for n in [order.p, order.q, order.seasonal_p, order.seasonal_q] {
        for i in 0..n {
            initial.push(0.1 / (i + 1) as f64);
            bounds.push((-COEFFICIENT_BOUND, COEFFICIENT_BOUND));
        }
    }

    (initial, bounds)
}

/// MA(∞) weights of `ar(B) y_t = ma(B) e_t`, with both polynomials monic
fn psi_weights(ar: &[f64], ma: &[f64], count: usize) -> Vec<f64> {
    let mut psi: Vec<f64> = Vec::with_capacity(count);
    for j in 0..count {
        let mut value = if j == 0 { 1.0 } else { ma.get(j).copied().unwrap_or(0.0) };
        for i in 1..=j.min(ar.len().saturating_sub(1)) {
            value -= ar[i] * psi[j - i];
        }
        psi.push(value);
    }
    psi
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rand_distr::{Distribution, Normal as NormalDist};

    fn ar1_series(phi: f64, mean: f64, n: usize, seed: u64) -> Vec<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        let noise = NormalDist::new(0.0, 1.0).unwrap();
        let mut values = Vec::with_capacity(n);
        let mut prev = 0.0;
        for _ in 0..n {
            prev = phi * prev + noise.sample(&mut rng);
            values.push(mean + prev);
        }
        values
    }

    #[test]
    fn test_expanded_seasonal_lags() {
        let coefficients = Coefficients {
            mean: 0.0,
            ar: vec![0.5],
            ma: vec![0.3],
            seasonal_ar: vec![0.4],
            seasonal_ma: vec![0.2],
        };
        let lags = ExpandedLags::new(&coefficients, 4);

        assert_eq!(lags.ar.len(), 3);
        assert_eq!(lags.ar[0], (1, 0.5));
        assert_eq!(lags.ar[1], (4, 0.4));
        assert_eq!(lags.ar[2].0, 5);
        assert_relative_eq!(lags.ar[2].1, -0.2, epsilon = 1e-12);

        assert_eq!(lags.ma[0], (1, 0.3));
        assert_eq!(lags.ma[1], (4, 0.2));
        assert_relative_eq!(lags.ma[2].1, 0.06, epsilon = 1e-12);
    }

    #[test]
    fn test_parameter_layout() {
        let order = ModelOrder::seasonal((1, 0, 1), (1, 0, 0, 24));
        assert!(order.includes_mean());
        assert_eq!(order.parameter_count(), 4);

        let c = Coefficients::from_vector(&order, &[5.0, 0.1, 0.2, 0.3]);
        assert_eq!(c.mean, 5.0);
        assert_eq!(c.ar, vec![0.1]);
        assert_eq!(c.ma, vec![0.2]);
        assert_eq!(c.seasonal_ar, vec![0.3]);
        assert!(c.seasonal_ma.is_empty());

        let differenced = ModelOrder::non_seasonal(2, 1, 0);
        assert!(!differenced.includes_mean());
        assert_eq!(differenced.parameter_count(), 2);
    }

    #[test]
    fn test_invalid_orders() {
        assert!(ModelOrder::seasonal((1, 1, 1), (1, 1, 1, 1)).validate().is_err());
        assert!(ModelOrder::non_seasonal(1, 3, 0).validate().is_err());
        assert!(ModelOrder::seasonal((2, 1, 2), (1, 1, 1, 24)).validate().is_ok());
    }

    #[test]
    fn test_recovers_ar1_coefficient() {
        let values = ar1_series(0.6, 10.0, 2000, 7);
        let fit = CssFit::fit(ModelOrder::non_seasonal(1, 0, 0), &values).unwrap();

        assert!((fit.coefficients().ar[0] - 0.6).abs() < 0.08);
        assert!((fit.coefficients().mean - 10.0).abs() < 0.3);
        assert!((fit.sigma2() - 1.0).abs() < 0.15);
        assert!(fit.aic() < fit.bic());
    }

    #[test]
    fn test_random_walk_forecast_is_flat() {
        let values: Vec<f64> = (0..50).map(|i| (i as f64 * 0.7).sin() * 3.0 + i as f64).collect();
        let fit = CssFit::fit(ModelOrder::non_seasonal(0, 1, 0), &values).unwrap();

        let forecast = fit.forecast(5).unwrap();
        assert_eq!(forecast.len(), 5);
        for v in forecast {
            assert_relative_eq!(v, values[49], epsilon = 1e-9);
        }

        // Random walk variance grows linearly with the horizon
        let se = fit.forecast_std_errors(4);
        assert_relative_eq!(se[3], 2.0 * se[0], epsilon = 1e-9);
    }

    #[test]
    fn test_seasonal_difference_repeats_last_season() {
        let period = 24;
        let values: Vec<f64> = (0..period * 5)
            .map(|h| 10.0 + 5.0 * ((h % period) as f64 / period as f64 * 2.0 * PI).sin())
            .collect();
        let fit = CssFit::fit(ModelOrder::seasonal((0, 0, 0), (0, 1, 0, period)), &values).unwrap();

        let forecast = fit.forecast(period + 3).unwrap();
        for (h, v) in forecast.iter().enumerate() {
            assert_relative_eq!(*v, values[values.len() - period + h % period], epsilon = 1e-9);
        }
    }

    #[test]
    fn test_intervals_contain_point_forecast() {
        let values = ar1_series(0.5, 3.0, 400, 11);
        let fit = CssFit::fit(ModelOrder::non_seasonal(1, 0, 1), &values).unwrap();

        let (points, intervals) = fit.forecast_with_intervals(10, 0.95).unwrap();
        assert_eq!(intervals.len(), 10);
        for (v, (lo, hi)) in points.iter().zip(&intervals) {
            assert!(lo < v && v < hi);
        }
        let first_width = intervals[0].1 - intervals[0].0;
        let last_width = intervals[9].1 - intervals[9].0;
        assert!(last_width >= first_width);
        assert_relative_eq!(first_width, 2.0 * 1.959964 * fit.sigma2().sqrt(), epsilon = 1e-4);

        assert!(fit.forecast_with_intervals(10, 1.5).is_err());
    }

    #[test]
    fn test_psi_weights_ar1() {
        // (1 - 0.5B) y = e  =>  psi_j = 0.5^j
        let psi = psi_weights(&[1.0, -0.5], &[1.0], 4);
        assert_eq!(psi, vec![1.0, 0.5, 0.25, 0.125]);
    }

    #[test]
    fn test_too_short_series() {
        let result = CssFit::fit(ModelOrder::seasonal((2, 1, 2), (1, 1, 1, 24)), &[1.0; 30]);
        assert!(matches!(result, Err(ForecastError::InsufficientData { .. })));
    }
}
