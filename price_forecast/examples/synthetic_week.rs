use chrono::{Duration, NaiveDateTime};
use price_forecast::models::arima::ArimaModel;
use price_forecast::models::sarimax::{SarimaxModel, SeasonalOrder};
use price_forecast::utils::train_test_split;
use price_forecast::{evaluate_forecast, ForecastModel, HourlySeries, TrainedForecastModel};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use std::f64::consts::TAU;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Price Forecast: Synthetic Week Example");
    println!("======================================\n");

    // Four weeks of hourly prices with a daily profile
    let series = create_sample_series(28)?;
    let (train, test) = train_test_split(&series, 168)?;
    println!("Training hours: {}, test hours: {}\n", train.len(), test.len());

    let arima = ArimaModel::new(5, 1, 0)?;
    let trained = arima.train(&train)?;
    let forecast = trained.forecast(test.len())?;
    println!("{}:", arima.name());
    println!("{}", evaluate_forecast(&test, &forecast)?);

    let sarima = SarimaxModel::new((2, 1, 2), SeasonalOrder::default())?;
    let trained = sarima.train(&train)?;
    let forecast = trained.forecast_with_intervals(test.len(), 0.95)?;
    println!("{}:", sarima.name());
    println!("{}", evaluate_forecast(&test, &forecast)?);

    if let Some(intervals) = forecast.intervals() {
        println!("First forecast hours with 95% intervals:");
        for ((ts, value), (low, high)) in forecast.points().iter().zip(intervals).take(6) {
            println!("  {}  {:>8.3}  [{:>8.3}, {:>8.3}]", ts, value, low, high);
        }
    }

    Ok(())
}

fn create_sample_series(days: usize) -> Result<HourlySeries, Box<dyn std::error::Error>> {
    let start = NaiveDateTime::parse_from_str("2024-10-01 00:00:00", "%Y-%m-%d %H:%M:%S")?;
    let mut rng = StdRng::seed_from_u64(2024);
    let noise = Normal::new(0.0, 0.8)?;

    let hours = days * 24;
    let timestamps = (0..hours as i64).map(|h| start + Duration::hours(h)).collect();
    let values = (0..hours)
        .map(|h| {
            let daily = 3.5 * ((h % 24) as f64 / 24.0 * TAU - 1.2).sin();
            let weekly = if (h / 24) % 7 >= 5 { -1.5 } else { 0.0 };
            9.0 + daily + weekly + noise.sample(&mut rng)
        })
        .collect();

    Ok(HourlySeries::new(timestamps, values)?)
}
