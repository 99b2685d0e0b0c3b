//! # Spot Forecast Workspace
//!
//! Umbrella crate for the spot price workspace.
//!
//! - [`price_math`]: differencing, optimization and error metrics
//! - [`price_clean`]: raw spreadsheet to hourly VAT-free CSV
//! - [`price_forecast`]: ARIMA and seasonal ARIMA forecasting
//! - [`spot_forecast`]: configuration and command line front end
//!
//! ## Example
//!
//! ```
//! use spot_forecast_workspace::price_clean::VatRuleTable;
//! use chrono::NaiveDate;
//!
//! let hour = NaiveDate::from_ymd_opt(2023, 1, 15).unwrap().and_hms_opt(12, 0, 0).unwrap();
//! let vat_free = VatRuleTable::default().vat_free_price(hour, 11.0);
//! assert!((vat_free - 10.0).abs() < 1e-12);
//! ```

pub use price_clean;
pub use price_forecast;
pub use price_math;
pub use spot_forecast;
