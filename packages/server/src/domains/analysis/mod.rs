//! Investment analysis requests.
//!
//! A request is validated into an [`AnalysisPlan`], market data for the
//! assets it names is collected through the extractor, and a prompt is
//! assembled for the model.

pub mod market_data;
pub mod models;
pub mod prompt;
pub mod validation;

pub use market_data::{gather_market_data, MarketDataUnavailable, MarketSnapshot};
pub use models::*;
pub use prompt::build_prompt;
pub use validation::{validate, ValidationError};
