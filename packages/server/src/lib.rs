// InvestGram - API Core
//
// Thin HTTP layer over the market data pipeline (asset-extract) and the
// generative model client (gemini-client).

pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
