mod bounds;
mod coefficients;
mod engine_config;

pub use bounds::{AMOUNT_DECIMALS, AmountBounds, Bounds};
pub use coefficients::{BaseCoefficients, SimilarityConfig};
pub use engine_config::{CONFIG_VERSION, EngineConfig, default_edge_cases, default_rules};
