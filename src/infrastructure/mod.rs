pub mod engine_config_persistence;
pub mod reference_data;

pub use engine_config_persistence::{
    EngineConfigPersistence, load_engine_config, parse_engine_config,
};
pub use reference_data::{ReferenceCase, load_reference_set, parse_reference_set};
