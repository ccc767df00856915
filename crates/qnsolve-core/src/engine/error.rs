use crate::core::particle::ParticleError;
use crate::core::topology::graph::TopologyError;
use crate::engine::combinatorics::CombinatoricsError;
use crate::engine::config::ConfigError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Configuration error: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("Particle database error: {source}")]
    Particle {
        #[from]
        source: ParticleError,
    },

    #[error("Topology error: {source}")]
    Topology {
        #[from]
        source: TopologyError,
    },

    #[error("Combinatorics error: {source}")]
    Combinatorics {
        #[from]
        source: CombinatoricsError,
    },
}
