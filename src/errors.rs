//! Crate-level error type wrapping the domain errors and ambient failures.
use std::path::PathBuf;

use thiserror::Error;

use crate::{
    graph::{GraphError, WeightError},
    ontology::{IriError, OntologyError},
};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Ontology(#[from] OntologyError),

    #[error(transparent)]
    Iri(#[from] IriError),

    #[error(transparent)]
    Weights(#[from] WeightError),

    #[error("cannot read configuration file `{path}`")]
    ConfigFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error("logger initialization failed: {0}")]
    Logger(String),

    #[error("{0}")]
    Message(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
