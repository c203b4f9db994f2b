// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Error types for the host runtime

use std::path::PathBuf;

use maki_interpreter::error::{CatalogError, ExecutionFault, LoadError};
use thiserror::Error;

/// Result type for host runtime operations
pub type Result<T> = std::result::Result<T, SessionError>;

/// Errors that can occur while hosting a script
#[derive(Debug, Error)]
pub enum SessionError {
    /// File could not be read
    #[error("cannot read '{path}': {source}")]
    Io {
        /// File that failed
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// Configuration file is not valid TOML for [`Config`](crate::Config)
    #[error("invalid config '{path}': {source}")]
    ConfigParse {
        /// Config file
        path: PathBuf,
        /// Parser error
        source: toml::de::Error,
    },

    /// A configuration override has a value of the wrong kind
    #[error("invalid value '{value}' for config key '{key}'")]
    ConfigValue {
        /// Setting name
        key: String,
        /// Rejected value
        value: String,
    },

    /// Layout description is not valid
    #[error("invalid layout: {0}")]
    Layout(String),

    /// Program failed to load
    #[error(transparent)]
    Load(#[from] LoadError),

    /// Native tables do not match the catalog
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// A delivery faulted; the session is still usable
    #[error(transparent)]
    Execution(#[from] ExecutionFault),

    /// An event description could not be parsed
    #[error("invalid event '{0}': expected TARGET:NAME[:ARG,...]")]
    InvalidEvent(String),

    /// Event target does not exist
    #[error("no such event target: {0}")]
    UnknownTarget(String),
}

impl SessionError {
    /// Wraps an I/O error with the path it concerns.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this is a script fault rather than a setup failure.
    pub fn is_fault(&self) -> bool {
        matches!(self, Self::Execution(_))
    }
}
