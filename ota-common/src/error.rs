// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Error type for checksum and configuration operations.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read project config {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: ::config::ConfigError,
    },

    #[error("no build environment selected and none could be inferred")]
    NoEnvironment,

    #[error("several build environments defined ({}); pick one", .0.join(", "))]
    AmbiguousEnvironment(Vec<String>),

    #[error("no upload_url set for environment '{0}'")]
    MissingUploadUrl(String),

    #[error("unknown upload target '{0}' (expected 'firmware' or 'filesystem')")]
    UnknownTarget(String),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
