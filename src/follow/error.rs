// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("No log file path configured")]
    NoPath,

    #[error("A tail loop is already running for {0}")]
    AlreadyRunning(PathBuf),

    #[error("Failed to spawn tail loop thread: {0}")]
    Spawn(std::io::Error),

    #[error("Tail loop thread panicked and took its parser with it; set a new parser before starting")]
    LoopPanicked,

    #[error("Regex error: {0}")]
    Regex(String),
}

pub type Result<T> = std::result::Result<T, Error>;
