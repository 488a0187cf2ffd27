//! Error types for classmap operations.
//!
//! This module provides the main error type [`ClassmapError`] which wraps
//! the error conditions that can occur while turning Java sources into a
//! diagram.

use std::{io, path::PathBuf};

use thiserror::Error;

use classmap_parser::error::ParseError;

use crate::index::IndexError;

/// The main error type for classmap operations.
///
/// # Diagnostic Variants
///
/// The `Parse` variant keeps the source text, and the file it came from when
/// known, next to the structured [`ParseError`]. This is what a front end
/// needs to render labelled source snippets.
#[derive(Debug, Error)]
pub enum ClassmapError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{err}")]
    Parse {
        err: ParseError,
        src: String,
        path: Option<PathBuf>,
    },

    #[error("Index error: {0}")]
    Index(#[from] IndexError),

    #[error("Export error: {0}")]
    Export(String),
}

impl ClassmapError {
    /// Create a new `Parse` error with the associated source code.
    pub fn new_parse_error(err: ParseError, src: impl Into<String>) -> Self {
        Self::Parse {
            err,
            src: src.into(),
            path: None,
        }
    }

    /// Attach the file a `Parse` error came from. Other variants are returned
    /// unchanged.
    pub fn with_path(self, file: impl Into<PathBuf>) -> Self {
        match self {
            Self::Parse { err, src, .. } => Self::Parse {
                err,
                src,
                path: Some(file.into()),
            },
            other => other,
        }
    }
}
