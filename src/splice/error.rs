// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Error types and run reporting for the inclusion generator.

use std::fmt;

/// Categories of generator errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpliceErrorKind {
    Cli,
    Dialect,
    Fragment,
    Io,
    Manifest,
    Token,
}

/// A generator error with a kind and message.
#[derive(Debug, Clone)]
pub struct SpliceError {
    kind: SpliceErrorKind,
    message: String,
}

impl SpliceError {
    pub fn new(kind: SpliceErrorKind, msg: &str, param: Option<&str>) -> Self {
        Self {
            kind,
            message: format_error(msg, param),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> SpliceErrorKind {
        self.kind
    }
}

impl fmt::Display for SpliceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for SpliceError {}

fn format_error(msg: &str, param: Option<&str>) -> String {
    match param {
        Some(param) => format!("{msg}: {param}"),
        None => msg.to_string(),
    }
}

/// A failed unit run: the primary error plus supporting detail lines.
#[derive(Debug, Clone)]
pub struct RunError {
    error: SpliceError,
    details: Vec<String>,
}

impl RunError {
    pub fn new(error: SpliceError, details: Vec<String>) -> Self {
        Self { error, details }
    }

    pub fn error(&self) -> &SpliceError {
        &self.error
    }

    pub fn details(&self) -> &[String] {
        &self.details
    }
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)
    }
}

impl std::error::Error for RunError {}

impl From<SpliceError> for RunError {
    fn from(error: SpliceError) -> Self {
        Self::new(error, Vec::new())
    }
}
