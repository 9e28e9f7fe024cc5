// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Unit manifest parsing.
//!
//! A manifest lists the fragment calls for one compilation unit, one per
//! line, plus an optional mode line:
//!
//! ```text
//! # world overlay
//! mode splice
//! include asm/nonmatching/world func_80173E78
//! include asm/nonmatching/world func_80174010
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::splice::emitter::BuildMode;
use crate::splice::error::{SpliceError, SpliceErrorKind};

/// One `include` line: a folder/symbol pair and where it was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentRef {
    pub folder: String,
    pub symbol: String,
    pub line: usize,
}

/// A parsed unit manifest.
#[derive(Debug, Clone, Default)]
pub struct Manifest {
    pub mode: Option<BuildMode>,
    pub entries: Vec<FragmentRef>,
}

impl Manifest {
    pub fn load_from_path(path: &Path) -> Result<Self, SpliceError> {
        let text = fs::read_to_string(path).map_err(|err| {
            SpliceError::new(
                SpliceErrorKind::Io,
                &format!("failed to read '{}': {err}", path.display()),
                None,
            )
        })?;
        Self::parse(path, &text)
    }

    pub fn parse(path: &Path, source: &str) -> Result<Self, SpliceError> {
        let mut manifest = Self::default();
        let mut mode_line = None;
        let mut seen_symbols: HashMap<String, usize> = HashMap::new();

        for (index, raw_line) in source.lines().enumerate() {
            let line_no = index + 1;
            let line = match raw_line.split_once('#') {
                Some((before, _)) => before.trim(),
                None => raw_line.trim(),
            };
            if line.is_empty() {
                continue;
            }

            let mut fields = line.split_whitespace();
            let keyword = fields.next().unwrap_or_default();
            match keyword {
                "mode" => {
                    if let Some(previous) = mode_line {
                        return Err(manifest_error(
                            path,
                            line_no,
                            format!("duplicate mode line (first on line {previous})"),
                        ));
                    }
                    let value = fields.next().ok_or_else(|| {
                        manifest_error(path, line_no, "mode expects splice or permuter")
                    })?;
                    if fields.next().is_some() {
                        return Err(manifest_error(
                            path,
                            line_no,
                            "mode expects exactly one value",
                        ));
                    }
                    manifest.mode = Some(parse_mode(path, line_no, value)?);
                    mode_line = Some(line_no);
                }
                "include" => {
                    let folder = fields.next().ok_or_else(|| {
                        manifest_error(path, line_no, "include expects <folder> <symbol>")
                    })?;
                    let symbol = fields.next().ok_or_else(|| {
                        manifest_error(path, line_no, "include expects <folder> <symbol>")
                    })?;
                    if fields.next().is_some() {
                        return Err(manifest_error(
                            path,
                            line_no,
                            "include expects exactly two values",
                        ));
                    }
                    if let Some(previous) = seen_symbols.insert(symbol.to_string(), line_no) {
                        return Err(manifest_error(
                            path,
                            line_no,
                            format!("duplicate symbol '{symbol}' (first on line {previous})"),
                        ));
                    }
                    manifest.entries.push(FragmentRef {
                        folder: folder.to_string(),
                        symbol: symbol.to_string(),
                        line: line_no,
                    });
                }
                other => {
                    return Err(manifest_error(
                        path,
                        line_no,
                        format!("unknown keyword '{other}'"),
                    ));
                }
            }
        }

        Ok(manifest)
    }
}

fn parse_mode(path: &Path, line_no: usize, value: &str) -> Result<BuildMode, SpliceError> {
    match value.to_ascii_lowercase().as_str() {
        "splice" => Ok(BuildMode::Splice),
        "permuter" => Ok(BuildMode::Permuter),
        other => Err(manifest_error(
            path,
            line_no,
            format!("invalid mode '{other}'; expected splice or permuter"),
        )),
    }
}

fn manifest_error(path: &Path, line_no: usize, message: impl Into<String>) -> SpliceError {
    SpliceError::new(
        SpliceErrorKind::Manifest,
        &format!("{}:{}: {}", path.display(), line_no, message.into()),
        None,
    )
}
