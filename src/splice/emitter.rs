// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! The fragment-inclusion selector.
//!
//! Maps (mode, folder, symbol) to either a rendered splice block or a no-op.
//! The mode is fixed at construction for the whole compilation unit. In
//! splice mode the shared macro include is emitted exactly once per unit,
//! at unit scope ahead of every splice block, independent of how many
//! fragments the unit pulls in.

use crate::splice::dialect::DirectiveDialect;
use crate::splice::error::{SpliceError, SpliceErrorKind};

/// Build mode for one compilation unit, resolved once before any call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildMode {
    Splice,
    Permuter,
}

impl BuildMode {
    pub fn as_str(self) -> &'static str {
        match self {
            BuildMode::Splice => "splice",
            BuildMode::Permuter => "permuter",
        }
    }
}

/// Result of one selector call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InclusionAction {
    /// The rendered directive block that was appended to the unit.
    Splice(String),
    /// Permuter mode: the call site stays, the output does not.
    Noop,
}

/// Accumulates one compilation unit's generated text in call order.
#[derive(Debug)]
pub struct UnitEmitter {
    mode: BuildMode,
    dialect: DirectiveDialect,
    out: String,
}

impl UnitEmitter {
    pub fn new(mode: BuildMode, dialect: DirectiveDialect) -> Self {
        // The shared include lives at unit scope, not inside any call.
        let out = match mode {
            BuildMode::Splice => dialect.render_shared_include(),
            BuildMode::Permuter => String::new(),
        };
        Self { mode, dialect, out }
    }

    pub fn mode(&self) -> BuildMode {
        self.mode
    }

    pub fn dialect(&self) -> &DirectiveDialect {
        &self.dialect
    }

    /// Splice one fragment into the unit, or do nothing in permuter mode.
    ///
    /// Token validation is identical in both modes; only the presence of
    /// output differs.
    pub fn include_fragment(
        &mut self,
        folder: &str,
        symbol: &str,
    ) -> Result<InclusionAction, SpliceError> {
        validate_folder_token(folder)?;
        validate_symbol_token(symbol)?;

        if self.mode == BuildMode::Permuter {
            return Ok(InclusionAction::Noop);
        }

        let block = self.dialect.render_fragment_block(folder, symbol);
        self.out.push_str(&block);
        Ok(InclusionAction::Splice(block))
    }

    pub fn output(&self) -> &str {
        &self.out
    }

    pub fn finish(self) -> String {
        self.out
    }
}

/// Check that a symbol works both as a fragment filename stem and as a
/// linker-visible label.
pub fn validate_symbol_token(symbol: &str) -> Result<(), SpliceError> {
    if symbol.is_empty() {
        return Err(token_error("Symbol must not be empty", None));
    }
    let mut chars = symbol.chars();
    let first = chars.next().unwrap_or('\0');
    if !(first.is_ascii_alphabetic() || first == '_' || first == '.') {
        return Err(token_error(
            "Symbol must start with a letter, '_' or '.'",
            Some(symbol),
        ));
    }
    for ch in chars {
        if !(ch.is_ascii_alphanumeric() || ch == '_' || ch == '$' || ch == '.') {
            return Err(token_error(
                "Symbol contains a character the assembler cannot label",
                Some(symbol),
            ));
        }
    }
    Ok(())
}

/// Check that a folder token survives quoting inside an include directive.
pub fn validate_folder_token(folder: &str) -> Result<(), SpliceError> {
    if folder.is_empty() {
        return Err(token_error("Folder must not be empty", None));
    }
    if folder.chars().any(char::is_whitespace) {
        return Err(token_error("Folder must not contain whitespace", Some(folder)));
    }
    if folder.contains('"') || folder.contains('\\') {
        return Err(token_error(
            "Folder must not contain quotes or backslashes",
            Some(folder),
        ));
    }
    if folder.starts_with('/') || folder.ends_with('/') {
        return Err(token_error(
            "Folder must be a relative path without a trailing slash",
            Some(folder),
        ));
    }
    Ok(())
}

fn token_error(msg: &str, param: Option<&str>) -> SpliceError {
    SpliceError::new(SpliceErrorKind::Token, msg, param)
}
