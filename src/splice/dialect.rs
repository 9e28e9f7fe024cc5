// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Assembler-directive dialect settings and their config file loader.
//!
//! The directive spelling is a toolchain parameter, not a constant: historic
//! decomp headers flipped between `.global` and `.globl` and between emitting
//! and omitting a trailing `.end`, so all of it is configurable here.

use std::collections::HashSet;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use crate::splice::error::{SpliceError, SpliceErrorKind};

/// Spelling of the global-visibility directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GlobalKeyword {
    #[default]
    Global,
    Globl,
}

impl GlobalKeyword {
    pub fn directive(self) -> &'static str {
        match self {
            GlobalKeyword::Global => ".global",
            GlobalKeyword::Globl => ".globl",
        }
    }
}

/// Directive dialect used when rendering splice blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectiveDialect {
    pub section: String,
    pub align_shift: u32,
    pub global_keyword: GlobalKeyword,
    pub emit_end: bool,
    pub fragment_extension: String,
    pub shared_include: String,
}

impl Default for DirectiveDialect {
    fn default() -> Self {
        Self {
            section: ".text".to_string(),
            align_shift: 2,
            global_keyword: GlobalKeyword::Global,
            emit_end: false,
            fragment_extension: "s".to_string(),
            shared_include: "macro.inc".to_string(),
        }
    }
}

impl DirectiveDialect {
    /// Join folder and symbol into the fragment file path.
    pub fn fragment_path(&self, folder: &str, symbol: &str) -> String {
        format!("{folder}/{symbol}.{}", self.fragment_extension)
    }

    /// Render the four-directive splice block for one fragment.
    pub fn render_fragment_block(&self, folder: &str, symbol: &str) -> String {
        let mut block = String::new();
        let _ = writeln!(block, "{}", self.section);
        let _ = writeln!(block, "\t.align\t{}", self.align_shift);
        let _ = writeln!(block, "\t{}\t{symbol}", self.global_keyword.directive());
        let _ = writeln!(block, ".include \"{}\"", self.fragment_path(folder, symbol));
        if self.emit_end {
            let _ = writeln!(block, "\t.end\t{symbol}");
        }
        block
    }

    /// Render the unit-wide shared macro include.
    pub fn render_shared_include(&self) -> String {
        format!(".include \"{}\"\n", self.shared_include)
    }

    pub fn load_from_path(path: &Path) -> Result<Self, SpliceError> {
        let text = fs::read_to_string(path).map_err(|err| {
            SpliceError::new(
                SpliceErrorKind::Io,
                &format!("failed to read '{}': {err}", path.display()),
                None,
            )
        })?;
        Self::parse_toml(path, &text)
    }

    fn parse_toml(path: &Path, source: &str) -> Result<Self, SpliceError> {
        let mut dialect = Self::default();
        let mut section = ConfigSection::Root;
        let mut seen_keys = HashSet::new();

        for (index, raw_line) in source.lines().enumerate() {
            let line_no = index + 1;
            let line = strip_toml_comment(raw_line).trim();
            if line.is_empty() {
                continue;
            }

            if line.starts_with('[') {
                if !line.ends_with(']') {
                    return Err(config_error(path, line_no, "invalid section header"));
                }
                let name = line[1..line.len() - 1].trim();
                section = if name.eq_ignore_ascii_case("dialect") {
                    ConfigSection::Dialect
                } else {
                    ConfigSection::Other
                };
                continue;
            }

            if section == ConfigSection::Other {
                continue;
            }

            let Some((raw_key, raw_value)) = line.split_once('=') else {
                return Err(config_error(path, line_no, "expected key = value"));
            };
            let key = raw_key.trim();
            let value = raw_value.trim();
            if key.is_empty() || value.is_empty() {
                return Err(config_error(path, line_no, "expected key = value"));
            }

            let canonical_key = key.trim().to_ascii_lowercase().replace('-', "_");
            if !seen_keys.insert(canonical_key.clone()) {
                return Err(config_error(
                    path,
                    line_no,
                    format!("duplicate key '{}'", key),
                ));
            }

            match canonical_key.as_str() {
                "section" => {
                    let section_name = parse_string(path, line_no, key, value)?;
                    if !section_name.starts_with('.') {
                        return Err(config_error(
                            path,
                            line_no,
                            format!("section must start with '.': {section_name}"),
                        ));
                    }
                    dialect.section = section_name;
                }
                "align_shift" => dialect.align_shift = parse_align_shift(path, line_no, key, value)?,
                "global_keyword" => {
                    dialect.global_keyword = parse_global_keyword(path, line_no, key, value)?
                }
                "emit_end" => dialect.emit_end = parse_bool(path, line_no, key, value)?,
                "fragment_extension" => {
                    let ext = parse_string(path, line_no, key, value)?;
                    let ext = ext.trim_start_matches('.').to_string();
                    if ext.is_empty() {
                        return Err(config_error(
                            path,
                            line_no,
                            format!("'{}' expects a non-empty extension", key),
                        ));
                    }
                    dialect.fragment_extension = ext;
                }
                "shared_include" => {
                    let name = parse_string(path, line_no, key, value)?;
                    if name.is_empty() {
                        return Err(config_error(
                            path,
                            line_no,
                            format!("'{}' expects a non-empty filename", key),
                        ));
                    }
                    dialect.shared_include = name;
                }
                _ => {
                    return Err(config_error(
                        path,
                        line_no,
                        format!("unknown key '{}'", key),
                    ));
                }
            }
        }

        Ok(dialect)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigSection {
    Root,
    Dialect,
    Other,
}

fn config_error(path: &Path, line_no: usize, message: impl Into<String>) -> SpliceError {
    SpliceError::new(
        SpliceErrorKind::Dialect,
        &format!("{}:{}: {}", path.display(), line_no, message.into()),
        None,
    )
}

fn parse_bool(path: &Path, line_no: usize, key: &str, value: &str) -> Result<bool, SpliceError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(config_error(
            path,
            line_no,
            format!("invalid boolean for '{}': {}", key, value),
        )),
    }
}

fn parse_align_shift(
    path: &Path,
    line_no: usize,
    key: &str,
    value: &str,
) -> Result<u32, SpliceError> {
    let parsed = value.trim().parse::<u32>().map_err(|_| {
        config_error(
            path,
            line_no,
            format!("invalid integer for '{}': {}", key, value),
        )
    })?;
    // .align shifts beyond 2^6 are not meaningful for any supported target
    if parsed > 6 {
        return Err(config_error(
            path,
            line_no,
            format!("'{}' must be <= 6", key),
        ));
    }
    Ok(parsed)
}

fn parse_string(
    path: &Path,
    line_no: usize,
    key: &str,
    value: &str,
) -> Result<String, SpliceError> {
    let value = value.trim();
    if value.len() >= 2
        && ((value.starts_with('"') && value.ends_with('"'))
            || (value.starts_with('\'') && value.ends_with('\'')))
    {
        return Ok(value[1..value.len() - 1].to_string());
    }
    if value.contains(' ') || value.contains('\t') {
        return Err(config_error(
            path,
            line_no,
            format!("invalid string for '{}': {}", key, value),
        ));
    }
    Ok(value.to_string())
}

fn parse_global_keyword(
    path: &Path,
    line_no: usize,
    key: &str,
    value: &str,
) -> Result<GlobalKeyword, SpliceError> {
    let normalized = parse_string(path, line_no, key, value)?;
    match normalized
        .trim_start_matches('.')
        .to_ascii_lowercase()
        .as_str()
    {
        "global" => Ok(GlobalKeyword::Global),
        "globl" => Ok(GlobalKeyword::Globl),
        _ => Err(config_error(
            path,
            line_no,
            format!("invalid global keyword for '{}': {}", key, value),
        )),
    }
}

fn strip_toml_comment(line: &str) -> &str {
    let mut in_single = false;
    let mut in_double = false;
    let mut escaped = false;

    for (idx, ch) in line.char_indices() {
        match ch {
            '\'' if !in_double => in_single = !in_single,
            '"' if !in_single && !escaped => in_double = !in_double,
            '#' if !in_single && !in_double => return &line[..idx],
            _ => {}
        }

        escaped = in_double && ch == '\\' && !escaped;
        if ch != '\\' {
            escaped = false;
        }
    }
    line
}

#[cfg(test)]
mod tests {
    use super::{DirectiveDialect, GlobalKeyword, SpliceError};
    use std::fs;
    use std::path::{Path, PathBuf};
    use std::process;
    use std::time::{SystemTime, UNIX_EPOCH};

    #[test]
    fn default_dialect_matches_active_header_form() {
        let dialect = DirectiveDialect::default();
        assert_eq!(dialect.section, ".text");
        assert_eq!(dialect.align_shift, 2);
        assert_eq!(dialect.global_keyword, GlobalKeyword::Global);
        assert!(!dialect.emit_end);
        assert_eq!(dialect.fragment_extension, "s");
        assert_eq!(dialect.shared_include, "macro.inc");
    }

    #[test]
    fn render_fragment_block_orders_directives() {
        let dialect = DirectiveDialect::default();
        let block = dialect.render_fragment_block("asm/nonmatching/world", "func_80173E78");
        assert_eq!(
            block,
            ".text\n\t.align\t2\n\t.global\tfunc_80173E78\n.include \"asm/nonmatching/world/func_80173E78.s\"\n"
        );
    }

    #[test]
    fn render_fragment_block_honors_globl_and_end() {
        let dialect = DirectiveDialect {
            global_keyword: GlobalKeyword::Globl,
            emit_end: true,
            ..DirectiveDialect::default()
        };
        let block = dialect.render_fragment_block("a", "f1");
        assert_eq!(
            block,
            ".text\n\t.align\t2\n\t.globl\tf1\n.include \"a/f1.s\"\n\t.end\tf1\n"
        );
    }

    #[test]
    fn render_shared_include_uses_configured_name() {
        let dialect = DirectiveDialect {
            shared_include: "common.inc".to_string(),
            ..DirectiveDialect::default()
        };
        assert_eq!(dialect.render_shared_include(), ".include \"common.inc\"\n");
    }

    #[test]
    fn load_from_path_parses_root_keys() {
        let path = create_temp_dialect(
            "root-keys",
            "section = \".text.boot\"
align_shift = 3
global_keyword = \"globl\"
emit_end = true
",
        );
        let dialect = DirectiveDialect::load_from_path(&path).expect("load dialect");
        assert_eq!(dialect.section, ".text.boot");
        assert_eq!(dialect.align_shift, 3);
        assert_eq!(dialect.global_keyword, GlobalKeyword::Globl);
        assert!(dialect.emit_end);
    }

    #[test]
    fn load_from_path_parses_dialect_section() {
        let path = create_temp_dialect(
            "dialect-section",
            "[dialect]
fragment_extension = \".asm\"
shared_include = \"macros/common.inc\"
",
        );
        let dialect = DirectiveDialect::load_from_path(&path).expect("load dialect");
        assert_eq!(dialect.fragment_extension, "asm");
        assert_eq!(dialect.shared_include, "macros/common.inc");
    }

    #[test]
    fn load_from_path_ignores_foreign_sections() {
        let path = create_temp_dialect(
            "foreign-section",
            "[formatter]
label_case = \"lower\"
[dialect]
emit_end = true
",
        );
        let dialect = DirectiveDialect::load_from_path(&path).expect("load dialect");
        assert!(dialect.emit_end);
    }

    #[test]
    fn load_from_path_rejects_unknown_key() {
        let path = create_temp_dialect("unknown-key", "oops = 1\n");
        let err = DirectiveDialect::load_from_path(&path).expect_err("unknown key must fail");
        assert_error_contains(&err, "unknown key 'oops'");
    }

    #[test]
    fn load_from_path_rejects_duplicate_key() {
        let path = create_temp_dialect(
            "duplicate",
            "emit_end = true
emit_end = false
",
        );
        let err = DirectiveDialect::load_from_path(&path).expect_err("duplicate should fail");
        assert_error_contains(&err, "duplicate key 'emit_end'");
    }

    #[test]
    fn load_from_path_rejects_invalid_global_keyword() {
        let path = create_temp_dialect("bad-global", "global_keyword = \"globally\"\n");
        let err = DirectiveDialect::load_from_path(&path).expect_err("invalid keyword");
        assert_error_contains(&err, "invalid global keyword");
    }

    #[test]
    fn load_from_path_rejects_sectionless_name() {
        let path = create_temp_dialect("bad-section", "section = \"text\"\n");
        let err = DirectiveDialect::load_from_path(&path).expect_err("bad section");
        assert_error_contains(&err, "section must start with '.'");
    }

    #[test]
    fn load_from_path_rejects_oversized_align_shift() {
        let path = create_temp_dialect("big-align", "align_shift = 9\n");
        let err = DirectiveDialect::load_from_path(&path).expect_err("align too large");
        assert_error_contains(&err, "'align_shift' must be <= 6");
    }

    #[test]
    fn load_from_path_accepts_dotted_global_keyword() {
        let path = create_temp_dialect("dotted-global", "global_keyword = \".globl\"\n");
        let dialect = DirectiveDialect::load_from_path(&path).expect("load dialect");
        assert_eq!(dialect.global_keyword, GlobalKeyword::Globl);
    }

    fn assert_error_contains(err: &SpliceError, needle: &str) {
        assert!(
            err.to_string().contains(needle),
            "error '{}' did not contain '{}'",
            err,
            needle
        );
    }

    fn create_temp_dialect(label: &str, content: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("target")
            .join(format!("dialect-{label}-{}-{nanos}", process::id()));
        fs::create_dir_all(&dir).expect("create temp dir");
        let path = dir.join("dialect.toml");
        fs::write(&path, content).expect("write dialect");
        assert!(Path::new(&path).exists());
        path
    }
}
