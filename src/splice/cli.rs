// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Command-line interface parsing and argument validation.

use std::env;
use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};

use crate::splice::dialect::DirectiveDialect;
use crate::splice::emitter::BuildMode;
use crate::splice::error::{RunError, SpliceError, SpliceErrorKind};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

const LONG_ABOUT: &str =
    "Generates the assembly-fragment inclusion text for one compilation unit of a
decompilation build.

In splice mode each manifest entry becomes a section switch, alignment,
global declaration, and include request for <folder>/<symbol>.s, plus one
unit-wide include of the shared macro file. In permuter mode the same
manifest yields no output, so code-equivalence tooling sees only the
source-level stand-ins.";

#[derive(Parser, Debug)]
#[command(
    name = "incforge",
    version = VERSION,
    about = "Mode-switchable assembly-fragment inclusion generator for decomp builds",
    long_about = LONG_ABOUT
)]
pub struct Cli {
    #[arg(
        long = "format",
        value_enum,
        default_value_t = OutputFormat::Text,
        long_help = "Select global CLI output format. text is default; json enables machine-readable output."
    )]
    pub format: OutputFormat,
    #[arg(
        short = 'q',
        long = "quiet",
        action = ArgAction::SetTrue,
        long_help = "Suppress the run summary for successful generations. Errors are still reported."
    )]
    pub quiet: bool,
    #[arg(
        short = 'i',
        long = "infile",
        value_name = "FILE",
        long_help = "Unit manifest listing include <folder> <symbol> lines and an optional mode line."
    )]
    pub infile: Option<PathBuf>,
    #[arg(
        short = 'o',
        long = "outfile",
        value_name = "FILE",
        long_help = "Write the generated unit text to FILE instead of stdout."
    )]
    pub outfile: Option<PathBuf>,
    #[arg(
        long = "splice",
        action = ArgAction::SetTrue,
        conflicts_with = "permuter",
        long_help = "Force splice mode, overriding any mode line in the manifest."
    )]
    pub splice: bool,
    #[arg(
        long = "permuter",
        action = ArgAction::SetTrue,
        long_help = "Force permuter mode, overriding any mode line in the manifest. Every call becomes a no-op."
    )]
    pub permuter: bool,
    #[arg(
        long = "dialect",
        value_name = "FILE",
        long_help = "Directive dialect TOML (.global vs .globl spelling, trailing .end, section name, alignment, extensions)."
    )]
    pub dialect_file: Option<PathBuf>,
    #[arg(
        long = "root",
        value_name = "DIR",
        long_help = "Include-search root that fragment paths resolve against. Only used by --check-fragments."
    )]
    pub root: Option<PathBuf>,
    #[arg(
        long = "check-fragments",
        action = ArgAction::SetTrue,
        long_help = "Verify that <root>/<folder>/<symbol>.s exists for every manifest entry before emitting. Requires --root (or INCFORGE_ROOT). Without this flag missing fragments stay a downstream assembler failure."
    )]
    pub check_fragments: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Validated CLI configuration.
#[derive(Debug)]
pub struct CliConfig {
    pub manifest_path: PathBuf,
    pub out_path: Option<PathBuf>,
    pub mode_override: Option<BuildMode>,
    pub dialect: DirectiveDialect,
    pub check_root: Option<PathBuf>,
    pub quiet: bool,
    pub output_format: OutputFormat,
}

fn cli_error(message: impl Into<String>) -> RunError {
    RunError::new(
        SpliceError::new(SpliceErrorKind::Cli, &message.into(), None),
        Vec::new(),
    )
}

fn parse_env_bool(var_name: &str) -> Result<Option<bool>, RunError> {
    let Some(raw) = env::var_os(var_name) else {
        return Ok(None);
    };
    let value = raw.to_string_lossy().trim().to_ascii_lowercase();
    let parsed = match value.as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        "" => None,
        _ => {
            return Err(cli_error(format!(
                "Invalid boolean value for {var_name}: {value}"
            )))
        }
    };
    Ok(parsed)
}

fn parse_env_path(var_name: &str) -> Result<Option<PathBuf>, RunError> {
    let Some(raw) = env::var_os(var_name) else {
        return Ok(None);
    };
    let value = raw.to_string_lossy().trim().to_string();
    if value.is_empty() {
        return Ok(None);
    }
    Ok(Some(PathBuf::from(value)))
}

/// Validate CLI arguments and return parsed configuration.
pub fn validate_cli(cli: &Cli) -> Result<CliConfig, RunError> {
    let env_infile = parse_env_path("INCFORGE_INFILE")?;
    let env_dialect = parse_env_path("INCFORGE_DIALECT")?;
    let env_root = parse_env_path("INCFORGE_ROOT")?;
    let env_quiet = parse_env_bool("INCFORGE_QUIET")?;
    let env_permuter = parse_env_bool("INCFORGE_PERMUTER")?;

    let manifest_path = if let Some(path) = &cli.infile {
        path.clone()
    } else if let Some(path) = env_infile {
        path
    } else {
        return Err(cli_error("No manifest specified. Use -i/--infile"));
    };

    let effective_quiet = if cli.quiet {
        true
    } else {
        env_quiet.unwrap_or(false)
    };

    // The mode is fixed here, once, before any manifest entry is processed.
    let mode_override = if cli.splice {
        Some(BuildMode::Splice)
    } else if cli.permuter {
        Some(BuildMode::Permuter)
    } else {
        match env_permuter {
            Some(true) => Some(BuildMode::Permuter),
            Some(false) => Some(BuildMode::Splice),
            None => None,
        }
    };

    let effective_dialect_file = if cli.dialect_file.is_some() {
        cli.dialect_file.clone()
    } else {
        env_dialect
    };

    let dialect = match &effective_dialect_file {
        Some(path) => DirectiveDialect::load_from_path(path).map_err(RunError::from)?,
        None => DirectiveDialect::default(),
    };

    let effective_root = if cli.root.is_some() {
        cli.root.clone()
    } else {
        env_root
    };

    let check_root = if cli.check_fragments {
        match &effective_root {
            Some(root) => {
                if !root.is_dir() {
                    return Err(cli_error(format!(
                        "--root is not a directory: {}",
                        root.display()
                    )));
                }
                Some(root.clone())
            }
            None => return Err(cli_error("--check-fragments requires --root")),
        }
    } else {
        None
    };

    Ok(CliConfig {
        manifest_path,
        out_path: cli.outfile.clone(),
        mode_override,
        dialect,
        check_root,
        quiet: effective_quiet,
        output_format: cli.format,
    })
}
