// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

// CLI entrypoint for incForge.

use std::fs;
use std::io::{self, Write};

use clap::Parser;
use serde_json::json;

use incforge::splice::cli::{validate_cli, Cli, CliConfig, OutputFormat};
use incforge::splice::error::RunError;
use incforge::splice::{run_unit, UnitReport, UnitRequest};

fn format_error_line(err: &RunError, format: OutputFormat) -> String {
    if format == OutputFormat::Json {
        json!({
            "severity": "error",
            "message": err.to_string(),
            "details": err.details(),
        })
        .to_string()
    } else {
        let mut out = format!("error: {err}");
        for detail in err.details() {
            out.push('\n');
            out.push_str(&format!("  {detail}"));
        }
        out
    }
}

fn format_summary_line(report: &UnitReport, config: &CliConfig) -> String {
    if config.output_format == OutputFormat::Json {
        json!({
            "manifest": config.manifest_path.to_string_lossy(),
            "mode": report.mode.as_str(),
            "fragments": report.fragments,
            "emitted_bytes": report.output.len(),
        })
        .to_string()
    } else {
        format!(
            "{}: {} fragment(s) in {} mode",
            config.manifest_path.display(),
            report.fragments,
            report.mode.as_str()
        )
    }
}

fn write_unit_output(report: &UnitReport, config: &CliConfig) -> Result<(), String> {
    match &config.out_path {
        Some(path) => fs::write(path, &report.output)
            .map_err(|err| format!("error writing '{}': {err}", path.display())),
        None => {
            let mut stdout = io::stdout();
            stdout
                .write_all(report.output.as_bytes())
                .map_err(|err| format!("error writing to stdout: {err}"))
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let config = match validate_cli(&cli) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{}", format_error_line(&err, cli.format));
            std::process::exit(1);
        }
    };

    let request = UnitRequest {
        manifest_path: config.manifest_path.clone(),
        mode_override: config.mode_override,
        dialect: config.dialect.clone(),
        check_root: config.check_root.clone(),
    };

    match run_unit(&request) {
        Ok(report) => {
            if let Err(message) = write_unit_output(&report, &config) {
                eprintln!("{message}");
                std::process::exit(1);
            }
            // stdout carries only unit text; run reporting goes to stderr.
            if !config.quiet && config.out_path.is_some() {
                eprintln!("{}", format_summary_line(&report, &config));
            }
        }
        Err(err) => {
            eprintln!("{}", format_error_line(&err, config.output_format));
            std::process::exit(1);
        }
    }
}
