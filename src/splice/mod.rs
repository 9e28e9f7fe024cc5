// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Mode-switchable assembly-fragment inclusion for decompilation builds.

pub mod cli;
pub mod dialect;
pub mod emitter;
pub mod error;
pub mod manifest;

use std::path::{Path, PathBuf};

use crate::splice::dialect::DirectiveDialect;
use crate::splice::emitter::{BuildMode, UnitEmitter};
use crate::splice::error::{RunError, SpliceError, SpliceErrorKind};
use crate::splice::manifest::Manifest;

/// Everything needed to generate one compilation unit.
#[derive(Debug, Clone)]
pub struct UnitRequest {
    pub manifest_path: PathBuf,
    pub mode_override: Option<BuildMode>,
    pub dialect: DirectiveDialect,
    /// Include-search root for the opt-in fragment existence check.
    pub check_root: Option<PathBuf>,
}

/// Result of a successful unit run.
#[derive(Debug, Clone)]
pub struct UnitReport {
    pub mode: BuildMode,
    pub output: String,
    pub fragments: usize,
}

/// Load the manifest, resolve the mode once, and emit the unit text.
pub fn run_unit(request: &UnitRequest) -> Result<UnitReport, RunError> {
    let manifest = Manifest::load_from_path(&request.manifest_path)?;

    // Mode precedence: CLI override, then manifest, then splice.
    let mode = request
        .mode_override
        .or(manifest.mode)
        .unwrap_or(BuildMode::Splice);

    // Fragment files are only a contract of splice mode.
    if mode == BuildMode::Splice {
        if let Some(root) = &request.check_root {
            check_fragment_files(root, &request.manifest_path, &manifest, &request.dialect)?;
        }
    }

    let mut emitter = UnitEmitter::new(mode, request.dialect.clone());
    let fragments = manifest.entries.len();
    for entry in &manifest.entries {
        emitter
            .include_fragment(&entry.folder, &entry.symbol)
            .map_err(|err| {
                RunError::new(
                    SpliceError::new(
                        err.kind(),
                        &format!(
                            "{}:{}: {err}",
                            request.manifest_path.display(),
                            entry.line
                        ),
                        None,
                    ),
                    Vec::new(),
                )
            })?;
    }

    Ok(UnitReport {
        mode,
        output: emitter.finish(),
        fragments,
    })
}

fn check_fragment_files(
    root: &Path,
    manifest_path: &Path,
    manifest: &Manifest,
    dialect: &DirectiveDialect,
) -> Result<(), RunError> {
    let mut missing = Vec::new();
    for entry in &manifest.entries {
        let relative = dialect.fragment_path(&entry.folder, &entry.symbol);
        if !root.join(&relative).is_file() {
            missing.push(format!(
                "{}:{}: {relative}",
                manifest_path.display(),
                entry.line
            ));
        }
    }
    if missing.is_empty() {
        return Ok(());
    }
    Err(RunError::new(
        SpliceError::new(
            SpliceErrorKind::Fragment,
            &format!(
                "{} fragment file(s) missing under '{}'",
                missing.len(),
                root.display()
            ),
            None,
        ),
        missing,
    ))
}

#[cfg(test)]
mod tests {
    use super::{run_unit, BuildMode, DirectiveDialect, UnitRequest};
    use std::fs;
    use std::path::PathBuf;
    use std::process;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn create_temp_dir(label: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("target")
            .join(format!("splice-{label}-{}-{nanos}", process::id()));
        fs::create_dir_all(&dir).expect("create temp dir");
        dir
    }

    fn write_manifest(dir: &PathBuf, content: &str) -> PathBuf {
        let path = dir.join("unit.mf");
        fs::write(&path, content).expect("write manifest");
        path
    }

    fn request(manifest_path: PathBuf) -> UnitRequest {
        UnitRequest {
            manifest_path,
            mode_override: None,
            dialect: DirectiveDialect::default(),
            check_root: None,
        }
    }

    #[test]
    fn run_unit_defaults_to_splice_mode() {
        let dir = create_temp_dir("default-mode");
        let manifest = write_manifest(&dir, "include a f1\n");
        let report = run_unit(&request(manifest)).expect("run unit");
        assert_eq!(report.mode, BuildMode::Splice);
        assert_eq!(report.fragments, 1);
        assert!(report.output.contains(".include \"a/f1.s\""));
    }

    #[test]
    fn run_unit_cli_override_beats_manifest_mode() {
        let dir = create_temp_dir("override-mode");
        let manifest = write_manifest(&dir, "mode splice\ninclude a f1\n");
        let mut req = request(manifest);
        req.mode_override = Some(BuildMode::Permuter);
        let report = run_unit(&req).expect("run unit");
        assert_eq!(report.mode, BuildMode::Permuter);
        assert_eq!(report.fragments, 1);
        assert_eq!(report.output, "");
    }

    #[test]
    fn run_unit_prefixes_token_errors_with_manifest_line() {
        let dir = create_temp_dir("token-error");
        let manifest = write_manifest(&dir, "include a 1bad\n");
        let err = run_unit(&request(manifest.clone())).expect_err("bad symbol");
        let prefix = format!("{}:1: ", manifest.display());
        assert!(
            err.to_string().starts_with(&prefix),
            "error '{}' missing prefix '{prefix}'",
            err
        );
    }

    #[test]
    fn run_unit_checks_fragment_files_when_asked() {
        let dir = create_temp_dir("check-fragments");
        fs::create_dir_all(dir.join("a")).expect("create fragment dir");
        fs::write(dir.join("a/f1.s"), "nop\n").expect("write fragment");
        let manifest = write_manifest(&dir, "include a f1\ninclude a f2\n");
        let mut req = request(manifest);
        req.check_root = Some(dir.clone());
        let err = run_unit(&req).expect_err("f2 missing");
        assert!(err.to_string().contains("1 fragment file(s) missing"));
        assert_eq!(err.details().len(), 1);
        assert!(err.details()[0].ends_with("a/f2.s"));
    }

    #[test]
    fn run_unit_skips_existence_check_in_permuter_mode() {
        let dir = create_temp_dir("check-skip-permuter");
        let manifest = write_manifest(&dir, "include a f1\n");
        let mut req = request(manifest);
        req.mode_override = Some(BuildMode::Permuter);
        req.check_root = Some(dir.clone());
        let report = run_unit(&req).expect("run unit");
        assert_eq!(report.output, "");
    }

    #[test]
    fn run_unit_passes_existence_check_when_fragments_exist() {
        let dir = create_temp_dir("check-fragments-ok");
        fs::create_dir_all(dir.join("a")).expect("create fragment dir");
        fs::write(dir.join("a/f1.s"), "nop\n").expect("write fragment");
        let manifest = write_manifest(&dir, "include a f1\n");
        let mut req = request(manifest);
        req.check_root = Some(dir.clone());
        let report = run_unit(&req).expect("run unit");
        assert_eq!(report.fragments, 1);
    }
}
