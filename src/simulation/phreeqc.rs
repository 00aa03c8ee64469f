//! PHREEQC invocation wrapper.
//!
//! Renders a thermodynamic database from a template, runs the external
//! `phreeqc` binary, and reads back its selected output.

use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use log::debug;

use super::selected_output::SelectedOutput;
use crate::error::{Ml4ScmError, Result};

/// Name of the binary searched on `PATH`.
pub const PHREEQC_BINARY: &str = "phreeqc";

/// Selected-output file name PHREEQC uses when the input does not set one.
pub const DEFAULT_SELECTED_OUTPUT: &str = "selected.out";

/// Main output file written by [`Phreeqc::run`].
pub const DEFAULT_OUTPUT_FILE: &str = "output.out";

/// Extension of database templates.
pub const TEMPLATE_EXTENSION: &str = "tpl";

/// Extension of rendered databases.
pub const DATABASE_EXTENSION: &str = "txt";

/// Output of one PHREEQC run.
#[derive(Debug, Clone, PartialEq)]
pub struct PhreeqcOutput {
    pub stdout: String,
    pub stderr: String,
    /// Parsed selected output
    pub output: SelectedOutput,
}

/// Handle on a PHREEQC executable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Phreeqc {
    path: PathBuf,
}

/// `name` with `.ext` appended, keeping any extension already present.
pub(crate) fn with_appended_extension(path: &Path, ext: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".");
    name.push(ext);
    PathBuf::from(name)
}

fn find_in_path(binary: &str) -> Option<PathBuf> {
    let file_name = format!("{}{}", binary, env::consts::EXE_SUFFIX);
    env::var_os("PATH").and_then(|paths| {
        env::split_paths(&paths)
            .map(|dir| dir.join(&file_name))
            .find(|candidate| candidate.is_file())
    })
}

impl Phreeqc {
    /// Locate PHREEQC.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the binary; `PATH` is searched when `None`
    pub fn new(path: Option<PathBuf>) -> Result<Self> {
        let path = match path {
            Some(path) => path,
            None => find_in_path(PHREEQC_BINARY).ok_or_else(|| {
                Ml4ScmError::SimulatorNotFound(
                    "cannot find phreeqc, please specify absolute path to phreeqc".to_string(),
                )
            })?,
        };
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write a database from a template, literally replacing every parameter
    /// name with its value.
    ///
    /// Reads `<template>.tpl`, drops its first line, and writes
    /// `<outfile>.txt` (`<template>.txt` when `outfile` is `None`).
    pub fn write_db_from_template(
        template: &Path,
        names: &[String],
        values: &[f64],
        outfile: Option<&Path>,
    ) -> Result<PathBuf> {
        if names.len() != values.len() {
            return Err(Ml4ScmError::DimensionMismatch(format!(
                "{} parameter names but {} values",
                names.len(),
                values.len()
            )));
        }

        let contents = fs::read_to_string(with_appended_extension(template, TEMPLATE_EXTENSION))?;
        // First line of a template is a comment
        let mut db = match contents.split_once('\n') {
            Some((_, rest)) => rest.to_string(),
            None => String::new(),
        };
        for (name, value) in names.iter().zip(values) {
            db = db.replace(name.as_str(), &value.to_string());
        }

        let target = with_appended_extension(outfile.unwrap_or(template), DATABASE_EXTENSION);
        fs::write(&target, db)?;
        Ok(target)
    }

    /// Find the selected-output file named by a `-file` line of an input
    /// file, falling back to [`DEFAULT_SELECTED_OUTPUT`].
    pub fn find_selected_output_filename(in_file: &Path) -> Result<PathBuf> {
        let contents = fs::read_to_string(in_file)?;
        for line in contents.lines() {
            let Some(rest) = line.trim_start().strip_prefix("-file") else {
                continue;
            };
            if rest.starts_with(char::is_whitespace) {
                return Ok(PathBuf::from(rest.trim()));
            }
        }
        Ok(PathBuf::from(DEFAULT_SELECTED_OUTPUT))
    }

    /// Read a selected-output file, defaulting to the `U` analyte.
    pub fn read_output(filename: &Path, analytes: Option<&[String]>) -> Result<SelectedOutput> {
        match analytes {
            Some(analytes) => SelectedOutput::read(filename, analytes),
            None => SelectedOutput::read(filename, &[super::DEFAULT_ANALYTE.to_string()]),
        }
    }

    /// Invoke PHREEQC with the same arguments as the binary itself.
    ///
    /// The input and database files must exist; the output file is
    /// overwritten. Returns captured stdout and stderr.
    pub fn run_phreeqc(
        &self,
        in_file: &Path,
        out_file: &Path,
        db_file: &Path,
        screen_output: Option<&Path>,
    ) -> Result<(String, String)> {
        if !in_file.exists() {
            return Err(Ml4ScmError::InvalidInput(format!(
                "in_file: {} not found",
                in_file.display()
            )));
        }
        if !db_file.exists() {
            return Err(Ml4ScmError::InvalidInput(format!(
                "db_file: {} not found",
                db_file.display()
            )));
        }

        let mut command = Command::new(&self.path);
        command.arg(in_file).arg(out_file).arg(db_file);
        if let Some(screen) = screen_output {
            command.arg(screen);
        }

        debug!(
            "running {} {} {} {}",
            self.path.display(),
            in_file.display(),
            out_file.display(),
            db_file.display()
        );
        let output = command.output()?;
        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            return Err(Ml4ScmError::SimulatorFailed {
                status: output.status.to_string(),
                stderr,
            });
        }

        Ok((stdout, stderr))
    }

    /// Run PHREEQC on an input file with the rendered database
    /// `<db_name>.txt`, then read the selected output the input names.
    pub fn run(
        &self,
        db_name: &Path,
        in_file: &Path,
        analytes: Option<&[String]>,
    ) -> Result<PhreeqcOutput> {
        self.run_with_output(db_name, in_file, Path::new(DEFAULT_OUTPUT_FILE), analytes)
    }

    /// Like [`Phreeqc::run`] with an explicit main output file.
    pub fn run_with_output(
        &self,
        db_name: &Path,
        in_file: &Path,
        out_file: &Path,
        analytes: Option<&[String]>,
    ) -> Result<PhreeqcOutput> {
        let db_file = with_appended_extension(db_name, DATABASE_EXTENSION);
        let (stdout, stderr) = self.run_phreeqc(in_file, out_file, &db_file, None)?;
        let output = Self::read_output(&Self::find_selected_output_filename(in_file)?, analytes)?;

        Ok(PhreeqcOutput {
            stdout,
            stderr,
            output,
        })
    }
}
