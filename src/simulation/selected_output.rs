//! Parser for PHREEQC selected-output tables (`.sel` files).
//!
//! A selected-output file is a header line followed by one line per
//! solution/reaction step. Fields are separated by any run of whitespace,
//! commas or double quotes. Only rows whose `state` column is `react` carry
//! reaction results; the initial-solution rows are dropped.

use std::fs;
use std::path::Path;

use log::{debug, warn};
use ndarray::{Array1, Array2};
use nom::{
    bytes::complete::{take_while, take_while1},
    multi::many0,
    sequence::{preceded, terminated},
    IResult, Parser,
};

use crate::error::{Ml4ScmError, Result};

/// State label of reaction rows.
pub const REACT_STATE: &str = "react";

fn is_separator(c: char) -> bool {
    c.is_whitespace() || c == ',' || c == '"'
}

fn fields(input: &str) -> IResult<&str, Vec<&str>> {
    preceded(
        take_while(is_separator),
        many0(terminated(
            take_while1(|c: char| !is_separator(c)),
            take_while(is_separator),
        )),
    )
    .parse(input)
}

/// Split one line of a selected-output table into its fields.
pub fn split_fields(line: &str) -> Vec<&str> {
    match fields(line) {
        Ok((_, tokens)) => tokens,
        Err(_) => Vec::new(),
    }
}

/// Column positions of the fields needed from a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnIndices {
    pub sim: usize,
    pub state: usize,
    pub analytes: Vec<usize>,
}

/// Locate the `sim`, `state` and analyte columns in a header line.
pub fn column_indices(header: &str, analytes: &[String]) -> Result<ColumnIndices> {
    let headers = split_fields(header);
    let find = |key: &str| {
        headers.iter().position(|h| *h == key).ok_or_else(|| {
            Ml4ScmError::MalformedOutput(format!(
                "key \"{}\" not found in header {:?}",
                key, headers
            ))
        })
    };

    Ok(ColumnIndices {
        sim: find("sim")?,
        state: find("state")?,
        analytes: analytes
            .iter()
            .map(|a| find(a.as_str()))
            .collect::<Result<Vec<_>>>()?,
    })
}

/// Keep the rows of a table whose state column reads `react`.
///
/// Blank lines are skipped; a non-blank row too short to have a state
/// column is an error.
pub fn filter_react_states<'a, I>(lines: I, state_idx: usize) -> Result<Vec<Vec<&'a str>>>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut rows = Vec::new();
    for (lineno, line) in lines.into_iter().enumerate() {
        let row = split_fields(line);
        if row.is_empty() {
            continue;
        }
        match row.get(state_idx) {
            Some(&REACT_STATE) => rows.push(row),
            Some(_) => {}
            None => {
                return Err(Ml4ScmError::MalformedOutput(format!(
                    "row {} has {} fields, no state column at {}",
                    lineno + 1,
                    row.len(),
                    state_idx
                )))
            }
        }
    }
    Ok(rows)
}

fn field<'a>(row: &[&'a str], idx: usize) -> Result<&'a str> {
    row.get(idx).copied().ok_or_else(|| {
        Ml4ScmError::MalformedOutput(format!("row {:?} has no column {}", row, idx))
    })
}

/// Reaction results read from a selected-output table.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedOutput {
    /// Simulation number of each react row
    pub simulations: Vec<i64>,

    /// Requested analyte names, in order
    pub analytes: Vec<String>,

    /// One row per analyte, one column per react row
    pub values: Array2<f64>,
}

impl SelectedOutput {
    /// Parse the text of a selected-output table.
    pub fn parse(contents: &str, analytes: &[String]) -> Result<Self> {
        let mut lines = contents.lines();
        let header = lines
            .next()
            .ok_or_else(|| Ml4ScmError::MalformedOutput("empty selected output".to_string()))?;
        let columns = column_indices(header, analytes)?;
        let rows = filter_react_states(lines, columns.state)?;

        let simulations = rows
            .iter()
            .map(|row| {
                let text = field(row, columns.sim)?;
                text.parse::<i64>().map_err(|_| {
                    Ml4ScmError::MalformedOutput(format!("invalid simulation number '{}'", text))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut values = Array2::zeros((analytes.len(), rows.len()));
        for (a, &idx) in columns.analytes.iter().enumerate() {
            for (r, row) in rows.iter().enumerate() {
                let text = field(row, idx)?;
                values[[a, r]] = text.parse::<f64>().map_err(|_| {
                    Ml4ScmError::MalformedOutput(format!(
                        "invalid value '{}' for {}",
                        text, analytes[a]
                    ))
                })?;
            }
        }

        if rows.is_empty() {
            warn!("selected output contains no {} rows", REACT_STATE);
        }

        Ok(Self {
            simulations,
            analytes: analytes.to_vec(),
            values,
        })
    }

    /// Read and parse a selected-output file.
    pub fn read(path: impl AsRef<Path>, analytes: &[String]) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let output = Self::parse(&contents, analytes).map_err(|e| match e {
            Ml4ScmError::MalformedOutput(msg) => Ml4ScmError::MalformedOutput(format!(
                "failed to parse columns of {}: {}",
                path.display(),
                msg
            )),
            other => other,
        })?;
        debug!(
            "read {} react rows from {}",
            output.simulations.len(),
            path.display()
        );
        Ok(output)
    }

    /// All analyte series concatenated in analyte order.
    pub fn concentrations(&self) -> Array1<f64> {
        self.values.iter().copied().collect()
    }
}
