// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! Result files.
//!
//! A result file starts with `SAT` or `UNSAT`. After `SAT` follows one line
//! per object, in input order, with seven integers:
//!
//! ```raw
//! container_id x_min y_min z_min x_max y_max z_max
//! ```
//!
//! [`write_report`] renders a [`Solution`] (or its absence) in this format.
//! [`read_report`] parses it back so that an earlier result can seed a new
//! search or be rendered.

use crate::{
    index::{ContainerIndex, ObjectIndex},
    model::Model,
    orientation::{Extents, Orientation},
    solution::{Placement, Solution},
};
use num_traits::{PrimInt, Signed};
use std::{
    fmt::Display,
    io::{BufRead, Write},
    str::FromStr,
};

const SAT: &str = "SAT";
const UNSAT: &str = "UNSAT";

/// Writes `solution` in the result format, or `UNSAT` when it is `None`.
pub fn write_report<W, T>(mut writer: W, solution: Option<&Solution<T>>) -> std::io::Result<()>
where
    W: Write,
    T: PrimInt + Signed + Display,
{
    let Some(solution) = solution else {
        writeln!(writer, "{UNSAT}")?;
        return writer.flush();
    };

    writeln!(writer, "{SAT}")?;
    for p in solution.placements() {
        let (x1, y1, z1) = p.max_corner();
        writeln!(
            writer,
            "{} {} {} {} {} {} {}",
            p.container().get(),
            p.x(),
            p.y(),
            p.z(),
            x1,
            y1,
            z1
        )?;
    }
    writer.flush()
}

/// One line of a `SAT` result file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReportRecord<T> {
    pub container: usize,
    pub min: (T, T, T),
    pub max: (T, T, T),
}

impl<T> ReportRecord<T>
where
    T: PrimInt + Signed,
{
    /// The effective extents `max - min`.
    #[inline]
    pub fn extents(&self) -> Extents<T> {
        Extents::new(
            self.max.0 - self.min.0,
            self.max.1 - self.min.1,
            self.max.2 - self.min.2,
        )
    }
}

/// A parsed result file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Report<T> {
    Sat(Vec<ReportRecord<T>>),
    Unsat,
}

impl<T> Report<T>
where
    T: PrimInt + Signed,
{
    #[inline]
    pub fn is_sat(&self) -> bool {
        matches!(self, Report::Sat(_))
    }

    /// Rebuilds the [`Solution`] this report describes for `model`.
    ///
    /// The orientation of each object is recovered as the first rotation
    /// of its base extents that produces the reported extents.
    pub fn to_solution(&self, model: &Model<T>) -> Result<Solution<T>, ReportError> {
        let Report::Sat(records) = self else {
            return Err(ReportError::NotSatisfiable);
        };

        if records.len() != model.num_objects() {
            return Err(ReportError::ObjectCountMismatch {
                expected: model.num_objects(),
                found: records.len(),
            });
        }

        let placements = records
            .iter()
            .enumerate()
            .map(|(i, record)| {
                let base = model.object_extents(ObjectIndex::new(i));
                let orientation = Orientation::matching(&base, &record.extents())
                    .ok_or(ReportError::ExtentsMismatch { object: i })?;
                Ok(Placement::new(
                    ContainerIndex::new(record.container),
                    orientation,
                    record.min,
                    base,
                ))
            })
            .collect::<Result<Vec<_>, ReportError>>()?;

        Ok(Solution::new(placements))
    }
}

/// The error type for reading result files.
#[derive(Debug)]
pub enum ReportError {
    Io(std::io::Error),
    /// The file contains no header line.
    MissingHeader,
    /// The first line is neither `SAT` nor `UNSAT`.
    InvalidHeader(String),
    /// A line does not hold exactly seven fields.
    FieldCount { line: usize, found: usize },
    /// A field is not an integer.
    InvalidField { line: usize, token: String },
    /// A maximum coordinate lies below its minimum, or the container id is negative.
    InvalidRecord { line: usize },
    /// The report does not describe a packing.
    NotSatisfiable,
    /// The number of records differs from the number of objects.
    ObjectCountMismatch { expected: usize, found: usize },
    /// The reported extents are no rotation of the object's base extents.
    ExtentsMismatch { object: usize },
}

impl Display for ReportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::MissingHeader => write!(f, "result file is empty"),
            Self::InvalidHeader(h) => write!(f, "expected SAT or UNSAT, found '{h}'"),
            Self::FieldCount { line, found } => {
                write!(f, "line {line}: expected 7 fields, found {found}")
            }
            Self::InvalidField { line, token } => {
                write!(f, "line {line}: '{token}' is not an integer")
            }
            Self::InvalidRecord { line } => write!(f, "line {line}: inconsistent placement record"),
            Self::NotSatisfiable => write!(f, "result file reports UNSAT"),
            Self::ObjectCountMismatch { expected, found } => {
                write!(f, "expected {expected} placement records, found {found}")
            }
            Self::ExtentsMismatch { object } => write!(
                f,
                "placement of object {object} does not match any rotation of its extents"
            ),
        }
    }
}

impl std::error::Error for ReportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ReportError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

/// Parses a result file. Blank lines are ignored.
pub fn read_report<R, T>(reader: R) -> Result<Report<T>, ReportError>
where
    R: BufRead,
    T: PrimInt + Signed + FromStr,
{
    let mut lines = reader
        .lines()
        .enumerate()
        .map(|(i, l)| l.map(|l| (i + 1, l)));

    let header = loop {
        match lines.next() {
            None => return Err(ReportError::MissingHeader),
            Some(line) => {
                let (_, text) = line?;
                let text = text.trim().to_owned();
                if !text.is_empty() {
                    break text;
                }
            }
        }
    };

    match header.as_str() {
        UNSAT => return Ok(Report::Unsat),
        SAT => {}
        _ => return Err(ReportError::InvalidHeader(header)),
    }

    let mut records = Vec::new();
    for line in lines {
        let (number, text) = line?;
        let fields: Vec<&str> = text.split_whitespace().collect();
        if fields.is_empty() {
            continue;
        }
        if fields.len() != 7 {
            return Err(ReportError::FieldCount {
                line: number,
                found: fields.len(),
            });
        }

        let parse = |token: &str| {
            token.parse::<T>().map_err(|_| ReportError::InvalidField {
                line: number,
                token: token.to_owned(),
            })
        };

        let container = parse(fields[0])?
            .to_usize()
            .ok_or(ReportError::InvalidRecord { line: number })?;
        let min = (parse(fields[1])?, parse(fields[2])?, parse(fields[3])?);
        let max = (parse(fields[4])?, parse(fields[5])?, parse(fields[6])?);
        if max.0 < min.0 || max.1 < min.1 || max.2 < min.2 {
            return Err(ReportError::InvalidRecord { line: number });
        }

        records.push(ReportRecord {
            container,
            min,
            max,
        });
    }

    Ok(Report::Sat(records))
}
