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

//! Instance loader.
//!
//! Reads the plain-text instance format into a [`Model`]:
//!
//! ```raw
//! L W H      # container extents
//! N          # number of objects
//! l_1 w_1 h_1
//! ...
//! l_N w_N h_N
//! ```
//!
//! Every record sits on a line of its own and holds exactly its number of
//! whitespace separated values. `#` starts a comment that runs to the end of
//! the line, and lines that are blank once comments are removed are skipped.
//! Every value must be a strictly positive integer, and the number of object
//! records must match `N` exactly: a missing record is reported as an
//! unexpected end of input, an extra one as trailing data.

use crate::{
    model::{Model, ModelBuilder},
    orientation::Extents,
};
use num_traits::{PrimInt, Signed};
use std::{
    fmt::Display,
    fs::File,
    io::{BufRead, BufReader, Read},
    path::Path,
    str::FromStr,
};

/// The error type for the problem loading process.
///
/// Every variant describes a malformed instance.
#[derive(Debug)]
pub enum ProblemLoaderError {
    /// An I/O error occurred while reading the input stream.
    Io(std::io::Error),
    /// The input ended while `expected` was still missing.
    UnexpectedEof { expected: String },
    /// The record on `line` held `found` values instead of `expected`.
    MalformedRecord {
        line: usize,
        what: String,
        expected: usize,
        found: usize,
    },
    /// A token could not be parsed into the expected integer type.
    Parse(ParseTokenError),
    /// A count or extent was zero or negative.
    NonPositive { what: String, value: String },
    /// More tokens follow the declared object records.
    TrailingData { token: String },
}

/// Details about a failed token parsing attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTokenError {
    /// The string token that failed to parse.
    pub token: String,
    /// The name of the type we tried to parse into (e.g., "i64").
    pub type_name: &'static str,
}

impl std::fmt::Display for ParseTokenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "could not parse token '{}' as type {}",
            self.token, self.type_name
        )
    }
}

impl std::error::Error for ParseTokenError {}

impl Display for ProblemLoaderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::UnexpectedEof { expected } => {
                write!(f, "unexpected end of input while reading {expected}")
            }
            Self::MalformedRecord {
                line,
                what,
                expected,
                found,
            } => write!(
                f,
                "line {line}: {what} needs {expected} value(s), found {found}"
            ),
            Self::Parse(e) => write!(f, "parse error: {e}"),
            Self::NonPositive { what, value } => {
                write!(f, "{what} must be a positive integer, got {value}")
            }
            Self::TrailingData { token } => write!(
                f,
                "unexpected token '{token}' after the declared object records"
            ),
        }
    }
}

impl std::error::Error for ProblemLoaderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ProblemLoaderError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<ParseTokenError> for ProblemLoaderError {
    fn from(e: ParseTokenError) -> Self {
        Self::Parse(e)
    }
}

/// Loads container loading instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProblemLoader<T> {
    _marker: std::marker::PhantomData<T>,
}

impl<T> Default for ProblemLoader<T> {
    fn default() -> Self {
        Self {
            _marker: std::marker::PhantomData,
        }
    }
}

impl<T> ProblemLoader<T>
where
    T: PrimInt + Signed + FromStr + Display,
{
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a problem from a type implementing `BufRead`.
    pub fn from_bufread<R: BufRead>(&self, rdr: R) -> Result<Model<T>, ProblemLoaderError> {
        let mut records = RecordReader::new(rdr);

        let container = Self::read_extents(&mut records, "container")?;

        let count = records.next_record("object count", 1)?;
        let declared = Self::parse_positive(&count[0], "object count")?;
        let n = declared
            .to_usize()
            .ok_or_else(|| ProblemLoaderError::NonPositive {
                what: "object count".to_owned(),
                value: declared.to_string(),
            })?;

        let mut builder = ModelBuilder::new(container);
        for i in 0..n {
            let extents = Self::read_extents(&mut records, &format!("object {i}"))?;
            builder.add_object(extents);
        }

        if let Some(mut tokens) = records.next_tokens()? {
            return Err(ProblemLoaderError::TrailingData {
                token: tokens.swap_remove(0),
            });
        }

        Ok(builder.build())
    }

    /// Loads a problem from a file path.
    #[inline]
    pub fn from_path<P: AsRef<Path>>(&self, path: P) -> Result<Model<T>, ProblemLoaderError> {
        let file = File::open(path)?;
        self.from_bufread(BufReader::new(file))
    }

    /// Loads a problem from a generic reader.
    #[inline]
    pub fn from_reader<R: Read>(&self, r: R) -> Result<Model<T>, ProblemLoaderError> {
        self.from_bufread(BufReader::new(r))
    }

    /// Loads a problem from a string slice.
    #[inline]
    pub fn from_str(&self, s: &str) -> Result<Model<T>, ProblemLoaderError> {
        self.from_reader(s.as_bytes())
    }

    fn read_extents<R: BufRead>(
        records: &mut RecordReader<R>,
        owner: &str,
    ) -> Result<Extents<T>, ProblemLoaderError> {
        let values = records.next_record(owner, 3)?;
        let l = Self::parse_positive(&values[0], &format!("{owner} length"))?;
        let w = Self::parse_positive(&values[1], &format!("{owner} width"))?;
        let h = Self::parse_positive(&values[2], &format!("{owner} height"))?;
        Ok(Extents::new(l, w, h))
    }

    fn parse_positive(token: &str, what: &str) -> Result<T, ProblemLoaderError> {
        let value: T = token.parse().map_err(|_| {
            ProblemLoaderError::Parse(ParseTokenError {
                token: token.to_owned(),
                type_name: std::any::type_name::<T>(),
            })
        })?;
        if value <= T::zero() {
            return Err(ProblemLoaderError::NonPositive {
                what: what.to_owned(),
                value: value.to_string(),
            });
        }
        Ok(value)
    }
}

/// Reads one record per line, skipping `#` comments and blank lines.
struct RecordReader<R> {
    rdr: R,
    buf: String,
    line: usize,
}

impl<R: BufRead> RecordReader<R> {
    #[inline]
    fn new(rdr: R) -> Self {
        Self {
            rdr,
            buf: String::new(),
            line: 0,
        }
    }

    /// The tokens of the next non-blank line, or `None` at the end of input.
    fn next_tokens(&mut self) -> Result<Option<Vec<String>>, ProblemLoaderError> {
        loop {
            self.buf.clear();
            if self.rdr.read_line(&mut self.buf)? == 0 {
                return Ok(None);
            }
            self.line += 1;

            let code = match self.buf.find('#') {
                Some(cut) => &self.buf[..cut],
                None => &self.buf[..],
            };
            let tokens: Vec<String> = code.split_whitespace().map(str::to_owned).collect();
            if !tokens.is_empty() {
                return Ok(Some(tokens));
            }
        }
    }

    /// The next record, which must hold exactly `expected` values.
    fn next_record(
        &mut self,
        what: &str,
        expected: usize,
    ) -> Result<Vec<String>, ProblemLoaderError> {
        let tokens = self
            .next_tokens()?
            .ok_or_else(|| ProblemLoaderError::UnexpectedEof {
                expected: what.to_owned(),
            })?;

        if tokens.len() != expected {
            return Err(ProblemLoaderError::MalformedRecord {
                line: self.line,
                what: what.to_owned(),
                expected,
                found: tokens.len(),
            });
        }
        Ok(tokens)
    }
}
