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

use clap::Parser;
use log::LevelFilter;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about)]
pub struct Cli {
    /// Instance file to solve.
    #[arg(value_name = "INPUT")]
    pub input_file: PathBuf,
    /// Result file to write (`SAT` with placements, or `UNSAT`).
    #[arg(value_name = "OUTPUT")]
    pub output_file: PathBuf,
    #[arg(short, long = "config", value_name = "FILE")]
    pub config_file: Option<PathBuf>,
    #[arg(
        short,
        long,
        value_name = "[off, error, warn, info, debug, trace]",
        default_value = "info"
    )]
    pub log_level: LevelFilter,
    /// Overrides `time_limit_secs` from the configuration.
    #[arg(short, long, value_name = "SECONDS")]
    pub time_limit: Option<u64>,
    /// Overrides `num_workers` from the configuration.
    #[arg(short, long, value_name = "N")]
    pub workers: Option<usize>,
    /// Earlier result file whose packing becomes the initial incumbent.
    #[arg(long, value_name = "RESULT FILE")]
    pub seed: Option<PathBuf>,
    /// Writes a JSON summary of the run.
    #[arg(long, value_name = "FILE")]
    pub summary: Option<PathBuf>,
    /// Writes an isometric SVG of one container of the packing.
    #[arg(long, value_name = "FILE")]
    pub svg: Option<PathBuf>,
    #[arg(long, value_name = "ID", default_value_t = 0)]
    pub svg_container: usize,
}
