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

use crate::{EPOCH, IntegerType};
use anyhow::{Context, Result};
use log::{LevelFilter, info};
use serde::Serialize;
use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::Path,
};
use stowage_model::{
    loading::ProblemLoader,
    model::Model,
    report::{Report, read_report, write_report},
    solution::Solution,
};
use svg::Document;

pub fn init_logger(level_filter: LevelFilter) -> Result<()> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            let handle = std::thread::current();
            let thread_name = handle.name().unwrap_or("-");

            let duration = EPOCH.elapsed();
            let millis = duration.subsec_millis();
            let sec = duration.as_secs() % 60;
            let min = duration.as_secs() / 60;

            let prefix = format!(
                "[{}] [{:0>2}:{:0>2}.{:0>3}] <{}>",
                record.level(),
                min,
                sec,
                millis,
                thread_name,
            );

            out.finish(format_args!("{:<32}{}", prefix, message))
        })
        .level(level_filter)
        .chain(std::io::stdout())
        .apply()
        .context("could not initialize logger")?;
    info!("log level: {}", level_filter);
    Ok(())
}

pub fn read_instance(path: &Path) -> Result<Model<IntegerType>> {
    ProblemLoader::<IntegerType>::new()
        .from_path(path)
        .with_context(|| format!("could not load instance file: {}", path.display()))
}

pub fn read_result(path: &Path) -> Result<Report<IntegerType>> {
    let file = File::open(path)
        .with_context(|| format!("could not open result file: {}", path.display()))?;
    read_report(BufReader::new(file))
        .with_context(|| format!("could not parse result file: {}", path.display()))
}

/// Writes the result file: the packing, or `UNSAT` when there is none.
pub fn write_result(path: &Path, solution: Option<&Solution<IntegerType>>) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("could not create result file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    write_report(&mut writer, solution)
        .and_then(|()| writer.flush())
        .with_context(|| format!("could not write result file: {}", path.display()))?;
    info!("result written to {}", path.display());
    Ok(())
}

pub fn write_json<S: Serialize>(value: &S, path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("could not create json file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)
        .with_context(|| format!("could not write json file: {}", path.display()))?;
    writer.flush()?;
    info!("summary written to {}", path.display());
    Ok(())
}

pub fn write_svg(document: &Document, path: &Path) -> Result<()> {
    svg::save(path, document)
        .with_context(|| format!("could not write svg file: {}", path.display()))?;
    info!("svg written to {}", path.display());
    Ok(())
}
