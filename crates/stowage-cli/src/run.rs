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

use crate::{IntegerType, cli::Cli, config::StowageConfig, io, render, summary::RunSummary};
use anyhow::{Context, Result};
use log::{info, warn};
use std::path::Path;
use stowage_bnb::{
    branching::input_order::InputOrderBuilder, constraints::PlacementConstraints,
    eval::lexicographic::LexicographicEvaluator, portfolio::BnbPortfolioSolver,
};
use stowage_model::{
    index::ContainerIndex, model::Model, objective::Objective, solution::Solution, validation,
};
use stowage_solver::solver::{Solver, SolverBuilder};

/// Solves the instance named in `args` and writes every requested output.
///
/// Malformed instance, configuration or seed files are errors. An object
/// that fits the container in no orientation is not: the result file then
/// reads `UNSAT` and the search is skipped.
pub fn run(args: &Cli, config: StowageConfig) -> Result<RunSummary> {
    let config = config.with_overrides(args);
    config.validate()?;

    let model = io::read_instance(&args.input_file)?;
    info!("loaded instance: {}", model);

    if let Err(e) = PlacementConstraints::build(&model) {
        warn!("instance cannot be packed: {}", e);
        io::write_result(&args.output_file, None)?;
        let summary = RunSummary::rejected(&args.input_file, &model, e.to_string());
        write_outputs(args, &model, None, &summary)?;
        return Ok(summary);
    }

    if !Objective::weight_preserves_order(&model, config.legacy_objective_weight) {
        warn!(
            "legacy objective weight {} does not exceed the largest coordinate sum; \
             the reported scalar objective may misorder packings",
            config.legacy_objective_weight
        );
    }

    let mut solver = build_solver(&model, &config);
    let seeded = match &args.seed {
        Some(path) => seed_solver(&solver, &model, path)?,
        None => false,
    };

    let outcome = solver.solve(&model);
    io::write_result(&args.output_file, outcome.solution())?;

    let summary = RunSummary::from_outcome(
        &args.input_file,
        &model,
        &outcome,
        config.legacy_objective_weight,
        seeded,
    );
    write_outputs(args, &model, outcome.solution(), &summary)?;
    info!("{}", summary);
    Ok(summary)
}

fn build_solver<'a>(model: &Model<IntegerType>, config: &StowageConfig) -> Solver<'a, IntegerType> {
    let mut builder = SolverBuilder::<IntegerType>::new();
    for _ in 0..config.workers() {
        builder = builder.add_solver(
            BnbPortfolioSolver::preallocated(
                model.num_objects(),
                InputOrderBuilder::<IntegerType>::new(),
                LexicographicEvaluator::<IntegerType>::new(),
            )
            .with_log_interval(config.log_interval_nodes),
        );
    }
    if let Some(limit) = config.time_limit() {
        builder = builder.with_time_limit(limit);
    }
    if let Some(limit) = config.solution_limit {
        builder = builder.with_solution_limit(limit);
    }
    builder.build()
}

/// Installs the packing of an earlier result file as the initial incumbent.
///
/// Returns `false` when the file reports `UNSAT` or its packing violates a
/// constraint; both only produce a warning.
fn seed_solver(
    solver: &Solver<'_, IntegerType>,
    model: &Model<IntegerType>,
    path: &Path,
) -> Result<bool> {
    let report = io::read_result(path)?;
    if !report.is_sat() {
        warn!("seed file {} reports UNSAT, ignoring it", path.display());
        return Ok(false);
    }

    let solution = report
        .to_solution(model)
        .with_context(|| format!("seed file {} does not match the instance", path.display()))?;
    if let Err(e) = validation::validate(model, &solution) {
        warn!("seed packing is invalid ({}), ignoring it", e);
        return Ok(false);
    }
    Ok(solver.seed(&solution))
}

fn write_outputs(
    args: &Cli,
    model: &Model<IntegerType>,
    solution: Option<&Solution<IntegerType>>,
    summary: &RunSummary,
) -> Result<()> {
    if let Some(path) = &args.summary {
        io::write_json(summary, path)?;
    }

    let Some(path) = &args.svg else {
        return Ok(());
    };
    match solution {
        None => warn!("no packing to render, skipping {}", path.display()),
        Some(solution) if args.svg_container >= solution.num_containers() => warn!(
            "container {} is not used by the packing ({} container(s)), skipping {}",
            args.svg_container,
            solution.num_containers(),
            path.display()
        ),
        Some(solution) => {
            let document =
                render::container_to_svg(model, solution, ContainerIndex::new(args.svg_container));
            io::write_svg(&document, path)?;
        }
    }
    Ok(())
}
