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
use rand::{Rng, SeedableRng, rngs::SmallRng};
use std::{
    fmt::Write,
    fs,
    path::{Path, PathBuf},
    time::{Duration, Instant},
};
use stowage_cli::{cli::Cli, config::StowageConfig, run::run};

/// A scratch directory that is removed again when dropped.
struct Scratch {
    dir: PathBuf,
}

impl Scratch {
    fn new(name: &str) -> Self {
        let dir = std::env::temp_dir().join(format!("stowage-cli-{}-{}", name, std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        Self { dir }
    }

    fn path(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }

    fn write(&self, file: &str, content: &str) -> PathBuf {
        let path = self.path(file);
        fs::write(&path, content).unwrap();
        path
    }
}

impl Drop for Scratch {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.dir);
    }
}

fn args(input: &Path, output: &Path, extra: &[&str]) -> Cli {
    let mut argv = vec![
        "stowage".to_string(),
        input.display().to_string(),
        output.display().to_string(),
    ];
    argv.extend(extra.iter().map(|s| s.to_string()));
    Cli::try_parse_from(argv).unwrap()
}

fn config(workers: usize) -> StowageConfig {
    StowageConfig {
        time_limit_secs: Some(60),
        num_workers: Some(workers),
        ..StowageConfig::default()
    }
}

/// Parses a `SAT` result file into `[container, x0, y0, z0, x1, y1, z1]` rows.
fn records(path: &Path) -> Option<Vec<[i64; 7]>> {
    let text = fs::read_to_string(path).unwrap();
    let mut lines = text.lines();
    match lines.next() {
        Some("UNSAT") => None,
        Some("SAT") => Some(
            lines
                .map(|line| {
                    let fields: Vec<i64> = line
                        .split_whitespace()
                        .map(|t| t.parse().unwrap())
                        .collect();
                    fields.try_into().unwrap()
                })
                .collect(),
        ),
        other => panic!("unexpected header {:?}", other),
    }
}

#[test]
fn test_single_object_at_origin() {
    let scratch = Scratch::new("single");
    let input = scratch.write("in.txt", "10 10 10\n1\n5 5 5\n");
    let output = scratch.path("out.txt");

    let summary = run(&args(&input, &output, &[]), config(2)).unwrap();

    assert_eq!(records(&output), Some(vec![[0, 0, 0, 0, 5, 5, 5]]));
    assert_eq!(summary.status, "optimal");
    assert_eq!(summary.containers, Some(1));
}

#[test]
fn test_oversized_object_is_unsat_without_search() {
    let scratch = Scratch::new("oversized");
    let input = scratch.write("in.txt", "10 10 10\n1\n11 1 1\n");
    let output = scratch.path("out.txt");

    let summary = run(&args(&input, &output, &[]), config(2)).unwrap();

    assert_eq!(fs::read_to_string(&output).unwrap().trim(), "UNSAT");
    assert_eq!(summary.status, "infeasible");
    assert!(summary.termination.contains("does not fit"));
    assert_eq!(summary.nodes_explored, 0);
}

#[test]
fn test_full_cubes_use_one_container_each() {
    let scratch = Scratch::new("cubes");
    let input = scratch.write("in.txt", "4 4 4\n2\n4 4 4\n4 4 4\n");
    let output = scratch.path("out.txt");

    let summary = run(&args(&input, &output, &[]), config(2)).unwrap();

    assert_eq!(
        records(&output),
        Some(vec![[0, 0, 0, 0, 4, 4, 4], [1, 0, 0, 0, 4, 4, 4]])
    );
    assert_eq!(summary.containers, Some(2));
}

#[test]
fn test_slabs_are_stacked() {
    let scratch = Scratch::new("slabs");
    let input = scratch.write("in.txt", "4 4 2\n2\n4 4 1\n4 4 1\n");
    let output = scratch.path("out.txt");

    let summary = run(&args(&input, &output, &[]), config(2)).unwrap();

    let rows = records(&output).unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| r[0] == 0));
    assert_eq!(rows[0][1..3], rows[1][1..3]);
    assert_eq!(rows[0][4..6], rows[1][4..6]);
    let mut heights: Vec<_> = rows.iter().map(|r| (r[3], r[6])).collect();
    heights.sort();
    assert_eq!(heights, vec![(0, 1), (1, 2)]);
    assert_eq!(summary.coordinate_sum, Some(1));
}

#[test]
fn test_cube_waits_on_top_of_both_slabs() {
    let scratch = Scratch::new("chain");
    let input = scratch.write("in.txt", "4 4 3\n3\n1 1 1\n4 4 1\n4 4 1\n");
    let output = scratch.path("out.txt");

    let summary = run(&args(&input, &output, &[]), config(2)).unwrap();

    assert_eq!(summary.status, "optimal");
    assert_eq!(summary.containers, Some(1));
    let rows = records(&output).unwrap();
    assert_eq!(rows[0], [0, 0, 0, 2, 1, 1, 3]);
    assert!(rows.iter().all(|r| r[0] == 0));
}

#[test]
fn test_time_limit_is_honoured_on_a_large_instance() {
    let mut rng = SmallRng::seed_from_u64(40);
    let mut text = String::from("100 100 100\n40\n");
    for _ in 0..40 {
        let (l, w, h): (i64, i64, i64) = (
            rng.random_range(5..45),
            rng.random_range(5..45),
            rng.random_range(5..45),
        );
        writeln!(text, "{} {} {}", l, w, h).unwrap();
    }

    let scratch = Scratch::new("large");
    let input = scratch.write("in.txt", &text);
    let output = scratch.path("out.txt");
    let config = StowageConfig {
        time_limit_secs: Some(2),
        num_workers: Some(2),
        ..StowageConfig::default()
    };

    let started = Instant::now();
    let summary = run(&args(&input, &output, &[]), config).unwrap();
    let elapsed = started.elapsed();

    assert!(elapsed < Duration::from_secs(8), "took {:?}", elapsed);
    assert!(summary.is_sat());
    assert!(summary.status == "feasible" || summary.status == "optimal");
    assert_eq!(records(&output).map(|rows| rows.len()), Some(40));
}

#[test]
fn test_malformed_instance_is_an_error() {
    let scratch = Scratch::new("malformed");
    let output = scratch.path("out.txt");

    let missing_record = scratch.write("short.txt", "4 4 4\n2\n1 1 1\n");
    assert!(run(&args(&missing_record, &output, &[]), config(1)).is_err());

    let non_positive = scratch.write("zero.txt", "4 4 4\n1\n0 1 1\n");
    assert!(run(&args(&non_positive, &output, &[]), config(1)).is_err());

    let one_line = scratch.write("oneline.txt", "4 4 4 1 1 1 1\n");
    let err = run(&args(&one_line, &output, &[]), config(1)).unwrap_err();
    assert!(format!("{:#}", err).contains("line 1: container needs 3 value(s), found 7"));

    let missing_file = scratch.path("nope.txt");
    assert!(run(&args(&missing_file, &output, &[]), config(1)).is_err());
}

#[test]
fn test_invalid_configuration_is_an_error() {
    let scratch = Scratch::new("badconfig");
    let input = scratch.write("in.txt", "10 10 10\n1\n5 5 5\n");
    let output = scratch.path("out.txt");

    assert!(run(&args(&input, &output, &["--workers", "0"]), config(1)).is_err());
    assert!(!output.exists());
}

#[test]
fn test_seeding_with_own_result_does_not_improve() {
    let scratch = Scratch::new("seed");
    let input = scratch.write("in.txt", "4 4 2\n3\n2 2 2\n4 2 1\n2 2 1\n");
    let first = scratch.path("first.txt");
    let second = scratch.path("second.txt");

    let initial = run(&args(&input, &first, &[]), config(2)).unwrap();
    assert_eq!(initial.status, "optimal");

    let seed = first.display().to_string();
    let reseeded = run(&args(&input, &second, &["--seed", &seed]), config(2)).unwrap();

    assert!(reseeded.seeded);
    assert_eq!(reseeded.status, "optimal");
    assert_eq!(reseeded.containers, initial.containers);
    assert_eq!(reseeded.coordinate_sum, initial.coordinate_sum);
}

#[test]
fn test_unsat_seed_is_ignored() {
    let scratch = Scratch::new("unsatseed");
    let input = scratch.write("in.txt", "10 10 10\n1\n5 5 5\n");
    let seed = scratch.write("seed.txt", "UNSAT\n");
    let output = scratch.path("out.txt");

    let seed = seed.display().to_string();
    let summary = run(&args(&input, &output, &["--seed", &seed]), config(1)).unwrap();
    assert!(!summary.seeded);
    assert_eq!(summary.containers, Some(1));
}

#[test]
fn test_mismatched_seed_is_an_error() {
    let scratch = Scratch::new("badseed");
    let input = scratch.write("in.txt", "10 10 10\n1\n5 5 5\n");
    let seed = scratch.write("seed.txt", "SAT\n0 0 0 0 5 5 4\n");
    let output = scratch.path("out.txt");

    let seed = seed.display().to_string();
    assert!(run(&args(&input, &output, &["--seed", &seed]), config(1)).is_err());
}

#[test]
fn test_summary_json_is_written() {
    let scratch = Scratch::new("summary");
    let input = scratch.write("in.txt", "4 4 4\n2\n4 4 4\n4 4 4\n");
    let output = scratch.path("out.txt");
    let summary_path = scratch.path("run.json");

    let summary_arg = summary_path.display().to_string();
    run(&args(&input, &output, &["--summary", &summary_arg]), config(1)).unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&summary_path).unwrap()).unwrap();
    assert_eq!(json["status"], "optimal");
    assert_eq!(json["termination"], "Optimality Proven");
    assert_eq!(json["containers"], 2);
    assert_eq!(json["num_objects"], 2);
}

#[test]
fn test_svg_of_used_container() {
    let scratch = Scratch::new("svg");
    let input = scratch.write("in.txt", "4 4 2\n2\n4 4 1\n4 4 1\n");
    let output = scratch.path("out.txt");
    let svg_path = scratch.path("c0.svg");

    let svg_arg = svg_path.display().to_string();
    run(&args(&input, &output, &["--svg", &svg_arg]), config(1)).unwrap();

    let svg = fs::read_to_string(&svg_path).unwrap();
    assert!(svg.contains("<svg"));
    assert!(svg.contains("id=\"object_0\""));
    assert!(svg.contains("id=\"object_1\""));
}

#[test]
fn test_svg_of_unused_container_is_skipped() {
    let scratch = Scratch::new("svgskip");
    let input = scratch.write("in.txt", "10 10 10\n1\n5 5 5\n");
    let output = scratch.path("out.txt");
    let svg_path = scratch.path("c3.svg");

    let svg_arg = svg_path.display().to_string();
    run(
        &args(&input, &output, &["--svg", &svg_arg, "--svg-container", "3"]),
        config(1),
    )
    .unwrap();

    assert!(output.exists());
    assert!(!svg_path.exists());
}
