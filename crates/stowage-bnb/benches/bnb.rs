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

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use rand::{Rng, SeedableRng, rngs::SmallRng};
use std::hint::black_box;
use std::time::Duration;
use stowage_bnb::{
    bnb::BnbSolver, branching::input_order::InputOrderBuilder,
    eval::lexicographic::LexicographicEvaluator, monitor::wrapper::WrapperMonitor,
};
use stowage_model::{
    model::{Model, ModelBuilder},
    orientation::Extents,
};
use stowage_search::monitor::time_limit::TimeLimitMonitor;

criterion_main!(benches);
criterion_group!(benches, solve_bench);

fn random_model(num_objects: usize, seed: u64) -> Model<i64> {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut builder = ModelBuilder::new(Extents::new(6, 6, 4));
    for _ in 0..num_objects {
        builder.add_object(Extents::new(
            rng.random_range(1..=3),
            rng.random_range(1..=3),
            rng.random_range(1..=2),
        ));
    }
    builder.build()
}

fn solve_bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("bnb_solve");
    group.sample_size(10);

    for num_objects in [4, 6, 8] {
        let model = random_model(num_objects, 0);
        group.bench_with_input(
            BenchmarkId::from_parameter(num_objects),
            &model,
            |b, model| {
                let mut solver = BnbSolver::preallocated(model.num_objects());
                let mut builder = InputOrderBuilder::new();
                let mut evaluator = LexicographicEvaluator::new();
                b.iter(|| {
                    let mut limit = TimeLimitMonitor::new(Duration::from_secs(2));
                    let outcome = solver.solve(
                        black_box(model),
                        &mut builder,
                        &mut evaluator,
                        WrapperMonitor::new(&mut limit),
                    );
                    black_box(outcome.statistics().nodes_explored)
                })
            },
        );
    }

    group.finish();
}
