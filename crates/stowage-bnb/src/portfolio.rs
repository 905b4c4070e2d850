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

use crate::{
    bnb::BnbSolver,
    branching::decision::DecisionBuilder,
    eval::evaluator::ObjectiveEvaluator,
    monitor::{
        composite::CompositeTreeSearchMonitor, log::LogTreeSearchMonitor, wrapper::WrapperMonitor,
    },
};
use stowage_search::{
    monitor::interrupt::InterruptMonitor,
    num::SolverNumeric,
    portfolio::{PortfolioSolver, PortfolioSolverContext, PortfolioSolverResult},
};

#[derive(Clone)]
pub struct BnbPortfolioSolver<T, B, E>
where
    T: SolverNumeric,
    B: DecisionBuilder<T, E>,
    E: ObjectiveEvaluator<T>,
{
    inner: BnbSolver<T>,
    decision_builder: B,
    evaluator: E,
    log_interval_nodes: Option<u64>,
}

impl<T, B, E> BnbPortfolioSolver<T, B, E>
where
    T: SolverNumeric,
    B: DecisionBuilder<T, E>,
    E: ObjectiveEvaluator<T>,
{
    #[inline]
    pub fn new(decision_builder: B, evaluator: E) -> Self {
        Self {
            inner: BnbSolver::<T>::new(),
            decision_builder,
            evaluator,
            log_interval_nodes: None,
        }
    }

    #[inline]
    pub fn preallocated(num_objects: usize, decision_builder: B, evaluator: E) -> Self {
        Self {
            inner: BnbSolver::<T>::preallocated(num_objects),
            decision_builder,
            evaluator,
            log_interval_nodes: None,
        }
    }

    /// Logs progress every `nodes` explored nodes. Zero disables it.
    #[inline]
    pub fn with_log_interval(mut self, nodes: u64) -> Self {
        self.log_interval_nodes = (nodes > 0).then_some(nodes);
        self
    }

    #[inline]
    pub fn log_interval_nodes(&self) -> Option<u64> {
        self.log_interval_nodes
    }

    #[inline]
    pub fn inner(&self) -> &BnbSolver<T> {
        &self.inner
    }

    #[inline]
    pub fn decision_builder(&self) -> &B {
        &self.decision_builder
    }

    #[inline]
    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }
}

impl<T, B, E> PortfolioSolver<T> for BnbPortfolioSolver<T, B, E>
where
    T: SolverNumeric,
    B: DecisionBuilder<T, E>,
    E: ObjectiveEvaluator<T>,
{
    fn solve<'a>(&mut self, context: PortfolioSolverContext<'a, T>) -> PortfolioSolverResult<T> {
        // The stop flag is raised by whichever worker finishes a proof of the
        // whole tree first.
        let mut interrupt = InterruptMonitor::new(context.stop);

        let mut monitor = CompositeTreeSearchMonitor::with_capacity(3);
        monitor.add_monitor(WrapperMonitor::new(&mut interrupt));
        monitor.add_monitor(WrapperMonitor::new(context.monitor));
        if let Some(interval) = self.log_interval_nodes {
            monitor.add_monitor(LogTreeSearchMonitor::new(interval));
        }

        let outcome = self.inner.solve_partition_with_incumbent(
            context.model,
            &mut self.decision_builder,
            &mut self.evaluator,
            monitor,
            context.incumbent,
            context.partition,
        );

        outcome.into()
    }

    fn name(&self) -> &str {
        "BnbPortfolioSolver"
    }
}
