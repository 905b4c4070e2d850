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

use crate::monitor::search_monitor::{SearchCommand, SearchMonitor};
use num_traits::{PrimInt, Signed};
use stowage_model::{model::Model, solution::Solution};

/// Forwards every event to a list of monitors.
///
/// `search_command` returns the first `Terminate` in insertion order.
pub struct CompositeMonitor<'a, T> {
    monitors: Vec<Box<dyn SearchMonitor<T> + Send + 'a>>,
}

impl<'a, T> std::fmt::Debug for CompositeMonitor<'a, T>
where
    T: PrimInt + Signed,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeMonitor")
            .field("monitors", &self.names())
            .finish()
    }
}

impl<'a, T> Default for CompositeMonitor<'a, T>
where
    T: PrimInt + Signed,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, T> CompositeMonitor<'a, T>
where
    T: PrimInt + Signed,
{
    #[inline]
    pub fn new() -> Self {
        Self {
            monitors: Vec::new(),
        }
    }

    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            monitors: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn add_monitor<M>(&mut self, monitor: M)
    where
        M: SearchMonitor<T> + Send + 'a,
    {
        self.monitors.push(Box::new(monitor));
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.monitors.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.monitors.is_empty()
    }

    /// Names of the contained monitors, in insertion order.
    pub fn names(&self) -> Vec<&str> {
        self.monitors.iter().map(|m| m.name()).collect()
    }
}

impl<'a, T> SearchMonitor<T> for CompositeMonitor<'a, T>
where
    T: PrimInt + Signed,
{
    fn name(&self) -> &str {
        "CompositeMonitor"
    }

    fn on_enter_search(&mut self, model: &Model<T>) {
        for m in &mut self.monitors {
            m.on_enter_search(model);
        }
    }

    fn on_exit_search(&mut self) {
        for m in &mut self.monitors {
            m.on_exit_search();
        }
    }

    fn on_solution_found(&mut self, solution: &Solution<T>) {
        for m in &mut self.monitors {
            m.on_solution_found(solution);
        }
    }

    #[inline]
    fn on_step(&mut self) {
        for m in &mut self.monitors {
            m.on_step();
        }
    }

    fn search_command(&self) -> SearchCommand {
        self.monitors
            .iter()
            .map(|m| m.search_command())
            .find(|c| matches!(c, SearchCommand::Terminate(_)))
            .unwrap_or(SearchCommand::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stowage_model::{model::ModelBuilder, orientation::Extents};

    type IntegerType = i64;

    #[derive(Default)]
    struct Recorder {
        name: &'static str,
        events: Vec<&'static str>,
        stop: Option<&'static str>,
    }

    impl SearchMonitor<IntegerType> for Recorder {
        fn name(&self) -> &str {
            self.name
        }
        fn on_enter_search(&mut self, _model: &Model<IntegerType>) {
            self.events.push("enter");
        }
        fn on_exit_search(&mut self) {
            self.events.push("exit");
        }
        fn on_solution_found(&mut self, _solution: &Solution<IntegerType>) {
            self.events.push("solution");
        }
        fn on_step(&mut self) {
            self.events.push("step");
        }
        fn search_command(&self) -> SearchCommand {
            match self.stop {
                Some(r) => SearchCommand::Terminate(r.to_string()),
                None => SearchCommand::Continue,
            }
        }
    }

    #[test]
    fn test_empty_composite_continues() {
        let c = CompositeMonitor::<IntegerType>::new();
        assert!(c.is_empty());
        assert_eq!(c.search_command(), SearchCommand::Continue);
    }

    #[test]
    fn test_first_terminate_wins() {
        let mut c = CompositeMonitor::<IntegerType>::with_capacity(3);
        c.add_monitor(Recorder { name: "a", ..Default::default() });
        c.add_monitor(Recorder { name: "b", stop: Some("first"), ..Default::default() });
        c.add_monitor(Recorder { name: "c", stop: Some("second"), ..Default::default() });
        assert_eq!(c.len(), 3);
        assert_eq!(c.names(), vec!["a", "b", "c"]);
        assert_eq!(c.search_command(), SearchCommand::Terminate("first".into()));
    }

    #[test]
    fn test_events_reach_every_monitor() {
        let mut c = CompositeMonitor::<IntegerType>::new();
        c.add_monitor(Recorder { name: "a", ..Default::default() });
        let model = ModelBuilder::new(Extents::new(1, 1, 1)).build();
        c.on_enter_search(&model);
        c.on_step();
        c.on_solution_found(&Solution::new(Vec::new()));
        c.on_exit_search();
        assert_eq!(format!("{:?}", c), "CompositeMonitor { monitors: [\"a\"] }");
    }
}
