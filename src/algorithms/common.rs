use crate::grid::{Coordinate, GridMap};
use crate::statistics::SearchStats;

/// A finished route: every visited coordinate from start to goal and the
/// summed cost of the cells entered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub positions: Vec<Coordinate>,
    pub cost: u32,
}

impl Route {
    pub fn steps(&self) -> usize {
        self.positions.len().saturating_sub(1)
    }
}

pub trait PathfindingAlgorithm {
    fn name(&self) -> &'static str;

    fn find_route(
        &mut self,
        map: &mut dyn GridMap,
        start: Coordinate,
        goal: Coordinate,
    ) -> Option<Route>;

    /// Search counters from the last call, when the algorithm keeps them.
    fn last_stats(&self) -> Option<SearchStats> {
        None
    }
}
