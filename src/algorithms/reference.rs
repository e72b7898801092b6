use crate::algorithms::common::{PathfindingAlgorithm, Route};
use crate::grid::{Coordinate, GridMap, ORTHOGONAL_OFFSETS};
use pathfinding::prelude::dijkstra;

/// Uniform-cost search from the `pathfinding` crate. Always returns a
/// cheapest route, so it serves as the yardstick for [`AStar`].
///
/// [`AStar`]: crate::algorithms::a_star::AStar
#[derive(Debug, Default)]
pub struct ReferenceDijkstra;

impl ReferenceDijkstra {
    pub const NAME: &'static str = "dijkstra";

    pub fn new() -> Self {
        ReferenceDijkstra
    }
}

impl PathfindingAlgorithm for ReferenceDijkstra {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn find_route(
        &mut self,
        map: &mut dyn GridMap,
        start: Coordinate,
        goal: Coordinate,
    ) -> Option<Route> {
        let map: &dyn GridMap = map;
        let (positions, cost) = dijkstra(
            &start,
            |p| {
                // Entering a cell costs that cell's value; blocked cells have no edge.
                ORTHOGONAL_OFFSETS
                    .iter()
                    .filter_map(|&(dr, dc)| p.offset(dr, dc))
                    .filter_map(|next| map.get_cell_value(next).map(|cost| (next, cost)))
                    .collect::<Vec<_>>()
            },
            |p| *p == goal,
        )?;
        Some(Route { positions, cost })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::CostGrid;

    #[test]
    fn finds_cheapest_route() {
        let mut grid: CostGrid = "1 9 1\n1 1 1".parse().unwrap();
        let route = ReferenceDijkstra::new()
            .find_route(&mut grid, Coordinate::new(0, 0), Coordinate::new(0, 2))
            .unwrap();
        assert_eq!(route.cost, 4);
        assert_eq!(route.steps(), 4);
    }

    #[test]
    fn reports_unreachable_goal() {
        let mut grid: CostGrid = "1 # 1".parse().unwrap();
        let route = ReferenceDijkstra::new().find_route(
            &mut grid,
            Coordinate::new(0, 0),
            Coordinate::new(0, 2),
        );
        assert!(route.is_none());
    }
}
