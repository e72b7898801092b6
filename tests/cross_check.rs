use grid_astar::algorithms::a_star::{AStar, Relaxation};
use grid_astar::algorithms::common::PathfindingAlgorithm;
use grid_astar::algorithms::reference::ReferenceDijkstra;
use grid_astar::grid::{Coordinate, CostGrid, GridMap};
use rand::rngs::StdRng;
use rand::SeedableRng;

const ROWS: usize = 10;
const COLS: usize = 14;

fn random_map(seed: u64, start: Coordinate, goal: Coordinate) -> CostGrid {
    let mut rng = StdRng::seed_from_u64(seed);
    CostGrid::random(&mut rng, ROWS, COLS, 35, 9, &[start, goal])
}

#[test]
fn costs_match_dijkstra_on_random_maps() {
    let start = Coordinate::new(0, 0);
    let goal = Coordinate::new(ROWS as i32 - 1, COLS as i32 - 1);

    for seed in 0..60 {
        let map = random_map(seed, start, goal);
        let expected = ReferenceDijkstra::new().find_route(&mut map.clone(), start, goal);

        for relaxation in [Relaxation::Compatible, Relaxation::Standard] {
            let mut grid = map.clone();
            let found = AStar::new()
                .with_relaxation(relaxation)
                .find_path(start, goal, &mut grid);
            assert_eq!(
                found.as_ref().map(|r| r.cost()),
                expected.as_ref().map(|r| r.cost),
                "seed {seed}, {relaxation:?}\n{map}"
            );
        }
    }
}

#[test]
fn found_paths_are_walkable_and_priced_correctly() {
    let start = Coordinate::new(2, 1);
    let goal = Coordinate::new(7, 12);

    for seed in 100..140 {
        let mut map = random_map(seed, start, goal);
        let Some(result) = AStar::new().find_path(start, goal, &mut map) else {
            continue;
        };
        let path = result.path();
        assert_eq!(path.first(), Some(&start));
        assert_eq!(path.last(), Some(&goal));
        assert!(path.windows(2).all(|w| w[0].is_adjacent(w[1])));

        let priced: u32 = path[1..]
            .iter()
            .map(|&p| map.get_cell_value(p).expect("path crosses a wall"))
            .sum();
        assert_eq!(priced, result.cost(), "seed {seed}");

        let gs: Vec<u32> = result.ancestors().map(|n| n.g).collect();
        assert!(gs.windows(2).all(|w| w[0] >= w[1]), "seed {seed}");
    }
}

#[test]
fn trait_objects_share_the_route_contract() {
    let start = Coordinate::new(0, 0);
    let goal = Coordinate::new(9, 13);
    let map = random_map(7, start, goal);

    let mut algorithms: Vec<Box<dyn PathfindingAlgorithm>> =
        vec![Box::new(AStar::new()), Box::new(ReferenceDijkstra::new())];
    let costs: Vec<Option<u32>> = algorithms
        .iter_mut()
        .map(|alg| alg.find_route(&mut map.clone(), start, goal).map(|r| r.cost))
        .collect();
    assert_eq!(costs[0], costs[1]);
    assert!(algorithms[0].last_stats().is_some());
    assert!(algorithms[1].last_stats().is_none());
}
