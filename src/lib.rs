//! A* search over weighted grid maps.
//!
//! The search lives in [`algorithms::a_star`] and only talks to a map through
//! the [`grid::GridMap`] trait. [`grid::CostGrid`] is the in-memory map used by
//! the batch runner and the tests.
//!
//! ```
//! use grid_astar::algorithms::a_star::AStar;
//! use grid_astar::grid::{Coordinate, CostGrid};
//!
//! let mut map: CostGrid = "1 1 1\n1 # 1\n1 1 1".parse().unwrap();
//! let result = AStar::new()
//!     .find_path(Coordinate::new(0, 0), Coordinate::new(2, 2), &mut map)
//!     .expect("goal is reachable");
//! assert_eq!(result.steps(), 4);
//! assert_eq!(result.cost(), 4);
//! ```

pub mod algorithms;
pub mod batch;
pub mod config;
pub mod grid;
pub mod statistics;
