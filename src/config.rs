use crate::algorithms::a_star::Relaxation;
use crate::grid::Coordinate;
use clap::Parser;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("grid must have at least one row and one column, got {rows}x{cols}")]
    EmptyGrid { rows: usize, cols: usize },

    #[error("max cost must be at least 1")]
    ZeroCost,

    #[error("{which} position {pos} is outside a {rows}x{cols} grid")]
    OutsideGrid {
        which: &'static str,
        pos: Coordinate,
        rows: usize,
        cols: usize,
    },

    #[error("at least one level is required")]
    NoLevels,
}

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    #[arg(long, default_value_t = 12)]
    pub rows: usize,

    #[arg(long, default_value_t = 24)]
    pub cols: usize,

    #[arg(long, default_value_t = 60)]
    pub num_walls: usize,

    /// Cell costs are drawn from 1..=max-cost.
    #[arg(long, default_value_t = 4)]
    pub max_cost: u32,

    /// Number of maps to generate and solve.
    #[arg(long, default_value_t = 5)]
    pub levels: usize,

    /// Base seed; level `n` uses `seed + n`.
    #[arg(long, default_value_t = 1)]
    pub seed: u64,

    /// Start cell as "row,col". Defaults to the top-left corner.
    #[arg(long)]
    pub start: Option<Coordinate>,

    /// Goal cell as "row,col". Defaults to the bottom-right corner.
    #[arg(long)]
    pub goal: Option<Coordinate>,

    #[arg(long, value_enum, default_value_t = Relaxation::Compatible)]
    pub relaxation: Relaxation,

    #[arg(long)]
    pub max_expansions: Option<usize>,

    /// Skip the Dijkstra baseline.
    #[arg(long, default_value_t = false)]
    pub no_reference: bool,

    #[arg(long, default_value_t = false)]
    pub no_visualization: bool,

    #[arg(long, default_value_t = false)]
    pub quiet: bool,

    /// Write per-level results as CSV.
    #[arg(long)]
    pub output_file: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            rows: 12,
            cols: 24,
            num_walls: 60,
            max_cost: 4,
            levels: 5,
            seed: 1,
            start: None,
            goal: None,
            relaxation: Relaxation::Compatible,
            max_expansions: None,
            no_reference: false,
            no_visualization: false,
            quiet: false,
            output_file: None,
        }
    }
}

impl Config {
    pub fn start(&self) -> Coordinate {
        self.start.unwrap_or(Coordinate::new(0, 0))
    }

    pub fn goal(&self) -> Coordinate {
        self.goal.unwrap_or(Coordinate::new(
            self.rows as i32 - 1,
            self.cols as i32 - 1,
        ))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rows == 0 || self.cols == 0 {
            return Err(ConfigError::EmptyGrid {
                rows: self.rows,
                cols: self.cols,
            });
        }
        if self.max_cost == 0 {
            return Err(ConfigError::ZeroCost);
        }
        if self.levels == 0 {
            return Err(ConfigError::NoLevels);
        }
        for (which, pos) in [("start", self.start()), ("goal", self.goal())] {
            let inside = (0..self.rows as i32).contains(&pos.row)
                && (0..self.cols as i32).contains(&pos.col);
            if !inside {
                return Err(ConfigError::OutsideGrid {
                    which,
                    pos,
                    rows: self.rows,
                    cols: self.cols,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_cli_defaults() {
        let parsed = Config::parse_from(["grid_astar"]);
        let defaults = Config::default();
        assert_eq!(parsed.rows, defaults.rows);
        assert_eq!(parsed.cols, defaults.cols);
        assert_eq!(parsed.num_walls, defaults.num_walls);
        assert_eq!(parsed.max_cost, defaults.max_cost);
        assert_eq!(parsed.levels, defaults.levels);
        assert_eq!(parsed.relaxation, Relaxation::Compatible);
        assert!(parsed.validate().is_ok());
    }

    #[test]
    fn parses_coordinates_and_relaxation() {
        let config = Config::parse_from([
            "grid_astar",
            "--start",
            "2,3",
            "--goal",
            "5,1",
            "--relaxation",
            "standard",
        ]);
        assert_eq!(config.start(), Coordinate::new(2, 3));
        assert_eq!(config.goal(), Coordinate::new(5, 1));
        assert_eq!(config.relaxation, Relaxation::Standard);
    }

    #[test]
    fn goal_defaults_to_far_corner() {
        let config = Config {
            rows: 3,
            cols: 7,
            ..Config::default()
        };
        assert_eq!(config.goal(), Coordinate::new(2, 6));
    }

    #[test]
    fn rejects_bad_settings() {
        let config = Config {
            rows: 0,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::EmptyGrid { .. })));

        let config = Config {
            max_cost: 0,
            ..Config::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroCost));

        let config = Config {
            goal: Some(Coordinate::new(99, 0)),
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OutsideGrid { which: "goal", .. })
        ));
    }
}
