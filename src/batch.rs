use crate::algorithms::a_star::AStar;
use crate::algorithms::common::PathfindingAlgorithm;
use crate::algorithms::reference::ReferenceDijkstra;
use crate::config::{Config, ConfigError};
use crate::grid::CostGrid;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum BatchError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to write results to {path}: {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct BatchResult {
    pub level: usize,
    pub algorithm: &'static str,
    pub found: bool,
    pub steps: usize,
    pub cost: u32,
    /// Only known for algorithms that report search counters.
    pub expanded: Option<usize>,
    pub elapsed_us: u128,
}

/// Generates one seeded map per level and solves each of them.
pub struct BatchRunner {
    config: Config,
    results: Vec<BatchResult>,
    start_time: Instant,
}

impl BatchRunner {
    pub fn new(config: Config) -> Self {
        BatchRunner {
            config,
            results: Vec::new(),
            start_time: Instant::now(),
        }
    }

    pub fn results(&self) -> &[BatchResult] {
        &self.results
    }

    pub fn run(&mut self) -> Result<(), BatchError> {
        self.config.validate()?;
        self.start_time = Instant::now();
        info!(
            levels = self.config.levels,
            rows = self.config.rows,
            cols = self.config.cols,
            relaxation = ?self.config.relaxation,
            "starting batch"
        );

        for level in 0..self.config.levels {
            self.run_level(level);
        }

        if let Some(path) = self.config.output_file.clone() {
            self.write_csv(&path)?;
            if !self.config.quiet {
                println!("Results written to {}", path);
            }
        }
        info!(elapsed = ?self.start_time.elapsed(), "batch finished");
        Ok(())
    }

    /// Map for `level`; identical for identical config and level.
    pub fn generate_map(&self, level: usize) -> CostGrid {
        let mut rng = StdRng::seed_from_u64(self.config.seed.wrapping_add(level as u64));
        CostGrid::random(
            &mut rng,
            self.config.rows,
            self.config.cols,
            self.config.num_walls,
            self.config.max_cost,
            &[self.config.start(), self.config.goal()],
        )
    }

    fn run_level(&mut self, level: usize) {
        let start = self.config.start();
        let goal = self.config.goal();
        let mut map = self.generate_map(level);
        debug!(level, walls = map.wall_count(), "generated map");

        let mut astar = AStar::new().with_relaxation(self.config.relaxation);
        if let Some(limit) = self.config.max_expansions {
            astar = astar.with_max_expansions(limit);
        }

        let timer = Instant::now();
        let found = astar.find_path(start, goal, &mut map);
        let elapsed_us = timer.elapsed().as_micros();

        if let Some(result) = &found {
            result.mark_path(&mut map);
        }
        self.results.push(BatchResult {
            level,
            algorithm: astar.name(),
            found: found.is_some(),
            steps: found.as_ref().map_or(0, |r| r.steps()),
            cost: found.as_ref().map_or(0, |r| r.cost()),
            expanded: Some(astar.last_stats().expanded),
            elapsed_us,
        });

        if !self.config.quiet {
            println!("Level {}", level + 1);
            match &found {
                Some(result) => println!(
                    "  {}: {} steps, cost {}",
                    astar.name(),
                    result.steps(),
                    result.cost()
                ),
                None => println!("  {}: no path from {} to {}", astar.name(), start, goal),
            }
            if !self.config.no_visualization {
                print!("{}", astar.last_stats());
                println!("{}", map.render(start, goal));
            }
        }

        if !self.config.no_reference {
            self.run_reference(level, &mut map);
        }
    }

    fn run_reference(&mut self, level: usize, map: &mut CostGrid) {
        let mut reference = ReferenceDijkstra::new();
        let timer = Instant::now();
        let route = reference.find_route(map, self.config.start(), self.config.goal());
        let elapsed_us = timer.elapsed().as_micros();

        if !self.config.quiet {
            match &route {
                Some(route) => println!(
                    "  {}: {} steps, cost {}",
                    reference.name(),
                    route.steps(),
                    route.cost
                ),
                None => println!("  {}: no path", reference.name()),
            }
        }
        self.results.push(BatchResult {
            level,
            algorithm: reference.name(),
            found: route.is_some(),
            steps: route.as_ref().map_or(0, |r| r.steps()),
            cost: route.as_ref().map_or(0, |r| r.cost),
            expanded: reference.last_stats().map(|s| s.expanded),
            elapsed_us,
        });
    }

    /// Levels where A* found a route costlier than the baseline, or none at all
    /// while the baseline did.
    pub fn suboptimal_levels(&self) -> usize {
        let mut by_level: BTreeMap<usize, (Option<&BatchResult>, Option<&BatchResult>)> =
            BTreeMap::new();
        for result in &self.results {
            let entry = by_level.entry(result.level).or_default();
            if result.algorithm == ReferenceDijkstra::NAME {
                entry.1 = Some(result);
            } else {
                entry.0 = Some(result);
            }
        }
        by_level
            .values()
            .filter(|pair| match pair {
                (Some(ours), Some(baseline)) if baseline.found => {
                    !ours.found || ours.cost > baseline.cost
                }
                _ => false,
            })
            .count()
    }

    pub fn write_csv(&self, path: impl AsRef<Path>) -> Result<(), BatchError> {
        let path = path.as_ref();
        let output_error = |source: io::Error| BatchError::Output {
            path: path.to_path_buf(),
            source,
        };
        let file = File::create(path).map_err(output_error)?;
        let mut out = BufWriter::new(file);
        self.write_rows(&mut out).map_err(output_error)?;
        out.flush().map_err(output_error)
    }

    fn write_rows<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "level,algorithm,found,steps,cost,expanded,elapsed_us")?;
        for r in &self.results {
            let expanded = r.expanded.map(|e| e.to_string()).unwrap_or_default();
            writeln!(
                out,
                "{},{},{},{},{},{},{}",
                r.level, r.algorithm, r.found, r.steps, r.cost, expanded, r.elapsed_us
            )?;
        }
        Ok(())
    }

    pub fn print_summary(&self) {
        if self.results.is_empty() {
            println!("No results to summarize.");
            return;
        }

        println!("\n=== BATCH SUMMARY ===");

        let mut algorithm_groups: BTreeMap<&str, Vec<&BatchResult>> = BTreeMap::new();
        for result in &self.results {
            algorithm_groups
                .entry(result.algorithm)
                .or_default()
                .push(result);
        }

        for (algorithm, results) in algorithm_groups {
            println!("\n{} results:", algorithm);
            let successful: Vec<_> = results.iter().filter(|r| r.found).collect();
            let total = results.len();
            let success_rate = (successful.len() as f64 / total as f64) * 100.0;
            println!(
                "  Success rate: {}/{} ({:.1}%)",
                successful.len(),
                total,
                success_rate
            );

            if !successful.is_empty() {
                let n = successful.len() as f64;
                let avg_steps = successful.iter().map(|r| r.steps as f64).sum::<f64>() / n;
                let avg_cost = successful.iter().map(|r| f64::from(r.cost)).sum::<f64>() / n;
                let avg_time = successful.iter().map(|r| r.elapsed_us as f64).sum::<f64>() / n;
                println!("  Average steps: {:.1}", avg_steps);
                println!("  Average cost: {:.1}", avg_cost);
                println!("  Average time: {:.1}us", avg_time);
            }
        }

        if !self.config.no_reference {
            println!(
                "\nLevels where {} lost to the baseline: {}",
                AStar::NAME,
                self.suboptimal_levels()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet_config() -> Config {
        Config {
            rows: 8,
            cols: 8,
            num_walls: 12,
            levels: 3,
            quiet: true,
            no_visualization: true,
            ..Config::default()
        }
    }

    #[test]
    fn records_both_algorithms_per_level() {
        let mut runner = BatchRunner::new(quiet_config());
        runner.run().unwrap();
        assert_eq!(runner.results().len(), 6);
        for pair in runner.results().chunks(2) {
            assert_eq!(pair[0].algorithm, AStar::NAME);
            assert_eq!(pair[1].algorithm, ReferenceDijkstra::NAME);
            assert_eq!(pair[0].found, pair[1].found);
            assert!(pair[0].expanded.is_some());
            assert!(pair[1].expanded.is_none());
        }
        assert_eq!(runner.suboptimal_levels(), 0);
    }

    fn result(level: usize, algorithm: &'static str, found: bool, cost: u32) -> BatchResult {
        BatchResult {
            level,
            algorithm,
            found,
            steps: 0,
            cost,
            expanded: None,
            elapsed_us: 0,
        }
    }

    #[test]
    fn counts_levels_lost_to_the_baseline() {
        let mut runner = BatchRunner::new(quiet_config());
        runner.results = vec![
            result(0, AStar::NAME, true, 10),
            result(0, ReferenceDijkstra::NAME, true, 10),
            result(1, AStar::NAME, true, 12),
            result(1, ReferenceDijkstra::NAME, true, 11),
            result(2, AStar::NAME, false, 0),
            result(2, ReferenceDijkstra::NAME, true, 7),
            result(3, AStar::NAME, false, 0),
            result(3, ReferenceDijkstra::NAME, false, 0),
        ];
        assert_eq!(runner.suboptimal_levels(), 2);
    }

    #[test]
    fn maps_are_reproducible_per_level() {
        let runner = BatchRunner::new(quiet_config());
        assert_eq!(
            runner.generate_map(2).to_string(),
            runner.generate_map(2).to_string()
        );
    }

    #[test]
    fn invalid_config_is_reported() {
        let mut runner = BatchRunner::new(Config {
            max_cost: 0,
            ..quiet_config()
        });
        assert!(matches!(
            runner.run(),
            Err(BatchError::Config(ConfigError::ZeroCost))
        ));
    }

    #[test]
    fn csv_has_header_and_one_row_per_result() {
        let mut runner = BatchRunner::new(Config {
            no_reference: true,
            ..quiet_config()
        });
        runner.run().unwrap();
        let mut buf = Vec::new();
        runner.write_rows(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "level,algorithm,found,steps,cost,expanded,elapsed_us");
        assert_eq!(lines.len(), 4);
        assert!(lines[1].starts_with("0,a_star,"));
    }
}
