use anyhow::Context;
use clap::Parser;

use grid_astar::batch::BatchRunner;
use grid_astar::config::Config;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("grid_astar=info".parse()?),
        )
        .init();

    let config = Config::parse();

    if !config.quiet {
        println!("Grid size: {}x{}", config.rows, config.cols);
        println!(
            "Walls: {}, Max cell cost: {}",
            config.num_walls, config.max_cost
        );
        println!("Start: {}, Goal: {}", config.start(), config.goal());
        println!("Relaxation: {:?}", config.relaxation);
        if config.no_visualization {
            println!("Visualization disabled");
        }
        println!();
    }

    let mut runner = BatchRunner::new(config.clone());
    runner.run().context("batch run failed")?;

    if !config.quiet {
        runner.print_summary();
    }
    Ok(())
}
