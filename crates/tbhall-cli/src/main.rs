//! tbhall command-line interface.
//!
//! Run Hall-number sweeps from TOML configuration files:
//! ```sh
//! tbhall run job.toml
//! tbhall validate job.toml
//! tbhall flatten data/fermi_arcs data/flat
//! tbhall arcs data/fermi_arcs
//! ```

mod config;
mod runner;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "tbhall")]
#[command(about = "Hall number of a tight-binding band from its spectral weight")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a sweep from a TOML configuration file.
    Run {
        /// Path to the job configuration file.
        config: PathBuf,
        /// Output directory (overrides config file setting).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a configuration file without running the pipeline.
    Validate {
        /// Path to the job configuration file.
        config: PathBuf,
    },
    /// Rewrite reference spectral-weight files as 1-D arrays.
    Flatten {
        /// Directory of 2-D `.npy` files.
        src: PathBuf,
        /// Directory to write `Akw_<label>.npy` files into.
        dst: PathBuf,
    },
    /// List the configurations in a reference data directory.
    Arcs {
        /// Directory of `.npy` files.
        dir: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config, output } => {
            println!("tbhall Hall-number sweep");
            println!("========================");
            let job = config::load_config(&config)?;
            println!("Configuration: {}", config.display());
            log::debug!("{:?}", job);

            let model = runner::run_job(&job)?;

            let out_dir = output.unwrap_or_else(|| PathBuf::from(&job.output.directory));

            if job.output.save_csv {
                runner::write_hall_csv(&model, &out_dir.join("hall.csv"))?;
            }

            if job.output.save_json {
                runner::write_transport_json(&model, &out_dir.join("transport.json"))?;
            }

            println!("Sweep complete.");
            Ok(())
        }
        Commands::Validate { config } => {
            let job = config::load_config(&config)?;
            runner::validate_job(&job)?;
            println!("Configuration is valid: {}", config.display());
            Ok(())
        }
        Commands::Flatten { src, dst } => {
            runner::flatten_directory(&src, &dst)?;
            Ok(())
        }
        Commands::Arcs { dir } => runner::describe_directory(&dir),
    }
}
