use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;
use tracing_subscriber::EnvFilter;

use kira_powersim::cli::{Cli, Commands, DatasetArgs, DesignArgs, RunArgs};
use kira_powersim::config::DesignConfig;
use kira_powersim::ctx::Ctx;
use kira_powersim::grid::GridUnit;
use kira_powersim::io;
use kira_powersim::pipeline::Pipeline;
use kira_powersim::sim::unit_rng;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run(args) => run(args)?,
        Commands::Dataset(args) => dataset(args)?,
    }

    Ok(())
}

fn load_config(args: &DesignArgs) -> Result<DesignConfig> {
    match &args.config {
        Some(path) => DesignConfig::load(path),
        None => Ok(DesignConfig::default()),
    }
}

fn run(args: RunArgs) -> Result<()> {
    let mut config = load_config(&args.design)?;
    args.apply_to(&mut config);

    let mut ctx = Ctx::new(
        config,
        args.out.clone(),
        args.json,
        args.tsv,
        args.units_tsv,
        env!("CARGO_PKG_VERSION"),
    );
    Pipeline::standard().run(&mut ctx)?;

    let summary = io::summary::format_summary(&ctx)?;
    print!("{}", summary);
    if !ctx.warnings.is_empty() {
        println!("warnings:");
        for warning in &ctx.warnings {
            println!("- {}", warning);
        }
    }
    Ok(())
}

fn dataset(args: DatasetArgs) -> Result<()> {
    let mut config = load_config(&args.design)?;
    args.design.apply_to(&mut config);
    let design = config
        .validate()
        .context("inconsistent experiment design")?;

    if args.replication < 1 {
        anyhow::bail!("--replication must be at least 1");
    }
    let unit = GridUnit {
        index: 0,
        sample_size: args.n,
        replication: args.replication,
    };
    let mut rng = unit_rng(config.seed, &unit);
    let data = design.assembler.assemble(unit.sample_size, &mut rng)?;

    match &args.out {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            let mut w = std::io::BufWriter::new(file);
            io::tsv_writer::write_dataset(&mut w, &data)?;
            w.flush()?;
            print!(
                "{}",
                io::summary::format_cell_summaries(&data.cell_summaries())
            );
        }
        None => {
            let stdout = std::io::stdout();
            let mut w = std::io::BufWriter::new(stdout.lock());
            io::tsv_writer::write_dataset(&mut w, &data)?;
            w.flush()?;
            eprint!(
                "{}",
                io::summary::format_cell_summaries(&data.cell_summaries())
            );
        }
    }
    Ok(())
}
