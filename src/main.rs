use std::time::Duration;

use clap::Parser;

use table_deps::cli::Args;
use table_deps::commands::Context;
use table_deps::config::ConfigFile;
use table_deps::input::InputSource;
use table_deps::logging::init_tracing;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let args = Args::parse();
    let config = ConfigFile::load(args.config.as_deref())?;

    if let Some(workers) = config.max_workers {
        rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build_global()?;
    }

    let source = match args.input {
        Some(path) => InputSource::File(path),
        None => InputSource::Stdin,
    };
    let ctx = Context::new(config, source).with_budget(args.budget_ms.map(Duration::from_millis));

    let output = args.command.run(&ctx, args.format)?;
    println!("{}", output);
    Ok(())
}
