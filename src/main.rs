use anyhow::Result;
use clap::Parser;
use gpxmerge::cli::{AppContext, Cli};

fn main() -> Result<()> {
    let cli = Cli::parse();
    gpxmerge::infra::logging::init(cli.debug);

    // Build a context once, pass everywhere
    let ctx = AppContext {
        quiet: cli.quiet,
        debug: cli.debug,
    };

    gpxmerge::core::merge_run(cli, &ctx)
}
