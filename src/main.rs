//! CLI entry point for voxel rule extraction and generation

use clap::Parser;
use voxtile::io::cli::{Cli, CommandProcessor};
use voxtile::io::logging::{DEFAULT_FILTER, QUIET_FILTER, init_tracing};

fn main() -> voxtile::Result<()> {
    let cli = Cli::parse();
    init_tracing(if cli.quiet { QUIET_FILTER } else { DEFAULT_FILTER });
    let processor = CommandProcessor::new(cli);
    processor.process()
}
