//! Command-line interface for extracting rules from PNG slices and generating volumes

use crate::algorithm::executor::{
    CollapseDriver, FailurePolicy, GenerationConfig, RandomSelector, StepOutcome,
};
use crate::algorithm::selection::SelectionPolicy;
use crate::analysis::patterns::{AirFill, ExtractionConfig, RuleExtractor};
use crate::io::configuration::{
    DEFAULT_KERNEL_SIZE, DEFAULT_OUTPUT_DIR, DEFAULT_OUTPUT_SIZE, DEFAULT_RETRY_BUDGET,
    DEFAULT_RULES_FILE, DEFAULT_SEED, PROPAGATION_DEPTH, SEED_POSITION,
};
use crate::io::error::{Result, invalid_parameter};
use crate::io::image::{export_volume, load_sample};
use crate::io::progress::GenerationProgress;
use crate::io::store::RuleFile;
use crate::spatial::grid::Extent;
use crate::spatial::symbols::Symbol;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "voxtile")]
#[command(
    author,
    version,
    about = "Extract kernel rules from voxel slices and generate new volumes"
)]
/// Command-line arguments for the extraction and generation tool
pub struct Cli {
    /// Operation to run
    #[command(subcommand)]
    pub command: Command,

    /// Suppress progress output and informational logs
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

impl Cli {
    /// Check if progress should be displayed
    pub const fn should_show_progress(&self) -> bool {
        !self.quiet
    }
}

/// Subcommands of the tool
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Read PNG slices (one per z layer) and write a rule file
    Extract(ExtractArgs),
    /// Generate a volume from a rule file and write it as PNG slices
    Generate(GenerateArgs),
}

/// Arguments of `voxtile extract`
#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// PNG slices, bottom layer first
    #[arg(value_name = "SLICES", required = true)]
    pub slices: Vec<PathBuf>,

    /// Rule file to write
    #[arg(short, long, default_value = DEFAULT_RULES_FILE)]
    pub output: PathBuf,

    /// Kernel size as x,y,z
    #[arg(short, long, default_value_t = DEFAULT_KERNEL_SIZE)]
    pub kernel: Extent,

    /// Which absent cells count as air: columns or bounds
    #[arg(long, default_value_t = AirFill::default())]
    pub air: AirFill,

    /// Leave the air sentinel out of the generation alphabet
    #[arg(long)]
    pub no_empty: bool,
}

impl ExtractArgs {
    /// Extraction parameters described by these arguments
    pub const fn to_config(&self) -> ExtractionConfig {
        ExtractionConfig {
            kernel_size: self.kernel,
            air_fill: self.air,
            include_empty: !self.no_empty,
        }
    }
}

/// Arguments of `voxtile generate`
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Rule file written by `extract`
    #[arg(value_name = "RULES")]
    pub rules: PathBuf,

    /// Directory for the generated slices
    #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
    pub output: PathBuf,

    /// Output size as x,y,z
    #[arg(short, long, default_value_t = DEFAULT_OUTPUT_SIZE)]
    pub size: Extent,

    /// Symbol number of the seed tile (1 is the first color seen during extraction)
    #[arg(long)]
    pub start: Option<u32>,

    /// Random seed for reproducible generation
    #[arg(long, default_value_t = DEFAULT_SEED)]
    pub seed: u64,

    /// Weight symbol choice by neighbour statistics
    #[arg(long)]
    pub weighted: bool,

    /// Generate in boxes of this size (x,y,z) instead of all at once
    #[arg(long)]
    pub region: Option<Extent>,

    /// Resets allowed per region before giving up
    #[arg(long, default_value_t = DEFAULT_RETRY_BUDGET)]
    pub retries: usize,

    /// Stop at the first contradiction instead of retrying
    #[arg(long)]
    pub abort: bool,

    /// Propagation depth per collapse
    #[arg(long, default_value_t = PROPAGATION_DEPTH)]
    pub depth: usize,
}

impl GenerateArgs {
    /// Generation parameters described by these arguments
    ///
    /// # Errors
    ///
    /// Returns an error if the seed symbol number is zero
    pub fn to_config(&self) -> Result<GenerationConfig> {
        let seed_symbol = match self.start {
            Some(0) => {
                return Err(invalid_parameter(
                    "start",
                    &0,
                    &"symbol numbers start at 1",
                ));
            }
            other => other.map(Symbol::new),
        };

        Ok(GenerationConfig {
            size: self.size,
            seed_symbol,
            seed_position: SEED_POSITION,
            selection: if self.weighted {
                SelectionPolicy::Weighted
            } else {
                SelectionPolicy::Uniform
            },
            region_size: self.region,
            failure: if self.abort {
                FailurePolicy::Abort
            } else {
                FailurePolicy::RetryRegion {
                    budget: self.retries,
                }
            },
            propagation_depth: self.depth,
        })
    }
}

/// Runs the selected subcommand
pub struct CommandProcessor {
    cli: Cli,
}

impl CommandProcessor {
    /// Create a processor for parsed arguments
    pub const fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the subcommand
    ///
    /// # Errors
    ///
    /// Returns an error if loading, extraction, generation or writing fails
    pub fn process(&self) -> Result<()> {
        match &self.cli.command {
            Command::Extract(args) => {
                let rule_file = Self::extract(args)?;
                rule_file.save(&args.output)
            }
            Command::Generate(args) => self.generate(args).map(|_| ()),
        }
    }

    /// Load slices and extract a rule file
    ///
    /// # Errors
    ///
    /// Returns an error if the slices cannot be loaded or hold no tile
    pub fn extract(args: &ExtractArgs) -> Result<RuleFile> {
        let start_time = Instant::now();
        let mut loaded = load_sample(&args.slices)?;
        let extractor = RuleExtractor::new(args.to_config())?;
        let rules = extractor.extract(&mut loaded.sample)?;

        info!(
            slices = args.slices.len(),
            colors = loaded.palette.len(),
            elapsed_ms = start_time.elapsed().as_millis(),
            "extraction finished"
        );
        Ok(RuleFile::new(&loaded.palette, rules))
    }

    /// Load a rule file, generate a volume and export it
    ///
    /// Returns the written slice paths.
    ///
    /// # Errors
    ///
    /// Returns an error if the rules cannot be loaded, generation fails or export fails
    pub fn generate(&self, args: &GenerateArgs) -> Result<Vec<PathBuf>> {
        let start_time = Instant::now();
        let rule_file = RuleFile::load(&args.rules)?;
        let config = args.to_config()?;

        let mut driver =
            CollapseDriver::new(&rule_file.rules, config, RandomSelector::new(args.seed))?;
        let progress = GenerationProgress::new(config.size.volume(), !self.cli.should_show_progress());

        loop {
            let outcome = match driver.step() {
                Ok(outcome) => outcome,
                Err(e) => {
                    progress.finish("failed");
                    return Err(e);
                }
            };
            progress.record(outcome, driver.grid().collapsed_count(), driver.stats());
            if outcome == StepOutcome::Done {
                break;
            }
        }
        progress.finish("done");

        let volume = driver.run()?;
        let written = export_volume(&volume, &rule_file.symbol_table(), &args.output)?;

        info!(
            size = %config.size,
            slices = written.len(),
            output = %args.output.display(),
            elapsed_ms = start_time.elapsed().as_millis(),
            "generation finished"
        );
        Ok(written)
    }
}
