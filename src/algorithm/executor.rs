use crate::{
    algorithm::propagation::{PropagationReport, Propagator, propagation_reach},
    algorithm::recovery::{Region, partition, reset_region},
    algorithm::selection::{SelectionPolicy, choose_symbol, min_entropy_candidates, select_cell},
    analysis::rules::RuleSet,
    io::configuration::{
        DEFAULT_OUTPUT_SIZE, DEFAULT_RETRY_BUDGET, MAX_GRID_CELLS, MAX_GRID_DIMENSION,
        PROPAGATION_DEPTH, SEED_POSITION,
    },
    io::error::{AlgorithmError, Result, invalid_parameter},
    spatial::grid::{Cell, Extent, Position, WaveGrid},
    spatial::symbols::Symbol,
};
use ndarray::Array3;
use rand::{Rng, SeedableRng, rngs::StdRng};
use tracing::{debug, info, warn};

/// Source of every random decision made during generation
///
/// Implementations must be deterministic for a fixed seed so that runs can be replayed.
pub trait RandomSource {
    /// Uniform index in `0..len`; `len` is never zero
    fn choose_index(&mut self, len: usize) -> usize;

    /// Index drawn proportionally to `weights`
    fn weighted_choice(&mut self, weights: &[f64]) -> usize;
}

/// Seeded random selector for reproducible stochastic choices
pub struct RandomSelector {
    rng: StdRng,
}

impl RandomSelector {
    /// Create a deterministic random selector
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for RandomSelector {
    fn choose_index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        self.rng.random_range(0..len)
    }

    /// Generic weighted random selection
    ///
    /// Returns index into weights array using cumulative distribution
    fn weighted_choice(&mut self, weights: &[f64]) -> usize {
        let total: f64 = weights.iter().sum();
        if total <= 0.0 {
            return 0;
        }

        let mut rand_val = self.rng.random::<f64>() * total;
        for (i, &weight) in weights.iter().enumerate() {
            rand_val -= weight;
            if rand_val <= 0.0 {
                return i;
            }
        }
        weights.len().saturating_sub(1)
    }
}

/// What happens when a region runs out of candidates
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Stop at the first contradiction
    Abort,
    /// Reset the failing region and try again, at most `budget` times per region
    RetryRegion {
        /// Retries allowed for each region
        budget: usize,
    },
}

impl Default for FailurePolicy {
    fn default() -> Self {
        Self::RetryRegion {
            budget: DEFAULT_RETRY_BUDGET,
        }
    }
}

/// Parameters controlling one generation run
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GenerationConfig {
    /// Size of the output volume
    pub size: Extent,
    /// Symbol placed at the seed position; `None` picks the lowest tile symbol of the rules
    pub seed_symbol: Option<Symbol>,
    /// Where the seed is placed
    pub seed_position: Position,
    /// How symbols are drawn for collapsing cells
    pub selection: SelectionPolicy,
    /// Box size for sequential generation; `None` treats the volume as one region
    pub region_size: Option<Extent>,
    /// Reaction to contradictions
    pub failure: FailurePolicy,
    /// Hops propagation may travel from each trigger
    pub propagation_depth: usize,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            size: DEFAULT_OUTPUT_SIZE,
            seed_symbol: None,
            seed_position: SEED_POSITION,
            selection: SelectionPolicy::Uniform,
            region_size: None,
            failure: FailurePolicy::default(),
            propagation_depth: PROPAGATION_DEPTH,
        }
    }
}

/// Externally visible driver state
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// The seed has not been placed yet
    Seeding,
    /// Collapsing cells of the current region
    Selecting,
    /// Every cell is collapsed
    Done,
    /// The run stopped with an error
    Failed,
}

/// Result of a single `step`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// The seed was placed and propagated
    Seeded {
        /// Seed position
        position: Position,
        /// Seed symbol
        symbol: Symbol,
    },
    /// One cell was collapsed and propagated
    Collapsed {
        /// Collapsed cell
        position: Position,
        /// Chosen symbol
        symbol: Symbol,
    },
    /// The current region failed and was reset
    RegionRetried {
        /// Index of the region in processing order
        region: usize,
        /// Retry number for this region, starting at 1
        attempt: usize,
    },
    /// The current region is fully collapsed
    RegionComplete {
        /// Index of the completed region
        region: usize,
    },
    /// Generation already finished
    Done,
}

/// Completion state of a region as seen by the selecting scan
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RegionOutcome {
    /// Every cell of the region is collapsed
    Complete,
    /// Some cells still have candidates
    Pending,
    /// The region holds contradicted cells
    Contradiction(Region, Vec<Position>),
}

/// Counters gathered over a run
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GenerationStats {
    /// Steps taken so far
    pub steps: usize,
    /// Cells collapsed by selection, including ones later undone by a retry
    pub collapses: usize,
    /// Region resets across the whole run
    pub retries: usize,
    /// Contradictions observed across the whole run
    pub contradictions: usize,
}

#[derive(Clone, Debug)]
enum Failure {
    Contradiction(Vec<Position>),
    Exhausted {
        attempts: usize,
        unresolved: Vec<Position>,
    },
}

impl Failure {
    fn to_error(&self) -> AlgorithmError {
        match self {
            Self::Contradiction(positions) => AlgorithmError::Contradiction {
                positions: positions.clone(),
            },
            Self::Exhausted {
                attempts,
                unresolved,
            } => AlgorithmError::GenerationFailed {
                attempts: *attempts,
                unresolved: unresolved.clone(),
            },
        }
    }
}

/// Wave function collapse driver over a fixed 3-D volume
///
/// Seeds one cell, then repeatedly collapses the lowest-entropy open cell of the current
/// region and propagates the consequences. Each call to `step` performs exactly one
/// seeding, collapse or region reset, so a host can spread a run over many frames.
pub struct CollapseDriver<'a, R: RandomSource> {
    rules: &'a RuleSet,
    config: GenerationConfig,
    seed_symbol: Symbol,
    grid: WaveGrid,
    propagator: Propagator,
    rng: R,
    regions: Vec<Region>,
    region_index: usize,
    retries: usize,
    phase: Phase,
    failure: Option<Failure>,
    stats: GenerationStats,
}

impl<'a, R: RandomSource> CollapseDriver<'a, R> {
    /// Create a driver with every cell open over the rule set's alphabet
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The rule set has no symbols or kernels
    /// - The output or region size has a zero dimension or exceeds `MAX_GRID_DIMENSION`
    /// - The output holds more than `MAX_GRID_CELLS` cells
    /// - The seed position lies outside the volume
    /// - The seed symbol does not occur in the rule set
    pub fn new(rules: &'a RuleSet, config: GenerationConfig, rng: R) -> Result<Self> {
        if rules.is_exhausted() {
            return Err(AlgorithmError::RuleSetExhausted);
        }
        if config.size.is_degenerate()
            || config.size.as_array().iter().any(|&d| d > MAX_GRID_DIMENSION)
        {
            return Err(invalid_parameter(
                "size",
                &config.size,
                &format!("every dimension must be between 1 and {MAX_GRID_DIMENSION}"),
            ));
        }
        if config
            .size
            .checked_volume()
            .is_none_or(|cells| cells > MAX_GRID_CELLS)
        {
            return Err(invalid_parameter(
                "size",
                &config.size,
                &format!("volume must not exceed {MAX_GRID_CELLS} cells"),
            ));
        }
        if let Some(region) = config.region_size {
            if region.is_degenerate() {
                return Err(invalid_parameter(
                    "region_size",
                    &region,
                    &"every dimension must be at least 1",
                ));
            }
        }
        if !config.size.contains(config.seed_position) {
            return Err(invalid_parameter(
                "seed_position",
                &format!("{:?}", config.seed_position),
                &format!("outside grid of size {}", config.size),
            ));
        }

        let alphabet = rules.alphabet();
        let seed_symbol = match config.seed_symbol {
            Some(symbol) => symbol,
            None => rules
                .symbols()
                .iter()
                .copied()
                .find(|s| !s.is_sentinel())
                .or_else(|| rules.symbols().first().copied())
                .ok_or(AlgorithmError::RuleSetExhausted)?,
        };
        if !alphabet.contains(seed_symbol) {
            return Err(invalid_parameter(
                "seed_symbol",
                &seed_symbol,
                &"symbol does not occur in the rule set",
            ));
        }

        Ok(Self {
            rules,
            config,
            seed_symbol,
            grid: WaveGrid::reset(config.size, &alphabet),
            propagator: Propagator::new(config.propagation_depth),
            rng,
            regions: partition(config.size, config.region_size),
            region_index: 0,
            retries: 0,
            phase: Phase::Seeding,
            failure: None,
            stats: GenerationStats::default(),
        })
    }

    /// Current phase
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Current grid state
    pub const fn grid(&self) -> &WaveGrid {
        &self.grid
    }

    /// Index of the region being generated
    pub const fn region_index(&self) -> usize {
        self.region_index
    }

    /// Regions in processing order
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// Generation parameters
    pub const fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Counters gathered so far
    pub const fn stats(&self) -> GenerationStats {
        self.stats
    }

    /// Generated volume once the run is done, with air mapped to `None`
    pub fn output(&self) -> Option<Array3<Option<Symbol>>> {
        if self.phase == Phase::Done {
            self.grid.to_output()
        } else {
            None
        }
    }

    /// Perform one seeding, collapse or region reset
    ///
    /// # Errors
    ///
    /// Returns `Contradiction` under `FailurePolicy::Abort` when a region fails, and
    /// `GenerationFailed` once a region has used up its retry budget. After a failure every
    /// further call returns the same error.
    pub fn step(&mut self) -> Result<StepOutcome> {
        if let Some(failure) = &self.failure {
            return Err(failure.to_error());
        }
        match self.phase {
            Phase::Done => Ok(StepOutcome::Done),
            Phase::Seeding => {
                self.stats.steps += 1;
                self.seed()
            }
            Phase::Selecting => {
                self.stats.steps += 1;
                self.select()
            }
            Phase::Failed => Err(AlgorithmError::GenerationFailed {
                attempts: self.retries + 1,
                unresolved: self.grid.unresolved(),
            }),
        }
    }

    /// Step until every cell is collapsed
    ///
    /// # Errors
    ///
    /// Propagates the first error returned by `step`
    pub fn run(&mut self) -> Result<Array3<Option<Symbol>>> {
        while self.step()? != StepOutcome::Done {}

        info!(
            size = %self.config.size,
            steps = self.stats.steps,
            retries = self.stats.retries,
            contradictions = self.stats.contradictions,
            "generation complete"
        );

        self.output().ok_or_else(|| AlgorithmError::GenerationFailed {
            attempts: self.retries + 1,
            unresolved: self.grid.unresolved(),
        })
    }

    /// Scan the current region and classify it
    pub fn region_outcome(&self) -> RegionOutcome {
        let Some(&region) = self.regions.get(self.region_index) else {
            return RegionOutcome::Complete;
        };
        let mut open = false;
        let mut contradictions = Vec::new();
        for position in region.positions() {
            match self.grid.get(position) {
                Some(Cell::Contradiction) => contradictions.push(position),
                Some(Cell::Open(_)) => open = true,
                _ => {}
            }
        }
        if !contradictions.is_empty() {
            RegionOutcome::Contradiction(region, contradictions)
        } else if open {
            RegionOutcome::Pending
        } else {
            RegionOutcome::Complete
        }
    }

    fn seed(&mut self) -> Result<StepOutcome> {
        let position = self.config.seed_position;
        let symbol = self.seed_symbol;
        self.grid.place(position, symbol)?;
        self.propagate(&[position]);
        self.phase = Phase::Selecting;

        info!(
            size = %self.config.size,
            regions = self.regions.len(),
            kernels = self.rules.kernels().len(),
            symbols = self.rules.symbols().len(),
            seed = %symbol,
            "generation started"
        );
        Ok(StepOutcome::Seeded { position, symbol })
    }

    fn select(&mut self) -> Result<StepOutcome> {
        let region_index = self.region_index;
        let Some(&region) = self.regions.get(region_index) else {
            self.phase = Phase::Done;
            return Ok(StepOutcome::Done);
        };

        match self.region_outcome() {
            RegionOutcome::Contradiction(region, positions) => {
                return self.fail_region(region, positions);
            }
            RegionOutcome::Complete => return Ok(self.complete_region()),
            RegionOutcome::Pending => {}
        }

        let Some((entropy, candidates)) = min_entropy_candidates(&self.grid, region.positions())
        else {
            return Ok(self.complete_region());
        };
        let Some(position) = select_cell(&candidates, &mut self.rng) else {
            return Ok(self.complete_region());
        };
        let Some(symbol) = choose_symbol(
            &self.grid,
            position,
            self.config.selection,
            self.rules.adjacency(),
            &mut self.rng,
        ) else {
            return self.fail_region(region, vec![position]);
        };

        if !self.grid.collapse(position, symbol) {
            return self.fail_region(region, vec![position]);
        }
        self.stats.collapses += 1;
        debug!(
            ?position,
            %symbol,
            entropy,
            ties = candidates.len(),
            "collapsed cell"
        );

        self.propagate(&[position]);
        Ok(StepOutcome::Collapsed { position, symbol })
    }

    fn complete_region(&mut self) -> StepOutcome {
        let region = self.region_index;
        debug!(region, retries = self.retries, "region complete");
        self.region_index += 1;
        self.retries = 0;
        if self.region_index >= self.regions.len() {
            self.phase = Phase::Done;
        }
        StepOutcome::RegionComplete { region }
    }

    fn fail_region(&mut self, region: Region, positions: Vec<Position>) -> Result<StepOutcome> {
        let region_index = self.region_index;
        match self.config.failure {
            FailurePolicy::Abort => {
                warn!(%region, cells = positions.len(), "region failed, aborting");
                Err(self.record_failure(Failure::Contradiction(positions)))
            }
            FailurePolicy::RetryRegion { budget } if self.retries < budget => {
                self.retries += 1;
                self.stats.retries += 1;
                warn!(
                    %region,
                    attempt = self.retries,
                    budget,
                    cells = positions.len(),
                    "region failed, retrying"
                );
                self.reset(region)?;
                Ok(StepOutcome::RegionRetried {
                    region: region_index,
                    attempt: self.retries,
                })
            }
            FailurePolicy::RetryRegion { budget } => {
                warn!(%region, budget, "region failed, retry budget exhausted");
                Err(self.record_failure(Failure::Exhausted {
                    attempts: self.retries + 1,
                    unresolved: self.grid.unresolved(),
                }))
            }
        }
    }

    fn record_failure(&mut self, failure: Failure) -> AlgorithmError {
        let error = failure.to_error();
        self.phase = Phase::Failed;
        self.failure = Some(failure);
        error
    }

    fn reset(&mut self, region: Region) -> Result<()> {
        let Some(kernel_extent) = self.rules.max_extent() else {
            return Err(AlgorithmError::RuleSetExhausted);
        };
        let halo = propagation_reach(kernel_extent, self.config.propagation_depth);
        let pinned = [self.config.seed_position];

        let result = reset_region(&mut self.grid, region, halo, &pinned);
        self.grid.place(self.config.seed_position, self.seed_symbol)?;

        // Collapsed cells just outside the halo still constrain the reopened ones
        let reach = propagation_reach(kernel_extent, 1);
        let [hx, hy, hz] = halo;
        let [rx, ry, rz] = reach;
        let area = region.expanded([hx + rx, hy + ry, hz + rz], self.grid.extent());
        let origins: Vec<Position> = area
            .positions()
            .filter(|&p| self.grid.get(p).is_some_and(Cell::is_collapsed))
            .collect();

        debug!(
            %region,
            reopened = result.cells_reopened,
            origins = origins.len(),
            "region reset"
        );
        self.propagate(&origins);
        Ok(())
    }

    fn propagate(&mut self, origins: &[Position]) -> PropagationReport {
        let report = self.propagator.propagate(&mut self.grid, origins, self.rules);
        for position in &report.contradictions {
            warn!(?position, region = self.region_index, "contradiction");
        }
        self.stats.contradictions += report.contradictions.len();
        report
    }
}

/// Run a whole generation with a seeded `RandomSelector`
///
/// # Errors
///
/// Returns any error from `CollapseDriver::new` or `CollapseDriver::run`
pub fn generate(
    rules: &RuleSet,
    config: GenerationConfig,
    seed: u64,
) -> Result<Array3<Option<Symbol>>> {
    CollapseDriver::new(rules, config, RandomSelector::new(seed))?.run()
}
