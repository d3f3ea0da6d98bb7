//! Dataset execution: runs batch commands in bounded transactions
//!
//! A [`DatasetManager`] owns the store, the progress log and the random
//! source. Each [`Dataset`] borrows them for one named generation run.
//! The same random source is shared by every command (and every dataset)
//! of a manager, so seeded runs are reproducible.

use crate::command::{BatchCommand, ExecutionContext};
use crate::entity::DomainEntityInfo;
use crate::error::{DatagenError, DatagenResult};
use crate::graph::{GraphBackend, Transaction};
use crate::log::Log;
use crate::selection::{CommandSelectionStrategy, PendingCommand};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use serde::Serialize;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Owns the collaborators shared by datasets
pub struct DatasetManager<S: GraphBackend> {
    store: S,
    log: Box<dyn Log>,
    rng: StdRng,
}

impl<S: GraphBackend> DatasetManager<S> {
    /// Manager with an entropy-seeded random source
    pub fn new(store: S, log: impl Log + 'static) -> Self {
        Self {
            store,
            log: Box::new(log),
            rng: StdRng::from_entropy(),
        }
    }

    /// Reseed the random source for reproducible output
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn new_dataset(&mut self, description: impl Into<String>) -> Dataset<'_> {
        let description = description.into();
        self.log.write(&format!("Begin [{}]", description));
        Dataset {
            description,
            store: &mut self.store,
            log: self.log.as_ref(),
            rng: &mut self.rng,
            statistics: DatasetStatistics::default(),
            started: Instant::now(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }
}

/// Totals accumulated by a dataset
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DatasetStatistics {
    pub commands: usize,
    pub iterations: usize,
    pub batches: usize,
    pub nodes_created: u64,
    pub relationships_created: u64,
    pub relationships_skipped: u64,
    pub elapsed_ms: u64,
}

impl DatasetStatistics {
    fn absorb(&mut self, ctx: &ExecutionContext) {
        self.commands += 1;
        self.iterations += ctx.iterations();
        self.nodes_created += ctx.nodes_created();
        self.relationships_created += ctx.relationships_created();
        self.relationships_skipped += ctx.relationships_skipped();
    }
}

/// One named generation run
pub struct Dataset<'a> {
    description: String,
    store: &'a mut dyn GraphBackend,
    log: &'a dyn Log,
    rng: &'a mut StdRng,
    statistics: DatasetStatistics,
    started: Instant,
}

impl<'a> Dataset<'a> {
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Totals so far
    pub fn statistics(&self) -> &DatasetStatistics {
        &self.statistics
    }

    /// Run a command to completion in batches and return its results
    pub fn execute(&mut self, command: &mut dyn BatchCommand) -> DatagenResult<DomainEntityInfo> {
        validate_batch_size(command)?;

        let mut run = CommandRun::new(0, command);
        run.begin(self.log);
        while !run.is_done() {
            run.run_batch(&mut *self.store, &mut *self.rng)?;
            self.statistics.batches += 1;
        }
        Ok(self.finish(run))
    }

    /// Run several commands, interleaving their batches as `strategy`
    /// decides. Results are returned in submission order.
    pub fn execute_all(
        &mut self,
        commands: &mut [Box<dyn BatchCommand>],
        strategy: &mut dyn CommandSelectionStrategy,
    ) -> DatagenResult<Vec<DomainEntityInfo>> {
        for command in commands.iter() {
            validate_batch_size(command.as_ref())?;
        }

        let mut runs: Vec<CommandRun<'_>> = commands
            .iter_mut()
            .enumerate()
            .map(|(position, command)| CommandRun::new(position, command.as_mut()))
            .collect();
        for run in runs.iter_mut() {
            run.begin(self.log);
        }

        loop {
            let pending: Vec<PendingCommand> = runs
                .iter()
                .filter(|run| !run.is_done())
                .map(CommandRun::pending)
                .collect();
            if pending.is_empty() {
                break;
            }

            let choice = strategy.next_command(&pending);
            let position = pending
                .get(choice)
                .map(PendingCommand::position)
                .ok_or_else(|| {
                    DatagenError::Configuration(format!(
                        "Selection strategy chose command {} of {} pending",
                        choice,
                        pending.len()
                    ))
                })?;

            let run = &mut runs[position];
            run.run_batch(&mut *self.store, &mut *self.rng)?;
            self.statistics.batches += 1;
        }

        Ok(runs.into_iter().map(|run| self.finish(run)).collect())
    }

    fn finish(&mut self, run: CommandRun<'_>) -> DomainEntityInfo {
        run.command.on_end(&run.ctx, self.log);
        self.log.write(&format!(
            "      [Time: {} ms]",
            run.started.elapsed().as_millis()
        ));
        info!(
            "Finished {} ({} iterations)",
            run.command.short_description(),
            run.ctx.iterations()
        );
        self.statistics.absorb(&run.ctx);
        run.command.results(&run.ctx)
    }

    /// Close the dataset and report its totals
    pub fn end(mut self) -> DatasetStatistics {
        self.statistics.elapsed_ms = self.started.elapsed().as_millis() as u64;
        self.log.write(&format!(
            "End   [{}] {} nodes, {} relationships in {} ms",
            self.description,
            self.statistics.nodes_created,
            self.statistics.relationships_created,
            self.statistics.elapsed_ms
        ));
        self.statistics
    }
}

fn validate_batch_size(command: &dyn BatchCommand) -> DatagenResult<()> {
    if command.batch_size() == 0 {
        return Err(DatagenError::Configuration(format!(
            "Batch size for {} must be greater than zero",
            command.short_description()
        )));
    }
    Ok(())
}

/// Execution state of one command within a dataset
struct CommandRun<'c> {
    position: usize,
    command: &'c mut dyn BatchCommand,
    ctx: ExecutionContext,
    next_index: usize,
    total: usize,
    batch_size: usize,
    started: Instant,
}

impl<'c> CommandRun<'c> {
    fn new(position: usize, command: &'c mut dyn BatchCommand) -> Self {
        let total = command.number_of_iterations();
        let batch_size = command.batch_size();
        Self {
            position,
            command,
            ctx: ExecutionContext::new(),
            next_index: 0,
            total,
            batch_size,
            started: Instant::now(),
        }
    }

    fn begin(&mut self, log: &dyn Log) {
        log.write(&self.command.description());
        self.command.on_begin(log);
        self.started = Instant::now();
    }

    fn is_done(&self) -> bool {
        self.next_index >= self.total
    }

    fn pending(&self) -> PendingCommand {
        PendingCommand::new(
            self.position,
            self.command.short_description(),
            self.next_index,
            self.total,
        )
    }

    /// Execute the next batch inside its own transaction. A failing
    /// iteration rolls the whole batch back; earlier batches stay committed.
    fn run_batch(&mut self, store: &mut dyn GraphBackend, rng: &mut dyn RngCore) -> DatagenResult<()> {
        let end = (self.next_index + self.batch_size).min(self.total);
        debug!(
            "{}: batch [{}, {}) of {}",
            self.command.short_description(),
            self.next_index,
            end,
            self.total
        );

        let mut tx = Transaction::begin(store).map_err(|e| DatagenError::CommandFailed {
            command: self.command.short_description(),
            iteration: self.next_index,
            source: Box::new(e.into()),
        })?;
        for index in self.next_index..end {
            if let Err(e) = self.command.execute(&mut self.ctx, &mut *tx, index, rng) {
                if let Err(rollback) = tx.rollback() {
                    warn!("Rollback after failure at iteration {} failed: {}", index, rollback);
                }
                return Err(DatagenError::CommandFailed {
                    command: self.command.short_description(),
                    iteration: index,
                    source: Box::new(e),
                });
            }
            self.ctx.record_iteration();
        }
        tx.commit()?;

        self.next_index = end;
        Ok(())
    }
}
