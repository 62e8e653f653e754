//! CLI commands

pub mod evaluate;
pub mod validate;

use crate::output::OutputFormat;
use jetsim_common::EvalConfig;
use jetsim_evaluation::{
    JetMetrics, MetricsEvaluator, Orchestrator, RealDataResolver, SampleIo, SampleReader, Transfer,
};
use jetsim_infrastructure::{standard_registry, ContainerReader, HttpTransfer};
use std::sync::Arc;

/// Context passed to all commands
pub struct CommandContext {
    pub config: EvalConfig,
    pub format: OutputFormat,
    /// Re-download generated samples that are already on disk
    pub overwrite: bool,
}

impl CommandContext {
    /// Create a new command context
    pub fn new(config: EvalConfig, format: OutputFormat, overwrite: bool) -> Self {
        Self {
            config,
            format,
            overwrite,
        }
    }

    /// Build the evaluation pipeline with the production adapters
    pub fn orchestrator(&self) -> Orchestrator {
        let settings = &self.config.evaluation;
        let transfer: Arc<dyn Transfer> =
            Arc::new(HttpTransfer::new().with_progress(settings.show_progress));
        let reader: Arc<dyn SampleReader> = Arc::new(ContainerReader);

        let resolver = RealDataResolver::new(standard_registry(transfer.clone(), reader.clone()))
            .with_cache_layout(settings.efp_cache_layout);
        let sample_io = SampleIo::new(transfer, reader).with_num_samples(settings.num_samples);

        let metrics = JetMetrics::new(settings.seed)
            .with_kpd_batches(settings.kpd_batch_size, settings.kpd_num_batches);
        let evaluator = MetricsEvaluator::new(Arc::new(metrics))
            .with_w1_batches(settings.num_w1_eval_samples, settings.num_w1_batches);

        Orchestrator::new(
            self.config.paths.clone(),
            settings.clone(),
            resolver,
            sample_io,
            evaluator,
        )
        .with_overwrite(self.overwrite)
    }
}
