//! Compute command implementation.

use anyhow::{bail, Context, Result};
use futures::future::join_all;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use stockta_config::{AppConfig, OutputFormat};
use stockta_core::traits::RecordSink;
use stockta_core::types::{BarSeries, Timeframe};
use stockta_data::{load_series, CsvSink, JsonLinesSink};
use stockta_indicators::IndicatorEngine;
use stockta_monitor::{InstrumentSummary, RunReport};
use tracing::{error, info, warn};

use crate::cli::ComputeArgs;

/// One instrument to recompute.
#[derive(Debug, Clone)]
struct InputJob {
    path: PathBuf,
    symbol: String,
}

impl InputJob {
    fn load(&self, timeframe: Timeframe) -> Result<BarSeries> {
        load_series(&self.path, &self.symbol, timeframe)
            .with_context(|| format!("Failed to load {}", self.path.display()))
    }
}

pub async fn run(args: ComputeArgs, config: &AppConfig) -> Result<()> {
    let jobs = collect_inputs(&args.inputs, args.symbol.as_deref())?;
    let timeframe = args.timeframe.unwrap_or(config.ingest.timeframe);
    let format = args.format.map(OutputFormat::from).unwrap_or(config.output.format);
    let directory = args
        .output
        .clone()
        .unwrap_or_else(|| config.output.directory.clone());

    let sink: Arc<dyn RecordSink> = match format {
        OutputFormat::Csv => Arc::new(CsvSink::new(&directory, config.output.batch_size)),
        OutputFormat::Jsonl => Arc::new(JsonLinesSink::new(&directory, config.output.batch_size)),
    };
    let engine = Arc::new(IndicatorEngine::new(config.engine.to_engine_settings()));

    info!(
        "Computing indicators for {} instruments ({} bars, {} sink -> {})",
        jobs.len(),
        timeframe,
        sink.name(),
        directory.display()
    );

    let gap_warning = config.ingest.gap_warning;
    let tasks = jobs.iter().cloned().map(|job| {
        let engine = Arc::clone(&engine);
        let sink = Arc::clone(&sink);
        tokio::spawn(process(job, engine, sink, timeframe, gap_warning))
    });
    let results = join_all(tasks).await;

    let mut report = RunReport::new();
    for (job, result) in jobs.iter().zip(results) {
        let source = job.path.display().to_string();
        match result {
            Ok(Ok(summary)) => {
                summary.log();
                report.record_success(summary);
            }
            Ok(Err(e)) => {
                error!("Skipping {}: {:#}", source, e);
                report.record_failure(source, format!("{:#}", e));
            }
            Err(e) => {
                error!("Task for {} did not complete: {}", source, e);
                report.record_failure(source, e);
            }
        }
    }

    if !args.quiet {
        print!("{}", report);
    }

    if report.has_failures() {
        bail!(
            "{} of {} instruments failed",
            report.failures.len(),
            jobs.len()
        );
    }

    Ok(())
}

/// Load, validate and compute on the blocking pool, then persist.
async fn process(
    job: InputJob,
    engine: Arc<IndicatorEngine>,
    sink: Arc<dyn RecordSink>,
    timeframe: Timeframe,
    gap_warning: bool,
) -> Result<InstrumentSummary> {
    let started = Instant::now();

    let blocking_engine = Arc::clone(&engine);
    let (series, records) = tokio::task::spawn_blocking(move || {
        let series = job.load(timeframe)?;
        let records = blocking_engine.compute(&series);
        Ok::<_, anyhow::Error>((series, records))
    })
    .await
    .context("Compute task panicked")??;

    let gaps = series.gaps();
    if gap_warning && gaps > 0 {
        warn!(
            "{}: {} intervals longer than {}",
            series.symbol(),
            gaps,
            series.timeframe()
        );
    }

    let written = sink
        .replace_series(&series, &records)
        .await
        .with_context(|| format!("Failed to persist {}", series.symbol()))?;

    Ok(InstrumentSummary::new(
        &engine,
        series.symbol(),
        &records,
        gaps,
        written,
        started.elapsed(),
    ))
}

/// Expand directories into their `.csv` and `.json` files.
///
/// Each symbol may appear once; two files for one instrument would race
/// to replace the same output.
fn collect_inputs(inputs: &[PathBuf], symbol: Option<&str>) -> Result<Vec<InputJob>> {
    let mut paths = Vec::new();

    for input in inputs {
        if input.is_dir() {
            let mut found: Vec<PathBuf> = std::fs::read_dir(input)
                .with_context(|| format!("Failed to read directory {}", input.display()))?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| p.is_file() && is_supported(p))
                .collect();
            found.sort();
            paths.extend(found);
        } else if input.is_file() {
            paths.push(input.clone());
        } else {
            bail!(
                "Input '{}' does not exist. Provide a CSV/JSON file or a directory containing them",
                input.display()
            );
        }
    }

    if paths.is_empty() {
        bail!("No input files found");
    }

    if let Some(symbol) = symbol {
        if paths.len() != 1 {
            bail!("--symbol can only be used with a single input file");
        }
        return Ok(vec![InputJob {
            path: paths.remove(0),
            symbol: symbol.to_string(),
        }]);
    }

    let jobs = paths
        .into_iter()
        .map(|path| {
            let symbol = path
                .file_stem()
                .and_then(|s| s.to_str())
                .map(str::to_string)
                .with_context(|| format!("Cannot derive a symbol from {}", path.display()))?;
            Ok(InputJob { path, symbol })
        })
        .collect::<Result<Vec<_>>>()?;

    {
        let mut seen: HashMap<&str, &Path> = HashMap::new();
        for job in &jobs {
            if let Some(first) = seen.insert(job.symbol.as_str(), job.path.as_path()) {
                bail!(
                    "Symbol '{}' appears in both {} and {}",
                    job.symbol,
                    first.display(),
                    job.path.display()
                );
            }
        }
    }

    Ok(jobs)
}

fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv") || e.eq_ignore_ascii_case("json"))
}
