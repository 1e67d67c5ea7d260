//! Binary entry point: parse flags, merge the config file, run the
//! synthetic workload through a processor and stop it cleanly.
mod workload;


use std::time::Duration;

use clap::{CommandFactory, FromArgMatches};

use crate::args::TallyArgs;
use crate::config::{apply_config, load_config};
use crate::error::AppResult;
use crate::processor::Processor;
use crate::shutdown::{setup_signal_shutdown_handler, shutdown_channel};

pub use workload::{TESTER_SERIES, WorkloadPlan, run_workload, tester_round};

/// Parses the process arguments and runs the tester to completion.
///
/// # Errors
///
/// Returns an error for invalid flags or config, a processor that cannot
/// start, or a loop that fails while stopping.
pub fn run() -> AppResult<()> {
    let args = parse_args()?;

    crate::logger::init_logging(args.verbose, args.no_color);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(run_async(args))
}

fn parse_args() -> AppResult<TallyArgs> {
    let matches = TallyArgs::command().get_matches();
    let mut args = TallyArgs::from_arg_matches(&matches)?;
    if let Some(config) = load_config(args.config.as_deref())? {
        apply_config(&mut args, &matches, &config)?;
    }
    Ok(args)
}

async fn run_async(args: TallyArgs) -> AppResult<()> {
    let exporter = args.sinks_config().build();
    if exporter.is_empty() {
        tracing::warn!("No exporters configured; snapshots are only kept in memory");
    } else {
        tracing::info!(
            "Exporting to {}",
            exporter.names().collect::<Vec<_>>().join(", ")
        );
    }

    let processor = Processor::start(args.processor_config(), exporter)?;
    let (shutdown_tx, _) = shutdown_channel();
    let signal_handle = setup_signal_shutdown_handler(&shutdown_tx);

    let plan = WorkloadPlan {
        rate: args.rate.get(),
        duration: Duration::from_secs(args.target_duration.get()),
    };
    tracing::info!(
        "Sending {} series at {} rounds/s for {:?}",
        TESTER_SERIES.len(),
        plan.rate,
        plan.duration
    );
    let outcome = run_workload(processor.sender(), plan, shutdown_tx.subscribe()).await;

    drop(shutdown_tx.send(()));
    let dropped = processor.dropped();
    let last = processor.stop().await?;
    signal_handle.await?;

    let sent = outcome?;
    tracing::info!(
        "Sent {} measurements ({} dropped); final snapshot #{} has {} counters, {} gauges, {} histograms, {} summaries",
        sent,
        dropped,
        last.sequence,
        last.counters.len(),
        last.gauges.len(),
        last.histograms.len(),
        last.summaries.len()
    );
    Ok(())
}
