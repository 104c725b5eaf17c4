//! `signals` command handler.

use super::{cache_for, load_series, write_json};
use crate::cli::PaperArgs;
use crate::config::PairsConfig;
use crate::discovery::PairSelector;
use crate::execution::{LegQuantities, PaperExecutor, SignalRouter};
use crate::logging::{CsvRecorder, MultiRecorder, TracingRecorder, TradeRecorder};
use crate::strategy::{PairStrategy, Signal};
use std::error::Error;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Generate signals for `(x, y)` and optionally replay them through the
/// paper executor.
///
/// # Errors
/// Returns error if data is missing, the hedge ratio cannot be estimated
/// or the output cannot be written.
pub async fn run_signals(
    config: &PairsConfig,
    x: &str,
    y: &str,
    beta: Option<f64>,
    close: bool,
    output: Option<&Path>,
    paper: &PaperArgs,
) -> Result<(), Box<dyn Error>> {
    let cache = cache_for(config);
    let series_x = load_series(&cache, config, x)?;
    let series_y = load_series(&cache, config, y)?;

    let beta = match beta {
        Some(beta) => beta,
        None => {
            let selector = PairSelector::new(config.selector_config())?;
            let estimated = selector.hedge_ratio(&series_x, &series_y)?;
            info!(x = %x, y = %y, beta = format!("{:.4}", estimated), "Estimated hedge ratio");
            estimated
        }
    };

    let strategy = PairStrategy::new(beta, config.strategy_config())?;
    let signals = if close {
        strategy.generate_signals_closed(&series_x, &series_y)
    } else {
        strategy.generate_signals(&series_x, &series_y)
    };

    info!(
        x = %x,
        y = %y,
        beta = format!("{:.4}", beta),
        lookback = config.lookback,
        signals = signals.len(),
        "--- pairpioneer: signals generated ---"
    );
    if signals.is_empty() {
        warn!("No signals generated; the spread never crossed the entry threshold");
    }

    write_json(&signals, output)?;

    if paper.paper {
        replay_paper(x, y, &signals, paper).await;
    }
    Ok(())
}

async fn replay_paper(x: &str, y: &str, signals: &[Signal], paper: &PaperArgs) {
    let recorder: Arc<dyn TradeRecorder> = Arc::new(MultiRecorder::new(vec![
        Box::new(CsvRecorder::new(&paper.trades_csv)),
        Box::new(TracingRecorder::new()),
    ]));
    let executor = Arc::new(PaperExecutor::new());
    let mut router = SignalRouter::new(Arc::clone(&executor), x, y).with_recorder(Arc::clone(&recorder));
    let quantities = LegQuantities {
        x: paper.quantity_x,
        y: paper.quantity_y,
    };

    for signal in signals {
        if let Err(e) = router.route(signal, quantities).await {
            error!(signal = %signal.side, timestamp = %signal.timestamp, error = %e, "Paper order failed");
        }
    }
    if let Err(e) = recorder.flush().await {
        warn!(error = %e, "Failed to flush trade journal");
    }

    info!(
        trades = executor.trades().len(),
        position = %router.position(),
        journal = %paper.trades_csv.display(),
        "Paper replay finished"
    );
}
