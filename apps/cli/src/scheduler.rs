//! Repeats the batch on a fixed interval until interrupted.

use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{error, info, warn};

use stockbrief_core::errors::Result;
use stockbrief_core::pipeline::PipelineOrchestrator;

/// Hours between two runs must be at least this.
pub const MIN_INTERVAL_HOURS: u64 = 1;

/// One year.
pub const MAX_INTERVAL_HOURS: u64 = 24 * 365;

fn interval_duration(hours: u64) -> Duration {
    let hours = hours.clamp(MIN_INTERVAL_HOURS, MAX_INTERVAL_HOURS);
    Duration::from_secs(hours.saturating_mul(60 * 60))
}

/// Run now, then every `hours`. Returns on Ctrl-C, or with the error when a
/// run hits a configuration problem.
pub async fn run_every(
    orchestrator: &PipelineOrchestrator,
    symbols: &[String],
    hours: u64,
) -> Result<()> {
    let period = interval_duration(hours);
    info!("Scheduler started ({}-hour interval)", period.as_secs() / 3600);

    // First tick is immediate.
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                run_scheduled(orchestrator, symbols).await?;
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Scheduler stopped");
                return Ok(());
            }
        }
    }
}

async fn run_scheduled(orchestrator: &PipelineOrchestrator, symbols: &[String]) -> Result<()> {
    info!("Running scheduled batch...");
    match orchestrator.run_symbols(symbols).await {
        Ok(report) => {
            if report.is_complete_success() {
                info!("Scheduled batch completed: {}", report);
            } else {
                warn!("Scheduled batch completed with failures: {}", report);
            }
            Ok(())
        }
        Err(e) if e.is_configuration() => {
            error!("Scheduled batch aborted: {}", e);
            Err(e)
        }
        Err(e) => {
            // Next tick gets another chance.
            warn!("Scheduled batch failed: {}", e);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_is_clamped() {
        assert_eq!(interval_duration(0), Duration::from_secs(3600));
        assert_eq!(interval_duration(6), Duration::from_secs(6 * 3600));
        assert_eq!(
            interval_duration(u64::MAX),
            Duration::from_secs(MAX_INTERVAL_HOURS * 3600)
        );
    }
}
