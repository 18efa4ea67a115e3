//! Process lifecycle: connection state and shutdown signals.

use std::time::Duration;

use log::info;
use strum::Display;

use crate::error::{BotError, Result};

/// How long shutdown may take before it is abandoned.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Phase {
    Idle,
    Connected,
    ShuttingDown,
    Stopped,
}

/// Tracks the bot's phase and rejects out-of-order transitions.
#[derive(Debug)]
pub struct Lifecycle {
    phase: Phase,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl Lifecycle {
    #[must_use]
    pub fn new() -> Self {
        Self { phase: Phase::Idle }
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn advance(&mut self, to: Phase) -> Result<()> {
        let allowed = matches!(
            (self.phase, to),
            (Phase::Idle | Phase::Connected, Phase::ShuttingDown)
                | (Phase::Idle, Phase::Connected)
                | (Phase::ShuttingDown, Phase::Stopped)
        );
        if !allowed {
            return Err(BotError::InvalidTransition {
                from: self.phase,
                to,
            });
        }

        info!("Lifecycle: {} -> {to}", self.phase);
        self.phase = to;
        Ok(())
    }
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
pub async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(e) => {
                log::warn!("Failed to install SIGTERM handler, listening for Ctrl-C only: {e}");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normal_run_walks_every_phase() -> Result<()> {
        let mut lifecycle = Lifecycle::new();
        assert_eq!(lifecycle.phase(), Phase::Idle);
        lifecycle.advance(Phase::Connected)?;
        lifecycle.advance(Phase::ShuttingDown)?;
        lifecycle.advance(Phase::Stopped)?;
        assert_eq!(lifecycle.phase(), Phase::Stopped);
        Ok(())
    }

    #[test]
    fn signal_before_ready_skips_connected() -> Result<()> {
        let mut lifecycle = Lifecycle::new();
        lifecycle.advance(Phase::ShuttingDown)?;
        lifecycle.advance(Phase::Stopped)?;
        Ok(())
    }

    #[test]
    fn rejects_out_of_order_transitions() {
        let mut lifecycle = Lifecycle::new();
        assert!(matches!(
            lifecycle.advance(Phase::Stopped),
            Err(BotError::InvalidTransition {
                from: Phase::Idle,
                to: Phase::Stopped
            })
        ));
        assert_eq!(lifecycle.phase(), Phase::Idle);
    }

    #[test]
    fn stopped_is_terminal() -> Result<()> {
        let mut lifecycle = Lifecycle::new();
        lifecycle.advance(Phase::ShuttingDown)?;
        lifecycle.advance(Phase::Stopped)?;
        for to in [Phase::Idle, Phase::Connected, Phase::ShuttingDown, Phase::Stopped] {
            assert!(lifecycle.advance(to).is_err());
        }
        Ok(())
    }
}
