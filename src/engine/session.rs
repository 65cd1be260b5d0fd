//! Session driver: connection lifecycle around the trade sequencer

use tracing::{error, info, warn};

use super::keepalive::spawn_keepalive;
use super::sequencer::{SequencerStats, SessionEnd, TradeSequencer};
use super::RunMode;
use crate::config::SessionConfig;
use crate::error::{Error, Result};
use crate::stream::{Connection, Transport};
use crate::trading::Executor;

pub struct SessionDriver<T: Transport, E: Executor> {
    transport: T,
    sequencer: TradeSequencer<E>,
    session: SessionConfig,
    connections: u64,
}

impl<T: Transport, E: Executor> SessionDriver<T, E> {
    pub fn new(transport: T, sequencer: TradeSequencer<E>, session: SessionConfig) -> Self {
        Self {
            transport,
            sequencer,
            session,
            connections: 0,
        }
    }

    pub fn stats(&self) -> SequencerStats {
        self.sequencer.stats()
    }

    /// Successful connects so far
    pub fn connections(&self) -> u64 {
        self.connections
    }

    /// Run according to the configured mode.
    ///
    /// Single-shot returns after one cycle. Continuous never returns.
    pub async fn run(&mut self) -> Result<SequencerStats> {
        match self.sequencer.options().mode {
            RunMode::Once => self.run_once().await,
            RunMode::Continuous => self.run_continuous().await,
        }
    }

    async fn run_once(&mut self) -> Result<SequencerStats> {
        let mut connection = self.transport.connect().await?;
        self.connections += 1;
        info!("Connected, single-shot mode");

        match self.drive(connection.as_mut()).await {
            SessionEnd::Terminated => {
                info!("Trade cycle finished, exiting");
                Ok(self.stats())
            }
            SessionEnd::Disconnected(reason) => {
                warn!("Connection lost before the cycle finished: {}", reason);
                Err(Error::StreamClosed(reason))
            }
        }
    }

    async fn run_continuous(&mut self) -> Result<SequencerStats> {
        let backoff = self.session.reconnect_backoff();
        loop {
            self.sequencer.reset();
            match self.transport.connect().await {
                Ok(mut connection) => {
                    self.connections += 1;
                    info!("Connected (session #{}), continuous mode", self.connections);
                    if let SessionEnd::Disconnected(reason) = self.drive(connection.as_mut()).await {
                        warn!("Connection closed: {}", reason);
                    }
                    let stats = self.stats();
                    info!(
                        "Totals: {} completed, {} rejected, {} faulted",
                        stats.cycles_completed, stats.rejected, stats.faulted
                    );
                }
                Err(e) => error!("Connection failed: {}", e),
            }

            info!("Reconnecting in {} seconds...", backoff.as_secs());
            tokio::time::sleep(backoff).await;
        }
    }

    /// One connection lifetime: keep-alive, cycles, close
    async fn drive(&mut self, connection: &mut dyn Connection) -> SessionEnd {
        let keepalive = spawn_keepalive(connection.keepalive(), self.session.ping_interval());

        let end = self.sequencer.run_session(connection).await;

        keepalive.stop();
        if let Err(e) = connection.close().await {
            warn!("Error closing connection: {}", e);
        }
        end
    }
}
