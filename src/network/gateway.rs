//! Gateway - TCP listener that accepts incoming connections.
//!
//! The Gateway binds the configured socket and spawns a Connection task for
//! each incoming participant.

use crate::config::LimitsConfig;
use crate::network::Connection;
use crate::state::Relay;
use crate::telemetry::spans;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{Instrument, error, info, instrument};

/// The Gateway accepts incoming TCP connections and spawns handlers.
pub struct Gateway {
    listener: TcpListener,
    limits: LimitsConfig,
    relay: Arc<Relay>,
}

impl Gateway {
    /// Bind the gateway to the specified address.
    pub async fn bind(
        addr: SocketAddr,
        limits: LimitsConfig,
        relay: Arc<Relay>,
    ) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        info!(address = %listener.local_addr()?, "Listener bound");

        Ok(Self {
            listener,
            limits,
            relay,
        })
    }

    /// Run the gateway, accepting connections forever.
    #[instrument(skip(self), name = "gateway")]
    pub async fn run(self) -> anyhow::Result<()> {
        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    if let Err(e) = stream.set_nodelay(true) {
                        error!(%addr, error = %e, "Failed to set TCP_NODELAY");
                    }

                    let uid = self.relay.next_uid();
                    info!(%uid, %addr, "Connection accepted");

                    let connection = Connection::tcp(
                        uid.clone(),
                        stream,
                        addr,
                        Arc::clone(&self.relay),
                        &self.limits,
                    );
                    tokio::spawn(
                        async move {
                            if let Err(e) = connection.run().await {
                                error!(error = %e, "Connection error");
                            }
                            info!("Connection closed");
                        }
                        .instrument(spans::connection(&uid, &addr.to_string())),
                    );
                }
                Err(e) => {
                    error!(error = %e, "Failed to accept connection");
                }
            }
        }
    }
}
