//! chitchat - interactive Chit Chat client
//!
//! Usage: `chitchat [address]` (default `127.0.0.1:5050`). Set
//! `CHITCHAT_USERNAME` to skip the username prompt.

use anyhow::Context;
use chitchat_proto::ValidationError;
use chitchat_proto::client::{self, ClientError};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const DEFAULT_ADDRESS: &str = "127.0.0.1:5050";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so they don't interleave with the chat on stdout
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let address = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_ADDRESS.to_string());

    let mut lines = BufReader::new(tokio::io::stdin()).split(b'\n');

    let requested = match std::env::var("CHITCHAT_USERNAME") {
        Ok(name) => name,
        Err(_) => {
            print!("Enter username: ");
            std::io::stdout().flush()?;
            lines
                .next_segment()
                .await?
                .map(|raw| String::from_utf8_lossy(&raw).into_owned())
                .unwrap_or_default()
        }
    };

    let (mut outbound, inbound) = client::connect(address.as_str(), &requested)
        .await
        .with_context(|| format!("could not connect to {address}"))?;
    let join = outbound.join().await?;
    info!(
        address = %address,
        identity = %outbound.identity(),
        lamport = join.lamport_timestamp,
        "Join sent"
    );

    // Receive failure is fatal: there is no reconnect.
    tokio::spawn(async move {
        let e = inbound
            .run(|delivery| println!("{}", delivery.message))
            .await;
        error!(error = %e, "Receive failed");
        std::process::exit(1);
    });

    println!();
    while let Some(raw) = lines.next_segment().await? {
        let text = raw.trim_ascii();
        if text.is_empty() {
            continue;
        }
        if text.eq_ignore_ascii_case(b"exit") {
            println!("Bye!");
            break;
        }

        match outbound.send(text).await {
            Ok(_) => {}
            Err(ClientError::Rejected(e)) => {
                println!("Error: {}", rejection_text(&e));
                info!(reason = e.reason(), error = %e, "Message rejected");
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(())
}

/// What the user sees for a refused line.
fn rejection_text(e: &ValidationError) -> String {
    match e {
        ValidationError::InvalidUtf8 { .. } => "Message is not valid UTF-8".to_string(),
        ValidationError::TooLong { limit, .. } => format!("Message exceeds {limit} bytes"),
        other => other.to_string(),
    }
}
