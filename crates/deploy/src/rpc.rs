//! Shared RPC utilities for interacting with Ethereum JSON-RPC endpoints.

use std::time::Duration;

use anyhow::Context;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Default timeout for RPC requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default interval between polling attempts when waiting for readiness.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Create an HTTP client configured for JSON-RPC requests.
pub fn create_client() -> Result<reqwest::Client, anyhow::Error> {
    reqwest::Client::builder()
        .timeout(DEFAULT_TIMEOUT)
        .build()
        .context("Failed to create HTTP client")
}

/// Make a JSON-RPC call and deserialize the result.
pub async fn json_rpc_call<T: DeserializeOwned>(
    client: &reqwest::Client,
    url: &str,
    method: &str,
    params: Vec<Value>,
) -> Result<T, anyhow::Error> {
    let response = client
        .post(url)
        .json(&serde_json::json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": 1
        }))
        .send()
        .await
        .with_context(|| format!("Failed to send {} request", method))?;

    let result: Value = response
        .json()
        .await
        .with_context(|| format!("Failed to parse {} response", method))?;

    if let Some(error) = result.get("error") {
        anyhow::bail!(
            "RPC error: {}",
            error
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("unknown")
        );
    }

    let result_value = result
        .get("result")
        .context("No result in response")?
        .clone();

    serde_json::from_value(result_value)
        .with_context(|| format!("Failed to deserialize {} result", method))
}

/// Query the chain ID of the node at `url`.
pub async fn chain_id(client: &reqwest::Client, url: &str) -> Result<u64, anyhow::Error> {
    let id_hex: String = json_rpc_call(client, url, "eth_chainId", vec![]).await?;
    u64::from_str_radix(id_hex.trim_start_matches("0x"), 16)
        .context("Failed to parse eth_chainId result as hex")
}

/// Wait for the node at `url` to answer `eth_chainId`.
///
/// Used as a pre-deploy readiness probe so the plan fails fast with a clear
/// message when the target endpoint is not up, rather than on the first
/// creation transaction.
pub async fn wait_for_chain(url: &str, timeout_secs: u64) -> Result<u64, anyhow::Error> {
    let client = create_client()?;
    let start = std::time::Instant::now();
    let max_duration = Duration::from_secs(timeout_secs);

    loop {
        match chain_id(&client, url).await {
            Ok(id) => return Ok(id),
            Err(e) => {
                if start.elapsed() > max_duration {
                    return Err(e.context(format!("Timeout waiting for RPC endpoint: {}", url)));
                }
                tracing::trace!(error = %e, url = %url, "Chain not ready, retrying...");
            }
        }

        tokio::time::sleep(DEFAULT_POLL_INTERVAL).await;
    }
}
