//! Upstream HTTP client.

use std::time::Duration;

use reqwest::redirect::Policy;

use crate::config::schema::{TimeoutConfig, UpstreamConfig};

/// Build the client shared by the forwarding engine and the token minter.
///
/// Redirects are relayed, not followed, and bodies are never decompressed
/// (`accept-encoding` is stripped from forwarded requests instead).
pub fn build_client(
    timeouts: &TimeoutConfig,
    upstream: &UpstreamConfig,
) -> Result<reqwest::Client, reqwest::Error> {
    let mut builder = reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(timeouts.connect_secs))
        .timeout(Duration::from_secs(timeouts.upstream_secs))
        .redirect(Policy::none());

    if !upstream.use_system_proxy {
        builder = builder.no_proxy();
    }

    builder.build()
}
