use reqwest::{Client, Url};

use crate::{config::DeviceConfig, error::ProbeError, schema::DeviceStatus, util};

/// Build the outbound HTTP client used for device fetches.
///
/// The timeout covers the whole exchange (connect, headers, body).
/// The client is cheap to clone and shares its connection pool.
pub fn build_client(cfg: &DeviceConfig) -> reqwest::Result<Client> {
    Client::builder()
        .timeout(cfg.timeout())
        .user_agent(cfg.user_agent.clone())
        .build()
}

/// Resolve the status URL of `target`.
///
/// Rejects targets that do not produce an absolute URL with a host.
/// The empty target is rejected explicitly: URL parsing would otherwise
/// read `http:///status/` as host `status`.
pub fn resolve(target: &str) -> Result<Url, ProbeError> {
    let invalid = |reason: String| ProbeError::InvalidTarget {
        target: target.to_string(),
        reason,
    };

    if target.trim().is_empty() {
        return Err(invalid("empty target".to_string()));
    }

    let url = Url::parse(&util::status_url(target)).map_err(|e| invalid(e.to_string()))?;
    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(url),
        _ => Err(invalid("missing host".to_string())),
    }
}

/// Fetch and decode one status document.
///
/// Performs exactly one GET. There is no retry: any failure is returned
/// to the caller and ends the scrape.
///
/// FAILURES:
/// - timeout while connecting or reading      -> `Timeout`
/// - connection / DNS / protocol errors       -> `Transport`
/// - any non-2xx status (body is not decoded) -> `Status`
/// - body read failure                        -> `Body`
/// - JSON that does not fit `DeviceStatus`    -> `Decode`
///
pub async fn fetch_status(client: &Client, url: Url) -> Result<DeviceStatus, ProbeError> {
    log::info!("Retrieving data for scrape on: {url}");

    let res = client.get(url.clone()).send().await.map_err(|e| {
        if e.is_timeout() {
            ProbeError::Timeout {
                url: url.to_string(),
            }
        } else {
            ProbeError::Transport {
                url: url.to_string(),
                source: e,
            }
        }
    })?;

    let status = res.status();
    if !status.is_success() {
        return Err(ProbeError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let body = res.bytes().await.map_err(|e| {
        if e.is_timeout() {
            ProbeError::Timeout {
                url: url.to_string(),
            }
        } else {
            ProbeError::Body {
                url: url.to_string(),
                source: e,
            }
        }
    })?;

    DeviceStatus::from_slice(&body).map_err(|e| ProbeError::Decode {
        url: url.to_string(),
        source: e,
    })
}
