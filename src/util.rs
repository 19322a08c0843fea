//! Utility helpers shared by the collector and the server.
//!
//! IMPORTANT:
//! - No device-specific decoding should live here.
//! - This module must remain lightweight and deterministic.
//!

/// Path of the device status document.
pub const STATUS_PATH: &str = "/status/";

/// Build the status URL for a probe target.
///
/// Input:
/// - target: `host` or `host:port`, exactly as received from the caller
///
/// Examples:
/// - "10.0.0.5"         -> "http://10.0.0.5/status/"
/// - "shelly.lan:8080"  -> "http://shelly.lan:8080/status/"
///
/// NOTE:
/// The target is not validated here. Whether the result is a usable
/// URL is decided when the request is built.
///
pub fn status_url(target: &str) -> String {
    format!("http://{target}{STATUS_PATH}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_status_url() {
        assert_eq!(status_url("10.0.0.5"), "http://10.0.0.5/status/");
        assert_eq!(status_url("shelly.lan:8080"), "http://shelly.lan:8080/status/");
    }

    #[test]
    fn empty_target_is_passed_through() {
        assert_eq!(status_url(""), "http:///status/");
    }
}
