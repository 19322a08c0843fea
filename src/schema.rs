use serde::Deserialize;
use serde::de::Error as _;
use serde_json::Value;

/// Status document returned by `GET http://<target>/status/`.
///
/// Only the fields the exporter maps into metrics are modelled.
/// Unknown fields are ignored and missing fields read as zero, so
/// firmware revisions that add or drop keys still decode.
///
/// Expected shape:
///
/// ```text
/// { "tmp": {"tC": 21.5}, "uptime": 3600, "meters": [ {"power": 10.2, "total": 5000.0} ] }
/// ```
///
/// IMPORTANT:
/// - Values are the raw device-reported numbers, no unit conversion.
/// - A present-but-mistyped field (string, null, ...) fails decoding.
/// - The document, `tmp` and each meter must be JSON objects. serde
///   would otherwise accept an array as a struct and default the
///   missing positions.
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct DeviceStatus {
    /// Internal temperature block
    pub tmp: Temperature,

    /// Seconds since device boot
    pub uptime: f64,

    /// Sub-meters in device order
    pub meters: Vec<MeterReading>,
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Temperature {
    /// Degrees Celsius
    #[serde(rename = "tC")]
    pub t_c: f64,
}

// ------------------------------------------------------------
// Meter reading
// ------------------------------------------------------------
//
// One entry of the `meters` array.
//
// `total` is cumulative since boot and resets when the device
// reboots. It is never tracked across scrapes.
//
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct MeterReading {
    /// Instantaneous power in watts
    pub power: f64,

    /// Cumulative power since boot
    pub total: f64,
}

impl DeviceStatus {
    /// Decode a raw response body.
    pub fn from_slice(body: &[u8]) -> serde_json::Result<Self> {
        let value: Value = serde_json::from_slice(body)?;
        check_shape(&value)?;
        serde_json::from_value(value)
    }
}

/// Reject non-object roots, `tmp` blocks and meter entries.
fn check_shape(value: &Value) -> serde_json::Result<()> {
    let root = value
        .as_object()
        .ok_or_else(|| not_an_object("status document"))?;

    if let Some(tmp) = root.get("tmp") {
        if !tmp.is_object() {
            return Err(not_an_object("tmp"));
        }
    }

    if let Some(Value::Array(meters)) = root.get("meters") {
        if meters.iter().any(|m| !m.is_object()) {
            return Err(not_an_object("meter entry"));
        }
    }

    Ok(())
}

fn not_an_object(what: &str) -> serde_json::Error {
    serde_json::Error::custom(format!("{what} must be a JSON object"))
}
