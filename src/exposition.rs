//! Bridge between probe samples and the `prometheus` crate.
//!
//! Every probe renders through its own `Registry`, so descriptors of
//! different probes never meet.

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::OnceCell;

use prometheus::core::{Collector, Desc};
use prometheus::proto::{Counter, Gauge, Metric, MetricFamily, MetricType};
use prometheus::{Encoder, Registry, TextEncoder};

use crate::collector::{
    Snapshot,
    sample::{MetricDesc, MetricKind},
};
use crate::error::ProbeError;

/// Buffer capacity for one probe. Probe output is a handful of lines.
const BUFFER_CAP: usize = 4 * 1024;

/// Per-probe collector registered before the device is fetched.
///
/// Families stay empty until `ProbeRegistry::render` fills them from
/// a snapshot, so registration never depends on the fetch.
struct ProbeSamples {
    descs: Vec<Desc>,
    families: Arc<OnceCell<Vec<MetricFamily>>>,
}

impl Collector for ProbeSamples {
    fn desc(&self) -> Vec<&Desc> {
        self.descs.iter().collect()
    }

    fn collect(&self) -> Vec<MetricFamily> {
        self.families.get().cloned().unwrap_or_default()
    }
}

/// Isolated registry for exactly one probe.
///
/// Built from the collector's descriptors before any network I/O: a
/// descriptor the registry refuses fails the probe without a request.
pub struct ProbeRegistry {
    registry: Registry,
    descriptors: Vec<MetricDesc>,
    families: Arc<OnceCell<Vec<MetricFamily>>>,
}

impl ProbeRegistry {
    pub fn new(descriptors: &[MetricDesc]) -> Result<Self, ProbeError> {
        let descs = descriptors
            .iter()
            .map(|d| Desc::new(d.name.to_string(), d.help.to_string(), vec![], HashMap::new()))
            .collect::<prometheus::Result<Vec<_>>>()?;

        let families = Arc::new(OnceCell::new());
        let registry = Registry::new();
        registry.register(Box::new(ProbeSamples {
            descs,
            families: families.clone(),
        }))?;

        Ok(Self {
            registry,
            descriptors: descriptors.to_vec(),
            families,
        })
    }

    /// Fill the registered families from `snapshot` and encode them in
    /// the text exposition format. Consumes the registry.
    pub fn render(self, snapshot: &Snapshot) -> Result<String, ProbeError> {
        let mut families: Vec<MetricFamily> = self.descriptors.iter().map(empty_family).collect();
        for sample in snapshot.samples() {
            if let Some(family) = families.iter_mut().find(|f| f.get_name() == sample.name()) {
                family.mut_metric().push(metric(sample.kind(), sample.value));
            }
        }

        // Only this call sets the cell, and `self` is consumed.
        let _ = self.families.set(families);
        encode(&self.registry.gather())
    }
}

fn empty_family(desc: &MetricDesc) -> MetricFamily {
    let mut family = MetricFamily::default();
    family.set_name(desc.name.to_string());
    family.set_help(desc.help.to_string());
    family.set_field_type(match desc.kind {
        MetricKind::Gauge => MetricType::GAUGE,
        MetricKind::Counter => MetricType::COUNTER,
    });
    family
}

fn metric(kind: MetricKind, value: f64) -> Metric {
    let mut m = Metric::default();
    match kind {
        MetricKind::Gauge => {
            let mut gauge = Gauge::default();
            gauge.set_value(value);
            m.set_gauge(gauge);
        }
        MetricKind::Counter => {
            let mut counter = Counter::default();
            counter.set_value(value);
            m.set_counter(counter);
        }
    }
    m
}

/// Encode the process-wide default registry (`/metrics`).
pub fn render_default() -> Result<String, ProbeError> {
    encode(&prometheus::gather())
}

fn encode(families: &[MetricFamily]) -> Result<String, ProbeError> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::with_capacity(BUFFER_CAP);
    encoder.encode(families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| ProbeError::Render(prometheus::Error::Msg(e.to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::sample::DESCRIPTORS;
    use crate::schema::DeviceStatus;

    fn snapshot(raw: &str) -> Snapshot {
        Snapshot::new(DeviceStatus::from_slice(raw.as_bytes()).unwrap())
    }

    /// Value lines (non-comment) as `(name, value)` pairs.
    fn values(text: &str) -> Vec<(String, f64)> {
        text.lines()
            .filter(|l| !l.starts_with('#') && !l.is_empty())
            .map(|l| {
                let (name, value) = l.rsplit_once(' ').unwrap();
                (name.to_string(), value.parse().unwrap())
            })
            .collect()
    }

    #[test]
    fn renders_reference_document() {
        let snap = snapshot(r#"{"tmp":{"tC":21.5},"uptime":3600,"meters":[{"power":10.2,"total":5000.0}]}"#);
        let text = ProbeRegistry::new(&DESCRIPTORS).unwrap().render(&snap).unwrap();

        assert!(text.contains("# TYPE shelly_power_watts gauge"));
        assert!(text.contains("# TYPE shelly_total_power_watts counter"));
        assert!(text.contains("# TYPE shelly_temperature gauge"));
        assert!(text.contains("# TYPE shelly_uptime gauge"));
        assert!(text.contains("# HELP shelly_uptime Total uptime of shelly device in seconds."));

        let mut got = values(&text);
        got.sort_by(|a, b| a.0.cmp(&b.0));
        assert_eq!(
            got,
            [
                ("shelly_power_watts".to_string(), 10.2),
                ("shelly_temperature".to_string(), 21.5),
                ("shelly_total_power_watts".to_string(), 5000.0),
                ("shelly_uptime".to_string(), 3600.0),
            ]
        );
    }

    #[test]
    fn multiple_meters_stay_in_device_order() {
        let snap = snapshot(
            r#"{"tmp":{"tC":1},"uptime":2,"meters":[{"power":3,"total":30},{"power":4,"total":40},{"power":5,"total":50}]}"#,
        );
        let text = ProbeRegistry::new(&DESCRIPTORS).unwrap().render(&snap).unwrap();
        let got = values(&text);

        assert_eq!(got.len(), 3 * 2 + 2);
        let powers: Vec<_> = got
            .iter()
            .filter(|(n, _)| n == "shelly_power_watts")
            .map(|(_, v)| *v)
            .collect();
        assert_eq!(powers, [3.0, 4.0, 5.0]);
        let totals: Vec<_> = got
            .iter()
            .filter(|(n, _)| n == "shelly_total_power_watts")
            .map(|(_, v)| *v)
            .collect();
        assert_eq!(totals, [30.0, 40.0, 50.0]);
    }

    #[test]
    fn no_meters_renders_temperature_and_uptime() {
        let snap = snapshot(r#"{"tmp":{"tC":19.0},"uptime":10,"meters":[]}"#);
        let text = ProbeRegistry::new(&DESCRIPTORS).unwrap().render(&snap).unwrap();

        let names: Vec<_> = values(&text).into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["shelly_temperature", "shelly_uptime"]);
    }

    #[test]
    fn registries_are_isolated() {
        let a = ProbeRegistry::new(&DESCRIPTORS).unwrap();
        let b = ProbeRegistry::new(&DESCRIPTORS).unwrap();

        assert!(a.render(&snapshot(r#"{"uptime":1}"#)).unwrap().contains("shelly_uptime 1"));
        assert!(b.render(&snapshot(r#"{"uptime":2}"#)).unwrap().contains("shelly_uptime 2"));
    }

    #[test]
    fn invalid_descriptor_is_rejected_at_registration() {
        let bad = MetricDesc {
            name: "shelly power watts",
            help: "Not a valid metric name.",
            kind: MetricKind::Gauge,
        };
        let err = ProbeRegistry::new(&[bad]).err().unwrap();
        assert!(matches!(err, ProbeError::Render(_)), "{err}");
    }

    #[test]
    fn registered_families_are_empty_until_rendered() {
        let registry = ProbeRegistry::new(&DESCRIPTORS).unwrap();
        assert!(registry.registry.gather().is_empty());
    }
}
