use crate::schema::DeviceStatus;

/// Kind of a metric, as exposed to the metrics library.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    /// Value may go up and down
    Gauge,

    /// Value is monotonically non-decreasing until the device resets
    Counter,
}

/// Static descriptor of one exported metric.
///
/// Descriptors carry no label dimensions. They are plain values and are
/// rebuilt for every probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricDesc {
    pub name: &'static str,
    pub help: &'static str,
    pub kind: MetricKind,
}

pub const POWER: MetricDesc = MetricDesc {
    name: "shelly_power_watts",
    help: "Current power consumption in watts.",
    kind: MetricKind::Gauge,
};

pub const TOTAL_POWER: MetricDesc = MetricDesc {
    name: "shelly_total_power_watts",
    help: "Total power consumption in watts since reboot.",
    kind: MetricKind::Counter,
};

pub const TEMPERATURE: MetricDesc = MetricDesc {
    name: "shelly_temperature",
    help: "Current temperature of shelly device in celcius.",
    kind: MetricKind::Gauge,
};

pub const UPTIME: MetricDesc = MetricDesc {
    name: "shelly_uptime",
    help: "Total uptime of shelly device in seconds.",
    kind: MetricKind::Gauge,
};

/// All descriptors, in emission order.
pub const DESCRIPTORS: [MetricDesc; 4] = [POWER, TOTAL_POWER, TEMPERATURE, UPTIME];

/// One emitted value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub desc: MetricDesc,
    pub value: f64,
}

impl Sample {
    pub fn name(&self) -> &'static str {
        self.desc.name
    }

    pub fn kind(&self) -> MetricKind {
        self.desc.kind
    }
}

/// Lazily map a status document into samples.
///
/// ORDER:
/// - `(power, total_power)` for every meter, in device order
/// - then temperature
/// - then uptime
///
/// A status with N meters always yields 2N + 2 samples.
pub fn samples(status: &DeviceStatus) -> impl Iterator<Item = Sample> + '_ {
    status
        .meters
        .iter()
        .flat_map(|m| {
            [
                Sample {
                    desc: POWER,
                    value: m.power,
                },
                Sample {
                    desc: TOTAL_POWER,
                    value: m.total,
                },
            ]
        })
        .chain([
            Sample {
                desc: TEMPERATURE,
                value: status.tmp.t_c,
            },
            Sample {
                desc: UPTIME,
                value: status.uptime,
            },
        ])
}
