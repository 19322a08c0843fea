// ------------------------------------------------------------
// Module declarations
// ------------------------------------------------------------
//
// Each module represents a well-defined responsibility:
//
// - config:      Configuration structs loaded from JSON
// - schema:      Strongly typed device status document
// - util:        Shared helpers (URL construction)
// - collector:   Probe collector (describe, fetch, sample mapping)
// - exposition:  Per-probe registry and text rendering
// - metrics:     Exporter self-metrics (default registry)
// - error:       Probe failure taxonomy and HTTP mapping
// - server:      HTTP router and listener
//
pub mod collector;
pub mod config;
pub mod error;
pub mod exposition;
pub mod metrics;
pub mod schema;
pub mod server;
pub mod util;
