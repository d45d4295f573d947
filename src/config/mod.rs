//! Configuration for the scanning engine.

mod settings;

pub use settings::{
    ScanSettings, DEFAULT_MAX_WORKERS, DEFAULT_PROBE_TIMEOUT, DEFAULT_UDP_PROBE_COUNT,
};
