// Razer Chroma Linux driver - shared library
// Configuration and device discovery used by the chromactl binary

pub mod config;
pub mod devices;

pub use config::{ConfigError, DriverConfig};
pub use devices::{find_devices, open_device, FoundDevice};
