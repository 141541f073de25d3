//! Port traits (interfaces between domain and adapters).

pub mod data_port;
pub mod config_port;
pub mod report_port;
