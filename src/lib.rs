pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use config::Settings;
pub use crate::core::container::{RunningServices, ServiceContainer, StreamListener};
pub use crate::core::engine::InetdEngine;
pub use crate::core::provisioner::{ProvisioningOutcome, Provisioner};
pub use utils::error::{InetdError, Result, SkipReason};
