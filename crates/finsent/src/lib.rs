#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/troyonix/finsent/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod config;
pub mod layout;
pub mod universe;

pub use config::{Config, ConfigError, DEFAULT_CONFIG_PATH};
pub use layout::{DataLayout, count_files};
pub use universe::{Company, CompanyUniverse};

// Re-export sub-crates
pub use finsent_corpus as corpus;
pub use finsent_data as data;
pub use finsent_model as model;
pub use finsent_output as output;

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
