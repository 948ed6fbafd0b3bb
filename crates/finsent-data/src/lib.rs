#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/troyonix/finsent/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod cache;
pub mod edgar;
pub mod error;
pub mod fred;
mod http;

pub use error::{DataError, Result};
pub use http::DEFAULT_MAX_ATTEMPTS;

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
