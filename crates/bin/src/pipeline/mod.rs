//! Pipeline stages behind the CLI subcommands.

pub(crate) mod cache_manager;
pub(crate) mod collect;
pub(crate) mod model;
pub(crate) mod prepare;
