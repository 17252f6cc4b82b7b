//! CLI command implementations

pub(crate) mod check;
pub(crate) mod common;
pub(crate) mod db;
pub(crate) mod dbml;
pub(crate) mod flatten;
pub(crate) mod migrate;
pub(crate) mod seed;
