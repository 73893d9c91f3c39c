//! Utilities for mysql_diff
//!
//! This module provides utility functions used across the library.

pub mod logging;
pub mod naming;

pub use naming::{index_name_from_column_spec, quote_identifier};
