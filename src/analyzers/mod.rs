//! Catalogue aggregation and selection.
//!
//! This module groups service rows by organisation, computes how many of
//! each organisation's services require attention, and picks out the
//! organisations and breakdowns each chart needs.

pub mod aggregate;
pub mod analyzer;
pub mod breakdown;
pub mod status;
pub mod types;
pub mod utility;
