pub mod analyzers;
pub mod animation;
pub mod archive;
pub mod catalogue;
pub mod chart;
pub mod fetch;
pub mod output;
pub mod placement;
pub mod schedule;
