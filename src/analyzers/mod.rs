//! Trip statistics over condensed files.
//!
//! Every statistic is an independent streaming scan of one condensed file;
//! nothing is cached between calls and no scan holds the trips in memory.

pub mod aggregate;
pub mod types;
pub mod utility;
