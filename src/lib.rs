//! frozen-audit - polar-code frozen-bit selection and cross-run agreement
//!
//! Given per-channel BER tables from several simulator runs, this library
//! selects the frozen set of every run, checks whether the runs agree on it,
//! and measures how consistently the runs order the channels (Spearman rank
//! correlation and per-channel rank variance).

pub mod agreement;
pub mod analysis;
pub mod cli;
pub mod config;
pub mod csv_output;
pub mod density;
pub mod freezer;
pub mod html_output;
pub mod json_output;
pub mod loader;
pub mod pattern;
pub mod rank;
pub mod run;
pub mod run_stats;
