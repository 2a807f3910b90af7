//! # LatencyLib
//!
//! Latencylib loads memory access latency measurements and plots them against the cache sizes of
//! the machine they were taken on
//!
//! The measurements are produced by a benchmark which walks arrays of growing size both randomly
//! and sequentially. Plotting the two latencies on a log-log chart with the cache boundaries drawn
//! in shows where each cache level stops fitting the array

/// Contains the cache boundaries drawn onto the chart, and the fixed boundaries of the measured CPU
pub mod boundaries;

/// Contains definitions for the JSON cache hierarchy format, which can replace the fixed boundaries
pub mod config;

/// Contains the error types for loading, configuration and rendering
pub mod error;

/// Contains the file reader used when loading measurements
pub mod io;

/// Contains the measurement table and the CSV loader
pub mod measurements;

/// Contains the chart model and the renderer
pub mod plot;


/// Contains byte size formatting and parsing utilities.
pub mod util;
