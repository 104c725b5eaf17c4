//! Trade Recording Module
//!
//! - `TradeRecorder` trait - Pluggable recorder interface
//! - `CsvRecorder` - CSV journal written off the async runtime
//! - `TracingRecorder` - Structured log events
//! - `MultiRecorder` - Fan-out to several backends

pub mod csv_recorder;
pub mod recorder;
pub mod tracing_recorder;

pub use csv_recorder::CsvRecorder;
pub use recorder::{MultiRecorder, RecordError, TradeRecord, TradeRecorder};
pub use tracing_recorder::TracingRecorder;
