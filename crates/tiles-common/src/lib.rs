//! Shared domain types for the attention visualization tiling pipeline.
//!
//! This crate holds the vocabulary the engine and the formatter service
//! agree on: windowing configurations, the attention-layer table with
//! its position-based head-count rule, (date, time) slot keys, and the
//! common error type.

pub mod error;
pub mod field_spec;
pub mod layer;
pub mod time;
pub mod window;

pub use error::{TilesError, TilesResult};
pub use field_spec::FieldSpec;
pub use layer::{head_count, layer_name, safe_layer_name, ATTENTION_LAYER_NAMES};
pub use time::{date_range, TimeSlot};
pub use window::{surface_configs, upper_configs, WindowConfig};
