//! Column selection transformers for named-column frames.
//!
//! | Transformer | Description |
//! |-------------|-------------|
//! | [`DropColumns`] | Remove named columns, keep everything else in order |

pub mod drop;

pub use drop::{DropColumns, DropColumnsConfig, UnknownColumns};
