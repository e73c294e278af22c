//! Question answering over the stored index

mod pipeline;

pub use pipeline::{truncate_chars, QueryPipeline};
