//! Transformation module.
//!
//! - Decoder: grid rows to typed records
//! - Serializer: records to an index-keyed JSON document
//! - Pipeline: end-to-end conversion

pub mod decoder;
pub mod pipeline;
pub mod serializer;

pub use decoder::{decode_grid, decode_rows, resolve_column_types, DecodedRows};
pub use pipeline::*;
pub use serializer::{document_key, serialize_document, Document};
