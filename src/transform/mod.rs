//! Type transform registry: kind tags, classification and conversions.

mod convert;
mod kind;
mod registry;

pub use kind::{NativeCategory, StorageKind, TransformKind};
pub use registry::{classify_value, TypeDecl, VarSpec};

pub(crate) use convert::{decode, encode_bytes, encode_scalar};
pub(crate) use registry::classify_array_element;
