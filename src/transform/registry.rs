//! Classification of host values and declared types into variable specs.
//!
//! Given either a host value or a declared type descriptor, classification
//! produces the transform kind, array-ness, element byte size and element
//! capacity a new variable should be allocated with.

use crate::error::{Error, Result};
use crate::session::ObjectTypeInfo;
use crate::transform::TransformKind;
use crate::value::HostValue;
use crate::variable::Variable;
use std::sync::Arc;

/// Result of classifying a host value or declared type.
#[derive(Debug, Clone)]
pub struct VarSpec {
    /// Conversion strategy.
    pub transform: TransformKind,
    /// PL/SQL collection semantics.
    pub is_array: bool,
    /// Per-element byte size (0 selects the kind default).
    pub element_byte_size: u32,
    /// Number of element slots.
    pub element_capacity: u32,
    /// Object type metadata carried through from an object value.
    pub object_type: Option<Arc<ObjectTypeInfo>>,
}

impl VarSpec {
    fn scalar(transform: TransformKind, element_byte_size: u32, element_capacity: u32) -> Self {
        Self {
            transform,
            is_array: false,
            element_byte_size,
            element_capacity,
            object_type: None,
        }
    }
}

/// Declared type descriptor accepted by [`Variable::from_decl`].
#[derive(Debug)]
pub enum TypeDecl {
    /// Bare size: a string variable of that many bytes.
    Size(u32),
    /// Two-element array form `[element type, capacity]`.
    Array(Box<TypeDecl>, u32),
    /// Explicit transform kind.
    Kind(TransformKind),
    /// Structured object type.
    Object(Arc<ObjectTypeInfo>),
    /// An existing variable, passed through unchanged.
    Variable(Variable),
}

/// Classify a single non-sequence host value.
fn classify_scalar(value: &HostValue) -> Result<(TransformKind, u32, Option<Arc<ObjectTypeInfo>>)> {
    match value {
        HostValue::Null => Ok((TransformKind::String, 1, None)),
        HostValue::String(s) => Ok((TransformKind::String, s.len() as u32, None)),
        HostValue::Bytes(b) => Ok((TransformKind::Binary, b.len() as u32, None)),
        HostValue::Integer(_) => Ok((TransformKind::Int, 0, None)),
        HostValue::Double(_) => Ok((TransformKind::Double, 0, None)),
        HostValue::Boolean(_) => Ok((TransformKind::Boolean, 0, None)),
        HostValue::Timestamp(_) => Ok((TransformKind::Timestamp, 0, None)),
        HostValue::Lob(lob) => Ok((lob.kind().transform(), 0, None)),
        HostValue::Cursor(_) => Ok((TransformKind::Cursor, 0, None)),
        HostValue::Object(obj) => Ok((
            TransformKind::Object,
            0,
            Some(Arc::clone(obj.type_info())),
        )),
        HostValue::Array(_) => Err(Error::not_supported(
            "arrays of arrays are not supported by the native client",
        )),
    }
}

/// Classify a host value into the spec of the variable that would hold it.
///
/// `capacity_hint` reserves extra slots beyond what the value itself
/// needs; 0 means no reservation.
pub fn classify_value(value: &HostValue, capacity_hint: u32) -> Result<VarSpec> {
    match value {
        HostValue::Array(items) => {
            let mut transform = TransformKind::String;
            let mut byte_size = 1;
            let mut object_type = None;
            let mut classified = false;
            for item in items {
                if item.is_null() {
                    continue;
                }
                let (item_transform, item_size, item_object_type) = classify_scalar(item)?;
                if !classified {
                    transform = item_transform;
                    object_type = item_object_type;
                    byte_size = byte_size.max(item_size);
                    classified = true;
                } else if item_transform == transform {
                    byte_size = byte_size.max(item_size);
                }
                // mixed element kinds keep the first classification; the
                // set path reports the mismatch when the element is written
            }
            Ok(VarSpec {
                transform,
                is_array: true,
                element_byte_size: byte_size,
                element_capacity: (items.len() as u32).max(capacity_hint).max(1),
                object_type,
            })
        }
        _ => {
            let (transform, byte_size, object_type) = classify_scalar(value)?;
            Ok(VarSpec {
                object_type,
                ..VarSpec::scalar(transform, byte_size, capacity_hint.max(1))
            })
        }
    }
}

/// Classify the element type of a two-element array declaration.
pub(crate) fn classify_array_element(
    decl: &TypeDecl,
) -> Result<(TransformKind, Option<Arc<ObjectTypeInfo>>)> {
    match decl {
        TypeDecl::Kind(kind) => Ok((*kind, None)),
        TypeDecl::Object(type_info) => Ok((TransformKind::Object, Some(Arc::clone(type_info)))),
        TypeDecl::Array(..) => Err(Error::not_supported(
            "arrays of arrays are not supported by the native client",
        )),
        _ => Err(Error::programming(
            "expecting an array of two elements [type, numelems]",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_string_uses_encoded_length() {
        let spec = classify_value(&HostValue::String("héllo".to_string()), 0).unwrap();
        assert_eq!(spec.transform, TransformKind::String);
        assert_eq!(spec.element_byte_size, 6);
        assert_eq!(spec.element_capacity, 1);
        assert!(!spec.is_array);
    }

    #[test]
    fn test_classify_null_defaults_to_string() {
        let spec = classify_value(&HostValue::Null, 0).unwrap();
        assert_eq!(spec.transform, TransformKind::String);
        assert_eq!(spec.element_byte_size, 1);
    }

    #[test]
    fn test_classify_scalar_kinds() {
        assert_eq!(
            classify_value(&HostValue::Integer(1), 0).unwrap().transform,
            TransformKind::Int
        );
        assert_eq!(
            classify_value(&HostValue::Double(1.5), 0).unwrap().transform,
            TransformKind::Double
        );
        assert_eq!(
            classify_value(&HostValue::Boolean(true), 0)
                .unwrap()
                .transform,
            TransformKind::Boolean
        );
        assert_eq!(
            classify_value(&HostValue::Bytes(vec![1, 2, 3]), 0)
                .unwrap()
                .transform,
            TransformKind::Binary
        );
    }

    #[test]
    fn test_classify_capacity_hint() {
        let spec = classify_value(&HostValue::Integer(7), 50).unwrap();
        assert_eq!(spec.element_capacity, 50);
    }

    #[test]
    fn test_classify_array_from_first_non_null() {
        let spec = classify_value(
            &HostValue::Array(vec![
                HostValue::Null,
                HostValue::String("ab".to_string()),
                HostValue::String("abcd".to_string()),
            ]),
            0,
        )
        .unwrap();
        assert!(spec.is_array);
        assert_eq!(spec.transform, TransformKind::String);
        assert_eq!(spec.element_byte_size, 4);
        assert_eq!(spec.element_capacity, 3);
    }

    #[test]
    fn test_classify_empty_array_defaults_to_string() {
        let spec = classify_value(&HostValue::Array(vec![]), 5).unwrap();
        assert!(spec.is_array);
        assert_eq!(spec.transform, TransformKind::String);
        assert_eq!(spec.element_capacity, 5);
    }

    #[test]
    fn test_classify_nested_array_rejected() {
        let value = HostValue::Array(vec![HostValue::Array(vec![HostValue::Integer(1)])]);
        assert!(matches!(
            classify_value(&value, 0),
            Err(Error::NotSupported { .. })
        ));
    }

    #[test]
    fn test_array_element_decl_rejects_size() {
        assert!(matches!(
            classify_array_element(&TypeDecl::Size(10)),
            Err(Error::Programming { .. })
        ));
    }

    #[test]
    fn test_array_element_decl_rejects_nesting() {
        let decl = TypeDecl::Array(Box::new(TypeDecl::Kind(TransformKind::Int)), 3);
        assert!(matches!(
            classify_array_element(&decl),
            Err(Error::NotSupported { .. })
        ));
    }
}
