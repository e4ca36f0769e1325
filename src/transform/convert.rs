//! Bidirectional conversion between host values and native slot data.
//!
//! The transform kind is decided once at classification time; these
//! functions dispatch on that tag, never on the runtime shape of a value
//! already inside a buffer.

use crate::error::{Error, Result};
use crate::session::{NativeDatum, ObjectTypeInfo, SessionRef};
use crate::transform::TransformKind;
use crate::value::{CursorRef, HostValue, LobKind, LobRef, ObjectRef, StatementRef};
use bytes::Bytes;
use std::sync::Arc;

fn expected(kind: TransformKind, value: &HostValue) -> Error {
    Error::wrong_type(format!("expecting {} value, got {:?}", kind, value))
}

/// Encode a non-null host value into the byte payload of a byte-oriented
/// transform kind.
pub fn encode_bytes(kind: TransformKind, value: &HostValue) -> Result<Bytes> {
    match (kind, value) {
        (
            TransformKind::String | TransformKind::FixedChar | TransformKind::LongString,
            HostValue::String(s),
        ) => Ok(Bytes::copy_from_slice(s.as_bytes())),
        (TransformKind::Binary | TransformKind::LongBinary, HostValue::Bytes(b)) => {
            Ok(Bytes::copy_from_slice(b))
        }
        (TransformKind::Rowid, HostValue::String(s)) => Ok(Bytes::copy_from_slice(s.as_bytes())),
        _ => Err(expected(kind, value)),
    }
}

/// Transform a non-null host value into the native slot representation of
/// a fixed-size transform kind.
pub fn encode_scalar(kind: TransformKind, value: &HostValue) -> Result<NativeDatum> {
    match (kind, value) {
        (TransformKind::Int, HostValue::Integer(i)) => Ok(NativeDatum::Int64(*i)),
        (TransformKind::Double, HostValue::Double(d)) => Ok(NativeDatum::Double(*d)),
        (TransformKind::Double, HostValue::Integer(i)) => Ok(NativeDatum::Double(*i as f64)),
        (TransformKind::Boolean, HostValue::Boolean(b)) => Ok(NativeDatum::Boolean(*b)),
        (TransformKind::Timestamp, HostValue::Timestamp(dt)) => Ok(NativeDatum::Timestamp(*dt)),
        (
            TransformKind::Clob | TransformKind::Nclob | TransformKind::Blob | TransformKind::Bfile,
            HostValue::Lob(lob),
        ) => {
            if lob.kind().transform() != kind {
                return Err(Error::wrong_type(format!(
                    "expecting {} locator, got {}",
                    kind,
                    lob.kind()
                )));
            }
            Ok(NativeDatum::Lob(lob.id()))
        }
        (TransformKind::Object, HostValue::Object(obj)) => Ok(NativeDatum::Object(obj.id())),
        _ => Err(expected(kind, value)),
    }
}

fn lob_kind(kind: TransformKind) -> LobKind {
    match kind {
        TransformKind::Clob => LobKind::Clob,
        TransformKind::Nclob => LobKind::Nclob,
        TransformKind::Bfile => LobKind::Bfile,
        _ => LobKind::Blob,
    }
}

/// Decode a native slot into a host value.
///
/// LOB, object and statement payloads get their native reference count
/// bumped here, so the returned handle outlives any later reuse of the
/// buffer slot it was read from.
pub fn decode(
    session: &SessionRef,
    kind: TransformKind,
    object_type: Option<&Arc<ObjectTypeInfo>>,
    datum: NativeDatum,
) -> Result<HostValue> {
    match (kind, datum) {
        (_, NativeDatum::Null) => Ok(HostValue::Null),
        (
            TransformKind::String
            | TransformKind::FixedChar
            | TransformKind::LongString
            | TransformKind::Rowid,
            NativeDatum::Bytes(b),
        ) => {
            let s = std::str::from_utf8(&b)
                .map_err(|e| Error::wrong_type(format!("invalid UTF-8 in {} buffer: {}", kind, e)))?;
            Ok(HostValue::String(s.to_string()))
        }
        (TransformKind::Binary | TransformKind::LongBinary, NativeDatum::Bytes(b)) => {
            Ok(HostValue::Bytes(b.to_vec()))
        }
        (TransformKind::Int, NativeDatum::Int64(i)) => Ok(HostValue::Integer(i)),
        (TransformKind::Double, NativeDatum::Double(d)) => Ok(HostValue::Double(d)),
        (TransformKind::Boolean, NativeDatum::Boolean(b)) => Ok(HostValue::Boolean(b)),
        (TransformKind::Timestamp, NativeDatum::Timestamp(dt)) => Ok(HostValue::Timestamp(dt)),
        (
            TransformKind::Clob | TransformKind::Nclob | TransformKind::Blob | TransformKind::Bfile,
            NativeDatum::Lob(id),
        ) => Ok(HostValue::Lob(LobRef::from_buffer(
            session,
            lob_kind(kind),
            id,
        ))),
        (TransformKind::Object, NativeDatum::Object(id)) => {
            let type_info = object_type.ok_or_else(|| {
                Error::programming("object variable is missing its type metadata")
            })?;
            Ok(HostValue::Object(ObjectRef::from_buffer(
                session,
                Arc::clone(type_info),
                id,
            )))
        }
        (TransformKind::Cursor, NativeDatum::Statement(id)) => Ok(HostValue::Cursor(
            CursorRef::with_statement(StatementRef::from_buffer(session, id)),
        )),
        (kind, datum) => Err(Error::programming(format!(
            "native slot {:?} does not match variable type {}",
            datum, kind
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_string() {
        let b = encode_bytes(
            TransformKind::String,
            &HostValue::String("hello".to_string()),
        )
        .unwrap();
        assert_eq!(&b[..], b"hello");
    }

    #[test]
    fn test_encode_bytes_rejects_mismatch() {
        let err = encode_bytes(TransformKind::Binary, &HostValue::String("x".to_string()));
        assert!(matches!(err, Err(Error::WrongType { .. })));
    }

    #[test]
    fn test_encode_scalar_int_widens_to_double() {
        assert_eq!(
            encode_scalar(TransformKind::Double, &HostValue::Integer(3)).unwrap(),
            NativeDatum::Double(3.0)
        );
    }

    #[test]
    fn test_encode_scalar_rejects_mismatch() {
        let err = encode_scalar(TransformKind::Int, &HostValue::Boolean(true));
        assert!(matches!(err, Err(Error::WrongType { .. })));
    }
}
