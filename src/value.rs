//! Host-side dynamic value model.
//!
//! `HostValue` is the dynamically-typed value exchanged with callers.
//! Reference-counted native payloads (LOB locators, objects, nested
//! statements) surface as owned handle types built on
//! [`crate::session::PayloadRef`]; dropping the host value releases the
//! native reference it holds.

use crate::session::{ObjectTypeInfo, PayloadKind, PayloadRef, SessionRef, StatementInfo};
use crate::error::Result;
use crate::transform::TransformKind;
use chrono::NaiveDateTime;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

/// A dynamically-typed host value.
#[derive(Debug, Clone, PartialEq)]
pub enum HostValue {
    /// NULL.
    Null,
    /// Boolean value.
    Boolean(bool),
    /// Integer value.
    Integer(i64),
    /// Double-precision value.
    Double(f64),
    /// String value.
    String(String),
    /// Binary value.
    Bytes(Vec<u8>),
    /// Date/time value (no timezone).
    Timestamp(NaiveDateTime),
    /// LOB locator handle.
    Lob(LobRef),
    /// Nested cursor.
    Cursor(CursorRef),
    /// Structured object instance.
    Object(ObjectRef),
    /// Sequence of values (PL/SQL collection contents).
    Array(Vec<HostValue>),
}

impl HostValue {
    /// Check if the value is NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, HostValue::Null)
    }

    /// Try to get the value as a string reference.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            HostValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get the value as raw bytes.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            HostValue::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Try to convert to i64.
    pub fn to_i64(&self) -> Option<i64> {
        match self {
            HostValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Try to convert to f64.
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            HostValue::Double(d) => Some(*d),
            HostValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }
}

impl fmt::Display for HostValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostValue::Null => write!(f, "NULL"),
            HostValue::Boolean(b) => write!(f, "{}", b),
            HostValue::Integer(i) => write!(f, "{}", i),
            HostValue::Double(d) => write!(f, "{}", d),
            HostValue::String(s) => write!(f, "{}", s),
            HostValue::Bytes(b) => write!(f, "<RAW: {} bytes>", b.len()),
            HostValue::Timestamp(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
            HostValue::Lob(lob) => write!(f, "<{}: id {}>", lob.kind(), lob.id()),
            HostValue::Cursor(_) => write!(f, "<CURSOR>"),
            HostValue::Object(obj) => write!(f, "<{}: id {}>", obj.type_info(), obj.id()),
            HostValue::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}

/// LOB flavor carried by a [`LobRef`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LobKind {
    Clob,
    Nclob,
    Blob,
    Bfile,
}

impl LobKind {
    /// Transform kind a LOB of this flavor classifies as.
    pub fn transform(self) -> TransformKind {
        match self {
            LobKind::Clob => TransformKind::Clob,
            LobKind::Nclob => TransformKind::Nclob,
            LobKind::Blob => TransformKind::Blob,
            LobKind::Bfile => TransformKind::Bfile,
        }
    }
}

impl fmt::Display for LobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LobKind::Clob => "CLOB",
            LobKind::Nclob => "NCLOB",
            LobKind::Blob => "BLOB",
            LobKind::Bfile => "BFILE",
        };
        f.write_str(name)
    }
}

/// Owned handle to a native LOB locator.
#[derive(Debug, Clone, PartialEq)]
pub struct LobRef {
    payload: PayloadRef,
    kind: LobKind,
}

impl LobRef {
    /// Wrap a locator id read from a buffer, adding a native reference so
    /// the handle survives buffer reuse.
    pub fn from_buffer(session: &SessionRef, kind: LobKind, id: u64) -> Self {
        Self {
            payload: PayloadRef::from_buffer(session, PayloadKind::Lob, id),
            kind,
        }
    }

    /// Raw locator id.
    pub fn id(&self) -> u64 {
        self.payload.id()
    }

    /// LOB flavor.
    pub fn kind(&self) -> LobKind {
        self.kind
    }
}

/// Owned handle to a native structured-object instance.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectRef {
    payload: PayloadRef,
    type_info: Arc<ObjectTypeInfo>,
}

impl ObjectRef {
    /// Wrap an object id read from a buffer, adding a native reference.
    pub fn from_buffer(session: &SessionRef, type_info: Arc<ObjectTypeInfo>, id: u64) -> Self {
        Self {
            payload: PayloadRef::from_buffer(session, PayloadKind::Object, id),
            type_info,
        }
    }

    /// Raw object id.
    pub fn id(&self) -> u64 {
        self.payload.id()
    }

    /// Shared type metadata for this object.
    pub fn type_info(&self) -> &Arc<ObjectTypeInfo> {
        &self.type_info
    }
}

/// Owned handle to a native statement.
#[derive(Debug, Clone, PartialEq)]
pub struct StatementRef {
    payload: PayloadRef,
}

impl StatementRef {
    /// Wrap a statement id, adding a native reference.
    pub fn from_buffer(session: &SessionRef, id: u64) -> Self {
        Self {
            payload: PayloadRef::from_buffer(session, PayloadKind::Statement, id),
        }
    }

    /// Raw statement id.
    pub fn id(&self) -> u64 {
        self.payload.id()
    }

    /// Metadata for this statement; fails if it has been closed.
    pub fn info(&self) -> Result<StatementInfo> {
        self.payload.session().statement_info(self.id())
    }
}

struct CursorState {
    statement: Option<StatementRef>,
    needs_refcursor_fixup: bool,
}

/// Host-side nested-cursor stand-in.
///
/// A cursor bound as an OUT ref cursor may not own a statement handle yet;
/// the set path then adopts the handle the native layer pre-allocated for
/// the buffer slot and marks the cursor for post-execution fix-up.
#[derive(Clone)]
pub struct CursorRef {
    state: Arc<Mutex<CursorState>>,
}

impl CursorRef {
    /// Create a cursor with no statement handle.
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(CursorState {
                statement: None,
                needs_refcursor_fixup: false,
            })),
        }
    }

    /// Create a cursor that already owns a statement handle.
    pub fn with_statement(statement: StatementRef) -> Self {
        Self {
            state: Arc::new(Mutex::new(CursorState {
                statement: Some(statement),
                needs_refcursor_fixup: false,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CursorState> {
        // single-threaded mutation model; recover the guard on poison
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Statement handle, if one is owned or has been adopted.
    pub fn statement(&self) -> Option<StatementRef> {
        self.lock().statement.clone()
    }

    /// Adopt a statement handle (used by the variable set path).
    pub(crate) fn adopt_statement(&self, statement: StatementRef) {
        self.lock().statement = Some(statement);
    }

    /// Whether the cursor must be fixed up after execution.
    pub fn needs_refcursor_fixup(&self) -> bool {
        self.lock().needs_refcursor_fixup
    }

    /// Mark the cursor for post-execution fix-up.
    pub(crate) fn mark_refcursor_fixup(&self) {
        self.lock().needs_refcursor_fixup = true;
    }
}

impl Default for CursorRef {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for CursorRef {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }
}

impl fmt::Debug for CursorRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("CursorRef")
            .field("statement", &state.statement)
            .field("needs_refcursor_fixup", &state.needs_refcursor_fixup)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_value_null() {
        let val = HostValue::Null;
        assert!(val.is_null());
        assert_eq!(val.as_str(), None);
        assert_eq!(format!("{}", val), "NULL");
    }

    #[test]
    fn test_host_value_string() {
        let val = HostValue::String("hello".to_string());
        assert!(!val.is_null());
        assert_eq!(val.as_str(), Some("hello"));
        assert_eq!(format!("{}", val), "hello");
    }

    #[test]
    fn test_host_value_numeric() {
        assert_eq!(HostValue::Integer(42).to_i64(), Some(42));
        assert_eq!(HostValue::Integer(42).to_f64(), Some(42.0));
        assert_eq!(HostValue::Double(1.5).to_f64(), Some(1.5));
        assert_eq!(HostValue::Double(1.5).to_i64(), None);
    }

    #[test]
    fn test_array_display() {
        let val = HostValue::Array(vec![
            HostValue::String("a".to_string()),
            HostValue::Null,
            HostValue::Integer(3),
        ]);
        assert_eq!(format!("{}", val), "[a, NULL, 3]");
    }

    #[test]
    fn test_cursor_ref_identity() {
        let a = CursorRef::new();
        let b = a.clone();
        let c = CursorRef::new();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(!a.needs_refcursor_fixup());
    }
}
