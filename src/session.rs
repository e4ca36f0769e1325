//! Native session collaborator interface.
//!
//! The variable layer does not talk to the wire itself. It drives an
//! abstract native session that owns buffer storage, statement handles and
//! reference-counted payloads (LOB locators, objects, nested statements).
//! A driver supplies the implementation; tests supply an in-memory fake.

use crate::error::Result;
use crate::transform::{NativeCategory, StorageKind};
use bytes::Bytes;
use chrono::NaiveDateTime;
use std::fmt;
use std::sync::Arc;

/// Shared handle to the owning native session.
///
/// Sessions outlive every variable created against them; sharing is
/// reference counted.
pub type SessionRef = Arc<dyn NativeSession>;

/// Kind tag for native reference-counted payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PayloadKind {
    /// LOB locator (CLOB, NCLOB, BLOB, BFILE).
    Lob,
    /// Structured object instance.
    Object,
    /// Nested statement (ref cursor).
    Statement,
}

/// Native representation of one buffer slot.
///
/// Raw ids (`Lob`, `Object`, `Statement`) identify payloads whose
/// reference counts are managed by the session; ownership only surfaces
/// to callers through the ref-counted wrappers in [`crate::value`].
#[derive(Debug, Clone, PartialEq)]
pub enum NativeDatum {
    /// Null indicator set, no payload.
    Null,
    /// Encoded byte payload (strings, raw, rowid).
    Bytes(Bytes),
    /// 64-bit integer slot.
    Int64(i64),
    /// Double-precision slot.
    Double(f64),
    /// Boolean slot.
    Boolean(bool),
    /// Date/time slot (no timezone).
    Timestamp(NaiveDateTime),
    /// LOB locator id.
    Lob(u64),
    /// Structured object id.
    Object(u64),
    /// Nested statement id.
    Statement(u64),
}

impl NativeDatum {
    /// Check if the slot carries the null indicator.
    pub fn is_null(&self) -> bool {
        matches!(self, NativeDatum::Null)
    }
}

/// Metadata about an already-prepared statement.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatementInfo {
    /// Statement is a query.
    pub is_query: bool,
    /// Statement is a PL/SQL block.
    pub is_plsql: bool,
    /// Statement is DML with a RETURNING clause.
    pub is_returning: bool,
}

/// Structured-object type metadata, owned by the session's type cache and
/// shared across variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectTypeInfo {
    /// Owning schema.
    pub schema: String,
    /// Type name.
    pub name: String,
    /// Native type handle used when allocating typed buffers.
    pub handle: u64,
}

impl fmt::Display for ObjectTypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.name)
    }
}

/// Request for one native buffer allocation.
#[derive(Debug, Clone)]
pub struct BufferSpec {
    /// Database-side storage tag.
    pub storage: StorageKind,
    /// Native representation tag.
    pub category: NativeCategory,
    /// Number of element slots (>= 1).
    pub element_capacity: u32,
    /// Per-element byte capacity (byte-oriented representations only).
    pub element_byte_size: u32,
    /// PL/SQL collection semantics (active count distinct from capacity).
    pub is_array: bool,
    /// Object type handle for typed buffers.
    pub object_type: Option<Arc<ObjectTypeInfo>>,
}

/// The native session surface the variable layer consumes.
///
/// All methods are synchronous and may block on native I/O. Failures carry
/// the native error code and message via `Error::Database`; no method is
/// retried by this layer.
pub trait NativeSession: Send + Sync {
    /// Allocate a typed buffer of `spec.element_capacity` slots.
    fn allocate_buffer(&self, spec: &BufferSpec) -> Result<u64>;

    /// Release a buffer. May perform network round-trips for LOB or
    /// cursor cleanup; must be tolerated at drop time, so no error.
    fn release_buffer(&self, buffer: u64);

    /// Per-element byte size actually allocated for the buffer.
    fn buffer_byte_size(&self, buffer: u64) -> Result<u32>;

    /// Read one slot.
    fn read_slot(&self, buffer: u64, index: u32) -> Result<NativeDatum>;

    /// Write one slot (writing `Null` sets the null indicator).
    fn write_slot(&self, buffer: u64, index: u32, datum: NativeDatum) -> Result<()>;

    /// Active element count of an array buffer.
    fn active_element_count(&self, buffer: u64) -> Result<u32>;

    /// Replace the active element count of an array buffer.
    fn set_active_element_count(&self, buffer: u64, count: u32) -> Result<()>;

    /// Per-row returned data for a DML RETURNING bind position.
    fn returned_rows(&self, buffer: u64, index: u32) -> Result<Vec<NativeDatum>>;

    /// Copy one already-encoded element between buffers.
    fn copy_slot(&self, target: u64, target_index: u32, source: u64, source_index: u32)
        -> Result<()>;

    /// Attach a buffer to a statement at a 1-based position.
    fn bind_by_position(&self, statement: u64, position: u32, buffer: u64) -> Result<()>;

    /// Attach a buffer to a statement by bind name.
    fn bind_by_name(&self, statement: u64, name: &str, buffer: u64) -> Result<()>;

    /// Write an externally-owned statement handle into a cursor slot.
    fn write_statement(&self, buffer: u64, index: u32, statement: u64) -> Result<()>;

    /// Statement handle pre-allocated by the native layer for a cursor
    /// slot, available for adoption by a host cursor.
    fn slot_statement(&self, buffer: u64, index: u32) -> Result<u64>;

    /// Metadata for a prepared statement. Fails if the statement handle
    /// has been closed, which is how adoption validates liveness.
    fn statement_info(&self, statement: u64) -> Result<StatementInfo>;

    /// Set the prefetch row count on a statement.
    fn set_prefetch_rows(&self, statement: u64, rows: u32) -> Result<()>;

    /// Increment the native reference count of a payload.
    fn add_payload_ref(&self, kind: PayloadKind, id: u64);

    /// Decrement the native reference count of a payload.
    fn release_payload(&self, kind: PayloadKind, id: u64);

    /// Session-configured prefetch row count, propagated to adopted
    /// ref cursors.
    fn prefetch_rows(&self) -> u32 {
        100
    }
}

/// Exclusively owned native buffer handle.
///
/// Exactly one handle is live per variable; the buffer is released exactly
/// once, when the handle drops. Growth swaps in a new handle and drops the
/// old one.
pub struct BufferHandle {
    id: u64,
    session: SessionRef,
}

impl BufferHandle {
    /// Allocate a buffer and take ownership of the resulting handle.
    pub fn allocate(session: &SessionRef, spec: &BufferSpec) -> Result<Self> {
        let id = session.allocate_buffer(spec)?;
        tracing::debug!(
            buffer = id,
            storage = ?spec.storage,
            capacity = spec.element_capacity,
            byte_size = spec.element_byte_size,
            is_array = spec.is_array,
            "allocated native buffer"
        );
        Ok(Self {
            id,
            session: Arc::clone(session),
        })
    }

    /// Raw buffer id for session calls.
    pub fn id(&self) -> u64 {
        self.id
    }
}

impl Drop for BufferHandle {
    fn drop(&mut self) {
        tracing::trace!(buffer = self.id, "releasing native buffer");
        self.session.release_buffer(self.id);
    }
}

impl fmt::Debug for BufferHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BufferHandle").field("id", &self.id).finish()
    }
}

/// Ref-counted handle to a native payload.
///
/// Constructing a handle from a buffer read bumps the native reference
/// count so the payload outlives buffer reuse; `Clone` bumps it again and
/// `Drop` releases. Never a raw id alias.
pub struct PayloadRef {
    kind: PayloadKind,
    id: u64,
    session: SessionRef,
}

impl PayloadRef {
    /// Wrap a payload id read from a buffer, adding a reference so the
    /// handle is independent of the buffer's own reference.
    pub fn from_buffer(session: &SessionRef, kind: PayloadKind, id: u64) -> Self {
        session.add_payload_ref(kind, id);
        Self {
            kind,
            id,
            session: Arc::clone(session),
        }
    }

    /// Raw payload id.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Payload kind tag.
    pub fn kind(&self) -> PayloadKind {
        self.kind
    }

    /// Shared session this payload belongs to.
    pub fn session(&self) -> &SessionRef {
        &self.session
    }
}

impl Clone for PayloadRef {
    fn clone(&self) -> Self {
        Self::from_buffer(&self.session, self.kind, self.id)
    }
}

impl Drop for PayloadRef {
    fn drop(&mut self) {
        self.session.release_payload(self.kind, self.id);
    }
}

impl PartialEq for PayloadRef {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.id == other.id
    }
}

impl fmt::Debug for PayloadRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PayloadRef")
            .field("kind", &self.kind)
            .field("id", &self.id)
            .finish()
    }
}
