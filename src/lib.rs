//! Bind-variable and value-marshalling layer for Oracle-style drivers.
//!
//! This crate implements the boundary between a dynamically-typed host
//! value model and a native client's strongly-typed, pre-allocated buffer
//! model. A [`Variable`] owns one native buffer, converts values in both
//! directions per its transform kind, and grows undersized byte buffers
//! transparently without losing previously bound data.
//!
//! The native client itself is abstract: the crate consumes a
//! [`NativeSession`] implementation for buffer allocation, element access
//! and statement binding, and exposes variables to statement-execution and
//! result-fetch components.
//!
//! # Example
//!
//! ```no_run
//! use oracle_vars_rs::{BindTarget, HostValue, Result, SessionRef, TransformKind, Variable};
//!
//! fn bind_name(session: SessionRef, statement: &oracle_vars_rs::StatementRef) -> Result<()> {
//!     let mut var = Variable::new(session, 1, TransformKind::String, 30, false, None)?;
//!     var.set_value(0, HostValue::String("SCOTT".to_string()))?;
//!     var.bind(statement, BindTarget::Name("name"))?;
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod session;
pub mod transform;
pub mod value;
pub mod variable;

// Re-export main types
pub use error::{Error, Result};
pub use session::{
    BufferHandle, BufferSpec, NativeDatum, NativeSession, ObjectTypeInfo, PayloadKind, PayloadRef,
    SessionRef, StatementInfo,
};
pub use transform::{classify_value, NativeCategory, StorageKind, TransformKind, TypeDecl, VarSpec};
pub use value::{CursorRef, HostValue, LobKind, LobRef, ObjectRef, StatementRef};
pub use variable::{BindTarget, Converter, DataSource, InputTypeHandler, Variable};
