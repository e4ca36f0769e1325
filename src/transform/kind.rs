//! Transform kind tags and their static typing tables.
//!
//! A transform kind is the logical value category of a variable, decided
//! once at classification time. Each kind maps statically to the
//! database-side storage tag and the native in-buffer representation used
//! for allocation, plus a default per-element byte size.

use std::fmt;

/// Logical value category governing conversion and native typing.
///
/// Immutable after variable construction; resizing a buffer never changes
/// the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransformKind {
    /// VARCHAR2 - variable-length string.
    String,
    /// CHAR - fixed-length string.
    FixedChar,
    /// LONG - legacy large text.
    LongString,
    /// RAW - variable-length binary.
    Binary,
    /// LONG RAW - legacy large binary.
    LongBinary,
    /// ROWID, transported as its string form.
    Rowid,
    /// NUMBER bound as a 64-bit integer.
    Int,
    /// BINARY_DOUBLE.
    Double,
    /// PL/SQL BOOLEAN.
    Boolean,
    /// DATE - date/time without timezone.
    Timestamp,
    /// CLOB locator.
    Clob,
    /// NCLOB locator.
    Nclob,
    /// BLOB locator.
    Blob,
    /// BFILE locator.
    Bfile,
    /// Nested statement (ref cursor).
    Cursor,
    /// Structured object instance.
    Object,
}

/// Database-side storage tag used when requesting a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    Varchar,
    Char,
    Long,
    Raw,
    LongRaw,
    Rowid,
    Number,
    NativeDouble,
    Boolean,
    Date,
    Clob,
    Nclob,
    Blob,
    Bfile,
    Cursor,
    Object,
}

/// Native in-buffer representation of one element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeCategory {
    /// Encoded byte payload; the only representation that can grow.
    Bytes,
    Int64,
    Double,
    Boolean,
    Timestamp,
    Lob,
    Object,
    Statement,
}

impl TransformKind {
    /// Database-side storage tag for this kind.
    pub fn storage(self) -> StorageKind {
        match self {
            TransformKind::String => StorageKind::Varchar,
            TransformKind::FixedChar => StorageKind::Char,
            TransformKind::LongString => StorageKind::Long,
            TransformKind::Binary => StorageKind::Raw,
            TransformKind::LongBinary => StorageKind::LongRaw,
            TransformKind::Rowid => StorageKind::Rowid,
            TransformKind::Int => StorageKind::Number,
            TransformKind::Double => StorageKind::NativeDouble,
            TransformKind::Boolean => StorageKind::Boolean,
            TransformKind::Timestamp => StorageKind::Date,
            TransformKind::Clob => StorageKind::Clob,
            TransformKind::Nclob => StorageKind::Nclob,
            TransformKind::Blob => StorageKind::Blob,
            TransformKind::Bfile => StorageKind::Bfile,
            TransformKind::Cursor => StorageKind::Cursor,
            TransformKind::Object => StorageKind::Object,
        }
    }

    /// Native representation tag for this kind.
    pub fn category(self) -> NativeCategory {
        match self {
            TransformKind::String
            | TransformKind::FixedChar
            | TransformKind::LongString
            | TransformKind::Binary
            | TransformKind::LongBinary
            | TransformKind::Rowid => NativeCategory::Bytes,
            TransformKind::Int => NativeCategory::Int64,
            TransformKind::Double => NativeCategory::Double,
            TransformKind::Boolean => NativeCategory::Boolean,
            TransformKind::Timestamp => NativeCategory::Timestamp,
            TransformKind::Clob
            | TransformKind::Nclob
            | TransformKind::Blob
            | TransformKind::Bfile => NativeCategory::Lob,
            TransformKind::Cursor => NativeCategory::Statement,
            TransformKind::Object => NativeCategory::Object,
        }
    }

    /// Default per-element byte size when the caller does not specify one.
    ///
    /// Fixed-size representations report 0; their slot size is owned by
    /// the native layer.
    pub fn default_byte_size(self) -> u32 {
        match self {
            TransformKind::String | TransformKind::Binary => 4000,
            TransformKind::FixedChar => 2000,
            TransformKind::LongString | TransformKind::LongBinary => 128 * 1024,
            TransformKind::Rowid => 18,
            _ => 0,
        }
    }

    /// Whether set operations may trigger buffer growth.
    pub fn is_resizable(self) -> bool {
        self.category() == NativeCategory::Bytes
    }
}

impl fmt::Display for TransformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransformKind::String => "VARCHAR2",
            TransformKind::FixedChar => "CHAR",
            TransformKind::LongString => "LONG",
            TransformKind::Binary => "RAW",
            TransformKind::LongBinary => "LONG RAW",
            TransformKind::Rowid => "ROWID",
            TransformKind::Int => "NUMBER",
            TransformKind::Double => "BINARY_DOUBLE",
            TransformKind::Boolean => "BOOLEAN",
            TransformKind::Timestamp => "DATE",
            TransformKind::Clob => "CLOB",
            TransformKind::Nclob => "NCLOB",
            TransformKind::Blob => "BLOB",
            TransformKind::Bfile => "BFILE",
            TransformKind::Cursor => "CURSOR",
            TransformKind::Object => "OBJECT",
        };
        f.write_str(name)
    }
}
