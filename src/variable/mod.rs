//! Bind variables: typed native buffers with host-value get/set paths.
//!
//! A `Variable` wraps one exclusively-owned native buffer plus the type
//! metadata needed to move values across the host/native boundary in both
//! directions. Scalars are 1-element buffers; PL/SQL collections are array
//! buffers whose active element count is tracked separately from capacity.
//!
//! Undersized byte-oriented buffers are grown transparently during a set:
//! a replacement buffer is allocated, previously-set elements are carried
//! over, and the handles are swapped. Growth is all-or-nothing with
//! respect to the prior buffer.

mod bind;
mod repr;

pub use bind::BindTarget;

use crate::error::{Error, Result};
use crate::session::{BufferHandle, BufferSpec, NativeDatum, ObjectTypeInfo, SessionRef};
use crate::transform::{self, NativeCategory, TransformKind, TypeDecl};
use crate::value::{HostValue, StatementRef};
use std::sync::Arc;

/// User-supplied value transform applied before native set (input) or
/// after native get (output).
pub type Converter = Box<dyn Fn(HostValue) -> Result<HostValue> + Send + Sync>;

/// Caller hook consulted before default classification when creating a
/// variable from a value. Returning a variable short-circuits default
/// processing; returning `None` falls through to it.
pub type InputTypeHandler = dyn Fn(&HostValue, u32) -> Result<Option<Variable>>;

/// Where the get path reads element data from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    /// The variable's own buffer.
    StaticBuffer,
    /// Per-row data returned by a DML RETURNING execution.
    ReturnedRows,
}

/// A bind variable backed by one native buffer.
pub struct Variable {
    session: SessionRef,
    object_type: Option<Arc<ObjectTypeInfo>>,
    transform: TransformKind,
    category: NativeCategory,
    element_capacity: u32,
    element_byte_size: u32,
    buffer_byte_size: u32,
    is_array: bool,
    is_value_set: bool,
    data_source: DataSource,
    in_converter: Option<Converter>,
    out_converter: Option<Converter>,
    buffer: BufferHandle,
}

impl Variable {
    /// Allocate a new variable of an explicit type and shape.
    ///
    /// A capacity of 0 is coerced to 1 (scalars are 1-element buffers). A
    /// byte size of 0 selects the kind's default.
    pub fn new(
        session: SessionRef,
        element_capacity: u32,
        transform: TransformKind,
        element_byte_size: u32,
        is_array: bool,
        object_type: Option<Arc<ObjectTypeInfo>>,
    ) -> Result<Self> {
        let element_capacity = element_capacity.max(1);
        let element_byte_size = if element_byte_size == 0 {
            transform.default_byte_size()
        } else {
            element_byte_size
        };
        let category = transform.category();
        let spec = BufferSpec {
            storage: transform.storage(),
            category,
            element_capacity,
            element_byte_size,
            is_array,
            object_type: object_type.clone(),
        };
        let buffer = BufferHandle::allocate(&session, &spec)?;
        let buffer_byte_size = session.buffer_byte_size(buffer.id())?;
        Ok(Self {
            session,
            object_type,
            transform,
            category,
            element_capacity,
            element_byte_size,
            buffer_byte_size,
            is_array,
            is_value_set: false,
            data_source: DataSource::StaticBuffer,
            in_converter: None,
            out_converter: None,
            buffer,
        })
    }

    /// Allocate a new variable classified from a host value.
    ///
    /// `capacity_hint` reserves extra element slots beyond what the value
    /// itself needs.
    pub fn from_value(session: SessionRef, value: &HostValue, capacity_hint: u32) -> Result<Self> {
        let spec = transform::classify_value(value, capacity_hint)?;
        Self::new(
            session,
            spec.element_capacity,
            spec.transform,
            spec.element_byte_size,
            spec.is_array,
            spec.object_type,
        )
    }

    /// Like [`Variable::from_value`], but consults an input type handler
    /// first. A handler result takes precedence over default
    /// classification; `None` falls through.
    pub fn from_value_with_handler(
        session: SessionRef,
        value: &HostValue,
        capacity_hint: u32,
        handler: Option<&InputTypeHandler>,
    ) -> Result<Self> {
        if let Some(handler) = handler {
            if let Some(var) = handler(value, capacity_hint)? {
                return Ok(var);
            }
        }
        Self::from_value(session, value, capacity_hint)
    }

    /// Allocate a new variable from a declared type descriptor.
    ///
    /// A bare size declares a string of that many bytes; the two-element
    /// array form declares a PL/SQL collection; an existing variable is
    /// passed through unchanged.
    pub fn from_decl(session: SessionRef, decl: TypeDecl, element_capacity: u32) -> Result<Self> {
        match decl {
            TypeDecl::Variable(var) => Ok(var),
            TypeDecl::Size(size) => Self::new(
                session,
                element_capacity,
                TransformKind::String,
                size,
                false,
                None,
            ),
            TypeDecl::Array(element, capacity) => {
                let (kind, object_type) = transform::classify_array_element(&element)?;
                Self::new(session, capacity, kind, 0, true, object_type)
            }
            TypeDecl::Kind(kind) => Self::new(session, element_capacity, kind, 0, false, None),
            TypeDecl::Object(type_info) => Self::new(
                session,
                element_capacity,
                TransformKind::Object,
                0,
                false,
                Some(type_info),
            ),
        }
    }

    /// Set the value at an element position.
    ///
    /// For array variables the position must be 0 and the value must be an
    /// `Array`; the whole collection is written and the active element
    /// count replaced. A failing element write aborts the batch, leaving
    /// earlier elements written (single-pass semantics, no rollback).
    pub fn set_value(&mut self, index: u32, value: HostValue) -> Result<()> {
        self.is_value_set = true;
        if self.is_array {
            if index > 0 {
                return Err(Error::not_supported(
                    "arrays of arrays are not supported by the native client",
                ));
            }
            return match value {
                HostValue::Array(items) => self.set_array(items),
                _ => Err(Error::wrong_type("expecting array data")),
            };
        }
        self.set_element(index, value)
    }

    fn set_array(&mut self, values: Vec<HostValue>) -> Result<()> {
        self.session
            .set_active_element_count(self.buffer.id(), values.len() as u32)?;
        for (i, value) in values.into_iter().enumerate() {
            self.set_element(i as u32, value)?;
        }
        Ok(())
    }

    fn set_element(&mut self, index: u32, value: HostValue) -> Result<()> {
        if index >= self.element_capacity {
            return Err(Error::IndexOutOfRange {
                index,
                capacity: self.element_capacity,
            });
        }
        let value = match &self.in_converter {
            Some(convert) => convert(value)?,
            None => value,
        };
        if value.is_null() {
            return self
                .session
                .write_slot(self.buffer.id(), index, NativeDatum::Null);
        }
        if self.transform == TransformKind::Cursor {
            return self.set_cursor_element(index, &value);
        }
        if self.category == NativeCategory::Bytes {
            let encoded = transform::encode_bytes(self.transform, &value)?;
            if encoded.len() as u32 > self.buffer_byte_size {
                self.grow(encoded.len() as u32, index)?;
            }
            return self
                .session
                .write_slot(self.buffer.id(), index, NativeDatum::Bytes(encoded));
        }
        let datum = transform::encode_scalar(self.transform, &value)?;
        self.session.write_slot(self.buffer.id(), index, datum)
    }

    /// Attach a host cursor to a cursor slot.
    ///
    /// A cursor that already owns a statement handle is written directly.
    /// Otherwise the statement handle the native layer pre-allocated for
    /// this slot is adopted, after confirming it is still open, and the
    /// cursor is marked for post-execution ref-cursor fix-up.
    fn set_cursor_element(&mut self, index: u32, value: &HostValue) -> Result<()> {
        let cursor = match value {
            HostValue::Cursor(cursor) => cursor,
            _ => return Err(Error::wrong_type("expecting cursor")),
        };
        let statement = match cursor.statement() {
            Some(statement) => {
                self.session
                    .write_statement(self.buffer.id(), index, statement.id())?;
                statement
            }
            None => {
                let id = self.session.slot_statement(self.buffer.id(), index)?;
                self.session.statement_info(id)?;
                let statement = StatementRef::from_buffer(&self.session, id);
                cursor.adopt_statement(statement.clone());
                statement
            }
        };
        self.session
            .set_prefetch_rows(statement.id(), self.session.prefetch_rows())?;
        cursor.mark_refcursor_fixup();
        Ok(())
    }

    /// Replace the buffer with one of a larger per-element byte size,
    /// carrying over every previously-set non-null element except the one
    /// about to be rewritten. Any failure leaves the prior buffer intact.
    fn grow(&mut self, required_byte_size: u32, skip_index: u32) -> Result<()> {
        tracing::debug!(
            buffer = self.buffer.id(),
            from = self.buffer_byte_size,
            to = required_byte_size,
            "growing native buffer"
        );
        let spec = BufferSpec {
            storage: self.transform.storage(),
            category: self.category,
            element_capacity: self.element_capacity,
            element_byte_size: required_byte_size,
            is_array: self.is_array,
            object_type: None,
        };
        let new_buffer = BufferHandle::allocate(&self.session, &spec)?;
        if self.is_array {
            let count = self.session.active_element_count(self.buffer.id())?;
            self.session
                .set_active_element_count(new_buffer.id(), count)?;
        }
        for i in 0..self.element_capacity {
            if i == skip_index {
                continue;
            }
            match self.session.read_slot(self.buffer.id(), i)? {
                NativeDatum::Null => {}
                datum => self.session.write_slot(new_buffer.id(), i, datum)?,
            }
        }
        let measured = self.session.buffer_byte_size(new_buffer.id())?;
        // the swap is the final step; dropping the old handle releases it
        self.buffer = new_buffer;
        self.element_byte_size = self.element_byte_size.max(required_byte_size);
        self.buffer_byte_size = measured;
        Ok(())
    }

    /// Get the value at an element position.
    ///
    /// Array variables return the whole collection up to the active
    /// element count, regardless of `index`. A variable awaiting
    /// DML RETURNING data returns the materialized per-row values for the
    /// bind position instead of reading the static buffer.
    pub fn get_value(&self, index: u32) -> Result<HostValue> {
        if self.is_array {
            let count = self.session.active_element_count(self.buffer.id())?;
            let mut items = Vec::with_capacity(count as usize);
            for i in 0..count {
                items.push(self.get_element(i)?);
            }
            return Ok(HostValue::Array(items));
        }
        if index >= self.element_capacity && self.data_source != DataSource::ReturnedRows {
            return Err(Error::IndexOutOfRange {
                index,
                capacity: self.element_capacity,
            });
        }
        self.get_element(index)
    }

    fn get_element(&self, index: u32) -> Result<HostValue> {
        if self.data_source == DataSource::ReturnedRows {
            let rows = self.session.returned_rows(self.buffer.id(), index)?;
            let mut items = Vec::with_capacity(rows.len());
            for datum in rows {
                items.push(self.decode_datum(datum)?);
            }
            return Ok(HostValue::Array(items));
        }
        let datum = self.session.read_slot(self.buffer.id(), index)?;
        self.decode_datum(datum)
    }

    fn decode_datum(&self, datum: NativeDatum) -> Result<HostValue> {
        let value = transform::decode(
            &self.session,
            self.transform,
            self.object_type.as_ref(),
            datum,
        )?;
        if value.is_null() {
            return Ok(value);
        }
        match &self.out_converter {
            Some(convert) => convert(value),
            None => Ok(value),
        }
    }

    /// Materialize every populated element.
    ///
    /// Arrays yield the active element count; everything else yields all
    /// allocated elements.
    pub fn values(&self) -> Result<Vec<HostValue>> {
        let count = self.actual_elements()?;
        let mut items = Vec::with_capacity(count as usize);
        for i in 0..count {
            items.push(self.get_element(i)?);
        }
        Ok(items)
    }

    /// Copy one already-encoded element from another variable of the same
    /// type. The element is reused without re-transforming.
    pub fn copy_from(&mut self, source: &Variable, source_index: u32, target_index: u32) -> Result<()> {
        if self.transform != source.transform || self.object_type != source.object_type {
            return Err(Error::programming(
                "source and target variable type must match",
            ));
        }
        self.session.copy_slot(
            self.buffer.id(),
            target_index,
            source.buffer.id(),
            source_index,
        )
    }

    /// Number of logically populated slots: the native active element
    /// count for arrays, the allocated capacity otherwise.
    pub fn actual_elements(&self) -> Result<u32> {
        if self.is_array {
            self.session.active_element_count(self.buffer.id())
        } else {
            Ok(self.element_capacity)
        }
    }

    /// Conversion strategy for this variable.
    pub fn transform(&self) -> TransformKind {
        self.transform
    }

    /// Object type metadata, for object variables.
    pub fn object_type(&self) -> Option<&Arc<ObjectTypeInfo>> {
        self.object_type.as_ref()
    }

    /// Number of allocated element slots.
    pub fn element_capacity(&self) -> u32 {
        self.element_capacity
    }

    /// Requested per-element byte size; never decreases.
    pub fn element_byte_size(&self) -> u32 {
        self.element_byte_size
    }

    /// Per-element byte size as measured by the native layer.
    pub fn buffer_byte_size(&self) -> u32 {
        self.buffer_byte_size
    }

    /// Whether this variable has PL/SQL collection semantics.
    pub fn is_array(&self) -> bool {
        self.is_array
    }

    /// Whether any element has been explicitly assigned.
    pub fn is_value_set(&self) -> bool {
        self.is_value_set
    }

    /// Where the get path currently reads from.
    pub fn data_source(&self) -> DataSource {
        self.data_source
    }

    /// Configured input converter.
    pub fn in_converter(&self) -> Option<&Converter> {
        self.in_converter.as_ref()
    }

    /// Configured output converter.
    pub fn out_converter(&self) -> Option<&Converter> {
        self.out_converter.as_ref()
    }

    /// Install or clear the input converter.
    pub fn set_in_converter(&mut self, converter: Option<Converter>) {
        self.in_converter = converter;
    }

    /// Install or clear the output converter.
    pub fn set_out_converter(&mut self, converter: Option<Converter>) {
        self.out_converter = converter;
    }
}
