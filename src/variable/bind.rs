//! Statement attachment for variables.

use crate::error::Result;
use crate::value::StatementRef;
use crate::variable::{DataSource, Variable};

/// Where a variable attaches on a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindTarget<'a> {
    /// 1-based bind position.
    Position(u32),
    /// Bind name.
    Name(&'a str),
}

impl Variable {
    /// Attach this variable's buffer to a prepared statement.
    ///
    /// Binding to a DML RETURNING statement before any value has been set
    /// switches the variable into returned-data mode: results are pulled
    /// per row after execution instead of read from the static buffer.
    pub fn bind(&mut self, statement: &StatementRef, target: BindTarget<'_>) -> Result<()> {
        match target {
            BindTarget::Position(position) => {
                self.session
                    .bind_by_position(statement.id(), position, self.buffer.id())?;
            }
            BindTarget::Name(name) => {
                self.session
                    .bind_by_name(statement.id(), name, self.buffer.id())?;
            }
        }
        tracing::debug!(
            statement = statement.id(),
            buffer = self.buffer.id(),
            target = ?target,
            "bound variable"
        );
        let info = statement.info()?;
        if info.is_returning && !self.is_value_set {
            self.data_source = DataSource::ReturnedRows;
        }
        Ok(())
    }
}
