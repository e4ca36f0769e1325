//! Diagnostic rendering of a variable's type and contents.

use crate::error::Result;
use crate::variable::Variable;
use std::fmt;

/// Element limit for rendered value snapshots.
const DESCRIBE_LIMIT: usize = 10;

impl Variable {
    /// Name of the variable's logical type: the object type for object
    /// variables, the transform kind's type name otherwise.
    pub fn type_name(&self) -> String {
        match &self.object_type {
            Some(object_type) => object_type.to_string(),
            None => self.transform.to_string(),
        }
    }

    /// Render a bounded snapshot of the variable's type and current
    /// value(s). Read failures during materialization propagate.
    pub fn describe(&self) -> Result<String> {
        let rendered = if !self.is_array && self.element_capacity == 1 {
            self.get_value(0)?.to_string()
        } else {
            let items = self.values()?;
            let truncated = items.len() > DESCRIBE_LIMIT;
            let mut parts: Vec<String> = items
                .iter()
                .take(DESCRIBE_LIMIT)
                .map(|v| v.to_string())
                .collect();
            if truncated {
                parts.push("...".to_string());
            }
            format!("[{}]", parts.join(", "))
        };
        Ok(format!(
            "<Variable of type {} with value {}>",
            self.type_name(),
            rendered
        ))
    }
}

impl fmt::Debug for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Variable")
            .field("transform", &self.transform)
            .field("category", &self.category)
            .field("element_capacity", &self.element_capacity)
            .field("element_byte_size", &self.element_byte_size)
            .field("buffer_byte_size", &self.buffer_byte_size)
            .field("is_array", &self.is_array)
            .field("is_value_set", &self.is_value_set)
            .field("data_source", &self.data_source)
            .finish()
    }
}
