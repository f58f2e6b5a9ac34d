/*!
 * Pipe Types
 * Configuration and statistics for pipes
 */

use crate::core::errors::PipeError;
use crate::core::limits::{DEFAULT_ALLOCATION_UNIT, DEFAULT_INITIAL_CAPACITY};
use crate::core::types::{Address, PipeResult, Size};
use serde::{Deserialize, Serialize};

/// Pipe construction parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct PipeConfig {
    /// Exact size of the first allocation
    pub initial_capacity: Size,
    /// Base unit the growth unit is rounded to
    pub allocation_unit: Size,
}

impl Default for PipeConfig {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            allocation_unit: DEFAULT_ALLOCATION_UNIT,
        }
    }
}

impl PipeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_initial_capacity(mut self, initial_capacity: Size) -> Self {
        self.initial_capacity = initial_capacity;
        self
    }

    pub fn with_allocation_unit(mut self, allocation_unit: Size) -> Self {
        self.allocation_unit = allocation_unit;
        self
    }

    pub fn validate(&self) -> PipeResult<()> {
        if self.allocation_unit == 0 {
            return Err(PipeError::InvalidConfig(
                "allocation_unit must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Point-in-time view of a pipe's internal state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PipeStats {
    pub address: Address,
    pub capacity: Size,
    pub growth_unit: Size,
    pub read_cursor: Size,
    pub write_cursor: Size,
    pub empty: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub locked: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl PipeStats {
    /// Bytes waiting to be consumed
    pub fn rsize(&self) -> Size {
        self.write_cursor - self.read_cursor
    }

    /// Bytes available to a producer without growing
    pub fn wsize(&self) -> Size {
        self.capacity - self.write_cursor
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
