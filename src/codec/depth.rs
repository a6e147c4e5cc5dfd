//! Nesting-depth guard for one read or write pass.

use crate::error::{NbtError, Result};

/// Counts the lists and compounds currently open in a read or write.
///
/// Owned by a single call and passed down to the codec, so independent
/// streams never share a counter.
#[derive(Debug)]
pub struct Depth {
    current: usize,
    max: usize,
}

impl Depth {
    pub fn new(max: usize) -> Self {
        Self { current: 0, max }
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn max(&self) -> usize {
        self.max
    }

    /// Opens one more level, or fails with `DepthExceeded` if the bound
    /// would be passed.
    pub fn enter(&mut self) -> Result<()> {
        if self.current >= self.max {
            tracing::warn!(max = self.max, "NBT nesting depth limit reached");
            return Err(NbtError::DepthExceeded { max: self.max });
        }
        self.current += 1;
        Ok(())
    }

    /// Closes the innermost level.
    pub fn leave(&mut self) {
        debug_assert!(self.current > 0, "leave without enter");
        self.current = self.current.saturating_sub(1);
    }

    /// Runs `f` and then releases every level it left open, whether it
    /// succeeded or not.
    pub(crate) fn scoped<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let level = self.current;
        let result = f(self);
        self.current = level;
        result
    }
}
