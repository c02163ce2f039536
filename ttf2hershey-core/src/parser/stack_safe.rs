//! Recursion limits for compound glyph expansion
//!
//! Compound glyphs reference other glyphs by index and the format gives no
//! guarantee that the reference graph is acyclic. [`StackSafeContext`]
//! bounds the nesting depth and rejects a glyph that is already being
//! expanded further up the chain.

use crate::error::{FontError, Result};

/// Default maximum nesting of compound components
pub const MAX_COMPONENT_DEPTH: usize = 8;

/// Depth and ancestry tracking for one top-level glyph expansion
#[derive(Debug)]
pub struct StackSafeContext {
    /// Current recursion depth
    pub depth: usize,
    /// Maximum allowed depth
    pub max_depth: usize,
    /// Glyphs currently being expanded, outermost first
    chain: Vec<u16>,
}

impl Default for StackSafeContext {
    fn default() -> Self {
        Self::new()
    }
}

impl StackSafeContext {
    /// Create a context with the default depth limit
    pub fn new() -> Self {
        Self::with_limit(MAX_COMPONENT_DEPTH)
    }

    /// Create a context with a custom depth limit
    pub fn with_limit(max_depth: usize) -> Self {
        Self {
            depth: 0,
            max_depth,
            chain: Vec::with_capacity(max_depth.min(64)),
        }
    }

    /// Enter a compound component referencing `glyph`
    pub fn enter(&mut self, glyph: u16) -> Result<()> {
        if self.depth + 1 > self.max_depth || self.chain.contains(&glyph) {
            return Err(FontError::RecursionLimitExceeded {
                glyph,
                depth: self.max_depth,
            });
        }
        self.depth += 1;
        self.chain.push(glyph);
        Ok(())
    }

    /// Leave the innermost component
    pub fn exit(&mut self) {
        if self.depth > 0 {
            self.depth -= 1;
            self.chain.pop();
        }
    }

    /// Whether `glyph` is currently being expanded
    pub fn is_active(&self, glyph: u16) -> bool {
        self.chain.contains(&glyph)
    }
}
