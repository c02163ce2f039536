//! Binary parsing primitives
//!
//! This module holds the font-agnostic pieces of the decoder: a bounds-checked
//! big-endian cursor and the recursion guard used when expanding compound
//! glyphs.

pub mod reader;
pub mod stack_safe;

pub use self::reader::FontReader;
pub use self::stack_safe::{StackSafeContext, MAX_COMPONENT_DEPTH};
