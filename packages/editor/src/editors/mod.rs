//! Field editors, one module per schema kind.
//!
//! Each module builds its widget for the dispatcher and handles the events
//! that target its kind. Container editors recurse back into the
//! dispatcher for their children.

pub(crate) mod array;
pub(crate) mod color;
pub(crate) mod enumeration;
pub(crate) mod leaf;
pub(crate) mod nullish;
pub(crate) mod object;
pub(crate) mod union;
