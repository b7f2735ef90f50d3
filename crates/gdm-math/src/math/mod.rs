//! Core math modules.

pub mod stable;
pub mod summary;
