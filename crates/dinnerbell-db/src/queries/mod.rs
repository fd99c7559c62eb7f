//! Query functions, one module per table.

pub mod feedback;
pub mod orders;
pub mod plans;
pub mod preferences;
