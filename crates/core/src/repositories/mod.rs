//! Repository modules.
//!
//! Persistence for treatment records. Timeline computation itself never touches storage.

pub mod treatments;
