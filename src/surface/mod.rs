//! Drawing-surface capability, its in-memory SVG implementation, and surface provisioning.

pub(crate) mod backend;
pub(crate) mod provision;
pub(crate) mod svg;
