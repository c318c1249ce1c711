//! Stroke descriptors and the path geometry they are measured with.

pub(crate) mod geometry;
pub(crate) mod model;
