//! Stroke playback: the virtual-clock timeline, stroke painting, notifications and the engine.

pub(crate) mod engine;
pub(crate) mod events;
pub(crate) mod renderer;
pub(crate) mod timeline;
