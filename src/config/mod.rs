//! Typed playback options and colour handling.
//!
//! Options are resolved once per engine: a partial JSON document is deep-merged over the defaults
//! by [`options::Options::merged`] and validated. Nothing here is shared or mutated after construction.

pub(crate) mod color;
pub(crate) mod options;
