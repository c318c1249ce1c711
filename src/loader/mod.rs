//! Stroke-data sources.
//!
//! A source answers, per character, with the list of stroke records for that character.
//! [`source::load_word`] aggregates the per-character answers for a whole text under an explicit
//! partial-failure policy.

pub(crate) mod kanjivg;
pub(crate) mod source;
