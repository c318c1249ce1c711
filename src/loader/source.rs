use crate::foundation::error::{DmakError, DmakResult};
use crate::loader::kanjivg::parse_kanjivg;
use crate::strokes::model::CharStrokes;
use anyhow::Context as _;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Per-character stroke-data provider.
pub trait StrokeSource {
    /// Stroke records of `ch`, in drawing order.
    fn load_char(&self, ch: char) -> DmakResult<CharStrokes>;
}

/// What to do when one character of a word cannot be loaded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadFailurePolicy {
    /// Fail the whole load.
    Abort,
    /// Log and substitute an empty stroke list for the failed character.
    #[default]
    Placeholder,
}

/// Five-hex-digit code used to name per-character files (`日` -> `065e5`).
pub fn char_code(ch: char) -> String {
    format!("{:05x}", u32::from(ch))
}

/// ASCII space and the ideographic space render as blank cells.
pub fn is_blank_glyph(ch: char) -> bool {
    ch == '\u{0020}' || ch == '\u{3000}'
}

/// Load every character of `text`, in input order.
///
/// Blank glyphs never hit the source. The result always has one entry per character unless the
/// policy is [`LoadFailurePolicy::Abort`] and a character failed.
#[tracing::instrument(skip(source))]
pub fn load_word(
    source: &dyn StrokeSource,
    text: &str,
    policy: LoadFailurePolicy,
) -> DmakResult<Vec<CharStrokes>> {
    let mut out = Vec::new();
    for (index, ch) in text.chars().enumerate() {
        if is_blank_glyph(ch) {
            out.push(Vec::new());
            continue;
        }
        match source.load_char(ch) {
            Ok(strokes) => out.push(strokes),
            Err(e) => match policy {
                LoadFailurePolicy::Abort => {
                    return Err(DmakError::load(format!(
                        "character {index} ('{ch}', {}): {e}",
                        char_code(ch)
                    )));
                }
                LoadFailurePolicy::Placeholder => {
                    tracing::warn!(index, %ch, error = %e, "stroke data unavailable; leaving cell empty");
                    out.push(Vec::new());
                }
            },
        }
    }
    tracing::debug!(chars = out.len(), "word loaded");
    Ok(out)
}

/// Directory of KanjiVG files named `<code>.svg`.
#[derive(Debug, Clone)]
pub struct KanjiVgDir {
    root: PathBuf,
}

impl KanjiVgDir {
    /// Source rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File that holds the strokes of `ch`.
    pub fn path_for(&self, ch: char) -> PathBuf {
        self.root.join(format!("{}.svg", char_code(ch)))
    }
}

impl StrokeSource for KanjiVgDir {
    fn load_char(&self, ch: char) -> DmakResult<CharStrokes> {
        if is_blank_glyph(ch) {
            return Ok(Vec::new());
        }
        let path = self.path_for(ch);
        let xml = std::fs::read_to_string(&path)
            .with_context(|| format!("read stroke data '{}'", path.display()))?;
        parse_kanjivg(&xml, &char_code(ch))
    }
}

/// In-memory source keyed by character.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    chars: HashMap<char, CharStrokes>,
}

impl MemorySource {
    /// Empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the strokes of `ch`.
    pub fn insert(&mut self, ch: char, strokes: CharStrokes) -> &mut Self {
        self.chars.insert(ch, strokes);
        self
    }
}

impl StrokeSource for MemorySource {
    fn load_char(&self, ch: char) -> DmakResult<CharStrokes> {
        self.chars
            .get(&ch)
            .cloned()
            .ok_or_else(|| DmakError::load(format!("no stroke data for '{ch}'")))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/loader/source.rs"]
mod tests;
