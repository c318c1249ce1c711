use crate::config::color::Color;
use crate::foundation::core::{BezPath, ElementId, Millis};
use crate::strokes::geometry::parse_path;
use serde::{Deserialize, Serialize};

/// One stroke record as delivered by a stroke-data source.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawStroke {
    /// SVG path data.
    pub path: String,
    /// Enclosing group ids, outermost first.
    #[serde(default)]
    pub groups: Vec<String>,
    /// Stroke-order numeral, when the source has one for this stroke.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<OrderLabel>,
}

impl RawStroke {
    /// Record with path data only.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            groups: Vec::new(),
            text: None,
        }
    }
}

/// All stroke records of one character, in drawing order.
pub type CharStrokes = Vec<RawStroke>;

/// Stroke-order numeral and its position in view-box units.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderLabel {
    /// Text content (usually the 1-based stroke number).
    pub value: String,
    /// Baseline x.
    pub x: f64,
    /// Baseline y.
    pub y: f64,
}

/// Path geometry: the source text and its parsed form.
#[derive(Clone, Debug)]
pub struct PathData {
    svg: String,
    bez: BezPath,
}

impl PathData {
    /// Parse `d`; unparseable data yields an empty path.
    pub fn parse(d: &str) -> Self {
        let bez = match parse_path(d) {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(error = %e, "stroke path data unusable; treating as empty");
                BezPath::new()
            }
        };
        Self {
            svg: d.to_owned(),
            bez,
        }
    }

    /// Source path data.
    pub fn svg(&self) -> &str {
        &self.svg
    }

    /// Parsed geometry.
    pub fn bez(&self) -> &BezPath {
        &self.bez
    }
}

impl Serialize for PathData {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.svg)
    }
}

/// Live elements of a stroke that is currently painted.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct RenderedHandle {
    pub(crate) path: ElementId,
    pub(crate) label: Option<ElementId>,
    pub(crate) resting: Color,
    /// Retract transition in flight; the path is removed when it completes.
    pub(crate) fading: bool,
}

/// Normalised stroke descriptor.
///
/// Everything except the rendered handle is fixed at load time.
#[derive(Clone, Debug, Serialize)]
pub struct Stroke {
    char_index: usize,
    length: f64,
    duration: Millis,
    path: PathData,
    groups: Vec<String>,
    label: Option<OrderLabel>,
    #[serde(skip)]
    pub(crate) rendered: Option<RenderedHandle>,
}

impl Stroke {
    /// Index of the character (and surface) this stroke belongs to.
    pub fn char_index(&self) -> usize {
        self.char_index
    }

    /// Geometric path length in view-box units.
    pub fn length(&self) -> f64 {
        self.length
    }

    /// Reveal/retract duration.
    pub fn duration(&self) -> Millis {
        self.duration
    }

    /// Path geometry.
    pub fn path(&self) -> &PathData {
        &self.path
    }

    /// Enclosing group ids from the source markup.
    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    /// Stroke-order numeral.
    pub fn label(&self) -> Option<&OrderLabel> {
        self.label.as_ref()
    }

    /// `true` while the stroke is painted on its surface.
    pub fn is_rendered(&self) -> bool {
        self.rendered.is_some()
    }
}

/// Flatten per-character records into one ordered descriptor list.
///
/// `measure` is the drawing capability's path-length function; durations are
/// `length * step * 1000` milliseconds.
pub fn preprocess_strokes(
    data: &[CharStrokes],
    step: f64,
    measure: impl Fn(&BezPath) -> f64,
) -> Vec<Stroke> {
    let mut out = Vec::with_capacity(data.iter().map(Vec::len).sum());
    for (char_index, strokes) in data.iter().enumerate() {
        for raw in strokes {
            let path = PathData::parse(&raw.path);
            let length = measure(path.bez()).max(0.0);
            out.push(Stroke {
                char_index,
                length,
                duration: Millis(length * step * 1000.0),
                path,
                groups: raw.groups.clone(),
                label: raw.text.clone(),
                rendered: None,
            });
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/strokes/model.rs"]
mod tests;
