use crate::animation::ease::Ease;
use crate::config::color::{Color, StrokeColor};
use crate::foundation::core::ViewBox;
use crate::foundation::error::{DmakError, DmakResult};
use crate::loader::source::LoadFailurePolicy;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Complete, validated configuration of one playback engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct Options {
    /// Directory holding `<code>.svg` stroke files.
    pub uri: String,
    /// Do not load stroke data at construction; the embedder calls `deliver`.
    pub skip_load: bool,
    /// Do not provision surfaces; the embedder calls `attach_surfaces`.
    pub skip_papers: bool,
    /// Start playback as soon as data is delivered.
    pub autoplay: bool,
    /// Initial render target (stroke count).
    pub render_at: Option<usize>,
    /// Mount point name surfaces are created under.
    pub element: String,
    /// Surface height in pixels.
    pub height: u32,
    /// Surface width in pixels.
    pub width: u32,
    /// Surface view box in user units.
    pub view_box: ViewBox,
    /// Seconds of animation per unit of path length.
    pub step: f64,
    /// Stroke styling and animation toggles.
    pub stroke: StrokeOptions,
    /// Background crosshair grid.
    pub grid: GridOptions,
    /// Highlight style used by frame snapshots.
    pub series_active_style: SeriesActiveStyle,
    /// Policy applied when one character's data cannot be loaded.
    pub load_failure: LoadFailurePolicy,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            uri: String::new(),
            skip_load: false,
            skip_papers: false,
            autoplay: true,
            render_at: None,
            element: "draw".to_owned(),
            height: 109,
            width: 109,
            view_box: ViewBox::default(),
            step: 0.03,
            stroke: StrokeOptions::default(),
            grid: GridOptions::default(),
            series_active_style: SeriesActiveStyle::default(),
            load_failure: LoadFailurePolicy::default(),
        }
    }
}

/// Stroke styling block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StrokeOptions {
    /// Transition toggles.
    pub animated: Animated,
    /// Stroke-order numeral display.
    pub order: OrderOptions,
    /// Path attributes.
    pub attr: StrokeAttr,
}

/// Which directions animate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Animated {
    /// Reveal strokes progressively.
    pub drawing: bool,
    /// Retract strokes progressively.
    pub erasing: bool,
    /// Timing function of the reveal, retract and colour-settle transitions.
    pub timing: Ease,
}

impl Default for Animated {
    fn default() -> Self {
        Self {
            drawing: true,
            erasing: true,
            timing: Ease::Css,
        }
    }
}

/// Stroke-order label options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OrderOptions {
    /// Paint the numeral next to each drawn stroke.
    pub visible: bool,
    /// Label text attributes.
    pub attr: LabelAttr,
}

/// Text attributes of stroke-order labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct LabelAttr {
    /// Font size in user units.
    pub font_size: f64,
    /// Text fill.
    pub fill: Color,
}

impl Default for LabelAttr {
    fn default() -> Self {
        Self {
            font_size: 8.0,
            fill: Color::rgb(0x99, 0x99, 0x99),
        }
    }
}

/// SVG `stroke-linecap` values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineCap {
    /// Flat end at the path end.
    Butt,
    /// Round end.
    #[default]
    Round,
    /// Square end extended by half the width.
    Square,
}

impl LineCap {
    /// SVG attribute value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Butt => "butt",
            Self::Round => "round",
            Self::Square => "square",
        }
    }
}

/// SVG `stroke-linejoin` values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineJoin {
    /// Sharp corner.
    Miter,
    /// Round corner.
    #[default]
    Round,
    /// Cut corner.
    Bevel,
}

impl LineJoin {
    /// SVG attribute value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Miter => "miter",
            Self::Round => "round",
            Self::Bevel => "bevel",
        }
    }
}

/// Path attributes of strokes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct StrokeAttr {
    /// Colour used while a stroke is being revealed or retracted.
    pub active: Color,
    /// Resting colour, or `"random"`.
    pub stroke: StrokeColor,
    /// Line width in user units.
    pub stroke_width: f64,
    /// Line cap.
    pub stroke_linecap: LineCap,
    /// Line join.
    pub stroke_linejoin: LineJoin,
}

impl Default for StrokeAttr {
    fn default() -> Self {
        Self {
            active: Color::rgb(0xbf, 0x00, 0x00),
            stroke: StrokeColor::Fixed(Color::rgb(0x2c, 0x2c, 0x2c)),
            stroke_width: 4.0,
            stroke_linecap: LineCap::Round,
            stroke_linejoin: LineJoin::Round,
        }
    }
}

/// Background grid options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GridOptions {
    /// Paint the crosshair.
    pub show: bool,
    /// Crosshair line attributes.
    pub attr: GridAttr,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            show: true,
            attr: GridAttr::default(),
        }
    }
}

/// Crosshair line attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct GridAttr {
    /// Line colour.
    pub stroke: Color,
    /// Line width in user units.
    pub stroke_width: f64,
    /// Dash pattern in user units; empty means solid.
    pub stroke_dasharray: Vec<f64>,
}

impl Default for GridAttr {
    fn default() -> Self {
        Self {
            stroke: Color::rgb(0xcc, 0xcc, 0xcc),
            stroke_width: 0.5,
            stroke_dasharray: vec![4.0, 1.5],
        }
    }
}

/// Highlight applied to the current stroke of a frame snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SeriesActiveStyle {
    /// Highlight colour of the current stroke.
    pub stroke: Color,
    /// Direction arrow at the end of the current stroke.
    pub arrow: ArrowStyle,
}

impl Default for SeriesActiveStyle {
    fn default() -> Self {
        Self {
            stroke: Color::rgb(0xbf, 0x00, 0x00),
            arrow: ArrowStyle::default(),
        }
    }
}

/// Direction arrow glyph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ArrowStyle {
    /// Paint the arrow.
    pub visible: bool,
    /// Arrow length in user units.
    pub size: f64,
    /// Arrow fill.
    pub fill: Color,
}

impl Default for ArrowStyle {
    fn default() -> Self {
        Self {
            visible: true,
            size: 4.0,
            fill: Color::rgb(0xbf, 0x00, 0x00),
        }
    }
}

impl Options {
    /// Deep-merge a partial JSON document over the defaults and validate the result.
    ///
    /// Objects merge key by key; any other value (including arrays and `null`) replaces the
    /// default wholesale.
    pub fn merged(overrides: serde_json::Value) -> DmakResult<Self> {
        let mut base = serde_json::to_value(Self::default())
            .map_err(|e| DmakError::serde(format!("encode default options: {e}")))?;
        merge_json(&mut base, overrides);
        let out: Self = serde_json::from_value(base)
            .map_err(|e| DmakError::config(format!("parse options: {e}")))?;
        out.validate()?;
        Ok(out)
    }

    /// Parse and merge a partial options document from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> DmakResult<Self> {
        let value: serde_json::Value = serde_json::from_reader(r)
            .map_err(|e| DmakError::config(format!("parse options JSON: {e}")))?;
        Self::merged(value)
    }

    /// Parse and merge a partial options document from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> DmakResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            DmakError::config(format!("open options JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Check invariants the engine relies on.
    pub fn validate(&self) -> DmakResult<()> {
        if !self.step.is_finite() || self.step < 0.0 {
            return Err(DmakError::config("step must be finite and >= 0"));
        }
        if self.width == 0 || self.height == 0 {
            return Err(DmakError::config("width and height must be > 0"));
        }
        self.view_box.validate()?;
        if !self.stroke.attr.stroke_width.is_finite() || self.stroke.attr.stroke_width < 0.0 {
            return Err(DmakError::config("stroke.attr.stroke-width must be >= 0"));
        }
        if !self.stroke.order.attr.font_size.is_finite() || self.stroke.order.attr.font_size <= 0.0
        {
            return Err(DmakError::config("stroke.order.attr.font-size must be > 0"));
        }
        if !self.grid.attr.stroke_width.is_finite() || self.grid.attr.stroke_width < 0.0 {
            return Err(DmakError::config("grid.attr.stroke-width must be >= 0"));
        }
        if self
            .grid
            .attr
            .stroke_dasharray
            .iter()
            .any(|d| !d.is_finite() || *d < 0.0)
        {
            return Err(DmakError::config(
                "grid.attr.stroke-dasharray entries must be >= 0",
            ));
        }
        let arrow = &self.series_active_style.arrow;
        if !arrow.size.is_finite() || arrow.size < 0.0 {
            return Err(DmakError::config(
                "seriesActiveStyle.arrow.size must be >= 0",
            ));
        }
        Ok(())
    }
}

fn merge_json(base: &mut serde_json::Value, overrides: serde_json::Value) {
    match (base, overrides) {
        (serde_json::Value::Object(b), serde_json::Value::Object(o)) => {
            for (k, v) in o {
                match b.get_mut(&k) {
                    Some(slot) => merge_json(slot, v),
                    None => {
                        b.insert(k, v);
                    }
                }
            }
        }
        (slot, v) => *slot = v,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/options.rs"]
mod tests;
