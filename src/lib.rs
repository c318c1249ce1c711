//! Draw Me A Kanji: animated stroke-order playback for Japanese characters.
//!
//! A [`Dmak`] engine turns per-character stroke data (KanjiVG by default) into a timed sequence
//! of draw and erase operations on drawing surfaces:
//!
//! - Build typed [`Options`] (defaults, [`Options::merged`] or [`Options::from_path`])
//! - Create an engine over a [`DrawingBackend`] such as [`SvgBackend`]
//! - Drive playback with `render`/`erase`/`pause`/`restart` and the virtual clock
//!   ([`Dmak::advance`], [`Dmak::run_until_idle`])
//! - Snapshot progress with [`Dmak::render_frame`] and write PNGs with [`Rasterizer`]
#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod foundation;

pub(crate) mod animation;
pub(crate) mod config;
pub(crate) mod loader;
pub(crate) mod playback;
pub(crate) mod strokes;
pub(crate) mod surface;

/// PNG output for serialised surfaces.
pub mod raster;

pub use crate::foundation::core::{BezPath, ElementId, Millis, Point, SurfaceId, Vec2, ViewBox};
pub use crate::foundation::error::{DmakError, DmakResult, Rejected};

pub use crate::animation::ease::Ease;
pub use crate::animation::tween::{Lerp, Tween};
pub use crate::config::color::{Color, ColorWheel, StrokeColor};
pub use crate::config::options::{
    Animated, ArrowStyle, GridAttr, GridOptions, LabelAttr, LineCap, LineJoin, Options,
    OrderOptions, SeriesActiveStyle, StrokeAttr, StrokeOptions,
};
pub use crate::loader::kanjivg::parse_kanjivg;
pub use crate::loader::source::{
    KanjiVgDir, LoadFailurePolicy, MemorySource, StrokeSource, char_code, is_blank_glyph,
    load_word,
};
pub use crate::playback::engine::{Dmak, EngineState, EraseCompletion, FrameSnapshot, TimerKind};
pub use crate::playback::events::{EventLog, PlaybackEvent, PlaybackObserver, TracingObserver};
pub use crate::playback::timeline::TimerId;
pub use crate::raster::Rasterizer;
pub use crate::strokes::geometry::{
    PathPoint, arrow_head, parse_path, path_length, point_at_length,
};
pub use crate::strokes::model::{
    CharStrokes, OrderLabel, PathData, RawStroke, Stroke, preprocess_strokes,
};
pub use crate::surface::backend::{DrawingBackend, StyleProp, Transition, TransitionProperty};
pub use crate::surface::provision::{SURFACE_CLASS, paint_grid, provision_surfaces};
pub use crate::surface::svg::{ElementKind, ElementStyle, SvgBackend};
