use crate::animation::tween::Tween;
use crate::config::color::{Color, ColorWheel};
use crate::config::options::{LineCap, LineJoin};
use crate::foundation::core::{BezPath, ElementId, Millis, Point, SurfaceId, ViewBox};
use crate::surface::backend::{DrawingBackend, StyleProp, Transition, TransitionProperty};
use std::collections::{BTreeMap, HashMap};
use std::fmt::Write as _;

/// Resolved presentation attributes of one element.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ElementStyle {
    /// Stroke colour.
    pub stroke: Option<Color>,
    /// Fill colour.
    pub fill: Option<Color>,
    /// Line width.
    pub stroke_width: Option<f64>,
    /// Line cap.
    pub linecap: Option<LineCap>,
    /// Line join.
    pub linejoin: Option<LineJoin>,
    /// Dash pattern; empty means solid.
    pub dash_array: Vec<f64>,
    /// Dash offset.
    pub dash_offset: f64,
    /// Font size.
    pub font_size: Option<f64>,
    /// Transition in effect.
    pub transition: Option<Transition>,
}

impl ElementStyle {
    fn apply(&mut self, prop: &StyleProp) {
        match prop {
            StyleProp::Stroke(c) => self.stroke = Some(*c),
            StyleProp::Fill(c) => self.fill = *c,
            StyleProp::StrokeWidth(w) => self.stroke_width = Some(*w),
            StyleProp::LineCap(c) => self.linecap = Some(*c),
            StyleProp::LineJoin(j) => self.linejoin = Some(*j),
            StyleProp::DashArray(d) => self.dash_array = d.clone(),
            StyleProp::DashOffset(o) => self.dash_offset = *o,
            StyleProp::FontSize(s) => self.font_size = Some(*s),
            StyleProp::Transition(t) => self.transition = *t,
        }
    }

    fn transition_for(&self, property: TransitionProperty) -> Option<Transition> {
        self.transition
            .filter(|t| t.property == property && t.duration.is_positive())
    }
}

/// Geometry of an element.
#[derive(Clone, Debug, PartialEq)]
pub enum ElementKind {
    /// Path element.
    Path(BezPath),
    /// Text element.
    Text {
        /// Baseline origin.
        at: Point,
        /// Content.
        value: String,
    },
}

struct Element {
    surface: SurfaceId,
    kind: ElementKind,
    specified: ElementStyle,
    computed: Option<ElementStyle>,
    dirty_since: Option<Millis>,
    dash_tween: Option<Tween<f64>>,
    stroke_tween: Option<Tween<Color>>,
}

impl Element {
    fn new(surface: SurfaceId, kind: ElementKind, now: Millis) -> Self {
        Self {
            surface,
            kind,
            specified: ElementStyle::default(),
            computed: None,
            dirty_since: Some(now),
            dash_tween: None,
            stroke_tween: None,
        }
    }

    /// Commit specified style. The first resolution of an element never animates; later ones
    /// start tweens for changed properties covered by the specified transition.
    fn resolve(&mut self) {
        let Some(since) = self.dirty_since.take() else {
            return;
        };
        let want = self.specified.clone();
        let Some(prev) = self.computed.take() else {
            self.computed = Some(want);
            return;
        };

        let dash_tr = want.transition_for(TransitionProperty::DashOffset);
        if prev.dash_offset != want.dash_offset {
            let from = self
                .dash_tween
                .as_ref()
                .map_or(prev.dash_offset, |t| t.sample(since));
            self.dash_tween = dash_tr.map(|t| Tween {
                from,
                to: want.dash_offset,
                start: since,
                duration: t.duration,
                ease: t.ease,
            });
        } else if dash_tr.is_none() {
            self.dash_tween = None;
        }

        let stroke_tr = want.transition_for(TransitionProperty::Stroke);
        match (prev.stroke, want.stroke) {
            (Some(old), Some(new)) if old != new => {
                let from = self
                    .stroke_tween
                    .as_ref()
                    .map_or(old, |t| t.sample(since));
                self.stroke_tween = stroke_tr.map(|t| Tween {
                    from,
                    to: new,
                    start: since,
                    duration: t.duration,
                    ease: t.ease,
                });
            }
            (old, new) if old != new || stroke_tr.is_none() => self.stroke_tween = None,
            _ => {}
        }

        self.computed = Some(want);
    }

    fn visual(&self, now: Millis) -> ElementStyle {
        let mut s = self
            .computed
            .clone()
            .unwrap_or_else(|| self.specified.clone());
        if let Some(t) = &self.dash_tween {
            s.dash_offset = t.sample(now);
        }
        if let Some(t) = &self.stroke_tween {
            s.stroke = Some(t.sample(now));
        }
        s
    }
}

struct SvgSurface {
    mount: String,
    width: u32,
    height: u32,
    view_box: Option<ViewBox>,
    class: Option<String>,
    order: Vec<ElementId>,
}

/// In-memory drawing backend that models style resolution and transitions, and serialises
/// surfaces to standalone SVG documents.
pub struct SvgBackend {
    now: Millis,
    next_surface: u32,
    next_element: u64,
    surfaces: BTreeMap<SurfaceId, SvgSurface>,
    elements: HashMap<ElementId, Element>,
    colors: ColorWheel,
    flushes: u64,
}

impl Default for SvgBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl SvgBackend {
    /// Empty backend at clock zero.
    pub fn new() -> Self {
        Self {
            now: Millis::ZERO,
            next_surface: 0,
            next_element: 0,
            surfaces: BTreeMap::new(),
            elements: HashMap::new(),
            colors: ColorWheel::default(),
            flushes: 0,
        }
    }

    /// Current clock.
    pub fn now(&self) -> Millis {
        self.now
    }

    /// Number of forced style resolutions so far.
    pub fn flushes(&self) -> u64 {
        self.flushes
    }

    /// Number of surfaces alive.
    pub fn live_surfaces(&self) -> usize {
        self.surfaces.len()
    }

    /// Surfaces under `mount`, in creation order.
    pub fn surfaces_in(&self, mount: &str) -> Vec<SurfaceId> {
        self.surfaces
            .iter()
            .filter(|(_, s)| s.mount == mount)
            .map(|(id, _)| *id)
            .collect()
    }

    /// Pixel size of a surface.
    pub fn surface_size(&self, surface: SurfaceId) -> Option<(u32, u32)> {
        self.surfaces.get(&surface).map(|s| (s.width, s.height))
    }

    /// View box of a surface, once set.
    pub fn view_box(&self, surface: SurfaceId) -> Option<ViewBox> {
        self.surfaces.get(&surface).and_then(|s| s.view_box)
    }

    /// Class marker of a surface, once set.
    pub fn surface_class(&self, surface: SurfaceId) -> Option<&str> {
        self.surfaces.get(&surface).and_then(|s| s.class.as_deref())
    }

    /// Elements on a surface, in paint order.
    pub fn elements_on(&self, surface: SurfaceId) -> Vec<ElementId> {
        self.surfaces
            .get(&surface)
            .map(|s| s.order.clone())
            .unwrap_or_default()
    }

    /// Total live elements across all surfaces.
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// `true` while `element` exists.
    pub fn contains(&self, element: ElementId) -> bool {
        self.elements.contains_key(&element)
    }

    /// Geometry of `element`.
    pub fn kind(&self, element: ElementId) -> Option<&ElementKind> {
        self.elements.get(&element).map(|e| &e.kind)
    }

    /// Surface that owns `element`.
    pub fn owner(&self, element: ElementId) -> Option<SurfaceId> {
        self.elements.get(&element).map(|e| e.surface)
    }

    /// Style of `element` as it appears at the current clock.
    pub fn style(&mut self, element: ElementId) -> Option<ElementStyle> {
        self.resolve_all();
        let now = self.now;
        self.elements.get(&element).map(|e| e.visual(now))
    }

    /// Serialise a surface, as it appears at the current clock, to an SVG document.
    pub fn surface_svg(&mut self, surface: SurfaceId) -> Option<String> {
        self.resolve_all();
        let s = self.surfaces.get(&surface)?;

        let mut out = String::new();
        let _ = write!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}px" height="{}px""#,
            s.width, s.height
        );
        if let Some(vb) = s.view_box {
            let _ = write!(out, r#" viewBox="{} {} {} {}""#, vb.x, vb.y, vb.w, vb.h);
        }
        if let Some(class) = &s.class {
            let _ = write!(out, r#" class="{}""#, escape_xml(class));
        }
        out.push_str(">\n");

        for id in &s.order {
            if let Some(el) = self.elements.get(id) {
                write_element(&mut out, el, self.now);
            }
        }
        out.push_str("</svg>\n");
        Some(out)
    }

    fn resolve_all(&mut self) {
        for el in self.elements.values_mut() {
            el.resolve();
        }
    }

    fn alloc_element(&mut self, surface: SurfaceId, kind: ElementKind) -> ElementId {
        let id = ElementId(self.next_element);
        self.next_element += 1;
        match self.surfaces.get_mut(&surface) {
            Some(s) => {
                s.order.push(id);
                self.elements
                    .insert(id, Element::new(surface, kind, self.now));
            }
            None => tracing::debug!(?surface, "element added to unknown surface; detached"),
        }
        id
    }
}

impl DrawingBackend for SvgBackend {
    fn create_surface(&mut self, mount: &str, width: u32, height: u32) -> SurfaceId {
        let id = SurfaceId(self.next_surface);
        self.next_surface += 1;
        self.surfaces.insert(
            id,
            SvgSurface {
                mount: mount.to_owned(),
                width,
                height,
                view_box: None,
                class: None,
                order: Vec::new(),
            },
        );
        id
    }

    fn set_view_box(&mut self, surface: SurfaceId, view_box: ViewBox) {
        if let Some(s) = self.surfaces.get_mut(&surface) {
            s.view_box = Some(view_box);
        }
    }

    fn set_surface_class(&mut self, surface: SurfaceId, class: &str) {
        if let Some(s) = self.surfaces.get_mut(&surface) {
            s.class = Some(class.to_owned());
        }
    }

    fn destroy_surface(&mut self, surface: SurfaceId) {
        if let Some(s) = self.surfaces.remove(&surface) {
            for id in s.order {
                self.elements.remove(&id);
            }
        }
    }

    fn add_path(&mut self, surface: SurfaceId, path: &BezPath) -> ElementId {
        self.alloc_element(surface, ElementKind::Path(path.clone()))
    }

    fn add_text(&mut self, surface: SurfaceId, at: Point, value: &str) -> ElementId {
        self.alloc_element(
            surface,
            ElementKind::Text {
                at,
                value: value.to_owned(),
            },
        )
    }

    fn set_style(&mut self, element: ElementId, props: &[StyleProp]) {
        let now = self.now;
        if let Some(el) = self.elements.get_mut(&element) {
            for p in props {
                el.specified.apply(p);
            }
            el.dirty_since.get_or_insert(now);
        }
    }

    fn flush_layout(&mut self, _element: ElementId) {
        self.flushes += 1;
        self.resolve_all();
    }

    fn remove(&mut self, element: ElementId) {
        if let Some(el) = self.elements.remove(&element)
            && let Some(s) = self.surfaces.get_mut(&el.surface)
        {
            s.order.retain(|id| *id != element);
        }
    }

    fn next_color(&mut self) -> Color {
        self.colors.next_color()
    }

    fn sync_clock(&mut self, now: Millis) {
        // Changes made before the clock moved belong to the earlier frame.
        self.resolve_all();
        self.now = now;
    }
}

fn write_element(out: &mut String, el: &Element, now: Millis) {
    let style = el.visual(now);
    match &el.kind {
        ElementKind::Path(path) => {
            let _ = write!(out, r#"<path d="{}""#, path.to_svg());
            write_paint_attrs(out, &style, "none");
            out.push_str("/>\n");
        }
        ElementKind::Text { at, value } => {
            let _ = write!(out, r#"<text x="{}" y="{}""#, at.x, at.y);
            if let Some(size) = style.font_size {
                let _ = write!(out, r#" font-size="{size}""#);
            }
            write_paint_attrs(out, &style, "#000000");
            let _ = writeln!(out, ">{}</text>", escape_xml(value));
        }
    }
}

fn write_paint_attrs(out: &mut String, style: &ElementStyle, default_fill: &str) {
    let fill = style
        .fill
        .map_or_else(|| default_fill.to_owned(), Color::to_hex);
    let _ = write!(out, r#" fill="{fill}""#);
    if let Some(c) = style.stroke {
        let _ = write!(out, r#" stroke="{}""#, c.to_hex());
    }
    if let Some(w) = style.stroke_width {
        let _ = write!(out, r#" stroke-width="{w}""#);
    }
    if let Some(cap) = style.linecap {
        let _ = write!(out, r#" stroke-linecap="{}""#, cap.as_str());
    }
    if let Some(join) = style.linejoin {
        let _ = write!(out, r#" stroke-linejoin="{}""#, join.as_str());
    }
    if !style.dash_array.is_empty() {
        let dashes: Vec<String> = style.dash_array.iter().map(f64::to_string).collect();
        let _ = write!(out, r#" stroke-dasharray="{}""#, dashes.join(" "));
        let _ = write!(out, r#" stroke-dashoffset="{}""#, style.dash_offset);
    }
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/surface/svg.rs"]
mod tests;
