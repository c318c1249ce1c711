use crate::config::options::Options;
use crate::foundation::core::{ElementId, Millis, SurfaceId};
use crate::foundation::error::{DmakResult, Rejected};
use crate::loader::source::{KanjiVgDir, StrokeSource, load_word};
use crate::playback::events::{PlaybackObserver, TracingObserver};
use crate::playback::renderer::StrokeRenderer;
use crate::playback::timeline::{Timeline, TimerId};
use crate::strokes::model::{CharStrokes, Stroke, preprocess_strokes};
use crate::surface::backend::DrawingBackend;
use crate::surface::provision::provision_surfaces;
use std::collections::BTreeSet;

/// Externally visible engine state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineState {
    /// No playback run; no retract in flight.
    Idle,
    /// A render run has scheduled draws outstanding.
    Playing,
    /// Retract transitions are in flight.
    Erasing,
    /// Terminal.
    Destroyed,
}

/// Timer categories. `pause` cancels [`TimerKind::Play`] only; `destroy` cancels all.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerKind {
    /// Scheduled draws of the active render run.
    Play,
    /// Retract completions.
    Erasing,
    /// Post-reveal colour settles.
    Drawing,
    /// Deferred continuations such as the render half of `restart`.
    Control,
}

/// Completion value of an erase: settled once every retract it started has finished.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EraseCompletion {
    settles_at: Millis,
}

impl EraseCompletion {
    /// Clock time at which the last retract completes.
    pub fn settles_at(&self) -> Millis {
        self.settles_at
    }
}

/// Surfaces painted by one `render_frame` call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameSnapshot {
    surfaces: Vec<SurfaceId>,
}

impl FrameSnapshot {
    /// Snapshot surfaces, one per character.
    pub fn surfaces(&self) -> &[SurfaceId] {
        &self.surfaces
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum RunState {
    Idle,
    Playing,
}

#[derive(Clone, Copy, Debug)]
enum Task {
    Draw { index: usize },
    Settle { index: usize, element: ElementId },
    FinishErase { index: usize, element: ElementId },
    ResumeRender,
}

#[derive(Default)]
struct TimerSets {
    play: BTreeSet<TimerId>,
    erasing: BTreeSet<TimerId>,
    drawing: BTreeSet<TimerId>,
    control: BTreeSet<TimerId>,
}

impl TimerSets {
    fn get(&self, kind: TimerKind) -> &BTreeSet<TimerId> {
        match kind {
            TimerKind::Play => &self.play,
            TimerKind::Erasing => &self.erasing,
            TimerKind::Drawing => &self.drawing,
            TimerKind::Control => &self.control,
        }
    }

    fn get_mut(&mut self, kind: TimerKind) -> &mut BTreeSet<TimerId> {
        match kind {
            TimerKind::Play => &mut self.play,
            TimerKind::Erasing => &mut self.erasing,
            TimerKind::Drawing => &mut self.drawing,
            TimerKind::Control => &mut self.control,
        }
    }
}

/// Stroke playback engine for one word.
///
/// Single-threaded and driven by a virtual clock: nothing happens between calls, and scheduled
/// work runs only from [`Dmak::advance`], [`Dmak::advance_to`] and [`Dmak::run_until_idle`].
/// Conflicting requests are rejected with a [`Rejected`] value and leave the state unchanged.
pub struct Dmak<B: DrawingBackend> {
    text: String,
    options: Options,
    backend: B,
    observer: Box<dyn PlaybackObserver>,
    strokes: Vec<Stroke>,
    char_count: usize,
    surfaces: Vec<SurfaceId>,
    frames: Vec<SurfaceId>,
    pointer: usize,
    loaded: bool,
    destroyed: bool,
    run: RunState,
    timeline: Timeline<Task>,
    timers: TimerSets,
}

impl<B: DrawingBackend> Dmak<B> {
    /// Create an engine for `text`, loading KanjiVG files from `options.uri` unless `skipLoad`.
    pub fn new(text: impl Into<String>, options: Options, backend: B) -> DmakResult<Self> {
        let source = KanjiVgDir::new(options.uri.clone());
        Self::with_source(text, options, backend, &source, TracingObserver)
    }

    /// Create an engine reading stroke data from `source` and reporting to `observer`.
    ///
    /// Invalid options fail construction. A load failure under the `abort` policy is
    /// logged and leaves the engine unloaded.
    pub fn with_source(
        text: impl Into<String>,
        options: Options,
        backend: B,
        source: &dyn StrokeSource,
        observer: impl PlaybackObserver + 'static,
    ) -> DmakResult<Self> {
        options.validate()?;
        let mut engine = Self {
            text: text.into(),
            options,
            backend,
            observer: Box::new(observer),
            strokes: Vec::new(),
            char_count: 0,
            surfaces: Vec::new(),
            frames: Vec::new(),
            pointer: 0,
            loaded: false,
            destroyed: false,
            run: RunState::Idle,
            timeline: Timeline::new(),
            timers: TimerSets::default(),
        };

        if !engine.options.skip_load {
            match load_word(source, &engine.text, engine.options.load_failure) {
                Ok(data) => engine.deliver(data),
                Err(e) => {
                    tracing::error!(error = %e, text = %engine.text, "stroke data load failed");
                }
            }
        }
        Ok(engine)
    }

    /// Hand over per-character stroke data: prepare strokes and surfaces, notify `loaded`, then
    /// start playback per `autoplay`/`renderAt`. No-op after destroy or a previous delivery.
    #[tracing::instrument(skip(self, data), fields(chars = data.len()))]
    pub fn deliver(&mut self, data: Vec<CharStrokes>) {
        if self.destroyed {
            tracing::debug!("delivery after destroy ignored");
            return;
        }
        if self.loaded {
            tracing::warn!("stroke data already delivered; ignoring");
            return;
        }

        let backend = &self.backend;
        self.strokes = preprocess_strokes(&data, self.options.step, |p| backend.path_length(p));
        self.char_count = data.len();
        if !self.options.skip_papers {
            let mount = self.options.element.clone();
            self.surfaces =
                provision_surfaces(&mut self.backend, &self.options, &mount, self.char_count);
        }
        self.loaded = true;
        self.observer.loaded(&self.strokes);

        if self.options.autoplay || self.options.render_at.is_some() {
            if let Err(r) = self.render(self.options.render_at) {
                tracing::warn!(reason = %r, "initial render rejected");
            }
        }
    }

    /// Use caller-provisioned surfaces (for `skipPapers`); `surfaces[i]` hosts character `i`.
    pub fn attach_surfaces(&mut self, surfaces: Vec<SurfaceId>) {
        if self.destroyed {
            return;
        }
        self.surfaces = surfaces;
    }

    /// Draw strokes from the pointer up to `end` (default: all).
    ///
    /// The first stroke draws immediately; each later one is scheduled after the summed durations
    /// of the strokes before it in this run. Outstanding retracts are finalised first.
    pub fn render(&mut self, end: Option<usize>) -> Result<(), Rejected> {
        if self.destroyed {
            return Err(Rejected::Destroyed);
        }
        if !self.loaded {
            return Err(Rejected::NotLoaded);
        }
        if self.run == RunState::Playing {
            return Err(Rejected::Busy);
        }
        let count = self.strokes.len();
        let end = end.unwrap_or(count);
        if end > count {
            return Err(Rejected::OutOfRange { target: end, count });
        }

        self.finalize_erasures();

        let start = self.pointer;
        let animated = self.options.stroke.animated.drawing;
        let mut delay = Millis::ZERO;
        for index in start..end {
            if !animated || !delay.is_positive() {
                self.draw_next();
            } else {
                let id = self.timeline.schedule(delay, Task::Draw { index });
                self.timers.play.insert(id);
                self.run = RunState::Playing;
            }
            delay += self.strokes[index].duration();
        }
        tracing::debug!(from = start, end, scheduled = self.timers.play.len(), "render");
        Ok(())
    }

    /// Erase strokes from the pointer down to `end` (default 0), exclusive.
    ///
    /// Pointer and `erased` notifications update synchronously; retracts finish by the returned
    /// completion.
    pub fn erase(&mut self, end: Option<usize>) -> Result<EraseCompletion, Rejected> {
        if self.destroyed {
            return Err(Rejected::Destroyed);
        }
        if !self.loaded {
            return Err(Rejected::NotLoaded);
        }
        if self.run == RunState::Playing {
            return Err(Rejected::Busy);
        }
        let end = end.unwrap_or(0);
        if self.pointer == 0 || self.pointer <= end {
            return Err(Rejected::NothingToErase);
        }

        let renderer = StrokeRenderer::new(&self.options);
        let mut longest = Millis::ZERO;
        while self.pointer > end {
            self.pointer -= 1;
            let index = self.pointer;
            if let Some((element, after)) = renderer.erase(&mut self.backend, &mut self.strokes[index])
            {
                let id = self
                    .timeline
                    .schedule(after, Task::FinishErase { index, element });
                self.timers.erasing.insert(id);
                longest = longest.max(after);
            }
            self.observer.erased(index);
        }
        tracing::debug!(pointer = self.pointer, "erase");
        Ok(EraseCompletion {
            settles_at: self.now() + longest,
        })
    }

    /// `erase(pointer - n)`, saturating at 0.
    pub fn erase_last_strokes(&mut self, n: usize) -> Result<EraseCompletion, Rejected> {
        self.erase(Some(self.pointer.saturating_sub(n)))
    }

    /// `render(pointer + n)`.
    pub fn render_next_strokes(&mut self, n: usize) -> Result<(), Rejected> {
        self.render(Some(self.pointer.saturating_add(n)))
    }

    /// Cancel outstanding draws of the active run. Idempotent.
    pub fn pause(&mut self) {
        self.cancel_all(TimerKind::Play);
        self.run = RunState::Idle;
    }

    /// Pause, erase everything, then render from the start once the erase settles.
    pub fn restart(&mut self) -> Result<(), Rejected> {
        if self.destroyed {
            return Err(Rejected::Destroyed);
        }
        self.pause();
        self.cancel_all(TimerKind::Control);
        let now = self.now();
        match self.erase(None) {
            Ok(done) if done.settles_at > now => {
                let id = self
                    .timeline
                    .schedule(done.settles_at.since(now), Task::ResumeRender);
                self.timers.control.insert(id);
                Ok(())
            }
            Ok(_) | Err(Rejected::NothingToErase) => self.render(None),
            Err(r) => Err(r),
        }
    }

    /// Tear down: cancel every timer and release every surface, frame snapshots included.
    /// Idempotent; later calls are rejected or ignored.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        self.pause();
        for kind in [TimerKind::Erasing, TimerKind::Drawing, TimerKind::Control] {
            self.cancel_all(kind);
        }
        for s in self.surfaces.drain(..).chain(self.frames.drain(..)) {
            self.backend.destroy_surface(s);
        }
        for stroke in &mut self.strokes {
            stroke.rendered = None;
        }
        tracing::debug!(text = %self.text, "engine destroyed");
    }

    /// Paint a static snapshot of progress `0..=stroke_index` on fresh surfaces under `mount`,
    /// highlighting the last stroke. Engine pointer and timers are untouched.
    pub fn render_frame(
        &mut self,
        stroke_index: usize,
        mount: &str,
    ) -> Result<FrameSnapshot, Rejected> {
        if self.destroyed {
            return Err(Rejected::Destroyed);
        }
        if !self.loaded {
            return Err(Rejected::NotLoaded);
        }
        let count = self.strokes.len();
        if stroke_index >= count {
            return Err(Rejected::OutOfRange {
                target: stroke_index,
                count,
            });
        }

        let surfaces = provision_surfaces(&mut self.backend, &self.options, mount, self.char_count);
        let renderer = StrokeRenderer::new(&self.options);
        let highlight = self.options.series_active_style.stroke;
        for (i, stroke) in self.strokes[..=stroke_index].iter().enumerate() {
            let Some(&surface) = surfaces.get(stroke.char_index()) else {
                continue;
            };
            let current = i == stroke_index;
            renderer.paint_static(
                &mut self.backend,
                surface,
                stroke,
                current.then_some(highlight),
            );
            if current {
                renderer.paint_arrow(&mut self.backend, surface, stroke);
            }
        }
        self.frames.extend(&surfaces);
        Ok(FrameSnapshot { surfaces })
    }

    /// Destroy the surfaces of a frame snapshot.
    pub fn release_frame(&mut self, snapshot: FrameSnapshot) {
        for s in snapshot.surfaces {
            if let Some(pos) = self.frames.iter().position(|f| *f == s) {
                self.frames.swap_remove(pos);
                self.backend.destroy_surface(s);
            }
        }
    }

    /// Move the clock forward by `dt`, firing everything that falls due.
    pub fn advance(&mut self, dt: Millis) {
        let target = self.now() + dt.max(Millis::ZERO);
        self.advance_to(target);
    }

    /// Move the clock to `t`, firing due tasks in `(due, scheduling order)` order.
    ///
    /// Non-finite targets are ignored.
    pub fn advance_to(&mut self, t: Millis) {
        if !t.as_f64().is_finite() {
            tracing::warn!(target_ms = t.as_f64(), "non-finite clock target ignored");
            return;
        }
        while let Some((id, task)) = self.timeline.pop_due(t) {
            self.backend.sync_clock(self.timeline.now());
            self.fire(id, task);
        }
        self.timeline.set_now(t);
        self.backend.sync_clock(self.timeline.now());
    }

    /// Fire tasks until none remain; returns the final clock.
    pub fn run_until_idle(&mut self) -> Millis {
        while let Some(due) = self.timeline.next_due() {
            self.advance_to(due);
        }
        self.now()
    }

    /// Current clock.
    pub fn now(&self) -> Millis {
        self.timeline.now()
    }

    /// Due time of the next pending task.
    pub fn next_due(&self) -> Option<Millis> {
        self.timeline.next_due()
    }

    /// `true` once the clock has reached the completion's settle time.
    pub fn is_settled(&self, completion: &EraseCompletion) -> bool {
        self.now() >= completion.settles_at
    }

    /// Number of strokes drawn (or being drawn).
    pub fn pointer(&self) -> usize {
        self.pointer
    }

    /// Prepared strokes, in drawing order.
    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    /// Playback surfaces, one per character.
    pub fn surfaces(&self) -> &[SurfaceId] {
        &self.surfaces
    }

    /// Text this engine plays.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Effective options.
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Current externally visible state.
    pub fn state(&self) -> EngineState {
        if self.destroyed {
            EngineState::Destroyed
        } else if self.run == RunState::Playing {
            EngineState::Playing
        } else if !self.timers.erasing.is_empty() {
            EngineState::Erasing
        } else {
            EngineState::Idle
        }
    }

    /// Outstanding timers of one category.
    pub fn pending_timers(&self, kind: TimerKind) -> usize {
        self.timers.get(kind).len()
    }

    /// Stroke data has been delivered.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// `destroy` has been called.
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Drawing backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Drawing backend, mutably (for inspection that resolves styles).
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    fn fire(&mut self, id: TimerId, task: Task) {
        match task {
            Task::Draw { index } => {
                self.timers.play.remove(&id);
                if self.timers.play.is_empty() {
                    self.run = RunState::Idle;
                }
                debug_assert_eq!(index, self.pointer);
                self.draw_next();
            }
            Task::Settle { index, element } => {
                self.timers.drawing.remove(&id);
                if let Some(stroke) = self.strokes.get(index) {
                    StrokeRenderer::new(&self.options).settle(&mut self.backend, stroke, element);
                }
            }
            Task::FinishErase { index, element } => {
                self.timers.erasing.remove(&id);
                self.finish_erase(index, element);
            }
            Task::ResumeRender => {
                self.timers.control.remove(&id);
                if self.destroyed {
                    return;
                }
                if let Err(r) = self.render(None) {
                    tracing::debug!(reason = %r, "deferred render after restart rejected");
                }
            }
        }
    }

    /// Draw the stroke at the pointer, notify, and advance the pointer.
    fn draw_next(&mut self) {
        let index = self.pointer;
        let Some(stroke) = self.strokes.get_mut(index) else {
            return;
        };
        match self.surfaces.get(stroke.char_index()) {
            Some(&surface) => {
                let renderer = StrokeRenderer::new(&self.options);
                if let Some((element, after)) = renderer.draw(&mut self.backend, surface, stroke) {
                    let id = self
                        .timeline
                        .schedule(after, Task::Settle { index, element });
                    self.timers.drawing.insert(id);
                }
            }
            None => tracing::warn!(
                index,
                char_index = stroke.char_index(),
                "no surface for stroke; skipped painting"
            ),
        }
        self.observer.drew(index);
        self.pointer += 1;
    }

    fn finish_erase(&mut self, index: usize, element: ElementId) {
        if let Some(stroke) = self.strokes.get_mut(index) {
            StrokeRenderer::new(&self.options).finish_erase(&mut self.backend, stroke, element);
        }
    }

    /// Cancel pending retracts and complete them now.
    fn finalize_erasures(&mut self) {
        for id in std::mem::take(&mut self.timers.erasing) {
            if let Some(Task::FinishErase { index, element }) = self.timeline.cancel(id) {
                self.finish_erase(index, element);
            }
        }
    }

    fn cancel_all(&mut self, kind: TimerKind) {
        for id in std::mem::take(self.timers.get_mut(kind)) {
            self.timeline.cancel(id);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/playback/engine.rs"]
mod tests;
