//! src/graph/scheduler.rs
//!
//! Frame scheduler: a registry of animation callbacks driven once per frame
//! against a single attached surface, plus the frame clock they read.

use std::time::{Duration, Instant};

use super::surface::Surface;

/// Timestamps of the two most recent frames.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameClock {
    previous: Option<Instant>,
    current: Option<Instant>,
    frames: u64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the start of a new frame at `now`.
    pub fn advance(&mut self, now: Instant) {
        self.previous = self.current;
        self.current = Some(now);
        self.frames += 1;
    }

    /// Time since the previous frame; zero on the first frame after a
    /// (re)start.
    pub fn elapsed(&self) -> Duration {
        match (self.previous, self.current) {
            (Some(prev), Some(cur)) => cur.saturating_duration_since(prev),
            _ => Duration::ZERO,
        }
    }

    /// Forget the previous timestamps so a long pause is not replayed as one
    /// huge step.
    pub fn restart(&mut self) {
        self.previous = None;
        self.current = None;
    }

    #[inline]
    pub fn frame_count(&self) -> u64 {
        self.frames
    }
}

/// Handle returned by [`FrameScheduler::add`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AnimationId(u64);

pub type FrameCallback<T> = Box<dyn FnMut(&mut T, &FrameClock, &mut dyn Surface)>;

struct Animation<T> {
    id: AnimationId,
    target: T,
    callback: FrameCallback<T>,
}

/// What a call to [`FrameScheduler::tick`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameOutcome {
    /// The surface was cleared and this many callbacks ran.
    Drawn(usize),
    Paused,
    NoSurface,
}

/// Runs registered animations in registration order, one frame per `tick`.
pub struct FrameScheduler<T, S: Surface> {
    surface: Option<S>,
    animations: Vec<Animation<T>>,
    clock: FrameClock,
    paused: bool,
    next_id: u64,
}

impl<T, S: Surface> Default for FrameScheduler<T, S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, S: Surface> FrameScheduler<T, S> {
    pub fn new() -> Self {
        Self {
            surface: None,
            animations: Vec::new(),
            clock: FrameClock::new(),
            paused: false,
            next_id: 0,
        }
    }

    /// Attach the rendering surface, returning the previous one.
    pub fn attach(&mut self, surface: S) -> Option<S> {
        self.surface.replace(surface)
    }

    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    pub fn surface_mut(&mut self) -> Option<&mut S> {
        self.surface.as_mut()
    }

    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    pub fn len(&self) -> usize {
        self.animations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.animations.is_empty()
    }

    /// Register `callback` to run against `target` every frame.
    pub fn add(&mut self, target: T, callback: FrameCallback<T>) -> AnimationId {
        let id = AnimationId(self.next_id);
        self.next_id += 1;
        self.animations.push(Animation {
            id,
            target,
            callback,
        });
        tracing::debug!(id = id.0, "animation registered");
        id
    }

    /// Unregister an animation and hand its target back.
    pub fn remove(&mut self, id: AnimationId) -> Option<T> {
        let index = self.animations.iter().position(|a| a.id == id)?;
        tracing::debug!(id = id.0, "animation removed");
        Some(self.animations.remove(index).target)
    }

    pub fn pause(&mut self) {
        if !self.paused {
            self.paused = true;
            tracing::info!("frame scheduler paused");
        }
    }

    pub fn resume(&mut self) {
        if self.paused {
            self.paused = false;
            self.clock.restart();
            tracing::info!("frame scheduler resumed");
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Run one frame at `now`: clear the surface, then invoke every
    /// callback in registration order.
    pub fn tick(&mut self, now: Instant) -> FrameOutcome {
        let Some(surface) = self.surface.as_mut() else {
            tracing::error!("no surface attached, skipping frame");
            return FrameOutcome::NoSurface;
        };
        if self.paused {
            return FrameOutcome::Paused;
        }

        self.clock.advance(now);
        surface.clear();
        for animation in &mut self.animations {
            (animation.callback)(&mut animation.target, &self.clock, &mut *surface);
        }
        FrameOutcome::Drawn(self.animations.len())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::graph::display_list::{DisplayList, DrawCommand};
    use crate::graph::surface::{Circle, Point, SurfaceSize};

    type Log = Rc<RefCell<Vec<(&'static str, Duration)>>>;

    fn recorder(name: &'static str) -> FrameCallback<Log> {
        Box::new(move |log: &mut Log, clock: &FrameClock, surface: &mut dyn Surface| {
            log.borrow_mut().push((name, clock.elapsed()));
            surface.draw_shape(&Circle::dot(Point::new(1.0, 1.0)).into());
        })
    }

    fn scheduler() -> FrameScheduler<Log, DisplayList> {
        let mut s = FrameScheduler::new();
        s.attach(DisplayList::new(SurfaceSize::new(100.0, 100.0)));
        s
    }

    #[test]
    fn callbacks_run_in_registration_order() {
        let log: Log = Rc::default();
        let mut s = scheduler();
        s.add(log.clone(), recorder("a"));
        let b = s.add(log.clone(), recorder("b"));
        s.add(log.clone(), recorder("c"));

        assert_eq!(s.tick(Instant::now()), FrameOutcome::Drawn(3));
        let names: Vec<_> = log.borrow().iter().map(|(n, _)| *n).collect();
        assert_eq!(names, ["a", "b", "c"]);

        assert!(s.remove(b).is_some());
        assert!(s.remove(b).is_none());
        log.borrow_mut().clear();
        s.tick(Instant::now());
        let names: Vec<_> = log.borrow().iter().map(|(n, _)| *n).collect();
        assert_eq!(names, ["a", "c"]);
    }

    #[test]
    fn surface_is_cleared_each_frame() {
        let log: Log = Rc::default();
        let mut s = scheduler();
        s.add(log, recorder("a"));
        for _ in 0..3 {
            s.tick(Instant::now());
        }
        let surface = s.surface().expect("surface");
        let circles = surface
            .commands()
            .iter()
            .filter(|c| matches!(c, DrawCommand::Shape(_)))
            .count();
        assert_eq!(circles, 1);
    }

    #[test]
    fn missing_surface_skips_frame() {
        let log: Log = Rc::default();
        let mut s: FrameScheduler<Log, DisplayList> = FrameScheduler::new();
        s.add(log.clone(), recorder("a"));
        assert_eq!(s.tick(Instant::now()), FrameOutcome::NoSurface);
        assert!(log.borrow().is_empty());
        assert_eq!(s.clock().frame_count(), 0);
    }

    #[test]
    fn pause_stops_frames_and_resume_restarts_clock() {
        let log: Log = Rc::default();
        let mut s = scheduler();
        s.add(log.clone(), recorder("a"));
        let t0 = Instant::now();
        s.tick(t0);
        s.tick(t0 + Duration::from_millis(16));
        assert_eq!(log.borrow()[1].1, Duration::from_millis(16));

        s.pause();
        assert!(s.is_paused());
        assert_eq!(s.tick(t0 + Duration::from_secs(1)), FrameOutcome::Paused);
        assert_eq!(log.borrow().len(), 2);

        s.resume();
        s.tick(t0 + Duration::from_secs(5));
        assert_eq!(log.borrow()[2].1, Duration::ZERO);
        s.tick(t0 + Duration::from_millis(5_020));
        assert_eq!(log.borrow()[3].1, Duration::from_millis(20));
    }
}
