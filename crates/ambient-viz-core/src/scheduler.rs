//! Active/idle frame loop selection.
//!
//! Exactly one loop runs at a time. Every transition cancels the pending
//! frame request before issuing a new one, so two loops can never be in
//! flight. When the canvas becomes invisible both loops are suspended and the
//! one that was running resumes on visibility.

use tracing::debug;

/// Handle returned by [`FrameClock::request_frame`]
pub type RequestId = u64;

/// Display-synchronised frame callbacks
pub trait FrameClock {
    /// Ask for one callback on the next display frame
    fn request_frame(&mut self) -> RequestId;

    /// Withdraw a request; unknown or already fired ids are ignored
    fn cancel_frame(&mut self, id: RequestId);
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LoopMode {
    /// Audio-reactive rendering while playing
    Active,
    /// Ambient animation while stopped
    Idle,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Active,
    /// Canvas hidden; `resume` runs again once visible
    Suspended { resume: LoopMode },
    /// Disposed, nothing will be scheduled again
    Shutdown,
}

pub struct FrameScheduler<C: FrameClock> {
    clock: C,
    state: SchedulerState,
    pending: Option<RequestId>,
    active_allowed: bool,
}

impl<C: FrameClock> FrameScheduler<C> {
    /// Starts in the idle loop, with the first frame already requested.
    ///
    /// `active_allowed` is false when no analyzer is available; play requests
    /// then keep the idle loop running.
    pub fn new(clock: C, active_allowed: bool) -> Self {
        let mut scheduler = Self {
            clock,
            state: SchedulerState::Idle,
            pending: None,
            active_allowed,
        };
        scheduler.schedule();
        scheduler
    }

    /// Switch to the active loop. Returns false if active mode is unavailable.
    pub fn play(&mut self) -> bool {
        if !self.active_allowed {
            debug!("Play ignored, no analyzer available");
            return false;
        }
        self.transition(LoopMode::Active);
        true
    }

    pub fn stop(&mut self) {
        self.transition(LoopMode::Idle);
    }

    pub fn set_visible(&mut self, visible: bool) {
        match (self.state, visible) {
            (SchedulerState::Idle, false) => self.suspend(LoopMode::Idle),
            (SchedulerState::Active, false) => self.suspend(LoopMode::Active),
            (SchedulerState::Suspended { resume }, true) => {
                debug!("Canvas visible, resuming {:?} loop", resume);
                self.start(resume);
            }
            _ => {}
        }
    }

    /// Frame callback. Returns the loop to render for `id`, or `None` if the
    /// request was superseded. The next frame is requested before returning.
    pub fn on_frame(&mut self, id: RequestId) -> Option<LoopMode> {
        if self.pending != Some(id) {
            return None;
        }
        self.pending = None;

        let mode = match self.state {
            SchedulerState::Active => LoopMode::Active,
            SchedulerState::Idle => LoopMode::Idle,
            SchedulerState::Suspended { .. } | SchedulerState::Shutdown => return None,
        };
        self.schedule();
        Some(mode)
    }

    /// Cancel everything; the scheduler stays inert afterwards
    pub fn shutdown(&mut self) {
        self.cancel_pending();
        self.state = SchedulerState::Shutdown;
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// True while in the active loop, or suspended with it pending resume
    pub fn is_playing(&self) -> bool {
        matches!(
            self.state,
            SchedulerState::Active
                | SchedulerState::Suspended {
                    resume: LoopMode::Active
                }
        )
    }

    pub fn pending_request(&self) -> Option<RequestId> {
        self.pending
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    fn transition(&mut self, mode: LoopMode) {
        match self.state {
            SchedulerState::Shutdown => {}
            // Remember the choice, stay hidden
            SchedulerState::Suspended { .. } => {
                self.state = SchedulerState::Suspended { resume: mode };
            }
            _ => self.start(mode),
        }
    }

    fn start(&mut self, mode: LoopMode) {
        self.cancel_pending();
        self.state = match mode {
            LoopMode::Active => SchedulerState::Active,
            LoopMode::Idle => SchedulerState::Idle,
        };
        self.schedule();
    }

    fn suspend(&mut self, resume: LoopMode) {
        debug!("Canvas hidden, suspending {:?} loop", resume);
        self.cancel_pending();
        self.state = SchedulerState::Suspended { resume };
    }

    fn schedule(&mut self) {
        self.pending = Some(self.clock.request_frame());
    }

    fn cancel_pending(&mut self) {
        if let Some(id) = self.pending.take() {
            self.clock.cancel_frame(id);
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::{FrameClock, RequestId};

    /// Clock that tracks outstanding requests instead of waiting for vsync
    #[derive(Debug, Default)]
    pub struct FakeClock {
        next_id: RequestId,
        pub outstanding: Vec<RequestId>,
    }

    impl FakeClock {
        /// Fire the single outstanding request, as a display would
        pub fn fire(&mut self) -> Option<RequestId> {
            if self.outstanding.is_empty() {
                None
            } else {
                Some(self.outstanding.remove(0))
            }
        }
    }

    impl FrameClock for FakeClock {
        fn request_frame(&mut self) -> RequestId {
            self.next_id += 1;
            self.outstanding.push(self.next_id);
            self.next_id
        }

        fn cancel_frame(&mut self, id: RequestId) {
            self.outstanding.retain(|&pending| pending != id);
        }
    }
}
