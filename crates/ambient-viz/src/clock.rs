//! Frame clock driven by nannou's redraw cycle.

use ambient_viz_core::{FrameClock, RequestId};

/// nannou redraws every frame on its own; this clock only hands out ids so
/// the scheduler can tell the current request from a cancelled one.
#[derive(Debug, Default)]
pub struct NextFrameClock {
    next_id: RequestId,
    pending: Option<RequestId>,
}

impl NextFrameClock {
    /// Request due on the upcoming redraw, if any
    pub fn due(&self) -> Option<RequestId> {
        self.pending
    }
}

impl FrameClock for NextFrameClock {
    fn request_frame(&mut self) -> RequestId {
        self.next_id = self.next_id.wrapping_add(1);
        self.pending = Some(self.next_id);
        self.next_id
    }

    fn cancel_frame(&mut self, id: RequestId) {
        if self.pending == Some(id) {
            self.pending = None;
        }
    }
}
