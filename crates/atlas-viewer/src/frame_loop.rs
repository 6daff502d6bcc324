//! Cancellable repeating frame task.
//!
//! Every scheduled frame carries a [`FrameTicket`]. The host delivers frames
//! without payload, so [`FrameLoop::begin_frame`] only proceeds while a
//! ticket is pending and the loop is running. Pausing or stopping drops the
//! pending ticket, which turns any late host callback into a no-op.

/// Identifier of one scheduled frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FrameTicket(u64);

impl FrameTicket {
    pub fn id(self) -> u64 {
        self.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Running,
    Paused,
    /// Terminal.
    Stopped,
}

#[derive(Debug)]
pub struct FrameLoop {
    state: LoopState,
    next_ticket: u64,
    pending: Option<FrameTicket>,
    frames: u64,
}

impl Default for FrameLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameLoop {
    pub fn new() -> Self {
        Self {
            state: LoopState::Idle,
            next_ticket: 0,
            pending: None,
            frames: 0,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    pub fn pending(&self) -> Option<FrameTicket> {
        self.pending
    }

    /// Number of frames accepted by [`begin_frame`](Self::begin_frame).
    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    /// `Idle`/`Paused` -> `Running`. Returns the first ticket, which the
    /// caller must schedule with the host. No-op while running or stopped.
    pub fn start(&mut self) -> Option<FrameTicket> {
        match self.state {
            LoopState::Idle | LoopState::Paused => {
                self.state = LoopState::Running;
                Some(self.issue())
            }
            LoopState::Running | LoopState::Stopped => None,
        }
    }

    /// `Running` -> `Paused`, cancelling the pending frame. Returns whether
    /// the state changed.
    pub fn pause(&mut self) -> bool {
        if self.state != LoopState::Running {
            return false;
        }
        self.state = LoopState::Paused;
        self.pending = None;
        true
    }

    /// Cancel for good.
    pub fn stop(&mut self) {
        self.state = LoopState::Stopped;
        self.pending = None;
    }

    /// Accept the pending frame and issue the next ticket ahead of any work.
    ///
    /// Returns `None` when no frame is pending or the loop is not running;
    /// in that case the caller must neither work nor reschedule.
    pub fn begin_frame(&mut self) -> Option<FrameTicket> {
        if self.state != LoopState::Running {
            return None;
        }
        let current = self.pending.take()?;
        self.frames += 1;
        self.issue();
        Some(current)
    }

    fn issue(&mut self) -> FrameTicket {
        let ticket = FrameTicket(self.next_ticket);
        self.next_ticket += 1;
        self.pending = Some(ticket);
        ticket
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_issues_ticket_once() {
        let mut frames = FrameLoop::new();
        assert!(frames.start().is_some());
        assert!(frames.start().is_none(), "second start while running is a no-op");
        assert!(frames.is_running());
    }

    #[test]
    fn test_begin_frame_reschedules() {
        let mut frames = FrameLoop::new();
        let first = frames.start();
        let accepted = frames.begin_frame();
        assert_eq!(accepted, first);
        let next = frames.pending().expect("next frame scheduled");
        assert!(next > accepted.map_or(FrameTicket(0), |t| t));
        assert_eq!(frames.frame_count(), 1);
    }

    #[test]
    fn test_idle_rejects_frames() {
        let mut frames = FrameLoop::new();
        assert!(frames.begin_frame().is_none());
        assert_eq!(frames.frame_count(), 0);
    }

    #[test]
    fn test_pause_cancels_pending() {
        let mut frames = FrameLoop::new();
        frames.start();
        assert!(frames.pause());
        assert!(!frames.pause(), "pause is idempotent");
        assert!(frames.pending().is_none());
        for _ in 0..10 {
            assert!(frames.begin_frame().is_none(), "late callbacks are ignored");
        }
        assert_eq!(frames.frame_count(), 0);
    }

    #[test]
    fn test_resume_after_pause() {
        let mut frames = FrameLoop::new();
        frames.start();
        frames.pause();
        assert!(frames.start().is_some());
        assert!(frames.begin_frame().is_some());
    }

    #[test]
    fn test_stop_is_terminal() {
        let mut frames = FrameLoop::new();
        frames.start();
        frames.stop();
        assert!(frames.start().is_none());
        assert!(frames.begin_frame().is_none());
        assert_eq!(frames.state(), LoopState::Stopped);
    }
}
