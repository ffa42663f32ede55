//! Address reveal animation.
//!
//! When a new receive address arrives every character starts out hidden behind
//! noise. The noise decays on a fixed cadence of display frames until the real
//! characters show through. The controller is driven one frame at a time by
//! its owner, either through [`RevealController::advance_frame`] from a UI
//! frame callback or through [`RevealController::run`] over a [`FrameClock`].

use rand::Rng;

use crate::address::Address;
use crate::config::RevealConfig;
use crate::scramble::ScrambleBuffer;

/// Host primitive that resolves once before the next repaint.
#[allow(async_fn_in_trait)]
pub trait FrameClock {
    async fn next_frame(&mut self);
}

/// Await `clock` before each call to `step` until it stops returning
/// [`FrameStep::Scheduled`]. Returns the number of frames consumed.
///
/// Hosts whose controller lives behind a lock use this directly, taking the
/// lock only inside `step`.
pub async fn drive_frames<C, F>(clock: &mut C, mut step: F) -> u32
where
    C: FrameClock,
    F: FnMut() -> FrameStep,
{
    let mut frames = 0;
    loop {
        clock.next_frame().await;
        frames += 1;
        if step() != FrameStep::Scheduled {
            return frames;
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RevealState {
    #[default]
    Idle,
    Revealing,
}

/// What the frame loop should do after a call to `advance_frame`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameStep {
    /// Still revealing, request another frame.
    Scheduled,
    /// Fully revealed, stop requesting frames.
    Settled,
    /// Torn down. Never schedules again.
    Halted,
}

#[derive(Clone, Debug)]
pub struct RevealController {
    config: RevealConfig,
    buffer: ScrambleBuffer,
    frame: u32,
    state: RevealState,
    halted: bool,
    primed: bool,
    last_seen: Option<Address>,
}

impl RevealController {
    pub fn new(config: RevealConfig) -> Self {
        Self {
            config,
            buffer: ScrambleBuffer::zeroed(),
            frame: 0,
            state: RevealState::Idle,
            halted: false,
            primed: false,
            last_seen: None,
        }
    }

    pub fn state(&self) -> RevealState {
        self.state
    }

    pub fn buffer(&self) -> &ScrambleBuffer {
        &self.buffer
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Begin a reveal cycle with `buffer`. An already settled buffer leaves
    /// the controller idle.
    pub fn start(&mut self, buffer: ScrambleBuffer) {
        if self.halted {
            return;
        }
        self.frame = 0;
        self.state = if buffer.is_settled() {
            RevealState::Idle
        } else {
            RevealState::Revealing
        };
        self.buffer = buffer;
        tracing::debug!("Reveal started: {:?}, noise sum {}", self.state, self.buffer.sum());
    }

    /// Advance one display frame. Decay happens on every `cadence`-th call.
    pub fn advance_frame(&mut self) -> FrameStep {
        if self.halted {
            return FrameStep::Halted;
        }
        if self.state == RevealState::Idle {
            return FrameStep::Settled;
        }

        self.frame += 1;
        if self.frame < self.config.cadence {
            return FrameStep::Scheduled;
        }
        self.frame = 0;

        if self.buffer.decay(self.config.step) == 0 {
            self.state = RevealState::Idle;
            tracing::debug!("Reveal settled");
            FrameStep::Settled
        } else {
            FrameStep::Scheduled
        }
    }

    /// Halt permanently. Called when the owning screen is torn down.
    pub fn stop(&mut self) {
        self.halted = true;
    }

    /// Drive frames from `clock` until the reveal settles or is halted.
    /// Returns the number of frames consumed.
    pub async fn run<C: FrameClock>(&mut self, clock: &mut C) -> u32 {
        if self.halted || self.state != RevealState::Revealing {
            return 0;
        }
        drive_frames(clock, || self.advance_frame()).await
    }

    /// Feed the address currently held in wallet state. The first call only
    /// records it; a later, different address starts a reveal with fresh noise.
    /// Returns true when a reveal was started.
    pub fn observe<R: Rng + ?Sized>(&mut self, address: Option<&Address>, rng: &mut R) -> bool {
        if !self.primed {
            self.primed = true;
            self.last_seen = address.cloned();
            return false;
        }
        match address {
            Some(addr) if self.last_seen.as_ref() != Some(addr) => {
                self.last_seen = Some(addr.clone());
                self.start(ScrambleBuffer::random(rng));
                true
            }
            _ => false,
        }
    }

    pub fn render(&self, address: &Address) -> String {
        self.buffer.render(address)
    }
}

impl Default for RevealController {
    fn default() -> Self {
        Self::new(RevealConfig::default())
    }
}
