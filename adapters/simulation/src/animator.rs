//! Kinematic movement sink that turns dispatched actions into position reports.

use std::time::Duration;

use bunny_hop_core::{Action, Command, Event, WorldPoint};
use glam::Vec2;

#[derive(Clone, Copy, Debug)]
struct Motion {
    from: Vec2,
    to: Vec2,
    elapsed: Duration,
}

/// Interpolates forward moves over a fixed duration and reports every frame.
///
/// Turns are instantaneous and produce no position report. A move is dropped
/// as soon as its run concludes or the level restarts.
#[derive(Debug)]
pub struct Animator {
    move_duration: Duration,
    motion: Option<Motion>,
}

impl Animator {
    /// Creates an animator that completes each move in `move_duration`.
    #[must_use]
    pub const fn new(move_duration: Duration) -> Self {
        Self {
            move_duration,
            motion: None,
        }
    }

    /// Indicates whether a move is still being animated.
    #[must_use]
    pub const fn is_moving(&self) -> bool {
        self.motion.is_some()
    }

    /// Consumes world events and emits position reports.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        for event in events {
            match event {
                Event::ActionDispatched {
                    action: Action::Forward,
                    from,
                    to,
                    ..
                } => self.begin(*from, *to, out),
                Event::TimeAdvanced { dt } => self.advance(*dt, out),
                Event::RunConcluded { .. } | Event::LevelStarted { .. } => self.motion = None,
                _ => {}
            }
        }
    }

    fn begin(&mut self, from: WorldPoint, to: WorldPoint, out: &mut Vec<Command>) {
        if self.move_duration.is_zero() {
            self.motion = None;
            out.push(Command::ReportPosition { position: to });
            return;
        }

        self.motion = Some(Motion {
            from: to_vec(from),
            to: to_vec(to),
            elapsed: Duration::ZERO,
        });
    }

    fn advance(&mut self, dt: Duration, out: &mut Vec<Command>) {
        let Some(motion) = self.motion.as_mut() else {
            return;
        };

        motion.elapsed = motion.elapsed.saturating_add(dt);
        let progress = (motion.elapsed.as_secs_f32() / self.move_duration.as_secs_f32()).min(1.0);
        let position = motion.from.lerp(motion.to, progress);
        out.push(Command::ReportPosition {
            position: WorldPoint::new(position.x, position.y),
        });

        if progress >= 1.0 {
            self.motion = None;
        }
    }
}

fn to_vec(point: WorldPoint) -> Vec2 {
    Vec2::new(point.x(), point.z())
}
