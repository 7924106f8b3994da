//! Motion state machine
//!
//! Commands set the state; every control pass then steps it. Timed states
//! actuate while the motion timer is below their duration and revert to
//! `None` once it is reached. `LineFollow` carries the maneuver's own state
//! and steps it instead of a fixed pattern.

use crate::display::{row, RowText, BLANK};
use crate::drive::Drive;
use crate::effect::{Effect, Step};
use crate::line_follow::{self, LineFollowState};
use crate::protocol::{Command, Frame};
use crate::time_base::Timer;

/// Identification screen
pub const IDENTIFY_ROWS: [RowText; 4] = [BLANK, row(b"IOT ROVER "), row(b" CONTROL  "), BLANK];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotionState {
    #[default]
    None,
    Forward { duration: u32 },
    Backward { duration: u32 },
    Left { duration: u32 },
    Right { duration: u32 },
    Stop,
    LineFollow(LineFollowState),
    Bump { duration: u32 },
}

impl MotionState {
    /// Pattern and duration of the timed states
    fn timed(self) -> Option<(Drive, u32)> {
        match self {
            Self::Forward { duration } => Some((Drive::ForwardFast, duration)),
            Self::Backward { duration } => Some((Drive::ReverseFast, duration)),
            Self::Left { duration } => Some((Drive::PivotRight, duration)),
            Self::Right { duration } => Some((Drive::PivotLeft, duration)),
            Self::Bump { duration } => Some((Drive::PivotLeft, duration)),
            _ => None,
        }
    }

    pub fn is_line_follow(self) -> bool {
        matches!(self, Self::LineFollow(_))
    }
}

/// Everything a motion step reads
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Inputs {
    /// Motion timer
    pub elapsed: u32,
    pub follow: line_follow::Inputs,
}

/// Transition function, called once per control pass
pub fn step(state: MotionState, inputs: &Inputs) -> Step<MotionState> {
    match state {
        MotionState::None => Step::new(MotionState::None),
        MotionState::Stop => Step::new(MotionState::None).with(Effect::Drive(Drive::Off)),
        MotionState::LineFollow(phase) => {
            line_follow::step(phase, &inputs.follow).map(|next| match next {
                LineFollowState::None => MotionState::None,
                next => MotionState::LineFollow(next),
            })
        }
        timed => match timed.timed() {
            Some((drive, duration)) if inputs.elapsed < duration => {
                Step::new(timed).with(Effect::Drive(drive))
            }
            _ => Step::new(MotionState::None).with(Effect::Drive(Drive::Off)),
        },
    }
}

/// Blanks the backlight and shows the identification screen, keeping `state`
pub fn identify(state: MotionState) -> Step<MotionState> {
    let mut step = Step::new(state).with(Effect::Backlight(false));
    for (index, text) in IDENTIFY_ROWS.iter().enumerate() {
        step.push(Effect::Row(index, *text));
    }
    step
}

/// Applies a decoded command. `arrivals` is the arrival count including a
/// `+` being applied.
pub fn dispatch(state: MotionState, frame: &Frame, arrivals: u8) -> Step<MotionState> {
    let moved = |next: MotionState| {
        Step::new(next)
            .with(Effect::Backlight(false))
            .with(Effect::Row(0, BLANK))
            .with(Effect::Row(3, frame.echo))
            .with(Effect::ResetTimer(Timer::Motion))
    };

    match frame.command {
        Command::Forward(duration) => moved(MotionState::Forward { duration }),
        Command::Backward(duration) => moved(MotionState::Backward { duration }),
        Command::Left(duration) => moved(MotionState::Left { duration }),
        Command::Right(duration) => moved(MotionState::Right { duration }),
        Command::Bump(duration) => moved(MotionState::Bump { duration }),
        Command::Stop => Step::new(MotionState::Stop),
        Command::LineFollow if state.is_line_follow() => {
            debug!("line follow already running");
            Step::new(state)
        }
        Command::LineFollow => Step::new(MotionState::LineFollow(LineFollowState::Start))
            .with(Effect::Row(0, BLANK))
            .with(Effect::Row(3, frame.echo))
            .with(Effect::ResetTimer(Timer::Phase))
            .with(Effect::ResetTimer(Timer::Wait)),
        Command::ExitLineFollow if state.is_line_follow() => {
            Step::new(MotionState::LineFollow(LineFollowState::Exit))
                .with(Effect::ResetTimer(Timer::Wait))
        }
        Command::ExitLineFollow => {
            debug!("exit without line follow");
            Step::new(state)
        }
        Command::Arrived => {
            let mut text = row(b"ARRIVED 0 ");
            if arrivals >= 10 {
                text[8] = b'0' + (arrivals / 10 % 10);
            }
            text[9] = b'0' + arrivals % 10;
            Step::new(state)
                .with(Effect::Backlight(true))
                .with(Effect::Row(0, text))
        }
        Command::Identify => identify(state),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::decode;

    fn frame(bytes: &[u8]) -> Frame {
        decode(bytes).unwrap()
    }

    fn at(elapsed: u32) -> Inputs {
        Inputs {
            elapsed,
            ..Inputs::default()
        }
    }

    #[test]
    fn test_forward_command_sets_duration_and_resets_timer() {
        let step = dispatch(MotionState::None, &frame(b"00000F5"), 0);
        assert_eq!(step.next, MotionState::Forward { duration: 125 });
        assert!(step.effects.contains(&Effect::ResetTimer(Timer::Motion)));
        assert!(step.effects.contains(&Effect::Row(3, *b"F5        ")));
    }

    #[test]
    fn test_timed_motion_runs_below_duration() {
        let forward = MotionState::Forward { duration: 125 };
        let running = step(forward, &at(124));
        assert_eq!(running.next, forward);
        assert!(running.effects.contains(&Effect::Drive(Drive::ForwardFast)));

        let done = step(forward, &at(125));
        assert_eq!(done.next, MotionState::None);
        assert!(done.effects.contains(&Effect::Drive(Drive::Off)));
    }

    #[test]
    fn test_turn_patterns() {
        let pattern = |state| match step(state, &at(0)).effects.iter().next() {
            Some(Effect::Drive(d)) => *d,
            other => panic!("unexpected {:?}", other),
        };
        assert_eq!(pattern(MotionState::Left { duration: 20 }), Drive::PivotRight);
        assert_eq!(pattern(MotionState::Bump { duration: 5 }), Drive::PivotLeft);
        assert_eq!(pattern(MotionState::Right { duration: 20 }), Drive::PivotLeft);
        assert_eq!(pattern(MotionState::Backward { duration: 25 }), Drive::ReverseFast);
    }

    #[test]
    fn test_stop_overrides_any_duration() {
        let stop = dispatch(MotionState::Forward { duration: 225 }, &frame(b"00000S"), 0);
        assert_eq!(stop.next, MotionState::Stop);

        let next = step(stop.next, &at(3));
        assert_eq!(next.next, MotionState::None);
        assert!(next.effects.contains(&Effect::Drive(Drive::Off)));
    }

    #[test]
    fn test_none_is_a_no_op() {
        for elapsed in [0, 1, 500, u32::MAX] {
            let idle = step(MotionState::None, &at(elapsed));
            assert_eq!(idle.next, MotionState::None);
            assert!(idle.effects.is_empty());
        }
    }

    #[test]
    fn test_line_follow_entry_and_exit() {
        let start = dispatch(MotionState::None, &frame(b"0000C"), 0);
        assert_eq!(start.next, MotionState::LineFollow(LineFollowState::Start));
        assert!(start.effects.contains(&Effect::ResetTimer(Timer::Phase)));

        let again = dispatch(start.next, &frame(b"0000C"), 0);
        assert_eq!(again.next, start.next);

        let travel = MotionState::LineFollow(LineFollowState::Travel);
        let exit = dispatch(travel, &frame(b"0000E"), 0);
        assert_eq!(exit.next, MotionState::LineFollow(LineFollowState::Exit));
        assert!(exit.effects.contains(&Effect::ResetTimer(Timer::Wait)));

        assert_eq!(dispatch(MotionState::None, &frame(b"0000E"), 0).next, MotionState::None);
    }

    #[test]
    fn test_line_follow_done_returns_to_none() {
        let done = step(MotionState::LineFollow(LineFollowState::Done), &at(0));
        assert_eq!(done.next, MotionState::None);
        assert!(done.effects.contains(&Effect::CourseClock(false)));
    }

    #[test]
    fn test_arrived_counter_display() {
        let first = dispatch(MotionState::None, &frame(b"0000+"), 1);
        assert!(first.effects.contains(&Effect::Row(0, *b"ARRIVED 01")));
        let twelfth = dispatch(MotionState::None, &frame(b"0000+"), 12);
        assert!(twelfth.effects.contains(&Effect::Row(0, *b"ARRIVED 12")));
    }

    #[test]
    fn test_display_commands_keep_motion() {
        let forward = MotionState::Forward { duration: 50 };
        assert_eq!(dispatch(forward, &frame(b"0000D"), 0).next, forward);
        assert_eq!(dispatch(forward, &frame(b"0000+"), 1).next, forward);
    }

    #[test]
    fn test_identify_screen_matches_display_command() {
        let forward = MotionState::Forward { duration: 50 };
        assert_eq!(identify(forward), dispatch(forward, &frame(b"0000D"), 0));
        assert!(identify(forward).effects.contains(&Effect::Row(1, *b"IOT ROVER ")));
    }
}
