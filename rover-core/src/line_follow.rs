//! Line-follow maneuver
//!
//! A course run: find the line, stop on it, turn onto it, follow it for 50 s
//! then keep circling on it until an exit is requested. Every phase starts
//! with a 6 s hold while the display names the phase.
//!
//! Two timers drive the phases. The phase timer restarts on every phase
//! change; the wait timer times the spins and drives inside a phase. The
//! correction sub-states (`RightTravel`, `LeftCircle`, ...) leave both alone,
//! so the 50 s travel window keeps running while the rover corrects.

use crate::config::{
    EXIT_DRIVE_END_TICKS, EXIT_SPIN_END_TICKS, PHASE_HOLD_TICKS, REFLECTANCE_THRESHOLD,
    START_SEEK_TICKS, START_SPIN_TICKS, TRAVEL_TICKS, TURN_SPIN_TICKS,
};
use crate::display::{row, stamp_seconds, RowText};
use crate::drive::Drive;
use crate::effect::{Effect, Step};
use crate::time_base::Timer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LineFollowState {
    None,
    Start,
    Intercept,
    Turn,
    Travel,
    RightTravel,
    LeftTravel,
    Circle,
    RightCircle,
    LeftCircle,
    Exit,
    Done,
}

/// What one step looks at
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Inputs {
    /// Phase timer
    pub phase: u32,
    /// Maneuver timer
    pub wait: u32,
    /// Scaled left detector reading
    pub left: u16,
    /// Scaled right detector reading
    pub right: u16,
    /// Course clock, shown when the run is done
    pub seconds: u32,
}

impl Inputs {
    fn left_on_line(&self) -> bool {
        self.left > REFLECTANCE_THRESHOLD
    }

    fn right_on_line(&self) -> bool {
        self.right > REFLECTANCE_THRESHOLD
    }

    fn left_off_line(&self) -> bool {
        self.left < REFLECTANCE_THRESHOLD
    }

    fn right_off_line(&self) -> bool {
        self.right < REFLECTANCE_THRESHOLD
    }
}

const ROW_START: RowText = row(b" BL START ");
const ROW_INTERCEPT: RowText = row(b" INTERCEPT");
const ROW_TURN: RowText = row(b" BL TURN  ");
const ROW_TRAVEL: RowText = row(b" BL TRAVEL");
const ROW_CIRCLE: RowText = row(b" BL CIRCLE");
const ROW_EXIT: RowText = row(b" BL EXIT  ");

/// Summary shown at the end of a run
pub fn finished_rows(seconds: u32) -> [RowText; 4] {
    let mut time = row(b"TIME:");
    stamp_seconds(&mut time, seconds);
    [
        row(b" BL STOP  "),
        row(b" FINISHED "),
        row(b" COURSE   "),
        time,
    ]
}

/// Transition function of the maneuver
pub fn step(state: LineFollowState, inputs: &Inputs) -> Step<LineFollowState> {
    use LineFollowState::*;

    match state {
        None => Step::new(None),

        Start => {
            let mut step = Step::new(Start).with(Effect::Row(0, ROW_START));
            if inputs.phase < PHASE_HOLD_TICKS {
                step.push(Effect::Backlight(true));
                step.push(Effect::ResetTimer(Timer::Wait));
                return step;
            }
            step.push(Effect::Backlight(false));
            if inputs.wait <= START_SPIN_TICKS {
                step.push(Effect::Drive(Drive::SpinCounterClockwise));
            } else {
                step.push(Effect::Drive(Drive::ForwardFast));
                if inputs.wait >= START_SEEK_TICKS
                    && (inputs.left_on_line() || inputs.right_on_line())
                {
                    step.push(Effect::Drive(Drive::Off));
                    step.push(Effect::ResetTimer(Timer::Phase));
                    step.next = Intercept;
                }
            }
            step
        }

        Intercept => {
            let mut step = Step::new(Intercept).with(Effect::Row(0, ROW_INTERCEPT));
            if inputs.phase >= PHASE_HOLD_TICKS {
                step.push(Effect::Backlight(false));
                step.push(Effect::ResetTimer(Timer::Wait));
                step.push(Effect::ResetTimer(Timer::Phase));
                step.next = Turn;
            } else {
                step.push(Effect::Backlight(true));
            }
            step
        }

        Turn => {
            let mut step = Step::new(Turn).with(Effect::Row(0, ROW_TURN));
            if inputs.phase <= PHASE_HOLD_TICKS {
                step.push(Effect::Backlight(true));
                step.push(Effect::ResetTimer(Timer::Wait));
                return step;
            }
            step.push(Effect::Backlight(false));
            if inputs.wait <= TURN_SPIN_TICKS {
                step.push(Effect::Drive(Drive::SpinCounterClockwise));
            } else if inputs.right_on_line() {
                step.push(Effect::Drive(Drive::Off));
                step.push(Effect::ResetTimer(Timer::Phase));
                step.next = Travel;
            }
            step
        }

        Travel => {
            let mut step = Step::new(Travel).with(Effect::Row(0, ROW_TRAVEL));
            if inputs.phase < PHASE_HOLD_TICKS {
                step.push(Effect::Backlight(true));
                return step;
            }
            if inputs.phase >= TRAVEL_TICKS {
                step.push(Effect::Drive(Drive::Off));
                step.push(Effect::ResetTimer(Timer::Phase));
                step.next = Circle;
                return step;
            }
            step.push(Effect::Backlight(false));
            follow(step, inputs, RightTravel, LeftTravel)
        }

        Circle => {
            let mut step = Step::new(Circle).with(Effect::Row(0, ROW_CIRCLE));
            if inputs.phase < PHASE_HOLD_TICKS {
                step.push(Effect::Backlight(true));
                step.push(Effect::Drive(Drive::Off));
                return step;
            }
            step.push(Effect::Backlight(false));
            follow(step, inputs, RightCircle, LeftCircle)
        }

        RightTravel => correct_right(inputs, RightTravel, Travel),
        LeftTravel => correct_left(inputs, LeftTravel, Travel),
        RightCircle => correct_right(inputs, RightCircle, Circle),
        LeftCircle => correct_left(inputs, LeftCircle, Circle),

        Exit => {
            let mut step = Step::new(Exit);
            if inputs.wait < PHASE_HOLD_TICKS {
                step.push(Effect::Drive(Drive::Off));
                step.push(Effect::Backlight(true));
                step.push(Effect::Row(0, ROW_EXIT));
                return step;
            }
            step.push(Effect::Backlight(false));
            if inputs.wait <= EXIT_SPIN_END_TICKS {
                step.push(Effect::Drive(Drive::SpinClockwise));
            } else if inputs.wait <= EXIT_DRIVE_END_TICKS {
                step.push(Effect::Drive(Drive::ForwardFast));
            } else {
                step.next = Done;
            }
            step
        }

        Done => {
            let mut step = Step::new(None)
                .with(Effect::Drive(Drive::Off))
                .with(Effect::Backlight(true));
            for (index, text) in finished_rows(inputs.seconds).iter().enumerate() {
                step.push(Effect::Row(index, *text));
            }
            step.push(Effect::CourseClock(false));
            step
        }
    }
}

/// Cruise along the line, handing over to a correction state when a
/// detector leaves it
fn follow(
    mut step: Step<LineFollowState>,
    inputs: &Inputs,
    right: LineFollowState,
    left: LineFollowState,
) -> Step<LineFollowState> {
    step.push(Effect::Drive(Drive::Cruise));
    if inputs.right_off_line() {
        step.next = right;
    } else if inputs.left_off_line() {
        step.next = left;
    }
    step
}

fn correct_right(
    inputs: &Inputs,
    state: LineFollowState,
    back: LineFollowState,
) -> Step<LineFollowState> {
    let next = if inputs.right_on_line() { back } else { state };
    Step::new(next).with(Effect::Drive(Drive::SpinClockwise))
}

fn correct_left(
    inputs: &Inputs,
    state: LineFollowState,
    back: LineFollowState,
) -> Step<LineFollowState> {
    let next = if inputs.left_on_line() { back } else { state };
    Step::new(next).with(Effect::Drive(Drive::SpinCounterClockwise))
}

#[cfg(test)]
mod tests {
    use super::*;
    use LineFollowState::*;

    fn at(phase: u32, wait: u32, left: u16, right: u16) -> Inputs {
        Inputs {
            phase,
            wait,
            left,
            right,
            seconds: 0,
        }
    }

    fn drive_of(step: &Step<LineFollowState>) -> Option<Drive> {
        step.effects.iter().rev().find_map(|e| match e {
            Effect::Drive(d) => Some(*d),
            _ => Option::None,
        })
    }

    #[test]
    fn test_start_holds_for_six_seconds() {
        for phase in (0..PHASE_HOLD_TICKS).step_by(50) {
            let step = step(Start, &at(phase, phase, 100, 100));
            assert_eq!(step.next, Start);
            assert!(!step.effects.drives());
            assert!(step.effects.contains(&Effect::Backlight(true)));
            assert!(step.effects.contains(&Effect::ResetTimer(Timer::Wait)));
            assert!(step.effects.contains(&Effect::Row(0, ROW_START)));
        }
    }

    #[test]
    fn test_start_spins_then_drives() {
        let spin = step(Start, &at(PHASE_HOLD_TICKS, 0, 100, 100));
        assert_eq!(drive_of(&spin), Some(Drive::SpinCounterClockwise));
        let spin = step(Start, &at(PHASE_HOLD_TICKS + 48, 48, 100, 100));
        assert_eq!(drive_of(&spin), Some(Drive::SpinCounterClockwise));

        let forward = step(Start, &at(PHASE_HOLD_TICKS + 49, 49, 100, 100));
        assert_eq!(drive_of(&forward), Some(Drive::ForwardFast));
        assert_eq!(forward.next, Start);
    }

    #[test]
    fn test_start_ignores_line_before_seek_window() {
        let early = step(Start, &at(900, 200, 900, 100));
        assert_eq!(early.next, Start);

        let found = step(Start, &at(1000, 350, 900, 100));
        assert_eq!(found.next, Intercept);
        assert_eq!(drive_of(&found), Some(Drive::Off));
        assert!(found.effects.contains(&Effect::ResetTimer(Timer::Phase)));
    }

    #[test]
    fn test_intercept_waits_then_turns() {
        assert_eq!(step(Intercept, &at(599, 0, 0, 0)).next, Intercept);
        let turn = step(Intercept, &at(600, 0, 0, 0));
        assert_eq!(turn.next, Turn);
        assert!(!turn.effects.drives());
    }

    #[test]
    fn test_turn_spins_until_right_detector_finds_line() {
        assert_eq!(step(Turn, &at(600, 0, 0, 900)).next, Turn);
        let spin = step(Turn, &at(601, 3, 0, 900));
        assert_eq!(drive_of(&spin), Some(Drive::SpinCounterClockwise));
        assert_eq!(spin.next, Turn);
        let coasting = step(Turn, &at(700, 50, 0, 100));
        assert_eq!(coasting.next, Turn);
        assert_eq!(drive_of(&coasting), Option::None);
        assert_eq!(step(Turn, &at(700, 50, 0, 900)).next, Travel);
    }

    #[test]
    fn test_travel_corrects_and_returns() {
        let on_line = at(1000, 0, 900, 900);
        let cruise = step(Travel, &on_line);
        assert_eq!(cruise.next, Travel);
        assert_eq!(drive_of(&cruise), Some(Drive::Cruise));

        let drifted = step(Travel, &at(1000, 0, 900, 100));
        assert_eq!(drifted.next, RightTravel);

        let correcting = step(RightTravel, &at(1000, 0, 900, 100));
        assert_eq!(correcting.next, RightTravel);
        assert_eq!(drive_of(&correcting), Some(Drive::SpinClockwise));
        assert!(!correcting.effects.iter().any(|e| matches!(e, Effect::ResetTimer(_))));

        assert_eq!(step(RightTravel, &on_line).next, Travel);
        assert_eq!(step(Travel, &at(1000, 0, 100, 900)).next, LeftTravel);
        assert_eq!(step(LeftTravel, &on_line).next, Travel);
    }

    #[test]
    fn test_travel_turns_into_circle_after_fifty_seconds() {
        let circle = step(Travel, &at(TRAVEL_TICKS, 0, 900, 900));
        assert_eq!(circle.next, Circle);
        assert_eq!(step(Circle, &at(0, 0, 900, 900)).next, Circle);
        assert_eq!(step(Circle, &at(700, 0, 900, 100)).next, RightCircle);
        assert_eq!(step(RightCircle, &at(700, 0, 900, 900)).next, Circle);
        assert_eq!(step(LeftCircle, &at(700, 0, 900, 900)).next, Circle);
        // no way out of the circle group on its own
        assert_eq!(step(Circle, &at(100_000, 0, 900, 900)).next, Circle);
    }

    #[test]
    fn test_exit_sequence() {
        let hold = step(Exit, &at(0, 100, 0, 0));
        assert_eq!(drive_of(&hold), Some(Drive::Off));
        assert!(hold.effects.contains(&Effect::Row(0, ROW_EXIT)));

        assert_eq!(drive_of(&step(Exit, &at(0, 600, 0, 0))), Some(Drive::SpinClockwise));
        assert_eq!(drive_of(&step(Exit, &at(0, 633, 0, 0))), Some(Drive::SpinClockwise));
        assert_eq!(drive_of(&step(Exit, &at(0, 634, 0, 0))), Some(Drive::ForwardFast));
        assert_eq!(step(Exit, &at(0, 1000, 0, 0)).next, Exit);
        assert_eq!(step(Exit, &at(0, 1001, 0, 0)).next, Done);
    }

    #[test]
    fn test_done_shows_summary_and_stops_clock() {
        let mut inputs = at(0, 0, 0, 0);
        inputs.seconds = 125;
        let done = step(Done, &inputs);
        assert_eq!(done.next, None);
        assert!(done.effects.contains(&Effect::Drive(Drive::Off)));
        assert!(done.effects.contains(&Effect::CourseClock(false)));
        assert!(done.effects.contains(&Effect::Row(3, *b"TIME:0125s")));
        assert!(done.effects.contains(&Effect::Row(1, *b" FINISHED ")));
    }
}
