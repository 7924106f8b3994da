//! Control loop
//!
//! One [`Controller::poll`] is one pass of the cooperative main loop: boot
//! handshake, wireless bytes, latched switch presses, then the motion state
//! machine. It never blocks; every wait is a timer compared against a
//! threshold on some later pass.

use crate::adc::SensorReadings;
use crate::board::{Board, Output};
use crate::boot::BootSequencer;
use crate::config::{DUTY_BACKLIGHT, SERIAL_CAPACITY};
use crate::display::{stamp_seconds, Display};
use crate::drive::{Drive, WheelDuty};
use crate::effect::{Effect, Effects};
use crate::line_follow::{self, LineFollowState};
use crate::motion::{self, MotionState};
use crate::protocol::{Command, Parser};
use crate::serial::{RxCursor, RxRing};
use crate::time_base::{Switch, TimeBase, Timer};

/// State written by other contexts, read by the control loop
#[derive(Clone, Copy)]
pub struct Shared<'a> {
    pub time: &'a TimeBase,
    pub sensors: &'a SensorReadings,
    pub wireless: &'a RxRing<SERIAL_CAPACITY>,
}

pub struct Controller {
    boot: BootSequencer,
    parser: Parser,
    motion: MotionState,
    display: Display,
    wireless: RxCursor,
    drive: Drive,
    backlight: bool,
    arrivals: u8,
    /// Course seconds last written to row 3
    shown_seconds: u32,
}

impl Default for Controller {
    fn default() -> Self {
        Self::new()
    }
}

impl Controller {
    /// Controller reading the wireless ring from its first byte
    pub const fn new() -> Self {
        Self {
            boot: BootSequencer::new(),
            parser: Parser::new(),
            motion: MotionState::None,
            display: Display::new(),
            wireless: RxCursor::new(),
            drive: Drive::Off,
            backlight: false,
            arrivals: 0,
            shown_seconds: 0,
        }
    }

    pub fn motion(&self) -> MotionState {
        self.motion
    }

    pub fn boot(&self) -> &BootSequencer {
        &self.boot
    }

    pub fn display(&self) -> &Display {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut Display {
        &mut self.display
    }

    /// Overruns seen on the wireless ring
    pub fn overruns(&self) -> u32 {
        self.wireless.overruns()
    }

    /// One pass of the main loop
    pub fn poll<B: Board>(&mut self, shared: &Shared<'_>, board: &mut B) {
        let effects = self.boot.poll(shared.time.elapsed(Timer::Boot));
        self.apply(effects, shared, board);

        if self.boot.is_capturing() {
            // stop at the end of the field, the rest belongs to the next state
            while self.boot.is_capturing() {
                let Some(byte) = self.wireless.next(shared.wireless) else {
                    break;
                };
                let effects = self.boot.on_byte(byte);
                self.apply(effects, shared, board);
            }
        } else if self.boot.command_mode() {
            while let Some(byte) = self.wireless.next(shared.wireless) {
                self.on_wireless_byte(byte, shared, board);
            }
        }

        if shared.time.take_press(Switch::Stop) {
            info!("stop switch");
            self.motion = MotionState::Stop;
        }
        if shared.time.take_press(Switch::Identify) {
            let step = motion::identify(self.motion);
            self.apply(step.effects, shared, board);
        }

        self.show_course_clock(shared);

        let inputs = motion::Inputs {
            elapsed: shared.time.elapsed(Timer::Motion),
            follow: line_follow::Inputs {
                phase: shared.time.elapsed(Timer::Phase),
                wait: shared.time.elapsed(Timer::Wait),
                left: shared.sensors.left(),
                right: shared.sensors.right(),
                seconds: shared.time.course_seconds(),
            },
        };
        let step = motion::step(self.motion, &inputs);
        if step.next != self.motion {
            debug!("motion {} -> {}", self.motion, step.next);
        }
        self.motion = step.next;
        self.apply(step.effects, shared, board);
    }

    fn on_wireless_byte<B: Board>(&mut self, byte: u8, shared: &Shared<'_>, board: &mut B) {
        let Some(Ok(frame)) = self.parser.push(byte) else {
            return;
        };
        info!("command {}", frame.command);
        if frame.command == Command::Arrived {
            self.arrivals = (self.arrivals + 1) % 100;
        }
        let step = motion::dispatch(self.motion, &frame, self.arrivals);
        self.motion = step.next;
        self.apply(step.effects, shared, board);
    }

    /// Stamps the running course time into row 3 once per new second
    fn show_course_clock(&mut self, shared: &Shared<'_>) {
        if !shared.time.course_running() {
            return;
        }
        let seconds = shared.time.course_seconds();
        if seconds == self.shown_seconds {
            return;
        }
        self.shown_seconds = seconds;
        let mut text = *self.display.row(3);
        stamp_seconds(&mut text, seconds);
        self.display.write_row(3, &text);
    }

    fn apply<B: Board>(&mut self, effects: Effects, shared: &Shared<'_>, board: &mut B) {
        for effect in effects {
            match effect {
                Effect::Drive(drive) => {
                    if drive != self.drive {
                        self.drive = drive;
                        WheelDuty::from(drive).apply(board);
                    }
                }
                Effect::Backlight(on) => {
                    if on != self.backlight {
                        self.backlight = on;
                        board.set_duty(Output::Backlight, if on { DUTY_BACKLIGHT } else { 0 });
                    }
                }
                Effect::Row(index, text) => self.display.write_row(index, &text),
                Effect::Transmit(sequence) => board.transmit(sequence),
                Effect::ResetTimer(timer) => shared.time.reset(timer),
                Effect::CourseClock(true) => shared.time.start_course(),
                Effect::CourseClock(false) => shared.time.stop_course(),
                Effect::ModuleEnable(on) => board.set_module_enable(on),
                Effect::IrEmitter(on) => board.set_ir_emitter(on),
            }
        }
    }

    /// Whether a line-follow run is in progress, and in which phase
    pub fn line_follow(&self) -> Option<LineFollowState> {
        match self.motion {
            MotionState::LineFollow(phase) => Some(phase),
            _ => None,
        }
    }
}
