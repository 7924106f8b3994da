//! Tunables
//!
//! Every threshold is expressed in ticks of the time base unless the name says
//! otherwise. One tick is [`TICK_MS`] milliseconds.

/// Period of the time base
pub const TICK_MS: u64 = 10;

/// Time base ticks per second
pub const TICKS_PER_SECOND: u32 = 100;

// --- Serial links ---

/// Ring capacity of each serial link, both directions
pub const SERIAL_CAPACITY: usize = 160;

/// Number of frame slots in the protocol parser
pub const FRAME_SLOTS: usize = 3;

/// Fixed length of one frame slot
pub const FRAME_LEN: usize = 15;

// --- Boot handshake ---

/// Wireless module enable and link indicator
pub const BOOT_ENABLE_TICKS: u32 = 15;
/// `AT+SYSSTORE=0`
pub const BOOT_STORE_TICKS: u32 = 300;
/// `AT+CIPMUX=1`
pub const BOOT_MUX_TICKS: u32 = 500;
/// `AT+CIPSERVER=1,22222`
pub const BOOT_SERVER_TICKS: u32 = 700;
/// `AT+CWJAP?`
pub const BOOT_SSID_TICKS: u32 = 900;
/// `AT+CIFSR`
pub const BOOT_IP_TICKS: u32 = 1100;
/// Command mode: the wireless ring is handed to the protocol parser
pub const BOOT_COMMAND_TICKS: u32 = 1500;
/// Time spent capturing a field before a stall is reported
pub const BOOT_STALL_TICKS: u32 = 500;

/// Capacity of the SSID and IP capture buffers
pub const FIELD_CAPACITY: usize = 20;

// --- Command scaling ---

pub const FORWARD_SCALE: u32 = 25;
pub const BACKWARD_SCALE: u32 = 25;
pub const SPIN_SCALE: u32 = 20;
pub const BUMP_SCALE: u32 = 5;

// --- Line follow ---

/// Scaled detector reading separating line from floor
pub const REFLECTANCE_THRESHOLD: u16 = 600;

/// Hold at the start of every phase, the display shows the phase name meanwhile (6 s)
pub const PHASE_HOLD_TICKS: u32 = 600;

/// Spin before driving towards the line
pub const START_SPIN_TICKS: u32 = 48;

/// The line is not looked for before this much driving
pub const START_SEEK_TICKS: u32 = 350;

/// Spin at the start of the turn phase
pub const TURN_SPIN_TICKS: u32 = 5;

/// Travel phase length before circling (50 s)
pub const TRAVEL_TICKS: u32 = 5000;

/// Exit maneuver: spin until, then drive until, then done
pub const EXIT_SPIN_END_TICKS: u32 = 633;
pub const EXIT_DRIVE_END_TICKS: u32 = 1000;

// --- Actuators ---

/// PWM counter top shared by all five outputs
pub const PWM_TOP: u16 = 50_005;

pub const DUTY_CRUISE: u16 = 8_000;
pub const DUTY_FAST_RIGHT: u16 = 20_000;
pub const DUTY_FAST_LEFT: u16 = 15_000;
pub const DUTY_REVERSE: u16 = 20_000;
pub const DUTY_SPIN: u16 = 8_000;
pub const DUTY_PIVOT: u16 = 6_000;

/// Backlight at 80 %
pub const DUTY_BACKLIGHT: u16 = 45_000;

// --- Switches ---

/// Debounce countdown after a switch edge
pub const DEBOUNCE_TICKS: u32 = 10;

/// Upper bound of side effects produced by one state machine step
pub const EFFECT_CAPACITY: usize = 8;
