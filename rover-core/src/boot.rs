//! Wireless module bring-up
//!
//! Gated by the boot timer, the sequencer walks the module through
//! `Store → Mux → Server → WaitSsid → Ssid → WaitIp → Ip → Done`, sending one
//! AT command per timed transition. In `Ssid` and `Ip` it reads the wireless
//! ring a byte at a time and captures a quote-delimited field from the
//! module's answer, then shows it on the display.
//!
//! There is no retry. A module that never answers leaves the sequencer in a
//! capture state; a single warning is logged and command mode still starts
//! on time.

use heapless::Vec;

use crate::config::{
    BOOT_COMMAND_TICKS, BOOT_ENABLE_TICKS, BOOT_IP_TICKS, BOOT_MUX_TICKS, BOOT_SERVER_TICKS,
    BOOT_SSID_TICKS, BOOT_STALL_TICKS, BOOT_STORE_TICKS, FIELD_CAPACITY,
};
use crate::display::{row, ROW_WIDTH};
use crate::effect::{Effect, Effects, Step};

pub const CMD_STORE: &[u8] = b"AT+SYSSTORE=0\r\n";
pub const CMD_MUX: &[u8] = b"AT+CIPMUX=1\r\n";
pub const CMD_SERVER: &[u8] = b"AT+CIPSERVER=1,22222\r\n";
pub const CMD_QUERY_SSID: &[u8] = b"AT+CWJAP?\r\n";
pub const CMD_QUERY_IP: &[u8] = b"AT+CIFSR\r\n";

/// The SSID is the first quoted field of `+CWJAP:"ssid","bssid",...`
const SSID_QUOTE: u8 = 1;

/// Counting from the SSID's closing quote, the station IP of
/// `+CIFSR:STAIP,"a.b.c.d"` opens with the fourth quote.
const IP_QUOTE: u8 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BootState {
    Store,
    Mux,
    Server,
    WaitSsid,
    Ssid,
    WaitIp,
    Ip,
    Done,
}

impl BootState {
    /// States that read the wireless ring
    pub fn is_capturing(self) -> bool {
        matches!(self, Self::Ssid | Self::Ip)
    }
}

/// Timed transitions, one command per transition
pub fn transition(state: BootState, elapsed: u32) -> Step<BootState> {
    let next = match state {
        BootState::Store if elapsed >= BOOT_STORE_TICKS => Some((BootState::Mux, CMD_STORE)),
        BootState::Mux if elapsed >= BOOT_MUX_TICKS => Some((BootState::Server, CMD_MUX)),
        BootState::Server if elapsed >= BOOT_SERVER_TICKS => {
            Some((BootState::WaitSsid, CMD_SERVER))
        }
        BootState::WaitSsid if elapsed >= BOOT_SSID_TICKS => {
            Some((BootState::Ssid, CMD_QUERY_SSID))
        }
        BootState::WaitIp if elapsed >= BOOT_IP_TICKS => Some((BootState::Ip, CMD_QUERY_IP)),
        _ => None,
    };

    match next {
        Some((next, command)) => Step::new(next).with(Effect::Transmit(command)),
        None => Step::new(state),
    }
}

/// Quote-delimited field extraction
///
/// Quotes are counted until the opening one; bytes after it are captured
/// until the next quote. That closing quote is reported back so the next
/// field can count it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotedField {
    opening: u8,
    seen: u8,
    value: Vec<u8, FIELD_CAPACITY>,
}

impl QuotedField {
    pub const fn new(opening: u8) -> Self {
        Self {
            opening,
            seen: 0,
            value: Vec::new(),
        }
    }

    /// Feeds one byte, returns `true` when the closing quote arrived.
    /// Bytes past the capacity are dropped.
    pub fn feed(&mut self, byte: u8) -> bool {
        let capturing = self.seen >= self.opening;
        if byte == b'"' {
            if capturing {
                return true;
            }
            self.seen += 1;
        } else if capturing {
            let _ = self.value.push(byte);
        }
        false
    }

    pub fn value(&self) -> &[u8] {
        &self.value
    }
}

#[derive(Debug, Clone)]
pub struct BootSequencer {
    state: BootState,
    ssid: QuotedField,
    ip: QuotedField,
    entered_at: u32,
    enabled: bool,
    command_mode: bool,
    stall_reported: bool,
}

impl Default for BootSequencer {
    fn default() -> Self {
        Self::new()
    }
}

impl BootSequencer {
    pub const fn new() -> Self {
        Self {
            state: BootState::Store,
            ssid: QuotedField::new(SSID_QUOTE),
            ip: QuotedField::new(IP_QUOTE),
            entered_at: 0,
            enabled: false,
            command_mode: false,
            stall_reported: false,
        }
    }

    pub fn state(&self) -> BootState {
        self.state
    }

    pub fn ssid(&self) -> &[u8] {
        self.ssid.value()
    }

    pub fn ip(&self) -> &[u8] {
        self.ip.value()
    }

    /// Once true the wireless ring belongs to the protocol parser
    pub fn command_mode(&self) -> bool {
        self.command_mode
    }

    /// Whether the sequencer wants bytes from the wireless ring
    pub fn is_capturing(&self) -> bool {
        !self.command_mode && self.state.is_capturing()
    }

    /// Timer-driven part, called once per control pass with the boot timer.
    pub fn poll(&mut self, elapsed: u32) -> Effects {
        let mut effects = Effects::new();

        if !self.enabled && elapsed >= BOOT_ENABLE_TICKS {
            self.enabled = true;
            effects.push(Effect::ModuleEnable(true));
        }

        if self.command_mode {
            return effects;
        }

        if elapsed >= BOOT_COMMAND_TICKS {
            self.command_mode = true;
            if self.state != BootState::Done {
                warn!("entering command mode with handshake at {}", self.state);
            }
            info!("command mode");
            effects.push(Effect::CourseClock(true));
            effects.push(Effect::IrEmitter(true));
            return effects;
        }

        let step = transition(self.state, elapsed);
        if step.next != self.state {
            info!("boot {} -> {}", self.state, step.next);
            self.state = step.next;
            self.entered_at = elapsed;
            self.stall_reported = false;
        } else if self.state.is_capturing()
            && !self.stall_reported
            && elapsed - self.entered_at >= BOOT_STALL_TICKS
        {
            self.stall_reported = true;
            warn!("wireless module silent in {}", self.state);
        }
        for effect in step.effects {
            effects.push(effect);
        }
        effects
    }

    /// Byte-driven part, fed from the wireless ring while capturing.
    pub fn on_byte(&mut self, byte: u8) -> Effects {
        let mut effects = Effects::new();
        match self.state {
            BootState::Ssid => {
                if self.ssid.feed(byte) {
                    // the closing quote stays visible to the IP field
                    self.ip.feed(b'"');
                    info!("ssid {=[u8]:a}", self.ssid.value());
                    effects.push(Effect::Row(0, row(self.ssid.value())));
                    self.state = BootState::WaitIp;
                }
            }
            BootState::Ip => {
                if self.ip.feed(byte) {
                    let ip = self.ip.value();
                    info!("ip {=[u8]:a}", ip);
                    effects.push(Effect::Row(1, row(b"    IP    ")));
                    effects.push(Effect::Row(2, row(ip)));
                    let tail = ip.get(ROW_WIDTH..).unwrap_or(&[]);
                    effects.push(Effect::Row(3, row(&tail[..tail.len().min(5)])));
                    self.state = BootState::Done;
                }
            }
            _ => {}
        }
        effects
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Feeds bytes while the sequencer captures, like the control loop does.
    /// Returns the last non-empty effects and the number of bytes consumed.
    fn feed(boot: &mut BootSequencer, bytes: &[u8]) -> (Effects, usize) {
        let mut last = Effects::new();
        let mut consumed = 0;
        for b in bytes {
            if !boot.is_capturing() {
                break;
            }
            consumed += 1;
            let effects = boot.on_byte(*b);
            if !effects.is_empty() {
                last = effects;
            }
        }
        (last, consumed)
    }

    fn transmitted(effects: &Effects) -> Option<&'static [u8]> {
        effects.iter().find_map(|e| match e {
            Effect::Transmit(cmd) => Some(*cmd),
            _ => None,
        })
    }

    #[test]
    fn test_timed_sequence_sends_commands_in_order() {
        let mut boot = BootSequencer::new();
        let mut sent: heapless::Vec<&'static [u8], 8> = heapless::Vec::new();
        for elapsed in 0..1200 {
            let effects = boot.poll(elapsed);
            if let Some(cmd) = transmitted(&effects) {
                sent.push(cmd).unwrap();
            }
            if boot.state() == BootState::Ssid {
                feed(&mut boot, b"+CWJAP:\"Lab\",\"aa:bb\"\r\n");
            }
        }
        assert_eq!(
            sent.as_slice(),
            &[CMD_STORE, CMD_MUX, CMD_SERVER, CMD_QUERY_SSID, CMD_QUERY_IP]
        );
        assert_eq!(boot.state(), BootState::Ip);
    }

    #[test]
    fn test_thresholds() {
        assert_eq!(transition(BootState::Store, 299).next, BootState::Store);
        assert_eq!(transition(BootState::Store, 300).next, BootState::Mux);
        assert_eq!(transition(BootState::Server, 700).next, BootState::WaitSsid);
        // capture states only leave on data
        assert_eq!(transition(BootState::Ssid, 5000).next, BootState::Ssid);
        assert_eq!(transition(BootState::WaitIp, 1099).next, BootState::WaitIp);
        assert_eq!(transition(BootState::WaitIp, 1100).next, BootState::Ip);
    }

    #[test]
    fn test_ssid_capture() {
        let mut boot = BootSequencer::new();
        boot.state = BootState::Ssid;
        let (effects, _) = feed(&mut boot, b"+CWJAP:\"MyNet\",\"...\"\r\n");
        assert_eq!(boot.ssid(), b"MyNet");
        assert_eq!(boot.state(), BootState::WaitIp);
        assert!(effects.contains(&Effect::Row(0, row(b"MyNet"))));
    }

    #[test]
    fn test_ip_capture_counts_ssid_closing_quote() {
        let stream: &[u8] =
            b"AT+CWJAP?\r\n+CWJAP:\"MyNet\",\"12:34\",6,-51\r\nOK\r\n+CIFSR:STAIP,\"192.168.100.123\"\r\n";
        let mut boot = BootSequencer::new();
        boot.state = BootState::Ssid;
        let (_, consumed) = feed(&mut boot, stream);
        assert_eq!(boot.state(), BootState::WaitIp);
        assert_eq!(stream[consumed], b',');

        // the timer moves us on, unread bytes are still in the ring
        boot.state = BootState::Ip;
        let (effects, _) = feed(&mut boot, &stream[consumed..]);
        assert_eq!(boot.ip(), b"192.168.100.123");
        assert_eq!(boot.state(), BootState::Done);
        assert!(effects.contains(&Effect::Row(1, row(b"    IP    "))));
        assert!(effects.contains(&Effect::Row(2, row(b"192.168.10"))));
        assert!(effects.contains(&Effect::Row(3, row(b"0.123"))));
    }

    #[test]
    fn test_command_mode_even_when_stalled() {
        let mut boot = BootSequencer::new();
        let mut enabled = false;
        for elapsed in 0..1500 {
            let effects = boot.poll(elapsed);
            enabled |= effects.contains(&Effect::ModuleEnable(true));
        }
        assert!(enabled);
        assert_eq!(boot.state(), BootState::Ssid);
        assert!(boot.is_capturing());

        let effects = boot.poll(1500);
        assert!(boot.command_mode());
        assert!(!boot.is_capturing());
        assert!(effects.contains(&Effect::CourseClock(true)));
        assert!(effects.contains(&Effect::IrEmitter(true)));

        // only once
        assert!(boot.poll(1501).is_empty());
    }

    #[test]
    fn test_field_truncates_at_capacity() {
        let mut field = QuotedField::new(1);
        assert!(!field.feed(b'"'));
        for _ in 0..30 {
            assert!(!field.feed(b'x'));
        }
        assert!(field.feed(b'"'));
        assert_eq!(field.value().len(), FIELD_CAPACITY);
    }
}
