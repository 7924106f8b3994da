//! Side effects of a state machine step
//!
//! Transition functions are pure: they return the next state and a list of
//! effects, and the control loop applies the effects in order.

use heapless::Vec;

use crate::config::EFFECT_CAPACITY;
use crate::display::RowText;
use crate::drive::Drive;
use crate::time_base::Timer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    Drive(Drive),
    Backlight(bool),
    /// Overwrite a display row
    Row(usize, RowText),
    /// Arm a sequence on the wireless link
    Transmit(&'static [u8]),
    ResetTimer(Timer),
    /// Start (`true`) or stop the course seconds clock
    CourseClock(bool),
    ModuleEnable(bool),
    IrEmitter(bool),
}

/// Ordered, bounded list of effects
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Effects(Vec<Effect, EFFECT_CAPACITY>);

impl Effects {
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, effect: Effect) {
        if self.0.push(effect).is_err() {
            warn!("effect list full, dropping effect");
            debug_assert!(false, "effect list overflow");
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Effect> {
        self.0.iter()
    }

    pub fn contains(&self, effect: &Effect) -> bool {
        self.0.contains(effect)
    }

    /// Whether any effect moves the wheels
    pub fn drives(&self) -> bool {
        self.0
            .iter()
            .any(|e| matches!(e, Effect::Drive(d) if *d != Drive::Off))
    }
}

impl IntoIterator for Effects {
    type Item = Effect;
    type IntoIter = <Vec<Effect, EFFECT_CAPACITY> as IntoIterator>::IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Result of one transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step<S> {
    pub next: S,
    pub effects: Effects,
}

impl<S> Step<S> {
    pub fn new(next: S) -> Self {
        Self {
            next,
            effects: Effects::new(),
        }
    }

    pub fn with(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn push(&mut self, effect: Effect) {
        self.effects.push(effect);
    }

    /// Keeps the effects, swaps the state
    pub fn map<T>(self, f: impl FnOnce(S) -> T) -> Step<T> {
        Step {
            next: f(self.next),
            effects: self.effects,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_drive_wins_when_read_backwards() {
        let step = Step::new(())
            .with(Effect::Drive(Drive::ForwardFast))
            .with(Effect::Backlight(true))
            .with(Effect::Drive(Drive::Off));
        let last = step.effects.iter().rev().find_map(|e| match e {
            Effect::Drive(d) => Some(*d),
            _ => None,
        });
        assert_eq!(last, Some(Drive::Off));
        assert!(step.effects.drives());
    }
}
