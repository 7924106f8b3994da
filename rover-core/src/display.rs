//! Display surface
//!
//! Four fixed-width rows plus a changed flag. Rendering belongs to an external
//! collaborator that checks [`Display::take_changed`] once per control pass.

pub const ROWS: usize = 4;
pub const ROW_WIDTH: usize = 10;

/// Text of one display row, space padded
pub type RowText = [u8; ROW_WIDTH];

/// Blank row
pub const BLANK: RowText = [b' '; ROW_WIDTH];

/// Builds a row from `text`, truncated or padded with spaces.
pub const fn row(text: &[u8]) -> RowText {
    let mut out = BLANK;
    let mut i = 0;
    while i < ROW_WIDTH && i < text.len() {
        out[i] = text[i];
        i += 1;
    }
    out
}

/// Four decimal digits of `value`, most significant first. Values past 9999
/// saturate.
pub fn to_digits(value: u32) -> [u8; 4] {
    let value = value.min(9999);
    [
        b'0' + (value / 1000) as u8,
        b'0' + (value / 100 % 10) as u8,
        b'0' + (value / 10 % 10) as u8,
        b'0' + (value % 10) as u8,
    ]
}

/// Writes `seconds` as `NNNNs` into columns 5-9 of `text`
pub fn stamp_seconds(text: &mut RowText, seconds: u32) {
    text[5..9].copy_from_slice(&to_digits(seconds));
    text[9] = b's';
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Display {
    rows: [RowText; ROWS],
    changed: bool,
}

impl Default for Display {
    fn default() -> Self {
        Self::new()
    }
}

impl Display {
    pub const fn new() -> Self {
        Self {
            rows: [BLANK; ROWS],
            changed: false,
        }
    }

    /// Overwrites a row. Rows past the last one are ignored.
    pub fn write_row(&mut self, index: usize, text: &RowText) {
        if let Some(row) = self.rows.get_mut(index) {
            if row != text {
                *row = *text;
                self.changed = true;
            }
        }
    }

    pub fn row(&self, index: usize) -> &RowText {
        &self.rows[index]
    }

    pub fn rows(&self) -> &[RowText; ROWS] {
        &self.rows
    }

    pub fn is_changed(&self) -> bool {
        self.changed
    }

    /// Returns the changed flag and clears it
    pub fn take_changed(&mut self) -> bool {
        core::mem::take(&mut self.changed)
    }
}
