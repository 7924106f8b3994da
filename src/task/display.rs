//! Display Task
//!
//! Renders the four display rows. The panel driver is not part of this
//! firmware yet, so rows go out over defmt.

use defmt::info;
use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, signal::Signal};
use rover_core::display::{RowText, ROWS};

static ROWS_SIGNAL: Signal<CriticalSectionRawMutex, [RowText; ROWS]> = Signal::new();

/// Hand the current rows to the renderer; a newer set replaces one not yet drawn
pub fn show(rows: &[RowText; ROWS]) {
    ROWS_SIGNAL.signal(*rows);
}

#[embassy_executor::task]
pub async fn display() {
    loop {
        let rows = ROWS_SIGNAL.wait().await;
        for (index, row) in rows.iter().enumerate() {
            info!("display {}: |{=[u8]:a}|", index, row.as_slice());
        }
    }
}
