//! Serial Link Tasks
//!
//! One task per UART. Each task runs its receive and transmit halves
//! concurrently:
//! - Receive appends every byte to the link's ring and wakes the other
//!   link's transmitter, which mirrors the bytes for debugging.
//! - Transmit drains, in order, the armed AT sequence (wireless link only)
//!   and the other link's ring through its own cursor.
//!
//! The control loop never talks to a UART directly; it arms
//! `WIRELESS_TX` and calls [`wake_wireless_tx`].

use defmt::{info, warn};
use embassy_futures::join::join;
use embassy_rp::uart::{BufferedUart, Config};
use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, signal::Signal};
use embedded_io_async::{Read, Write};
use rover_core::serial::{RxCursor, RxRing};

use crate::system::resources::{DeviceLinkResources, Irqs, WirelessLinkResources};
use crate::system::state::{DEVICE_RX, WIRELESS_RX, WIRELESS_TX};

/// WiFi module factory default
const WIRELESS_BAUD: u32 = 115_200;

/// Debug console
const DEVICE_BAUD: u32 = 115_200;

/// Bytes pulled from the UART per read
const READ_CHUNK: usize = 16;

const UART_BUFFER_SIZE: usize = 64;

static WIRELESS_TX_WAKE: Signal<CriticalSectionRawMutex, ()> = Signal::new();
static DEVICE_TX_WAKE: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// Wake the wireless transmitter after arming `WIRELESS_TX`
pub fn wake_wireless_tx() {
    WIRELESS_TX_WAKE.signal(());
}

fn wake_device_tx() {
    DEVICE_TX_WAKE.signal(());
}

/// UART0 to the WiFi module
#[embassy_executor::task]
pub async fn wireless_link(r: WirelessLinkResources) {
    static mut TX_BUF: [u8; UART_BUFFER_SIZE] = [0; UART_BUFFER_SIZE];
    static mut RX_BUF: [u8; UART_BUFFER_SIZE] = [0; UART_BUFFER_SIZE];

    let mut config = Config::default();
    config.baudrate = WIRELESS_BAUD;

    // SAFETY: this task is spawned once, the buffers are never aliased
    let uart = BufferedUart::new(
        r.uart,
        r.tx_pin,
        r.rx_pin,
        Irqs,
        unsafe { &mut *core::ptr::addr_of_mut!(TX_BUF) },
        unsafe { &mut *core::ptr::addr_of_mut!(RX_BUF) },
        config,
    );
    let (mut tx, mut rx) = uart.split();
    info!("wireless link up, {} baud", WIRELESS_BAUD);

    // the console echo starts with whatever arrives from now on
    let mut echo = DEVICE_RX.cursor();

    let transmit = async {
        loop {
            WIRELESS_TX_WAKE.wait().await;
            while let Some(byte) = WIRELESS_TX.on_tx_ready() {
                send(&mut tx, byte).await;
            }
            drain(&mut tx, &mut echo, &DEVICE_RX).await;
        }
    };

    join(receive(&mut rx, &WIRELESS_RX, wake_device_tx), transmit).await;
}

/// UART1 debug console
#[embassy_executor::task]
pub async fn device_link(r: DeviceLinkResources) {
    static mut TX_BUF: [u8; UART_BUFFER_SIZE] = [0; UART_BUFFER_SIZE];
    static mut RX_BUF: [u8; UART_BUFFER_SIZE] = [0; UART_BUFFER_SIZE];

    let mut config = Config::default();
    config.baudrate = DEVICE_BAUD;

    // SAFETY: this task is spawned once, the buffers are never aliased
    let uart = BufferedUart::new(
        r.uart,
        r.tx_pin,
        r.rx_pin,
        Irqs,
        unsafe { &mut *core::ptr::addr_of_mut!(TX_BUF) },
        unsafe { &mut *core::ptr::addr_of_mut!(RX_BUF) },
        config,
    );
    let (mut tx, mut rx) = uart.split();
    info!("device link up, {} baud", DEVICE_BAUD);

    let mut echo = WIRELESS_RX.cursor();

    let transmit = async {
        loop {
            DEVICE_TX_WAKE.wait().await;
            drain(&mut tx, &mut echo, &WIRELESS_RX).await;
        }
    };

    join(receive(&mut rx, &DEVICE_RX, wake_wireless_tx), transmit).await;
}

/// Receive half: every byte lands in `ring`, then the mirroring side is woken.
async fn receive<R: Read>(rx: &mut R, ring: &RxRing, wake: fn()) {
    let mut chunk = [0u8; READ_CHUNK];
    loop {
        match rx.read(&mut chunk).await {
            Ok(n) => {
                for byte in &chunk[..n] {
                    ring.on_receive(*byte);
                }
                wake();
            }
            Err(_) => warn!("uart receive error"),
        }
    }
}

/// Forwards unread bytes of `ring`
async fn drain<W: Write>(tx: &mut W, cursor: &mut RxCursor, ring: &RxRing) {
    while let Some(byte) = cursor.next(ring) {
        send(tx, byte).await;
    }
}

/// One byte per transmit-ready event
async fn send<W: Write>(tx: &mut W, byte: u8) {
    if tx.write_all(&[byte]).await.is_err() {
        warn!("uart transmit error");
    }
}
