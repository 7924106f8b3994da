//! Hardware Resource Management
//!
//! Allocates pins and peripherals to the tasks that own them. Every group
//! below is handed to exactly one task, so no peripheral is shared.
//!
//! # Resource Groups
//! - Wireless link: UART0 to the WiFi module
//! - Device link: UART1 debug console
//! - Sensors: left and right line detectors, thumb wheel
//! - Wheels: two PWM slices for the wheel H-bridge, one for the backlight
//! - Board IO: WiFi module enable, link indicator, line detector emitter
//! - Switches: SW1 (stop) and SW2 (identify)

use assign_resources::assign_resources;
use embassy_rp::adc::InterruptHandler as AdcInterruptHandler;
use embassy_rp::bind_interrupts;
use embassy_rp::peripherals::{self, UART0, UART1};
use embassy_rp::uart::BufferedInterruptHandler;

assign_resources! {
    /// UART0 to the WiFi module
    wireless_link: WirelessLinkResources {
        uart: UART0,
        tx_pin: PIN_0,
        rx_pin: PIN_1,
    },
    /// UART1 debug console
    device_link: DeviceLinkResources {
        uart: UART1,
        tx_pin: PIN_4,
        rx_pin: PIN_5,
    },
    /// Analog inputs, sampled round-robin
    sensors: SensorResources {
        adc: ADC,
        left_pin: PIN_26,
        right_pin: PIN_27,
        thumb_pin: PIN_28,
    },
    /// Wheel H-bridge inputs and display backlight
    wheels: WheelResources {
        // Right wheel, PWM5 A/B
        right_slice: PWM_SLICE5,
        right_forward_pin: PIN_10,
        right_reverse_pin: PIN_11,
        // Left wheel, PWM6 A/B
        left_slice: PWM_SLICE6,
        left_forward_pin: PIN_12,
        left_reverse_pin: PIN_13,
        // Backlight, PWM7 A
        backlight_slice: PWM_SLICE7,
        backlight_pin: PIN_14,
    },
    /// Digital outputs driven by the control loop
    board_io: BoardIoResources {
        module_enable_pin: PIN_6,
        link_led_pin: PIN_7,
        ir_emitter_pin: PIN_8,
    },
    /// SW1, emergency stop
    stop_switch: StopSwitchResources {
        pin: PIN_20,
    },
    /// SW2, identification screen
    identify_switch: IdentifySwitchResources {
        pin: PIN_21,
    },
}

bind_interrupts!(pub struct Irqs {
    ADC_IRQ_FIFO => AdcInterruptHandler;
    UART0_IRQ => BufferedInterruptHandler<UART0>;
    UART1_IRQ => BufferedInterruptHandler<UART1>;
});
