//! Bit-banged PS2 bus on Raspberry Pi GPIO lines.

use rppal::gpio::{Gpio, InputPin, OutputPin};
use std::time::{Duration, Instant};
use tracing::debug;

use super::Ps2Bus;
use crate::controller::transport::ControllerPins;
use crate::error::Result;

/// Half clock period (~125 kHz bus clock).
const CLOCK_HALF_PERIOD: Duration = Duration::from_micros(4);

/// Delay between attention going low and the first clock edge.
const ATTENTION_DELAY: Duration = Duration::from_micros(16);

/// Gap between bytes; the controller needs it to acknowledge.
const BYTE_GAP: Duration = Duration::from_micros(16);

/// PS2 bus driven from four GPIO lines.
///
/// Clock idles high. The command bit is set while the clock is high, the
/// controller shifts on the falling edge and the data line is sampled before
/// the clock rises again. Bytes go LSB first.
pub struct GpioBus {
    clock: OutputPin,
    command: OutputPin,
    select: OutputPin,
    data: InputPin,
}

impl std::fmt::Debug for GpioBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GpioBus")
            .field("clock", &self.clock.pin())
            .field("command", &self.command.pin())
            .field("select", &self.select.pin())
            .field("data", &self.data.pin())
            .finish()
    }
}

impl GpioBus {
    /// Claims the four lines and parks the bus idle.
    ///
    /// # Errors
    ///
    /// Returns `Gpio` error if the GPIO peripheral or any pin is unavailable.
    pub fn open(pins: &ControllerPins) -> Result<Self> {
        let gpio = Gpio::new()?;
        let bus = Self {
            clock: gpio.get(pins.clock)?.into_output_high(),
            command: gpio.get(pins.command)?.into_output_high(),
            select: gpio.get(pins.select)?.into_output_high(),
            // The controller only pulls data low; idle needs a pull-up
            data: gpio.get(pins.data)?.into_input_pullup(),
        };
        debug!("Opened PS2 bus: {:?}", bus);
        Ok(bus)
    }

    fn exchange_byte(&mut self, byte: u8) -> u8 {
        let mut received = 0u8;

        for bit in 0..8 {
            if byte & (1 << bit) != 0 {
                self.command.set_high();
            } else {
                self.command.set_low();
            }

            self.clock.set_low();
            spin_delay(CLOCK_HALF_PERIOD);

            if self.data.is_high() {
                received |= 1 << bit;
            }

            self.clock.set_high();
            spin_delay(CLOCK_HALF_PERIOD);
        }

        self.command.set_high();
        received
    }
}

impl Ps2Bus for GpioBus {
    fn transfer(&mut self, command: &[u8]) -> Result<Vec<u8>> {
        let mut response = Vec::with_capacity(command.len());

        self.select.set_low();
        spin_delay(ATTENTION_DELAY);

        for &byte in command {
            response.push(self.exchange_byte(byte));
            spin_delay(BYTE_GAP);
        }

        self.select.set_high();
        Ok(response)
    }
}

/// Busy-waits; `thread::sleep` is far too coarse at microsecond scale.
#[inline]
fn spin_delay(duration: Duration) {
    let start = Instant::now();
    while start.elapsed() < duration {
        std::hint::spin_loop();
    }
}
