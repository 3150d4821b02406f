//! 16x2 HD44780 character LCD behind a PCF8574 I²C backpack.
//!
//! The backpack maps its eight outputs onto the LCD in 4-bit mode:
//!
//! ```text
//!  P7 P6 P5 P4 | P3        | P2 | P1 | P0
//!  D7 D6 D5 D4 | backlight | EN | RW | RS
//! ```
//!
//! Every nibble is latched by pulsing EN.  Generic over the
//! `embedded-hal` I²C and delay traits so it runs against `I2cDriver`
//! on the device and a recording bus in tests.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

/// Default 7-bit address of a PCF8574 backpack (A0–A2 pulled high).
pub const DEFAULT_ADDR: u8 = 0x27;

pub const COLUMNS: usize = 16;
pub const ROWS: usize = 2;

const RS: u8 = 0b0000_0001;
const EN: u8 = 0b0000_0100;
const BACKLIGHT: u8 = 0b0000_1000;

const CMD_CLEAR: u8 = 0x01;
const CMD_ENTRY_LEFT: u8 = 0x06;
const CMD_DISPLAY_ON: u8 = 0x0C;
const CMD_FUNCTION_4BIT_2LINE: u8 = 0x28;
const CMD_SET_DDRAM: u8 = 0x80;

/// DDRAM address of the first column of each row.
const ROW_OFFSETS: [u8; ROWS] = [0x00, 0x40];

pub struct Lcd1602<I: I2c, D: DelayNs> {
    i2c: I,
    delay: D,
    addr: u8,
}

impl<I: I2c, D: DelayNs> Lcd1602<I, D> {
    pub fn new(i2c: I, delay: D, addr: u8) -> Self {
        Self { i2c, delay, addr }
    }

    /// Power-on initialisation into 4-bit, two-line mode.
    pub fn init(&mut self) -> Result<(), I::Error> {
        self.delay.delay_ms(50);

        // Three 8-bit "function set" nibbles resynchronise the controller
        // whatever mode it woke up in, then switch to 4-bit.
        self.write_nibble(0x03, 0)?;
        self.delay.delay_us(4500);
        self.write_nibble(0x03, 0)?;
        self.delay.delay_us(4500);
        self.write_nibble(0x03, 0)?;
        self.delay.delay_us(150);
        self.write_nibble(0x02, 0)?;

        self.command(CMD_FUNCTION_4BIT_2LINE)?;
        self.command(CMD_DISPLAY_ON)?;
        self.clear()?;
        self.command(CMD_ENTRY_LEFT)
    }

    pub fn clear(&mut self) -> Result<(), I::Error> {
        self.command(CMD_CLEAR)?;
        self.delay.delay_ms(2);
        Ok(())
    }

    /// Move the cursor; out-of-range positions are clamped.
    pub fn set_cursor(&mut self, col: u8, row: u8) -> Result<(), I::Error> {
        let row = usize::from(row).min(ROWS - 1);
        let col = col.min(COLUMNS as u8 - 1);
        self.command(CMD_SET_DDRAM | (ROW_OFFSETS[row] + col))
    }

    /// Write `text` at the cursor.  Non-ASCII bytes show as `?`.
    pub fn write_str(&mut self, text: &str) -> Result<(), I::Error> {
        for b in text.bytes() {
            let b = if b.is_ascii() { b } else { b'?' };
            self.send(b, RS)?;
        }
        Ok(())
    }

    /// Overwrite one full row, padding with spaces.
    pub fn write_row(&mut self, row: u8, text: &str) -> Result<(), I::Error> {
        self.set_cursor(0, row)?;
        let mut written = 0;
        for b in text.bytes().take(COLUMNS) {
            let b = if b.is_ascii() { b } else { b'?' };
            self.send(b, RS)?;
            written += 1;
        }
        for _ in written..COLUMNS {
            self.send(b' ', RS)?;
        }
        Ok(())
    }

    // ── Internal ──────────────────────────────────────────────

    fn command(&mut self, cmd: u8) -> Result<(), I::Error> {
        self.send(cmd, 0)
    }

    fn send(&mut self, byte: u8, mode: u8) -> Result<(), I::Error> {
        self.write_nibble(byte >> 4, mode)?;
        self.write_nibble(byte & 0x0F, mode)?;
        self.delay.delay_us(40);
        Ok(())
    }

    fn write_nibble(&mut self, nibble: u8, mode: u8) -> Result<(), I::Error> {
        let data = (nibble << 4) | mode | BACKLIGHT;
        self.i2c.write(self.addr, &[data | EN])?;
        self.delay.delay_us(1);
        self.i2c.write(self.addr, &[data])?;
        self.delay.delay_us(50);
        Ok(())
    }
}
