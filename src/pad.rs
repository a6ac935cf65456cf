//! Joypad input latch (§4.7): JOYP is a 2-of-2 selector exposing either the
//! d-pad or action-button nibble (or the AND of both, if both are selected)
//! on its low four bits, and raises the JOYPAD interrupt on any button press.

use std::io::Cursor;

use dmg_common::data::{read_u8, write_u8};

use crate::{
    consts::JOYP_ADDR,
    error::Error,
    state::{StateComponent, StateFormat},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PadKey {
    Up,
    Down,
    Left,
    Right,
    Start,
    Select,
    A,
    B,
}

pub struct Pad {
    up: bool,
    down: bool,
    left: bool,
    right: bool,
    start: bool,
    select: bool,
    a: bool,
    b: bool,
    /// Last write to JOYP bit 4 (0 = d-pad nibble selected).
    select_dpad: bool,
    /// Last write to JOYP bit 5 (0 = action-button nibble selected).
    select_buttons: bool,
    int_pad: bool,
}

impl Pad {
    pub fn new() -> Self {
        Self {
            up: false,
            down: false,
            left: false,
            right: false,
            start: false,
            select: false,
            a: false,
            b: false,
            select_dpad: false,
            select_buttons: false,
            int_pad: false,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    fn dpad_nibble(&self) -> u8 {
        (if self.right { 0x00 } else { 0x01 })
            | (if self.left { 0x00 } else { 0x02 })
            | (if self.up { 0x00 } else { 0x04 })
            | (if self.down { 0x00 } else { 0x08 })
    }

    fn buttons_nibble(&self) -> u8 {
        (if self.a { 0x00 } else { 0x01 })
            | (if self.b { 0x00 } else { 0x02 })
            | (if self.select { 0x00 } else { 0x04 })
            | (if self.start { 0x00 } else { 0x08 })
    }

    pub fn read(&self, addr: u16) -> u8 {
        match addr {
            JOYP_ADDR => {
                let mut nibble = 0x0f;
                if self.select_dpad {
                    nibble &= self.dpad_nibble();
                }
                if self.select_buttons {
                    nibble &= self.buttons_nibble();
                }
                nibble
                    | (if self.select_dpad { 0x00 } else { 0x10 })
                    | (if self.select_buttons { 0x00 } else { 0x20 })
                    | 0xc0
            }
            _ => 0xff,
        }
    }

    pub fn write(&mut self, addr: u16, value: u8) {
        if addr == JOYP_ADDR {
            self.select_dpad = value & 0x10 == 0x00;
            self.select_buttons = value & 0x20 == 0x00;
        }
    }

    fn set_key(&mut self, key: PadKey, pressed: bool) {
        let flag = match key {
            PadKey::Up => &mut self.up,
            PadKey::Down => &mut self.down,
            PadKey::Left => &mut self.left,
            PadKey::Right => &mut self.right,
            PadKey::Start => &mut self.start,
            PadKey::Select => &mut self.select,
            PadKey::A => &mut self.a,
            PadKey::B => &mut self.b,
        };
        let was_pressed = *flag;
        *flag = pressed;
        if pressed && !was_pressed {
            self.int_pad = true;
        }
    }

    pub fn key_press(&mut self, key: PadKey) {
        self.set_key(key, true);
    }

    pub fn key_lift(&mut self, key: PadKey) {
        self.set_key(key, false);
    }

    #[inline(always)]
    pub fn int_pad(&self) -> bool {
        self.int_pad
    }

    #[inline(always)]
    pub fn set_int_pad(&mut self, value: bool) {
        self.int_pad = value;
    }

    #[inline(always)]
    pub fn ack_pad(&mut self) {
        self.int_pad = false;
    }

    pub fn select_dpad(&self) -> bool {
        self.select_dpad
    }

    pub fn set_select_dpad(&mut self, value: bool) {
        self.select_dpad = value;
    }

    pub fn select_buttons(&self) -> bool {
        self.select_buttons
    }

    pub fn set_select_buttons(&mut self, value: bool) {
        self.select_buttons = value;
    }

    /// Packs the eight held-key latches into a single byte for save states.
    fn buttons_mask(&self) -> u8 {
        (self.up as u8)
            | (self.down as u8) << 1
            | (self.left as u8) << 2
            | (self.right as u8) << 3
            | (self.start as u8) << 4
            | (self.select as u8) << 5
            | (self.a as u8) << 6
            | (self.b as u8) << 7
    }

    fn set_buttons_mask(&mut self, mask: u8) {
        self.up = mask & 0x01 != 0;
        self.down = mask & 0x02 != 0;
        self.left = mask & 0x04 != 0;
        self.right = mask & 0x08 != 0;
        self.start = mask & 0x10 != 0;
        self.select = mask & 0x20 != 0;
        self.a = mask & 0x40 != 0;
        self.b = mask & 0x80 != 0;
    }
}

impl StateComponent for Pad {
    fn state(&self, _format: Option<StateFormat>) -> Result<Vec<u8>, Error> {
        let mut cursor = Cursor::new(Vec::new());
        write_u8(&mut cursor, self.buttons_mask())?;
        write_u8(&mut cursor, self.select_dpad() as u8)?;
        write_u8(&mut cursor, self.select_buttons() as u8)?;
        write_u8(&mut cursor, self.int_pad() as u8)?;
        Ok(cursor.into_inner())
    }

    fn set_state(&mut self, data: &[u8], _format: Option<StateFormat>) -> Result<(), Error> {
        let mut cursor = Cursor::new(data);
        let mask = read_u8(&mut cursor)?;
        let select_dpad = read_u8(&mut cursor)? != 0;
        let select_buttons = read_u8(&mut cursor)? != 0;
        let int_pad = read_u8(&mut cursor)? != 0;

        self.set_buttons_mask(mask);
        self.set_select_dpad(select_dpad);
        self.set_select_buttons(select_buttons);
        self.set_int_pad(int_pad);
        Ok(())
    }
}

impl Default for Pad {
    fn default() -> Self {
        Self::new()
    }
}
