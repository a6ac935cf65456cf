//! Bus (§4.1): the 16-bit memory map arbiter. Owns WRAM/HRAM/the IO
//! catch-all directly and forwards address ranges owned by a peripheral
//! (cartridge, PPU, APU, timer, pad, DMA) to that peripheral.

use crate::{
    apu::Apu,
    consts::{DMA_ADDR, IE_ADDR, IF_ADDR, JOYP_ADDR},
    dma::Dma,
    gb::Components,
    pad::Pad,
    ppu::Ppu,
    rom::Cartridge,
    timer::Timer,
    warnln,
};

pub const WRAM_SIZE: usize = 8192;
pub const HRAM_SIZE: usize = 127;
pub const IO_SIZE: usize = 128;

pub struct Mmu {
    ppu: Ppu,
    apu: Apu,
    dma: Dma,
    pad: Pad,
    timer: Timer,
    rom: Cartridge,

    /// 0xC000-0xDFFF, aliased read/write at 0xE000-0xFDFF.
    ram: [u8; WRAM_SIZE],
    /// 0xFF80-0xFFFE.
    hram: [u8; HRAM_SIZE],
    /// Catch-all storage for the I/O page addresses that no peripheral
    /// above decodes (unused register slots, still addressable per §3).
    io: [u8; IO_SIZE],
    /// 0xFFFF.
    ie: u8,
}

impl Mmu {
    pub fn new(components: Components) -> Self {
        Self {
            ppu: components.ppu,
            apu: components.apu,
            dma: components.dma,
            pad: components.pad,
            timer: components.timer,
            rom: Cartridge::empty(),
            ram: [0u8; WRAM_SIZE],
            hram: [0u8; HRAM_SIZE],
            io: [0u8; IO_SIZE],
            ie: 0,
        }
    }

    pub fn set_rom(&mut self, rom: Cartridge) {
        self.rom = rom;
    }

    pub fn rom(&self) -> &Cartridge {
        &self.rom
    }

    pub fn rom_mut(&mut self) -> &mut Cartridge {
        &mut self.rom
    }

    pub fn ppu(&self) -> &Ppu {
        &self.ppu
    }

    pub fn ppu_mut(&mut self) -> &mut Ppu {
        &mut self.ppu
    }

    pub fn apu(&self) -> &Apu {
        &self.apu
    }

    pub fn apu_mut(&mut self) -> &mut Apu {
        &mut self.apu
    }

    pub fn pad_mut(&mut self) -> &mut Pad {
        &mut self.pad
    }

    pub fn pad(&self) -> &Pad {
        &self.pad
    }

    pub fn timer(&self) -> &Timer {
        &self.timer
    }

    pub fn timer_mut(&mut self) -> &mut Timer {
        &mut self.timer
    }

    pub fn ram(&self) -> &[u8; WRAM_SIZE] {
        &self.ram
    }

    pub fn set_ram(&mut self, value: [u8; WRAM_SIZE]) {
        self.ram = value;
    }

    pub fn hram(&self) -> &[u8; HRAM_SIZE] {
        &self.hram
    }

    pub fn set_hram(&mut self, value: [u8; HRAM_SIZE]) {
        self.hram = value;
    }

    pub fn io(&self) -> &[u8; IO_SIZE] {
        &self.io
    }

    pub fn set_io(&mut self, value: [u8; IO_SIZE]) {
        self.io = value;
    }

    pub fn ie(&self) -> u8 {
        self.ie
    }

    pub fn set_ie(&mut self, value: u8) {
        self.ie = value;
    }

    /// Advances the OAM DMA controller, copying its 160-byte transfer
    /// (via ordinary bus reads) once it completes.
    pub fn clock_dma(&mut self, cycles: u16) {
        if let Some(source) = self.dma.clock(cycles) {
            let data = self.read_many(source, 160);
            self.write_many(0xfe00, &data);
        }
    }

    pub fn read(&self, addr: u16) -> u8 {
        match addr {
            0x0000..=0x7fff => self.rom.read_rom(addr),
            0x8000..=0x9fff => self.ppu.read(addr),
            0xa000..=0xbfff => self.rom.read_ram(addr),
            0xc000..=0xdfff => self.ram[(addr & 0x1fff) as usize],
            0xe000..=0xfdff => self.ram[(addr & 0x1fff) as usize],
            0xfe00..=0xfe9f => self.ppu.read(addr),
            0xfea0..=0xfeff => 0xff,
            JOYP_ADDR => self.pad.read(addr),
            0xff04..=0xff07 => self.timer.read(addr),
            IF_ADDR => {
                0xe0 | (if self.ppu.int_vblank() { 0x01 } else { 0 })
                    | (if self.ppu.int_stat() { 0x02 } else { 0 })
                    | (if self.timer.int_tima() { 0x04 } else { 0 })
                    | (if self.pad.int_pad() { 0x10 } else { 0 })
            }
            0xff10..=0xff26 | 0xff30..=0xff3f => self.apu.read(addr),
            0xff40..=0xff45 | 0xff47..=0xff4b => self.ppu.read(addr),
            DMA_ADDR => self.dma.read(addr),
            0xff80..=0xfffe => self.hram[(addr - 0xff80) as usize],
            IE_ADDR => self.ie,
            0xff00..=0xff7f => self.io[(addr - 0xff00) as usize],
            _ => {
                warnln!("reading from unmapped address 0x{:04x}", addr);
                0xff
            }
        }
    }

    pub fn write(&mut self, addr: u16, value: u8) {
        match addr {
            0x0000..=0x7fff => self.rom.write_control(addr, value),
            0x8000..=0x9fff => self.ppu.write(addr, value),
            0xa000..=0xbfff => self.rom.write_ram(addr, value),
            0xc000..=0xdfff => self.ram[(addr & 0x1fff) as usize] = value,
            0xe000..=0xfdff => self.ram[(addr & 0x1fff) as usize] = value,
            0xfe00..=0xfe9f => self.ppu.write(addr, value),
            0xfea0..=0xfeff => {}
            JOYP_ADDR => self.pad.write(addr, value),
            0xff04..=0xff07 => self.timer.write(addr, value),
            IF_ADDR => {
                self.ppu.set_int_vblank(value & 0x01 != 0);
                self.ppu.set_int_stat(value & 0x02 != 0);
                self.timer.set_int_tima(value & 0x04 != 0);
                self.pad.set_int_pad(value & 0x10 != 0);
            }
            0xff10..=0xff26 | 0xff30..=0xff3f => self.apu.write(addr, value),
            0xff40..=0xff45 | 0xff47..=0xff4b => self.ppu.write(addr, value),
            DMA_ADDR => self.dma.write(addr, value),
            0xff80..=0xfffe => self.hram[(addr - 0xff80) as usize] = value,
            IE_ADDR => self.ie = value,
            0xff00..=0xff7f => self.io[(addr - 0xff00) as usize] = value,
            _ => warnln!("writing to unmapped address 0x{:04x}", addr),
        }
    }

    pub fn read_many(&mut self, addr: u16, count: u16) -> Vec<u8> {
        (0..count).map(|offset| self.read(addr + offset)).collect()
    }

    pub fn write_many(&mut self, addr: u16, data: &[u8]) {
        for (offset, &value) in data.iter().enumerate() {
            self.write(addr + offset as u16, value);
        }
    }
}
