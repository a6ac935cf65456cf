//! Entry point (§2, §5): the [`GameBoy`] façade owns the CPU (and, through
//! it, the bus and every peripheral) and exposes the surface a host embeds
//! against — frame clocking, button input, ROM/RAM loading and save states.
//! Nothing below this module knows about any of that; it only knows how to
//! advance its own clock domain by a handful of T-cycles at a time.

use std::{cell::RefCell, io::Cursor, rc::Rc};

use dmg_common::data::{read_bytes, read_u32, write_bytes, write_u32};

use crate::{
    apu::Apu,
    cpu::Cpu,
    dma::Dma,
    error::Error,
    mmu::{Mmu, HRAM_SIZE, IO_SIZE, WRAM_SIZE},
    pad::{Pad, PadKey},
    ppu::Ppu,
    rom::Cartridge,
    state::{decode_state, encode_state, StateComponent},
    timer::Timer,
    util::{read_file, write_file, SharedMut},
};

/// One full frame's worth of T-cycles (154 scanlines x 456 dots).
pub const CYCLES_PER_FRAME: u32 = 70224;

/// Host-tunable knobs (§1.3): audio format and which clock-driven
/// peripherals actually advance each frame. Shared with the peripherals
/// that care (currently only the APU's sample-rate) via `SharedMut`, since
/// the core is single-threaded end to end (§5).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GameBoyConfig {
    pub sample_rate: u32,
    pub channels: u8,
    pub ppu_enabled: bool,
    pub apu_enabled: bool,
    pub timer_enabled: bool,
}

impl Default for GameBoyConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44_100,
            channels: 2,
            ppu_enabled: true,
            apu_enabled: true,
            timer_enabled: true,
        }
    }
}

/// The set of memory-mapped peripherals the bus arbitrates between. Built
/// up front and handed to [`Mmu::new`] so construction order never needs
/// to change when a peripheral does.
pub struct Components {
    pub ppu: Ppu,
    pub apu: Apu,
    pub dma: Dma,
    pub pad: Pad,
    pub timer: Timer,
}

impl Components {
    pub fn new(config: SharedMut<GameBoyConfig>) -> Self {
        Self {
            ppu: Ppu::new(),
            apu: Apu::with_config(config),
            dma: Dma::new(),
            pad: Pad::new(),
            timer: Timer::new(),
        }
    }
}

impl Default for Components {
    fn default() -> Self {
        Self {
            ppu: Ppu::new(),
            apu: Apu::new(),
            dma: Dma::new(),
            pad: Pad::new(),
            timer: Timer::new(),
        }
    }
}

/// Owns the whole emulated machine. Construction wires a fresh [`Cpu`] to a
/// fresh [`Mmu`] over a default [`Components`] set; loading a ROM then
/// installs the cartridge the bus forwards 0x0000-0x7FFF/0xA000-0xBFFF to.
pub struct GameBoy {
    cpu: Cpu,
    config: SharedMut<GameBoyConfig>,
}

impl GameBoy {
    pub fn new() -> Self {
        Self::with_config(GameBoyConfig::default())
    }

    pub fn with_config(config: GameBoyConfig) -> Self {
        let config = Rc::new(RefCell::new(config));
        let mmu = Mmu::new(Components::new(config.clone()));
        Self {
            cpu: Cpu::new(mmu),
            config,
        }
    }

    pub fn config(&self) -> GameBoyConfig {
        *self.config.borrow()
    }

    pub fn set_config(&self, config: GameBoyConfig) {
        *self.config.borrow_mut() = config;
    }

    /// Resets every peripheral and register to power-on defaults (§6),
    /// keeping the currently loaded cartridge in place.
    pub fn reset(&mut self) {
        self.cpu.reset();
    }

    /// Parses `rom_data` as a cartridge image and installs it on the bus.
    pub fn load_rom(&mut self, rom_data: Vec<u8>) -> Result<(), Error> {
        let cartridge = Cartridge::from_rom_data(rom_data)?;
        self.cpu.mmu_mut().set_rom(cartridge);
        Ok(())
    }

    /// Reads a persistent-RAM (`.sav`) file from disk and loads it into the
    /// currently installed cartridge's RAM.
    pub fn load_ram_file(&mut self, path: &str) -> Result<(), Error> {
        let data = read_file(path)?;
        self.cpu.mmu_mut().rom_mut().set_ram_data(data);
        Ok(())
    }

    /// Flushes the currently installed cartridge's RAM to disk.
    pub fn save_ram_file(&self, path: &str) -> Result<(), Error> {
        write_file(path, self.cpu.mmu().rom().ram_data(), Some(true))?;
        Ok(())
    }

    /// Runs a single CPU step (one instruction, or one HALT-stalled tick) and
    /// advances every enabled peripheral by the T-cycles it took. Returns the
    /// cycle count, for callers that need sub-frame granularity (tests
    /// driving a handful of instructions at a time).
    pub fn step(&mut self) -> u16 {
        let config = self.config();
        let cycles = self.cpu.clock() as u16;
        let mmu = self.cpu.mmu_mut();
        if config.ppu_enabled {
            mmu.ppu_mut().clock(cycles);
        }
        if config.apu_enabled {
            mmu.apu_mut().clock(cycles);
        }
        if config.timer_enabled {
            mmu.timer_mut().clock(cycles);
        }
        mmu.clock_dma(cycles);
        cycles
    }

    /// Runs [`GameBoy::step`] until the PPU raises its frame-ready edge or the
    /// safety bound (twice a frame's worth of cycles, per §5) is hit. The
    /// latter guards against a failed PPU frame signal rather than ever
    /// triggering in correct operation.
    pub fn run_frame(&mut self) {
        let ppu_enabled = self.config().ppu_enabled;
        self.cpu.mmu_mut().ppu_mut().ack_frame_ready();
        let mut total_cycles: u32 = 0;
        while total_cycles < 2 * CYCLES_PER_FRAME {
            total_cycles += self.step() as u32;
            if ppu_enabled && self.cpu.mmu().ppu().frame_ready() {
                break;
            }
        }
    }

    pub fn key_press(&mut self, key: PadKey) {
        self.cpu.mmu_mut().pad_mut().key_press(key);
    }

    pub fn key_lift(&mut self, key: PadKey) {
        self.cpu.mmu_mut().pad_mut().key_lift(key);
    }

    pub fn framebuffer(&self) -> &[u8] {
        self.cpu.mmu().ppu().framebuffer()
    }

    /// Drains the stereo sample buffer accumulated since the last call.
    pub fn audio_buffer(&mut self) -> Vec<f32> {
        self.cpu.mmu_mut().apu_mut().drain_samples()
    }

    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    pub fn mmu(&self) -> &Mmu {
        self.cpu.mmu()
    }

    pub fn mmu_mut(&mut self) -> &mut Mmu {
        self.cpu.mmu_mut()
    }

    /// Assembles a save-state snapshot in the order fixed by §4.8: CPU,
    /// bus-owned RAM regions, cartridge RAM/bank-controller state, PPU,
    /// timer, joypad. The PPU's own blob already carries VRAM and OAM,
    /// since those arrays live on the PPU rather than the bus.
    pub fn save_state(&self) -> Result<Vec<u8>, Error> {
        let mmu = self.cpu.mmu();
        let mut cursor = Cursor::new(Vec::new());

        write_bytes(&mut cursor, &self.cpu.state(None)?)?;

        write_bytes(&mut cursor, mmu.ram())?;
        write_bytes(&mut cursor, mmu.hram())?;
        write_bytes(&mut cursor, mmu.io())?;
        write_u32(&mut cursor, mmu.ie() as u32)?;

        let rom_state = mmu.rom().state(None)?;
        write_u32(&mut cursor, rom_state.len() as u32)?;
        write_bytes(&mut cursor, &rom_state)?;

        write_bytes(&mut cursor, &mmu.ppu().state(None)?)?;
        write_bytes(&mut cursor, &mmu.timer().state(None)?)?;
        write_bytes(&mut cursor, &mmu.pad().state(None)?)?;

        encode_state(&cursor.into_inner())
    }

    /// Restores a snapshot produced by [`GameBoy::save_state`]. Every field
    /// is parsed out of the decoded payload before any component is
    /// mutated, so a malformed blob leaves the running machine untouched.
    pub fn load_state(&mut self, data: &[u8]) -> Result<(), Error> {
        let payload = decode_state(data)?;
        let mut cursor = Cursor::new(payload.as_slice());

        let cpu_len = self.cpu.state(None)?.len();
        let cpu_state = read_bytes(&mut cursor, cpu_len)?;

        let ram: [u8; WRAM_SIZE] = read_bytes(&mut cursor, WRAM_SIZE)?
            .try_into()
            .map_err(|_| Error::SaveStateFormat("malformed WRAM block".into()))?;
        let hram: [u8; HRAM_SIZE] = read_bytes(&mut cursor, HRAM_SIZE)?
            .try_into()
            .map_err(|_| Error::SaveStateFormat("malformed HRAM block".into()))?;
        let io: [u8; IO_SIZE] = read_bytes(&mut cursor, IO_SIZE)?
            .try_into()
            .map_err(|_| Error::SaveStateFormat("malformed IO block".into()))?;
        let ie = read_u32(&mut cursor)? as u8;

        let rom_len = read_u32(&mut cursor)? as usize;
        let rom_state = read_bytes(&mut cursor, rom_len)?;

        let ppu_len = self.cpu.mmu().ppu().state(None)?.len();
        let ppu_state = read_bytes(&mut cursor, ppu_len)?;
        let timer_len = self.cpu.mmu().timer().state(None)?.len();
        let timer_state = read_bytes(&mut cursor, timer_len)?;
        let pad_len = payload.len() - cursor.position() as usize;
        let pad_state = read_bytes(&mut cursor, pad_len)?;

        self.cpu.set_state(&cpu_state, None)?;
        let mmu = self.cpu.mmu_mut();
        mmu.set_ram(ram);
        mmu.set_hram(hram);
        mmu.set_io(io);
        mmu.set_ie(ie);
        mmu.rom_mut().set_state(&rom_state, None)?;
        mmu.ppu_mut().set_state(&ppu_state, None)?;
        mmu.timer_mut().set_state(&timer_state, None)?;
        mmu.pad_mut().set_state(&pad_state, None)?;

        Ok(())
    }
}

impl Default for GameBoy {
    fn default() -> Self {
        Self::new()
    }
}
