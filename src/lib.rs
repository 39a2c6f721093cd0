//! A cycle-accurate 6502 CPU and memory bus core.
//!
//! The crate models the processor, its 64KB address space, and the OAM DMA
//! engine behind a single cooperative clock: one scheduler tick is one
//! CPU-rate bus slot, granted to the DMA engine while a transfer is in
//! flight and to the CPU otherwise. Timing is reproduced down to the
//! documented quirks: page-crossing cycle penalties, the indirect-JMP
//! page-wrap bug, and the 513/514-cycle DMA stall.

mod apu;
mod cpu;
mod dma;
mod emulator;
mod instruction;
mod memory;
mod ppu;
mod rom;
mod trace;

#[cfg(feature = "cli")]
pub mod config;

pub use apu::Apu;
pub use cpu::{
    Cpu, CpuBus, FLAG_B, FLAG_C, FLAG_D, FLAG_I, FLAG_N, FLAG_U, FLAG_V, FLAG_Z, IRQ_VECTOR,
    NMI_VECTOR, RESET_VECTOR,
};
pub use dma::{DmaCycle, OamDma};
pub use emulator::{
    Console, InstructionHook, MASTER_PER_CPU_CYCLE, MASTER_PER_PPU_DOT, PPU_DOTS_PER_CPU_CYCLE,
};
pub use instruction::{AddrMode, Instruction, Operation, INSTRUCTION_SET};
pub use memory::{AddressMap, MemoryBus, OAM_DMA_REGISTER};
pub use ppu::{Ppu, OAMADDR, OAMDATA};
pub use rom::{ImageError, ProgramImage};
pub use trace::{disassemble_at, disassemble_instruction};
