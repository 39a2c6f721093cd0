use crate::cpu::Cpu;
use crate::dma::OamDma;
use crate::memory::{AddressMap, MemoryBus};
use crate::trace::{disassemble_at, TraceState};
use log::debug;

// Master clock ratios: the CPU sees one cycle per 12 master cycles, the
// video unit one dot per 4. Three dots per CPU cycle, always.
pub const MASTER_PER_CPU_CYCLE: u64 = 12;
pub const MASTER_PER_PPU_DOT: u64 = 4;
pub const PPU_DOTS_PER_CPU_CYCLE: u64 = MASTER_PER_CPU_CYCLE / MASTER_PER_PPU_DOT;

/// Observer invoked once per completed instruction. Observation only; core
/// behavior is identical with or without one installed.
pub type InstructionHook = Box<dyn FnMut(&Cpu)>;

/// The whole machine behind one clock: CPU, address space, and the DMA
/// engine, advanced cooperatively one scheduler tick at a time. Each tick is
/// one CPU-rate bus slot; the slot goes to the DMA engine while a transfer
/// is in flight and to the CPU otherwise, never to both.
pub struct Console {
    pub cpu: Cpu,
    pub bus: MemoryBus,
    pub dma: OamDma,
    total_ticks: u64,
    master_cycles: u64,
    dma_stolen_cycles: u64,
    trace: TraceState,
    instruction_hook: Option<InstructionHook>,
}

impl Console {
    pub fn new(map: AddressMap) -> Self {
        Self {
            cpu: Cpu::new(),
            bus: MemoryBus::new(map),
            dma: OamDma::new(),
            total_ticks: 0,
            master_cycles: 0,
            dma_stolen_cycles: 0,
            trace: TraceState::new(false),
            instruction_hook: None,
        }
    }

    /// Reset the CPU through the bus (PC from the reset vector) and zero
    /// the scheduler counters.
    pub fn reset(&mut self) {
        self.cpu.reset(&mut self.bus);
        self.total_ticks = 0;
        self.master_cycles = 0;
        self.dma_stolen_cycles = 0;
    }

    pub fn load_bytes(&mut self, start: u16, bytes: &[u8]) {
        self.bus.load_bytes(start, bytes);
    }

    pub fn raise_nmi(&mut self) {
        self.cpu.raise_nmi();
    }

    pub fn raise_irq(&mut self) {
        self.cpu.raise_irq();
    }

    pub fn set_trace(&mut self, enabled: bool) {
        self.trace.enabled = enabled;
    }

    /// Install the per-instruction observer.
    pub fn set_instruction_hook(&mut self, hook: InstructionHook) {
        self.instruction_hook = Some(hook);
    }

    pub fn total_ticks(&self) -> u64 {
        self.total_ticks
    }

    pub fn master_cycles(&self) -> u64 {
        self.master_cycles
    }

    /// Cycles the DMA engine has stolen from the CPU since reset.
    pub fn dma_stolen_cycles(&self) -> u64 {
        self.dma_stolen_cycles
    }

    /// Advance the machine by one scheduler tick. Returns `true` when the
    /// tick completed a CPU instruction (never during a DMA stall).
    pub fn tick(&mut self) -> bool {
        self.total_ticks += 1;
        self.master_cycles += MASTER_PER_CPU_CYCLE;

        // The video unit runs at its own fixed ratio regardless of who owns
        // the bus slot below.
        for _ in 0..PPU_DOTS_PER_CPU_CYCLE {
            if self.bus.ppu.tick() {
                self.cpu.raise_nmi();
            }
        }

        let completed = if self.dma.in_progress() {
            self.dma.step(&mut self.bus);
            self.dma_stolen_cycles += 1;
            false
        } else {
            self.cpu.clock(&mut self.bus)
        };

        // A trigger write during this slot arms the engine now; stealing
        // begins on the next tick. Alignment comes from the slot parity at
        // the time of the write.
        if let Some(page) = self.bus.ppu.take_dma_request() {
            self.dma.arm(page, self.total_ticks % 2 == 1);
            debug!("DMA armed on tick {}", self.total_ticks);
        }

        if completed {
            if self.trace.enabled {
                println!(
                    "{} A:{:02X} X:{:02X} Y:{:02X} P:{:02X} SP:{:02X} CYC:{}",
                    disassemble_at(&self.bus, self.cpu.previous_pc),
                    self.cpu.a,
                    self.cpu.x,
                    self.cpu.y,
                    self.cpu.status,
                    self.cpu.sp,
                    self.cpu.total_cycles
                );
            }
            if let Some(hook) = self.instruction_hook.as_mut() {
                hook(&self.cpu);
            }
        }
        completed
    }

    /// True when the last completed instruction left PC where it started:
    /// the self-loop convention conformance tests use as a halt signal.
    pub fn trapped(&self) -> bool {
        self.cpu.previous_pc == self.cpu.pc
    }

    /// Run until the program parks itself in a self-loop, or until the tick
    /// budget runs out. Returns the trap address on success.
    pub fn run_until_trap(&mut self, max_ticks: u64) -> Option<u16> {
        let start = self.total_ticks;
        while self.total_ticks - start < max_ticks {
            if self.tick() && self.trapped() {
                return Some(self.cpu.pc);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::RESET_VECTOR;
    use crate::memory::OAM_DMA_REGISTER;

    fn flat_console(start: u16, program: &[u8]) -> Console {
        let mut console = Console::new(AddressMap::Flat);
        console.load_bytes(start, program);
        console.load_bytes(RESET_VECTOR, &[start as u8, (start >> 8) as u8]);
        console.reset();
        console
    }

    fn console_with_program(start: u16, program: &[u8]) -> Console {
        let mut console = Console::new(AddressMap::Console);
        console.load_bytes(start, program);
        console.load_bytes(RESET_VECTOR, &[start as u8, (start >> 8) as u8]);
        console.reset();
        console
    }

    #[test]
    fn clock_ratios_hold_after_any_number_of_ticks() {
        let mut console = flat_console(0x0400, &[0xEA, 0x4C, 0x00, 0x04]);
        for ticks in [1u64, 7, 100, 1234] {
            for _ in 0..ticks {
                console.tick();
            }
            let cpu_slots = console.cpu.total_cycles + console.dma_stolen_cycles();
            assert_eq!(console.master_cycles(), cpu_slots * MASTER_PER_CPU_CYCLE);
            assert_eq!(
                console.master_cycles(),
                console.bus.ppu.total_dots * MASTER_PER_PPU_DOT
            );
            assert_eq!(console.total_ticks(), cpu_slots);
        }
    }

    #[test]
    fn ratios_hold_while_dma_is_stealing_cycles() {
        // LDA #$02, STA $4014, then spin.
        let mut console =
            console_with_program(0x0400, &[0xA9, 0x02, 0x8D, 0x14, 0x40, 0x4C, 0x05, 0x04]);
        for _ in 0..2000 {
            console.tick();
            let cpu_slots = console.cpu.total_cycles + console.dma_stolen_cycles();
            assert_eq!(console.total_ticks(), cpu_slots);
            assert_eq!(console.master_cycles(), cpu_slots * MASTER_PER_CPU_CYCLE);
            assert_eq!(
                console.master_cycles(),
                console.bus.ppu.total_dots * MASTER_PER_PPU_DOT
            );
        }
        assert!(console.dma_stolen_cycles() >= 513);
    }

    #[test]
    fn dma_stalls_the_cpu_completely() {
        let mut console =
            console_with_program(0x0400, &[0xA9, 0x02, 0x8D, 0x14, 0x40, 0xEA, 0xEA]);
        // Run until the DMA engine takes the bus.
        while !console.dma.in_progress() {
            console.tick();
        }
        let pc = console.cpu.pc;
        let cycles = console.cpu.total_cycles;
        let a = console.cpu.a;
        while console.dma.in_progress() {
            assert!(!console.tick());
        }
        assert_eq!(console.cpu.pc, pc);
        assert_eq!(console.cpu.total_cycles, cycles);
        assert_eq!(console.cpu.a, a);
    }

    #[test]
    fn exactly_one_component_advances_per_tick() {
        let mut console =
            console_with_program(0x0400, &[0xA9, 0x02, 0x8D, 0x14, 0x40, 0x4C, 0x05, 0x04]);
        for _ in 0..2000 {
            let cpu_before = console.cpu.total_cycles;
            let stolen_before = console.dma_stolen_cycles();
            console.tick();
            let cpu_delta = console.cpu.total_cycles - cpu_before;
            let stolen_delta = console.dma_stolen_cycles() - stolen_before;
            assert_eq!(cpu_delta + stolen_delta, 1);
        }
    }

    #[test]
    fn trap_is_observed_at_a_self_jump() {
        // JMP * at $0400.
        let mut console = flat_console(0x0400, &[0x4C, 0x00, 0x04]);
        let trap = console.run_until_trap(1_000);
        assert_eq!(trap, Some(0x0400));
    }

    #[test]
    fn run_until_trap_gives_up_after_the_budget() {
        // NOP slide with a jump back: never traps (the jump target differs
        // from the jump's own address).
        let mut console = flat_console(0x0400, &[0xEA, 0x4C, 0x00, 0x04]);
        assert_eq!(console.run_until_trap(500), None);
    }

    #[test]
    fn instruction_hook_fires_once_per_instruction() {
        use std::cell::Cell;
        use std::rc::Rc;

        let mut console = flat_console(0x0400, &[0xEA, 0xEA, 0xEA]);
        let count = Rc::new(Cell::new(0u32));
        let seen = count.clone();
        console.set_instruction_hook(Box::new(move |_cpu| {
            seen.set(seen.get() + 1);
        }));
        // Three NOPs: six ticks, three boundaries.
        for _ in 0..6 {
            console.tick();
        }
        assert_eq!(count.get(), 3);
    }

    #[test]
    fn vblank_nmi_reaches_the_cpu() {
        // Enable NMI via PPUCTRL, then spin in place; vblank breaks the
        // spin and the handler parks at $0500.
        let mut console = console_with_program(
            0x0400,
            &[0xA9, 0x80, 0x8D, 0x00, 0x20, 0x4C, 0x05, 0x04],
        );
        console.load_bytes(0x0500, &[0x4C, 0x00, 0x05]);
        console.load_bytes(crate::cpu::NMI_VECTOR, &[0x00, 0x05]);
        let mut handler_trap = None;
        for _ in 0..200_000u32 {
            if console.tick() && console.trapped() && console.cpu.pc == 0x0500 {
                handler_trap = Some(console.cpu.pc);
                break;
            }
        }
        assert_eq!(handler_trap, Some(0x0500));
    }

    #[test]
    fn dma_start_is_armed_by_the_trigger_write() {
        let mut console =
            console_with_program(0x0400, &[0xA9, 0x02, 0x8D, 0x14, 0x40, 0xEA]);
        assert!(!console.dma.in_progress());
        // LDA (2 ticks) + STA's first cycle arms on the fetch tick.
        console.tick();
        console.tick();
        assert!(!console.dma.in_progress());
        console.tick();
        assert!(console.dma.in_progress());
        let expected = 513 + (3 % 2); // armed on tick 3, odd
        assert_eq!(console.dma.remaining_cycles(), expected as u16);
        // The direct register write path reports through the bus dispatch
        // too, not only through executed stores.
        let mut direct = Console::new(AddressMap::Console);
        use crate::cpu::CpuBus;
        direct.bus.write(OAM_DMA_REGISTER, 0x03);
        assert_eq!(direct.bus.ppu.take_dma_request(), Some(0x03));
    }
}
