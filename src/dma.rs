use crate::cpu::CpuBus;
use crate::memory::MemoryBus;
use crate::ppu;
use log::debug;

/// Cycle budget of an aligned transfer: one dummy cycle plus 256 alternating
/// read/write pairs. A transfer armed on an odd cycle pays one more dummy
/// cycle so the read/write pairs always start on an even bus cycle.
const ALIGNED_TRANSFER_CYCLES: u16 = 513;

/// What one DMA cycle did, for logging and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DmaCycle {
    /// Alignment cycle before the transfer proper.
    Dummy,
    /// Latched one byte from the source page.
    Read,
    /// Stored the latched byte into object memory via the bus.
    Write,
}

/// Fire-and-forget block transfer of one 256-byte page from the address
/// space into the peripheral's object memory, monopolizing the bus for a
/// precisely countable number of cycles. Created dormant, re-armed by each
/// trigger-register write, self-terminating when the countdown hits zero.
pub struct OamDma {
    remaining: u16,
    source: u16,
    latch: u8,
}

impl Default for OamDma {
    fn default() -> Self {
        Self::new()
    }
}

impl OamDma {
    pub fn new() -> Self {
        Self {
            remaining: 0,
            source: 0,
            latch: 0,
        }
    }

    /// Arm a transfer from `page << 8`. `on_odd_cycle` is the parity of the
    /// cycle count at the trigger write; odd arming costs one extra
    /// alignment cycle.
    pub fn arm(&mut self, page: u8, on_odd_cycle: bool) {
        self.remaining = ALIGNED_TRANSFER_CYCLES + u16::from(on_odd_cycle);
        self.source = (page as u16) << 8;
        debug!(
            "OAM DMA armed: source {:04X}, {} cycles",
            self.source, self.remaining
        );
    }

    /// While true, the scheduler must not advance the CPU.
    pub fn in_progress(&self) -> bool {
        self.remaining != 0
    }

    pub fn remaining_cycles(&self) -> u16 {
        self.remaining
    }

    /// Consume one stolen bus cycle.
    pub fn step(&mut self, bus: &mut MemoryBus) -> DmaCycle {
        self.remaining -= 1;
        if self.remaining >= 512 {
            return DmaCycle::Dummy;
        }
        if self.remaining % 2 == 1 {
            self.latch = bus.read(self.source);
            return DmaCycle::Read;
        }
        bus.write(ppu::OAMDATA, self.latch);
        // Advance the one-byte source pointer; the page byte never changes.
        self.source = (self.source & 0xFF00) | (self.source.wrapping_add(1) & 0x00FF);
        DmaCycle::Write
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::AddressMap;

    fn console_bus() -> MemoryBus {
        let mut bus = MemoryBus::new(AddressMap::Console);
        for i in 0..256u16 {
            bus.write(0x0200 + i, i as u8);
        }
        bus
    }

    #[test]
    fn even_arming_takes_513_cycles_with_one_dummy() {
        let mut bus = console_bus();
        let mut dma = OamDma::new();
        dma.arm(0x02, false);
        assert_eq!(dma.remaining_cycles(), 513);

        let mut cycles = Vec::new();
        while dma.in_progress() {
            cycles.push(dma.step(&mut bus));
        }
        assert_eq!(cycles.len(), 513);
        assert_eq!(cycles[0], DmaCycle::Dummy);
        assert!(cycles[1..].iter().all(|c| *c != DmaCycle::Dummy));
    }

    #[test]
    fn odd_arming_takes_514_cycles_with_two_dummies() {
        let mut bus = console_bus();
        let mut dma = OamDma::new();
        dma.arm(0x02, true);
        assert_eq!(dma.remaining_cycles(), 514);

        let mut cycles = Vec::new();
        while dma.in_progress() {
            cycles.push(dma.step(&mut bus));
        }
        assert_eq!(cycles.len(), 514);
        assert_eq!(cycles[0], DmaCycle::Dummy);
        assert_eq!(cycles[1], DmaCycle::Dummy);
        assert!(cycles[2..].iter().all(|c| *c != DmaCycle::Dummy));
    }

    #[test]
    fn transfer_cycles_alternate_read_then_write() {
        let mut bus = console_bus();
        let mut dma = OamDma::new();
        dma.arm(0x02, false);
        dma.step(&mut bus); // dummy
        let mut reads = 0;
        let mut writes = 0;
        while dma.in_progress() {
            match dma.step(&mut bus) {
                DmaCycle::Read => {
                    reads += 1;
                    assert_eq!(reads, writes + 1);
                }
                DmaCycle::Write => writes += 1,
                DmaCycle::Dummy => panic!("dummy cycle after transfer start"),
            }
        }
        assert_eq!(reads, 256);
        assert_eq!(writes, 256);
    }

    #[test]
    fn transfer_moves_the_whole_page_into_oam() {
        let mut bus = console_bus();
        let mut dma = OamDma::new();
        dma.arm(0x02, false);
        while dma.in_progress() {
            dma.step(&mut bus);
        }
        for i in 0..256usize {
            assert_eq!(bus.ppu.oam[i], i as u8);
        }
    }

    #[test]
    fn transfer_respects_the_oam_pointer_offset() {
        let mut bus = console_bus();
        bus.write(ppu::OAMADDR, 0x10);
        let mut dma = OamDma::new();
        dma.arm(0x02, false);
        while dma.in_progress() {
            dma.step(&mut bus);
        }
        for i in 0..256usize {
            assert_eq!(bus.ppu.oam[(i + 0x10) & 0xFF], i as u8);
        }
    }

    #[test]
    fn source_pointer_wraps_within_the_page() {
        // Arm from a page and confirm the last write read the page's final
        // byte, not the next page's first.
        let mut bus = console_bus();
        bus.write(0x02FF, 0xEE);
        bus.write(0x0300, 0x99);
        let mut dma = OamDma::new();
        dma.arm(0x02, false);
        while dma.in_progress() {
            dma.step(&mut bus);
        }
        assert_eq!(bus.ppu.oam[0xFF], 0xEE);
    }
}
