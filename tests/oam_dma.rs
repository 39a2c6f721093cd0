//! OAM DMA cycle-stealing scenarios: a program arms a transfer by writing
//! the trigger register, the engine monopolizes the bus for a precisely
//! countable number of cycles, and 256 bytes land in object memory.

use famicore::{
    AddressMap, Console, CpuBus, MASTER_PER_CPU_CYCLE, MASTER_PER_PPU_DOT, OAMADDR, RESET_VECTOR,
};

const SOURCE_PAGE: u8 = 0x02;
const PROGRAM_START: u16 = 0x0400;

/// Console with the source page filled 0..=255 and the given program at
/// $0400.
fn dma_console(program: &[u8], target_oam_addr: u8) -> Console {
    let mut console = Console::new(AddressMap::Console);

    let bytes: Vec<u8> = (0..=255u8).collect();
    console.load_bytes((SOURCE_PAGE as u16) << 8, &bytes);

    console.load_bytes(PROGRAM_START, program);
    console.load_bytes(
        RESET_VECTOR,
        &[PROGRAM_START as u8, (PROGRAM_START >> 8) as u8],
    );
    console.reset();
    console.bus.write(OAMADDR, target_oam_addr);
    console
}

/// LDA #$02 / STA $4014 / NOP filler. The store's trigger write lands on an
/// odd bus slot.
const ODD_ARMING: &[u8] = &[0xA9, 0x02, 0x8D, 0x14, 0x40, 0xEA, 0xEA, 0xEA];

/// A three-cycle zero-page load first shifts the trigger write to an even
/// slot.
const EVEN_ARMING: &[u8] = &[0xA5, 0x00, 0xA9, 0x02, 0x8D, 0x14, 0x40, 0xEA, 0xEA];

#[test]
fn odd_arming_stalls_for_514_cycles() {
    let mut console = dma_console(ODD_ARMING, 0);
    while !console.dma.in_progress() {
        console.tick();
    }
    assert_eq!(console.dma.remaining_cycles(), 514);

    let stall_start = console.total_ticks();
    while console.dma.in_progress() {
        console.tick();
    }
    assert_eq!(console.total_ticks() - stall_start, 514);
}

#[test]
fn even_arming_stalls_for_513_cycles() {
    let mut console = dma_console(EVEN_ARMING, 0);
    while !console.dma.in_progress() {
        console.tick();
    }
    assert_eq!(console.dma.remaining_cycles(), 513);

    let stall_start = console.total_ticks();
    while console.dma.in_progress() {
        console.tick();
    }
    assert_eq!(console.total_ticks() - stall_start, 513);
}

#[test]
fn cpu_state_is_frozen_for_the_whole_stall() {
    let mut console = dma_console(ODD_ARMING, 0);
    while !console.dma.in_progress() {
        console.tick();
    }

    let pre_pc = console.cpu.pc;
    let pre_cycles = console.cpu.total_cycles;
    let pre_sp = console.cpu.sp;
    while console.dma.in_progress() {
        let completed = console.tick();
        assert!(!completed);
        assert_eq!(console.cpu.pc, pre_pc);
        assert_eq!(console.cpu.total_cycles, pre_cycles);
        assert_eq!(console.cpu.sp, pre_sp);
    }

    // The in-flight store still finishes its metered cycles afterwards.
    let mut completed = false;
    for _ in 0..8 {
        if console.tick() {
            completed = true;
            break;
        }
    }
    assert!(completed);
}

#[test]
fn transfer_copies_the_full_page_in_order() {
    let mut console = dma_console(ODD_ARMING, 0);
    while !console.dma.in_progress() {
        console.tick();
    }
    while console.dma.in_progress() {
        console.tick();
    }
    for i in 0..256usize {
        assert_eq!(console.bus.ppu.oam[i], i as u8, "OAM byte {}", i);
    }
}

#[test]
fn transfer_honors_the_oam_pointer_offset() {
    for offset in [1u8, 0x10, 0x80, 0xFF] {
        let mut console = dma_console(ODD_ARMING, offset);
        while !console.dma.in_progress() {
            console.tick();
        }
        while console.dma.in_progress() {
            console.tick();
        }
        for i in 0..256usize {
            assert_eq!(
                console.bus.ppu.oam[(i + offset as usize) & 0xFF],
                i as u8,
                "offset {} byte {}",
                offset,
                i
            );
        }
    }
}

#[test]
fn clock_ratios_hold_through_the_stall() {
    let mut console = dma_console(ODD_ARMING, 0);
    for _ in 0..2_000 {
        console.tick();
        let cpu_slots = console.cpu.total_cycles + console.dma_stolen_cycles();
        assert_eq!(console.total_ticks(), cpu_slots);
        assert_eq!(console.master_cycles(), cpu_slots * MASTER_PER_CPU_CYCLE);
        assert_eq!(
            console.master_cycles(),
            console.bus.ppu.total_dots * MASTER_PER_PPU_DOT
        );
    }
    // The transfer actually ran inside the window.
    assert!(console.dma_stolen_cycles() >= 514);
    assert!(!console.dma.in_progress());
}

#[test]
fn back_to_back_transfers_rearm_the_engine() {
    // Two stores to the trigger register, a page apart in arming time.
    let program: &[u8] = &[
        0xA9, 0x02, // LDA #$02
        0x8D, 0x14, 0x40, // STA $4014
        0x8D, 0x14, 0x40, // STA $4014
        0xEA,
    ];
    let mut console = dma_console(program, 0);
    let mut stalls = 0;
    let mut previous_in_progress = false;
    for _ in 0..3_000 {
        console.tick();
        let now = console.dma.in_progress();
        if now && !previous_in_progress {
            stalls += 1;
        }
        previous_in_progress = now;
    }
    assert_eq!(stalls, 2);
    assert!(console.dma_stolen_cycles() >= 2 * 513);
}
