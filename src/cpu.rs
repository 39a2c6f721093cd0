use crate::instruction::{AddrMode, Instruction, Operation, INSTRUCTION_SET};
use log::trace;

// Status flags
pub const FLAG_C: u8 = 0x01; // Carry
pub const FLAG_Z: u8 = 0x02; // Zero
pub const FLAG_I: u8 = 0x04; // Interrupt Disable
pub const FLAG_D: u8 = 0x08; // Decimal Mode (accepted, never applied to ADC/SBC)
pub const FLAG_B: u8 = 0x10; // Break (exists only in pushed copies of P)
pub const FLAG_U: u8 = 0x20; // Unused (always 1)
pub const FLAG_V: u8 = 0x40; // Overflow
pub const FLAG_N: u8 = 0x80; // Negative

pub const STACK_BASE_ADDR: u16 = 0x0100;

pub const NMI_VECTOR: u16 = 0xFFFA;
pub const RESET_VECTOR: u16 = 0xFFFC;
pub const IRQ_VECTOR: u16 = 0xFFFE;

/// Power-on/reset status value: unused + break + interrupt-disable.
pub const RESET_STATUS: u8 = 0x34;

/// Every hardware interrupt sequence takes seven cycles. BRK is an ordinary
/// opcode and carries its own count in the table.
const INTERRUPT_CYCLES: u8 = 7;

/// The narrow bus capability handed to the CPU. The CPU never sees the
/// concrete bus type; the component that owns both binds them per call.
pub trait CpuBus {
    fn read(&mut self, addr: u16) -> u8;
    fn write(&mut self, addr: u16, value: u8);
}

/// Resolved operand of the in-flight instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operand {
    None,
    Accumulator,
    Immediate(u8),
    Address(u16),
}

#[derive(Debug, Clone)]
pub struct Cpu {
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub sp: u8,
    pub pc: u16,
    pub status: u8,
    /// PC captured before the most recent opcode fetch. A completed
    /// instruction that leaves `pc == previous_pc` is the trap observable
    /// conformance harnesses key on.
    pub previous_pc: u16,
    /// Remaining cycles of the in-flight instruction.
    pub cycles_left: u8,
    /// Monotonic count of cycles the CPU actually executed. Cycles stolen
    /// by DMA are not counted here; the scheduler accounts for those.
    pub total_cycles: u64,
    nmi_pending: bool,
    irq_pending: bool,
    /// True while the metered cycles belong to an interrupt sequence rather
    /// than an instruction; those cycles never report a boundary.
    servicing_interrupt: bool,
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}

impl Cpu {
    pub fn new() -> Self {
        Self {
            a: 0,
            x: 0,
            y: 0,
            sp: 0xFF,
            pc: 0,
            status: RESET_STATUS,
            previous_pc: 0,
            cycles_left: 0,
            total_cycles: 0,
            nmi_pending: false,
            irq_pending: false,
            servicing_interrupt: false,
        }
    }

    /// Hardware reset: no stack activity, SP and P forced, PC fetched from
    /// the reset vector.
    pub fn reset(&mut self, bus: &mut dyn CpuBus) {
        self.sp = 0xFF;
        self.status = RESET_STATUS;
        self.pc = self.read_word(RESET_VECTOR, bus);
        self.previous_pc = self.pc;
        self.cycles_left = 0;
        self.total_cycles = 0;
        self.nmi_pending = false;
        self.irq_pending = false;
        self.servicing_interrupt = false;
    }

    /// Latch a non-maskable interrupt request. Serviced at the next
    /// instruction boundary, ahead of any pending IRQ.
    pub fn raise_nmi(&mut self) {
        self.nmi_pending = true;
    }

    /// Latch a maskable interrupt request. Stays pending until the
    /// interrupt-disable flag allows it to be serviced.
    pub fn raise_irq(&mut self) {
        self.irq_pending = true;
    }

    /// Advance the CPU by one cycle. Returns `true` exactly on the final
    /// cycle of an instruction or interrupt sequence.
    ///
    /// Timing model: the architectural effect of an instruction is applied
    /// atomically on its first cycle; the rest of its declared budget is
    /// metered out one `clock` call at a time so that cycle-stealing
    /// peripherals can interleave correctly.
    pub fn clock(&mut self, bus: &mut dyn CpuBus) -> bool {
        self.total_cycles += 1;

        if self.cycles_left > 0 {
            self.cycles_left -= 1;
            if self.cycles_left > 0 {
                return false;
            }
            let was_interrupt = self.servicing_interrupt;
            self.servicing_interrupt = false;
            return !was_interrupt;
        }

        if self.nmi_pending {
            self.nmi_pending = false;
            self.interrupt(NMI_VECTOR, bus);
            self.cycles_left = INTERRUPT_CYCLES - 1;
            return false;
        }
        if self.irq_pending && !self.get_flag(FLAG_I) {
            self.irq_pending = false;
            self.interrupt(IRQ_VECTOR, bus);
            self.cycles_left = INTERRUPT_CYCLES - 1;
            return false;
        }

        self.previous_pc = self.pc;
        let opcode = bus.read(self.pc);
        self.pc = self.pc.wrapping_add(1);

        let instruction = &INSTRUCTION_SET[opcode as usize];
        let (operand, page_crossed) = self.resolve(instruction.mode, bus);

        let mut cycles = instruction.cycles;
        if instruction.page_penalty && page_crossed {
            cycles += 1;
        }
        cycles += self.execute(instruction, operand, bus);

        self.status |= FLAG_U;

        trace!(
            "{:04X} {:02X} {} A:{:02X} X:{:02X} Y:{:02X} P:{:02X} SP:{:02X}",
            self.previous_pc,
            opcode,
            instruction.mnemonic,
            self.a,
            self.x,
            self.y,
            self.status,
            self.sp
        );

        self.cycles_left = cycles.saturating_sub(1);
        self.cycles_left == 0
    }

    /// Hardware interrupt entry (NMI/IRQ): push PC and P with the Break bit
    /// clear, set interrupt-disable, load PC from the vector.
    fn interrupt(&mut self, vector: u16, bus: &mut dyn CpuBus) {
        self.push_word(self.pc, bus);
        self.push((self.status & !FLAG_B) | FLAG_U, bus);
        self.set_flag(FLAG_I, true);
        self.pc = self.read_word(vector, bus);
        self.servicing_interrupt = true;
    }

    // Addressing-mode resolution. Returns the operand plus whether an
    // indexed effective address crossed a page boundary.
    fn resolve(&mut self, mode: AddrMode, bus: &mut dyn CpuBus) -> (Operand, bool) {
        match mode {
            AddrMode::Implied => (Operand::None, false),
            AddrMode::Accumulator => (Operand::Accumulator, false),
            AddrMode::Immediate => (Operand::Immediate(self.fetch_byte(bus)), false),
            AddrMode::ZeroPage => (Operand::Address(self.fetch_byte(bus) as u16), false),
            AddrMode::ZeroPageX => {
                let base = self.fetch_byte(bus) as u16;
                (Operand::Address(base.wrapping_add(self.x as u16) & 0x00FF), false)
            }
            AddrMode::ZeroPageY => {
                let base = self.fetch_byte(bus) as u16;
                (Operand::Address(base.wrapping_add(self.y as u16) & 0x00FF), false)
            }
            AddrMode::Absolute => (Operand::Address(self.fetch_word(bus)), false),
            AddrMode::AbsoluteX => {
                let base = self.fetch_word(bus);
                let addr = base.wrapping_add(self.x as u16);
                (Operand::Address(addr), page_crossed(base, addr))
            }
            AddrMode::AbsoluteY => {
                let base = self.fetch_word(bus);
                let addr = base.wrapping_add(self.y as u16);
                (Operand::Address(addr), page_crossed(base, addr))
            }
            AddrMode::Indirect => {
                // Used only by JMP. Reproduces the hardware bug: a pointer
                // ending in $FF fetches its high byte from the start of the
                // same page instead of carrying into the next one.
                let ptr = self.fetch_word(bus);
                let addr = if ptr & 0x00FF == 0x00FF {
                    let low = bus.read(ptr) as u16;
                    let high = bus.read(ptr & 0xFF00) as u16;
                    (high << 8) | low
                } else {
                    self.read_word(ptr, bus)
                };
                (Operand::Address(addr), false)
            }
            AddrMode::IndexedIndirect => {
                let ptr = (self.fetch_byte(bus) as u16).wrapping_add(self.x as u16) & 0x00FF;
                let low = bus.read(ptr) as u16;
                let high = bus.read(ptr.wrapping_add(1) & 0x00FF) as u16;
                (Operand::Address((high << 8) | low), false)
            }
            AddrMode::IndirectIndexed => {
                let ptr = self.fetch_byte(bus) as u16;
                let low = bus.read(ptr) as u16;
                let high = bus.read(ptr.wrapping_add(1) & 0x00FF) as u16;
                let base = (high << 8) | low;
                let addr = base.wrapping_add(self.y as u16);
                (Operand::Address(addr), page_crossed(base, addr))
            }
            AddrMode::Relative => {
                let offset = self.fetch_byte(bus) as i8;
                (Operand::Address(self.pc.wrapping_add(offset as u16)), false)
            }
        }
    }

    /// Apply an instruction's architectural effect. Returns extra cycles
    /// beyond the table count and page-cross penalty (currently only the
    /// taken-branch cycle).
    fn execute(&mut self, instruction: &Instruction, operand: Operand, bus: &mut dyn CpuBus) -> u8 {
        use Operation::*;
        match instruction.operation {
            // Loads and stores
            Lda => {
                self.a = self.operand_value(operand, bus);
                self.update_zero_negative(self.a);
            }
            Ldx => {
                self.x = self.operand_value(operand, bus);
                self.update_zero_negative(self.x);
            }
            Ldy => {
                self.y = self.operand_value(operand, bus);
                self.update_zero_negative(self.y);
            }
            Sta => bus.write(operand_addr(operand), self.a),
            Stx => bus.write(operand_addr(operand), self.x),
            Sty => bus.write(operand_addr(operand), self.y),

            // Transfers
            Tax => {
                self.x = self.a;
                self.update_zero_negative(self.x);
            }
            Tay => {
                self.y = self.a;
                self.update_zero_negative(self.y);
            }
            Txa => {
                self.a = self.x;
                self.update_zero_negative(self.a);
            }
            Tya => {
                self.a = self.y;
                self.update_zero_negative(self.a);
            }
            Tsx => {
                self.x = self.sp;
                self.update_zero_negative(self.x);
            }
            Txs => self.sp = self.x,

            // Logical
            And => {
                self.a &= self.operand_value(operand, bus);
                self.update_zero_negative(self.a);
            }
            Ora => {
                self.a |= self.operand_value(operand, bus);
                self.update_zero_negative(self.a);
            }
            Eor => {
                self.a ^= self.operand_value(operand, bus);
                self.update_zero_negative(self.a);
            }
            Bit => {
                let value = self.operand_value(operand, bus);
                self.set_flag(FLAG_Z, self.a & value == 0);
                self.set_flag(FLAG_N, value & FLAG_N != 0);
                self.set_flag(FLAG_V, value & FLAG_V != 0);
            }

            // Shifts and rotates; the addressing tag selects between the
            // accumulator and memory.
            Asl => {
                let value = self.operand_value(operand, bus);
                self.set_flag(FLAG_C, value & 0x80 != 0);
                let result = value << 1;
                self.update_zero_negative(result);
                self.write_back(operand, result, bus);
            }
            Lsr => {
                let value = self.operand_value(operand, bus);
                self.set_flag(FLAG_C, value & 0x01 != 0);
                let result = value >> 1;
                self.update_zero_negative(result);
                self.write_back(operand, result, bus);
            }
            Rol => {
                let value = self.operand_value(operand, bus);
                let carry_in = self.get_flag(FLAG_C) as u8;
                self.set_flag(FLAG_C, value & 0x80 != 0);
                let result = (value << 1) | carry_in;
                self.update_zero_negative(result);
                self.write_back(operand, result, bus);
            }
            Ror => {
                let value = self.operand_value(operand, bus);
                let carry_in = (self.get_flag(FLAG_C) as u8) << 7;
                self.set_flag(FLAG_C, value & 0x01 != 0);
                let result = (value >> 1) | carry_in;
                self.update_zero_negative(result);
                self.write_back(operand, result, bus);
            }

            // Arithmetic
            Adc => {
                let value = self.operand_value(operand, bus);
                self.add_with_carry(value);
            }
            Sbc => {
                let value = self.operand_value(operand, bus);
                self.add_with_carry(value ^ 0xFF);
            }

            // Increments and decrements
            Inc => {
                let result = self.operand_value(operand, bus).wrapping_add(1);
                self.update_zero_negative(result);
                self.write_back(operand, result, bus);
            }
            Dec => {
                let result = self.operand_value(operand, bus).wrapping_sub(1);
                self.update_zero_negative(result);
                self.write_back(operand, result, bus);
            }
            Inx => {
                self.x = self.x.wrapping_add(1);
                self.update_zero_negative(self.x);
            }
            Dex => {
                self.x = self.x.wrapping_sub(1);
                self.update_zero_negative(self.x);
            }
            Iny => {
                self.y = self.y.wrapping_add(1);
                self.update_zero_negative(self.y);
            }
            Dey => {
                self.y = self.y.wrapping_sub(1);
                self.update_zero_negative(self.y);
            }

            // Compares
            Cmp => {
                let value = self.operand_value(operand, bus);
                self.compare(self.a, value);
            }
            Cpx => {
                let value = self.operand_value(operand, bus);
                self.compare(self.x, value);
            }
            Cpy => {
                let value = self.operand_value(operand, bus);
                self.compare(self.y, value);
            }

            // Branches; a taken branch costs one extra cycle
            Bpl => return self.branch(!self.get_flag(FLAG_N), operand),
            Bmi => return self.branch(self.get_flag(FLAG_N), operand),
            Bvc => return self.branch(!self.get_flag(FLAG_V), operand),
            Bvs => return self.branch(self.get_flag(FLAG_V), operand),
            Bcc => return self.branch(!self.get_flag(FLAG_C), operand),
            Bcs => return self.branch(self.get_flag(FLAG_C), operand),
            Bne => return self.branch(!self.get_flag(FLAG_Z), operand),
            Beq => return self.branch(self.get_flag(FLAG_Z), operand),

            // Jumps and subroutines
            Jmp => self.pc = operand_addr(operand),
            Jsr => {
                // PC points past the operand; the pushed return address is
                // that address minus one, restored by RTS's increment.
                self.push_word(self.pc.wrapping_sub(1), bus);
                self.pc = operand_addr(operand);
            }
            Rts => self.pc = self.pop_word(bus).wrapping_add(1),
            Rti => {
                self.status = (self.pop(bus) & !FLAG_B) | FLAG_U;
                self.pc = self.pop_word(bus);
            }

            // Stack
            Pha => self.push(self.a, bus),
            Pla => {
                self.a = self.pop(bus);
                self.update_zero_negative(self.a);
            }
            Php => self.push(self.status | FLAG_B | FLAG_U, bus),
            Plp => self.status = (self.pop(bus) & !FLAG_B) | FLAG_U,

            // Flag operations
            Clc => self.set_flag(FLAG_C, false),
            Sec => self.set_flag(FLAG_C, true),
            Cli => self.set_flag(FLAG_I, false),
            Sei => self.set_flag(FLAG_I, true),
            Cld => self.set_flag(FLAG_D, false),
            Sed => self.set_flag(FLAG_D, true),
            Clv => self.set_flag(FLAG_V, false),

            // Software interrupt: pushes PC past the padding byte, with the
            // Break bit set in the pushed status.
            Brk => {
                self.push_word(self.pc.wrapping_add(1), bus);
                self.push(self.status | FLAG_B | FLAG_U, bus);
                self.set_flag(FLAG_I, true);
                self.pc = self.read_word(IRQ_VECTOR, bus);
            }

            Nop => {}

            // Unofficial opcodes: named slots, inert until given precise
            // semantics. Their addressing bytes have already been consumed.
            Stp | Slo | Anc | Rla | Sre | Alr | Rra | Arr | Sax | Xaa | Ahx | Tas | Shy
            | Shx | Lax | Las | Dcp | Axs | Isc => {}
        }
        0
    }

    fn branch(&mut self, condition: bool, operand: Operand) -> u8 {
        if condition {
            self.pc = operand_addr(operand);
            1
        } else {
            0
        }
    }

    /// Shared binary adder for ADC/SBC (SBC passes the operand
    /// ones-complemented). Decimal mode is intentionally not applied.
    fn add_with_carry(&mut self, value: u8) {
        let sum = self.a as u16 + value as u16 + self.get_flag(FLAG_C) as u16;
        let result = sum as u8;
        self.set_flag(FLAG_C, sum > 0xFF);
        self.set_flag(FLAG_V, (self.a ^ result) & (value ^ result) & 0x80 != 0);
        self.a = result;
        self.update_zero_negative(self.a);
    }

    fn compare(&mut self, register: u8, value: u8) {
        self.set_flag(FLAG_C, register >= value);
        self.update_zero_negative(register.wrapping_sub(value));
    }

    fn operand_value(&mut self, operand: Operand, bus: &mut dyn CpuBus) -> u8 {
        match operand {
            Operand::None => 0,
            Operand::Accumulator => self.a,
            Operand::Immediate(value) => value,
            Operand::Address(addr) => bus.read(addr),
        }
    }

    /// Read-modify-write target: accumulator for accumulator-mode shifts,
    /// memory otherwise.
    fn write_back(&mut self, operand: Operand, value: u8, bus: &mut dyn CpuBus) {
        match operand {
            Operand::Accumulator => self.a = value,
            Operand::Address(addr) => bus.write(addr, value),
            Operand::None | Operand::Immediate(_) => {}
        }
    }

    fn fetch_byte(&mut self, bus: &mut dyn CpuBus) -> u8 {
        let value = bus.read(self.pc);
        self.pc = self.pc.wrapping_add(1);
        value
    }

    fn fetch_word(&mut self, bus: &mut dyn CpuBus) -> u16 {
        let low = self.fetch_byte(bus) as u16;
        let high = self.fetch_byte(bus) as u16;
        (high << 8) | low
    }

    fn read_word(&self, addr: u16, bus: &mut dyn CpuBus) -> u16 {
        let low = bus.read(addr) as u16;
        let high = bus.read(addr.wrapping_add(1)) as u16;
        (high << 8) | low
    }

    // Stack operations. SP wraps within the fixed stack page; it never
    // carries into the page byte.
    fn push(&mut self, value: u8, bus: &mut dyn CpuBus) {
        bus.write(STACK_BASE_ADDR + self.sp as u16, value);
        self.sp = self.sp.wrapping_sub(1);
    }

    fn pop(&mut self, bus: &mut dyn CpuBus) -> u8 {
        self.sp = self.sp.wrapping_add(1);
        bus.read(STACK_BASE_ADDR + self.sp as u16)
    }

    fn push_word(&mut self, value: u16, bus: &mut dyn CpuBus) {
        self.push((value >> 8) as u8, bus);
        self.push(value as u8, bus);
    }

    fn pop_word(&mut self, bus: &mut dyn CpuBus) -> u16 {
        let low = self.pop(bus) as u16;
        let high = self.pop(bus) as u16;
        (high << 8) | low
    }

    pub fn get_flag(&self, flag: u8) -> bool {
        self.status & flag != 0
    }

    pub fn set_flag(&mut self, flag: u8, value: bool) {
        if value {
            self.status |= flag;
        } else {
            self.status &= !flag;
        }
    }

    fn update_zero_negative(&mut self, value: u8) {
        self.set_flag(FLAG_Z, value == 0);
        self.set_flag(FLAG_N, value & FLAG_N != 0);
    }

    /// Run to the end of the next instruction or interrupt sequence and
    /// return the cycles consumed. Harness convenience; the scheduler
    /// drives `clock` directly.
    pub fn step(&mut self, bus: &mut dyn CpuBus) -> u64 {
        let start = self.total_cycles;
        loop {
            self.clock(bus);
            if self.cycles_left == 0 {
                break;
            }
        }
        self.total_cycles - start
    }
}

fn page_crossed(base: u16, addr: u16) -> bool {
    base & 0xFF00 != addr & 0xFF00
}

fn operand_addr(operand: Operand) -> u16 {
    match operand {
        Operand::Address(addr) => addr,
        // Stores and jumps are only ever paired with address-producing
        // modes in the table.
        _ => 0,
    }
}
