// Instruction tracing, driven by the opcode table.

use crate::instruction::{AddrMode, INSTRUCTION_SET};
use crate::memory::MemoryBus;

pub struct TraceState {
    pub enabled: bool,
}

impl TraceState {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

/// Render one instruction the way a monitor would print it. Operand bytes
/// that were not supplied show as placeholders.
pub fn disassemble_instruction(opcode: u8, operand1: Option<u8>, operand2: Option<u8>) -> String {
    let entry = &INSTRUCTION_SET[opcode as usize];
    let mnemonic = entry.mnemonic;
    let byte = |b: Option<u8>| b.map_or("??".to_string(), |v| format!("{:02X}", v));
    let word = |lo: Option<u8>, hi: Option<u8>| format!("{}{}", byte(hi), byte(lo));

    match entry.mode {
        AddrMode::Implied => mnemonic.to_string(),
        AddrMode::Accumulator => format!("{} A", mnemonic),
        AddrMode::Immediate => format!("{} #${}", mnemonic, byte(operand1)),
        AddrMode::ZeroPage => format!("{} ${}", mnemonic, byte(operand1)),
        AddrMode::ZeroPageX => format!("{} ${},X", mnemonic, byte(operand1)),
        AddrMode::ZeroPageY => format!("{} ${},Y", mnemonic, byte(operand1)),
        AddrMode::Absolute => format!("{} ${}", mnemonic, word(operand1, operand2)),
        AddrMode::AbsoluteX => format!("{} ${},X", mnemonic, word(operand1, operand2)),
        AddrMode::AbsoluteY => format!("{} ${},Y", mnemonic, word(operand1, operand2)),
        AddrMode::Indirect => format!("{} (${})", mnemonic, word(operand1, operand2)),
        AddrMode::IndexedIndirect => format!("{} (${},X)", mnemonic, byte(operand1)),
        AddrMode::IndirectIndexed => format!("{} (${}),Y", mnemonic, byte(operand1)),
        AddrMode::Relative => format!("{} ${}", mnemonic, byte(operand1)),
    }
}

/// One full trace line prefix for the instruction at `pc`, read through the
/// bus's side-effect-free peek.
pub fn disassemble_at(bus: &MemoryBus, pc: u16) -> String {
    let opcode = bus.peek(pc);
    let entry = &INSTRUCTION_SET[opcode as usize];
    let operand1 = (entry.mode.operand_len() >= 1).then(|| bus.peek(pc.wrapping_add(1)));
    let operand2 = (entry.mode.operand_len() >= 2).then(|| bus.peek(pc.wrapping_add(2)));

    let opcode_bytes = match (operand1, operand2) {
        (Some(b1), Some(b2)) => format!("{:02X} {:02X} {:02X}", opcode, b1, b2),
        (Some(b1), None) => format!("{:02X} {:02X}   ", opcode, b1),
        _ => format!("{:02X}      ", opcode),
    };
    format!(
        "{:04X}  {}  {:<12}",
        pc,
        opcode_bytes,
        disassemble_instruction(opcode, operand1, operand2)
    )
}
