//! The 6502 instruction table.
//!
//! One dense table of 256 descriptors, indexed directly by the opcode byte.
//! Descriptors are plain values (no stored function pointers); the CPU
//! dispatches on [`Operation`] in a single `match`. Unofficial opcodes are
//! present under their conventional names with their addressing modes and
//! cycle counts, but their handlers are inert.

/// How an instruction computes its operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddrMode {
    Implied,
    Accumulator,
    Immediate,
    ZeroPage,
    ZeroPageX,
    ZeroPageY,
    Absolute,
    AbsoluteX,
    AbsoluteY,
    Indirect,
    IndexedIndirect,
    IndirectIndexed,
    Relative,
}

impl AddrMode {
    /// Number of operand bytes following the opcode.
    pub fn operand_len(self) -> u16 {
        match self {
            AddrMode::Implied | AddrMode::Accumulator => 0,
            AddrMode::Immediate
            | AddrMode::ZeroPage
            | AddrMode::ZeroPageX
            | AddrMode::ZeroPageY
            | AddrMode::IndexedIndirect
            | AddrMode::IndirectIndexed
            | AddrMode::Relative => 1,
            AddrMode::Absolute | AddrMode::AbsoluteX | AddrMode::AbsoluteY | AddrMode::Indirect => 2,
        }
    }
}

/// Operation identifiers for the dispatch `match`.
///
/// Everything after `Nop` is an unofficial opcode; those execute as named
/// no-ops (the addressing resolver still consumes operand bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Adc, And, Asl, Bcc, Bcs, Beq, Bit, Bmi, Bne, Bpl, Brk, Bvc, Bvs,
    Clc, Cld, Cli, Clv, Cmp, Cpx, Cpy, Dec, Dex, Dey, Eor, Inc, Inx,
    Iny, Jmp, Jsr, Lda, Ldx, Ldy, Lsr, Ora, Pha, Php, Pla, Plp, Rol,
    Ror, Rti, Rts, Sbc, Sec, Sed, Sei, Sta, Stx, Sty, Tax, Tay, Tsx,
    Txa, Txs, Tya, Nop,
    // Unofficial
    Stp, Slo, Anc, Rla, Sre, Alr, Rra, Arr, Sax, Xaa, Ahx, Tas, Shy,
    Shx, Lax, Las, Dcp, Axs, Isc,
}

impl Operation {
    pub fn is_official(self) -> bool {
        !matches!(
            self,
            Operation::Stp
                | Operation::Slo
                | Operation::Anc
                | Operation::Rla
                | Operation::Sre
                | Operation::Alr
                | Operation::Rra
                | Operation::Arr
                | Operation::Sax
                | Operation::Xaa
                | Operation::Ahx
                | Operation::Tas
                | Operation::Shy
                | Operation::Shx
                | Operation::Lax
                | Operation::Las
                | Operation::Dcp
                | Operation::Axs
                | Operation::Isc
        )
    }
}

/// One slot of the opcode table.
#[derive(Debug, Clone, Copy)]
pub struct Instruction {
    /// Mnemonic, for tracing and tests only.
    pub mnemonic: &'static str,
    pub mode: AddrMode,
    pub operation: Operation,
    /// Base cycle count before page-crossing or branch adjustments.
    pub cycles: u8,
    /// True for the entries that pay one extra cycle when indexed
    /// addressing crosses a page boundary (the "oops" cycle).
    pub page_penalty: bool,
}

const fn ins(mnemonic: &'static str, mode: AddrMode, operation: Operation, cycles: u8) -> Instruction {
    Instruction { mnemonic, mode, operation, cycles, page_penalty: false }
}

const fn oops(mnemonic: &'static str, mode: AddrMode, operation: Operation, cycles: u8) -> Instruction {
    Instruction { mnemonic, mode, operation, cycles, page_penalty: true }
}

use AddrMode::*;
use Operation as Op;

/// The full opcode table, all 256 slots populated.
pub const INSTRUCTION_SET: [Instruction; 256] = [
    ins("BRK", Implied, Op::Brk, 7),            // $00
    ins("ORA", IndexedIndirect, Op::Ora, 6),    // $01
    ins("STP", Implied, Op::Stp, 0),            // $02
    ins("SLO", IndexedIndirect, Op::Slo, 8),    // $03
    ins("NOP", ZeroPage, Op::Nop, 3),           // $04
    ins("ORA", ZeroPage, Op::Ora, 3),           // $05
    ins("ASL", ZeroPage, Op::Asl, 5),           // $06
    ins("SLO", ZeroPage, Op::Slo, 5),           // $07
    ins("PHP", Implied, Op::Php, 3),            // $08
    ins("ORA", Immediate, Op::Ora, 2),          // $09
    ins("ASL", Accumulator, Op::Asl, 2),        // $0A
    ins("ANC", Immediate, Op::Anc, 2),          // $0B
    ins("NOP", Absolute, Op::Nop, 4),           // $0C
    ins("ORA", Absolute, Op::Ora, 4),           // $0D
    ins("ASL", Absolute, Op::Asl, 6),           // $0E
    ins("SLO", Absolute, Op::Slo, 6),           // $0F
    ins("BPL", Relative, Op::Bpl, 2),           // $10
    oops("ORA", IndirectIndexed, Op::Ora, 5),   // $11
    ins("STP", Implied, Op::Stp, 0),            // $12
    ins("SLO", IndirectIndexed, Op::Slo, 8),    // $13
    ins("NOP", ZeroPageX, Op::Nop, 4),          // $14
    ins("ORA", ZeroPageX, Op::Ora, 4),          // $15
    ins("ASL", ZeroPageX, Op::Asl, 6),          // $16
    ins("SLO", ZeroPageX, Op::Slo, 6),          // $17
    ins("CLC", Implied, Op::Clc, 2),            // $18
    oops("ORA", AbsoluteY, Op::Ora, 4),         // $19
    ins("NOP", Implied, Op::Nop, 2),            // $1A
    ins("SLO", AbsoluteY, Op::Slo, 7),          // $1B
    oops("NOP", AbsoluteX, Op::Nop, 4),         // $1C
    oops("ORA", AbsoluteX, Op::Ora, 4),         // $1D
    ins("ASL", AbsoluteX, Op::Asl, 7),          // $1E
    ins("SLO", AbsoluteX, Op::Slo, 7),          // $1F
    ins("JSR", Absolute, Op::Jsr, 6),           // $20
    ins("AND", IndexedIndirect, Op::And, 6),    // $21
    ins("STP", Implied, Op::Stp, 0),            // $22
    ins("RLA", IndexedIndirect, Op::Rla, 8),    // $23
    ins("BIT", ZeroPage, Op::Bit, 3),           // $24
    ins("AND", ZeroPage, Op::And, 3),           // $25
    ins("ROL", ZeroPage, Op::Rol, 5),           // $26
    ins("RLA", ZeroPage, Op::Rla, 5),           // $27
    ins("PLP", Implied, Op::Plp, 4),            // $28
    ins("AND", Immediate, Op::And, 2),          // $29
    ins("ROL", Accumulator, Op::Rol, 2),        // $2A
    ins("ANC", Immediate, Op::Anc, 2),          // $2B
    ins("BIT", Absolute, Op::Bit, 4),           // $2C
    ins("AND", Absolute, Op::And, 4),           // $2D
    ins("ROL", Absolute, Op::Rol, 6),           // $2E
    ins("RLA", Absolute, Op::Rla, 6),           // $2F
    ins("BMI", Relative, Op::Bmi, 2),           // $30
    oops("AND", IndirectIndexed, Op::And, 5),   // $31
    ins("STP", Implied, Op::Stp, 0),            // $32
    ins("RLA", IndirectIndexed, Op::Rla, 8),    // $33
    ins("NOP", ZeroPageX, Op::Nop, 4),          // $34
    ins("AND", ZeroPageX, Op::And, 4),          // $35
    ins("ROL", ZeroPageX, Op::Rol, 6),          // $36
    ins("RLA", ZeroPageX, Op::Rla, 6),          // $37
    ins("SEC", Implied, Op::Sec, 2),            // $38
    oops("AND", AbsoluteY, Op::And, 4),         // $39
    ins("NOP", Implied, Op::Nop, 2),            // $3A
    ins("RLA", AbsoluteY, Op::Rla, 7),          // $3B
    oops("NOP", AbsoluteX, Op::Nop, 4),         // $3C
    oops("AND", AbsoluteX, Op::And, 4),         // $3D
    ins("ROL", AbsoluteX, Op::Rol, 7),          // $3E
    ins("RLA", AbsoluteX, Op::Rla, 7),          // $3F
    ins("RTI", Implied, Op::Rti, 6),            // $40
    ins("EOR", IndexedIndirect, Op::Eor, 6),    // $41
    ins("STP", Implied, Op::Stp, 0),            // $42
    ins("SRE", IndexedIndirect, Op::Sre, 8),    // $43
    ins("NOP", ZeroPage, Op::Nop, 3),           // $44
    ins("EOR", ZeroPage, Op::Eor, 3),           // $45
    ins("LSR", ZeroPage, Op::Lsr, 5),           // $46
    ins("SRE", ZeroPage, Op::Sre, 5),           // $47
    ins("PHA", Implied, Op::Pha, 3),            // $48
    ins("EOR", Immediate, Op::Eor, 2),          // $49
    ins("LSR", Accumulator, Op::Lsr, 2),        // $4A
    ins("ALR", Immediate, Op::Alr, 2),          // $4B
    ins("JMP", Absolute, Op::Jmp, 3),           // $4C
    ins("EOR", Absolute, Op::Eor, 4),           // $4D
    ins("LSR", Absolute, Op::Lsr, 6),           // $4E
    ins("SRE", Absolute, Op::Sre, 6),           // $4F
    ins("BVC", Relative, Op::Bvc, 2),           // $50
    oops("EOR", IndirectIndexed, Op::Eor, 5),   // $51
    ins("STP", Implied, Op::Stp, 0),            // $52
    ins("SRE", IndirectIndexed, Op::Sre, 8),    // $53
    ins("NOP", ZeroPageX, Op::Nop, 4),          // $54
    ins("EOR", ZeroPageX, Op::Eor, 4),          // $55
    ins("LSR", ZeroPageX, Op::Lsr, 6),          // $56
    ins("SRE", ZeroPageX, Op::Sre, 6),          // $57
    ins("CLI", Implied, Op::Cli, 2),            // $58
    oops("EOR", AbsoluteY, Op::Eor, 4),         // $59
    ins("NOP", Implied, Op::Nop, 2),            // $5A
    ins("SRE", AbsoluteY, Op::Sre, 7),          // $5B
    oops("NOP", AbsoluteX, Op::Nop, 4),         // $5C
    oops("EOR", AbsoluteX, Op::Eor, 4),         // $5D
    ins("LSR", AbsoluteX, Op::Lsr, 7),          // $5E
    ins("SRE", AbsoluteX, Op::Sre, 7),          // $5F
    ins("RTS", Implied, Op::Rts, 6),            // $60
    ins("ADC", IndexedIndirect, Op::Adc, 6),    // $61
    ins("STP", Implied, Op::Stp, 0),            // $62
    ins("RRA", IndexedIndirect, Op::Rra, 8),    // $63
    ins("NOP", ZeroPage, Op::Nop, 3),           // $64
    ins("ADC", ZeroPage, Op::Adc, 3),           // $65
    ins("ROR", ZeroPage, Op::Ror, 5),           // $66
    ins("RRA", ZeroPage, Op::Rra, 5),           // $67
    ins("PLA", Implied, Op::Pla, 4),            // $68
    ins("ADC", Immediate, Op::Adc, 2),          // $69
    ins("ROR", Accumulator, Op::Ror, 2),        // $6A
    ins("ARR", Immediate, Op::Arr, 2),          // $6B
    ins("JMP", Indirect, Op::Jmp, 5),           // $6C
    ins("ADC", Absolute, Op::Adc, 4),           // $6D
    ins("ROR", Absolute, Op::Ror, 6),           // $6E
    ins("RRA", Absolute, Op::Rra, 6),           // $6F
    ins("BVS", Relative, Op::Bvs, 2),           // $70
    oops("ADC", IndirectIndexed, Op::Adc, 5),   // $71
    ins("STP", Implied, Op::Stp, 0),            // $72
    ins("RRA", IndirectIndexed, Op::Rra, 8),    // $73
    ins("NOP", ZeroPageX, Op::Nop, 4),          // $74
    ins("ADC", ZeroPageX, Op::Adc, 4),          // $75
    ins("ROR", ZeroPageX, Op::Ror, 6),          // $76
    ins("RRA", ZeroPageX, Op::Rra, 6),          // $77
    ins("SEI", Implied, Op::Sei, 2),            // $78
    oops("ADC", AbsoluteY, Op::Adc, 4),         // $79
    ins("NOP", Implied, Op::Nop, 2),            // $7A
    ins("RRA", AbsoluteY, Op::Rra, 7),          // $7B
    oops("NOP", AbsoluteX, Op::Nop, 4),         // $7C
    oops("ADC", AbsoluteX, Op::Adc, 4),         // $7D
    ins("ROR", AbsoluteX, Op::Ror, 7),          // $7E
    ins("RRA", AbsoluteX, Op::Rra, 7),          // $7F
    ins("NOP", Immediate, Op::Nop, 2),          // $80
    ins("STA", IndexedIndirect, Op::Sta, 6),    // $81
    ins("NOP", Immediate, Op::Nop, 2),          // $82
    ins("SAX", IndexedIndirect, Op::Sax, 6),    // $83
    ins("STY", ZeroPage, Op::Sty, 3),           // $84
    ins("STA", ZeroPage, Op::Sta, 3),           // $85
    ins("STX", ZeroPage, Op::Stx, 3),           // $86
    ins("SAX", ZeroPage, Op::Sax, 3),           // $87
    ins("DEY", Implied, Op::Dey, 2),            // $88
    ins("NOP", Immediate, Op::Nop, 2),          // $89
    ins("TXA", Implied, Op::Txa, 2),            // $8A
    ins("XAA", Immediate, Op::Xaa, 2),          // $8B
    ins("STY", Absolute, Op::Sty, 4),           // $8C
    ins("STA", Absolute, Op::Sta, 4),           // $8D
    ins("STX", Absolute, Op::Stx, 4),           // $8E
    ins("SAX", Absolute, Op::Sax, 4),           // $8F
    ins("BCC", Relative, Op::Bcc, 2),           // $90
    ins("STA", IndirectIndexed, Op::Sta, 6),    // $91
    ins("STP", Implied, Op::Stp, 0),            // $92
    ins("AHX", IndirectIndexed, Op::Ahx, 6),    // $93
    ins("STY", ZeroPageX, Op::Sty, 4),          // $94
    ins("STA", ZeroPageX, Op::Sta, 4),          // $95
    ins("STX", ZeroPageY, Op::Stx, 4),          // $96
    ins("SAX", ZeroPageY, Op::Sax, 4),          // $97
    ins("TYA", Implied, Op::Tya, 2),            // $98
    ins("STA", AbsoluteY, Op::Sta, 5),          // $99
    ins("TXS", Implied, Op::Txs, 2),            // $9A
    ins("TAS", AbsoluteY, Op::Tas, 5),          // $9B
    ins("SHY", AbsoluteX, Op::Shy, 5),          // $9C
    ins("STA", AbsoluteX, Op::Sta, 5),          // $9D
    ins("SHX", AbsoluteY, Op::Shx, 5),          // $9E
    ins("AHX", AbsoluteY, Op::Ahx, 5),          // $9F
    ins("LDY", Immediate, Op::Ldy, 2),          // $A0
    ins("LDA", IndexedIndirect, Op::Lda, 6),    // $A1
    ins("LDX", Immediate, Op::Ldx, 2),          // $A2
    ins("LAX", IndexedIndirect, Op::Lax, 6),    // $A3
    ins("LDY", ZeroPage, Op::Ldy, 3),           // $A4
    ins("LDA", ZeroPage, Op::Lda, 3),           // $A5
    ins("LDX", ZeroPage, Op::Ldx, 3),           // $A6
    ins("LAX", ZeroPage, Op::Lax, 3),           // $A7
    ins("TAY", Implied, Op::Tay, 2),            // $A8
    ins("LDA", Immediate, Op::Lda, 2),          // $A9
    ins("TAX", Implied, Op::Tax, 2),            // $AA
    ins("LAX", Immediate, Op::Lax, 2),          // $AB
    ins("LDY", Absolute, Op::Ldy, 4),           // $AC
    ins("LDA", Absolute, Op::Lda, 4),           // $AD
    ins("LDX", Absolute, Op::Ldx, 4),           // $AE
    ins("LAX", Absolute, Op::Lax, 4),           // $AF
    ins("BCS", Relative, Op::Bcs, 2),           // $B0
    oops("LDA", IndirectIndexed, Op::Lda, 5),   // $B1
    ins("STP", Implied, Op::Stp, 0),            // $B2
    oops("LAX", IndirectIndexed, Op::Lax, 5),   // $B3
    ins("LDY", ZeroPageX, Op::Ldy, 4),          // $B4
    ins("LDA", ZeroPageX, Op::Lda, 4),          // $B5
    ins("LDX", ZeroPageY, Op::Ldx, 4),          // $B6
    ins("LAX", ZeroPageY, Op::Lax, 4),          // $B7
    ins("CLV", Implied, Op::Clv, 2),            // $B8
    oops("LDA", AbsoluteY, Op::Lda, 4),         // $B9
    ins("TSX", Implied, Op::Tsx, 2),            // $BA
    oops("LAS", AbsoluteY, Op::Las, 4),         // $BB
    oops("LDY", AbsoluteX, Op::Ldy, 4),         // $BC
    oops("LDA", AbsoluteX, Op::Lda, 4),         // $BD
    oops("LDX", AbsoluteY, Op::Ldx, 4),         // $BE
    oops("LAX", AbsoluteY, Op::Lax, 4),         // $BF
    ins("CPY", Immediate, Op::Cpy, 2),          // $C0
    ins("CMP", IndexedIndirect, Op::Cmp, 6),    // $C1
    ins("NOP", Immediate, Op::Nop, 2),          // $C2
    ins("DCP", IndexedIndirect, Op::Dcp, 8),    // $C3
    ins("CPY", ZeroPage, Op::Cpy, 3),           // $C4
    ins("CMP", ZeroPage, Op::Cmp, 3),           // $C5
    ins("DEC", ZeroPage, Op::Dec, 5),           // $C6
    ins("DCP", ZeroPage, Op::Dcp, 5),           // $C7
    ins("INY", Implied, Op::Iny, 2),            // $C8
    ins("CMP", Immediate, Op::Cmp, 2),          // $C9
    ins("DEX", Implied, Op::Dex, 2),            // $CA
    ins("AXS", Immediate, Op::Axs, 2),          // $CB
    ins("CPY", Absolute, Op::Cpy, 4),           // $CC
    ins("CMP", Absolute, Op::Cmp, 4),           // $CD
    ins("DEC", Absolute, Op::Dec, 6),           // $CE
    ins("DCP", Absolute, Op::Dcp, 6),           // $CF
    ins("BNE", Relative, Op::Bne, 2),           // $D0
    oops("CMP", IndirectIndexed, Op::Cmp, 5),   // $D1
    ins("STP", Implied, Op::Stp, 0),            // $D2
    ins("DCP", IndirectIndexed, Op::Dcp, 8),    // $D3
    ins("NOP", ZeroPageX, Op::Nop, 4),          // $D4
    ins("CMP", ZeroPageX, Op::Cmp, 4),          // $D5
    ins("DEC", ZeroPageX, Op::Dec, 6),          // $D6
    ins("DCP", ZeroPageX, Op::Dcp, 6),          // $D7
    ins("CLD", Implied, Op::Cld, 2),            // $D8
    oops("CMP", AbsoluteY, Op::Cmp, 4),         // $D9
    ins("NOP", Implied, Op::Nop, 2),            // $DA
    ins("DCP", AbsoluteY, Op::Dcp, 7),          // $DB
    oops("NOP", AbsoluteX, Op::Nop, 4),         // $DC
    oops("CMP", AbsoluteX, Op::Cmp, 4),         // $DD
    ins("DEC", AbsoluteX, Op::Dec, 7),          // $DE
    ins("DCP", AbsoluteX, Op::Dcp, 7),          // $DF
    ins("CPX", Immediate, Op::Cpx, 2),          // $E0
    ins("SBC", IndexedIndirect, Op::Sbc, 6),    // $E1
    ins("NOP", Immediate, Op::Nop, 2),          // $E2
    ins("ISC", IndexedIndirect, Op::Isc, 8),    // $E3
    ins("CPX", ZeroPage, Op::Cpx, 3),           // $E4
    ins("SBC", ZeroPage, Op::Sbc, 3),           // $E5
    ins("INC", ZeroPage, Op::Inc, 5),           // $E6
    ins("ISC", ZeroPage, Op::Isc, 5),           // $E7
    ins("INX", Implied, Op::Inx, 2),            // $E8
    ins("SBC", Immediate, Op::Sbc, 2),          // $E9
    ins("NOP", Implied, Op::Nop, 2),            // $EA
    ins("SBC", Immediate, Op::Sbc, 2),          // $EB
    ins("CPX", Absolute, Op::Cpx, 4),           // $EC
    ins("SBC", Absolute, Op::Sbc, 4),           // $ED
    ins("INC", Absolute, Op::Inc, 6),           // $EE
    ins("ISC", Absolute, Op::Isc, 6),           // $EF
    ins("BEQ", Relative, Op::Beq, 2),           // $F0
    oops("SBC", IndirectIndexed, Op::Sbc, 5),   // $F1
    ins("STP", Implied, Op::Stp, 0),            // $F2
    ins("ISC", IndirectIndexed, Op::Isc, 8),    // $F3
    ins("NOP", ZeroPageX, Op::Nop, 4),          // $F4
    ins("SBC", ZeroPageX, Op::Sbc, 4),          // $F5
    ins("INC", ZeroPageX, Op::Inc, 6),          // $F6
    ins("ISC", ZeroPageX, Op::Isc, 6),          // $F7
    ins("SED", Implied, Op::Sed, 2),            // $F8
    oops("SBC", AbsoluteY, Op::Sbc, 4),         // $F9
    ins("NOP", Implied, Op::Nop, 2),            // $FA
    ins("ISC", AbsoluteY, Op::Isc, 7),          // $FB
    oops("NOP", AbsoluteX, Op::Nop, 4),         // $FC
    oops("SBC", AbsoluteX, Op::Sbc, 4),         // $FD
    ins("INC", AbsoluteX, Op::Inc, 7),          // $FE
    ins("ISC", AbsoluteX, Op::Isc, 7),          // $FF
];
