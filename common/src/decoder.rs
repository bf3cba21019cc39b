
use num_traits::FromPrimitive;

use super::asm::*;

fn decode_operand(bits: u16) -> Operand {
    Operand::from_spec(bits & Operand::MASK)
}


fn decode_double_operand_ins(input: u16) -> Option<Ins> {
    let op = DoubleOperandIns::decode_opcode(input)?;

    let src = decode_operand(input >> Operand::NUM_BITS);
    let dst = decode_operand(input);

    Some(Ins::DoubleOperand(DoubleOperandIns { op, src, dst }))
}

fn decode_branch_ins(input: u16) -> Option<Ins> {
    let op = BranchIns::decode_opcode(input)?;
    let offset = (input & BranchIns::OFFSET_MASK) as u8;
    Some(Ins::Branch(BranchIns { op, offset }))
}

fn decode_jmp_ins(input: u16) -> Option<Ins> {
    let op = JmpIns::decode_opcode(input)?;
    let dst = decode_operand(input);
    Some(Ins::Jmp(JmpIns { op, dst }))
}

fn decode_jsr_ins(input: u16) -> Option<Ins> {
    let op = JsrIns::decode_opcode(input)?;
    let reg = Reg::from_u16((input >> Operand::NUM_BITS) & Reg::MASK).unwrap();
    let dst = decode_operand(input);
    Some(Ins::Jsr(JsrIns { op, reg, dst }))
}

fn decode_rts_ins(input: u16) -> Option<Ins> {
    let op = RtsIns::decode_opcode(input)?;
    let reg = Reg::from_u16(input & Reg::MASK).unwrap();
    Some(Ins::Rts(RtsIns { op, reg }))
}

fn decode_single_operand_ins(input: u16) -> Option<Ins> {
    let op = SingleOperandIns::decode_opcode(input)?;
    let dst = decode_operand(input);
    Some(Ins::SingleOperand(SingleOperandIns { op, dst }))
}

fn decode_trap_ins(input: u16) -> Option<Ins> {
    let op = TrapIns::decode_opcode(input)?;
    let vector = (input & TrapIns::VECTOR_MASK) as u8;
    Some(Ins::Trap(TrapIns { op, vector }))
}

fn decode_misc_ins(input: u16) -> Option<Ins> {
    let op = MiscIns::decode_opcode(input)?;
    Some(Ins::Misc(MiscIns { op }))
}

type Decoder = fn(u16) -> Option<Ins>;

// The opcode layouts don't overlap, so the order is just most-common-first.
const DECODERS: &[Decoder] = &[
    decode_double_operand_ins,
    decode_branch_ins,
    decode_jmp_ins,
    decode_jsr_ins,
    decode_rts_ins,
    decode_single_operand_ins,
    decode_trap_ins,
    decode_misc_ins,
];


// Decode a single instruction word, or None for an encoding outside the
// implemented subset. Extension words stay in the stream; the emulator
// consumes them through PC and the disassembler reads past the word itself.
pub fn decode(input: u16) -> Option<Ins> {
    DECODERS.iter().find_map(|decoder| decoder(input))
}
