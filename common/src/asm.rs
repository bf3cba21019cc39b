
use crate::constants::WORD_SIZE;

use num_derive::{FromPrimitive, ToPrimitive};
use num_traits::{FromPrimitive, ToPrimitive};


pub trait InstrVariant<Opcode: FromPrimitive> {
    const OPCODE_BITS: usize;
    const LOWER_BITS: usize;

    fn decode_opcode(input: u16) -> Option<Opcode> {
        let op = input >> Self::LOWER_BITS;
        Opcode::from_u16(op)
    }
}



////////////////////////////////////////////////////////////////////////////////


#[derive(Debug, Clone, Copy, FromPrimitive, ToPrimitive, PartialEq, Eq)]
pub enum AddrMode {
    Gen = 0,
    Def, // Deferred (indirect)
    AutoInc,
    AutoIncDef,
    AutoDec,
    AutoDecDef,
    Index,
    IndexDef,
}

impl AddrMode {
    pub const NUM_BITS: usize = 3;
    pub const MASK: u16 = (1u16 << Self::NUM_BITS) - 1;
}


#[derive(Debug, Clone, Copy, FromPrimitive, ToPrimitive, PartialEq, Eq)]
pub enum Reg {
    R0 = 0,
    R1,
    R2,
    R3,
    R4,
    R5,
    SP,
    PC,
}

pub const NUM_REGS: usize = 8;

impl Reg {
    pub const NUM_BITS: usize = 3;
    pub const MASK: u16 = (1u16 << Self::NUM_BITS) - 1;
}

// A six-bit mode/register operand spec. The extension word, when one exists,
// lives in the instruction stream and is fetched through PC at execution
// time, so it is not part of this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operand {
    pub mode: AddrMode,
    pub reg: Reg,
}

impl Operand {
    pub const NUM_BITS: usize = AddrMode::NUM_BITS + Reg::NUM_BITS;
    pub const MASK: u16 = (1u16 << Self::NUM_BITS) - 1;

    pub fn new(mode: AddrMode, reg: Reg) -> Operand {
        Operand { mode, reg }
    }

    pub fn from_spec(spec: u16) -> Operand {
        let reg = Reg::from_u16(spec & Reg::MASK).unwrap();
        let mode = AddrMode::from_u16((spec >> Reg::NUM_BITS) & AddrMode::MASK).unwrap();
        Operand { mode, reg }
    }

    pub fn format(&self) -> u16 {
        self.reg.to_u16().unwrap() | (self.mode.to_u16().unwrap() << Reg::NUM_BITS)
    }

    // True for the modes that consume an extension word from the stream:
    // index modes always, autoincrement modes when the register is PC
    // (immediate / absolute).
    pub fn needs_extra(&self) -> bool {
        use AddrMode::*;
        match self.mode {
            AutoInc | AutoIncDef => self.reg == Reg::PC,
            Index | IndexDef => true,
            _ => false,
        }
    }

    pub fn num_extra(&self) -> u16 {
        self.needs_extra() as u16
    }
}


////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone, Copy, FromPrimitive, ToPrimitive, PartialEq, Eq)]
pub enum DoubleOperandOpcode {
    Mov = 0o01,
    Cmp,
    Bit,
    Bic,
    Bis,
    Add,

    MovB = 0o11,
    CmpB,
    BitB,
    BicB,
    BisB,
    Sub,
}

impl DoubleOperandOpcode {
    pub fn from_mnemonic(mnemonic: &str) -> Option<Self> {
        use DoubleOperandOpcode::*;
        Some(match mnemonic {
            "MOV" => Mov,
            "CMP" => Cmp,
            "BIT" => Bit,
            "BIC" => Bic,
            "BIS" => Bis,
            "ADD" => Add,
            "SUB" => Sub,
            "MOVB" => MovB,
            "CMPB" => CmpB,
            "BITB" => BitB,
            "BICB" => BicB,
            "BISB" => BisB,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone)]
pub struct DoubleOperandIns {
    pub op: DoubleOperandOpcode,
    pub src: Operand,
    pub dst: Operand,
}

impl InstrVariant<DoubleOperandOpcode> for DoubleOperandIns {
    const OPCODE_BITS: usize = 4;
    const LOWER_BITS: usize = 16 - Self::OPCODE_BITS;
}

impl DoubleOperandIns {
    pub fn num_extra(&self) -> u16 {
        self.src.num_extra() + self.dst.num_extra()
    }
}


////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone, Copy, FromPrimitive, ToPrimitive, PartialEq, Eq)]
pub enum SingleOperandOpcode {
    Clr = 0o50,
    Inc = 0o52,
    Dec,
    Tst = 0o57,
    Ror,
    Rol,
    Asr,
    Asl,

    ClrB = 0o1050,
    IncB = 0o1052,
    DecB,
    TstB = 0o1057,
}

impl SingleOperandOpcode {
    pub fn from_mnemonic(mnemonic: &str) -> Option<Self> {
        use SingleOperandOpcode::*;
        Some(match mnemonic {
            "CLR" => Clr,
            "INC" => Inc,
            "DEC" => Dec,
            "TST" => Tst,
            "ROR" => Ror,
            "ROL" => Rol,
            "ASR" => Asr,
            "ASL" => Asl,
            "CLRB" => ClrB,
            "INCB" => IncB,
            "DECB" => DecB,
            "TSTB" => TstB,
            _ => return None,
        })
    }

    pub fn is_byte(self) -> bool {
        (self as u16) >= (SingleOperandOpcode::ClrB as u16)
    }
}

#[derive(Debug, Clone)]
pub struct SingleOperandIns {
    pub op: SingleOperandOpcode,
    pub dst: Operand,
}

impl SingleOperandIns {
    pub fn num_extra(&self) -> u16 {
        self.dst.num_extra()
    }
}

impl InstrVariant<SingleOperandOpcode> for SingleOperandIns {
    const OPCODE_BITS: usize = 10;
    const LOWER_BITS: usize = 16 - Self::OPCODE_BITS;
}


////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone, Copy, FromPrimitive, ToPrimitive, PartialEq, Eq)]
pub enum BranchOpcode {
    Br = 0o1,
    Bne,
    Beq,
}

impl BranchOpcode {
    pub fn from_mnemonic(mnemonic: &str) -> Option<Self> {
        use BranchOpcode::*;
        Some(match mnemonic {
            "BR" => Br,
            "BNE" => Bne,
            "BEQ" => Beq,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone)]
pub struct BranchIns {
    pub op: BranchOpcode,
    pub offset: u8, // Signed word offset, relative to the PC after the fetch.
}

impl BranchIns {
    pub const OFFSET_NUM_BITS: usize = 8;
    pub const OFFSET_MASK: u16 = (1u16 << Self::OFFSET_NUM_BITS) - 1;

    pub fn num_extra(&self) -> u16 {
        0
    }
}

impl InstrVariant<BranchOpcode> for BranchIns {
    const OPCODE_BITS: usize = 8;
    const LOWER_BITS: usize = 16 - Self::OPCODE_BITS;
}


////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone, Copy, FromPrimitive, ToPrimitive, PartialEq, Eq)]
pub enum JmpOpcode {
    Jmp = 0o1,
}

#[derive(Debug, Clone)]
pub struct JmpIns {
    pub op: JmpOpcode,
    pub dst: Operand,
}

impl JmpIns {
    pub fn num_extra(&self) -> u16 {
        self.dst.num_extra()
    }
}

impl InstrVariant<JmpOpcode> for JmpIns {
    const OPCODE_BITS: usize = 10;
    const LOWER_BITS: usize = 16 - Self::OPCODE_BITS;
}


////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone, Copy, FromPrimitive, ToPrimitive, PartialEq, Eq)]
pub enum JsrOpcode {
    Jsr = 0o4,
}

#[derive(Debug, Clone)]
pub struct JsrIns {
    pub op: JsrOpcode,
    pub reg: Reg, // Link register
    pub dst: Operand,
}

impl JsrIns {
    pub fn num_extra(&self) -> u16 {
        self.dst.num_extra()
    }
}

impl InstrVariant<JsrOpcode> for JsrIns {
    const OPCODE_BITS: usize = 7;
    const LOWER_BITS: usize = 16 - Self::OPCODE_BITS;
}


////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone, Copy, FromPrimitive, ToPrimitive, PartialEq, Eq)]
pub enum RtsOpcode {
    Rts = 0o2,
}

#[derive(Debug, Clone)]
pub struct RtsIns {
    pub op: RtsOpcode,
    pub reg: Reg,
}

impl RtsIns {
    pub fn num_extra(&self) -> u16 {
        0
    }
}

impl InstrVariant<RtsOpcode> for RtsIns {
    const OPCODE_BITS: usize = 13;
    const LOWER_BITS: usize = 16 - Self::OPCODE_BITS;
}


////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone, Copy, FromPrimitive, ToPrimitive, PartialEq, Eq)]
pub enum TrapOpcode {
    Trap = 0o210,
}

#[derive(Debug, Clone)]
pub struct TrapIns {
    pub op: TrapOpcode,
    pub vector: u8,
}

impl TrapIns {
    pub const VECTOR_MASK: u16 = (1u16 << Self::LOWER_BITS) - 1;

    pub fn num_extra(&self) -> u16 {
        0
    }
}

impl InstrVariant<TrapOpcode> for TrapIns {
    const OPCODE_BITS: usize = 8;
    const LOWER_BITS: usize = 16 - Self::OPCODE_BITS;
}


////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone, Copy, FromPrimitive, ToPrimitive, PartialEq, Eq)]
pub enum MiscOpcode {
    Halt = 0,
}

#[derive(Debug, Clone)]
pub struct MiscIns {
    pub op: MiscOpcode,
}

impl MiscIns {
    pub fn num_extra(&self) -> u16 {
        0
    }
}

impl InstrVariant<MiscOpcode> for MiscIns {
    const OPCODE_BITS: usize = 16;
    const LOWER_BITS: usize = 16 - Self::OPCODE_BITS;
}


////////////////////////////////////////////////////////////////////////////////


#[derive(Debug, Clone)]
pub enum Ins {
    DoubleOperand(DoubleOperandIns),
    SingleOperand(SingleOperandIns),
    Branch(BranchIns),
    Jmp(JmpIns),
    Jsr(JsrIns),
    Rts(RtsIns),
    Trap(TrapIns),
    Misc(MiscIns),
}

impl Ins {
    pub fn num_extra(&self) -> u16 {
        match self {
            Ins::DoubleOperand(x) => x.num_extra(),
            Ins::SingleOperand(x) => x.num_extra(),
            Ins::Branch(x) => x.num_extra(),
            Ins::Jmp(x) => x.num_extra(),
            Ins::Jsr(x) => x.num_extra(),
            Ins::Rts(x) => x.num_extra(),
            Ins::Trap(x) => x.num_extra(),
            Ins::Misc(x) => x.num_extra(),
        }
    }

    // Size, in bytes, including extension words.
    pub fn size(&self) -> u16 {
        WORD_SIZE + WORD_SIZE * self.num_extra()
    }
}
