
use common::asm::*;
use common::decoder::decode;
use common::mem::Memory;

// Reads extension words for operands, in source order, from the code bank.
struct Cursor<'a> {
    mem: &'a Memory,
    pc_next: u16,
}

impl Cursor<'_> {
    fn read_ext(&mut self) -> u16 {
        let word = self.mem.read_word(0, self.pc_next);
        self.pc_next = self.pc_next.wrapping_add(2);
        word
    }

    fn operand(&mut self, arg: &Operand) -> String {
        let reg = format!("R{}", arg.reg as u16);
        use AddrMode::*;
        match arg.mode {
            Gen => reg,
            Def => format!("({reg})"),
            AutoInc => {
                if arg.reg == Reg::PC {
                    format!("#{}", fmt_word(self.read_ext()))
                } else {
                    format!("({reg})+")
                }
            }
            AutoIncDef => {
                if arg.reg == Reg::PC {
                    format!("@#{}", fmt_word(self.read_ext()))
                } else {
                    format!("@({reg})+")
                }
            }
            AutoDec => format!("-({reg})"),
            AutoDecDef => format!("@-({reg})"),
            Index => {
                let disp = self.read_ext();
                if arg.reg == Reg::PC {
                    // Show the resolved target rather than the raw
                    // displacement.
                    fmt_word(self.pc_next.wrapping_add(disp))
                } else {
                    format!("{}({reg})", fmt_word(disp))
                }
            }
            IndexDef => {
                let disp = self.read_ext();
                if arg.reg == Reg::PC {
                    let ptr = self.pc_next.wrapping_add(disp);
                    format!("@{}", fmt_word(self.mem.read_word(0, ptr)))
                } else {
                    format!("@{}({reg})", fmt_word(disp))
                }
            }
        }
    }

    fn branch_target(&self, offset: u8) -> String {
        let off = (offset as i8 as i16) * 2;
        fmt_word(self.pc_next.wrapping_add(off as u16))
    }
}

fn fmt_word(val: u16) -> String {
    format!("0x{val:04x}")
}

// One line of disassembly for the instruction at pc, read from the code
// bank. Words outside the implemented subset render as DATA.
pub fn disassemble(mem: &Memory, pc: u16) -> String {
    let word = mem.read_word(0, pc);
    let mut cursor = Cursor {
        mem,
        pc_next: pc.wrapping_add(2),
    };

    let Some(ins) = decode(word) else {
        return format!("DATA {}", fmt_word(word));
    };

    match &ins {
        Ins::DoubleOperand(ins) => {
            let src = cursor.operand(&ins.src);
            let dst = cursor.operand(&ins.dst);
            format!("{} {src}, {dst}", double_operand_mnemonic(ins.op))
        }
        Ins::SingleOperand(ins) => {
            let dst = cursor.operand(&ins.dst);
            format!("{} {dst}", single_operand_mnemonic(ins.op))
        }
        Ins::Branch(ins) => {
            let mnemonic = match ins.op {
                BranchOpcode::Br => "BR",
                BranchOpcode::Bne => "BNE",
                BranchOpcode::Beq => "BEQ",
            };
            format!("{mnemonic} {}", cursor.branch_target(ins.offset))
        }
        Ins::Jmp(ins) => format!("JMP {}", cursor.operand(&ins.dst)),
        Ins::Jsr(ins) => {
            let reg = ins.reg as u16;
            format!("JSR R{reg}, {}", cursor.operand(&ins.dst))
        }
        Ins::Rts(ins) => format!("RTS R{}", ins.reg as u16),
        Ins::Trap(ins) => format!("TRAP #{}", fmt_word(ins.vector as u16)),
        Ins::Misc(ins) => match ins.op {
            MiscOpcode::Halt => "HALT".to_string(),
        },
    }
}

fn double_operand_mnemonic(op: DoubleOperandOpcode) -> &'static str {
    use DoubleOperandOpcode::*;
    match op {
        Mov => "MOV",
        Cmp => "CMP",
        Bit => "BIT",
        Bic => "BIC",
        Bis => "BIS",
        Add => "ADD",
        Sub => "SUB",
        MovB => "MOVB",
        CmpB => "CMPB",
        BitB => "BITB",
        BicB => "BICB",
        BisB => "BISB",
    }
}

fn single_operand_mnemonic(op: SingleOperandOpcode) -> &'static str {
    use SingleOperandOpcode::*;
    match op {
        Clr => "CLR",
        Inc => "INC",
        Dec => "DEC",
        Tst => "TST",
        Ror => "ROR",
        Rol => "ROL",
        Asr => "ASR",
        Asl => "ASL",
        ClrB => "CLRB",
        IncB => "INCB",
        DecB => "DECB",
        TstB => "TSTB",
    }
}
