
use std::collections::HashMap;

use common::asm::*;
use common::constants::WORD_SIZE;

use log::trace;
use num_traits::ToPrimitive;

use crate::error::AsmError;
use crate::lines::{parse_lines, Line};
use crate::numbers::parse_number;
use crate::operand::{encode_operand, eval, parse_register, OperandEnc};

// The assembled image: an ordered word stream placed contiguously from
// `start` in bank 0, plus the upper-cased symbol table.
#[derive(Debug, Clone)]
pub struct Program {
    pub start: u16,
    pub words: Vec<u16>,
    pub symbols: HashMap<String, u16>,
}

pub fn assemble(source: &str) -> Result<Program, AsmError> {
    Assembler::new().assemble(source)
}

struct Assembler {
    symbols: HashMap<String, u16>,
    words: Vec<u16>,
}

fn double_operand_base(opcode: &str) -> Option<u16> {
    let op = DoubleOperandOpcode::from_mnemonic(opcode)?;
    Some(op.to_u16().unwrap() << DoubleOperandIns::LOWER_BITS)
}

fn single_operand_base(opcode: &str) -> Option<u16> {
    let op = SingleOperandOpcode::from_mnemonic(opcode)?;
    Some(op.to_u16().unwrap() << SingleOperandIns::LOWER_BITS)
}

fn branch_base(opcode: &str) -> Option<u16> {
    let op = BranchOpcode::from_mnemonic(opcode)?;
    Some(op.to_u16().unwrap() << BranchIns::LOWER_BITS)
}

fn expect_operands(line: &Line, expected: usize) -> Result<(), AsmError> {
    if line.operands.len() != expected {
        return Err(AsmError::OperandCount {
            line: line.line_no,
            opcode: line.opcode.clone().unwrap_or_default(),
            expected,
            got: line.operands.len(),
        });
    }
    Ok(())
}

fn number_operand(line: &Line, text: &str) -> Result<i32, AsmError> {
    parse_number(text).ok_or_else(|| AsmError::BadNumber {
        line: line.line_no,
        text: text.to_string(),
    })
}

impl Assembler {
    fn new() -> Assembler {
        Assembler {
            symbols: HashMap::new(),
            words: Vec::new(),
        }
    }

    // Pass 1: bind every label to its address and validate operand shapes.
    // Sizes are computed by tentatively encoding operands with undefined
    // symbols allowed. Returns the program start.
    fn size_pass(&mut self, lines: &[Line]) -> Result<u16, AsmError> {
        let mut pc: u16 = 0;
        let mut start: Option<u16> = None;

        for line in lines {
            if let Some(label) = &line.label {
                trace!("binding label \"{label}\" to 0x{pc:04x}");
                self.symbols.insert(label.to_uppercase(), pc);
            }

            let Some(opcode) = line.opcode.as_deref() else {
                continue;
            };

            match opcode {
                ".ORIG" => {
                    expect_operands(line, 1)?;
                    pc = number_operand(line, &line.operands[0])? as u16;
                    if start.is_none() {
                        start = Some(pc);
                    }
                }
                ".WORD" | "HALT" | "TRAP" | "RTS" | "BR" | "BNE" | "BEQ" => {
                    pc = pc.wrapping_add(WORD_SIZE);
                }
                "JSR" => {
                    expect_operands(line, 2)?;
                    if parse_register(&line.operands[0]).is_none() {
                        return Err(AsmError::ExpectedRegister {
                            line: line.line_no,
                            text: line.operands[0].clone(),
                        });
                    }
                    let dst =
                        encode_operand(&line.operands[1], pc, &self.symbols, true, line.line_no)?;
                    pc = pc.wrapping_add(WORD_SIZE + WORD_SIZE * dst.num_extra());
                }
                "JMP" => {
                    expect_operands(line, 1)?;
                    let dst =
                        encode_operand(&line.operands[0], pc, &self.symbols, true, line.line_no)?;
                    pc = pc.wrapping_add(WORD_SIZE + WORD_SIZE * dst.num_extra());
                }
                _ => {
                    if double_operand_base(opcode).is_some() {
                        expect_operands(line, 2)?;
                        let src = encode_operand(
                            &line.operands[0],
                            pc,
                            &self.symbols,
                            true,
                            line.line_no,
                        )?;
                        let dst = encode_operand(
                            &line.operands[1],
                            pc.wrapping_add(WORD_SIZE * src.num_extra()),
                            &self.symbols,
                            true,
                            line.line_no,
                        )?;
                        pc = pc
                            .wrapping_add(WORD_SIZE + WORD_SIZE * (src.num_extra() + dst.num_extra()));
                    } else if single_operand_base(opcode).is_some() {
                        expect_operands(line, 1)?;
                        let dst = encode_operand(
                            &line.operands[0],
                            pc,
                            &self.symbols,
                            true,
                            line.line_no,
                        )?;
                        pc = pc.wrapping_add(WORD_SIZE + WORD_SIZE * dst.num_extra());
                    } else {
                        return Err(AsmError::UnknownOpcode {
                            line: line.line_no,
                            opcode: opcode.to_string(),
                        });
                    }
                }
            }
        }

        Ok(start.unwrap_or(0))
    }

    fn emit(&mut self, word: u16) {
        self.words.push(word);
    }

    fn emit_operand_extras(&mut self, src: Option<&OperandEnc>, dst: &OperandEnc) {
        if let Some(src) = src {
            if let Some(extra) = src.extra {
                self.emit(extra);
            }
        }
        if let Some(extra) = dst.extra {
            self.emit(extra);
        }
    }

    // Pass 2: encode for real. Symbols must resolve now; branch offsets and
    // trap vectors are range checked here.
    fn emit_pass(&mut self, lines: &[Line], start: u16) -> Result<(), AsmError> {
        let mut pc = start;

        for line in lines {
            let Some(opcode) = line.opcode.as_deref() else {
                continue;
            };

            match opcode {
                ".ORIG" => {
                    pc = number_operand(line, &line.operands[0])? as u16;
                }
                ".WORD" => {
                    expect_operands(line, 1)?;
                    let val = eval(&line.operands[0], &self.symbols, false, line.line_no)?;
                    self.emit(val as u16);
                    pc = pc.wrapping_add(WORD_SIZE);
                }
                "HALT" => {
                    self.emit(MiscOpcode::Halt.to_u16().unwrap());
                    pc = pc.wrapping_add(WORD_SIZE);
                }
                "TRAP" => {
                    expect_operands(line, 1)?;
                    let text = line.operands[0].trim();
                    let text = text.strip_prefix('#').unwrap_or(text).trim();
                    let vector = number_operand(line, text)?;
                    if !(0..=255).contains(&vector) {
                        return Err(AsmError::TrapVector {
                            line: line.line_no,
                            vector,
                        });
                    }
                    let base = TrapOpcode::Trap.to_u16().unwrap() << TrapIns::LOWER_BITS;
                    self.emit(base | (vector as u16 & TrapIns::VECTOR_MASK));
                    pc = pc.wrapping_add(WORD_SIZE);
                }
                "RTS" => {
                    expect_operands(line, 1)?;
                    let reg = parse_register(&line.operands[0]).ok_or_else(|| {
                        AsmError::ExpectedRegister {
                            line: line.line_no,
                            text: line.operands[0].clone(),
                        }
                    })?;
                    let base = RtsOpcode::Rts.to_u16().unwrap() << RtsIns::LOWER_BITS;
                    self.emit(base | reg.to_u16().unwrap());
                    pc = pc.wrapping_add(WORD_SIZE);
                }
                "JSR" => {
                    let reg = parse_register(&line.operands[0]).ok_or_else(|| {
                        AsmError::ExpectedRegister {
                            line: line.line_no,
                            text: line.operands[0].clone(),
                        }
                    })?;
                    let dst =
                        encode_operand(&line.operands[1], pc, &self.symbols, false, line.line_no)?;
                    let base = JsrOpcode::Jsr.to_u16().unwrap() << JsrIns::LOWER_BITS;
                    self.emit(base | (reg.to_u16().unwrap() << Operand::NUM_BITS) | dst.spec());
                    self.emit_operand_extras(None, &dst);
                    pc = pc.wrapping_add(WORD_SIZE + WORD_SIZE * dst.num_extra());
                }
                "JMP" => {
                    expect_operands(line, 1)?;
                    let dst =
                        encode_operand(&line.operands[0], pc, &self.symbols, false, line.line_no)?;
                    let base = JmpOpcode::Jmp.to_u16().unwrap() << JmpIns::LOWER_BITS;
                    self.emit(base | dst.spec());
                    self.emit_operand_extras(None, &dst);
                    pc = pc.wrapping_add(WORD_SIZE + WORD_SIZE * dst.num_extra());
                }
                _ => {
                    if let Some(base) = double_operand_base(opcode) {
                        let src = encode_operand(
                            &line.operands[0],
                            pc,
                            &self.symbols,
                            false,
                            line.line_no,
                        )?;
                        let dst = encode_operand(
                            &line.operands[1],
                            pc.wrapping_add(WORD_SIZE * src.num_extra()),
                            &self.symbols,
                            false,
                            line.line_no,
                        )?;
                        self.emit(base | (src.spec() << Operand::NUM_BITS) | dst.spec());
                        self.emit_operand_extras(Some(&src), &dst);
                        pc = pc
                            .wrapping_add(WORD_SIZE + WORD_SIZE * (src.num_extra() + dst.num_extra()));
                    } else if let Some(base) = single_operand_base(opcode) {
                        let dst = encode_operand(
                            &line.operands[0],
                            pc,
                            &self.symbols,
                            false,
                            line.line_no,
                        )?;
                        self.emit(base | dst.spec());
                        self.emit_operand_extras(None, &dst);
                        pc = pc.wrapping_add(WORD_SIZE + WORD_SIZE * dst.num_extra());
                    } else if let Some(base) = branch_base(opcode) {
                        expect_operands(line, 1)?;
                        let target = eval(&line.operands[0], &self.symbols, false, line.line_no)?;
                        let offset = (target - (pc as i32 + 2)) / 2;
                        if !(-128..=127).contains(&offset) {
                            return Err(AsmError::BranchRange {
                                line: line.line_no,
                                offset,
                            });
                        }
                        self.emit(base | (offset as u16 & BranchIns::OFFSET_MASK));
                        pc = pc.wrapping_add(WORD_SIZE);
                    } else {
                        return Err(AsmError::UnknownOpcode {
                            line: line.line_no,
                            opcode: opcode.to_string(),
                        });
                    }
                }
            }
        }

        Ok(())
    }

    fn assemble(mut self, source: &str) -> Result<Program, AsmError> {
        let lines = parse_lines(source);

        let start = self.size_pass(&lines)?;
        self.emit_pass(&lines, start)?;

        Ok(Program {
            start,
            words: self.words,
            symbols: self.symbols,
        })
    }
}
