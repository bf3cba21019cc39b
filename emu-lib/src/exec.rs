
use std::ops::{BitAnd, BitOr};

use common::asm::*;

use crate::cpu::Cpu;
use crate::ea::{ResolvedOperand, Size};

fn not_and(src: u32, dst: u32) -> u32 {
    !src & dst
}

impl Cpu {
    pub(crate) fn exec(&mut self, ins: &Ins) {
        match ins {
            Ins::DoubleOperand(ins) => self.exec_double_operand_ins(ins),
            Ins::SingleOperand(ins) => self.exec_single_operand_ins(ins),
            Ins::Branch(ins) => self.exec_branch_ins(ins),
            Ins::Jmp(ins) => self.exec_jmp_ins(ins),
            Ins::Jsr(ins) => self.exec_jsr_ins(ins),
            Ins::Rts(ins) => self.exec_rts_ins(ins),
            Ins::Trap(ins) => self.exec_trap_ins(ins),
            Ins::Misc(ins) => self.exec_misc_ins(ins),
        }
    }

    ///////////////////////////////////////////////////////////////////////////
    // Double operand

    fn do_mov(&mut self, src: &Operand, dst: &Operand, size: Size) {
        let src = self.resolve(src, size);
        let val = self.read_resolved_widen(src, size);
        let dst = self.resolve(dst, size);

        if size == Size::Byte && matches!(dst, ResolvedOperand::Reg(_)) {
            // MOVB to a register sign-extends across all 16 bits.
            let wide = val as u8 as i8 as i16 as u16;
            self.write_resolved_word(dst, wide);
        } else {
            self.write_resolved_narrow(dst, val, size);
        }

        self.status.set_zero(val == 0);
        self.status.set_negative(size.sign_bit(val) != 0);
        self.status.set_overflow(false);
        // Carry unaffected.
    }

    fn do_add(&mut self, src: &Operand, dst: &Operand) {
        let size = Size::Word;
        let src = self.resolve(src, size);
        let s = self.read_resolved_widen(src, size);
        let dst = self.resolve(dst, size);
        let d = self.read_resolved_widen(dst, size);

        let res = s + d;
        let r = res & size.mask();
        self.write_resolved_narrow(dst, r, size);

        self.status.set_zero(r == 0);
        self.status.set_negative(size.sign_bit(r) != 0);
        self.status.set_overflow(size.sign_bit(!(s ^ d) & (s ^ r)) != 0);
        self.status.set_carry((res >> size.bits()) != 0);
    }

    // Computes dst - src; CMP discards the result, SUB stores it.
    fn do_sub(&mut self, src: &Operand, dst: &Operand, size: Size, discard: bool) {
        let src = self.resolve(src, size);
        let s = self.read_resolved_widen(src, size);
        let dst = self.resolve(dst, size);
        let d = self.read_resolved_widen(dst, size);

        let res = d.wrapping_sub(s);
        let r = res & size.mask();
        if !discard {
            self.write_resolved_narrow(dst, r, size);
        }

        self.status.set_zero(r == 0);
        self.status.set_negative(size.sign_bit(r) != 0);
        self.status.set_overflow(size.sign_bit((d ^ s) & (d ^ r)) != 0);
        self.status.set_carry((res >> size.bits()) & 0x1 != 0);
    }

    fn do_bitwise(
        &mut self,
        src: &Operand,
        op: fn(u32, u32) -> u32,
        dst: &Operand,
        size: Size,
        discard: bool,
    ) {
        let src = self.resolve(src, size);
        let s = self.read_resolved_widen(src, size);
        let dst = self.resolve(dst, size);
        let d = self.read_resolved_widen(dst, size);

        let res = op(s, d) & size.mask();
        if !discard {
            self.write_resolved_narrow(dst, res, size);
        }

        self.status.set_zero(res == 0);
        self.status.set_negative(size.sign_bit(res) != 0);
        self.status.set_overflow(false);
        self.status.set_carry(false);
    }

    fn exec_double_operand_ins(&mut self, ins: &DoubleOperandIns) {
        use DoubleOperandOpcode::*;
        match ins.op {
            Mov => self.do_mov(&ins.src, &ins.dst, Size::Word),
            Cmp => self.do_sub(&ins.src, &ins.dst, Size::Word, true),
            Bit => self.do_bitwise(&ins.src, u32::bitand, &ins.dst, Size::Word, true),
            Bic => self.do_bitwise(&ins.src, not_and, &ins.dst, Size::Word, false),
            Bis => self.do_bitwise(&ins.src, u32::bitor, &ins.dst, Size::Word, false),
            Add => self.do_add(&ins.src, &ins.dst),
            Sub => self.do_sub(&ins.src, &ins.dst, Size::Word, false),

            MovB => self.do_mov(&ins.src, &ins.dst, Size::Byte),
            CmpB => self.do_sub(&ins.src, &ins.dst, Size::Byte, true),
            BitB => self.do_bitwise(&ins.src, u32::bitand, &ins.dst, Size::Byte, true),
            BicB => self.do_bitwise(&ins.src, not_and, &ins.dst, Size::Byte, false),
            BisB => self.do_bitwise(&ins.src, u32::bitor, &ins.dst, Size::Byte, false),
        }
    }

    ///////////////////////////////////////////////////////////////////////////
    // Single operand

    fn exec_single_operand_ins(&mut self, ins: &SingleOperandIns) {
        use SingleOperandOpcode::*;
        let size = if ins.op.is_byte() { Size::Byte } else { Size::Word };
        let dst = self.resolve(&ins.dst, size);

        match ins.op {
            Clr | ClrB => {
                self.write_resolved_narrow(dst, 0, size);
                self.status.set_zero(true);
                self.status.set_negative(false);
                self.status.set_overflow(false);
                self.status.set_carry(false);
            }
            Inc | IncB => {
                let val = self.read_resolved_widen(dst, size);
                let res = val.wrapping_add(1) & size.mask();
                self.write_resolved_narrow(dst, res, size);
                self.status.set_zero(res == 0);
                self.status.set_negative(size.sign_bit(res) != 0);
                self.status.set_overflow(val == size.largest_signed());
                // Carry unaffected.
            }
            Dec | DecB => {
                let val = self.read_resolved_widen(dst, size);
                let res = val.wrapping_sub(1) & size.mask();
                self.write_resolved_narrow(dst, res, size);
                self.status.set_zero(res == 0);
                self.status.set_negative(size.sign_bit(res) != 0);
                self.status.set_overflow(val == size.smallest_signed());
                // Carry unaffected.
            }
            Tst | TstB => {
                let val = self.read_resolved_widen(dst, size);
                self.status.set_zero(val == 0);
                self.status.set_negative(size.sign_bit(val) != 0);
                self.status.set_overflow(false);
                self.status.set_carry(false);
            }
            Ror => {
                let val = self.read_resolved_word(dst);
                let carry_in = self.status.get_carry() as u16;
                let res = (carry_in << 15) | (val >> 1);
                self.write_resolved_word(dst, res);
                self.status.set_carry(val & 0x1 != 0);
                self.set_nz_word(res);
                self.set_v_from_nc();
            }
            Rol => {
                let val = self.read_resolved_word(dst);
                let carry_in = self.status.get_carry() as u16;
                let res = (val << 1) | carry_in;
                self.write_resolved_word(dst, res);
                self.status.set_carry(val & 0x8000 != 0);
                self.set_nz_word(res);
                self.set_v_from_nc();
            }
            Asr => {
                let val = self.read_resolved_word(dst);
                let res = (val & 0x8000) | (val >> 1);
                self.write_resolved_word(dst, res);
                self.status.set_carry(val & 0x1 != 0);
                self.set_nz_word(res);
                self.set_v_from_nc();
            }
            Asl => {
                let val = self.read_resolved_word(dst);
                let res = val << 1;
                self.write_resolved_word(dst, res);
                self.status.set_carry(val & 0x8000 != 0);
                self.set_nz_word(res);
                self.set_v_from_nc();
            }
        }
    }

    fn set_nz_word(&mut self, val: u16) {
        self.status.set_zero(val == 0);
        self.status.set_negative(val & 0x8000 != 0);
    }

    // Rotates and shifts: V = N xor C, from the freshly set flags.
    fn set_v_from_nc(&mut self) {
        let v = self.status.get_negative() ^ self.status.get_carry();
        self.status.set_overflow(v);
    }

    ///////////////////////////////////////////////////////////////////////////
    // Control flow

    fn exec_branch_ins(&mut self, ins: &BranchIns) {
        let taken = match ins.op {
            BranchOpcode::Br => true,
            BranchOpcode::Bne => !self.status.get_zero(),
            BranchOpcode::Beq => self.status.get_zero(),
        };

        if taken {
            let off = (ins.offset as i8 as i16) * 2;
            let pc = self.pc().wrapping_add(off as u16);
            self.reg_write_word(Reg::PC, pc);
        }
    }

    fn exec_jmp_ins(&mut self, ins: &JmpIns) {
        let addr = self.operand_address(&ins.dst);
        self.reg_write_word(Reg::PC, addr);
    }

    pub(crate) fn push_word(&mut self, val: u16) {
        let sp = self.reg_read_word(Reg::SP).wrapping_sub(2);
        self.reg_write_word(Reg::SP, sp);
        self.mem_write_word(sp, val);
    }

    pub(crate) fn pop_word(&mut self) -> u16 {
        let sp = self.reg_read_word(Reg::SP);
        let val = self.mem_read_word(sp);
        self.reg_write_word(Reg::SP, sp.wrapping_add(2));
        val
    }

    // The destination is resolved before the stack push, so its
    // auto-inc/dec side effects observe the old SP.
    fn exec_jsr_ins(&mut self, ins: &JsrIns) {
        let addr = self.operand_address(&ins.dst);
        let old = self.reg_read_word(ins.reg);
        self.push_word(old);
        self.reg_write_word(ins.reg, self.pc());
        self.reg_write_word(Reg::PC, addr);
    }

    fn exec_rts_ins(&mut self, ins: &RtsIns) {
        let tmp = self.reg_read_word(ins.reg);
        let restored = self.pop_word();
        self.reg_write_word(ins.reg, restored);
        self.reg_write_word(Reg::PC, tmp);
    }

    fn exec_misc_ins(&mut self, ins: &MiscIns) {
        match ins.op {
            MiscOpcode::Halt => self.halted = true,
        }
    }
}
