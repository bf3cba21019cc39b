
use std::collections::HashMap;

use common::asm::{AddrMode, Operand, Reg};
use num_traits::FromPrimitive;

use crate::error::AsmError;
use crate::numbers::parse_number;

// An operand as the assembler emits it: the six-bit spec plus the extension
// word it drags along, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperandEnc {
    pub operand: Operand,
    pub extra: Option<u16>,
}

impl OperandEnc {
    fn plain(mode: AddrMode, reg: Reg) -> OperandEnc {
        OperandEnc {
            operand: Operand::new(mode, reg),
            extra: None,
        }
    }

    fn with_extra(mode: AddrMode, reg: Reg, extra: u16) -> OperandEnc {
        OperandEnc {
            operand: Operand::new(mode, reg),
            extra: Some(extra),
        }
    }

    pub fn spec(&self) -> u16 {
        self.operand.format()
    }

    pub fn num_extra(&self) -> u16 {
        self.extra.is_some() as u16
    }
}

pub fn parse_register(token: &str) -> Option<Reg> {
    let bytes = token.as_bytes();
    if bytes.len() == 2
        && (bytes[0] == b'R' || bytes[0] == b'r')
        && (b'0'..=b'7').contains(&bytes[1])
    {
        return Reg::from_u16((bytes[1] - b'0') as u16);
    }
    None
}

// Number, or symbol looked up case-insensitively. In pass 1 unresolved
// symbols evaluate to 0 so sizes come out right; pass 2 must resolve.
pub(crate) fn eval(
    text: &str,
    symbols: &HashMap<String, u16>,
    allow_undefined: bool,
    line: usize,
) -> Result<i32, AsmError> {
    if let Some(val) = parse_number(text) {
        return Ok(val);
    }
    match symbols.get(&text.to_uppercase()) {
        Some(val) => Ok(*val as i32),
        None if allow_undefined => Ok(0),
        None => Err(AsmError::UndefinedSymbol {
            line,
            name: text.to_string(),
        }),
    }
}

// Classify one operand token. The order of the cases is load-bearing;
// see the register-deferred forms before the generic disp(Rn) form.
// `pc` is the address the PC-relative displacement is computed against:
// the instruction word for a source or single operand, two bytes later
// when a source extension word precedes the destination's.
pub fn encode_operand(
    token: &str,
    pc: u16,
    symbols: &HashMap<String, u16>,
    allow_undefined: bool,
    line: usize,
) -> Result<OperandEnc, AsmError> {
    let t = token.trim();

    let bad = || AsmError::BadOperand {
        line,
        text: token.to_string(),
    };

    if t.is_empty() {
        return Err(bad());
    }

    // Rn
    if let Some(reg) = parse_register(t) {
        return Ok(OperandEnc::plain(AddrMode::Gen, reg));
    }

    // (Rn)
    if t.len() >= 3 && t.starts_with('(') && t.ends_with(')') {
        let reg = parse_register(&t[1..t.len() - 1]).ok_or_else(bad)?;
        return Ok(OperandEnc::plain(AddrMode::Def, reg));
    }

    // (Rn)+
    if t.len() >= 4 && t.starts_with('(') && t.ends_with(")+") {
        let reg = parse_register(&t[1..t.len() - 2]).ok_or_else(bad)?;
        return Ok(OperandEnc::plain(AddrMode::AutoInc, reg));
    }

    // -(Rn)
    if t.len() >= 4 && t.starts_with("-(") && t.ends_with(')') {
        let reg = parse_register(&t[2..t.len() - 1]).ok_or_else(bad)?;
        return Ok(OperandEnc::plain(AddrMode::AutoDec, reg));
    }

    // #value: immediate through PC autoincrement.
    if let Some(value) = t.strip_prefix('#') {
        let val = eval(value.trim(), symbols, allow_undefined, line)?;
        return Ok(OperandEnc::with_extra(AddrMode::AutoInc, Reg::PC, val as u16));
    }

    // @#value: absolute through PC autoincrement deferred.
    if let Some(value) = t.strip_prefix("@#") {
        let val = eval(value.trim(), symbols, allow_undefined, line)?;
        return Ok(OperandEnc::with_extra(
            AddrMode::AutoIncDef,
            Reg::PC,
            val as u16,
        ));
    }

    // disp(Rn)
    if let Some(paren) = t.find('(') {
        if t.ends_with(')') {
            let reg = parse_register(t[paren + 1..t.len() - 1].trim()).ok_or_else(bad)?;
            let disp = t[..paren].trim();
            let val = if disp.is_empty() {
                0
            } else {
                eval(disp, symbols, allow_undefined, line)?
            };
            return Ok(OperandEnc::with_extra(AddrMode::Index, reg, val as u16));
        }
    }

    // Anything else is a symbol or number, addressed PC-relative. The
    // displacement is against the PC after this operand's extension word
    // has been consumed.
    let target = eval(t, symbols, allow_undefined, line)?;
    let disp = target.wrapping_sub(pc as i32 + 4) as u16;
    Ok(OperandEnc::with_extra(AddrMode::Index, Reg::PC, disp))
}
