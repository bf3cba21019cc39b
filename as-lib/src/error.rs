
use thiserror::Error;

// Static assembly errors. Every variant carries the one-based source line
// it was detected on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AsmError {
    #[error("line {line}: invalid number: {text}")]
    BadNumber { line: usize, text: String },

    #[error("line {line}: unknown opcode: {opcode}")]
    UnknownOpcode { line: usize, opcode: String },

    #[error("line {line}: {opcode} expects {expected} operand(s), got {got}")]
    OperandCount {
        line: usize,
        opcode: String,
        expected: usize,
        got: usize,
    },

    #[error("line {line}: malformed operand: {text}")]
    BadOperand { line: usize, text: String },

    #[error("line {line}: undefined symbol: {name}")]
    UndefinedSymbol { line: usize, name: String },

    #[error("line {line}: operand must be a register: {text}")]
    ExpectedRegister { line: usize, text: String },

    #[error("line {line}: branch target out of range (offset {offset})")]
    BranchRange { line: usize, offset: i32 },

    #[error("line {line}: trap vector out of range: {vector}")]
    TrapVector { line: usize, vector: i32 },
}
