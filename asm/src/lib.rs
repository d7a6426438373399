pub mod emit;
pub mod width;

pub use emit::EmitAsm;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Instruction {
    Mov { dst: Operand, src: Operand },
    Binary {
        op: BinaryOperator,
        dst: Operand,
        src: Operand,
    },
    Unary(UnaryOperator, Operand),
    /// Unsigned `rdx:rax = rax * operand`.
    Mul(Operand),
    /// Unsigned `rax = rdx:rax / operand`, remainder in `rdx`.
    Div(Operand),
    Push(Register),
    Pop(Register),
    Cmp { lhs: Operand, rhs: Operand },
    Jmp(String),
    JumpCC(CondCode, String),
    Label(String),
    Syscall,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum BinaryOperator {
    Add,
    Sub,
    And,
    Or,
    Xor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum UnaryOperator {
    Neg,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CondCode {
    E,
    NE,
    G,
    GE,
    L,
    LE,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Operand {
    Register(Register, Size),
    Imm(u64),
    /// The address a label stands for.
    Address(String),
    /// The memory a label points at, accessed with the given size.
    Memory(String, Size),
}

impl Operand {
    pub fn reg(register: Register) -> Self {
        Self::Register(register, Size::Qword)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Register {
    AX,
    BX,
    DX,
    DI,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Size {
    Byte,
    Word,
    Dword,
    Qword,
}

impl Size {
    pub fn bytes(self) -> u8 {
        match self {
            Size::Byte => 1,
            Size::Word => 2,
            Size::Dword => 4,
            Size::Qword => 8,
        }
    }
}

/// `$name: db value` and friends in `section .data`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataDefinition {
    pub name: String,
    pub size: Size,
    pub value: u64,
}

/// `$name: resb bytes` in `section .bss`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reservation {
    pub name: String,
    pub bytes: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    pub entry: String,
    pub data: Vec<DataDefinition>,
    pub bss: Vec<Reservation>,
    pub text: Vec<Instruction>,
}

impl Program {
    pub fn new(entry: impl Into<String>) -> Self {
        Self {
            entry: entry.into(),
            data: vec![],
            bss: vec![],
            text: vec![],
        }
    }
}
