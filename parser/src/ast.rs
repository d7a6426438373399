use std::fmt::Display;

pub type Identifier = String;

/// Storage width selected by a `u8`/`u16`/`u32`/`u64` size tag.
#[derive(Debug, Clone, Copy, Eq, PartialEq, PartialOrd, Ord, Hash)]
pub enum Width {
    U8,
    U16,
    U32,
    U64,
}

impl Width {
    pub fn from_tag(tag: &str) -> Option<Self> {
        Some(match tag {
            "u8" => Self::U8,
            "u16" => Self::U16,
            "u32" => Self::U32,
            "u64" => Self::U64,
            _ => return None,
        })
    }

    pub fn bytes(self) -> u8 {
        match self {
            Self::U8 => 1,
            Self::U16 => 2,
            Self::U32 => 4,
            Self::U64 => 8,
        }
    }

    /// Largest value a location of this width can hold.
    pub fn max_value(self) -> u64 {
        match self {
            Self::U8 => u8::MAX.into(),
            Self::U16 => u16::MAX.into(),
            Self::U32 => u32::MAX.into(),
            Self::U64 => u64::MAX,
        }
    }
}

impl Display for Width {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::U8 => "u8",
                Self::U16 => "u16",
                Self::U32 => "u32",
                Self::U64 => "u64",
            }
        )
    }
}

#[derive(Debug, Eq, PartialEq, PartialOrd, Ord)]
pub enum Expression {
    Integer(u64),
    Var(Identifier),
    AddressOf(Identifier),
    Unary {
        op: UnaryOperator,
        expression: Box<Expression>,
    },
    Binary {
        op: BinaryOperator,
        lhs: Box<Expression>,
        rhs: Box<Expression>,
    },
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, PartialOrd, Ord)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Reminder,
    BitwiseAnd,
    BitwiseOr,
    Xor,
    Equal,
    NotEqual,
    GreaterThan,
    LessThan,
    GreaterOrEqual,
    LessOrEqual,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, PartialOrd, Ord)]
pub enum UnaryOperator {
    /// `+x`, evaluates to x.
    Plus,
    Negate,
    Complement,
}

#[derive(Debug, Eq, PartialEq)]
pub enum Statement {
    Reserve {
        name: Identifier,
        width: Width,
    },
    Const {
        name: Identifier,
        width: Width,
        value: u64,
    },
    Set {
        name: Identifier,
        value: Expression,
    },
    Exit(Expression),
}

#[derive(Debug, Eq, PartialEq)]
pub struct Program {
    pub statements: Vec<Statement>,
}
