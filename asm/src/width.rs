use rmc_parser::ast::Width;

use crate::Size;

impl From<Width> for Size {
    fn from(value: Width) -> Self {
        match value {
            Width::U8 => Size::Byte,
            Width::U16 => Size::Word,
            Width::U32 => Size::Dword,
            Width::U64 => Size::Qword,
        }
    }
}
