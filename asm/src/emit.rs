use crate::{
    BinaryOperator, CondCode, DataDefinition, Instruction, Operand, Program, Register,
    Reservation, Size, UnaryOperator,
};

/// A Structure that implements this trait, can emit NASM assembly using the provided function.
pub trait EmitAsm {
    /// The indent_depth argument only needs to be used when you have to indent something.
    fn emit(&self, indent_depth: u32) -> String;
}

impl Register {
    pub fn name(&self, size: Size) -> &'static str {
        match self {
            Register::AX => match size {
                Size::Byte => "al",
                Size::Word => "ax",
                Size::Dword => "eax",
                Size::Qword => "rax",
            },
            Register::BX => match size {
                Size::Byte => "bl",
                Size::Word => "bx",
                Size::Dword => "ebx",
                Size::Qword => "rbx",
            },
            Register::DX => match size {
                Size::Byte => "dl",
                Size::Word => "dx",
                Size::Dword => "edx",
                Size::Qword => "rdx",
            },
            Register::DI => match size {
                Size::Byte => "dil",
                Size::Word => "di",
                Size::Dword => "edi",
                Size::Qword => "rdi",
            },
        }
    }
}

impl Size {
    /// Operand size keyword for memory accesses.
    pub fn keyword(&self) -> &'static str {
        match self {
            Size::Byte => "byte",
            Size::Word => "word",
            Size::Dword => "dword",
            Size::Qword => "qword",
        }
    }

    /// Data definition pseudo-instruction.
    pub fn define(&self) -> &'static str {
        match self {
            Size::Byte => "db",
            Size::Word => "dw",
            Size::Dword => "dd",
            Size::Qword => "dq",
        }
    }
}

/// Source names go out with NASM's `$` prefix so `rax` or `byte` stay plain symbols.
fn symbol(name: &str) -> String {
    format!("${name}")
}

impl Operand {
    fn emit(&self) -> String {
        match self {
            Operand::Register(reg, size) => reg.name(*size).to_owned(),
            Operand::Imm(val) => val.to_string(),
            Operand::Address(label) => symbol(label),
            Operand::Memory(label, size) => format!("{} [{}]", size.keyword(), symbol(label)),
        }
    }
}

impl EmitAsm for Instruction {
    fn emit(&self, indent_depth: u32) -> String {
        let tabs = "\t".repeat(indent_depth as usize);

        match self {
            Instruction::Mov { dst, src } => {
                format!("{}mov {}, {}\n", tabs, dst.emit(), src.emit())
            }
            Instruction::Binary { op, dst, src } => format!(
                "{}{} {}, {}\n",
                tabs,
                op.emit(indent_depth),
                dst.emit(),
                src.emit(),
            ),
            Instruction::Unary(op, operand) => {
                format!("{}{} {}\n", tabs, op.emit(indent_depth), operand.emit())
            }
            Instruction::Mul(operand) => format!("{}mul {}\n", tabs, operand.emit()),
            Instruction::Div(operand) => format!("{}div {}\n", tabs, operand.emit()),
            Instruction::Push(reg) => format!("{}push {}\n", tabs, reg.name(Size::Qword)),
            Instruction::Pop(reg) => format!("{}pop {}\n", tabs, reg.name(Size::Qword)),
            Instruction::Cmp { lhs, rhs } => {
                format!("{}cmp {}, {}\n", tabs, lhs.emit(), rhs.emit())
            }
            Instruction::Jmp(label) => format!("{}jmp .L{}\n", tabs, label),
            Instruction::JumpCC(cond_code, label) => {
                format!("{}j{} .L{}\n", tabs, cond_code.emit(indent_depth), label)
            }
            // Labels are never indented.
            Instruction::Label(label) => format!(".L{}:\n", label),
            Instruction::Syscall => format!("{}syscall\n", tabs),
        }
    }
}

impl EmitAsm for CondCode {
    fn emit(&self, _: u32) -> String {
        match self {
            CondCode::E => "e",
            CondCode::NE => "ne",
            CondCode::G => "g",
            CondCode::GE => "ge",
            CondCode::L => "l",
            CondCode::LE => "le",
        }
        .to_owned()
    }
}

impl EmitAsm for UnaryOperator {
    fn emit(&self, _: u32) -> String {
        match self {
            UnaryOperator::Neg => "neg".to_owned(),
            UnaryOperator::Not => "not".to_owned(),
        }
    }
}

impl EmitAsm for BinaryOperator {
    fn emit(&self, _: u32) -> String {
        match self {
            BinaryOperator::Add => "add",
            BinaryOperator::Sub => "sub",
            BinaryOperator::And => "and",
            BinaryOperator::Or => "or",
            BinaryOperator::Xor => "xor",
        }
        .to_owned()
    }
}

impl EmitAsm for DataDefinition {
    fn emit(&self, indent_depth: u32) -> String {
        let tabs = "\t".repeat(indent_depth as usize);
        format!(
            "{}{}: {} {}\n",
            tabs,
            symbol(&self.name),
            self.size.define(),
            self.value
        )
    }
}

impl EmitAsm for Reservation {
    fn emit(&self, indent_depth: u32) -> String {
        let tabs = "\t".repeat(indent_depth as usize);
        format!("{}{}: resb {}\n", tabs, symbol(&self.name), self.bytes)
    }
}

impl EmitAsm for Program {
    fn emit(&self, indent_depth: u32) -> String {
        let mut lines: Vec<String> = vec!["section .data\n".to_owned()];
        lines.extend(self.data.iter().map(|def| def.emit(indent_depth)));

        lines.push("\nsection .bss\n".to_owned());
        lines.extend(self.bss.iter().map(|res| res.emit(indent_depth)));

        lines.push(format!("\nsection .text\nglobal {}\n\n", self.entry));
        lines.push(format!("{}:\n", self.entry));
        lines.extend(self.text.iter().map(|inst| inst.emit(indent_depth + 1)));

        lines.concat()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_instructions() {
        let cases = vec![
            (
                Instruction::Mov {
                    dst: Operand::reg(Register::AX),
                    src: Operand::Imm(42),
                },
                "\tmov rax, 42\n",
            ),
            (
                Instruction::Mov {
                    dst: Operand::Register(Register::AX, Size::Byte),
                    src: Operand::Memory("x".to_owned(), Size::Byte),
                },
                "\tmov al, byte [$x]\n",
            ),
            (
                Instruction::Mov {
                    dst: Operand::Memory("x".to_owned(), Size::Word),
                    src: Operand::Register(Register::AX, Size::Word),
                },
                "\tmov word [$x], ax\n",
            ),
            (
                Instruction::Mov {
                    dst: Operand::reg(Register::AX),
                    src: Operand::Address("x".to_owned()),
                },
                "\tmov rax, $x\n",
            ),
            (
                Instruction::Binary {
                    op: BinaryOperator::Xor,
                    dst: Operand::reg(Register::DX),
                    src: Operand::reg(Register::DX),
                },
                "\txor rdx, rdx\n",
            ),
            (
                Instruction::Unary(UnaryOperator::Not, Operand::reg(Register::AX)),
                "\tnot rax\n",
            ),
            (Instruction::Div(Operand::reg(Register::BX)), "\tdiv rbx\n"),
            (Instruction::Push(Register::AX), "\tpush rax\n"),
            (Instruction::Pop(Register::BX), "\tpop rbx\n"),
            (
                Instruction::JumpCC(CondCode::GE, "cmptrue0".to_owned()),
                "\tjge .Lcmptrue0\n",
            ),
            (Instruction::Label("cmpend0".to_owned()), ".Lcmpend0:\n"),
            (Instruction::Syscall, "\tsyscall\n"),
        ];

        for (inst, expected) in cases {
            assert_eq!(inst.emit(1), expected);
        }
    }

    #[test]
    fn test_emit_program_sections() {
        let program = Program {
            entry: "_start".to_owned(),
            data: vec![DataDefinition {
                name: "c".to_owned(),
                size: Size::Qword,
                value: 42,
            }],
            bss: vec![Reservation {
                name: "x".to_owned(),
                bytes: 2,
            }],
            text: vec![Instruction::Syscall],
        };

        assert_eq!(
            program.emit(0),
            "section .data\n$c: dq 42\n\nsection .bss\n$x: resb 2\n\nsection .text\nglobal _start\n\n_start:\n\tsyscall\n"
        );
    }

    #[test]
    fn test_register_names_stay_symbols() {
        let load = Instruction::Mov {
            dst: Operand::reg(Register::AX),
            src: Operand::Memory("rax".to_owned(), Size::Qword),
        };
        let reservation = Reservation {
            name: "rax".to_owned(),
            bytes: 8,
        };

        assert_eq!(load.emit(1), "\tmov rax, qword [$rax]\n");
        assert_eq!(reservation.emit(0), "$rax: resb 8\n");
    }

    #[test]
    fn test_emit_empty_program() {
        assert_eq!(
            Program::new("_start").emit(0),
            "section .data\n\nsection .bss\n\nsection .text\nglobal _start\n\n_start:\n"
        );
    }
}
