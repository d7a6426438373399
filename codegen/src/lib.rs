pub mod scope;

#[cfg(test)]
mod machine;

use rmc_asm::{BinaryOperator, CondCode, Instruction, Operand, Register, Size, UnaryOperator};
use rmc_parser::ast::{self, Width};
use rmc_utils::unique_id::UniqueId;
use thiserror::Error;
use tracing::{debug, trace};

pub use scope::{Scope, Symbol};

pub const ENTRY_LABEL: &str = "_start";
const SYS_EXIT: u64 = 60;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CodegenError {
    #[error("\"{0}\" is already declared")]
    Redeclared(String),
    #[error("\"{0}\" is not declared")]
    Undeclared(String),
    #[error("\"{0}\" is a constant and can not be set")]
    AssignToConstant(String),
    #[error("\"{0}\" does not name a storage location")]
    NotStorage(String),
    #[error("The constant \"{name}\" can not hold {value}, it is only {width}")]
    ConstantOutOfRange {
        name: String,
        width: Width,
        value: u64,
    },
}

pub fn code_generation(program: ast::Program) -> Result<rmc_asm::Program, CodegenError> {
    Generator::new(Scope::new(ENTRY_LABEL)).generate(program)
}

fn rax() -> Operand {
    Operand::reg(Register::AX)
}

fn rbx() -> Operand {
    Operand::reg(Register::BX)
}

fn rdx() -> Operand {
    Operand::reg(Register::DX)
}

/// Walks the statements in order and lowers them to NASM.
///
/// Expressions are evaluated into `rax`. A binary operator evaluates its right
/// operand first, saves it on the stack, evaluates the left operand and pops
/// the saved value into `rbx`.
#[derive(Debug)]
pub struct Generator {
    scope: Scope,
    labels: UniqueId,
    program: rmc_asm::Program,
}

impl Generator {
    pub fn new(scope: Scope) -> Self {
        Self {
            scope,
            labels: UniqueId::new(),
            program: rmc_asm::Program::new(ENTRY_LABEL),
        }
    }

    pub fn generate(mut self, program: ast::Program) -> Result<rmc_asm::Program, CodegenError> {
        for statement in program.statements {
            self.cg_statement(statement)?;
        }

        self.cg_exit_with(Operand::Imm(0));

        debug!(
            symbols = self.scope.len(),
            data = self.program.data.len(),
            bss = self.program.bss.len(),
            instructions = self.program.text.len(),
            "generated program"
        );

        Ok(self.program)
    }

    fn emit(&mut self, instruction: Instruction) {
        trace!(?instruction, "emit");
        self.program.text.push(instruction);
    }

    fn cg_statement(&mut self, statement: ast::Statement) -> Result<(), CodegenError> {
        debug!(?statement, "generating statement");

        match statement {
            ast::Statement::Reserve { name, width } => {
                self.scope.declare_reserved(&name, width)?;
                self.program.bss.push(rmc_asm::Reservation {
                    name,
                    bytes: width.bytes(),
                });
            }
            ast::Statement::Const { name, width, value } => {
                self.scope.declare_const(&name, width, value)?;
                if value > width.max_value() {
                    return Err(CodegenError::ConstantOutOfRange { name, width, value });
                }
                self.program.data.push(rmc_asm::DataDefinition {
                    name,
                    size: width.into(),
                    value,
                });
            }
            ast::Statement::Set { name, value } => {
                let width = match self.scope.resolve(&name)? {
                    Symbol::Reserved { width } => width,
                    Symbol::Const { .. } => return Err(CodegenError::AssignToConstant(name)),
                    Symbol::Entry => return Err(CodegenError::NotStorage(name)),
                };

                self.cg_expression(value)?;

                let size: Size = width.into();
                self.emit(Instruction::Mov {
                    dst: Operand::Memory(name, size),
                    src: Operand::Register(Register::AX, size),
                });
            }
            ast::Statement::Exit(value) => {
                self.cg_expression(value)?;
                self.cg_exit_with(rax());
            }
        }

        Ok(())
    }

    fn cg_exit_with(&mut self, status: Operand) {
        self.emit(Instruction::Mov {
            dst: Operand::reg(Register::DI),
            src: status,
        });
        self.emit(Instruction::Mov {
            dst: rax(),
            src: Operand::Imm(SYS_EXIT),
        });
        self.emit(Instruction::Syscall);
    }

    fn cg_expression(&mut self, expression: ast::Expression) -> Result<(), CodegenError> {
        match expression {
            ast::Expression::Integer(value) => self.emit(Instruction::Mov {
                dst: rax(),
                src: Operand::Imm(value),
            }),
            ast::Expression::Var(name) => {
                if let Symbol::Const { value, .. } = self.scope.resolve(&name)? {
                    trace!(%name, value, "load constant");
                }
                let size: Size = self.scope.storage_width(&name)?.into();
                self.emit(Instruction::Binary {
                    op: BinaryOperator::Xor,
                    dst: rax(),
                    src: rax(),
                });
                self.emit(Instruction::Mov {
                    dst: Operand::Register(Register::AX, size),
                    src: Operand::Memory(name, size),
                });
            }
            ast::Expression::AddressOf(name) => {
                self.scope.storage_width(&name)?;
                self.emit(Instruction::Mov {
                    dst: rax(),
                    src: Operand::Address(name),
                });
            }
            ast::Expression::Unary { op, expression } => {
                self.cg_expression(*expression)?;
                match op {
                    ast::UnaryOperator::Plus => {}
                    ast::UnaryOperator::Negate => {
                        self.emit(Instruction::Unary(UnaryOperator::Neg, rax()))
                    }
                    ast::UnaryOperator::Complement => {
                        self.emit(Instruction::Unary(UnaryOperator::Not, rax()))
                    }
                }
            }
            ast::Expression::Binary { op, lhs, rhs } => {
                self.cg_expression(*rhs)?;
                self.emit(Instruction::Push(Register::AX));
                self.cg_expression(*lhs)?;
                self.emit(Instruction::Pop(Register::BX));
                self.cg_binary(op);
            }
        }

        Ok(())
    }

    // Operands are in rax (lhs) and rbx (rhs), the result goes to rax.
    fn cg_binary(&mut self, op: ast::BinaryOperator) {
        let simple = |op| Instruction::Binary {
            op,
            dst: rax(),
            src: rbx(),
        };

        match op {
            ast::BinaryOperator::Add => self.emit(simple(BinaryOperator::Add)),
            ast::BinaryOperator::Subtract => self.emit(simple(BinaryOperator::Sub)),
            ast::BinaryOperator::BitwiseAnd => self.emit(simple(BinaryOperator::And)),
            ast::BinaryOperator::BitwiseOr => self.emit(simple(BinaryOperator::Or)),
            ast::BinaryOperator::Xor => self.emit(simple(BinaryOperator::Xor)),
            ast::BinaryOperator::Multiply => self.emit(Instruction::Mul(rbx())),
            ast::BinaryOperator::Divide => self.cg_division(),
            ast::BinaryOperator::Reminder => {
                self.cg_division();
                self.emit(Instruction::Mov {
                    dst: rax(),
                    src: rdx(),
                });
            }
            ast::BinaryOperator::Equal => self.cg_comparison(CondCode::E),
            ast::BinaryOperator::NotEqual => self.cg_comparison(CondCode::NE),
            ast::BinaryOperator::GreaterThan => self.cg_comparison(CondCode::G),
            ast::BinaryOperator::LessThan => self.cg_comparison(CondCode::L),
            ast::BinaryOperator::GreaterOrEqual => self.cg_comparison(CondCode::GE),
            ast::BinaryOperator::LessOrEqual => self.cg_comparison(CondCode::LE),
        }
    }

    fn cg_division(&mut self) {
        self.emit(Instruction::Binary {
            op: BinaryOperator::Xor,
            dst: rdx(),
            src: rdx(),
        });
        self.emit(Instruction::Div(rbx()));
    }

    fn cg_comparison(&mut self, cond_code: CondCode) {
        let (true_label, end_label) = self.labels.next_label_pair("cmp");

        self.emit(Instruction::Cmp {
            lhs: rax(),
            rhs: rbx(),
        });
        self.emit(Instruction::JumpCC(cond_code, true_label.clone()));
        self.emit(Instruction::Binary {
            op: BinaryOperator::Xor,
            dst: rax(),
            src: rax(),
        });
        self.emit(Instruction::Jmp(end_label.clone()));
        self.emit(Instruction::Label(true_label));
        self.emit(Instruction::Mov {
            dst: rax(),
            src: Operand::Imm(1),
        });
        self.emit(Instruction::Label(end_label));
    }
}
