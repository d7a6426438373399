//! Executes generated programs so tests can check what they compute.

use std::collections::HashMap;

use rmc_asm::{BinaryOperator, CondCode, Instruction, Operand, Program, Register, Size, UnaryOperator};

const DATA_BASE: u64 = 0x40_0000;
const MAX_STEPS: usize = 100_000;

#[derive(Debug, PartialEq, Eq)]
pub enum Fault {
    UnknownLabel(String),
    DivideByZero,
    StackUnderflow,
    UnsupportedSyscall(u64),
    FellOffEnd,
    StepLimit,
}

#[derive(Debug)]
pub struct Machine {
    registers: HashMap<Register, u64>,
    memory: HashMap<String, (u64, Vec<u8>)>,
    stack: Vec<u64>,
    flags: (u64, u64),
}

impl Machine {
    pub fn load(program: &Program) -> Self {
        let mut memory = HashMap::new();
        let mut address = DATA_BASE;

        for def in &program.data {
            let bytes = def.value.to_le_bytes()[..usize::from(def.size.bytes())].to_vec();
            memory.insert(def.name.clone(), (address, bytes));
            address += 8;
        }
        for res in &program.bss {
            // Reserved storage starts out as garbage.
            memory.insert(res.name.clone(), (address, vec![0xAA; usize::from(res.bytes)]));
            address += 8;
        }

        Self {
            registers: HashMap::new(),
            memory,
            stack: vec![],
            flags: (0, 0),
        }
    }

    pub fn address_of(&self, label: &str) -> Option<u64> {
        self.memory.get(label).map(|(address, _)| *address)
    }

    pub fn read_memory(&self, label: &str) -> Option<&[u8]> {
        self.memory.get(label).map(|(_, bytes)| bytes.as_slice())
    }

    fn reg(&self, register: Register) -> u64 {
        self.registers.get(&register).copied().unwrap_or(0)
    }

    fn read(&self, operand: &Operand) -> Result<u64, Fault> {
        Ok(match operand {
            Operand::Register(reg, size) => truncate(self.reg(*reg), *size),
            Operand::Imm(val) => *val,
            Operand::Address(label) => self
                .address_of(label)
                .ok_or_else(|| Fault::UnknownLabel(label.clone()))?,
            Operand::Memory(label, size) => {
                let (_, bytes) = self
                    .memory
                    .get(label)
                    .ok_or_else(|| Fault::UnknownLabel(label.clone()))?;
                let mut buf = [0u8; 8];
                let len = usize::from(size.bytes()).min(bytes.len());
                buf[..len].copy_from_slice(&bytes[..len]);
                u64::from_le_bytes(buf)
            }
        })
    }

    fn write(&mut self, operand: &Operand, value: u64) -> Result<(), Fault> {
        match operand {
            Operand::Register(reg, size) => {
                let old = self.reg(*reg);
                let new = match size {
                    Size::Byte => (old & !0xFF) | (value & 0xFF),
                    Size::Word => (old & !0xFFFF) | (value & 0xFFFF),
                    // 32-bit writes clear the upper half.
                    Size::Dword => value & 0xFFFF_FFFF,
                    Size::Qword => value,
                };
                self.registers.insert(*reg, new);
            }
            Operand::Memory(label, size) => {
                let (_, bytes) = self
                    .memory
                    .get_mut(label)
                    .ok_or_else(|| Fault::UnknownLabel(label.clone()))?;
                let len = usize::from(size.bytes()).min(bytes.len());
                bytes[..len].copy_from_slice(&value.to_le_bytes()[..len]);
            }
            Operand::Imm(_) | Operand::Address(_) => {
                unreachable!("generated code never writes to {operand:?}")
            }
        }
        Ok(())
    }

    /// Runs until the exit syscall and returns the full exit status register.
    pub fn run(&mut self, program: &Program) -> Result<u64, Fault> {
        let labels: HashMap<&str, usize> = program
            .text
            .iter()
            .enumerate()
            .filter_map(|(i, inst)| match inst {
                Instruction::Label(label) => Some((label.as_str(), i)),
                _ => None,
            })
            .collect();
        let jump = |label: &String| {
            labels
                .get(label.as_str())
                .copied()
                .ok_or_else(|| Fault::UnknownLabel(label.clone()))
        };

        let mut pc = 0;
        for _ in 0..MAX_STEPS {
            let Some(inst) = program.text.get(pc) else {
                return Err(Fault::FellOffEnd);
            };
            pc += 1;

            match inst {
                Instruction::Mov { dst, src } => {
                    let value = self.read(src)?;
                    self.write(dst, value)?;
                }
                Instruction::Binary { op, dst, src } => {
                    let lhs = self.read(dst)?;
                    let rhs = self.read(src)?;
                    let value = match op {
                        BinaryOperator::Add => lhs.wrapping_add(rhs),
                        BinaryOperator::Sub => lhs.wrapping_sub(rhs),
                        BinaryOperator::And => lhs & rhs,
                        BinaryOperator::Or => lhs | rhs,
                        BinaryOperator::Xor => lhs ^ rhs,
                    };
                    self.write(dst, value)?;
                }
                Instruction::Unary(op, operand) => {
                    let value = self.read(operand)?;
                    let value = match op {
                        UnaryOperator::Neg => value.wrapping_neg(),
                        UnaryOperator::Not => !value,
                    };
                    self.write(operand, value)?;
                }
                Instruction::Mul(operand) => {
                    let product =
                        u128::from(self.reg(Register::AX)) * u128::from(self.read(operand)?);
                    self.registers.insert(Register::AX, product as u64);
                    self.registers.insert(Register::DX, (product >> 64) as u64);
                }
                Instruction::Div(operand) => {
                    let divisor = u128::from(self.read(operand)?);
                    if divisor == 0 {
                        return Err(Fault::DivideByZero);
                    }
                    let dividend = (u128::from(self.reg(Register::DX)) << 64)
                        | u128::from(self.reg(Register::AX));
                    self.registers.insert(Register::AX, (dividend / divisor) as u64);
                    self.registers.insert(Register::DX, (dividend % divisor) as u64);
                }
                Instruction::Push(reg) => {
                    let value = self.reg(*reg);
                    self.stack.push(value);
                }
                Instruction::Pop(reg) => {
                    let value = self.stack.pop().ok_or(Fault::StackUnderflow)?;
                    self.registers.insert(*reg, value);
                }
                Instruction::Cmp { lhs, rhs } => self.flags = (self.read(lhs)?, self.read(rhs)?),
                Instruction::Jmp(label) => pc = jump(label)?,
                Instruction::JumpCC(cond_code, label) => {
                    let (lhs, rhs) = (self.flags.0 as i64, self.flags.1 as i64);
                    let taken = match cond_code {
                        CondCode::E => lhs == rhs,
                        CondCode::NE => lhs != rhs,
                        CondCode::G => lhs > rhs,
                        CondCode::GE => lhs >= rhs,
                        CondCode::L => lhs < rhs,
                        CondCode::LE => lhs <= rhs,
                    };
                    if taken {
                        pc = jump(label)?;
                    }
                }
                Instruction::Label(_) => {}
                Instruction::Syscall => match self.reg(Register::AX) {
                    60 => return Ok(self.reg(Register::DI)),
                    number => return Err(Fault::UnsupportedSyscall(number)),
                },
            }
        }

        Err(Fault::StepLimit)
    }
}

fn truncate(value: u64, size: Size) -> u64 {
    match size {
        Size::Byte => value & 0xFF,
        Size::Word => value & 0xFFFF,
        Size::Dword => value & 0xFFFF_FFFF,
        Size::Qword => value,
    }
}
