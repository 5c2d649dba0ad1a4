use std::fmt::Write as _;

use msc_value::{to_string, HeapView, Value};

use crate::opcode::{a, b, bc, c_offset, op, Opcode};

/// A function prototype: bytecode, its constant pool, and the number
/// of registers a call needs reserved. Read-only once built; the
/// assembler is the only thing that constructs one incrementally.
#[derive(Debug, Clone)]
pub struct Proto {
    pub name: String,
    pub code: Vec<u32>,
    pub constants: Vec<Value>,
    pub max_regs: u16,
}

impl Proto {
    pub fn new(name: impl Into<String>, code: Vec<u32>, constants: Vec<Value>, max_regs: u16) -> Self {
        Self {
            name: name.into(),
            code,
            constants,
            max_regs,
        }
    }

    /// A textual disassembly, one instruction per line, in the same
    /// mnemonic spelling the assembler accepts as input.
    pub fn disassemble(&self, heap: &dyn HeapView) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "@{}: max_regs={}", self.name, self.max_regs);
        for (pc, &ins) in self.code.iter().enumerate() {
            let Some(opcode) = Opcode::from_u8(op(ins)) else {
                let _ = writeln!(out, "  {pc:4}: <bad opcode {}>", op(ins));
                continue;
            };
            let line = match opcode {
                Opcode::Move => format!("MOVE r{}, r{}", a(ins), b(ins)),
                Opcode::LoadK => format!("LOADK r{}, {}", a(ins), bc(ins)),
                Opcode::LoadN => {
                    let idx = bc(ins) as u16 as usize;
                    let rendered = self
                        .constants
                        .get(idx)
                        .map(|v| to_string(*v, heap))
                        .unwrap_or_else(|| "<oob>".to_string());
                    format!("LOADN r{}, const[{}] ; {}", a(ins), idx, rendered)
                }
                Opcode::Add => format!("ADD r{}, r{}, r{}", a(ins), b(ins), crate::opcode::c(ins)),
                Opcode::Sub => format!("SUB r{}, r{}, r{}", a(ins), b(ins), crate::opcode::c(ins)),
                Opcode::Mult => format!("MULT r{}, r{}, r{}", a(ins), b(ins), crate::opcode::c(ins)),
                Opcode::Div => format!("DIV r{}, r{}, r{}", a(ins), b(ins), crate::opcode::c(ins)),
                Opcode::IfLt => format!("IFLT r{}, r{}, {}", a(ins), b(ins), c_offset(ins)),
                Opcode::IfEq => format!("IFEQ r{}, r{}, {}", a(ins), b(ins), c_offset(ins)),
                Opcode::IfLe => format!("IFLE r{}, r{}, {}", a(ins), b(ins), c_offset(ins)),
                Opcode::IfNe => format!("IFNE r{}, r{}, {}", a(ins), b(ins), c_offset(ins)),
                Opcode::Jmp => format!("JMP {}", bc(ins)),
                Opcode::CallF => format!(
                    "CALLF r{}, {}, func[{}]",
                    a(ins),
                    b(ins),
                    crate::opcode::c(ins)
                ),
                Opcode::Return => "RETURN".to_string(),
            };
            let _ = writeln!(out, "  {pc:4}: {line}");
        }
        out
    }
}
