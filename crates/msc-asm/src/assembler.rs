//! Two-pass assembly: emit instructions and record unresolved label
//! references while walking the source once, then patch every
//! reference's branch/jump offset once all labels in its function are
//! known.

use msc_value::{value_equal, Value};
use msc_vm::{encode_a_bc, encode_abc, encode_bare, Opcode, Proto};

use crate::error::{AsmError, AsmResult};
use crate::lexer::{strip_comment, tokenize};
use crate::operand::{parse_constant, parse_immediate, parse_register};

/// A reference to a label that could not be resolved when its
/// instruction was emitted, because the label may be declared later
/// in the same function.
enum PendingRef {
    /// `JMP`: the whole 16-bit BC field becomes the offset.
    Jump,
    /// `IFxx`: A and B already hold the compared registers; only the
    /// 8-bit C field becomes the offset.
    Branch { opcode: Opcode, a: u8, b: u8 },
}

struct FunctionBuilder {
    name: String,
    code: Vec<u32>,
    constants: Vec<Value>,
    max_regs: u16,
    labels: std::collections::HashMap<String, usize>,
    refs: Vec<(String, usize, PendingRef)>,
}

impl FunctionBuilder {
    fn new(name: String) -> Self {
        Self {
            name,
            code: Vec::new(),
            constants: Vec::new(),
            max_regs: 0,
            labels: std::collections::HashMap::new(),
            refs: Vec::new(),
        }
    }

    fn touch_register(&mut self, reg: u8) {
        self.max_regs = self.max_regs.max(reg as u16 + 1);
    }

    fn add_constant(&mut self, value: Value, runtime: &msc_vm::Runtime) -> AsmResult<u16> {
        if let Some(index) = self
            .constants
            .iter()
            .position(|existing| value_equal(*existing, value, runtime))
        {
            return Ok(index as u16);
        }
        if self.constants.len() >= 65536 {
            return Err(AsmError::TooManyConstants { name: self.name.clone() });
        }
        self.constants.push(value);
        Ok((self.constants.len() - 1) as u16)
    }

    fn emit(&mut self, ins: u32) -> usize {
        let addr = self.code.len();
        self.code.push(ins);
        addr
    }

    fn into_proto(mut self) -> AsmResult<Proto> {
        for (label, instr_addr, pending) in std::mem::take(&mut self.refs) {
            let Some(&target) = self.labels.get(&label) else {
                return Err(AsmError::UndefinedLabel {
                    function: self.name.clone(),
                    label,
                });
            };
            let offset = target as i64 - (instr_addr as i64 + 1);
            match pending {
                PendingRef::Jump => {
                    if !(-32768..=32767).contains(&offset) {
                        return Err(AsmError::OffsetOverflow {
                            function: self.name.clone(),
                            label,
                            bits: "16",
                        });
                    }
                    self.code[instr_addr] = encode_a_bc(Opcode::Jmp, 0, offset as i16);
                }
                PendingRef::Branch { opcode, a, b } => {
                    if !(-128..=127).contains(&offset) {
                        return Err(AsmError::OffsetOverflow {
                            function: self.name.clone(),
                            label,
                            bits: "8",
                        });
                    }
                    self.code[instr_addr] = encode_abc(opcode, a, b, offset as i8 as u8);
                }
            }
        }
        Ok(Proto::new(self.name, self.code, self.constants, self.max_regs.max(1)))
    }
}

/// One finished assembly unit: every function in source order, plus
/// which one (if any) was declared `@main`.
pub struct Program {
    pub functions: Vec<Proto>,
    pub main_index: Option<usize>,
}

impl Program {
    pub fn find(&self, name: &str) -> Option<usize> {
        self.functions.iter().position(|f| f.name == name)
    }
}

#[derive(Default)]
pub struct Assembler {
    functions: Vec<FunctionBuilder>,
    current: Option<usize>,
    main_index: Option<usize>,
}

impl Assembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assemble(source: &str, runtime: &mut msc_vm::Runtime) -> AsmResult<Program> {
        let mut asm = Assembler::new();
        for (offset, raw_line) in source.lines().enumerate() {
            let line_no = offset + 1;
            let stripped = strip_comment(raw_line).trim();
            if stripped.is_empty() {
                continue;
            }
            if let Some(name) = stripped.strip_prefix('@').and_then(|s| s.strip_suffix(':')) {
                asm.start_function(name, line_no)?;
                continue;
            }
            if let Some(name) = stripped.strip_suffix(':') {
                asm.add_label(name, line_no)?;
                continue;
            }
            let tokens = tokenize(line_no, stripped)?;
            asm.instruction(&tokens, line_no, stripped, runtime)?;
        }

        let mut functions = Vec::with_capacity(asm.functions.len());
        for f in asm.functions {
            functions.push(f.into_proto()?);
        }
        Ok(Program {
            functions,
            main_index: asm.main_index,
        })
    }

    fn start_function(&mut self, name: &str, line: usize) -> AsmResult<()> {
        if self.functions.iter().any(|f| f.name == name) {
            return Err(AsmError::DuplicateFunction {
                line,
                name: name.to_string(),
            });
        }
        if name == "main" {
            self.main_index = Some(self.functions.len());
        }
        self.functions.push(FunctionBuilder::new(name.to_string()));
        self.current = Some(self.functions.len() - 1);
        Ok(())
    }

    fn current_mut(&mut self, line: usize, text: &str) -> AsmResult<&mut FunctionBuilder> {
        let idx = self.current.ok_or_else(|| AsmError::NoCurrentFunction {
            line,
            text: text.to_string(),
        })?;
        Ok(&mut self.functions[idx])
    }

    fn add_label(&mut self, name: &str, line: usize) -> AsmResult<()> {
        let func = self.current_mut(line, name)?;
        let address = func.code.len();
        func.labels.insert(name.to_string(), address);
        Ok(())
    }

    fn register(&self, token: &str, line: usize) -> AsmResult<u8> {
        parse_register(token).ok_or_else(|| AsmError::InvalidRegister {
            line,
            token: token.to_string(),
        })
    }

    fn instruction(
        &mut self,
        tokens: &[String],
        line: usize,
        text: &str,
        runtime: &mut msc_vm::Runtime,
    ) -> AsmResult<()> {
        let invalid = || AsmError::InvalidInstruction {
            line,
            text: text.to_string(),
        };
        let Some(mnemonic) = tokens.first() else {
            return Ok(());
        };
        let ops = &tokens[1..];

        match mnemonic.as_str() {
            "MOVE" if ops.len() == 2 => {
                let a = self.register(&ops[0], line)?;
                let b = self.register(&ops[1], line)?;
                let func = self.current_mut(line, text)?;
                func.touch_register(a);
                func.touch_register(b);
                func.emit(encode_abc(Opcode::Move, a, b, 0));
            }
            "LOADK" if ops.len() == 2 => {
                let a = self.register(&ops[0], line)?;
                let imm = parse_immediate(&ops[1]).ok_or_else(|| AsmError::InvalidImmediate {
                    line,
                    token: ops[1].clone(),
                })?;
                if !(-32768..=32767).contains(&imm) {
                    return Err(AsmError::ImmediateOutOfRange {
                        line,
                        token: ops[1].clone(),
                        bits: "16",
                    });
                }
                let func = self.current_mut(line, text)?;
                func.touch_register(a);
                func.emit(encode_a_bc(Opcode::LoadK, a, imm as i16));
            }
            "LOADN" if ops.len() == 2 => {
                let a = self.register(&ops[0], line)?;
                let value = parse_constant(&ops[1], runtime).ok_or_else(|| AsmError::InvalidConstant {
                    line,
                    token: ops[1].clone(),
                })?;
                let func = self.current_mut(line, text)?;
                func.touch_register(a);
                let idx = func.add_constant(value, &*runtime)?;
                func.emit(encode_a_bc(Opcode::LoadN, a, idx as i16));
            }
            "LOAD" if ops.len() == 2 => {
                let a = self.register(&ops[0], line)?;
                if let Some(imm) = parse_immediate(&ops[1]).filter(|i| (-32768..=32767).contains(i)) {
                    let func = self.current_mut(line, text)?;
                    func.touch_register(a);
                    func.emit(encode_a_bc(Opcode::LoadK, a, imm as i16));
                } else {
                    let value = parse_constant(&ops[1], runtime).ok_or_else(|| AsmError::InvalidConstant {
                        line,
                        token: ops[1].clone(),
                    })?;
                    let func = self.current_mut(line, text)?;
                    func.touch_register(a);
                    let idx = func.add_constant(value, &*runtime)?;
                    func.emit(encode_a_bc(Opcode::LoadN, a, idx as i16));
                }
            }
            "ADD" | "SUB" | "MULT" | "DIV" if ops.len() == 3 => {
                let opcode = match mnemonic.as_str() {
                    "ADD" => Opcode::Add,
                    "SUB" => Opcode::Sub,
                    "MULT" => Opcode::Mult,
                    _ => Opcode::Div,
                };
                let a = self.register(&ops[0], line)?;
                let b = self.register(&ops[1], line)?;
                let c = self.register(&ops[2], line)?;
                let func = self.current_mut(line, text)?;
                func.touch_register(a);
                func.touch_register(b);
                func.touch_register(c);
                func.emit(encode_abc(opcode, a, b, c));
            }
            "IFLT" | "IFEQ" | "IFLE" | "IFNE" if ops.len() == 3 => {
                let opcode = match mnemonic.as_str() {
                    "IFLT" => Opcode::IfLt,
                    "IFEQ" => Opcode::IfEq,
                    "IFLE" => Opcode::IfLe,
                    _ => Opcode::IfNe,
                };
                let a = self.register(&ops[0], line)?;
                let b = self.register(&ops[1], line)?;
                let func = self.current_mut(line, text)?;
                func.touch_register(a);
                func.touch_register(b);
                if let Some(imm) = parse_immediate(&ops[2]) {
                    if !(-128..=127).contains(&imm) {
                        return Err(AsmError::ImmediateOutOfRange {
                            line,
                            token: ops[2].clone(),
                            bits: "8",
                        });
                    }
                    func.emit(encode_abc(opcode, a, b, imm as i8 as u8));
                } else {
                    let addr = func.emit(encode_abc(opcode, a, b, 0));
                    func.refs.push((ops[2].clone(), addr, PendingRef::Branch { opcode, a, b }));
                }
            }
            "JMP" if ops.len() == 1 => {
                let func = self.current_mut(line, text)?;
                if let Some(imm) = parse_immediate(&ops[0]) {
                    if !(-32768..=32767).contains(&imm) {
                        return Err(AsmError::ImmediateOutOfRange {
                            line,
                            token: ops[0].clone(),
                            bits: "16",
                        });
                    }
                    func.emit(encode_a_bc(Opcode::Jmp, 0, imm as i16));
                } else {
                    let addr = func.emit(encode_a_bc(Opcode::Jmp, 0, 0));
                    func.refs.push((ops[0].clone(), addr, PendingRef::Jump));
                }
            }
            "CALLF" if ops.len() == 3 => {
                let a = self.register(&ops[0], line)?;
                let nargs = parse_immediate(&ops[1]).ok_or_else(|| AsmError::InvalidImmediate {
                    line,
                    token: ops[1].clone(),
                })?;
                let func_idx = parse_immediate(&ops[2]).ok_or_else(|| AsmError::InvalidImmediate {
                    line,
                    token: ops[2].clone(),
                })?;
                if !(0..=255).contains(&nargs) || !(0..=255).contains(&func_idx) {
                    return Err(AsmError::ImmediateOutOfRange {
                        line,
                        token: ops[1].clone(),
                        bits: "8",
                    });
                }
                let func = self.current_mut(line, text)?;
                func.touch_register(a);
                func.emit(encode_abc(Opcode::CallF, a, nargs as u8, func_idx as u8));
            }
            "RETURN" if ops.is_empty() => {
                let func = self.current_mut(line, text)?;
                func.emit(encode_bare(Opcode::Return));
            }
            _ => return Err(invalid()),
        }
        Ok(())
    }
}
