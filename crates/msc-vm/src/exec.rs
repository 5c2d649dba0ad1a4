//! The bytecode executor: call frames sliding over one value stack,
//! switch-based dispatch, and the frame-wide GC rooting convention
//! from the safe-points contract (every register in every active
//! frame is implicitly reachable, so bytecode never needs its own
//! shadow-stack bookkeeping).

use std::rc::Rc;

use msc_gc::Handle;
use msc_value::{value_add, value_div, value_equal, value_lt, value_mult, value_sub, Value};
use tracing::trace;

use crate::error::{VmError, VmResult};
use crate::opcode::{a, b, bc, c, c_offset, op, Opcode};
use crate::proto::Proto;
use crate::runtime::Runtime;

struct Frame {
    proto: Rc<Proto>,
    pc: usize,
    base: usize,
}

/// Per-VM execution state: the value stack and the call-frame stack.
/// `Runtime` (GC, string pool, function table) is borrowed for the
/// duration of `exec` rather than owned, so one `Runtime` can host
/// several independent `Vm` instances in sequence.
pub struct Vm {
    stack: Vec<Value>,
    frames: Vec<Frame>,
    max_call_depth: usize,
}

impl Default for Vm {
    fn default() -> Self {
        Self::new(4096, 256)
    }
}

impl Vm {
    pub fn new(stack_slots: usize, max_call_depth: usize) -> Self {
        Self {
            stack: vec![Value::make_null(); stack_slots],
            frames: Vec::new(),
            max_call_depth,
        }
    }

    fn ensure_frame_capacity(&mut self, base: usize, max_regs: u16) {
        let needed = base + max_regs as usize;
        if needed > self.stack.len() {
            self.stack.resize(needed, Value::make_null());
        }
    }

    /// Collects the handles reachable from every active frame's
    /// register window, for use as extra GC roots before an
    /// instruction that might allocate.
    fn live_roots(&self) -> Vec<Handle> {
        let mut roots = Vec::new();
        for frame in &self.frames {
            let window = &self.stack[frame.base..frame.base + frame.proto.max_regs as usize];
            for v in window {
                if let Some(h) = v.as_heap_string_handle() {
                    roots.push(h);
                } else if let Some(h) = v.as_list_handle() {
                    roots.push(h);
                } else if let Some(h) = v.as_map_handle() {
                    roots.push(h);
                }
            }
        }
        roots
    }

    fn refresh_roots(&self, runtime: &mut Runtime) {
        runtime.set_frame_roots(self.live_roots());
    }

    /// Runs `entry` to completion (or until a fatal error / cycle
    /// budget is hit) and returns the final `base[0]`.
    ///
    /// `max_cycles == 0` means unbounded.
    pub fn exec(&mut self, runtime: &mut Runtime, entry: Rc<Proto>, max_cycles: u32) -> VmResult<Value> {
        self.frames.clear();
        self.ensure_frame_capacity(0, entry.max_regs);
        self.frames.push(Frame {
            proto: entry,
            pc: 0,
            base: 0,
        });

        let mut cycle_count: u32 = 0;

        loop {
            cycle_count += 1;
            if max_cycles > 0 && cycle_count > max_cycles {
                return Err(VmError::BudgetExhausted(max_cycles));
            }

            let (ins, base, max_regs) = {
                let frame = self.frames.last_mut().expect("at least one frame while running");
                let ins = frame.proto.code[frame.pc];
                frame.pc += 1;
                (ins, frame.base, frame.proto.max_regs)
            };
            self.ensure_frame_capacity(base, max_regs);

            let opcode = Opcode::from_u8(op(ins)).ok_or(VmError::UnknownOpcode(op(ins)))?;
            trace!(pc = self.frames.last().unwrap().pc - 1, ?opcode, cycle_count, "exec");

            match opcode {
                Opcode::Move => {
                    self.stack[base + a(ins) as usize] = self.stack[base + b(ins) as usize];
                }
                Opcode::LoadK => {
                    self.stack[base + a(ins) as usize] = Value::make_int(bc(ins) as i32);
                }
                Opcode::LoadN => {
                    let idx = bc(ins) as u16 as usize;
                    let frame = self.frames.last().unwrap();
                    let konst = frame
                        .proto
                        .constants
                        .get(idx)
                        .copied()
                        .ok_or(VmError::BadConstantIndex {
                            index: idx as u16,
                            len: frame.proto.constants.len(),
                        })?;
                    self.stack[base + a(ins) as usize] = konst;
                }
                Opcode::Add => {
                    self.refresh_roots(runtime);
                    let lhs = self.stack[base + b(ins) as usize];
                    let rhs = self.stack[base + c(ins) as usize];
                    self.stack[base + a(ins) as usize] = value_add(lhs, rhs, runtime);
                }
                Opcode::Sub => {
                    let lhs = self.stack[base + b(ins) as usize];
                    let rhs = self.stack[base + c(ins) as usize];
                    self.stack[base + a(ins) as usize] = value_sub(lhs, rhs);
                }
                Opcode::Mult => {
                    self.refresh_roots(runtime);
                    let lhs = self.stack[base + b(ins) as usize];
                    let rhs = self.stack[base + c(ins) as usize];
                    self.stack[base + a(ins) as usize] = value_mult(lhs, rhs, runtime);
                }
                Opcode::Div => {
                    self.refresh_roots(runtime);
                    let lhs = self.stack[base + b(ins) as usize];
                    let rhs = self.stack[base + c(ins) as usize];
                    self.stack[base + a(ins) as usize] = value_div(lhs, rhs, runtime);
                }
                Opcode::IfLt => {
                    let lhs = self.stack[base + a(ins) as usize];
                    let rhs = self.stack[base + b(ins) as usize];
                    if value_lt(lhs, rhs, &*runtime) {
                        self.branch(c_offset(ins) as i32);
                    }
                }
                Opcode::IfEq => {
                    let lhs = self.stack[base + a(ins) as usize];
                    let rhs = self.stack[base + b(ins) as usize];
                    if value_equal(lhs, rhs, &*runtime) {
                        self.branch(c_offset(ins) as i32);
                    }
                }
                Opcode::IfLe => {
                    let lhs = self.stack[base + a(ins) as usize];
                    let rhs = self.stack[base + b(ins) as usize];
                    if value_lt(lhs, rhs, &*runtime) || value_equal(lhs, rhs, &*runtime) {
                        self.branch(c_offset(ins) as i32);
                    }
                }
                Opcode::IfNe => {
                    let lhs = self.stack[base + a(ins) as usize];
                    let rhs = self.stack[base + b(ins) as usize];
                    if !value_equal(lhs, rhs, &*runtime) {
                        self.branch(c_offset(ins) as i32);
                    }
                }
                Opcode::Jmp => {
                    self.branch(bc(ins) as i32);
                }
                Opcode::CallF => {
                    let func_index = c(ins);
                    let callee = runtime
                        .function(func_index)
                        .ok_or(VmError::CallToNullFunction(func_index))?;
                    if self.frames.len() >= self.max_call_depth {
                        return Err(VmError::CallStackOverflow(self.max_call_depth));
                    }
                    let new_base = base + a(ins) as usize;
                    self.ensure_frame_capacity(new_base, callee.max_regs);
                    self.frames.push(Frame {
                        proto: callee,
                        pc: 0,
                        base: new_base,
                    });
                }
                Opcode::Return => {
                    if self.frames.len() == 1 {
                        return Ok(self.stack[base]);
                    }
                    self.frames.pop();
                }
            }
        }
    }

    fn branch(&mut self, offset: i32) {
        let frame = self.frames.last_mut().expect("at least one frame while running");
        frame.pc = (frame.pc as i64 + offset as i64) as usize;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opcode::{encode_a_bc, encode_abc, encode_bare};
    use msc_gc::GcConfig;

    fn proto(name: &str, code: Vec<u32>, constants: Vec<Value>, max_regs: u16) -> Rc<Proto> {
        Rc::new(Proto::new(name, code, constants, max_regs))
    }

    #[test]
    fn straight_line_arithmetic() {
        let mut runtime = Runtime::new(GcConfig::default());
        let mut vm = Vm::default();
        let code = vec![
            encode_a_bc(Opcode::LoadK, 0, 10),
            encode_a_bc(Opcode::LoadK, 1, 32),
            encode_abc(Opcode::Add, 2, 0, 1),
            encode_bare(Opcode::Return),
        ];
        let main = proto("main", code, vec![], 3);
        let result = vm.exec(&mut runtime, main, 0).unwrap();
        assert_eq!(result.as_int(), 42);
    }

    #[test]
    fn call_into_another_function_shares_the_result_slot() {
        let mut runtime = Runtime::new(GcConfig::default());

        // double(r0): r0 = r0 + r0; return
        let double = proto(
            "double",
            vec![encode_abc(Opcode::Add, 0, 0, 0), encode_bare(Opcode::Return)],
            vec![],
            1,
        );
        runtime.install(0, (*double).clone());

        // main: r0 = 21; call double at window r0 (A=0); return r0
        let main_code = vec![
            encode_a_bc(Opcode::LoadK, 0, 21),
            encode_abc(Opcode::CallF, 0, 1, 0),
            encode_bare(Opcode::Return),
        ];
        let main = proto("main", main_code, vec![], 1);

        let mut vm = Vm::default();
        let result = vm.exec(&mut runtime, main, 1_000).unwrap();
        assert_eq!(result.as_int(), 42);
    }

    #[test]
    fn call_window_slides_base_for_the_callee() {
        let mut runtime = Runtime::new(GcConfig::default());

        // negate(r0): r1 = 0; r0 = r1 - r0 (i.e. -r0); return
        let negate = proto(
            "negate",
            vec![
                encode_a_bc(Opcode::LoadK, 1, 0),
                encode_abc(Opcode::Sub, 0, 1, 0),
                encode_bare(Opcode::Return),
            ],
            vec![],
            2,
        );
        runtime.install(1, (*negate).clone());

        // main: r0 = 7; r1 = r0 (argument window at r1); call negate(A=1); r2 = r1 (copy result out); return r2
        let main_code = vec![
            encode_a_bc(Opcode::LoadK, 0, 7),
            encode_abc(Opcode::Move, 1, 0, 0),
            encode_abc(Opcode::CallF, 1, 1, 1),
            encode_abc(Opcode::Move, 2, 1, 0),
            encode_abc(Opcode::Move, 0, 2, 0),
            encode_bare(Opcode::Return),
        ];
        let main = proto("main", main_code, vec![], 4);

        let mut vm = Vm::default();
        let result = vm.exec(&mut runtime, main, 1_000).unwrap();
        assert_eq!(result.as_int(), -7);
    }

    #[test]
    fn exceeding_cycle_budget_is_reported() {
        let mut runtime = Runtime::new(GcConfig::default());
        let mut vm = Vm::default();
        let code = vec![encode_a_bc(Opcode::Jmp, 0, -1)];
        let main = proto("loop", code, vec![], 1);
        let err = vm.exec(&mut runtime, main, 100).unwrap_err();
        assert_eq!(err, VmError::BudgetExhausted(100));
    }

    #[test]
    fn unknown_opcode_is_fatal() {
        let mut runtime = Runtime::new(GcConfig::default());
        let mut vm = Vm::default();
        let main = proto("bad", vec![0xFF000000], vec![], 1);
        let err = vm.exec(&mut runtime, main, 0).unwrap_err();
        assert_eq!(err, VmError::UnknownOpcode(0xFF));
    }
}
