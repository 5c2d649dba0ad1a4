//! The text assembler: turns the line-oriented instruction format into
//! `Proto` values the VM can run, resolving labels to branch/jump
//! offsets in a second pass once each function's full instruction
//! count is known.

mod assembler;
mod error;
mod lexer;
mod operand;

pub use assembler::{Assembler, Program};
pub use error::{AsmError, AsmResult};

#[cfg(test)]
mod tests {
    use super::*;
    use msc_gc::GcConfig;
    use msc_vm::Runtime;

    fn assemble(source: &str) -> AsmResult<(Program, Runtime)> {
        let mut runtime = Runtime::new(GcConfig::default());
        let program = Assembler::assemble(source, &mut runtime)?;
        Ok((program, runtime))
    }

    #[test]
    fn straight_line_function_assembles_and_runs() {
        let source = r#"
            @main:
                LOADK r0, 10
                LOADK r1, 32
                ADD r2, r0, r1
                RETURN
        "#;
        let (program, mut runtime) = assemble(source).unwrap();
        let main = program.main_index.expect("main declared");
        let proto = std::rc::Rc::new(program.functions[main].clone());
        let mut vm = msc_vm::Vm::default();
        let result = vm.exec(&mut runtime, proto, 0).unwrap();
        assert_eq!(result.as_int(), 42);
    }

    #[test]
    fn forward_label_reference_resolves_after_the_function_is_parsed() {
        let source = r#"
            @main:
                LOADK r0, 0
                LOADK r1, 1
                IFEQ r0, r0, done
                LOADK r1, 99
            done:
                MOVE r2, r1
                RETURN
        "#;
        let (program, mut runtime) = assemble(source).unwrap();
        let main = program.main_index.unwrap();
        let proto = std::rc::Rc::new(program.functions[main].clone());
        let mut vm = msc_vm::Vm::default();
        let result = vm.exec(&mut runtime, proto, 1000).unwrap();
        assert_eq!(result.as_int(), 1);
    }

    #[test]
    fn backward_label_reference_builds_a_loop() {
        // r0 counts down from 3 to 0, r1 accumulates 3+2+1 = 6.
        let source = r#"
            @main:
                LOADK r0, 3
                LOADK r1, 0
                LOADK r2, 1
                LOADK r4, 0
            loop:
                IFEQ r0, r4, done
                ADD r1, r1, r0
                SUB r0, r0, r2
                JMP loop
            done:
                MOVE r3, r1
                RETURN
        "#;
        let (program, mut runtime) = assemble(source).unwrap();
        let main = program.main_index.unwrap();
        let proto = std::rc::Rc::new(program.functions[main].clone());
        let mut vm = msc_vm::Vm::default();
        let result = vm.exec(&mut runtime, proto, 10_000).unwrap();
        assert_eq!(result.as_int(), 6);
    }

    #[test]
    fn load_pseudo_op_chooses_loadk_for_small_ints_and_loadn_otherwise() {
        let source = r#"
            @main:
                LOAD r0, 5
                LOAD r1, "hello"
                RETURN
        "#;
        let (program, _runtime) = assemble(source).unwrap();
        let main = program.main_index.unwrap();
        let proto = &program.functions[main];
        assert_eq!(proto.constants.len(), 1);
    }

    #[test]
    fn calling_another_function_by_its_source_order_index() {
        let source = r#"
            @double:
                ADD r0, r0, r0
                RETURN
            @main:
                LOADK r0, 21
                CALLF r0, 1, 0
                RETURN
        "#;
        let (program, mut runtime) = assemble(source).unwrap();
        for (index, proto) in program.functions.iter().enumerate() {
            runtime.install(index as u8, proto.clone());
        }
        let main = program.main_index.unwrap();
        let proto = std::rc::Rc::new(program.functions[main].clone());
        let mut vm = msc_vm::Vm::default();
        let result = vm.exec(&mut runtime, proto, 1000).unwrap();
        assert_eq!(result.as_int(), 42);
    }

    #[test]
    fn undefined_label_is_a_resolution_error() {
        let source = "@main:\n  JMP nowhere\n  RETURN\n";
        let err = assemble(source).unwrap_err();
        assert!(matches!(err, AsmError::UndefinedLabel { .. }));
    }

    #[test]
    fn duplicate_function_names_are_rejected() {
        let source = "@main:\n  RETURN\n@main:\n  RETURN\n";
        let err = assemble(source).unwrap_err();
        assert!(matches!(err, AsmError::DuplicateFunction { .. }));
    }

    #[test]
    fn comment_only_and_blank_lines_are_ignored() {
        let source = "# a comment\n\n@main:\n  ; another comment\n  RETURN\n";
        let (program, _runtime) = assemble(source).unwrap();
        assert_eq!(program.functions.len(), 1);
    }
}
