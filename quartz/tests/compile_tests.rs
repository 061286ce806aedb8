//! Integration tests for the quartz compiler

use quartz::ir::{Function, Instruction, Terminator, Value};
use quartz::*;

fn compile(source: &str) -> ir::Module {
    Compiler::new()
        .compile_source(source, "test")
        .expect("compilation should succeed")
}

fn only_function(module: &ir::Module) -> &Function {
    assert_eq!(module.functions.len(), 1);
    &module.functions[0]
}

#[test]
fn test_straight_line_function_prints_expected_ir() {
    let module = compile("f(a, b) { c = a + b return c - 1 }");

    let expected = "\
; ModuleID = 'test'

define i32 @f(i32 %a, i32 %b) {
entry:
  %a.addr = alloca i32
  %b.addr = alloca i32
  %c.addr = alloca i32
  store i32 %a, ptr %a.addr
  store i32 %b, ptr %b.addr
  %0 = load i32, ptr %a.addr
  %1 = load i32, ptr %b.addr
  %2 = add i32 %0, %1
  store i32 %2, ptr %c.addr
  %3 = load i32, ptr %c.addr
  %4 = sub i32 %3, 1
  ret i32 %4
}
";
    assert_eq!(module.to_string(), expected);
}

#[test]
fn test_straight_line_function_has_single_block() {
    let module = compile("f(a, b) { c = a + b return c - 1 }");
    let func = only_function(&module);

    assert_eq!(func.name, "f");
    assert_eq!(func.params, vec!["a", "b"]);
    assert_eq!(func.blocks.len(), 1);
    assert!(matches!(
        func.blocks[0].terminator,
        Some(Terminator::Return(Value::Temp(_)))
    ));
}

#[test]
fn test_constant_return() {
    let module = compile("main() { return 42 }");
    let func = only_function(&module);
    assert!(func.blocks[0].instructions.is_empty());
    assert_eq!(
        func.blocks[0].terminator,
        Some(Terminator::Return(Value::Const(42)))
    );
}

#[test]
fn test_every_variable_gets_one_alloca_in_entry() {
    let module = compile(
        "f(n) { s = 0 for (i = 0, i - n, i = i + 1) { s = s + i t = s } if (s) { u = 1 } else { u = 2 } return s + u }",
    );
    let func = only_function(&module);

    let allocas: Vec<_> = func
        .instructions()
        .filter(|inst| matches!(inst, Instruction::Alloca { .. }))
        .collect();
    assert_eq!(allocas.len(), func.slots.len());

    let names: Vec<_> = func.slots.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["n", "s", "i", "t", "u"]);

    let entry = &func.blocks[Function::ENTRY.0];
    for (index, inst) in entry.instructions.iter().take(func.slots.len()).enumerate() {
        assert!(matches!(inst, Instruction::Alloca { slot } if slot.0 == index));
    }
}

#[test]
fn test_reassignment_reuses_slot() {
    let module = compile("f(a) { a = a + 1 a = a - 2 return a }");
    let func = only_function(&module);
    assert_eq!(func.slots.len(), 1);
}

#[test]
fn test_parse_errors_are_forwarded() {
    let err = Compiler::new()
        .compile_source("f(a) { return a", "test")
        .unwrap_err();
    assert!(matches!(err, CompileError::Parse(_)));
    assert!(err.to_string().starts_with("parse error at line 1"));
}

#[test]
fn test_permissive_mode_allows_undeclared_reads() {
    let module = compile("f() { return y }");
    let func = only_function(&module);
    assert!(func.slot_by_name("y").is_some());
}

#[test]
fn test_strict_mode_rejects_undeclared_reads() {
    let err = Compiler::new()
        .strict(true)
        .compile_source("f() { x = y + 1 return x }", "test")
        .unwrap_err();
    assert_eq!(err, CompileError::UndeclaredVariable("y".to_string()));
}

#[test]
fn test_strict_mode_accepts_declared_variables() {
    let module = Compiler::new()
        .strict(true)
        .compile_source("f(a) { b = a return b }", "test")
        .expect("all reads are declared");
    assert_eq!(module.functions[0].slots.len(), 2);
}

#[test]
fn test_compile_function_from_ast() {
    let ast = mica::parse("g(x) { return x }").unwrap();
    let module = Compiler::new().compile_function(&ast, "m").unwrap();
    assert_eq!(module.name, "m");
    assert!(module.function("g").is_some());
    assert!(module.function("f").is_none());
}

#[test]
fn test_labels_never_shadow_parameters() {
    let module = compile("f(then) { if (then) { x = 1 } else { x = 2 } return x }");
    let text = module.to_string();

    assert!(text.contains("define i32 @f(i32 %then)"));
    assert!(text.contains("label %then1, label %else"));
    assert!(text.contains("\nthen1:\n"));
    assert!(!text.contains("\nthen:\n"));
}

#[test]
fn test_diagnostics_are_returned_to_callers() {
    let compilation = Compiler::new()
        .compile_with_diagnostics("f() { x = y + z return x }", "test")
        .expect("permissive mode accepts undeclared reads");

    let kinds: Vec<_> = compilation
        .diagnostics
        .iter()
        .map(|d| d.kind.clone())
        .collect();
    assert_eq!(
        kinds,
        vec![
            codegen::DiagnosticKind::UndeclaredRead("y".to_string()),
            codegen::DiagnosticKind::UndeclaredRead("z".to_string()),
        ]
    );
    assert_eq!(compilation.diagnostics[0].function, "f");
    assert_eq!(compilation.module.functions.len(), 1);
}

#[test]
fn test_clean_source_has_no_diagnostics() {
    let compilation = Compiler::new()
        .compile_with_diagnostics("f(a) { return a }", "test")
        .unwrap();
    assert!(compilation.diagnostics.is_empty());
}
