use super::*;
use crate::lang::{ErrorCode, ErrorKind};
use crate::mach::{Listing, Program, Vm};
use std::sync::Arc;

#[test]
fn test_gosub_returns_to_next_line() {
    let source = "
        10 GOSUB 100: ? \"SKIPPED\"
        20 ? \"BACK\"
        30 END
        100 ? \"SUB\"
        110 RETURN
    ";
    assert_eq!(run_both(source), "SUB\nBACK\n");
}

#[test]
fn test_return_without_gosub() {
    assert_eq!(run_both("10 RETURN"), "RETURN WITHOUT GOSUB IN 10 (RETURN)\n");
}

#[test]
fn test_gosub_depth_limit() {
    let config = Config::default().with_max_gosub_depth(10);
    let source = "10 GOSUB 10";
    let expected = "OUT OF MEMORY IN 10 (GOSUB); GOSUB NESTED TOO DEEPLY\n";
    assert_eq!(run_config(source, false, config.clone()), expected);
    assert_eq!(run_config(source, true, config), expected);
}

#[test]
fn test_return_discards_subroutine_loops() {
    let source = "
        10 FOR I=1 TO 2
        20 GOSUB 100
        30 NEXT I
        40 ? I;J
        50 END
        100 FOR J=1 TO 5
        110 RETURN
    ";
    assert_eq!(run_both(source), " 3  1 \n");
}

#[test]
fn test_if_truthiness() {
    let source = r#"
        10 IF 0 THEN ? "ZERO"
        20 IF "" THEN ? "EMPTY"
        30 IF -1 THEN ? "TRUE"
        40 IF "X" THEN ? "STRING"
    "#;
    assert_eq!(run_both(source), "TRUE\nSTRING\n");
}

#[test]
fn test_if_short_circuit() {
    let source = r#"
        10 IF 0 AND 1/0 THEN ? "A" ELSE ? "B"
        20 IF 1 OR 1/0 THEN ? "C"
        30 IF 1 AND 0 OR 1 THEN ? "D"
        40 A = 1 AND 2: ? A
    "#;
    assert_eq!(run_both(source), "B\nC\nD\n 0 \n");
}

#[test]
fn test_else_goto() {
    let source = "10 IF X THEN 30 ELSE 40\n30 ? \"THEN\": END\n40 ? \"ELSE\"";
    assert_eq!(run_both(source), "ELSE\n");
}

#[test]
fn test_runtime_errors_match() {
    assert_eq!(run_both("10 A=1/0"), "DIVISION BY ZERO IN 10 (LET)\n");
    assert_eq!(run_both("10 A$=1"), "TYPE MISMATCH IN 10 (LET)\n");
    assert_eq!(run_both("10 ? SQR(-1)"), "ILLEGAL FUNCTION CALL IN 10 (PRINT)\n");
}

#[test]
fn test_compile_error_falls_back() {
    let source = "10 ? \"RAN\"\n20 GOTO 99";
    assert_eq!(run_bytecode(source), "RAN\nUNDEFINED LINE IN 20 (GOTO)\n");
    let config = Config::default().with_compile_fallback(false);
    assert_eq!(
        run_config(source, true, config),
        "CAN'T COMPILE; UNDEFINED LINE IN 20\n"
    );
}

#[test]
fn test_goto_cleanup_bounds_loop_stack() {
    let source = "
        10 N=N+1: IF N>500 THEN END
        20 FOR I=1 TO 10: GOTO 10
    ";
    let (mut runtime, _output) = Runtime::with_console(Config::default());
    runtime.load(source).unwrap();
    runtime.run(&CancelToken::new()).unwrap();
    assert_eq!(runtime.stack_depths(), (0, 0));
    assert_eq!(runtime.variables().fetch("N").unwrap().to_string(), " 501 ");
    runtime.enable_bytecode(true);
    runtime.clear_variables();
    runtime.run(&CancelToken::new()).unwrap();
    assert_eq!(runtime.variables().fetch("N").unwrap().to_string(), " 501 ");
}

#[test]
fn test_deadlock_guard() {
    let config = Config::default().with_deadlock_threshold(100);
    let source = "10 FOR I=1 TO 10\n20 GOTO 5\n5 X=X+1: GOTO 10";
    // 20 jumps back past the loop on every pass.
    let expected = "FOR/NEXT DEADLOCK IN 20 (GOTO)\n";
    assert_eq!(run_config(source, false, config.clone()), expected);
    assert_eq!(run_config(source, true, config), expected);
}

#[test]
fn test_precancelled_vm() {
    let mut listing = Listing::default();
    listing.load_str("10 GOTO 10").unwrap();
    let mut vm = Vm::new(&Config::default());
    vm.load_program(Arc::new(Program::compile(&listing).unwrap()));
    let cancel = CancelToken::new();
    cancel.cancel();
    let (mut console, _output) = crate::mach::Console::new(1);
    let err = vm.run(None, &mut console, &cancel).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Cancelled);
    assert_eq!(err.code(), ErrorCode::Break);
    assert!(!vm.is_running());
}

#[test]
fn test_cancel_from_another_thread() {
    let config = Config::default().with_cancel_interval(16);
    for bytecode in &[false, true] {
        let (mut runtime, _output) = Runtime::with_console(config.clone());
        runtime.load("10 GOTO 10").unwrap();
        runtime.enable_bytecode(*bytecode);
        let cancel = CancelToken::new();
        let remote = cancel.clone();
        let waker = std::thread::spawn(move || {
            std::thread::sleep(std::time::Duration::from_millis(20));
            remote.cancel();
        });
        let err = runtime.run(&cancel).unwrap_err();
        assert!(err.is_cancelled());
        waker.join().unwrap();
    }
}

#[test]
fn test_variables_copy_in_and_out() {
    let (mut runtime, _output) = Runtime::with_console(Config::default());
    runtime.load("10 B=A*2").unwrap();
    runtime.enable_bytecode(true);
    runtime.execute_direct("A=21", &CancelToken::new()).unwrap();
    runtime.run(&CancelToken::new()).unwrap();
    assert_eq!(runtime.evaluate("B").unwrap().to_string(), " 42 ");
}

#[test]
fn test_stats() {
    let (mut runtime, _output) = Runtime::with_console(Config::default());
    runtime.load("10 A=1\n20 A=2").unwrap();
    assert!(!runtime.stats().cached);
    runtime.enable_bytecode(true);
    runtime.run(&CancelToken::new()).unwrap();
    let stats = runtime.stats();
    assert!(stats.bytecode_enabled);
    assert!(stats.cached);
    assert_eq!(stats.labels, 2);
    assert_eq!(stats.instructions, 5);
    assert!(!stats.vm_running);
    runtime.set_line(30, "A=3").unwrap();
    assert!(!runtime.stats().cached);
    runtime.enable_bytecode(false);
    assert_eq!(runtime.stats().instructions, 0);
}

#[test]
fn test_disassembly() {
    let (mut runtime, _output) = Runtime::with_console(Config::default());
    runtime.load("10 A=1: ? A").unwrap();
    let listing = runtime.disassemble().unwrap();
    let lines: Vec<&str> = listing.lines().map(str::trim_end).collect();
    assert_eq!(
        lines,
        vec![
            "10:",
            "     0  LITERAL(0)       1",
            "     1  POP(A)",
            "     2  EXEC(1)         \"? A\"",
            "     3  END",
        ]
    );
}
