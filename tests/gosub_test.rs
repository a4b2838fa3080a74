mod common;
use basic::lang::{ErrorCode, ErrorKind};
use basic::mach::{CancelToken, Config};
use common::*;

#[test]
fn test_nested_subroutines() {
    let source = "
        10 GOSUB 100
        20 PRINT 20
        30 END
        100 GOSUB 200
        110 PRINT 110
        120 RETURN
        200 PRINT 200
        210 RETURN
    ";
    let outcome = run_both(source);
    assert_eq!(outcome.calls, vec!["PRINT 200 ", "PRINT 110 ", "PRINT 20 "]);
}

#[test]
fn test_gosub_returns_to_following_line() {
    let outcome = run_both("10 GOSUB 30: PRINT 10\n20 PRINT 20: END\n30 RETURN");
    assert_eq!(outcome.calls, vec!["PRINT 20 "]);
}

#[test]
fn test_return_from_last_line_ends_program() {
    let outcome = run_both("10 GOTO 30\n20 RETURN\n30 GOSUB 20");
    assert_eq!(outcome.error, None);
}

#[test]
fn test_return_without_gosub_is_runtime_error() {
    for bytecode in &[false, true] {
        let (mut runtime, _) = runtime(Config::default());
        runtime.load("10 RETURN").unwrap();
        runtime.enable_bytecode(*bytecode);
        let err = runtime.run(&CancelToken::new()).unwrap_err();
        assert_eq!(err.code(), ErrorCode::ReturnWithoutGosub);
        assert_eq!(err.kind(), ErrorKind::Runtime);
        assert_eq!(err.line_number(), Some(10));
        assert_eq!(err.command(), "RETURN");
    }
}

#[test]
fn test_runaway_recursion_is_resource_limit() {
    for bytecode in &[false, true] {
        let (mut runtime, _) = runtime(Config::default());
        runtime.load("10 GOSUB 10").unwrap();
        runtime.enable_bytecode(*bytecode);
        let err = runtime.run(&CancelToken::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ResourceLimit);
        assert_eq!(err.code(), ErrorCode::OutOfMemory);
    }
}

#[test]
fn test_loops_inside_subroutine_do_not_leak() {
    let source = "
        10 FOR I=1 TO 3
        20 GOSUB 100
        30 NEXT
        40 END
        100 FOR J=1 TO 9
        110 RETURN
    ";
    let outcome = run_both(source);
    assert_eq!(outcome.error, None);
    assert_eq!(var(&outcome, "I").unwrap(), " 4 ");
}

#[test]
fn test_undefined_target() {
    let outcome = run_mode("10 GOSUB 50", false, Config::default());
    assert_eq!(outcome.error.unwrap(), "UNDEFINED LINE IN 10 (GOSUB)");
}
