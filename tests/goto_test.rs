mod common;
use basic::lang::ErrorCode;
use basic::mach::{CancelToken, Config};
use common::*;

#[test]
fn test_backward_goto_discards_skipped_loops() {
    let source = "
        10 N=N+1
        20 IF N>1000 THEN END
        30 FOR I=1 TO 10: GOTO 10
    ";
    for bytecode in &[false, true] {
        let (mut runtime, _) = runtime(Config::default().with_max_for_depth(4));
        runtime.load(source).unwrap();
        runtime.enable_bytecode(*bytecode);
        runtime.run(&CancelToken::new()).unwrap();
        assert_eq!(runtime.variables().fetch("N").unwrap().to_string(), " 1001 ");
    }
    assert_eq!(run_both(source).error, None);
}

#[test]
fn test_distinct_loops_skipped_by_goto_do_not_pile_up() {
    let source = "
        10 N=N+1: IF N>300 THEN END
        20 FOR A=1 TO 2
        30 FOR B=1 TO 2
        40 GOTO 10
    ";
    let config = Config::default().with_max_for_depth(8);
    assert_eq!(run_both_config(source, config).error, None);
}

#[test]
fn test_deadlock_heuristic() {
    let config = Config::default().with_deadlock_threshold(50);
    let outcome = run_both_config("10 FOR I=1 TO 2\n20 GOTO 5\n5 GOTO 10", config);
    assert_eq!(outcome.error.unwrap(), "FOR/NEXT DEADLOCK IN 20 (GOTO)");
}

#[test]
fn test_forward_goto_keeps_loop() {
    let source = "10 FOR I=1 TO 3\n20 GOTO 40\n30 PRINT 30\n40 NEXT";
    let outcome = run_both(source);
    assert!(outcome.calls.is_empty());
    assert_eq!(var(&outcome, "I").unwrap(), " 4 ");
}

#[test]
fn test_executor_can_jump() {
    let source = "10 JUMP 30\n20 PRINT 20\n30 PRINT 30";
    let outcome = run_both(source);
    assert_eq!(outcome.calls, vec!["JUMP 30", "PRINT 30 "]);
}

#[test]
fn test_executor_jump_to_missing_line() {
    for bytecode in &[false, true] {
        let (mut runtime, _) = runtime(Config::default());
        runtime.load("10 JUMP 99").unwrap();
        runtime.enable_bytecode(*bytecode);
        let err = runtime.run(&CancelToken::new()).unwrap_err();
        assert_eq!(err.code(), ErrorCode::UndefinedLine);
        assert_eq!(err.line_number(), Some(10));
    }
}

#[test]
fn test_run_from_line() {
    let (mut runtime, recorder) = runtime(Config::default());
    runtime.load("10 PRINT 10\n20 PRINT 20").unwrap();
    runtime.run_from(Some(20), &CancelToken::new()).unwrap();
    runtime.enable_bytecode(true);
    runtime.run_from(Some(20), &CancelToken::new()).unwrap();
    assert_eq!(recorder.calls(), vec!["PRINT 20 ", "PRINT 20 "]);
    let err = runtime.run_from(Some(15), &CancelToken::new()).unwrap_err();
    assert_eq!(err.code(), ErrorCode::UndefinedLine);
}
