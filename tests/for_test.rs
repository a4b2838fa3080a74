mod common;
use common::*;

#[test]
fn test_empty_loop_exits_one_step_past_end() {
    let outcome = run_both("10 FOR I=1 TO 5\n20 NEXT");
    assert_eq!(var(&outcome, "I").unwrap(), " 6 ");
    assert_eq!(outcome.error, None);
}

#[test]
fn test_negative_step_iterates_five_times() {
    let outcome = run_both("10 FOR I=5 TO 1 STEP -1\n20 PRINT I\n30 NEXT I");
    assert_eq!(
        outcome.calls,
        vec!["PRINT 5 ", "PRINT 4 ", "PRINT 3 ", "PRINT 2 ", "PRINT 1 "]
    );
    assert_eq!(var(&outcome, "I").unwrap(), " 0 ");
}

#[test]
fn test_skipped_loop_resumes_after_matching_next() {
    let source = "
        10 FOR I=5 TO 1
        20 PRINT 20
        30 FOR J=1 TO 2
        40 PRINT 40
        50 NEXT J
        60 NEXT I
        70 PRINT 70
    ";
    let outcome = run_both(source);
    assert_eq!(outcome.calls, vec!["PRINT 70 "]);
    assert_eq!(var(&outcome, "I").unwrap(), " 5 ");
    assert_eq!(var(&outcome, "J"), None);
}

#[test]
fn test_resume_within_line() {
    let outcome = run_both("10 A=0: FOR I=1 TO 3: A=A+I: NEXT: B=A\n20 PRINT B");
    assert_eq!(outcome.calls, vec!["PRINT 6 "]);
}

#[test]
fn test_resume_at_next_line_when_for_ends_line() {
    let outcome = run_both("10 FOR I=1 TO 2\n20 PRINT I: NEXT I: PRINT 99");
    assert_eq!(outcome.calls, vec!["PRINT 1 ", "PRINT 2 ", "PRINT 99 "]);
}

#[test]
fn test_leaving_inner_loop_by_goto() {
    let source = "
        10 FOR I=1 TO 3
        20 FOR J=1 TO 10
        30 IF J=2 THEN 50
        40 NEXT J
        50 NEXT I
    ";
    let outcome = run_both(source);
    assert_eq!(var(&outcome, "I").unwrap(), " 4 ");
    assert_eq!(var(&outcome, "J").unwrap(), " 2 ");
    assert_eq!(outcome.error, None);
}

#[test]
fn test_loop_depth_limit() {
    let config = basic::mach::Config::default().with_max_for_depth(3);
    let source = "10 FOR A=1 TO 2: FOR B=1 TO 2: FOR C=1 TO 2: FOR D=1 TO 2";
    let outcome = run_both_config(source, config);
    assert_eq!(
        outcome.error.unwrap(),
        "OUT OF MEMORY IN 10 (FOR); FOR LOOPS NESTED TOO DEEPLY"
    );
}

#[test]
fn test_string_bounds_mismatch() {
    let outcome = run_both("10 FOR I=\"A\" TO 2\n20 NEXT");
    assert_eq!(outcome.error.unwrap(), "TYPE MISMATCH IN 10 (FOR)");
}

#[test]
fn test_bounds_evaluated_before_type_check() {
    let outcome = run_both("10 FOR I=\"A\" TO 1/0");
    assert_eq!(outcome.error.unwrap(), "DIVISION BY ZERO IN 10 (FOR)");
}
