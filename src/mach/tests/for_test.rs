use super::*;

#[test]
fn test_breaking_out_of_loop_with_goto() {
    let source = "
        10 FOR Y=1 TO 2
        20 FOR X=8 TO 9
        30 ? Y;X
        40 GOTO 60
        50 NEXT
        60 NEXT Y
    ";
    assert_eq!(run_both(source), " 1  8 \n 2  8 \n");
}

#[test]
fn test_empty_loop_leaves_end_plus_step() {
    assert_eq!(run_both("10 FOR I=1 TO 5\n20 NEXT\n30 ? I"), " 6 \n");
}

#[test]
fn test_negative_step() {
    let source = "10 FOR I=5 TO 1 STEP -1: N=N+1: NEXT: ? N;I";
    assert_eq!(run_both(source), " 5  0 \n");
}

#[test]
fn test_skipped_loop() {
    let source = "
        10 FOR I=5 TO 1
        20 ? \"BODY\"
        30 NEXT I: ? \"AFTER\";
        40 ? I
    ";
    assert_eq!(run_both(source), "AFTER 5 \n");
}

#[test]
fn test_skipped_nested_loop() {
    let source = "
        10 FOR I=1 TO 0
        20 FOR J=1 TO 3
        30 ? J
        40 NEXT J
        50 NEXT I
        60 ? \"DONE\"
    ";
    assert_eq!(run_both(source), "DONE\n");
}

#[test]
fn test_next_with_two_variables() {
    let source = "10 FOR I=1 TO 2: FOR J=1 TO 2: ? I;J;: NEXT J, I: ?";
    assert_eq!(run_both(source), " 1  1  1  2  2  1  2  2 \n");
}

#[test]
fn test_fractional_step() {
    assert_eq!(run_both("10 FOR X=0 TO 1 STEP 0.1: N=N+1: NEXT: ? N"), " 11 \n");
}

#[test]
fn test_step_zero() {
    assert_eq!(
        run_both("10 FOR I=1 TO 2 STEP 0\n20 NEXT"),
        "SYNTAX ERROR IN 10 (FOR); STEP IS ZERO\n"
    );
}

#[test]
fn test_next_without_for() {
    assert_eq!(run_both("10 NEXT"), "NEXT WITHOUT FOR IN 10 (NEXT)\n");
}

#[test]
fn test_for_without_next() {
    assert_eq!(
        run_both("10 FOR I=2 TO 1\n20 ? I"),
        "FOR WITHOUT NEXT IN 10 (FOR)\n"
    );
}

#[test]
fn test_loop_inside_then_clause() {
    let source = "10 IF 1 THEN FOR I=1 TO 3: ? I;: NEXT: ?";
    assert_eq!(run_both(source), " 1  2  3 \n");
}
