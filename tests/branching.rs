mod common;

use common::{execute, machine, STACK};
use vm2hack::{Options, Truthiness};

const LT_THEN_BRANCH: &str = "
push constant 3
push constant 5
lt
if-goto L1
goto L2
label L1
push constant 100
goto END
label L2
push constant 200
label END
";

#[test]
fn if_goto_takes_canonical_true_by_default() {
    let m = execute(LT_THEN_BRANCH);
    assert_eq!(m.stack(), &[100]);
}

#[test]
fn positive_policy_ignores_canonical_true() {
    let options = Options {
        truthiness: Truthiness::Positive,
        ..Options::default()
    };
    let mut m = machine(LT_THEN_BRANCH, options);
    m.run(1_000);
    // lt pushed -1, which is not greater than zero.
    assert_eq!(m.stack(), &[200]);
}

#[test]
fn positive_policy_takes_positive_values() {
    let options = Options {
        truthiness: Truthiness::Positive,
        ..Options::default()
    };
    let mut m = machine("push constant 1\nif-goto OUT\npush constant 9\nlabel OUT\n", options);
    m.run(1_000);
    assert_eq!(m.sp(), STACK);
}

#[test]
fn if_goto_falls_through_on_zero() {
    let m = execute("push constant 0\nif-goto SKIP\npush constant 9\nlabel SKIP\n");
    assert_eq!(m.stack(), &[9]);
}

#[test]
fn loop_sums_down_to_zero() {
    // local 0 = counter, local 1 = running sum
    let m = execute(
        "
push constant 5
pop local 0
push constant 0
pop local 1
label LOOP
push local 0
push constant 0
eq
if-goto DONE
push local 1
push local 0
add
pop local 1
push local 0
push constant 1
sub
pop local 0
goto LOOP
label DONE
push local 1
",
    );
    assert_eq!(m.stack(), &[15]);
}
