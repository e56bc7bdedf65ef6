//! Instruction fragments shared by the command and call-protocol encoders.

macro_rules! svec {
    ($($x:expr),* $(,)?) => (vec![$($x.to_string()),*]);
}

pub(crate) use svec;

pub fn at_c(arg: u16) -> String {
    format!("@{arg}", arg = arg)
}

pub fn at_s(arg: &str) -> String {
    format!("@{arg}", arg = arg)
}

/// Push D onto the stack.
pub fn push_d() -> Vec<String> {
    svec![
        "@SP",
        "M=M+1",
        "A=M-1", // Don't need to refetch SP; this is safe
        "M=D"
    ]
}

/// Pop the stack into D; A is left at the vacated slot.
pub fn pop_d() -> Vec<String> {
    svec![
        "@SP",
        "AM=M-1", // SP--, A <- new SP (val to be popped)
        "D=M"
    ]
}

/// Pop the top operand into D and leave A on the second one, which the
/// caller overwrites with the result.
pub fn binary_operands() -> Vec<String> {
    svec![
        "@SP",
        "AM=M-1", // SP--, looking at top of stack now
        "D=M",    // Right arg in D
        "A=A-1"   // Looking at second arg of stack, will overwrite
    ]
}

/// Push the literal `value`.
pub fn push_literal(value: u16) -> Vec<String> {
    let mut out = svec![at_c(value), "D=A"];
    out.extend(push_d());
    out
}

/// Push the word stored at symbol or address `addr`.
pub fn push_from(addr: &str) -> Vec<String> {
    let mut out = svec![at_s(addr), "D=M"];
    out.extend(push_d());
    out
}

#[test]
fn test_push_literal() {
    assert_eq!(
        push_literal(7),
        vec!["@7", "D=A", "@SP", "M=M+1", "A=M-1", "M=D"]
    );
}

#[test]
fn test_push_from() {
    assert_eq!(push_from("LCL")[..2], ["@LCL", "D=M"]);
    assert_eq!(push_from("LCL").len(), 6);
}
