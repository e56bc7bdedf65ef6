//! Function entry, call and return sequences.
//!
//! A call leaves this frame on the stack, growing upwards:
//!
//! ```text
//! ARG ->  argument 0 .. argument n-1
//!         return address
//!         saved LCL
//!         saved ARG
//!         saved THIS
//!         saved THAT
//! LCL ->  local 0 .. local k-1
//! ```
//!
//! `R13` holds the frame pointer and `R14` the return address while a
//! function returns.

use crate::label::{Counter, Label};
use crate::templates::{at_c, at_s, push_d, push_from, svec};

/// Words saved between the arguments and the callee's locals.
pub const FRAME_SIZE: u16 = 5;

/// Caller registers saved by `call`, in push order. `return` restores them in reverse.
pub const SAVED_REGISTERS: [&str; 4] = ["LCL", "ARG", "THIS", "THAT"];

/// Stack address the bootstrap starts from.
pub const STACK_BASE: u16 = 256;

pub fn function(name: &str, locals: u16) -> Vec<String> {
    let mut out = vec![Label::Function(name).declare()];
    for _ in 0..locals {
        out.extend(svec!["@SP", "M=M+1", "A=M-1", "M=0"]);
    }
    out
}

/// Call `name` with `args` arguments already pushed. `scope` is the calling
/// function and `ordinal` makes the return label unique.
pub fn call(scope: &str, name: &str, args: u16, ordinal: Counter) -> Vec<String> {
    let ret = Label::Return { scope, ordinal };

    let mut out = svec![ret.load(), "D=A"];
    out.extend(push_d());
    for reg in SAVED_REGISTERS {
        out.extend(push_from(reg));
    }
    out.extend(svec![
        "@SP",
        "D=M",
        at_c(args + FRAME_SIZE),
        "D=D-A",
        "@ARG",
        "M=D", // ARG = SP - args - 5
        "@SP",
        "D=M",
        "@LCL",
        "M=D", // LCL = SP
        Label::Function(name).load(),
        "0;JMP",
        ret.declare()
    ]);
    out
}

pub fn return_() -> Vec<String> {
    let mut out = svec![
        "@LCL",
        "D=M",
        "@R13",
        "M=D", // FRAME = LCL
        at_c(FRAME_SIZE),
        "A=D-A",
        "D=M",
        "@R14",
        "M=D", // RET = *(FRAME - 5)
        "@SP",
        "AM=M-1",
        "D=M",
        "@ARG",
        "A=M",
        "M=D", // *ARG = pop()
        "@ARG",
        "D=M+1",
        "@SP",
        "M=D" // SP = ARG + 1
    ];
    for reg in SAVED_REGISTERS.iter().rev() {
        // Walk FRAME down one word per register: THAT, THIS, ARG, LCL
        out.extend(svec!["@R13", "AM=M-1", "D=M", at_s(reg), "M=D"]);
    }
    out.extend(svec!["@R14", "A=M", "0;JMP"]);
    out
}

/// Point SP at the stack base and call `Sys.init`.
pub fn bootstrap(ordinal: Counter) -> Vec<String> {
    let mut out = svec![at_c(STACK_BASE), "D=A", "@SP", "M=D"];
    out.extend(call("Bootstrap", "Sys.init", 0, ordinal));
    out
}

#[test]
fn test_function() {
    let out = function("Main.main", 2);
    assert_eq!(out[0], "(Main.main)");
    assert_eq!(out.iter().filter(|l| *l == "M=0").count(), 2);
    assert_eq!(function("Main.leaf", 0), vec!["(Main.leaf)"]);
}

#[test]
fn test_call_labels() {
    let out = call("Main.main", "Math.add", 2, Counter::new(9));
    assert_eq!(out[0], "@Main.main$ret.9");
    assert_eq!(out.last().map(String::as_str), Some("(Main.main$ret.9)"));
    assert!(out.contains(&"@7".to_string()));
    assert!(out.contains(&"@Math.add".to_string()));
}

#[test]
fn test_return_is_branch_free() {
    let out = return_();
    let jumps: Vec<_> = out.iter().filter(|l| l.contains(';')).collect();
    assert_eq!(jumps, vec!["0;JMP"]);
}
