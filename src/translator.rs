use log::trace;

use crate::ast::{ArithmeticOp, BranchKind, Command, ComparisonOp, Direction, Segment};
use crate::config::Options;
#[cfg(test)]
use crate::config::Truthiness;
use crate::error::{CommandError, MalformedOperandSnafu, UnsupportedSnafu};
use crate::label::{compare_pair, Counter, Label};
use crate::parser::MAX_CONSTANT;
use crate::protocol;
use crate::segment::{resolve, Location};
use crate::templates::{
    at_c, at_s, binary_operands, pop_d, push_d, push_from, push_literal, svec,
};

fn simple_un_op(op: ArithmeticOp) -> Vec<String> {
    svec!["@SP", "A=M-1", op.comp()]
}

// i.e. no conditions or jumps, just pop and run
fn simple_bin_op(op: ArithmeticOp) -> Vec<String> {
    let mut out = binary_operands();
    out.push(op.comp().to_string()); // Op and overwrite second element
    out
}

fn arithmetic(op: ArithmeticOp) -> Vec<String> {
    if op.is_unary() {
        simple_un_op(op)
    } else {
        simple_bin_op(op)
    }
}

fn compare(op: ComparisonOp, ordinal: Counter) -> Vec<String> {
    let (is_true, end) = compare_pair(op, ordinal);
    let mut out = binary_operands();
    out.extend(svec![
        "D=M-D",
        is_true.load(),
        format!("D;{}", op.jump()),
        "D=0",
        end.load(),
        "0;JMP",
        is_true.declare(),
        "D=-1",
        end.declare(),
        "@SP",
        "A=M-1",
        "M=D"
    ]);
    out
}

fn push(location: Location) -> Vec<String> {
    match location {
        Location::Immediate(arg) => push_literal(arg),
        Location::Indirect { base, index } => {
            let mut out = svec![
                at_s(base),
                "D=M",
                at_c(index),
                "A=D+A", // A = SEG+arg
                "D=M"    // D = value to push
            ];
            out.extend(push_d());
            out
        }
        Location::Direct(addr) => push_from(&addr),
    }
}

fn pop(location: Location) -> Result<Vec<String>, CommandError> {
    match location {
        Location::Immediate(_) => UnsupportedSnafu {
            reason: "constant is not an addressable destination",
        }
        .fail(),
        Location::Indirect { base, index } => {
            let mut out = svec![
                at_s(base),
                "D=M",
                at_c(index),
                "D=D+A", // D = SEG+arg
                "@R13",
                "M=D" // Store destination addr in R13
            ];
            out.extend(pop_d());
            out.extend(svec![
                "@R13",
                "A=M", // At the destination's address...
                "M=D"  // ... store the popped val
            ]);
            Ok(out)
        }
        Location::Direct(addr) => {
            let mut out = pop_d();
            out.extend(svec![at_s(&addr), "M=D"]);
            Ok(out)
        }
    }
}

/// Translates the commands of one unit, tracking which function they sit in.
pub struct Translator<'a> {
    unit: &'a str,
    scope: String,
    options: Options,
}

impl<'a> Translator<'a> {
    pub fn new(unit: &'a str, options: Options) -> Self {
        Translator {
            unit,
            scope: unit.to_string(),
            options,
        }
    }

    /// Name labels and return addresses are currently scoped to.
    pub fn scope(&self) -> &str {
        &self.scope
    }

    fn memory(
        &self,
        direction: Direction,
        segment: Segment,
        arg: u16,
    ) -> Result<Vec<String>, CommandError> {
        let location = resolve(segment, arg, self.unit)?;
        match direction {
            Direction::Push => Ok(push(location)),
            Direction::Pop => pop(location),
        }
    }

    fn call(
        &self,
        name: &str,
        args: u16,
        counter: Counter,
    ) -> Result<Vec<String>, CommandError> {
        match args.checked_add(protocol::FRAME_SIZE) {
            Some(offset) if offset <= MAX_CONSTANT => {
                Ok(protocol::call(&self.scope, name, args, counter))
            }
            _ => MalformedOperandSnafu {
                reason: format!("argument count {args} leaves no room for the call frame"),
            }
            .fail(),
        }
    }

    fn branch(&self, kind: BranchKind, name: &str) -> Vec<String> {
        let target = Label::Scoped {
            scope: &self.scope,
            name,
        };
        match kind {
            BranchKind::Label => vec![target.declare()],
            BranchKind::Goto => svec![target.load(), "0;JMP"], // Unconditional jump
            BranchKind::IfGoto => {
                let mut out = pop_d();
                out.extend(svec![
                    target.load(),
                    format!("D;{}", self.options.truthiness.jump())
                ]);
                out
            }
        }
    }

    /// Translate a single command. `counter` is the command's ordinal; the
    /// returned counter is the one the next command must use.
    pub fn translate_command(
        &mut self,
        command: &Command,
        counter: Counter,
    ) -> Result<(Vec<String>, Counter), CommandError> {
        trace!("{}#{}: {}", self.unit, counter, command);

        let translated = match command {
            Command::Arithmetic(op) => arithmetic(*op),
            Command::Comparison(op) => compare(*op, counter),
            Command::Memory(direction, segment, arg) => {
                self.memory(*direction, *segment, *arg)?
            }
            Command::Branch(kind, name) => self.branch(*kind, name),
            Command::Function(name, locals) => {
                self.scope = name.clone();
                protocol::function(name, *locals)
            }
            Command::Call(name, args) => self.call(name, *args, counter)?,
            Command::Return => protocol::return_(),
        };

        let mut instructions = Vec::with_capacity(translated.len() + 1);
        if self.options.annotate {
            instructions.push(format!("// {}", command));
        }
        instructions.extend(translated);

        Ok((instructions, counter.next()))
    }

    /// Translate a command sequence, threading `counter` through it.
    pub fn translate(
        &mut self,
        commands: &[Command],
        mut counter: Counter,
    ) -> Result<(Vec<String>, Counter), CommandError> {
        let mut instructions: Vec<String> = vec![];

        for command in commands {
            let (translated, next) = self.translate_command(command, counter)?;
            instructions.extend(translated);
            counter = next;
        }

        Ok((instructions, counter))
    }
}

#[cfg(test)]
fn plain() -> Options {
    Options {
        annotate: false,
        ..Options::default()
    }
}

#[test]
fn test_add() {
    let (out, next) = Translator::new("Main", plain())
        .translate_command(&Command::Arithmetic(ArithmeticOp::Add), Counter::new(4))
        .unwrap();
    assert_eq!(out, vec!["@SP", "AM=M-1", "D=M", "A=A-1", "M=D+M"]);
    assert_eq!(next, Counter::new(5));
}

#[test]
fn test_annotation() {
    let (out, _) = Translator::new("Main", Options::default())
        .translate_command(
            &Command::Memory(Direction::Push, Segment::Constant, 7),
            Counter::default(),
        )
        .unwrap();
    assert_eq!(out[0], "// push constant 7");
}

#[test]
fn test_compare_uses_counter() {
    let mut translator = Translator::new("Main", plain());
    let eq = Command::Comparison(ComparisonOp::Eq);
    let (first, next) = translator.translate_command(&eq, Counter::new(0)).unwrap();
    let (second, _) = translator.translate_command(&eq, next).unwrap();
    assert!(first.contains(&"(EQ_TRUE_0)".to_string()));
    assert!(second.contains(&"(EQ_TRUE_1)".to_string()));
}

#[test]
fn test_static_uses_unit() {
    let (out, _) = Translator::new("Class2", plain())
        .translate_command(
            &Command::Memory(Direction::Pop, Segment::Static, 8),
            Counter::default(),
        )
        .unwrap();
    assert_eq!(out, vec!["@SP", "AM=M-1", "D=M", "@Class2.8", "M=D"]);
}

#[test]
fn test_pop_constant_rejected() {
    let err = Translator::new("Main", plain())
        .translate_command(
            &Command::Memory(Direction::Pop, Segment::Constant, 0),
            Counter::default(),
        )
        .unwrap_err();
    assert!(matches!(err, CommandError::Unsupported { .. }));
}

#[test]
fn test_label_scoping() {
    let mut translator = Translator::new("Main", plain());
    let label = Command::Branch(BranchKind::Label, "LOOP".to_string());
    let (before, next) = translator.translate_command(&label, Counter::default()).unwrap();
    assert_eq!(before, vec!["(Main:LABEL_LOOP)"]);

    let (_, next) = translator
        .translate_command(&Command::Function("Main.run".to_string(), 0), next)
        .unwrap();
    let (inside, _) = translator.translate_command(&label, next).unwrap();
    assert_eq!(inside, vec!["(Main.run:LABEL_LOOP)"]);
    assert_eq!(translator.scope(), "Main.run");
}

#[test]
fn test_if_goto_policy() {
    let command = Command::Branch(BranchKind::IfGoto, "L".to_string());
    let (nonzero, _) = Translator::new("Main", plain())
        .translate_command(&command, Counter::default())
        .unwrap();
    assert_eq!(nonzero.last().map(String::as_str), Some("D;JNE"));

    let positive = Options {
        truthiness: Truthiness::Positive,
        ..plain()
    };
    let (strict, _) = Translator::new("Main", positive)
        .translate_command(&command, Counter::default())
        .unwrap();
    assert_eq!(strict.last().map(String::as_str), Some("D;JGT"));
}

#[test]
fn test_translate_threads_counter() {
    let commands = vec![
        Command::Memory(Direction::Push, Segment::Constant, 1),
        Command::Memory(Direction::Push, Segment::Constant, 2),
        Command::Comparison(ComparisonOp::Lt),
        Command::Call("Main.f".to_string(), 1),
    ];
    let (out, next) = Translator::new("Main", plain())
        .translate(&commands, Counter::new(10))
        .unwrap();
    assert_eq!(next.value(), 14);
    assert!(out.contains(&"(LT_TRUE_12)".to_string()));
    assert!(out.contains(&"(Main$ret.13)".to_string()));
}

#[test]
fn test_arithmetic_comps() {
    let cases = [
        (ArithmeticOp::Add, "M=D+M"),
        (ArithmeticOp::Sub, "M=M-D"),
        (ArithmeticOp::And, "M=D&M"),
        (ArithmeticOp::Or, "M=D|M"),
        (ArithmeticOp::Not, "M=!M"),
        (ArithmeticOp::Neg, "M=-M"),
    ];
    for (op, comp) in cases {
        let (out, _) = Translator::new("Main", plain())
            .translate_command(&Command::Arithmetic(op), Counter::default())
            .unwrap();
        assert_eq!(out.last().map(String::as_str), Some(comp));
        assert_eq!(out.len(), if op.is_unary() { 3 } else { 5 });
    }
}

#[test]
fn test_out_of_range_operands_rejected() {
    let commands = [
        Command::Memory(Direction::Push, Segment::Temp, 65535),
        Command::Memory(Direction::Pop, Segment::Temp, 32765),
        Command::Memory(Direction::Push, Segment::Constant, 40000),
        Command::Memory(Direction::Push, Segment::Local, 32768),
        Command::Call("F".to_string(), 65534),
        Command::Call("F".to_string(), 32763),
    ];
    for command in &commands {
        let err = Translator::new("Main", plain())
            .translate_command(command, Counter::default())
            .unwrap_err();
        assert!(
            matches!(err, CommandError::MalformedOperand { .. }),
            "{command}: {err:?}"
        );
    }

    let (edge, _) = Translator::new("Main", plain())
        .translate_command(&Command::Call("F".to_string(), 32762), Counter::default())
        .unwrap();
    assert!(edge.contains(&"@32767".to_string()));
}

#[test]
fn test_user_label_cannot_shadow_return_label() {
    let commands = vec![
        Command::Branch(BranchKind::Label, "ret.1".to_string()),
        Command::Call("Main.f".to_string(), 0),
    ];
    let (out, _) = Translator::new("Main", plain())
        .translate(&commands, Counter::new(0))
        .unwrap();
    let declared: Vec<_> = out.iter().filter(|l| l.starts_with('(')).collect();
    assert_eq!(declared, vec!["(Main:LABEL_ret.1)", "(Main$ret.1)"]);
}
