use nom::{
    branch::alt,
    bytes::complete::{is_a, is_not, tag},
    character::{
        complete::{digit1, space1},
        is_digit,
    },
    combinator::{all_consuming, map, map_res, value, verify},
    sequence::{preceded, separated_pair},
    IResult,
};

use crate::ast::{ArithmeticOp, BranchKind, Command, ComparisonOp, Direction, Segment};
use crate::error::{CommandError, MalformedOperandSnafu, UnknownCommandSnafu, UnsupportedSnafu};

/// Largest value a Hack A-instruction can load.
pub const MAX_CONSTANT: u16 = 0x7FFF;

fn integer(input: &str) -> IResult<&str, u16> {
    verify(map_res(digit1, |c: &str| c.parse()), |n: &u16| {
        *n <= MAX_CONSTANT
    })(input)
}

#[test]
fn test_integer() {
    assert_eq!(integer("32767"), Ok(("", 32767)));
    assert!(integer("32768").is_err());
    assert!(integer("-1").is_err());
}

fn segment(input: &str) -> IResult<&str, Segment> {
    alt((
        value(Segment::Constant, tag("constant")),
        value(Segment::Local, tag("local")),
        value(Segment::Static, tag("static")),
        value(Segment::Argument, tag("argument")),
        value(Segment::This, tag("this")),
        value(Segment::That, tag("that")),
        value(Segment::Pointer, tag("pointer")),
        value(Segment::Temp, tag("temp")),
    ))(input)
}

fn symbol(input: &str) -> IResult<&str, String> {
    map(
        verify(
            is_a("abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ_.$:0123456789"),
            |c: &str| !is_digit(c.as_bytes()[0]),
        ),
        |sym: &str| sym.to_string(),
    )(input)
}

#[test]
fn test_symbol() {
    assert_eq!(symbol("Main.loop$1"), Ok(("", "Main.loop$1".to_string())));
    assert!(symbol("1abc").is_err());
}

/// The leading whitespace-delimited word of a line.
fn mnemonic(input: &str) -> IResult<&str, &str> {
    is_not(" \t")(input)
}

fn arithmetic(word: &str) -> Option<ArithmeticOp> {
    match word {
        "add" => Some(ArithmeticOp::Add),
        "sub" => Some(ArithmeticOp::Sub),
        "and" => Some(ArithmeticOp::And),
        "or" => Some(ArithmeticOp::Or),
        "not" => Some(ArithmeticOp::Not),
        "neg" => Some(ArithmeticOp::Neg),
        _ => None,
    }
}

fn comparison(word: &str) -> Option<ComparisonOp> {
    match word {
        "eq" => Some(ComparisonOp::Eq),
        "gt" => Some(ComparisonOp::Gt),
        "lt" => Some(ComparisonOp::Lt),
        _ => None,
    }
}

/// Run `parser` over everything after the mnemonic, demanding it consume the rest.
fn operands<'a, O, P>(rest: &'a str, parser: P, usage: &str) -> Result<O, CommandError>
where
    P: FnMut(&'a str) -> IResult<&'a str, O>,
{
    all_consuming(preceded(space1, parser))(rest)
        .map(|(_, out)| out)
        .map_err(|_| {
            MalformedOperandSnafu {
                reason: format!("expected `{usage}`"),
            }
            .build()
        })
}

fn no_operands(word: &str, rest: &str) -> Result<(), CommandError> {
    if rest.is_empty() {
        Ok(())
    } else {
        MalformedOperandSnafu {
            reason: format!("`{word}` takes no operands"),
        }
        .fail()
    }
}

fn memory(direction: Direction, word: &str, rest: &str) -> Result<Command, CommandError> {
    let usage = format!("{word} <segment> <index>");
    let (seg, arg) = operands(rest, separated_pair(segment, space1, integer), &usage)?;
    match (direction, seg, arg) {
        (Direction::Pop, Segment::Constant, _) => UnsupportedSnafu {
            reason: "constant is not an addressable destination",
        }
        .fail(),
        (_, Segment::Pointer, arg) if arg > 1 => MalformedOperandSnafu {
            reason: format!("pointer index must be 0 or 1, got {arg}"),
        }
        .fail(),
        _ => Ok(Command::Memory(direction, seg, arg)),
    }
}

fn branch(kind: BranchKind, rest: &str) -> Result<Command, CommandError> {
    let usage = format!("{} <label>", kind.name());
    let label = operands(rest, symbol, &usage)?;
    Ok(Command::Branch(kind, label))
}

fn named_count(word: &str, rest: &str) -> Result<(String, u16), CommandError> {
    let usage = format!("{word} <name> <count>");
    operands(rest, separated_pair(symbol, space1, integer), &usage)
}

/// Parse one cleaned line into a [`Command`].
pub fn parse_command(line: &str) -> Result<Command, CommandError> {
    let line = line.trim();
    let (rest, word) = mnemonic(line).map_err(|_| {
        MalformedOperandSnafu {
            reason: "empty command",
        }
        .build()
    })?;

    if let Some(op) = arithmetic(word) {
        no_operands(word, rest)?;
        return Ok(Command::Arithmetic(op));
    }
    if let Some(op) = comparison(word) {
        no_operands(word, rest)?;
        return Ok(Command::Comparison(op));
    }

    match word {
        "push" => memory(Direction::Push, word, rest),
        "pop" => memory(Direction::Pop, word, rest),
        "label" => branch(BranchKind::Label, rest),
        "goto" => branch(BranchKind::Goto, rest),
        "if-goto" => branch(BranchKind::IfGoto, rest),
        "function" => named_count(word, rest).map(|(name, locals)| Command::Function(name, locals)),
        "call" => named_count(word, rest).map(|(name, args)| Command::Call(name, args)),
        "return" => no_operands(word, rest).map(|_| Command::Return),
        _ => UnknownCommandSnafu { word }.fail(),
    }
}

/// Strip comments and blank lines, keeping each survivor's 1-based line number.
pub fn clean_lines(input: &str) -> impl Iterator<Item = (usize, &str)> {
    input.lines().enumerate().filter_map(|(idx, line)| {
        let line = line.split_once("//").map(|(s, _)| s).unwrap_or(line).trim();
        if line.is_empty() {
            None
        } else {
            Some((idx + 1, line))
        }
    })
}

#[test]
fn test_push() {
    assert_eq!(
        parse_command("push  pointer  1"),
        Ok(Command::Memory(Direction::Push, Segment::Pointer, 1))
    );
    assert_eq!(
        parse_command("push constant 7"),
        Ok(Command::Memory(Direction::Push, Segment::Constant, 7))
    );
}

#[test]
fn test_pop() {
    assert_eq!(
        parse_command("pop\tlocal 2"),
        Ok(Command::Memory(Direction::Pop, Segment::Local, 2))
    );
    assert!(matches!(
        parse_command("pop constant 3"),
        Err(CommandError::Unsupported { .. })
    ));
}

#[test]
fn test_prim() {
    assert_eq!(parse_command("neg"), Ok(Command::Arithmetic(ArithmeticOp::Neg)));
    assert_eq!(parse_command("lt"), Ok(Command::Comparison(ComparisonOp::Lt)));
    assert!(matches!(
        parse_command("add 1"),
        Err(CommandError::MalformedOperand { .. })
    ));
}

#[test]
fn test_branching() {
    assert_eq!(
        parse_command("if-goto LOOP_START"),
        Ok(Command::Branch(BranchKind::IfGoto, "LOOP_START".to_string()))
    );
    assert!(matches!(
        parse_command("goto"),
        Err(CommandError::MalformedOperand { .. })
    ));
}

#[test]
fn test_functions() {
    assert_eq!(
        parse_command("function Main.fibonacci 2"),
        Ok(Command::Function("Main.fibonacci".to_string(), 2))
    );
    assert_eq!(
        parse_command("call Math.multiply 2"),
        Ok(Command::Call("Math.multiply".to_string(), 2))
    );
    assert_eq!(parse_command("return"), Ok(Command::Return));
    assert!(matches!(
        parse_command("function Main.main x"),
        Err(CommandError::MalformedOperand { .. })
    ));
}

#[test]
fn test_rejects() {
    assert_eq!(
        parse_command("jump here"),
        Err(CommandError::UnknownCommand {
            word: "jump".to_string()
        })
    );
    assert!(matches!(
        parse_command("push pointer 2"),
        Err(CommandError::MalformedOperand { .. })
    ));
    assert!(matches!(
        parse_command("push heap 2"),
        Err(CommandError::MalformedOperand { .. })
    ));
    assert!(matches!(
        parse_command("push local 2 3"),
        Err(CommandError::MalformedOperand { .. })
    ));
}

#[test]
fn test_clean_lines() {
    let source = "// header\n\npush constant 1 // one\n   \n  add\n";
    let lines: Vec<_> = clean_lines(source).collect();
    assert_eq!(lines, vec![(3, "push constant 1"), (5, "add")]);
}
