use std::fmt;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Segment {
    Constant,
    Local,
    Static,
    Argument,
    This,
    That,
    Pointer,
    Temp,
}

impl Segment {
    pub fn name(self) -> &'static str {
        match self {
            Segment::Constant => "constant",
            Segment::Local => "local",
            Segment::Static => "static",
            Segment::Argument => "argument",
            Segment::This => "this",
            Segment::That => "that",
            Segment::Pointer => "pointer",
            Segment::Temp => "temp",
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ArithmeticOp {
    Add,
    Sub,
    And,
    Or,
    Not,
    Neg,
}

impl ArithmeticOp {
    /// Hack instruction that applies the op to `M`, with the top operand in D
    /// for binary ops.
    pub fn comp(self) -> &'static str {
        match self {
            ArithmeticOp::Add => "M=D+M",
            ArithmeticOp::Sub => "M=M-D",
            ArithmeticOp::And => "M=D&M",
            ArithmeticOp::Or => "M=D|M",
            ArithmeticOp::Not => "M=!M",
            ArithmeticOp::Neg => "M=-M",
        }
    }

    pub fn is_unary(self) -> bool {
        match self {
            ArithmeticOp::Not | ArithmeticOp::Neg => true,
            ArithmeticOp::Add | ArithmeticOp::Sub | ArithmeticOp::And | ArithmeticOp::Or => {
                false
            }
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ArithmeticOp::Add => "add",
            ArithmeticOp::Sub => "sub",
            ArithmeticOp::And => "and",
            ArithmeticOp::Or => "or",
            ArithmeticOp::Not => "not",
            ArithmeticOp::Neg => "neg",
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum ComparisonOp {
    Eq,
    Gt,
    Lt,
}

impl ComparisonOp {
    pub fn name(self) -> &'static str {
        match self {
            ComparisonOp::Eq => "eq",
            ComparisonOp::Gt => "gt",
            ComparisonOp::Lt => "lt",
        }
    }

    /// Hack jump mnemonic taken when `second - top` satisfies the comparison.
    pub fn jump(self) -> &'static str {
        match self {
            ComparisonOp::Eq => "JEQ",
            ComparisonOp::Gt => "JGT",
            ComparisonOp::Lt => "JLT",
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Direction {
    Push,
    Pop,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum BranchKind {
    Label,
    Goto,
    IfGoto,
}

impl BranchKind {
    pub fn name(self) -> &'static str {
        match self {
            BranchKind::Label => "label",
            BranchKind::Goto => "goto",
            BranchKind::IfGoto => "if-goto",
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Command {
    // Stack Basics
    Arithmetic(ArithmeticOp),
    Comparison(ComparisonOp),
    Memory(Direction, Segment, u16),

    // Control
    Branch(BranchKind, String),

    // Functions
    Function(String, u16),
    Call(String, u16),
    Return,
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Arithmetic(op) => f.write_str(op.name()),
            Command::Comparison(op) => f.write_str(op.name()),
            Command::Memory(Direction::Push, seg, arg) => write!(f, "push {} {}", seg.name(), arg),
            Command::Memory(Direction::Pop, seg, arg) => write!(f, "pop {} {}", seg.name(), arg),
            Command::Branch(kind, label) => write!(f, "{} {}", kind.name(), label),
            Command::Function(name, locals) => write!(f, "function {} {}", name, locals),
            Command::Call(name, args) => write!(f, "call {} {}", name, args),
            Command::Return => f.write_str("return"),
        }
    }
}

#[test]
fn test_display() {
    assert_eq!(
        Command::Memory(Direction::Pop, Segment::That, 3).to_string(),
        "pop that 3"
    );
    assert_eq!(
        Command::Branch(BranchKind::IfGoto, "LOOP".to_string()).to_string(),
        "if-goto LOOP"
    );
}
