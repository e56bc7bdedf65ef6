//! Structured assembly labels and the per-command ordinal that keeps them unique.

use std::fmt;

use crate::ast::ComparisonOp;

/// Running ordinal shared by every command of a program.
///
/// The driver owns the only live instance and threads it through each
/// translation call; nothing in the translator stores one.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Counter(u64);

impl Counter {
    pub fn new(start: u64) -> Self {
        Counter(start)
    }

    pub fn value(self) -> u64 {
        self.0
    }

    #[must_use]
    pub fn next(self) -> Self {
        Counter(self.0 + 1)
    }
}

impl fmt::Display for Counter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareTarget {
    True,
    End,
}

/// A symbolic jump target, rendered to text only when emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Label<'a> {
    /// Entry point of a VM function.
    Function(&'a str),
    /// A `label` declared in VM code, scoped to the enclosing function.
    /// The `:LABEL_` marker keeps these apart from generated return labels.
    Scoped { scope: &'a str, name: &'a str },
    /// One of the two targets of a comparison.
    Compare {
        op: ComparisonOp,
        target: CompareTarget,
        ordinal: Counter,
    },
    /// Where a `call` resumes once the callee returns.
    Return { scope: &'a str, ordinal: Counter },
}

impl<'a> Label<'a> {
    /// `(LABEL)` declaration line.
    pub fn declare(&self) -> String {
        format!("({})", self)
    }

    /// `@LABEL` load line.
    pub fn load(&self) -> String {
        format!("@{}", self)
    }
}

impl fmt::Display for Label<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Function(name) => f.write_str(name),
            Label::Scoped { scope, name } => write!(f, "{}:LABEL_{}", scope, name),
            Label::Compare {
                op,
                target,
                ordinal,
            } => {
                let target = match target {
                    CompareTarget::True => "TRUE",
                    CompareTarget::End => "END",
                };
                write!(f, "{}_{}_{}", op.name().to_uppercase(), target, ordinal)
            }
            Label::Return { scope, ordinal } => write!(f, "{}$ret.{}", scope, ordinal),
        }
    }
}

/// The true/end pair used by a comparison at `ordinal`.
pub fn compare_pair(op: ComparisonOp, ordinal: Counter) -> (Label<'static>, Label<'static>) {
    (
        Label::Compare {
            op,
            target: CompareTarget::True,
            ordinal,
        },
        Label::Compare {
            op,
            target: CompareTarget::End,
            ordinal,
        },
    )
}

#[test]
fn test_render() {
    let (t, e) = compare_pair(ComparisonOp::Gt, Counter::new(12));
    assert_eq!(t.declare(), "(GT_TRUE_12)");
    assert_eq!(e.load(), "@GT_END_12");
    assert_eq!(
        Label::Scoped {
            scope: "Main.loop",
            name: "END"
        }
        .to_string(),
        "Main.loop:LABEL_END"
    );
    assert_eq!(
        Label::Return {
            scope: "Main.main",
            ordinal: Counter::new(3)
        }
        .to_string(),
        "Main.main$ret.3"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn any_op() -> impl Strategy<Value = ComparisonOp> {
        prop_oneof![
            Just(ComparisonOp::Eq),
            Just(ComparisonOp::Gt),
            Just(ComparisonOp::Lt),
        ]
    }

    proptest! {
        #[test]
        fn compare_labels_never_collide(
            a in any::<u32>(),
            b in any::<u32>(),
            op_a in any_op(),
            op_b in any_op(),
        ) {
            prop_assume!(a != b);
            let (ta, ea) = compare_pair(op_a, Counter::new(a.into()));
            let (tb, eb) = compare_pair(op_b, Counter::new(b.into()));
            let names = [ta.to_string(), ea.to_string(), tb.to_string(), eb.to_string()];
            for i in 0..names.len() {
                for j in (i + 1)..names.len() {
                    prop_assert_ne!(&names[i], &names[j]);
                }
            }
        }

        #[test]
        fn compare_labels_are_reproducible(n in any::<u64>(), op in any_op()) {
            let first = compare_pair(op, Counter::new(n));
            let second = compare_pair(op, Counter::new(n));
            prop_assert_eq!(first.0.to_string(), second.0.to_string());
            prop_assert_eq!(first.1.to_string(), second.1.to_string());
        }
    }
}
