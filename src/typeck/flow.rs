use std::collections::BTreeSet;

/// Where a `break` or `continue` transfers control.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Target {
    /// Innermost enclosing loop or switch, via `break`.
    Anonymous,
    /// Innermost enclosing loop, via `continue`.
    Continue,
    Label(String),
}

/// Control outcome of a statement: every path returns, or the set of break
/// targets control can leave through. An empty set means the statement
/// completes normally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flow {
    Return,
    Breaks(BTreeSet<Target>),
}

impl Flow {
    pub fn fallthrough() -> Self {
        Flow::Breaks(BTreeSet::new())
    }

    pub fn break_to(target: Target) -> Self {
        Flow::Breaks(BTreeSet::from([target]))
    }

    pub fn is_return(&self) -> bool {
        matches!(self, Flow::Return)
    }

    pub fn targets(&self) -> Option<&BTreeSet<Target>> {
        match self {
            Flow::Return => None,
            Flow::Breaks(targets) => Some(targets),
        }
    }

    /// Outcome of either `self` or `other` running.
    pub fn union(self, other: Flow) -> Flow {
        match (self, other) {
            (Flow::Return, other) | (other, Flow::Return) => other,
            (Flow::Breaks(mut a), Flow::Breaks(b)) => {
                a.extend(b);
                Flow::Breaks(a)
            }
        }
    }

    /// Drop `target` once control reaches the construct it names.
    pub fn without(self, target: &Target) -> Flow {
        match self {
            Flow::Return => Flow::Return,
            Flow::Breaks(mut targets) => {
                targets.remove(target);
                Flow::Breaks(targets)
            }
        }
    }
}

/// Sequential composition of statement outcomes.
#[derive(Debug, Default)]
pub struct Sequence {
    escaped: BTreeSet<Target>,
    returned: bool,
}

impl Sequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the next statement. Statements after a `return` are
    /// unreachable and do not change the outcome.
    pub fn push(&mut self, flow: Flow) {
        if self.returned {
            return;
        }
        match flow {
            Flow::Return => self.returned = true,
            Flow::Breaks(targets) => self.escaped.extend(targets),
        }
    }

    /// `Return` only when a return is reached without any earlier break
    /// leaving the sequence.
    pub fn finish(self) -> Flow {
        if self.returned && self.escaped.is_empty() {
            Flow::Return
        } else {
            Flow::Breaks(self.escaped)
        }
    }
}

/// Enclosing construct a `break` or `continue` can name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub target: Target,
    pub is_loop: bool,
}
