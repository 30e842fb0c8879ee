use serde::{Deserialize, Deserializer, Serialize};

/// A point in the source text. Lines are 1-based, columns are 0-based
/// code-point offsets within the line (the ESTree `loc` convention).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

/// Source region covered by a syntax node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Span on a single line, from `start_col` up to (not including) `end_col`.
    pub fn line(line: u32, start_col: u32, end_col: u32) -> Self {
        Self {
            start: Position::new(line, start_col),
            end: Position::new(line, end_col),
        }
    }

    pub fn dummy() -> Self {
        Self::default()
    }

    /// Trees built without location information carry a zero span.
    pub fn is_dummy(&self) -> bool {
        self.start.line == 0
    }

    /// Code-point offset of `pos` within `source`, if the line exists.
    pub fn char_offset(source: &str, pos: Position) -> Option<usize> {
        if pos.line == 0 {
            return None;
        }
        let mut offset = 0;
        for (i, line) in source.split('\n').enumerate() {
            if i + 1 == pos.line as usize {
                let len = line.chars().count();
                return Some(offset + (pos.column as usize).min(len));
            }
            offset += line.chars().count() + 1;
        }
        None
    }

    /// The `start`..`end` range as code-point offsets into `source`.
    pub fn char_range(&self, source: &str) -> Option<std::ops::Range<usize>> {
        let start = Self::char_offset(source, self.start)?;
        let end = Self::char_offset(source, self.end).unwrap_or(start).max(start);
        Some(start..end)
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}-{}:{}",
            self.start.line, self.start.column, self.end.line, self.end.column
        )
    }
}

/// A syntax node annotated with its source span. In ESTree JSON the span is
/// the node's `loc` member and the node's own fields sit beside it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Spanned<T> {
    #[serde(flatten)]
    pub node: T,
    #[serde(rename = "loc")]
    pub span: Span,
}

/// Remaining stack below which decoding a node moves to a fresh segment.
const RED_ZONE: usize = 64 * 1024;
const STACK_SEGMENT: usize = 2 * 1024 * 1024;

#[derive(Deserialize)]
struct Located<T> {
    #[serde(flatten)]
    node: T,
    #[serde(rename = "loc", default)]
    span: Span,
}

// Expression trees nest one level per operand, so decoding grows the stack
// on demand instead of overflowing on long operator chains.
impl<'de, T: Deserialize<'de>> Deserialize<'de> for Spanned<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        stacker::maybe_grow(RED_ZONE, STACK_SEGMENT, || {
            Located::deserialize(deserializer).map(|located| Spanned::new(located.node, located.span))
        })
    }
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }

    pub fn dummy(node: T) -> Self {
        Self { node, span: Span::dummy() }
    }

    pub fn as_ref(&self) -> Spanned<&T> {
        Spanned { node: &self.node, span: self.span }
    }
}
