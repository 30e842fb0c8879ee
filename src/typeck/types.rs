use serde::Serialize;

/// Leaf of the asm.js value-type lattice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Extern,
    Intish,
    Doublish,
    Unknown,
    Int,
    Double,
    Signed,
    Unsigned,
    /// Integer literals in `[-2^31, 2^32)`; valid as both signed and unsigned.
    Fixnum,
    /// Result-only: functions that return nothing.
    Void,
    Boolish,
    /// Comparison results.
    Bit,
}

impl ValueType {
    pub const ALL: [ValueType; 12] = [
        ValueType::Extern,
        ValueType::Intish,
        ValueType::Doublish,
        ValueType::Unknown,
        ValueType::Int,
        ValueType::Double,
        ValueType::Signed,
        ValueType::Unsigned,
        ValueType::Fixnum,
        ValueType::Void,
        ValueType::Boolish,
        ValueType::Bit,
    ];

    /// Immediate supertypes. The graph is acyclic, so `subtype` terminates.
    pub fn supertypes(self) -> &'static [ValueType] {
        use ValueType::*;
        match self {
            Extern | Intish | Doublish | Void | Boolish => &[],
            Unknown => &[Intish, Doublish],
            Int => &[Intish, Boolish],
            Double => &[Extern, Doublish],
            Signed | Unsigned => &[Extern, Int],
            Fixnum => &[Signed, Unsigned],
            Bit => &[Int],
        }
    }

    /// Reflexive-transitive closure over `supertypes`.
    pub fn subtype(self, other: ValueType) -> bool {
        self == other || self.supertypes().iter().any(|sup| sup.subtype(other))
    }

    /// Types an expression may have; `Void` only ever appears as a result.
    pub fn is_expression_type(self) -> bool {
        self != ValueType::Void
    }
}

impl std::fmt::Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ValueType::Extern => "extern",
            ValueType::Intish => "intish",
            ValueType::Doublish => "doublish",
            ValueType::Unknown => "unknown",
            ValueType::Int => "int",
            ValueType::Double => "double",
            ValueType::Signed => "signed",
            ValueType::Unsigned => "unsigned",
            ValueType::Fixnum => "fixnum",
            ValueType::Void => "void",
            ValueType::Boolish => "boolish",
            ValueType::Bit => "bit",
        };
        f.write_str(name)
    }
}

/// Function signature.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Arrow {
    pub params: Vec<ValueType>,
    pub result: ValueType,
}

impl Arrow {
    pub fn new(params: Vec<ValueType>, result: ValueType) -> Self {
        Self { params, result }
    }

    /// Every argument type subtypes the corresponding parameter, arity included.
    pub fn accepts(&self, args: &[ValueType]) -> bool {
        self.params.len() == args.len()
            && args.iter().zip(&self.params).all(|(a, p)| a.subtype(*p))
    }
}

impl std::fmt::Display for Arrow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(")?;
        for (i, p) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{p}")?;
        }
        write!(f, ") -> {}", self.result)
    }
}

/// Library function or operator with several signatures, tried in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Overloaded {
    pub alts: Vec<Arrow>,
}

impl Overloaded {
    pub fn new(alts: Vec<Arrow>) -> Self {
        Self { alts }
    }

    /// First alternative accepting `args`, in declared order.
    pub fn resolve(&self, args: &[ValueType]) -> Option<&Arrow> {
        self.alts.iter().find(|alt| alt.accepts(args))
    }
}

impl std::fmt::Display for Overloaded {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, alt) in self.alts.iter().enumerate() {
            if i > 0 {
                write!(f, " & ")?;
            }
            write!(f, "{alt}")?;
        }
        Ok(())
    }
}

/// Typed window over the heap buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct View {
    /// Element width in bytes: 1, 2, 4 or 8.
    pub bytes: u8,
    /// `Intish` or `Doublish`.
    pub elem: ValueType,
}

impl View {
    pub fn new(bytes: u8, elem: ValueType) -> Self {
        Self { bytes, elem }
    }

    /// Shift an address must be scaled by: `log2(bytes)`.
    pub fn shift(&self) -> u32 {
        u32::from(self.bytes).trailing_zeros()
    }
}

impl std::fmt::Display for View {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "view<{}, {}>", self.bytes, self.elem)
    }
}

/// Function-pointer table; every entry has exactly `arrow`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Table {
    pub arrow: Arrow,
    pub length: u32,
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "table<{}, {}>", self.arrow, self.length)
    }
}

/// Anything a name can be bound to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Type {
    Value(ValueType),
    Arrow(Arrow),
    Overloaded(Overloaded),
    View(View),
    Table(Table),
    /// One of the module's `stdlib`, `foreign` or `heap` parameters.
    ModuleParameter,
    /// Foreign import; typed at each call site.
    Function,
}

impl Type {
    pub fn as_value(&self) -> Option<ValueType> {
        match self {
            Type::Value(t) => Some(*t),
            _ => None,
        }
    }

    pub fn as_arrow(&self) -> Option<&Arrow> {
        match self {
            Type::Arrow(a) => Some(a),
            _ => None,
        }
    }
}

impl From<ValueType> for Type {
    fn from(t: ValueType) -> Self {
        Type::Value(t)
    }
}

impl From<Arrow> for Type {
    fn from(a: Arrow) -> Self {
        Type::Arrow(a)
    }
}

impl std::fmt::Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Type::Value(t) => write!(f, "{t}"),
            Type::Arrow(a) => write!(f, "{a}"),
            Type::Overloaded(o) => write!(f, "{o}"),
            Type::View(v) => write!(f, "{v}"),
            Type::Table(t) => write!(f, "{t}"),
            Type::ModuleParameter => write!(f, "module parameter"),
            Type::Function => write!(f, "foreign function"),
        }
    }
}
