//! Fixed catalogs: the standard library surface, heap view constructors and
//! operator signatures.

use crate::ast::{BinaryOp, UnaryOp};

use super::types::{Arrow, Overloaded, Type, ValueType, View};
use ValueType::*;

fn arrow(params: &[ValueType], result: ValueType) -> Arrow {
    Arrow::new(params.to_vec(), result)
}

fn overloaded(alts: &[(&[ValueType], ValueType)]) -> Overloaded {
    Overloaded::new(alts.iter().map(|(params, result)| arrow(params, *result)).collect())
}

/// Type of `stdlib.Math.<name>`.
pub fn math(name: &str) -> Option<Type> {
    let ty = match name {
        "acos" | "asin" | "atan" | "cos" | "sin" | "tan" | "ceil" | "floor" | "exp" | "log"
        | "sqrt" => Type::Arrow(arrow(&[Doublish], Double)),
        "abs" => Type::Overloaded(overloaded(&[(&[Signed], Unsigned), (&[Doublish], Double)])),
        "atan2" | "pow" => Type::Arrow(arrow(&[Doublish, Doublish], Double)),
        "imul" => Type::Arrow(arrow(&[Int, Int], Signed)),
        "min" | "max" => Type::Overloaded(overloaded(&[
            (&[Signed, Signed], Signed),
            (&[Double, Double], Double),
        ])),
        "E" | "LN10" | "LN2" | "LOG2E" | "LOG10E" | "PI" | "SQRT1_2" | "SQRT2" => {
            Type::Value(Double)
        }
        _ => return None,
    };
    Some(ty)
}

/// Type of `stdlib.<name>` for the global constants.
pub fn stdlib_constant(name: &str) -> Option<Type> {
    match name {
        "Infinity" | "NaN" => Some(Type::Value(Double)),
        _ => None,
    }
}

/// Heap view built by `new stdlib.<name>(heap)`.
pub fn view_constructor(name: &str) -> Option<View> {
    let view = match name {
        "Int8Array" | "Uint8Array" => View::new(1, Intish),
        "Int16Array" | "Uint16Array" => View::new(2, Intish),
        "Int32Array" | "Uint32Array" => View::new(4, Intish),
        "Float32Array" => View::new(4, Doublish),
        "Float64Array" => View::new(8, Doublish),
        _ => return None,
    };
    Some(view)
}

/// Signature of a binary operator; `None` for operators outside asm.js.
pub fn binary(op: BinaryOp) -> Option<Overloaded> {
    let sig = match op {
        BinaryOp::Add => overloaded(&[(&[Int, Int], Intish), (&[Double, Double], Double)]),
        BinaryOp::Sub => overloaded(&[(&[Int, Int], Intish), (&[Doublish, Doublish], Double)]),
        BinaryOp::Mul => overloaded(&[(&[Doublish, Doublish], Double)]),
        BinaryOp::Div | BinaryOp::Mod => overloaded(&[
            (&[Signed, Signed], Intish),
            (&[Unsigned, Unsigned], Intish),
            (&[Doublish, Doublish], Double),
        ]),
        BinaryOp::BitOr | BinaryOp::BitAnd | BinaryOp::BitXor | BinaryOp::Shl | BinaryOp::Shr => {
            overloaded(&[(&[Intish, Intish], Signed)])
        }
        BinaryOp::UShr => overloaded(&[(&[Intish, Intish], Unsigned)]),
        BinaryOp::Lt
        | BinaryOp::LtEq
        | BinaryOp::Gt
        | BinaryOp::GtEq
        | BinaryOp::Eq
        | BinaryOp::NotEq => overloaded(&[
            (&[Signed, Signed], Bit),
            (&[Unsigned, Unsigned], Bit),
            (&[Double, Double], Bit),
        ]),
        BinaryOp::StrictEq | BinaryOp::StrictNotEq | BinaryOp::In | BinaryOp::InstanceOf => {
            return None;
        }
    };
    Some(sig)
}

/// Signature of a unary operator; `None` for operators outside asm.js.
pub fn unary(op: UnaryOp) -> Option<Overloaded> {
    let sig = match op {
        UnaryOp::Plus => overloaded(&[
            (&[Signed], Double),
            (&[Unsigned], Double),
            (&[Doublish], Double),
        ]),
        UnaryOp::Minus => overloaded(&[(&[Int], Intish), (&[Doublish], Double)]),
        UnaryOp::BitNot => overloaded(&[(&[Intish], Signed)]),
        UnaryOp::Not => overloaded(&[(&[Int], Bit)]),
        UnaryOp::TypeOf | UnaryOp::Void | UnaryOp::Delete => return None,
    };
    Some(sig)
}
