//! # Expression compiler and evaluator
//!
//! An expression is compiled into a compact postfix program first, then the
//! program may be evaluated any number of times. Compilation is a single
//! shunting-yard pass over the text that validates the grammar as it goes;
//! evaluation runs the program on a pre-sized value stack and cannot fail:
//! whatever compiles evaluates to an `f64`, possibly infinite or NaN under
//! the usual floating-point rules.
//!
//! The expression may contain:
//! * Floating point numbers: `2`, `.5`, `1e-2`
//! * Variables, passed as a slice of [`Var`] bindings
//! * `+` and `-`, both unary and binary
//! * `*` and `/`
//! * Any correct sequence of parentheses
//! * One- and two-argument math function calls: `max(sin(x), 0)`
//!
//! The list of supported functions:
//! * absolute value: abs
//! * exponential and logarithmic: exp, exp2, log, log10
//! * power: sqrt, cbrt, hypot, pow
//! * trigonometric: sin, cos, tan, asin, acos, atan, atan2
//! * hyperbolic: sinh, cosh, tanh, asinh, acosh, atanh
//! * error and gamma: erf, erfc, lgamma, tgamma
//! * nearest integer: ceil, floor, trunc, round
//! * remainders: mod, rem
//! * minimum and maximum: min, max
//!
//! Trigonometric functions and their inverses read the angle unit (degrees,
//! radians or gradians) from the evaluation context at evaluation time, so
//! one compiled program gives different results under different units
//! without recompiling.
//!
//! A variable named like a function is possible but utterly confusing: the
//! function wins whenever the name is directly followed by `(`.
//!
//! ```
//! use fastexpr::{compile, Ctx, Var};
//!
//! let vars = vec![Var::new("x", 2.0)];
//! let expr = compile("max(x*3, 5) + 1", &vars).unwrap();
//!
//! let ctx = Ctx::default();
//! assert_eq!(expr.eval(&ctx), 7.0);
//!
//! // bindings can change between evaluations without recompiling
//! vars[0].set(0.5);
//! assert_eq!(expr.eval(&ctx), 6.0);
//! ```
//!
//! Compile-time errors carry the byte offset of the offending character, so
//! a front-end can point straight at it:
//!
//! ```
//! use fastexpr::{compile, ErrorKind};
//!
//! let err = compile("2*(3", &[]).unwrap_err();
//! assert_eq!(err.kind, ErrorKind::UnmatchedParenthesis);
//! assert_eq!(err.pos, 4);
//! assert_eq!(format!("{}", err), "4: Unmatched parenthesis");
//! ```

pub mod errors;
pub mod funcs;
pub mod parse;
pub mod stack;

use std::cell::Cell;

pub use crate::errors::{ErrorKind, ExprError};
pub use crate::funcs::{AngleUnit, Ctx};
pub use crate::parse::compile;
pub use crate::stack::Expr;

/// A named variable binding.
///
/// Compiled expressions reference bindings by index into the caller-owned
/// slice and read them at evaluation time. The value slot is a `Cell`, so
/// the host can store a new value (say, the previous result) through the
/// same shared borrow a compiled expression holds; the next evaluation
/// picks it up. That also means an [`Expr`] is not `Sync` - evaluating one
/// program from several threads would need external synchronization anyway.
#[derive(Debug)]
pub struct Var {
    name: String,
    val: Cell<f64>,
}

impl Var {
    pub fn new(name: &str, val: f64) -> Self {
        Var {
            name: name.to_string(),
            val: Cell::new(val),
        }
    }

    /// Binding name, matched case-sensitively during compilation.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current value.
    pub fn value(&self) -> f64 {
        self.val.get()
    }

    /// Stores a new value; the next evaluation observes it.
    pub fn set(&self, val: f64) {
        self.val.set(val)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_var() {
        let v = Var::new("ans", 1.5);
        assert_eq!(v.name(), "ans");
        assert_eq!(v.value(), 1.5);
        v.set(-2.0);
        assert_eq!(v.value(), -2.0);
    }
}
