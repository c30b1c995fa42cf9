use std::fmt;
use std::str;

use crate::funcs::{Ctx, Func1, Func2};
use crate::Var;

/// One instruction of a compiled postfix program.
///
/// Compile-time-only markers (parentheses, argument separators, function
/// markers waiting for their closing parenthesis) live on the compiler's
/// operator stack and have no representation here, so a compiled program
/// cannot contain them by construction.
#[derive(Clone, Copy, PartialEq, Debug)]
pub(crate) enum Elem {
    /// End of program
    End,
    /// Push a literal
    Num(f64),
    /// Negate the top of the stack
    Neg,
    Mul,
    Div,
    Add,
    Sub,
    /// Push the current value of the n-th variable binding
    Var(usize),
    Fn1(Func1),
    Fn2(Func2),
}

/// Compiled expression: a postfix program plus a borrow of the variable
/// bindings it was compiled against.
///
/// The program never owns variable storage; the caller-owned slice must
/// outlive every evaluation. Mutating a binding with [`Var::set`] between
/// two evaluations is observed by the next [`Expr::eval`] call without
/// recompiling. Dropping the `Expr` releases the program storage.
pub struct Expr<'a> {
    vars: &'a [Var],
    stack: usize,
    elems: Vec<Elem>,
}

const F64_BUF_LEN: usize = 48;
fn format_f64(g: f64) -> String {
    let mut buf = [b'\0'; F64_BUF_LEN];
    match dtoa::write(&mut buf[..], g) {
        Ok(len) => match str::from_utf8(&buf[..len]) {
            Ok(s) => s.to_string(),
            Err(..) => format!("{}", g),
        },
        Err(..) => format!("{}", g),
    }
}

// The deepest the evaluation stack gets while executing the program:
// values push one slot, binary operators and two-argument functions net
// one slot down, negation and one-argument functions stay level.
pub(crate) fn max_stack(elems: &[Elem]) -> usize {
    let mut depth = 0usize;
    let mut max = 0usize;

    for e in elems {
        match e {
            Elem::Num(..) | Elem::Var(..) => depth += 1,
            Elem::Add | Elem::Sub | Elem::Mul | Elem::Div | Elem::Fn2(..) => depth -= 1,
            Elem::Neg | Elem::Fn1(..) | Elem::End => {}
        }
        if depth > max {
            max = depth;
        }
    }

    max
}

impl<'a> Expr<'a> {
    pub(crate) fn new(vars: &'a [Var], elems: Vec<Elem>) -> Self {
        let stack = max_stack(&elems);
        Expr { vars, stack, elems }
    }

    /// Maximum evaluation stack depth the program needs.
    pub fn stack_depth(&self) -> usize {
        self.stack
    }

    /// Executes the compiled program and returns the result.
    ///
    /// There is no failure path: every program accepted by the compiler
    /// evaluates to a float, possibly infinite or NaN under the usual IEEE
    /// rules (division by zero, `log` of a negative number and so on).
    ///
    /// Arguments of `sin`/`cos`/`tan` and results of `asin`/`acos`/`atan`
    /// and `atan2` are converted according to `ctx.angle_unit`, so one
    /// compiled program may be evaluated under different angle units.
    pub fn eval(&self, ctx: &Ctx) -> f64 {
        let unit = ctx.angle_unit;
        let mut buf = vec![0.0f64; self.stack];
        let mut s = 0usize;

        for e in &self.elems {
            match *e {
                Elem::Num(f) => {
                    buf[s] = f;
                    s += 1;
                }
                Elem::Var(idx) => {
                    buf[s] = self.vars[idx].value();
                    s += 1;
                }
                Elem::Neg => buf[s - 1] = -buf[s - 1],
                Elem::Add => {
                    buf[s - 2] += buf[s - 1];
                    s -= 1;
                }
                Elem::Sub => {
                    buf[s - 2] -= buf[s - 1];
                    s -= 1;
                }
                Elem::Mul => {
                    buf[s - 2] *= buf[s - 1];
                    s -= 1;
                }
                Elem::Div => {
                    buf[s - 2] /= buf[s - 1];
                    s -= 1;
                }
                Elem::Fn1(f) => {
                    let mut v = buf[s - 1];
                    if f.angle_in() {
                        v *= unit.factor();
                    }
                    let mut r = f.call(v);
                    if f.angle_out() {
                        r /= unit.factor();
                    }
                    buf[s - 1] = r;
                }
                Elem::Fn2(f) => {
                    let mut r = f.call(buf[s - 2], buf[s - 1]);
                    if f.angle_out() {
                        r /= unit.factor();
                    }
                    s -= 1;
                    buf[s - 1] = r;
                }
                Elem::End => break,
            }
        }

        buf[0]
    }

    /// Renders the compiled program for diagnostics, one element per word:
    /// literals and variable names as-is, operators and functions with
    /// their arity, e.g. `"1+2*x"` dumps as `"1.0 2.0 x *(2) +(2)"`.
    pub fn dump(&self) -> String {
        let mut words: Vec<String> = Vec::new();

        for e in &self.elems {
            match *e {
                Elem::End => break,
                Elem::Num(f) => words.push(format_f64(f)),
                Elem::Neg => words.push("-(1)".to_string()),
                Elem::Add => words.push("+(2)".to_string()),
                Elem::Sub => words.push("-(2)".to_string()),
                Elem::Mul => words.push("*(2)".to_string()),
                Elem::Div => words.push("/(2)".to_string()),
                Elem::Var(idx) => words.push(self.vars[idx].name().to_string()),
                Elem::Fn1(f) => words.push(format!("{}(1)", f.name())),
                Elem::Fn2(f) => words.push(format!("{}(2)", f.name())),
            }
        }

        words.join(" ")
    }
}

impl<'a> fmt::Debug for Expr<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Expr[{}]", self.dump())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::funcs::AngleUnit;

    #[test]
    fn test_max_stack() {
        // 1 2 3 * + -> 1+2*3
        let elems = vec![
            Elem::Num(1.0),
            Elem::Num(2.0),
            Elem::Num(3.0),
            Elem::Mul,
            Elem::Add,
            Elem::End,
        ];
        assert_eq!(max_stack(&elems), 3);

        // 1 2 + 3 * -> (1+2)*3
        let elems = vec![
            Elem::Num(1.0),
            Elem::Num(2.0),
            Elem::Add,
            Elem::Num(3.0),
            Elem::Mul,
            Elem::End,
        ];
        assert_eq!(max_stack(&elems), 2);

        // 2 - sin -> sin(-2), unary ops do not grow the stack
        let elems = vec![Elem::Num(2.0), Elem::Neg, Elem::Fn1(Func1::Sin), Elem::End];
        assert_eq!(max_stack(&elems), 1);
    }

    #[test]
    fn test_eval_order() {
        let ctx = Ctx::default();

        // 10 4 2 / - -> 10-4/2, subtraction is not commutative
        let elems = vec![
            Elem::Num(10.0),
            Elem::Num(4.0),
            Elem::Num(2.0),
            Elem::Div,
            Elem::Sub,
            Elem::End,
        ];
        let e = Expr::new(&[], elems);
        assert_eq!(e.eval(&ctx), 8.0);

        // 2 10 pow -> pow(2, 10), first pushed is the first argument
        let elems = vec![
            Elem::Num(2.0),
            Elem::Num(10.0),
            Elem::Fn2(Func2::Pow),
            Elem::End,
        ];
        let e = Expr::new(&[], elems);
        assert_eq!(e.eval(&ctx), 1024.0);
    }

    #[test]
    fn test_eval_ieee() {
        let ctx = Ctx::default();

        let elems = vec![Elem::Num(1.0), Elem::Num(0.0), Elem::Div, Elem::End];
        let e = Expr::new(&[], elems);
        assert!(e.eval(&ctx).is_infinite());

        let elems = vec![Elem::Num(0.0), Elem::Num(0.0), Elem::Div, Elem::End];
        let e = Expr::new(&[], elems);
        assert!(e.eval(&ctx).is_nan());

        let elems = vec![Elem::Num(-1.0), Elem::Fn1(Func1::Log), Elem::End];
        let e = Expr::new(&[], elems);
        assert!(e.eval(&ctx).is_nan());
    }

    #[test]
    fn test_angle_conversion() {
        let elems = vec![Elem::Num(1.0), Elem::Num(1.0), Elem::Fn2(Func2::Atan2), Elem::End];
        let e = Expr::new(&[], elems);

        let ctx = Ctx {
            angle_unit: AngleUnit::Degrees,
        };
        assert!((e.eval(&ctx) - 45.0).abs() < 1e-9);

        let ctx = Ctx {
            angle_unit: AngleUnit::Gradians,
        };
        assert!((e.eval(&ctx) - 50.0).abs() < 1e-9);

        let ctx = Ctx {
            angle_unit: AngleUnit::Radians,
        };
        assert!((e.eval(&ctx) - std::f64::consts::FRAC_PI_4).abs() < 1e-12);
    }

    #[test]
    fn test_var_read() {
        let vars = vec![Var::new("x", 5.0)];
        let elems = vec![Elem::Var(0), Elem::Num(2.0), Elem::Mul, Elem::End];
        let e = Expr::new(&vars, elems);
        let ctx = Ctx::default();

        assert_eq!(e.eval(&ctx), 10.0);
        // external mutation is picked up without recompiling
        vars[0].set(3.0);
        assert_eq!(e.eval(&ctx), 6.0);
    }

    #[test]
    fn test_dump() {
        let vars = vec![Var::new("x", 0.0)];
        let elems = vec![
            Elem::Num(1.0),
            Elem::Num(2.0),
            Elem::Var(0),
            Elem::Mul,
            Elem::Add,
            Elem::Neg,
            Elem::Fn1(Func1::Sin),
            Elem::Num(0.5),
            Elem::Fn2(Func2::Max),
            Elem::End,
        ];
        let e = Expr::new(&vars, elems);
        assert_eq!(e.dump(), "1.0 2.0 x *(2) +(2) -(1) sin(1) 0.5 max(2)");
    }
}
