use crate::errors::{ErrorKind, ExprError};
use crate::funcs::{Func1, Func2};
use crate::stack::{Elem, Expr};
use crate::Var;

/// Longest accepted identifier, in characters.
pub(crate) const MAX_IDENT: usize = 41;

/// Scans the longest floating point literal starting at `pos` and advances
/// the cursor past it. An optional leading sign belongs to the literal; an
/// exponent marker is consumed only when at least one digit follows it, so
/// `1e` lexes as the number `1` followed by the identifier `e`.
pub(crate) fn scan_number(text: &str, pos: &mut usize) -> Result<f64, ExprError> {
    let bytes = text.as_bytes();
    let start = *pos;
    let mut end = start;

    match bytes.get(end) {
        Some(&b'+') | Some(&b'-') => end += 1,
        _ => {}
    }

    let mut digits = 0;
    let mut dot = false;
    while let Some(&c) = bytes.get(end) {
        match c {
            b'0'..=b'9' => {
                digits += 1;
                end += 1;
            }
            b'.' if !dot => {
                dot = true;
                end += 1;
            }
            _ => break,
        }
    }

    if digits == 0 {
        return Err(ExprError::new(ErrorKind::InvalidNumber, start));
    }

    if let Some(&e) = bytes.get(end) {
        if e == b'e' || e == b'E' {
            let mut exp_end = end + 1;
            if let Some(&s) = bytes.get(exp_end) {
                if s == b'+' || s == b'-' {
                    exp_end += 1;
                }
            }
            let mut exp_digits = 0;
            while let Some(&d) = bytes.get(exp_end) {
                if !d.is_ascii_digit() {
                    break;
                }
                exp_digits += 1;
                exp_end += 1;
            }
            if exp_digits > 0 {
                end = exp_end;
            }
        }
    }

    let val: f64 = match text[start..end].parse() {
        Ok(v) => v,
        Err(..) => return Err(ExprError::new(ErrorKind::InvalidNumber, start)),
    };

    if val.is_infinite() {
        return Err(ExprError::new(ErrorKind::NumberOutOfRange, start));
    }

    *pos = end;
    Ok(val)
}

/// Scans an identifier and advances the cursor past it: an ASCII letter
/// followed by a maximal run of ASCII letters and digits, so names like
/// `log10` or `atan2` lex as one token. A leading digit never reaches
/// here - the dispatch sends it to the number scanner first.
pub(crate) fn scan_ident<'a>(text: &'a str, pos: &mut usize) -> Result<&'a str, ExprError> {
    let bytes = text.as_bytes();
    let start = *pos;

    while let Some(c) = bytes.get(*pos) {
        let more = if *pos == start {
            c.is_ascii_alphabetic()
        } else {
            c.is_ascii_alphanumeric()
        };
        if !more {
            break;
        }
        if *pos - start == MAX_IDENT {
            return Err(ExprError::new(ErrorKind::IdentifierTooLong, *pos));
        }
        *pos += 1;
    }

    Ok(&text[start..*pos])
}

/// Counts how many slots the compiled program needs: one per number,
/// identifier and arithmetic operator character, none for parentheses,
/// commas and whitespace. The count may overshoot by one per unary plus,
/// which the compiler discards, but never undershoots. Malformed tokens
/// fail here with the same error the compiler would raise for them.
pub(crate) fn count_elems(text: &str) -> Result<usize, ExprError> {
    let bytes = text.as_bytes();
    let mut i = 0usize;
    let mut count = 0usize;

    while let Some(&c) = bytes.get(i) {
        match c {
            b'a'..=b'z' | b'A'..=b'Z' => {
                scan_ident(text, &mut i)?;
                count += 1;
            }
            b'.' | b'0'..=b'9' => {
                scan_number(text, &mut i)?;
                count += 1;
            }
            b'+' | b'-' | b'*' | b'/' => {
                count += 1;
                i += 1;
            }
            _ => i += 1,
        }
    }

    Ok(count)
}

// First match wins; duplicate names shadow later ones.
fn var_index(vars: &[Var], name: &str) -> Option<usize> {
    vars.iter().position(|v| v.name() == name)
}

// does the character begin a number literal?
fn starts_number(c: Option<&u8>) -> bool {
    match c {
        Some(&c) => c == b'.' || c.is_ascii_digit(),
        None => false,
    }
}

/// Class of the most recently consumed token. The compiler is a
/// deterministic automaton over these classes: every dispatch arm consults
/// this register instead of re-deriving the context from earlier code
/// paths.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Prev {
    Start,
    LPar,
    RPar,
    Sep,
    Add,
    Sub,
    Mul,
    Div,
    Neg,
    Func,
    Num,
    Var,
}

impl Prev {
    // a completed value: number, variable or closing parenthesis
    fn is_value(self) -> bool {
        matches!(self, Prev::Num | Prev::Var | Prev::RPar)
    }

    // positions where the right operand is still missing
    fn is_op(self) -> bool {
        matches!(
            self,
            Prev::Add | Prev::Sub | Prev::Mul | Prev::Div | Prev::Neg | Prev::Start
        )
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Op {
    Neg,
    Mul,
    Div,
    Add,
    Sub,
}

impl Op {
    // lower rank binds tighter
    fn rank(self) -> u8 {
        match self {
            Op::Neg => 1,
            Op::Mul | Op::Div => 2,
            Op::Add | Op::Sub => 3,
        }
    }

    // unary negation nests, binary operators chain left to right
    fn right_assoc(self) -> bool {
        matches!(self, Op::Neg)
    }

    fn elem(self) -> Elem {
        match self {
            Op::Neg => Elem::Neg,
            Op::Mul => Elem::Mul,
            Op::Div => Elem::Div,
            Op::Add => Elem::Add,
            Op::Sub => Elem::Sub,
        }
    }
}

/// Operator stack entry. A left parenthesis counts the argument separators
/// seen directly inside it; a function marker sits right below the
/// parenthesis that opens its argument list.
#[derive(Clone, Copy, Debug)]
enum OpEntry {
    Op(Op),
    LPar { args: u32 },
    Fn1(Func1),
    Fn2(Func2),
}

struct Compiler<'t, 'a> {
    text: &'t str,
    vars: &'a [Var],
    ops: Vec<OpEntry>,
    out: Vec<Elem>,
    prev: Prev,
}

impl<'t, 'a> Compiler<'t, 'a> {
    // Emits a number literal, with the sign already folded in when the
    // dispatch came from a unary `+`/`-`.
    fn number(&mut self, i: &mut usize) -> Result<(), ExprError> {
        if self.prev.is_value() {
            return Err(ExprError::new(ErrorKind::OperatorExpected, *i));
        }

        let f = scan_number(self.text, i)?;
        self.out.push(Elem::Num(f));
        self.prev = Prev::Num;
        Ok(())
    }

    // Moves operators that bind at least as tightly to the output, then
    // pushes the new one. Equal ranks pop for left-associative operators
    // only, so `6/2*3` is `(6/2)*3` while `--x` stays `-(-x)`.
    fn push_op(&mut self, op: Op) {
        while let Some(&OpEntry::Op(top)) = self.ops.last() {
            if top.rank() < op.rank() || (top.rank() == op.rank() && !top.right_assoc()) {
                self.ops.pop();
                self.out.push(top.elem());
            } else {
                break;
            }
        }
        self.ops.push(OpEntry::Op(op));
    }

    // Right parenthesis: pop down to the matching left one; when a
    // function marker sits below it, check the arity against the counted
    // separators and emit the function.
    fn rpar(&mut self, i: usize) -> Result<(), ExprError> {
        loop {
            match self.ops.pop() {
                None => return Err(ExprError::new(ErrorKind::UnmatchedParenthesis, i)),
                Some(OpEntry::LPar { args }) => {
                    match self.ops.last() {
                        Some(&OpEntry::Fn1(f)) => {
                            if args != 0 {
                                return Err(ExprError::new(ErrorKind::WrongParameterCount, i));
                            }
                            self.ops.pop();
                            self.out.push(Elem::Fn1(f));
                        }
                        Some(&OpEntry::Fn2(f)) => {
                            if args != 1 {
                                return Err(ExprError::new(ErrorKind::WrongParameterCount, i));
                            }
                            self.ops.pop();
                            self.out.push(Elem::Fn2(f));
                        }
                        _ => {}
                    }
                    return Ok(());
                }
                Some(OpEntry::Op(op)) => self.out.push(op.elem()),
                Some(OpEntry::Fn1(f)) => self.out.push(Elem::Fn1(f)),
                Some(OpEntry::Fn2(f)) => self.out.push(Elem::Fn2(f)),
            }
        }
    }

    // Argument separator: pop down to the enclosing left parenthesis,
    // bump its separator count and leave it in place. Valid only directly
    // inside a function argument list.
    fn comma(&mut self, i: usize) -> Result<(), ExprError> {
        loop {
            match self.ops.pop() {
                None => return Err(ExprError::new(ErrorKind::CommaMisplaced, i)),
                Some(OpEntry::LPar { args }) => match self.ops.last() {
                    Some(OpEntry::Fn1(..)) | Some(OpEntry::Fn2(..)) => {
                        self.ops.push(OpEntry::LPar { args: args + 1 });
                        return Ok(());
                    }
                    _ => return Err(ExprError::new(ErrorKind::CommaMisplaced, i)),
                },
                Some(OpEntry::Op(op)) => self.out.push(op.elem()),
                Some(OpEntry::Fn1(f)) => self.out.push(Elem::Fn1(f)),
                Some(OpEntry::Fn2(f)) => self.out.push(Elem::Fn2(f)),
            }
        }
    }

    // Drains the operator stack at the end of input. Any parenthesis left
    // here was never closed.
    fn drain(&mut self, i: usize) -> Result<(), ExprError> {
        while let Some(e) = self.ops.pop() {
            match e {
                OpEntry::LPar { .. } => {
                    return Err(ExprError::new(ErrorKind::UnmatchedParenthesis, i))
                }
                OpEntry::Op(op) => self.out.push(op.elem()),
                OpEntry::Fn1(f) => self.out.push(Elem::Fn1(f)),
                OpEntry::Fn2(f) => self.out.push(Elem::Fn2(f)),
            }
        }
        Ok(())
    }

    fn run(mut self) -> Result<Expr<'a>, ExprError> {
        let bytes = self.text.as_bytes();
        let mut i = 0usize;

        loop {
            let c = match bytes.get(i) {
                Some(&c) => c,
                None => break,
            };

            match c {
                b'a'..=b'z' | b'A'..=b'Z' => {
                    let s = i;
                    let name = scan_ident(self.text, &mut i)?;

                    // a known function name directly followed by `(` opens
                    // an argument list; anything else is a variable
                    if bytes.get(i) == Some(&b'(') {
                        if let Some(f) = Func1::by_name(name) {
                            if self.prev.is_value() {
                                return Err(ExprError::new(ErrorKind::OperatorExpected, s));
                            }
                            self.ops.push(OpEntry::Fn1(f));
                            self.prev = Prev::Func;
                            continue;
                        }
                        if let Some(f) = Func2::by_name(name) {
                            if self.prev.is_value() {
                                return Err(ExprError::new(ErrorKind::OperatorExpected, s));
                            }
                            self.ops.push(OpEntry::Fn2(f));
                            self.prev = Prev::Func;
                            continue;
                        }
                    }

                    let idx = match var_index(self.vars, name) {
                        Some(idx) => idx,
                        None => return Err(ExprError::new(ErrorKind::InvalidIdentifier, s)),
                    };
                    if self.prev.is_value() {
                        return Err(ExprError::new(ErrorKind::OperatorExpected, s));
                    }
                    self.out.push(Elem::Var(idx));
                    self.prev = Prev::Var;
                }
                b'.' | b'0'..=b'9' => self.number(&mut i)?,
                b'+' | b'-' => {
                    if !self.prev.is_value() {
                        if starts_number(bytes.get(i + 1)) {
                            // the sign folds into the literal
                            self.number(&mut i)?;
                        } else if c == b'-' {
                            self.push_op(Op::Neg);
                            self.prev = Prev::Neg;
                            i += 1;
                        } else {
                            // unary plus is a no-op
                            i += 1;
                        }
                    } else if c == b'+' {
                        self.push_op(Op::Add);
                        self.prev = Prev::Add;
                        i += 1;
                    } else {
                        self.push_op(Op::Sub);
                        self.prev = Prev::Sub;
                        i += 1;
                    }
                }
                b'*' | b'/' => {
                    if !self.prev.is_value() {
                        return Err(ExprError::new(ErrorKind::UnexpectedOperator, i));
                    }
                    if c == b'*' {
                        self.push_op(Op::Mul);
                        self.prev = Prev::Mul;
                    } else {
                        self.push_op(Op::Div);
                        self.prev = Prev::Div;
                    }
                    i += 1;
                }
                b'(' => {
                    if self.prev.is_value() {
                        return Err(ExprError::new(ErrorKind::OperatorExpected, i));
                    }
                    self.ops.push(OpEntry::LPar { args: 0 });
                    self.prev = Prev::LPar;
                    i += 1;
                }
                b')' => {
                    if self.prev.is_op() {
                        return Err(ExprError::new(ErrorKind::ValueExpected, i));
                    }
                    if self.prev == Prev::LPar || self.prev == Prev::Sep {
                        return Err(ExprError::new(ErrorKind::EmptyParenthesis, i));
                    }
                    self.rpar(i)?;
                    self.prev = Prev::RPar;
                    i += 1;
                }
                b',' => {
                    if !self.prev.is_value() {
                        return Err(ExprError::new(ErrorKind::CommaMisplaced, i));
                    }
                    self.comma(i)?;
                    self.prev = Prev::Sep;
                    i += 1;
                }
                b' ' | b'\t' => i += 1,
                _ => return Err(ExprError::new(ErrorKind::UnexpectedCharacter, i)),
            }
        }

        if !self.prev.is_value() {
            return Err(ExprError::new(ErrorKind::UnexpectedEnd, i));
        }

        self.drain(i)?;
        self.out.push(Elem::End);

        Ok(Expr::new(self.vars, self.out))
    }
}

/// Compiles an expression into a postfix program.
///
/// `vars` is the ordered table of variable bindings the program will read
/// at evaluation time; the compiled program stores indices into it, not
/// copies, so the slice must outlive the returned [`Expr`]. Names are
/// matched case-sensitively, first match wins. A variable named like a
/// function is reachable as long as it is not directly followed by `(`.
///
/// On a malformed expression the first error wins and compilation stops;
/// the error carries the byte offset at which it was detected.
pub fn compile<'a>(text: &str, vars: &'a [Var]) -> Result<Expr<'a>, ExprError> {
    let count = count_elems(text)?;

    let mut out: Vec<Elem> = Vec::new();
    if out.try_reserve_exact(count + 1).is_err() {
        return Err(ExprError::new(ErrorKind::AllocationFailure, 0));
    }

    let compiler = Compiler {
        text,
        vars,
        ops: Vec::new(),
        out,
        prev: Prev::Start,
    };

    compiler.run()
}
