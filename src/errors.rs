use std::fmt;

/// What went wrong while compiling an expression.
///
/// Every kind carries a fixed message; the byte offset lives in
/// [`ExprError`].
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ErrorKind {
    /// No digits where a number literal was expected
    InvalidNumber,
    /// Number literal does not fit into a 64-bit float
    NumberOutOfRange,
    /// Identifier longer than the fixed bound
    IdentifierTooLong,
    /// Identifier is neither a known function nor a variable
    InvalidIdentifier,
    /// Two values in a row, or a value directly before `(`
    OperatorExpected,
    /// Binary operator where no left operand exists
    UnexpectedOperator,
    /// `)` right after an operator or at the start of the expression
    ValueExpected,
    /// `(` without `)` or the other way around
    UnmatchedParenthesis,
    /// `()` or a trailing comma before `)`
    EmptyParenthesis,
    /// Function called with the wrong number of arguments
    WrongParameterCount,
    /// Comma outside a function argument list
    CommaMisplaced,
    /// Character the grammar knows nothing about
    UnexpectedCharacter,
    /// Expression ended where a value was still expected
    UnexpectedEnd,
    /// Could not allocate the compiled program buffer
    AllocationFailure,
}

impl ErrorKind {
    /// Static human-readable message for this kind.
    pub fn message(self) -> &'static str {
        match self {
            ErrorKind::InvalidNumber => "Invalid number",
            ErrorKind::NumberOutOfRange => "Number out of range",
            ErrorKind::IdentifierTooLong => "Identifier too long",
            ErrorKind::InvalidIdentifier => "Invalid identifier",
            ErrorKind::OperatorExpected => "Operator expected",
            ErrorKind::UnexpectedOperator => "Unexpected operator",
            ErrorKind::ValueExpected => "Expected number, variable or left parenthesis",
            ErrorKind::UnmatchedParenthesis => "Unmatched parenthesis",
            ErrorKind::EmptyParenthesis => "Empty parenthesis",
            ErrorKind::WrongParameterCount => "Wrong number of parameters",
            ErrorKind::CommaMisplaced => "Comma not as parameter separator",
            ErrorKind::UnexpectedCharacter => "Unexpected character",
            ErrorKind::UnexpectedEnd => "Unexpected end",
            ErrorKind::AllocationFailure => "Allocation failed",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

/// First error detected by the compiler: kind plus the byte offset in the
/// original text at which it was found. `pos` is always a valid index into
/// the text, or equal to its length for end-of-input errors.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ExprError {
    pub kind: ErrorKind,
    pub pos: usize,
}

impl ExprError {
    pub(crate) fn new(kind: ErrorKind, pos: usize) -> Self {
        ExprError { kind, pos }
    }
}

impl fmt::Display for ExprError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.pos, self.kind.message())
    }
}
