use std::f64::consts::PI;

use lazy_static::lazy_static;

/// One-argument math functions.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Func1 {
    Abs,

    Exp,
    Exp2,
    Log,
    Log10,

    Sqrt,
    Cbrt,

    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,

    Sinh,
    Cosh,
    Tanh,
    Asinh,
    Acosh,
    Atanh,

    Erf,
    Erfc,
    Lgamma,
    Tgamma,

    Ceil,
    Floor,
    Trunc,
    Round,
}

/// Two-argument math functions.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Func2 {
    Mod,
    Rem,
    Max,
    Min,

    Hypot,
    Pow,

    Atan2,
}

lazy_static! {
    pub(crate) static ref FN1: Vec<(&'static str, Func1)> = vec![
        ("abs", Func1::Abs),
        ("exp", Func1::Exp),
        ("exp2", Func1::Exp2),
        ("log", Func1::Log),
        ("log10", Func1::Log10),
        ("sqrt", Func1::Sqrt),
        ("cbrt", Func1::Cbrt),
        ("sin", Func1::Sin),
        ("cos", Func1::Cos),
        ("tan", Func1::Tan),
        ("asin", Func1::Asin),
        ("acos", Func1::Acos),
        ("atan", Func1::Atan),
        ("sinh", Func1::Sinh),
        ("cosh", Func1::Cosh),
        ("tanh", Func1::Tanh),
        ("asinh", Func1::Asinh),
        ("acosh", Func1::Acosh),
        ("atanh", Func1::Atanh),
        ("erf", Func1::Erf),
        ("erfc", Func1::Erfc),
        ("lgamma", Func1::Lgamma),
        ("tgamma", Func1::Tgamma),
        ("ceil", Func1::Ceil),
        ("floor", Func1::Floor),
        ("trunc", Func1::Trunc),
        ("round", Func1::Round),
    ];
    pub(crate) static ref FN2: Vec<(&'static str, Func2)> = vec![
        ("mod", Func2::Mod),
        ("rem", Func2::Rem),
        ("max", Func2::Max),
        ("min", Func2::Min),
        ("hypot", Func2::Hypot),
        ("pow", Func2::Pow),
        ("atan2", Func2::Atan2),
    ];
}

impl Func1 {
    /// Looks a function up by its name. Names are case-sensitive.
    pub(crate) fn by_name(name: &str) -> Option<Func1> {
        FN1.iter().find(|(n, _)| *n == name).map(|(_, f)| *f)
    }

    pub(crate) fn name(self) -> &'static str {
        match self {
            Func1::Abs => "abs",
            Func1::Exp => "exp",
            Func1::Exp2 => "exp2",
            Func1::Log => "log",
            Func1::Log10 => "log10",
            Func1::Sqrt => "sqrt",
            Func1::Cbrt => "cbrt",
            Func1::Sin => "sin",
            Func1::Cos => "cos",
            Func1::Tan => "tan",
            Func1::Asin => "asin",
            Func1::Acos => "acos",
            Func1::Atan => "atan",
            Func1::Sinh => "sinh",
            Func1::Cosh => "cosh",
            Func1::Tanh => "tanh",
            Func1::Asinh => "asinh",
            Func1::Acosh => "acosh",
            Func1::Atanh => "atanh",
            Func1::Erf => "erf",
            Func1::Erfc => "erfc",
            Func1::Lgamma => "lgamma",
            Func1::Tgamma => "tgamma",
            Func1::Ceil => "ceil",
            Func1::Floor => "floor",
            Func1::Trunc => "trunc",
            Func1::Round => "round",
        }
    }

    pub(crate) fn call(self, f: f64) -> f64 {
        match self {
            Func1::Abs => f.abs(),
            Func1::Exp => f.exp(),
            Func1::Exp2 => f.exp2(),
            Func1::Log => f.ln(),
            Func1::Log10 => f.log10(),
            Func1::Sqrt => f.sqrt(),
            Func1::Cbrt => f.cbrt(),
            Func1::Sin => f.sin(),
            Func1::Cos => f.cos(),
            Func1::Tan => f.tan(),
            Func1::Asin => f.asin(),
            Func1::Acos => f.acos(),
            Func1::Atan => f.atan(),
            Func1::Sinh => f.sinh(),
            Func1::Cosh => f.cosh(),
            Func1::Tanh => f.tanh(),
            Func1::Asinh => f.asinh(),
            Func1::Acosh => f.acosh(),
            Func1::Atanh => f.atanh(),
            Func1::Erf => libm::erf(f),
            Func1::Erfc => libm::erfc(f),
            Func1::Lgamma => libm::lgamma(f),
            Func1::Tgamma => libm::tgamma(f),
            Func1::Ceil => f.ceil(),
            Func1::Floor => f.floor(),
            Func1::Trunc => f.trunc(),
            Func1::Round => f.round(),
        }
    }

    /// The argument is an angle and must be converted to radians first.
    pub(crate) fn angle_in(self) -> bool {
        matches!(self, Func1::Sin | Func1::Cos | Func1::Tan)
    }

    /// The result is an angle and must be converted from radians.
    pub(crate) fn angle_out(self) -> bool {
        matches!(self, Func1::Asin | Func1::Acos | Func1::Atan)
    }
}

impl Func2 {
    /// Looks a function up by its name. Names are case-sensitive.
    pub(crate) fn by_name(name: &str) -> Option<Func2> {
        FN2.iter().find(|(n, _)| *n == name).map(|(_, f)| *f)
    }

    pub(crate) fn name(self) -> &'static str {
        match self {
            Func2::Mod => "mod",
            Func2::Rem => "rem",
            Func2::Max => "max",
            Func2::Min => "min",
            Func2::Hypot => "hypot",
            Func2::Pow => "pow",
            Func2::Atan2 => "atan2",
        }
    }

    pub(crate) fn call(self, f1: f64, f2: f64) -> f64 {
        match self {
            Func2::Mod => f1 % f2,
            Func2::Rem => libm::remainder(f1, f2),
            Func2::Max => f1.max(f2),
            Func2::Min => f1.min(f2),
            Func2::Hypot => f1.hypot(f2),
            Func2::Pow => f1.powf(f2),
            Func2::Atan2 => f1.atan2(f2),
        }
    }

    /// The result is an angle and must be converted from radians.
    pub(crate) fn angle_out(self) -> bool {
        matches!(self, Func2::Atan2)
    }
}

/// Unit in which angle-bearing function arguments and results are
/// interpreted. Picked at evaluation time, so the same compiled expression
/// may be evaluated under different units.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AngleUnit {
    Degrees,
    Radians,
    Gradians,
}

impl AngleUnit {
    /// Radians per one unit of this angle unit.
    pub(crate) fn factor(self) -> f64 {
        match self {
            AngleUnit::Degrees => PI / 180.0,
            AngleUnit::Radians => 1.0,
            AngleUnit::Gradians => PI / 200.0,
        }
    }
}

impl Default for AngleUnit {
    fn default() -> AngleUnit {
        AngleUnit::Degrees
    }
}

/// Evaluation context. Shared by any number of compiled expressions.
#[derive(Clone, Copy, Default, Debug)]
pub struct Ctx {
    pub angle_unit: AngleUnit,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        assert_eq!(Func1::by_name("sin"), Some(Func1::Sin));
        assert_eq!(Func1::by_name("tgamma"), Some(Func1::Tgamma));
        // names are case-sensitive
        assert_eq!(Func1::by_name("SIN"), None);
        assert_eq!(Func1::by_name("pow"), None);
        assert_eq!(Func2::by_name("pow"), Some(Func2::Pow));
        assert_eq!(Func2::by_name("atan2"), Some(Func2::Atan2));
        assert_eq!(Func2::by_name("sin"), None);
    }

    #[test]
    fn test_name_round_trip() {
        for (name, f) in FN1.iter() {
            assert_eq!(f.name(), *name);
            assert_eq!(Func1::by_name(name), Some(*f));
        }
        for (name, f) in FN2.iter() {
            assert_eq!(f.name(), *name);
            assert_eq!(Func2::by_name(name), Some(*f));
        }
    }

    #[test]
    fn test_angle_flags() {
        assert!(Func1::Sin.angle_in());
        assert!(!Func1::Sin.angle_out());
        assert!(Func1::Asin.angle_out());
        assert!(!Func1::Asin.angle_in());
        assert!(!Func1::Sinh.angle_in());
        assert!(!Func1::Asinh.angle_out());
        assert!(Func2::Atan2.angle_out());
        assert!(!Func2::Pow.angle_out());
    }

    #[test]
    fn test_factors() {
        assert!((AngleUnit::Degrees.factor() * 180.0 - PI).abs() < 1e-15);
        assert!((AngleUnit::Gradians.factor() * 200.0 - PI).abs() < 1e-15);
        assert_eq!(AngleUnit::Radians.factor(), 1.0);
    }

    #[test]
    fn test_calls() {
        assert_eq!(Func1::Abs.call(-3.0), 3.0);
        assert_eq!(Func1::Round.call(2.5), 3.0);
        assert_eq!(Func2::Max.call(3.0, 5.0), 5.0);
        assert_eq!(Func2::Mod.call(7.0, 3.0), 1.0);
        // IEEE remainder rounds the quotient to the nearest integer
        assert_eq!(Func2::Rem.call(7.0, 3.0), 1.0);
        assert_eq!(Func2::Rem.call(8.0, 3.0), -1.0);
        assert!((Func1::Tgamma.call(5.0) - 24.0).abs() < 1e-9);
    }
}
