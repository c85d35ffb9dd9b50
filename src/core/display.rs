//! Default text form.
//!
//! Sums print as `a+b-c` with negative coefficients absorbing the sign;
//! products as `a*b*c` with the overall coefficient first and unary minus
//! absorbed; powers as `a^b`; function applications as `name(arg,...)`;
//! lists as `[a,b]`, tuples as `(a,b)`, matrices as `[[..],[..]]`.
//!
//! A subexpression is wrapped in parentheses iff its precedence is less
//! than or equal to the context precedence.

use std::fmt;

use crate::core::expr::{Ex, NodeKind, RelOp};
use crate::core::numeric::Numeric;
use crate::functions::registry;

const PREC_REL: u8 = 10;
const PREC_ADD: u8 = 20;
const PREC_MUL: u8 = 30;
const PREC_POW: u8 = 40;
const PREC_ATOM: u8 = 60;

// =============================================================================
// NUMERIC DISPLAY
// =============================================================================

fn fmt_f64(f: f64, out: &mut fmt::Formatter<'_>) -> fmt::Result {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e16 {
        write!(out, "{f:.1}")
    } else {
        write!(out, "{f}")
    }
}

fn fmt_real(n: &Numeric, out: &mut fmt::Formatter<'_>) -> fmt::Result {
    match n {
        Numeric::Int(v) => write!(out, "{v}"),
        Numeric::Rat(r) => write!(out, "{}/{}", r.numer(), r.denom()),
        Numeric::Float(f) => fmt_f64(*f, out),
        Numeric::Cplx { .. } => Ok(()),
    }
}

impl fmt::Display for Numeric {
    fn fmt(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Numeric::Cplx { re, im } => {
                let re_zero = re.is_zero();
                if !re_zero {
                    fmt_real(re, out)?;
                }
                if im.is_negative() {
                    let pos = -&**im;
                    write!(out, "-")?;
                    fmt_imag_part(&pos, out)
                } else {
                    if !re_zero {
                        write!(out, "+")?;
                    }
                    fmt_imag_part(im, out)
                }
            }
            other => fmt_real(other, out),
        }
    }
}

fn fmt_imag_part(im: &Numeric, out: &mut fmt::Formatter<'_>) -> fmt::Result {
    if im.is_one() {
        write!(out, "I")
    } else {
        fmt_real(im, out)?;
        write!(out, "*I")
    }
}

// Effective precedence of a numeric literal when embedded in context.
fn numeric_prec(n: &Numeric) -> u8 {
    match n {
        Numeric::Cplx { re, .. } => {
            if re.is_zero() {
                PREC_MUL
            } else {
                PREC_ADD
            }
        }
        _ if n.is_negative() => PREC_ADD,
        Numeric::Rat(_) => PREC_MUL,
        _ => PREC_ATOM,
    }
}

// =============================================================================
// EXPRESSION DISPLAY
// =============================================================================

fn prec_of(e: &Ex) -> u8 {
    match &**e {
        NodeKind::Num(n) => numeric_prec(n),
        NodeKind::Add(_) => PREC_ADD,
        NodeKind::Mul(_) | NodeKind::NcMul(_) => PREC_MUL,
        NodeKind::Pow { .. } => PREC_POW,
        NodeKind::Rel { .. } => PREC_REL,
        _ => PREC_ATOM,
    }
}

fn write_ex(e: &Ex, ctx: u8, out: &mut fmt::Formatter<'_>) -> fmt::Result {
    if prec_of(e) <= ctx {
        write!(out, "(")?;
        write_ex_bare(e, out)?;
        write!(out, ")")
    } else {
        write_ex_bare(e, out)
    }
}

fn write_numeric_in(n: &Numeric, ctx: u8, out: &mut fmt::Formatter<'_>) -> fmt::Result {
    if numeric_prec(n) <= ctx {
        write!(out, "({n})")
    } else {
        write!(out, "{n}")
    }
}

fn write_pow_pair(rest: &Ex, coeff: &Numeric, out: &mut fmt::Formatter<'_>) -> fmt::Result {
    if coeff.is_one() {
        write_ex(rest, PREC_MUL, out)
    } else {
        write_ex(rest, PREC_POW, out)?;
        write!(out, "^")?;
        write_numeric_in(coeff, PREC_POW, out)
    }
}

fn write_ex_bare(e: &Ex, out: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &**e {
        NodeKind::Num(n) => write!(out, "{n}"),
        NodeKind::Sym(s) => write!(out, "{}", s.name()),
        NodeKind::Const(c) => write!(out, "{}", c.name()),
        NodeKind::Add(seq) => {
            for (i, p) in seq.pairs.iter().enumerate() {
                let negative = p.coeff.is_negative();
                if negative {
                    write!(out, "-")?;
                } else if i > 0 {
                    write!(out, "+")?;
                }
                let mag = p.coeff.abs();
                if mag.is_one() {
                    write_ex(&p.rest, PREC_ADD, out)?;
                } else {
                    write_numeric_in(&mag, PREC_ADD, out)?;
                    write!(out, "*")?;
                    write_ex(&p.rest, PREC_MUL, out)?;
                }
            }
            if !seq.overall.is_zero() {
                if seq.overall.is_negative() {
                    write!(out, "-{}", seq.overall.abs())?;
                } else if matches!(seq.overall, Numeric::Cplx { .. }) {
                    write!(out, "+({})", seq.overall)?;
                } else {
                    write!(out, "+{}", seq.overall)?;
                }
            }
            Ok(())
        }
        NodeKind::Mul(seq) => {
            let mut lead = false;
            if seq.overall.is_minus_one() {
                write!(out, "-")?;
            } else if !seq.overall.is_one() {
                // The overall coefficient leads, with unary minus absorbed.
                if seq.overall.is_negative() {
                    write!(out, "-")?;
                    write_numeric_in(&seq.overall.abs(), PREC_ADD, out)?;
                } else {
                    write_numeric_in(&seq.overall, PREC_ADD, out)?;
                }
                lead = true;
            }
            for (i, p) in seq.pairs.iter().enumerate() {
                if lead || i > 0 {
                    write!(out, "*")?;
                }
                write_pow_pair(&p.rest, &p.coeff, out)?;
            }
            Ok(())
        }
        NodeKind::NcMul(items) => {
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    write!(out, "*")?;
                }
                write_ex(item, PREC_MUL, out)?;
            }
            Ok(())
        }
        NodeKind::Pow { base, expo } => {
            write_ex(base, PREC_POW, out)?;
            write!(out, "^")?;
            write_ex(expo, PREC_POW, out)
        }
        NodeKind::Func { serial, args } => {
            let name = registry::name_of(*serial).unwrap_or_else(|| format!("fn#{serial}"));
            write!(out, "{name}(")?;
            for (i, a) in args.iter().enumerate() {
                if i > 0 {
                    write!(out, ",")?;
                }
                write_ex_bare(a, out)?;
            }
            write!(out, ")")
        }
        NodeKind::List(items) => {
            write!(out, "[")?;
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    write!(out, ",")?;
                }
                write_ex_bare(item, out)?;
            }
            write!(out, "]")
        }
        NodeKind::Tuple(items) => {
            write!(out, "(")?;
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    write!(out, ",")?;
                }
                write_ex_bare(item, out)?;
            }
            write!(out, ")")
        }
        NodeKind::Matrix(m) => {
            write!(out, "[")?;
            for r in 0..m.rows() {
                if r > 0 {
                    write!(out, ",")?;
                }
                write!(out, "[")?;
                for c in 0..m.cols() {
                    if c > 0 {
                        write!(out, ",")?;
                    }
                    write_ex_bare(&m.elems()[r * m.cols() + c], out)?;
                }
                write!(out, "]")?;
            }
            write!(out, "]")
        }
        NodeKind::Rel { lhs, rhs, op } => {
            write_ex(lhs, PREC_REL, out)?;
            let sign = match op {
                RelOp::Equal => "==",
                RelOp::NotEqual => "!=",
                RelOp::Less => "<",
                RelOp::LessEq => "<=",
                RelOp::Greater => ">",
                RelOp::GreaterEq => ">=",
            };
            write!(out, "{sign}")?;
            write_ex(rhs, PREC_REL, out)
        }
        NodeKind::Series(s) => {
            let mut wrote = false;
            for (c, d) in &s.terms {
                if wrote {
                    write!(out, "+")?;
                }
                wrote = true;
                write_ex(c, PREC_MUL, out)?;
                if *d != 0 {
                    write!(out, "*(")?;
                    write_ex_bare(&s.var, out)?;
                    if !s.point.is_zero() {
                        write!(out, "-")?;
                        write_ex(&s.point, PREC_ADD, out)?;
                    }
                    write!(out, ")^{d}")?;
                }
            }
            if wrote {
                write!(out, "+")?;
            }
            write!(out, "Order((")?;
            write_ex_bare(&s.var, out)?;
            if !s.point.is_zero() {
                write!(out, "-")?;
                write_ex(&s.point, PREC_ADD, out)?;
            }
            write!(out, ")^{})", s.order)
        }
        NodeKind::Fail => write!(out, "fail"),
    }
}

impl fmt::Display for Ex {
    fn fmt(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_ex_bare(self, out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sum_and_product_forms() {
        let x = Ex::symbol("x");
        let y = Ex::symbol("y");
        assert_eq!((&x + &y).to_string(), "x+y");
        assert_eq!((&x - &y).to_string(), "x-y");
        assert_eq!((2i32 * &x * &y).to_string(), "2*x*y");
        assert_eq!((-&x).to_string(), "-x");
        assert_eq!((&x * &y + 1i32).to_string(), "x*y+1");
    }

    #[test]
    fn precedence_parens() {
        let x = Ex::symbol("x");
        let y = Ex::symbol("y");
        assert_eq!(((&x + &y) * 2i32).to_string(), "2*(x+y)");
        assert_eq!(((&x + 1i32).pow(2)).to_string(), "(x+1)^2");
        assert_eq!(x.pow(2).to_string(), "x^2");
        assert_eq!(x.pow(-1).to_string(), "x^(-1)");
        assert_eq!(x.pow(Ex::half()).to_string(), "x^(1/2)");
    }

    #[test]
    fn numeric_forms() {
        assert_eq!(Ex::half().to_string(), "1/2");
        assert_eq!(Ex::numeric(2.0f64).to_string(), "2.0");
        assert_eq!(Ex::i().to_string(), "I");
        let z = Ex::numeric(Numeric::complex(
            Numeric::from(2i64),
            Numeric::from(-3i64),
        ));
        assert_eq!(z.to_string(), "2-3*I");
    }

    #[test]
    fn containers() {
        let x = Ex::symbol("x");
        assert_eq!(Ex::list(vec![x.clone(), Ex::one()]).to_string(), "[x,1]");
        assert_eq!(Ex::tuple(vec![x.clone(), Ex::one()]).to_string(), "(x,1)");
        assert_eq!(Ex::equal(x.clone(), Ex::one()).to_string(), "x==1");
        assert_eq!(x.sin().to_string(), "sin(x)");
    }
}
