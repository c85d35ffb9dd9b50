//! Operator overloading and relational constructors for `Ex`.
//!
//! Every operator routes through the canonicalizing constructors, so no
//! operator ever returns an unsimplified tree at level 1.

use std::ops::{Add, Div, Mul, Neg, Sub};

use crate::core::expr::{Ex, NodeKind, RelOp};

use super::pairseq::{add_many, mul_many, ncmul_many};

impl Ex {
    /// Non-commutative product of `self` and `rhs`.
    pub fn ncmul(&self, rhs: impl Into<Ex>) -> Ex {
        ncmul_many([self.clone(), rhs.into()])
    }

    /// Build a relational node. Both sides are canonically folded but the
    /// relation itself is not decided.
    pub fn relational(lhs: impl Into<Ex>, rhs: impl Into<Ex>, op: RelOp) -> Ex {
        Ex::new(NodeKind::Rel {
            lhs: lhs.into(),
            rhs: rhs.into(),
            op,
        })
    }

    /// `lhs == rhs` as a relational node.
    pub fn equal(lhs: impl Into<Ex>, rhs: impl Into<Ex>) -> Ex {
        Ex::relational(lhs, rhs, RelOp::Equal)
    }

    /// `lhs != rhs` as a relational node.
    pub fn not_equal(lhs: impl Into<Ex>, rhs: impl Into<Ex>) -> Ex {
        Ex::relational(lhs, rhs, RelOp::NotEqual)
    }

    /// `lhs < rhs` as a relational node.
    pub fn less(lhs: impl Into<Ex>, rhs: impl Into<Ex>) -> Ex {
        Ex::relational(lhs, rhs, RelOp::Less)
    }

    /// `lhs <= rhs` as a relational node.
    pub fn less_eq(lhs: impl Into<Ex>, rhs: impl Into<Ex>) -> Ex {
        Ex::relational(lhs, rhs, RelOp::LessEq)
    }

    /// `lhs > rhs` as a relational node.
    pub fn greater(lhs: impl Into<Ex>, rhs: impl Into<Ex>) -> Ex {
        Ex::relational(lhs, rhs, RelOp::Greater)
    }

    /// `lhs >= rhs` as a relational node.
    pub fn greater_eq(lhs: impl Into<Ex>, rhs: impl Into<Ex>) -> Ex {
        Ex::relational(lhs, rhs, RelOp::GreaterEq)
    }
}

// Binary operators are implemented once over `(&Ex, &Ex)` and forwarded from
// every owned/borrowed/primitive combination.

fn ex_add(lhs: &Ex, rhs: &Ex) -> Ex {
    add_many([lhs.clone(), rhs.clone()])
}

fn ex_sub(lhs: &Ex, rhs: &Ex) -> Ex {
    add_many([lhs.clone(), mul_many([Ex::minus_one(), rhs.clone()])])
}

fn ex_mul(lhs: &Ex, rhs: &Ex) -> Ex {
    mul_many([lhs.clone(), rhs.clone()])
}

fn ex_div(lhs: &Ex, rhs: &Ex) -> Ex {
    match lhs.try_div(rhs) {
        Ok(e) => e,
        Err(err) => panic!("Ex division: {err}"),
    }
}

macro_rules! impl_binop {
    ($trait:ident, $method:ident, $func:ident) => {
        impl $trait<Ex> for Ex {
            type Output = Ex;
            fn $method(self, rhs: Ex) -> Ex {
                $func(&self, &rhs)
            }
        }
        impl $trait<&Ex> for Ex {
            type Output = Ex;
            fn $method(self, rhs: &Ex) -> Ex {
                $func(&self, rhs)
            }
        }
        impl $trait<Ex> for &Ex {
            type Output = Ex;
            fn $method(self, rhs: Ex) -> Ex {
                $func(self, &rhs)
            }
        }
        impl $trait<&Ex> for &Ex {
            type Output = Ex;
            fn $method(self, rhs: &Ex) -> Ex {
                $func(self, rhs)
            }
        }
    };
}

impl_binop!(Add, add, ex_add);
impl_binop!(Sub, sub, ex_sub);
impl_binop!(Mul, mul, ex_mul);
impl_binop!(Div, div, ex_div);

macro_rules! impl_primitive_binop {
    ($($prim:ty),*) => {$(
        impl Add<$prim> for Ex {
            type Output = Ex;
            fn add(self, rhs: $prim) -> Ex {
                ex_add(&self, &Ex::from(rhs))
            }
        }
        impl Add<$prim> for &Ex {
            type Output = Ex;
            fn add(self, rhs: $prim) -> Ex {
                ex_add(self, &Ex::from(rhs))
            }
        }
        impl Add<Ex> for $prim {
            type Output = Ex;
            fn add(self, rhs: Ex) -> Ex {
                ex_add(&Ex::from(self), &rhs)
            }
        }
        impl Add<&Ex> for $prim {
            type Output = Ex;
            fn add(self, rhs: &Ex) -> Ex {
                ex_add(&Ex::from(self), rhs)
            }
        }
        impl Sub<$prim> for Ex {
            type Output = Ex;
            fn sub(self, rhs: $prim) -> Ex {
                ex_sub(&self, &Ex::from(rhs))
            }
        }
        impl Sub<$prim> for &Ex {
            type Output = Ex;
            fn sub(self, rhs: $prim) -> Ex {
                ex_sub(self, &Ex::from(rhs))
            }
        }
        impl Sub<Ex> for $prim {
            type Output = Ex;
            fn sub(self, rhs: Ex) -> Ex {
                ex_sub(&Ex::from(self), &rhs)
            }
        }
        impl Sub<&Ex> for $prim {
            type Output = Ex;
            fn sub(self, rhs: &Ex) -> Ex {
                ex_sub(&Ex::from(self), rhs)
            }
        }
        impl Mul<$prim> for Ex {
            type Output = Ex;
            fn mul(self, rhs: $prim) -> Ex {
                ex_mul(&self, &Ex::from(rhs))
            }
        }
        impl Mul<$prim> for &Ex {
            type Output = Ex;
            fn mul(self, rhs: $prim) -> Ex {
                ex_mul(self, &Ex::from(rhs))
            }
        }
        impl Mul<Ex> for $prim {
            type Output = Ex;
            fn mul(self, rhs: Ex) -> Ex {
                ex_mul(&Ex::from(self), &rhs)
            }
        }
        impl Mul<&Ex> for $prim {
            type Output = Ex;
            fn mul(self, rhs: &Ex) -> Ex {
                ex_mul(&Ex::from(self), rhs)
            }
        }
        impl Div<$prim> for Ex {
            type Output = Ex;
            fn div(self, rhs: $prim) -> Ex {
                ex_div(&self, &Ex::from(rhs))
            }
        }
        impl Div<$prim> for &Ex {
            type Output = Ex;
            fn div(self, rhs: $prim) -> Ex {
                ex_div(self, &Ex::from(rhs))
            }
        }
        impl Div<Ex> for $prim {
            type Output = Ex;
            fn div(self, rhs: Ex) -> Ex {
                ex_div(&Ex::from(self), &rhs)
            }
        }
        impl Div<&Ex> for $prim {
            type Output = Ex;
            fn div(self, rhs: &Ex) -> Ex {
                ex_div(&Ex::from(self), rhs)
            }
        }
    )*};
}

impl_primitive_binop!(i64, i32, f64);

impl Neg for Ex {
    type Output = Ex;
    fn neg(self) -> Ex {
        mul_many([Ex::minus_one(), self])
    }
}

impl Neg for &Ex {
    type Output = Ex;
    fn neg(self) -> Ex {
        mul_many([Ex::minus_one(), self.clone()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operator_canonicalization() {
        let x = Ex::symbol("x");
        let y = Ex::symbol("y");
        // Commutativity is structural
        assert_eq!(&x + &y, &y + &x);
        assert_eq!(&x * &y, &y * &x);
        // Associativity is structural (flattening)
        assert_eq!((&x + &y) + 1, &x + (&y + 1));
        // Identities collapse
        assert_eq!(&x + 0, x);
        assert_eq!(&x * 1, x);
        assert!((&x * 0i32).is_zero());
        assert!((&x - &x).is_zero());
    }

    #[test]
    fn division_builds_inverse_powers() {
        let x = Ex::symbol("x");
        let y = Ex::symbol("y");
        let q = &x / &y;
        assert_eq!(q * &y, x);
    }

    #[test]
    fn relational_sides_fold() {
        let x = Ex::symbol("x");
        let r = Ex::equal(&x + &x, 2);
        match &*r {
            NodeKind::Rel { lhs, op, .. } => {
                assert_eq!(*op, RelOp::Equal);
                assert_eq!(*lhs, 2 * &x);
            }
            _ => panic!("expected a relational"),
        }
    }
}
