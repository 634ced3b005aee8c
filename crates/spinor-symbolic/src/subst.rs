//! Substitution and numeric evaluation
//!
//! Substitution replaces every free variable for which the caller's
//! lookup returns a replacement, in a single pass over the tree.
//! Callers that need transitive resolution iterate until the result
//! stops changing; this crate never loops on its own.

use crate::expr::{SymExpr, SymExprKind, Symbol};
use crate::{Result, SymbolicError};
use num_complex::Complex64;

impl SymExpr {
    /// Replace free variables using `lookup`, leaving unbound ones in
    /// place. Replacement expressions are spliced in as-is; they are
    /// not themselves substituted within the same pass.
    pub fn substitute<F>(&self, lookup: &F) -> SymExpr
    where
        F: Fn(&Symbol) -> Option<SymExpr>,
    {
        match self.kind.as_ref() {
            SymExprKind::Num(_) => self.clone(),
            SymExprKind::Var(sym) => lookup(sym).unwrap_or_else(|| self.clone()),
            SymExprKind::Add(xs) => {
                SymExpr::add(xs.iter().map(|x| x.substitute(lookup)).collect())
            }
            SymExprKind::Mul(xs) => {
                SymExpr::mul(xs.iter().map(|x| x.substitute(lookup)).collect())
            }
            SymExprKind::Pow(a, b) => SymExpr::pow(a.substitute(lookup), b.substitute(lookup)),
            SymExprKind::Neg(a) => SymExpr::neg(a.substitute(lookup)),
            SymExprKind::Func(name, args) => SymExpr::func(
                name.clone(),
                args.iter().map(|a| a.substitute(lookup)).collect(),
            ),
        }
    }

    /// Evaluate a fully substituted expression to a complex number.
    ///
    /// Errors with `FreeSymbol` if any variable remains, and with
    /// `UnknownFunction`/`WrongArity` for malformed function nodes.
    pub fn eval(&self) -> Result<Complex64> {
        match self.kind.as_ref() {
            SymExprKind::Num(n) => Ok(n.to_complex()),
            SymExprKind::Var(sym) => Err(SymbolicError::FreeSymbol(sym.name.clone())),
            SymExprKind::Add(xs) => {
                let mut acc = Complex64::new(0.0, 0.0);
                for x in xs {
                    acc += x.eval()?;
                }
                Ok(acc)
            }
            SymExprKind::Mul(xs) => {
                let mut acc = Complex64::new(1.0, 0.0);
                for x in xs {
                    acc *= x.eval()?;
                }
                Ok(acc)
            }
            SymExprKind::Pow(a, b) => Ok(eval_pow(a.eval()?, b.eval()?)),
            SymExprKind::Neg(a) => Ok(-a.eval()?),
            SymExprKind::Func(name, args) => eval_func(name, args),
        }
    }
}

/// Power of two evaluated operands. Real operands with a real-valued
/// result stay exactly real; `powc` routes through complex exp/ln and
/// would leave a floating-point imaginary residue on e.g. `(-2)^2`.
fn eval_pow(base: Complex64, exp: Complex64) -> Complex64 {
    if base.im == 0.0 && exp.im == 0.0 {
        if exp.re.fract() == 0.0 && exp.re.abs() <= i32::MAX as f64 {
            return Complex64::new(base.re.powi(exp.re as i32), 0.0);
        }
        if base.re >= 0.0 {
            return Complex64::new(base.re.powf(exp.re), 0.0);
        }
        // Negative base, non-integral exponent: genuinely complex.
    }
    base.powc(exp)
}

fn eval_func(name: &str, args: &[SymExpr]) -> Result<Complex64> {
    let unary = |args: &[SymExpr]| -> Result<Complex64> {
        if args.len() != 1 {
            return Err(SymbolicError::WrongArity {
                func: name.to_string(),
                expected: 1,
                got: args.len(),
            });
        }
        args[0].eval()
    };

    match name {
        "sin" => Ok(unary(args)?.sin()),
        "cos" => Ok(unary(args)?.cos()),
        "tan" => Ok(unary(args)?.tan()),
        "exp" => Ok(unary(args)?.exp()),
        "ln" => Ok(unary(args)?.ln()),
        "sqrt" => Ok(unary(args)?.sqrt()),
        "conj" => Ok(unary(args)?.conj()),
        _ => Err(SymbolicError::UnknownFunction(name.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bind(name: &str, expr: SymExpr) -> impl Fn(&Symbol) -> Option<SymExpr> {
        let name = name.to_string();
        move |sym: &Symbol| (sym.name == name).then(|| expr.clone())
    }

    #[test]
    fn substitute_replaces_bound_vars_only() {
        let expr = SymExpr::add(vec![SymExpr::var("x"), SymExpr::var("y")]);
        let subbed = expr.substitute(&bind("x", SymExpr::int(2)));
        assert_eq!(
            subbed,
            SymExpr::add(vec![SymExpr::int(2), SymExpr::var("y")])
        );
        assert!(subbed.has_free_symbols());
    }

    #[test]
    fn substitute_is_single_pass() {
        // x -> y within one pass does not chase y -> anything.
        let expr = SymExpr::var("x");
        let subbed = expr.substitute(&bind("x", SymExpr::var("y")));
        assert_eq!(subbed, SymExpr::var("y"));
    }

    #[test]
    fn substitute_with_no_binding_is_identity() {
        let expr = SymExpr::mul(vec![SymExpr::var("a"), SymExpr::int(3)]);
        let subbed = expr.substitute(&|_| None);
        assert_eq!(subbed, expr);
    }

    #[test]
    fn eval_arithmetic() {
        // 2 * 3 + (-1) = 5
        let expr = SymExpr::add(vec![
            SymExpr::mul(vec![SymExpr::int(2), SymExpr::int(3)]),
            SymExpr::neg(SymExpr::int(1)),
        ]);
        assert_eq!(expr.eval().unwrap(), Complex64::new(5.0, 0.0));
    }

    #[test]
    fn eval_real_powers_stay_exactly_real() {
        let sq = SymExpr::pow(SymExpr::real(-2.0), SymExpr::int(2));
        assert_eq!(sq.eval().unwrap(), Complex64::new(4.0, 0.0));

        let cube = SymExpr::pow(SymExpr::real(-2.0), SymExpr::int(3));
        assert_eq!(cube.eval().unwrap(), Complex64::new(-8.0, 0.0));

        let sq_pos = SymExpr::pow(SymExpr::real(3.0), SymExpr::int(2));
        assert_eq!(sq_pos.eval().unwrap(), Complex64::new(9.0, 0.0));

        let root = SymExpr::pow(SymExpr::real(9.0), SymExpr::real(0.5));
        assert_eq!(root.eval().unwrap(), Complex64::new(3.0, 0.0));
    }

    #[test]
    fn eval_negative_base_fractional_power_is_complex() {
        // (-1)^0.5 = i
        let expr = SymExpr::pow(SymExpr::real(-1.0), SymExpr::real(0.5));
        let v = expr.eval().unwrap();
        assert!(v.im != 0.0);
        assert!((v.im - 1.0).abs() < 1e-12);
    }

    #[test]
    fn eval_produces_complex_from_real_inputs() {
        // sqrt(-1) = i
        let expr = SymExpr::func("sqrt", vec![SymExpr::int(-1)]);
        let v = expr.eval().unwrap();
        assert!(v.re.abs() < 1e-12);
        assert!((v.im - 1.0).abs() < 1e-12);
    }

    #[test]
    fn eval_rejects_free_symbols() {
        let expr = SymExpr::add(vec![SymExpr::var("x"), SymExpr::int(1)]);
        assert_eq!(
            expr.eval(),
            Err(SymbolicError::FreeSymbol("x".to_string()))
        );
    }

    #[test]
    fn eval_rejects_unknown_functions_and_bad_arity() {
        let unknown = SymExpr::func("frobnicate", vec![SymExpr::int(1)]);
        assert!(matches!(
            unknown.eval(),
            Err(SymbolicError::UnknownFunction(_))
        ));

        let bad = SymExpr::func("sin", vec![SymExpr::int(1), SymExpr::int(2)]);
        assert!(matches!(bad.eval(), Err(SymbolicError::WrongArity { .. })));
    }
}
