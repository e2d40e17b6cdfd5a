use std::collections::HashMap;

use super::ast::Expr;
use super::error::GuardError;

/// The Global Environment: a `String -> f64` mapping shared between the
/// simulation engine and the CPN. Guards only ever read from it.
pub type Env = HashMap<String, f64>;

/// Evaluate a compiled guard expression against an environment.
///
/// Pure and stateless: no interior mutability, so a single compiled `Expr`
/// can be evaluated concurrently from multiple threads if ever needed,
/// though the engine itself is single-threaded (see `crate::engine`).
/// `and`/`or` short-circuit left-to-right.
pub fn eval(expr: &Expr, env: &Env) -> Result<bool, GuardError> {
    match expr {
        Expr::And(lhs, rhs) => Ok(eval(lhs, env)? && eval(rhs, env)?),
        Expr::Or(lhs, rhs) => Ok(eval(lhs, env)? || eval(rhs, env)?),
        Expr::Not(inner) => Ok(!eval(inner, env)?),
        Expr::Compare(op, lhs, rhs) => {
            let lhs = eval_num(lhs, env)?;
            let rhs = eval_num(rhs, env)?;
            Ok(op.apply(lhs, rhs))
        }
        Expr::Literal(_) | Expr::Name(_) => Err(GuardError::TypeMismatch(expr.clone())),
    }
}

fn eval_num(expr: &Expr, env: &Env) -> Result<f64, GuardError> {
    match expr {
        Expr::Literal(n) => Ok(*n),
        Expr::Name(name) => env
            .get(name)
            .copied()
            .ok_or_else(|| GuardError::UndefinedName(name.clone())),
        other => Err(GuardError::TypeMismatch(other.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::super::parser::parse;
    use super::*;

    fn env(pairs: &[(&str, f64)]) -> Env {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn evaluates_simple_comparison() {
        let expr = parse("y < 10").unwrap();
        assert!(eval(&expr, &env(&[("y", 5.0)])).unwrap());
        assert!(!eval(&expr, &env(&[("y", 15.0)])).unwrap());
    }

    #[test]
    fn undefined_name_is_an_error() {
        let expr = parse("y < 10").unwrap();
        assert_eq!(
            eval(&expr, &env(&[])),
            Err(GuardError::UndefinedName("y".into()))
        );
    }

    #[test]
    fn short_circuits_and_or() {
        // `y` is undefined, but `and`/`or` must short-circuit before reaching it.
        let and_expr = parse("x < 0 and y < 0").unwrap();
        assert!(!eval(&and_expr, &env(&[("x", 1.0)])).unwrap());

        let or_expr = parse("x >= 0 or y < 0").unwrap();
        assert!(eval(&or_expr, &env(&[("x", 1.0)])).unwrap());
    }

    #[test]
    fn qualified_dotted_names_resolve() {
        let expr = parse("battery.SOC >= 0.5").unwrap();
        assert!(eval(&expr, &env(&[("battery.SOC", 0.75)])).unwrap());
    }

    #[test]
    fn boolean_subexpression_as_operand_is_type_mismatch() {
        let expr = parse("(a < 1 and b < 1) < 2").unwrap();
        assert!(matches!(
            eval(&expr, &env(&[("a", 0.0), ("b", 0.0)])),
            Err(GuardError::TypeMismatch(_))
        ));
    }
}
