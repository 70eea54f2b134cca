use crate::expr::{Bound, Expr};
use crate::grammar::{Grammar, NumericGrammar, Operator};
use crate::{Error, Result};

/// Value the index stores for numeric fields without data.
pub const MISSING_VALUE: f64 = -100.0;

/// How a numeric field represents missing data in the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingValues {
    /// Stored as the [`MISSING_VALUE`] sentinel, rendered `-100.0`.
    Sentinel,
    /// Stored as the sentinel in an integer field, rendered `-100`.
    IntegerSentinel,
    /// Not indexed at all (population frequencies and cohort stats).
    Absent,
}

impl MissingValues {
    fn sentinel(&self) -> String {
        match self {
            MissingValues::IntegerSentinel => format!("{}", MISSING_VALUE.round() as i64),
            _ => format!("{:.1}", MISSING_VALUE),
        }
    }
}

/// Builds the clause for `field <op> value`.
///
/// Ordering operators require a numeric `value`; equality accepts text, which
/// is matched as a quoted term.
pub fn range(
    key: &str,
    field: &str,
    op: Operator,
    value: &str,
    missing: MissingValues,
) -> Result<Expr> {
    let numeric = match value.parse::<f64>() {
        Ok(n) if !n.is_finite() => {
            return Err(Error::malformed(key, value, "value must be a finite number"));
        }
        Ok(_) => true,
        Err(_) => false,
    };
    if op.is_ordering() && !numeric {
        return Err(Error::malformed(
            key,
            value,
            format!("operator '{}' needs a numeric value", op),
        ));
    }

    let v = || value.to_string();
    let sentinel = missing.sentinel();
    let expr = match op {
        Operator::Eq | Operator::Ne => {
            let term = if numeric {
                Expr::number(field, value)
            } else {
                Expr::quoted(field, value)
            };
            if op == Operator::Ne {
                term.negate()
            } else {
                term
            }
        }
        Operator::Lt => Expr::range(field, Bound::Exclusive(sentinel), Bound::Exclusive(v())),
        Operator::Le => Expr::range(field, Bound::Exclusive(sentinel), Bound::Inclusive(v())),
        Operator::Gt => Expr::range(field, Bound::Exclusive(v()), Bound::Unbounded),
        Operator::Ge => Expr::range(field, Bound::Inclusive(v()), Bound::Unbounded),
        Operator::LtOrMissing | Operator::LeOrMissing => {
            let upper = if op == Operator::LtOrMissing {
                Bound::Exclusive(v())
            } else {
                Bound::Inclusive(v())
            };
            if missing == MissingValues::Absent {
                Expr::Or(vec![
                    Expr::range(field, Bound::Inclusive("0".to_string()), upper),
                    Expr::missing(field),
                ])
            } else {
                Expr::range(field, Bound::Inclusive(sentinel), upper)
            }
        }
        Operator::GtOrMissing | Operator::GeOrMissing => {
            let lower = if op == Operator::GtOrMissing {
                Bound::Exclusive(v())
            } else {
                Bound::Inclusive(v())
            };
            let above = Expr::range(field, lower, Bound::Unbounded);
            if missing == MissingValues::Absent {
                Expr::Or(vec![above, Expr::missing(field)])
            } else {
                Expr::Or(vec![above, Expr::number(field, sentinel)])
            }
        }
    };
    Ok(expr)
}

/// Builds the clause for a bare comparison such as `>=20` against `field`.
pub fn numeric(key: &str, field: &str, value: &str, missing: MissingValues) -> Result<Expr> {
    let predicate = NumericGrammar
        .tokenize(value)
        .ok_or_else(|| Error::malformed(key, value, "expected [operator]number"))?;
    parse_number(key, value, &predicate.value)?;
    range(key, field, predicate.op, &predicate.value, missing)
}

/// Parses the numeric operand of `token`. `NaN` and infinities are rejected.
pub(crate) fn parse_number(key: &str, token: &str, value: &str) -> Result<f64> {
    value
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or_else(|| Error::malformed(key, token, "expected a finite number"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(op: Operator, missing: MissingValues) -> String {
        range("k", "f", op, "0.5", missing).unwrap().to_string()
    }

    #[test]
    fn test_range_table() {
        let s = MissingValues::Sentinel;
        assert_eq!(render(Operator::Eq, s), "f:0.5");
        assert_eq!(render(Operator::Ne, s), "-f:0.5");
        assert_eq!(render(Operator::Lt, s), "f:{-100.0 TO 0.5}");
        assert_eq!(render(Operator::Le, s), "f:{-100.0 TO 0.5]");
        assert_eq!(render(Operator::Gt, s), "f:{0.5 TO *]");
        assert_eq!(render(Operator::Ge, s), "f:[0.5 TO *]");
        assert_eq!(render(Operator::LtOrMissing, s), "f:[-100.0 TO 0.5}");
        assert_eq!(render(Operator::LeOrMissing, s), "f:[-100.0 TO 0.5]");
        assert_eq!(render(Operator::GtOrMissing, s), r"f:{0.5 TO *] OR f:\-100.0");
        assert_eq!(render(Operator::GeOrMissing, s), r"f:[0.5 TO *] OR f:\-100.0");
    }

    #[test]
    fn test_absent_fields() {
        let a = MissingValues::Absent;
        assert_eq!(render(Operator::LtOrMissing, a), "f:[0 TO 0.5} OR (* -f:*)");
        assert_eq!(render(Operator::LeOrMissing, a), "f:[0 TO 0.5] OR (* -f:*)");
        assert_eq!(render(Operator::GtOrMissing, a), "f:{0.5 TO *] OR (* -f:*)");
        assert_eq!(render(Operator::GeOrMissing, a), "f:[0.5 TO *] OR (* -f:*)");
    }

    #[test]
    fn test_exclusive_operators_never_close_inclusively() {
        for op in [Operator::Lt, Operator::Gt] {
            let clause = render(op, MissingValues::Sentinel);
            assert!(!clause.contains('['), "{}", clause);
            assert!(!clause.contains(" 0.5]"), "{}", clause);
        }
    }

    #[test]
    fn test_negative_equality_is_escaped() {
        let e = range("k", "gerp", Operator::Eq, "-1.5", MissingValues::Sentinel).unwrap();
        assert_eq!(e.to_string(), r"gerp:\-1.5");
    }

    #[test]
    fn test_text_equality_is_quoted() {
        let e = range("k", "f", Operator::Eq, "tolerated", MissingValues::Sentinel).unwrap();
        assert_eq!(e.to_string(), r#"f:"tolerated""#);
    }

    #[test]
    fn test_ordering_needs_number() {
        let err = range("k", "f", Operator::Lt, "abc", MissingValues::Sentinel).unwrap_err();
        assert!(matches!(err, Error::MalformedFilterExpression { .. }));
    }

    #[test]
    fn test_numeric_integer_sentinel() {
        let e = numeric("format", "dp__S1__s1", "<10", MissingValues::IntegerSentinel).unwrap();
        assert_eq!(e.to_string(), "dp__S1__s1:{-100 TO 10}");
    }

    #[test]
    fn test_numeric_bare_value_is_equality() {
        let e = numeric("qual", "qual__S1__f1", "20", MissingValues::Sentinel).unwrap();
        assert_eq!(e.to_string(), "qual__S1__f1:20");
    }

    #[test]
    fn test_non_finite_values() {
        for value in ["NaN", "inf", "-inf", "infinity"] {
            for op in [Operator::Eq, Operator::Lt, Operator::GeOrMissing] {
                let err = range("k", "f", op, value, MissingValues::Absent).unwrap_err();
                assert!(matches!(err, Error::MalformedFilterExpression { .. }), "{}", value);
            }
            assert!(numeric("qual", "q", value, MissingValues::Sentinel).is_err());
        }
    }

    #[test]
    fn test_numeric_needs_number() {
        for value in ["abc", "=PASS", ">=high"] {
            let err = numeric("qual", "q", value, MissingValues::Sentinel).unwrap_err();
            assert!(matches!(err, Error::MalformedFilterExpression { .. }), "{}", value);
        }
    }

    #[test]
    fn test_numeric_malformed() {
        let err = numeric("qual", "q", ">>>", MissingValues::Sentinel).unwrap_err();
        match err {
            Error::MalformedFilterExpression { key, value, .. } => {
                assert_eq!(key, "qual");
                assert_eq!(value, ">>>");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
