//! Boolean filter expressions and their Solr rendering.
//!
//! Builders assemble [`Expr`] trees; the compiler turns each top-level tree
//! into one `fq` string through [`Display`](std::fmt::Display). At the top
//! level the operands of an `AND`/`OR` are written bare, nested compound
//! operands are wrapped in parentheses.

use crate::grammar::QueryOperation;
use std::fmt;

/// Right-hand side of a `field:value` term.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// `field:"value"`
    Quoted(String),
    /// `field:value`, negative numbers escaped as `field:\-1`.
    Number(String),
    /// Written verbatim, e.g. wildcards or `/regex/`.
    Pattern(String),
}

/// One end of a range.
#[derive(Debug, Clone, PartialEq)]
pub enum Bound {
    Inclusive(String),
    Exclusive(String),
    Unbounded,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Term { field: String, value: Literal },
    Range { field: String, lower: Bound, upper: Bound },
    /// Documents without any value for `field`.
    Missing { field: String },
    Not(Box<Expr>),
    And(Vec<Expr>),
    Or(Vec<Expr>),
}

impl Expr {
    pub fn quoted(field: impl Into<String>, value: impl Into<String>) -> Self {
        Expr::Term {
            field: field.into(),
            value: Literal::Quoted(value.into()),
        }
    }

    pub fn number(field: impl Into<String>, value: impl Into<String>) -> Self {
        Expr::Term {
            field: field.into(),
            value: Literal::Number(value.into()),
        }
    }

    pub fn pattern(field: impl Into<String>, value: impl Into<String>) -> Self {
        Expr::Term {
            field: field.into(),
            value: Literal::Pattern(value.into()),
        }
    }

    pub fn range(field: impl Into<String>, lower: Bound, upper: Bound) -> Self {
        Expr::Range {
            field: field.into(),
            lower,
            upper,
        }
    }

    pub fn missing(field: impl Into<String>) -> Self {
        Expr::Missing {
            field: field.into(),
        }
    }

    pub fn negate(self) -> Self {
        match self {
            Expr::Not(inner) => *inner,
            other => Expr::Not(Box::new(other)),
        }
    }

    /// Conjunction of `exprs`; `None` when empty, the sole operand when singular.
    pub fn all(exprs: impl IntoIterator<Item = Expr>) -> Option<Expr> {
        Self::combine(QueryOperation::And, exprs)
    }

    /// Disjunction of `exprs`; `None` when empty, the sole operand when singular.
    pub fn any(exprs: impl IntoIterator<Item = Expr>) -> Option<Expr> {
        Self::combine(QueryOperation::Or, exprs)
    }

    /// Combines with `op`, flattening nested nodes of the same kind.
    pub fn combine(op: QueryOperation, exprs: impl IntoIterator<Item = Expr>) -> Option<Expr> {
        let mut operands = Vec::new();
        for expr in exprs {
            match (op, expr) {
                (QueryOperation::And, Expr::And(inner)) | (QueryOperation::Or, Expr::Or(inner)) => {
                    operands.extend(inner)
                }
                (_, expr) => operands.push(expr),
            }
        }
        match operands.len() {
            0 => None,
            1 => operands.pop(),
            _ => Some(match op {
                QueryOperation::And => Expr::And(operands),
                QueryOperation::Or => Expr::Or(operands),
            }),
        }
    }

    fn is_compound(&self) -> bool {
        matches!(self, Expr::And(_) | Expr::Or(_))
    }

    fn write(&self, f: &mut fmt::Formatter<'_>, nested: bool) -> fmt::Result {
        match self {
            Expr::Term { field, value } => match value {
                Literal::Quoted(v) => write!(f, "{}:\"{}\"", field, v),
                Literal::Number(v) if v.starts_with('-') => write!(f, "{}:\\{}", field, v),
                Literal::Number(v) | Literal::Pattern(v) => write!(f, "{}:{}", field, v),
            },
            Expr::Range {
                field,
                lower,
                upper,
            } => {
                let (open, low) = match lower {
                    Bound::Inclusive(v) => ('[', v.as_str()),
                    Bound::Exclusive(v) => ('{', v.as_str()),
                    Bound::Unbounded => ('[', "*"),
                };
                let (high, close) = match upper {
                    Bound::Inclusive(v) => (v.as_str(), ']'),
                    Bound::Exclusive(v) => (v.as_str(), '}'),
                    Bound::Unbounded => ("*", ']'),
                };
                write!(f, "{}:{}{} TO {}{}", field, open, low, high, close)
            }
            Expr::Missing { field } => write!(f, "(* -{}:*)", field),
            Expr::Not(inner) => {
                f.write_str("-")?;
                if inner.is_compound() {
                    f.write_str("(")?;
                    inner.write(f, false)?;
                    f.write_str(")")
                } else {
                    inner.write(f, true)
                }
            }
            Expr::And(operands) | Expr::Or(operands) => {
                let keyword = if matches!(self, Expr::And(_)) {
                    " AND "
                } else {
                    " OR "
                };
                if nested {
                    f.write_str("(")?;
                }
                for (i, operand) in operands.iter().enumerate() {
                    if i > 0 {
                        f.write_str(keyword)?;
                    }
                    operand.write(f, true)?;
                }
                if nested {
                    f.write_str(")")?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write(f, false)
    }
}
