//! Operator tokenizer for scalar filter values.
//!
//! A filter value such as `sift<0.2;polyphen>=0.9` is first split on its
//! separators (see [`QueryOperation`]) and each token is then matched by one of
//! three grammars:
//!
//! - [`CategoryGrammar`] - `value` or `!value`
//! - [`ScoreGrammar`] - `name<op>value`, where `name` may contain colons
//! - [`NumericGrammar`] - `<op>value`, the operator defaulting to `=`
//!
//! Patterns are compiled once and shared by every call.

use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// Operators ordered longest-first so `<` never shadows `<=` or `<<`.
const OPERATORS: &str = "<<=|>>=|<<|>>|<=|>=|!=|==|<|>|=";

static SCORE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^([^=<>!]+)({OPERATORS})([^=<>!].*)$"))
        .expect("score pattern is valid")
});

static NUMERIC_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^({OPERATORS})?([^=<>!].*)$")).expect("numeric pattern is valid")
});

/// Comparison operator of a scalar predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    /// `<<`: below the bound, or no value at all.
    LtOrMissing,
    /// `<<=`
    LeOrMissing,
    /// `>>`: above the bound, or no value at all.
    GtOrMissing,
    /// `>>=`
    GeOrMissing,
}

impl Operator {
    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Ne => "!=",
            Operator::Lt => "<",
            Operator::Le => "<=",
            Operator::Gt => ">",
            Operator::Ge => ">=",
            Operator::LtOrMissing => "<<",
            Operator::LeOrMissing => "<<=",
            Operator::GtOrMissing => ">>",
            Operator::GeOrMissing => ">>=",
        }
    }

    /// Swaps the comparison direction, keeping inclusiveness and missing-value
    /// handling. Equality operators are returned unchanged.
    pub fn mirrored(self) -> Self {
        match self {
            Operator::Lt => Operator::Gt,
            Operator::Le => Operator::Ge,
            Operator::Gt => Operator::Lt,
            Operator::Ge => Operator::Le,
            Operator::LtOrMissing => Operator::GtOrMissing,
            Operator::LeOrMissing => Operator::GeOrMissing,
            Operator::GtOrMissing => Operator::LtOrMissing,
            Operator::GeOrMissing => Operator::LeOrMissing,
            op @ (Operator::Eq | Operator::Ne) => op,
        }
    }

    /// Promotes `<`/`<=` to the variants that also accept a missing value.
    pub fn below_or_missing(self) -> Self {
        match self {
            Operator::Lt => Operator::LtOrMissing,
            Operator::Le => Operator::LeOrMissing,
            op => op,
        }
    }

    /// True for operators whose operand must be a number.
    pub fn is_ordering(&self) -> bool {
        !matches!(self, Operator::Eq | Operator::Ne)
    }
}

impl FromStr for Operator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "=" | "==" => Ok(Operator::Eq),
            "!=" => Ok(Operator::Ne),
            "<" => Ok(Operator::Lt),
            "<=" => Ok(Operator::Le),
            ">" => Ok(Operator::Gt),
            ">=" => Ok(Operator::Ge),
            "<<" => Ok(Operator::LtOrMissing),
            "<<=" => Ok(Operator::LeOrMissing),
            ">>" => Ok(Operator::GtOrMissing),
            ">>=" => Ok(Operator::GeOrMissing),
            other => Err(format!("unknown operator '{}'", other)),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Boolean combinator implied by the separators of a multi-valued filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryOperation {
    And,
    Or,
}

impl QueryOperation {
    /// `;` anywhere means AND, otherwise `,` means OR. A single token has no
    /// combinator.
    pub fn detect(value: &str) -> Option<Self> {
        if value.contains(';') {
            Some(QueryOperation::And)
        } else if value.contains(',') {
            Some(QueryOperation::Or)
        } else {
            None
        }
    }

    /// Like [`detect`](Self::detect) but falls back to AND for single tokens.
    pub fn detect_or_and(value: &str) -> Self {
        Self::detect(value).unwrap_or(QueryOperation::And)
    }

    /// Like [`detect`](Self::detect), ignoring separators inside double
    /// quotes.
    pub fn detect_unquoted(value: &str) -> Option<Self> {
        let unquoted: String = value.split('"').step_by(2).collect();
        Self::detect(&unquoted)
    }
}

/// Splits a filter value on both `,` and `;`, skipping empty tokens.
pub fn split_value(value: &str) -> Vec<&str> {
    value
        .split([',', ';'])
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .collect()
}

/// Splits on `,`/`;` outside of double quotes, removing the quotes.
pub fn split_quoted(value: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    for c in value.chars() {
        match c {
            '"' => quoted = !quoted,
            ',' | ';' if !quoted => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

/// A tokenized scalar predicate.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub name: Option<String>,
    pub op: Operator,
    pub value: String,
}

/// Strategy turning a single value token into a [`Predicate`].
pub trait Grammar {
    fn tokenize(&self, token: &str) -> Option<Predicate>;
}

/// Plain literals with an optional `!` negation.
pub struct CategoryGrammar;

impl Grammar for CategoryGrammar {
    fn tokenize(&self, token: &str) -> Option<Predicate> {
        let (op, value) = match token.strip_prefix('!') {
            Some(rest) => (Operator::Ne, rest),
            None => (Operator::Eq, token),
        };
        if value.is_empty() {
            return None;
        }
        Some(Predicate {
            name: None,
            op,
            value: value.to_string(),
        })
    }
}

/// `name<op>value`, e.g. `sift<0.2` or `1kG_phase3:ALL>=0.01`.
pub struct ScoreGrammar;

impl Grammar for ScoreGrammar {
    fn tokenize(&self, token: &str) -> Option<Predicate> {
        let caps = SCORE_PATTERN.captures(token.trim())?;
        Some(Predicate {
            name: Some(caps[1].trim().to_string()),
            op: caps[2].parse().ok()?,
            value: caps[3].trim().to_string(),
        })
    }
}

/// `<op>value`, e.g. `>=20`; a bare value means equality.
pub struct NumericGrammar;

impl Grammar for NumericGrammar {
    fn tokenize(&self, token: &str) -> Option<Predicate> {
        let caps = NUMERIC_PATTERN.captures(token.trim())?;
        let op = caps.get(1).map_or("", |m| m.as_str());
        Some(Predicate {
            name: None,
            op: op.parse().ok()?,
            value: caps[2].trim().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_operation() {
        assert_eq!(QueryOperation::detect("A"), None);
        assert_eq!(QueryOperation::detect("A,B"), Some(QueryOperation::Or));
        assert_eq!(QueryOperation::detect("A;B"), Some(QueryOperation::And));
        assert_eq!(QueryOperation::detect("A,B;C"), Some(QueryOperation::And));
        assert_eq!(QueryOperation::detect_or_and("A"), QueryOperation::And);
    }

    #[test]
    fn test_detect_unquoted() {
        let detect = QueryOperation::detect_unquoted;
        assert_eq!(detect(r#""A;B",C"#), Some(QueryOperation::Or));
        assert_eq!(detect(r#""A,B";C"#), Some(QueryOperation::And));
        assert_eq!(detect(r#""A;B""#), None);
        assert_eq!(detect("A;B"), Some(QueryOperation::And));
    }

    #[test]
    fn test_split_value() {
        assert_eq!(split_value("A, B;;C"), vec!["A", "B", "C"]);
        assert!(split_value("").is_empty());
    }

    #[test]
    fn test_split_quoted() {
        assert_eq!(
            split_quoted(r#""LowGQ;LowDP",PASS"#),
            vec!["LowGQ;LowDP".to_string(), "PASS".to_string()]
        );
    }

    #[test]
    fn test_score_grammar_longest_operator_first() {
        let p = ScoreGrammar.tokenize("gerp<=2.5").unwrap();
        assert_eq!(p.name.as_deref(), Some("gerp"));
        assert_eq!(p.op, Operator::Le);
        assert_eq!(p.value, "2.5");

        let p = ScoreGrammar.tokenize("1kG_phase3:ALL<<0.01").unwrap();
        assert_eq!(p.name.as_deref(), Some("1kG_phase3:ALL"));
        assert_eq!(p.op, Operator::LtOrMissing);
        assert_eq!(p.value, "0.01");

        let p = ScoreGrammar.tokenize("sift>>=-1").unwrap();
        assert_eq!(p.op, Operator::GeOrMissing);
        assert_eq!(p.value, "-1");
    }

    #[test]
    fn test_score_grammar_requires_operator() {
        assert!(ScoreGrammar.tokenize("sift").is_none());
        assert!(ScoreGrammar.tokenize("<0.2").is_none());
        assert!(ScoreGrammar.tokenize("sift<").is_none());
    }

    #[test]
    fn test_numeric_grammar() {
        let p = NumericGrammar.tokenize(">=20").unwrap();
        assert_eq!((p.op, p.value.as_str()), (Operator::Ge, "20"));

        let p = NumericGrammar.tokenize("20").unwrap();
        assert_eq!((p.op, p.value.as_str()), (Operator::Eq, "20"));

        assert!(NumericGrammar.tokenize("<>").is_none());
        assert!(NumericGrammar.tokenize("").is_none());
    }

    #[test]
    fn test_category_grammar() {
        let p = CategoryGrammar.tokenize("!SNV").unwrap();
        assert_eq!((p.op, p.value.as_str()), (Operator::Ne, "SNV"));
        assert!(CategoryGrammar.tokenize("!").is_none());
    }

    #[test]
    fn test_mirrored_parity() {
        for op in [
            Operator::Lt,
            Operator::Le,
            Operator::Gt,
            Operator::Ge,
            Operator::LtOrMissing,
            Operator::LeOrMissing,
            Operator::GtOrMissing,
            Operator::GeOrMissing,
        ] {
            assert_ne!(op.mirrored(), op);
            assert_eq!(op.mirrored().mirrored(), op);
        }
        assert_eq!(Operator::Eq.mirrored(), Operator::Eq);
    }
}
