use super::range::{MissingValues, range};
use crate::expr::Expr;
use crate::grammar::{Grammar, Operator, QueryOperation, ScoreGrammar, split_value};
use crate::{Error, Result};

/// Index field for a score name given on the command line.
fn score_field(name: &str) -> &str {
    match name {
        "cadd_scaled" | "caddScaled" => "caddScaled",
        "cadd_raw" | "caddRaw" => "caddRaw",
        other => other,
    }
}

/// Text companion of the scores that also carry a prediction label.
fn description_field(name: &str) -> Option<&'static str> {
    match name.to_lowercase().as_str() {
        "sift" => Some("siftDesc"),
        "polyphen" => Some("polyphenDesc"),
        _ => None,
    }
}

/// Annotation scores such as `sift<0.2,polyphen>0.9` or `gerp>=2`.
///
/// `sift=tolerated` and `polyphen!=benign` match the prediction labels.
pub fn score(key: &str, value: &str) -> Result<Option<Expr>> {
    let op = QueryOperation::detect_or_and(value);

    let mut clauses = Vec::new();
    for token in split_value(value) {
        let predicate = ScoreGrammar
            .tokenize(token)
            .ok_or_else(|| Error::malformed(key, token, "expected name<operator>value"))?;
        let name = predicate.name.as_deref().unwrap_or_default();

        let textual = predicate.value.parse::<f64>().is_err();
        let clause = match description_field(name) {
            Some(desc) if textual && !predicate.op.is_ordering() => {
                let term = Expr::quoted(desc, predicate.value.as_str());
                if predicate.op == Operator::Ne {
                    term.negate()
                } else {
                    term
                }
            }
            _ => range(
                key,
                score_field(name),
                predicate.op,
                &predicate.value,
                MissingValues::Sentinel,
            )?,
        };
        clauses.push(clause);
    }
    Ok(Expr::combine(op, clauses))
}
