use crate::expr::Expr;
use crate::grammar::{CategoryGrammar, Grammar, Operator, QueryOperation, split_value};
use crate::{Error, Result};

/// `field:"value"` for every token of `value`, combined by its separators.
///
/// Tokens prefixed with `!` are negated. Double quotes are dropped from the
/// values.
pub fn category(key: &str, field: &str, value: &str) -> Result<Option<Expr>> {
    build(key, field, value, false)
}

/// Like [`category`] but matches values as substrings (`field:*value*`).
/// Query syntax inside the values is escaped.
pub fn category_partial(key: &str, field: &str, value: &str) -> Result<Option<Expr>> {
    build(key, field, value, true)
}

fn build(key: &str, field: &str, value: &str, partial: bool) -> Result<Option<Expr>> {
    let op = QueryOperation::detect_or_and(value);
    let unquoted = value.replace('"', "");

    let mut terms = Vec::new();
    for token in split_value(&unquoted) {
        let predicate = CategoryGrammar
            .tokenize(token)
            .ok_or_else(|| Error::malformed(key, value, "empty negated value"))?;
        let term = if partial {
            Expr::pattern(field, format!("*{}*", escape_term(&predicate.value)))
        } else {
            Expr::quoted(field, predicate.value)
        };
        terms.push(match predicate.op {
            Operator::Ne => term.negate(),
            _ => term,
        });
    }
    Ok(Expr::combine(op, terms))
}

fn escape_term(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if c.is_whitespace() || r#"\+-!():^[]"{}~*?|&/"#.contains(c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(value: &str) -> String {
        category("type", "type", value).unwrap().unwrap().to_string()
    }

    #[test]
    fn test_single_value() {
        assert_eq!(render("SNV"), r#"type:"SNV""#);
        assert_eq!(render("!SNV"), r#"-type:"SNV""#);
    }

    #[test]
    fn test_or_and() {
        assert_eq!(render("SNV,INDEL"), r#"type:"SNV" OR type:"INDEL""#);
        assert_eq!(render("SNV;INDEL"), r#"type:"SNV" AND type:"INDEL""#);
        assert_eq!(render("SNV;!INDEL"), r#"type:"SNV" AND -type:"INDEL""#);
    }

    #[test]
    fn test_quotes_are_dropped() {
        assert_eq!(render(r#""SNV""#), r#"type:"SNV""#);
    }

    #[test]
    fn test_partial() {
        let e = category_partial("k", "traits", "cancer").unwrap().unwrap();
        assert_eq!(e.to_string(), "traits:*cancer*");

        let e = category_partial("k", "traits", "breast cancer,!Li-Fraumeni")
            .unwrap()
            .unwrap();
        assert_eq!(
            e.to_string(),
            r"traits:*breast\ cancer* OR -traits:*Li\-Fraumeni*"
        );
    }

    #[test]
    fn test_empty_value() {
        assert_eq!(category("type", "type", ",;").unwrap(), None);
        assert!(category("type", "type", "!").is_err());
    }
}
