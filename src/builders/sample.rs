use super::field_name;
use super::range::{MissingValues, parse_number, range};
use crate::expr::Expr;
use crate::grammar::{Grammar, QueryOperation, ScoreGrammar};
use crate::{Error, Result};

/// Values of a per-sample filter grouped by sample, in request order.
#[derive(Debug, PartialEq)]
struct SampleGroups {
    op: QueryOperation,
    samples: Vec<(String, Vec<String>)>,
}

/// Parses `s1:a,b;s2:c`. Tokens without a `sample:` prefix extend the
/// previous sample; the separator in front of each new sample decides how
/// samples are combined (any `;` means AND).
fn group_by_sample(key: &str, value: &str) -> Result<SampleGroups> {
    let mut samples: Vec<(String, Vec<String>)> = Vec::new();
    let mut op = QueryOperation::Or;
    let mut separator = None;
    let mut rest = value;

    loop {
        let end = rest.find([',', ';']).unwrap_or(rest.len());
        let token = rest[..end].trim();
        if !token.is_empty() {
            match token.split_once(':') {
                Some((sample, item)) => {
                    let (sample, item) = (sample.trim(), item.trim());
                    if sample.is_empty() || item.is_empty() {
                        return Err(Error::malformed(key, value, "expected sample:value"));
                    }
                    if !samples.is_empty() && separator == Some(';') {
                        op = QueryOperation::And;
                    }
                    samples.push((sample.to_string(), vec![item.to_string()]));
                }
                None => match samples.last_mut() {
                    Some((_, items)) => items.push(token.to_string()),
                    None => return Err(Error::malformed(key, value, "missing sample name")),
                },
            }
        }
        if end == rest.len() {
            break;
        }
        separator = rest[end..].chars().next();
        rest = &rest[end + 1..];
    }

    Ok(SampleGroups { op, samples })
}

/// Sample names referenced by a genotype or format filter.
pub fn sample_names(key: &str, value: &str) -> Result<Vec<String>> {
    Ok(group_by_sample(key, value)?
        .samples
        .into_iter()
        .map(|(sample, _)| sample)
        .collect())
}

/// Genotype filter such as `NA12877:0/1,1/1;NA12878:0/0`.
///
/// Genotypes of one sample are ORed, samples are combined with the operator
/// of the request. `study` is the search id of the study in context.
pub fn genotype(key: &str, study: Option<&str>, value: &str) -> Result<Option<Expr>> {
    let study = study.ok_or_else(|| Error::MissingStudyContext {
        key: key.to_string(),
    })?;
    let groups = group_by_sample(key, value)?;

    let per_sample = groups.samples.iter().filter_map(|(sample, genotypes)| {
        let field = field_name(&["gt", study, sample.as_str()]);
        Expr::any(genotypes.iter().map(|gt| Expr::quoted(field.as_str(), gt.as_str())))
    });
    Ok(Expr::combine(groups.op, per_sample.collect::<Vec<_>>()))
}

/// Sample format filter such as `NA12877:DP>10;NA12878:DP<=5`.
///
/// The index only stores the read depth, so every sample must name exactly
/// one field and it has to be `DP`.
pub fn format(key: &str, study: Option<&str>, value: &str) -> Result<Option<Expr>> {
    let study = study.ok_or_else(|| Error::MissingStudyContext {
        key: key.to_string(),
    })?;
    let groups = group_by_sample(key, value)?;

    let mut clauses = Vec::with_capacity(groups.samples.len());
    for (sample, formats) in &groups.samples {
        if formats.len() > 1 {
            return Err(Error::UnsupportedFormatField {
                key: key.to_string(),
                field: formats.join(","),
            });
        }
        let predicate = ScoreGrammar
            .tokenize(&formats[0])
            .ok_or_else(|| Error::malformed(key, formats[0].as_str(), "expected FIELD<operator>value"))?;
        let name = predicate.name.unwrap_or_default();
        if !name.eq_ignore_ascii_case("DP") {
            return Err(Error::UnsupportedFormatField {
                key: key.to_string(),
                field: name,
            });
        }
        parse_number(key, formats[0].as_str(), &predicate.value)?;
        clauses.push(range(
            key,
            &field_name(&["dp", study, sample.as_str()]),
            predicate.op,
            &predicate.value,
            MissingValues::IntegerSentinel,
        )?);
    }
    Ok(Expr::combine(groups.op, clauses))
}
