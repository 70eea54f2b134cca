use super::field_name;
use super::range::{MissingValues, parse_number, range};
use crate::expr::Expr;
use crate::grammar::{Grammar, Operator, QueryOperation, ScoreGrammar, split_value};
use crate::{Error, Result};

/// Which allele frequency a population filter is expressed in.
///
/// The index stores only the alternate allele frequency, so reference and
/// minor allele thresholds are rewritten against it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrequencyKind {
    Alt,
    Ref,
    Maf,
}

impl FrequencyKind {
    /// Rewrites `op value` into the equivalent ALT comparison. Returns the
    /// complemented value when it changed.
    fn to_alt(self, op: Operator, value: f64) -> (Operator, Option<f64>) {
        match self {
            FrequencyKind::Alt => (op, None),
            FrequencyKind::Maf if value <= 0.5 => (op, None),
            FrequencyKind::Maf | FrequencyKind::Ref => (op.mirrored(), Some(1.0 - value)),
        }
    }
}

/// Renders a complemented frequency without float noise (`1 - 0.9` is `0.1`).
fn format_frequency(value: f64) -> String {
    let rounded = (value * 1e12).round() / 1e12;
    format!("{}", rounded)
}

/// Population frequencies such as `GNOMAD_GENOMES:ALL<0.01;1kG_phase3:EUR>0.2`.
///
/// `prefix` selects the field family (`popFreq` or `stats`). Thresholds below
/// a value also accept variants without a recorded frequency.
pub fn population_frequency(
    key: &str,
    prefix: &str,
    value: &str,
    kind: FrequencyKind,
) -> Result<Option<Expr>> {
    let op = QueryOperation::detect_or_and(value);

    let mut clauses = Vec::new();
    for token in split_value(value) {
        let predicate = ScoreGrammar
            .tokenize(token)
            .ok_or_else(|| Error::malformed(key, token, "expected study:cohort<operator>value"))?;
        let name = predicate.name.as_deref().unwrap_or_default();
        let (study, cohort) = name
            .rsplit_once(':')
            .filter(|(study, cohort)| !study.is_empty() && !cohort.is_empty())
            .ok_or_else(|| Error::malformed(key, token, "expected study:cohort"))?;
        let frequency = parse_number(key, token, &predicate.value)?;

        let (alt_op, complement) = kind.to_alt(predicate.op, frequency);
        let alt_value = complement.map_or_else(|| predicate.value.clone(), format_frequency);

        clauses.push(range(
            key,
            &field_name(&[prefix, study, cohort]),
            alt_op.below_or_missing(),
            &alt_value,
            MissingValues::Absent,
        )?);
    }
    Ok(Expr::combine(op, clauses))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(value: &str, kind: FrequencyKind) -> String {
        population_frequency("annotationPopulationAltFrequency", "popFreq", value, kind)
            .unwrap()
            .unwrap()
            .to_string()
    }

    #[test]
    fn test_alt_below_accepts_missing() {
        assert_eq!(
            render("1kG_phase3:CEU<0.01", FrequencyKind::Alt),
            "popFreq__1kG_phase3__CEU:[0 TO 0.01} OR (* -popFreq__1kG_phase3__CEU:*)"
        );
        assert_eq!(
            render("1kG_phase3:CEU<<=0.01", FrequencyKind::Alt),
            "popFreq__1kG_phase3__CEU:[0 TO 0.01] OR (* -popFreq__1kG_phase3__CEU:*)"
        );
    }

    #[test]
    fn test_alt_above() {
        assert_eq!(
            render("GNOMAD:ALL>0.2", FrequencyKind::Alt),
            "popFreq__GNOMAD__ALL:{0.2 TO *]"
        );
    }

    #[test]
    fn test_maf_mirror_matches_alt() {
        assert_eq!(
            render("GNOMAD:ALL>0.6", FrequencyKind::Maf),
            render("GNOMAD:ALL<0.4", FrequencyKind::Alt)
        );
        assert_eq!(
            render("GNOMAD:ALL<=0.7", FrequencyKind::Maf),
            render("GNOMAD:ALL>=0.3", FrequencyKind::Alt)
        );
    }

    #[test]
    fn test_maf_below_half_unchanged() {
        assert_eq!(
            render("GNOMAD:ALL>0.1", FrequencyKind::Maf),
            render("GNOMAD:ALL>0.1", FrequencyKind::Alt)
        );
    }

    #[test]
    fn test_ref_always_mirrors() {
        assert_eq!(
            render("GNOMAD:ALL>0.9", FrequencyKind::Ref),
            render("GNOMAD:ALL<0.1", FrequencyKind::Alt)
        );
        assert_eq!(
            render("GNOMAD:ALL>>=0.25", FrequencyKind::Ref),
            "popFreq__GNOMAD__ALL:[0 TO 0.75] OR (* -popFreq__GNOMAD__ALL:*)"
        );
    }

    #[test]
    fn test_multiple_cohorts() {
        assert_eq!(
            render("A:X>0.1;B:Y>0.2", FrequencyKind::Alt),
            "popFreq__A__X:{0.1 TO *] AND popFreq__B__Y:{0.2 TO *]"
        );
    }

    #[test]
    fn test_stats_prefix() {
        let e = population_frequency("statsMaf", "stats", "S1:ALL<0.3", FrequencyKind::Maf)
            .unwrap()
            .unwrap();
        assert_eq!(e.to_string(), "stats__S1__ALL:[0 TO 0.3} OR (* -stats__S1__ALL:*)");
    }

    #[test]
    fn test_malformed() {
        let err = population_frequency("annotationPopulationMaf", "popFreq", "ALL<0.1", FrequencyKind::Maf)
            .unwrap_err();
        assert!(matches!(err, Error::MalformedFilterExpression { .. }));
        assert!(
            population_frequency("annotationPopulationMaf", "popFreq", "A:B<x", FrequencyKind::Maf)
                .is_err()
        );
    }

    #[test]
    fn test_non_finite_frequency() {
        for value in ["A:B>NaN", "A:B<inf", "A:B>=-inf"] {
            for kind in [FrequencyKind::Alt, FrequencyKind::Maf, FrequencyKind::Ref] {
                let err = population_frequency("annotationPopulationMaf", "popFreq", value, kind)
                    .unwrap_err();
                assert!(matches!(err, Error::MalformedFilterExpression { .. }), "{}", value);
            }
        }
    }
}
