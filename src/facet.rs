//! Facet expressions.
//!
//! A facet request is a `;` separated list of terms:
//!
//! - `field`, `field:10`, `field[a,b]:10` - term counts
//! - `field[1..1000]:100` - histogram over a numeric field
//! - `field[1..1000]:100:label___filter` - labelled histogram restricted by a filter
//! - `avg(gerp)` - aggregation function
//! - `type>>biotypes` - nested facet, one level per `>>`
//! - `chromDensity[1,2]:500000` - variant density along chromosomes, expanded
//!   into a labelled `start` histogram
//!
//! Only `chromDensity` terms are validated; everything else is passed through
//! to the facet expression. The expanded expression is also rendered as a
//! Solr JSON facet, leaving out terms that have no JSON form.

use crate::{Error, Result};
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Number, Value, json};
use std::sync::LazyLock;

pub const CHROM_DENSITY: &str = "chromDensity";

/// Default histogram bucket width of `chromDensity`, in bases.
pub const DEFAULT_STEP: u64 = 1_000_000;

const FACET_SEPARATOR: char = ';';
const INCLUDE_SEPARATOR: char = ',';
const LABEL_SEPARATOR: &str = "___";
const NESTED_SEPARATOR: &str = ">>";

static CATEGORICAL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([a-zA-Z][a-zA-Z0-9_.]*)(\[[^\]]*\])?(:\d+)?$")
        .expect("categorical facet pattern is valid")
});

static RANGE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([a-zA-Z][a-zA-Z0-9_.]*)\[([^\]]+)\.\.([^\]]+)\]:([^:]+)(?::(.+))?$")
        .expect("range facet pattern is valid")
});

static FUNCTION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(avg|sum|sumsq|min|max|unique|hll|percentile|variance|stddev)\(([^()]+)\)$")
        .expect("function facet pattern is valid")
});

/// Chromosome lengths of a reference assembly, in table order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChromosomeTable {
    lengths: Vec<(String, u64)>,
}

impl ChromosomeTable {
    pub fn new<I, S>(lengths: I) -> Self
    where
        I: IntoIterator<Item = (S, u64)>,
        S: Into<String>,
    {
        Self {
            lengths: lengths
                .into_iter()
                .map(|(name, len)| (name.into(), len))
                .collect(),
        }
    }

    /// GRCh37 primary assembly.
    pub fn grch37() -> Self {
        Self::new([
            ("1", 249_250_621),
            ("2", 243_199_373),
            ("3", 198_022_430),
            ("4", 191_154_276),
            ("5", 180_915_260),
            ("6", 171_115_067),
            ("7", 159_138_663),
            ("8", 146_364_022),
            ("9", 141_213_431),
            ("10", 135_534_747),
            ("11", 135_006_516),
            ("12", 133_851_895),
            ("13", 115_169_878),
            ("14", 107_349_540),
            ("15", 102_531_392),
            ("16", 90_354_753),
            ("17", 81_195_210),
            ("18", 78_077_248),
            ("19", 59_128_983),
            ("20", 63_025_520),
            ("21", 48_129_895),
            ("22", 51_304_566),
            ("X", 155_270_560),
            ("Y", 59_373_566),
            ("MT", 16_571),
        ])
    }

    pub fn length(&self, chromosome: &str) -> Option<u64> {
        self.lengths
            .iter()
            .find(|(name, _)| name == chromosome)
            .map(|(_, len)| *len)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.lengths.iter().map(|(name, _)| name.as_str())
    }

}

impl Default for ChromosomeTable {
    fn default() -> Self {
        Self::grch37()
    }
}

/// A translated facet request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FacetRequest {
    /// Facet expression with every `chromDensity` term expanded.
    pub expression: String,
    /// Solr JSON facet, sent as `json.facet`.
    pub json: Value,
}

/// Expands `chromDensity` terms and renders the JSON facet.
pub fn translate(facet: &str, chromosomes: &ChromosomeTable) -> Result<FacetRequest> {
    let terms = facet
        .split(FACET_SEPARATOR)
        .map(str::trim)
        .filter(|term| !term.is_empty())
        .map(|term| {
            if term.contains(CHROM_DENSITY) {
                expand_chrom_density(term, chromosomes)
            } else {
                Ok(term.to_string())
            }
        })
        .collect::<Result<Vec<_>>>()?;

    if terms.is_empty() {
        return Err(Error::malformed_facet(facet, "empty facet expression"));
    }

    let mut json = Map::new();
    for term in &terms {
        match json_facet(term) {
            Some((name, body)) => {
                json.insert(name, body);
            }
            None => tracing::debug!(term = term.as_str(), "facet term has no JSON form"),
        }
    }

    Ok(FacetRequest {
        expression: terms.join(";"),
        json: Value::Object(json),
    })
}

/// `chromDensity[1,2]:500000` to
/// `start[1..249250621]:500000:chromDensity___chromosome:1 OR chromosome:2`.
fn expand_chrom_density(term: &str, chromosomes: &ChromosomeTable) -> Result<String> {
    let caps = CATEGORICAL_PATTERN
        .captures(term)
        .ok_or_else(|| Error::malformed_facet(term, "invalid syntax"))?;
    if &caps[1] != CHROM_DENSITY {
        return Err(Error::malformed_facet(term, "invalid syntax"));
    }

    let step = match caps.get(3) {
        Some(m) => m.as_str()[1..]
            .parse::<u64>()
            .map_err(|_| Error::malformed_facet(term, "invalid step"))?,
        None => DEFAULT_STEP,
    };
    if step == 0 {
        return Err(Error::malformed_facet(term, "step must be positive"));
    }

    let selected: Vec<&str> = match caps.get(2) {
        Some(include) => include
            .as_str()
            .trim_matches(|c| c == '[' || c == ']')
            .split(INCLUDE_SEPARATOR)
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .collect(),
        None => chromosomes.names().collect(),
    };

    let mut max_length = 0;
    for chromosome in &selected {
        let length = chromosomes.length(chromosome).ok_or_else(|| {
            Error::malformed_facet(term, format!("unknown chromosome '{}'", chromosome))
        })?;
        max_length = max_length.max(length);
    }
    if selected.is_empty() {
        return Err(Error::malformed_facet(term, "no chromosomes selected"));
    }

    let filter = selected
        .iter()
        .map(|c| format!("chromosome:{}", c))
        .collect::<Vec<_>>()
        .join(" OR ");
    Ok(format!(
        "start[1..{}]:{}:{}{}{}",
        max_length, step, CHROM_DENSITY, LABEL_SEPARATOR, filter
    ))
}

/// JSON facet entry of one term, keyed by its label, field or function.
/// Each `>>` level nests under the previous one.
fn json_facet(term: &str) -> Option<(String, Value)> {
    let levels: Vec<&str> = term.split(NESTED_SEPARATOR).map(str::trim).collect();
    let mut levels = levels.into_iter().rev();
    let (mut name, mut body) = json_level(levels.next()?)?;
    for level in levels {
        let (outer_name, mut outer) = json_level(level)?;
        // functions are leaves
        if !outer.is_object() {
            return None;
        }
        let mut inner = Map::new();
        inner.insert(name, body);
        outer["facet"] = Value::Object(inner);
        name = outer_name;
        body = outer;
    }
    Some((name, body))
}

fn json_level(term: &str) -> Option<(String, Value)> {
    if FUNCTION_PATTERN.is_match(term) {
        return Some((term.to_string(), json!(term)));
    }

    if let Some(caps) = RANGE_PATTERN.captures(term) {
        let field = &caps[1];
        let start = parse_number(&caps[2])?;
        let end = parse_number(&caps[3])?;
        let gap = parse_number(&caps[4]).filter(|gap| gap.as_f64().is_some_and(|g| g > 0.0))?;

        let mut body = json!({
            "type": "range",
            "field": field,
            "start": start,
            "end": end,
            "gap": gap,
        });
        let name = match caps.get(5) {
            Some(suffix) => {
                let (label, filter) = match suffix.as_str().split_once(LABEL_SEPARATOR) {
                    Some((label, filter)) => (label, Some(filter)),
                    None => (suffix.as_str(), None),
                };
                if let Some(filter) = filter {
                    body["domain"] = json!({ "filter": filter });
                }
                label.to_string()
            }
            None => field.to_string(),
        };
        return Some((name, body));
    }

    let caps = CATEGORICAL_PATTERN.captures(term)?;
    let field = &caps[1];
    let mut body = json!({ "type": "terms", "field": field });
    if let Some(limit) = caps.get(3) {
        let limit: u64 = limit.as_str()[1..].parse().ok()?;
        body["limit"] = json!(limit);
    }
    if let Some(include) = caps.get(2) {
        let filter = include
            .as_str()
            .trim_matches(|c| c == '[' || c == ']')
            .split(INCLUDE_SEPARATOR)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(|v| format!("{}:\"{}\"", field, v))
            .collect::<Vec<_>>()
            .join(" OR ");
        if !filter.is_empty() {
            body["domain"] = json!({ "filter": filter });
        }
    }
    Some((field.to_string(), body))
}

/// Integers stay integers; other finite numbers become floats.
fn parse_number(value: &str) -> Option<Number> {
    let value = value.trim();
    if let Ok(n) = value.parse::<i64>() {
        return Some(Number::from(n));
    }
    value
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .and_then(Number::from_f64)
}
