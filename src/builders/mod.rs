//! Per filter-kind clause builders.
//!
//! Every builder takes the raw filter value plus whatever context it needs
//! and returns [`Expr`](crate::expr::Expr) trees, or an error naming the
//! offending key and value. Nothing is rendered here.
//!
//! - [`category`] - `field:"value"` term lists
//! - [`range`] / [`numeric`] - comparison operators to Solr ranges
//! - [`score`] - `name<op>value` annotation scores
//! - [`population_frequency`] - `study:cohort<op>value` ALT/REF/MAF frequencies
//! - [`genotype`] / [`format`] - per-sample filters
//! - [`FileFilters`] - file presence, QUAL and FILTER

mod category;
mod file;
mod frequency;
mod range;
mod sample;
mod score;

pub use category::{category, category_partial};
pub use file::FileFilters;
pub use frequency::{FrequencyKind, population_frequency};
pub use range::{MISSING_VALUE, MissingValues, numeric, range};
pub use sample::{format, genotype, sample_names};
pub use score::score;

/// Separator between the parts of dynamic per-study/per-sample field names.
pub const FIELD_SEPARATOR: &str = "__";

/// Joins `parts` into a dynamic field name, e.g. `gt__S1__NA12877`.
pub fn field_name(parts: &[&str]) -> String {
    parts.join(FIELD_SEPARATOR)
}
