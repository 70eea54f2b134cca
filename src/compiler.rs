//! Filter request to search query compilation.

use crate::builders::{
    self, FileFilters, FrequencyKind, category, category_partial, population_frequency,
    sample_names, score,
};
use crate::correlation::{ConsequenceTypes, Correlation};
use crate::expr::Expr;
use crate::facet::{self, ChromosomeTable};
use crate::grammar::{QueryOperation, split_value};
use crate::params::FilterKey;
use crate::projection::{FieldMap, SampleProjection, Selection};
use crate::region::{Identifiers, Region};
use crate::resolver::{
    ConsequenceTypeResolver, SoTermResolver, StaticStudyResolver, StudyResolver, study_search_id,
};
use crate::types::{FilterRequest, QueryOptions, SearchQuery, Sort};
use crate::{Error, Result};
use std::sync::Arc;

/// Matches every document; all constraints travel as filter queries.
pub const MATCH_ALL: &str = "*:*";

/// Page size bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowLimits {
    /// Rows returned when the request sets no limit.
    pub default: usize,
    /// Upper bound applied to any requested limit.
    pub max: usize,
}

impl Default for RowLimits {
    fn default() -> Self {
        Self {
            default: 2000,
            max: 5000,
        }
    }
}

impl RowLimits {
    pub fn rows(&self, limit: Option<usize>) -> usize {
        let requested = limit.unwrap_or(self.default);
        if requested > self.max {
            tracing::warn!(requested, max = self.max, "limit exceeds the maximum, clamping");
        }
        requested.min(self.max)
    }
}

/// Compiles [`FilterRequest`]s into [`SearchQuery`]s.
///
/// Holds only immutable tables and resolvers, so a single instance can be
/// shared across threads behind an `Arc`.
#[derive(Clone)]
pub struct QueryCompiler {
    fields: Arc<FieldMap>,
    chromosomes: Arc<ChromosomeTable>,
    studies: Arc<dyn StudyResolver>,
    consequence_types: Arc<dyn ConsequenceTypeResolver>,
    limits: RowLimits,
}

impl Default for QueryCompiler {
    fn default() -> Self {
        Self::new(
            Arc::new(StaticStudyResolver::default()),
            Arc::new(SoTermResolver::default()),
        )
    }
}

impl QueryCompiler {
    pub fn new(
        studies: Arc<dyn StudyResolver>,
        consequence_types: Arc<dyn ConsequenceTypeResolver>,
    ) -> Self {
        Self {
            fields: Arc::new(FieldMap::default()),
            chromosomes: Arc::new(ChromosomeTable::grch37()),
            studies,
            consequence_types,
            limits: RowLimits::default(),
        }
    }

    pub fn with_row_limits(mut self, limits: RowLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_chromosomes(mut self, chromosomes: Arc<ChromosomeTable>) -> Self {
        self.chromosomes = chromosomes;
        self
    }

    pub fn row_limits(&self) -> RowLimits {
        self.limits
    }

    pub fn compile(&self, filters: &FilterRequest, options: &QueryOptions) -> Result<SearchQuery> {
        if options.include.is_some() && options.exclude.is_some() {
            return Err(Error::AmbiguousActionParams(
                "'include' and 'exclude' cannot be combined".to_string(),
            ));
        }

        let filter_queries: Vec<String> = self
            .filter_exprs(filters)?
            .iter()
            .map(ToString::to_string)
            .collect();

        let query = match options.facet() {
            Some(expression) => SearchQuery {
                q: MATCH_ALL.to_string(),
                filter_queries,
                fields: Vec::new(),
                rows: 0,
                start: 0,
                sort: None,
                facet: Some(facet::translate(expression, &self.chromosomes)?),
            },
            None => SearchQuery {
                q: MATCH_ALL.to_string(),
                filter_queries,
                fields: self.projection(filters, options)?,
                rows: self.limits.rows(options.limit),
                start: options.skip.unwrap_or(0),
                sort: options.sort.as_ref().map(|field| Sort {
                    field: field.clone(),
                    order: options.order.unwrap_or_default(),
                }),
                facet: None,
            },
        };

        tracing::debug!(
            filters = filters.len(),
            filter_queries = query.filter_queries.len(),
            fields = query.fields.len(),
            rows = query.rows,
            facet = query.facet.is_some(),
            "compiled variant query"
        );
        Ok(query)
    }

    /// One expression per filter query, in a fixed key order followed by
    /// unknown keys in request order.
    fn filter_exprs(&self, filters: &FilterRequest) -> Result<Vec<Expr>> {
        if filters.contains(FilterKey::Info) {
            return Err(Error::UnsupportedFilter {
                key: FilterKey::Info.to_string(),
            });
        }

        let mut exprs = Vec::new();

        let mut ids = Identifiers::default();
        for key in FilterKey::IDENTIFIERS {
            if let Some(value) = filters.get(key) {
                ids.classify(value);
            }
        }
        let regions = match filters.get(FilterKey::Region) {
            Some(value) => Region::parse_list(FilterKey::Region.as_str(), value)?,
            None => Vec::new(),
        };
        let consequence_types = match filters.get(FilterKey::AnnotationConsequenceType) {
            Some(value) => ConsequenceTypes::parse(value, self.consequence_types.as_ref())?,
            None => ConsequenceTypes::default(),
        };
        exprs.extend(
            Correlation {
                genes: &ids.genes,
                xrefs: &ids.xrefs,
                regions: &regions,
                consequence_types: &consequence_types,
            }
            .build(),
        );

        let study = match filters.get(FilterKey::Study) {
            Some(value) => {
                exprs.extend(self.study_clause(value)?);
                self.study_context(value)?
            }
            None => None,
        };
        let study = study.as_deref();

        let categories = [
            (FilterKey::Type, "type"),
            (FilterKey::AnnotationBiotype, "biotypes"),
        ];
        for (key, field) in categories {
            if let Some(value) = filters.get(key) {
                exprs.extend(category(key.as_str(), field, value)?);
            }
        }

        for key in [
            FilterKey::AnnotationProteinSubstitution,
            FilterKey::AnnotationConservation,
            FilterKey::AnnotationFunctionalScore,
        ] {
            if let Some(value) = filters.get(key) {
                exprs.extend(score(key.as_str(), value)?);
            }
        }

        let frequencies = [
            (FilterKey::AnnotationPopulationAltFrequency, "popFreq", FrequencyKind::Alt),
            (FilterKey::AnnotationPopulationMaf, "popFreq", FrequencyKind::Maf),
            (FilterKey::AnnotationPopulationRefFrequency, "popFreq", FrequencyKind::Ref),
            (FilterKey::StatsMaf, "stats", FrequencyKind::Maf),
        ];
        for (key, prefix, kind) in frequencies {
            if let Some(value) = filters.get(key) {
                exprs.extend(population_frequency(key.as_str(), prefix, value, kind)?);
            }
        }

        // Gene lists always match any of their genes.
        for key in [FilterKey::AnnotationGoGenes, FilterKey::AnnotationExpressionGenes] {
            if let Some(value) = filters.get(key) {
                exprs.extend(category(key.as_str(), "xrefs", &value.replace(';', ","))?);
            }
        }

        for key in [
            FilterKey::AnnotationGeneTraitId,
            FilterKey::AnnotationGeneTraitName,
            FilterKey::AnnotationHpo,
            FilterKey::AnnotationTrait,
            FilterKey::AnnotationProteinKeyword,
        ] {
            if let Some(value) = filters.get(key) {
                // free-text trait search matches substrings
                let clause = if key == FilterKey::AnnotationTrait {
                    category_partial(key.as_str(), "traits", value)?
                } else {
                    category(key.as_str(), "traits", value)?
                };
                exprs.extend(clause);
            }
        }

        if let Some(value) = filters.get(FilterKey::AnnotationClinicalSignificance) {
            exprs.extend(Expr::any(
                split_value(value)
                    .into_iter()
                    .map(|cs| Expr::pattern("traits", format!(r"*cs\:{}*", cs))),
            ));
        }

        if let Some(value) = filters.get(FilterKey::Genotype) {
            exprs.extend(builders::genotype(FilterKey::Genotype.as_str(), study, value)?);
        }
        if let Some(value) = filters.get(FilterKey::Format) {
            exprs.extend(builders::format(FilterKey::Format.as_str(), study, value)?);
        }

        let include_files = match filters.get(FilterKey::IncludeFile).map(Selection::parse) {
            Some(Selection::Only(files)) => Some(files),
            _ => None,
        };
        exprs.extend(
            FileFilters {
                study,
                file: filters.get(FilterKey::File),
                include_files: include_files.as_deref(),
                qual: filters.get(FilterKey::Qual),
                filter: filters.get(FilterKey::Filter),
            }
            .build()?,
        );

        for (key, value) in filters.iter() {
            if key.parse::<FilterKey>().is_err() {
                tracing::debug!(key, "filtering on unrecognised key as a plain field");
                exprs.extend(category(key, key, value)?);
            }
        }

        Ok(exprs)
    }

    /// `studies` clause. Only emitted when the catalog holds several studies,
    /// otherwise every document belongs to the requested one.
    fn study_clause(&self, value: &str) -> Result<Option<Expr>> {
        if self.studies.study_count() <= 1 {
            return Ok(None);
        }
        let separator = match QueryOperation::detect_or_and(value) {
            QueryOperation::And => ";",
            QueryOperation::Or => ",",
        };
        let resolved = split_value(value)
            .into_iter()
            .map(|token| -> Result<String> {
                let (negation, name) = match token.strip_prefix('!') {
                    Some(name) => ("!", name),
                    None => ("", token),
                };
                let id = self.studies.resolve(name)?;
                Ok(format!("{}{}", negation, study_search_id(&id)))
            })
            .collect::<Result<Vec<_>>>()?;
        category(FilterKey::Study.as_str(), "studies", &resolved.join(separator))
    }

    /// Search id of the first non-negated study, used by per-study filters.
    fn study_context(&self, value: &str) -> Result<Option<String>> {
        match positive_values(value).into_iter().next() {
            Some(name) => {
                let id = self.studies.resolve(name)?;
                Ok(Some(study_search_id(&id).to_string()))
            }
            None => Ok(None),
        }
    }

    fn projection(&self, filters: &FilterRequest, options: &QueryOptions) -> Result<Vec<String>> {
        let (mut fields, studies_included) = match (&options.include, &options.exclude) {
            (Some(include), _) => (
                self.fields.include(include),
                include
                    .iter()
                    .any(|f| f == "studies" || f.starts_with("studies.")),
            ),
            (None, Some(exclude)) => (
                self.fields.exclude(exclude),
                !exclude.iter().any(|f| f == "studies"),
            ),
            (None, None) => (self.fields.exclude(&[]), true),
        };

        let studies = if studies_included {
            self.included_studies(filters)?
        } else {
            Selection::None
        };
        let projection = SampleProjection {
            studies,
            files: included_files(filters),
            samples: included_samples(filters)?,
            genotype: options.include_genotype,
        };
        fields.extend(projection.fields());
        Ok(fields)
    }

    fn included_studies(&self, filters: &FilterRequest) -> Result<Selection> {
        let selection = match filters.get(FilterKey::IncludeStudy) {
            Some(value) => Selection::parse(value),
            None => match filters.get(FilterKey::Study).map(positive_values) {
                Some(values) if !values.is_empty() => {
                    Selection::from_values(values.into_iter().map(String::from))
                }
                _ => Selection::All,
            },
        };
        Ok(match selection {
            Selection::Only(names) => Selection::Only(
                names
                    .iter()
                    .map(|name| -> Result<String> {
                        let id = self.studies.resolve(name)?;
                        Ok(study_search_id(&id).to_string())
                    })
                    .collect::<Result<Vec<_>>>()?,
            ),
            other => other,
        })
    }
}

fn positive_values(value: &str) -> Vec<&str> {
    split_value(value)
        .into_iter()
        .filter(|v| !v.starts_with('!'))
        .collect()
}

fn included_files(filters: &FilterRequest) -> Selection {
    if let Some(value) = filters.get(FilterKey::IncludeFile) {
        return Selection::parse(value);
    }
    match filters.get(FilterKey::File).map(positive_values) {
        Some(files) if !files.is_empty() => {
            Selection::from_values(files.into_iter().map(String::from))
        }
        _ => Selection::All,
    }
}

fn included_samples(filters: &FilterRequest) -> Result<Selection> {
    if let Some(value) = filters.get(FilterKey::IncludeSample) {
        return Ok(Selection::parse(value));
    }
    let mut samples: Vec<String> = Vec::new();
    for key in [FilterKey::Genotype, FilterKey::Format] {
        if let Some(value) = filters.get(key) {
            for sample in sample_names(key.as_str(), value)? {
                if !samples.contains(&sample) {
                    samples.push(sample);
                }
            }
        }
    }
    Ok(if samples.is_empty() {
        Selection::All
    } else {
        Selection::Only(samples)
    })
}
