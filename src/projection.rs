//! Field projection.
//!
//! Logical variant fields (`annotation.xrefs`, `studies`, ...) map to physical
//! index fields through a fixed table. Per-study, per-file and per-sample
//! fields are dynamic and are derived from the study, file and sample
//! selections of the request instead.

use crate::builders::field_name;
use crate::grammar::split_value;

/// Fields every projection carries, in this order, at the end of the list.
pub const MANDATORY_FIELDS: [&str; 5] = ["id", "chromosome", "start", "end", "type"];

/// Physical field the index exposes but responses never carry.
const RELEASE_FIELD: &str = "release";

const DEFAULT_FIELDS: &[(&str, &[&str])] = &[
    ("id", &["id", "variantId"]),
    ("chromosome", &["chromosome"]),
    ("start", &["start"]),
    ("end", &["end"]),
    ("type", &["type"]),
    ("studies", &["studies", "stats_*"]),
    ("studies.stats", &["studies", "stats_*"]),
    (
        "annotation",
        &[
            "genes",
            "soAcc",
            "geneToSoAcc",
            "biotypes",
            "sift",
            "siftDesc",
            "polyphen",
            "polyphenDesc",
            "popFreq_*",
            "xrefs",
            "phastCons",
            "phylop",
            "gerp",
            "caddRaw",
            "caddScaled",
            "traits",
            "other",
        ],
    ),
    (
        "annotation.consequenceTypes",
        &[
            "genes",
            "soAcc",
            "geneToSoAcc",
            "biotypes",
            "sift",
            "siftDesc",
            "polyphen",
            "polyphenDesc",
            "other",
        ],
    ),
    ("annotation.populationFrequencies", &["popFreq_*"]),
    ("annotation.xrefs", &["xrefs"]),
    ("annotation.conservation", &["phastCons", "phylop", "gerp"]),
    ("annotation.functionalScore", &["caddRaw", "caddScaled"]),
    ("annotation.traitAssociation", &["traits"]),
];

/// Logical to physical field table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMap {
    entries: Vec<(String, Vec<String>)>,
}

impl Default for FieldMap {
    fn default() -> Self {
        Self {
            entries: DEFAULT_FIELDS
                .iter()
                .map(|(name, fields)| {
                    (
                        name.to_string(),
                        fields.iter().map(|f| f.to_string()).collect(),
                    )
                })
                .collect(),
        }
    }
}

impl FieldMap {
    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, fields)| fields.as_slice())
    }

    /// Physical fields of the `include` names, in request order. Unknown
    /// names are ignored.
    pub fn include(&self, include: &[String]) -> Vec<String> {
        let mut fields = Vec::new();
        for name in include {
            match self.get(name) {
                Some(mapped) => fields.extend(mapped.iter().cloned()),
                None => tracing::debug!(field = %name, "ignoring unknown include field"),
            }
        }
        finish(fields)
    }

    /// Every physical field of the table minus those of the `exclude` names.
    pub fn exclude(&self, exclude: &[String]) -> Vec<String> {
        let excluded: Vec<&String> = exclude
            .iter()
            .filter_map(|name| self.get(name))
            .flatten()
            .collect();

        let mut fields: Vec<String> = Vec::new();
        for field in self.entries.iter().flat_map(|(_, fields)| fields) {
            if !excluded.contains(&field) && !fields.contains(field) {
                fields.push(field.clone());
            }
        }
        finish(fields)
    }
}

/// Drops `release` and duplicates, then moves the mandatory fields to the end.
fn finish(fields: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(fields.len() + MANDATORY_FIELDS.len());
    for field in fields {
        if field != RELEASE_FIELD
            && !MANDATORY_FIELDS.contains(&field.as_str())
            && !out.contains(&field)
        {
            out.push(field);
        }
    }
    out.extend(MANDATORY_FIELDS.iter().map(|f| f.to_string()));
    out
}

/// An `all` / `none` / list selection of studies, files or samples.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    All,
    None,
    Only(Vec<String>),
}

impl Selection {
    /// Parses `all`, `none` or a `,`/`;` separated list.
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            v if v.eq_ignore_ascii_case("all") => Selection::All,
            v if v.eq_ignore_ascii_case("none") => Selection::None,
            v => Selection::from_values(split_value(v).into_iter().map(String::from)),
        }
    }

    /// `Only(values)`, or `None` for an empty list.
    pub fn from_values(values: impl IntoIterator<Item = String>) -> Self {
        let values: Vec<String> = values.into_iter().collect();
        if values.is_empty() {
            Selection::None
        } else {
            Selection::Only(values)
        }
    }
}

/// Dynamic fields of the studies, files and samples a response carries.
#[derive(Debug, Clone, Default)]
pub struct SampleProjection {
    /// Study search ids.
    pub studies: Selection,
    pub files: Selection,
    pub samples: Selection,
    /// Project genotypes instead of the full sample format.
    pub genotype: bool,
}

impl SampleProjection {
    pub fn fields(&self) -> Vec<String> {
        let mut fields = Vec::new();
        // `None` scope means every study.
        let studies: Option<&[String]> = match &self.studies {
            Selection::None => return fields,
            Selection::All => None,
            Selection::Only(studies) => Some(studies),
        };
        let scopes: Vec<&str> = match studies {
            Some(studies) => studies.iter().map(String::as_str).collect(),
            None => vec!["*"],
        };

        const FILE_FIELDS: [&str; 3] = ["fileInfo", "qual", "filter"];
        match (&self.files, studies) {
            (Selection::None, _) => {}
            (Selection::All, None) => {
                fields.extend(FILE_FIELDS.into_iter().map(|prefix| field_name(&[prefix, "*"])));
            }
            (Selection::All, Some(_)) => {
                for &study in &scopes {
                    for prefix in FILE_FIELDS {
                        fields.push(field_name(&[prefix, study, "*"]));
                    }
                }
            }
            (Selection::Only(files), _) => {
                for file in files {
                    for &study in &scopes {
                        for prefix in FILE_FIELDS {
                            fields.push(field_name(&[prefix, study, file.as_str()]));
                        }
                    }
                }
            }
        }

        match &self.samples {
            Selection::None => {}
            Selection::All if self.genotype => match studies {
                None => {
                    fields.push(field_name(&["gt", "*"]));
                    fields.push(field_name(&["sampleFormat", "*", "sampleName"]));
                    fields.push(field_name(&["sampleFormat", "*", "format"]));
                }
                Some(_) => {
                    for &study in &scopes {
                        fields.push(field_name(&["gt", study, "*"]));
                        fields.push(field_name(&["sampleFormat", study, "sampleName"]));
                        fields.push(field_name(&["sampleFormat", study, "format"]));
                    }
                }
            },
            Selection::All => match studies {
                None => fields.push(field_name(&["sampleFormat", "*"])),
                Some(_) => {
                    for &study in &scopes {
                        fields.push(field_name(&["sampleFormat", study, "*"]));
                    }
                }
            },
            Selection::Only(samples) => {
                let prefix = if self.genotype { "gt" } else { "sampleFormat" };
                for &study in &scopes {
                    fields.push(field_name(&["sampleFormat", study, "sampleName"]));
                    fields.push(field_name(&["sampleFormat", study, "format"]));
                    for sample in samples {
                        fields.push(field_name(&[prefix, study, sample.as_str()]));
                    }
                }
            }
        }
        fields
    }
}
