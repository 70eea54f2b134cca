//! Catalog lookups the compiler depends on.
//!
//! The compiler only needs two answers from the outside world: which study a
//! name refers to, and which Sequence Ontology accession a consequence type
//! term stands for. Both are synchronous traits so any catalog client can be
//! plugged in.
//!
//! # Implementations
//!
//! - [`StaticStudyResolver`] - fixed list of fully-qualified study ids
//! - [`SoTermResolver`] - built-in Sequence Ontology consequence terms

use crate::{Error, Result};
use std::collections::HashMap;

/// Maps study names given in a filter to canonical study ids.
pub trait StudyResolver: Send + Sync {
    /// Resolve one study name (short or fully-qualified) to its canonical id.
    fn resolve(&self, name: &str) -> Result<String>;

    /// Number of studies known to the catalog.
    fn study_count(&self) -> usize;
}

/// Maps consequence type terms (or `SO:` accessions) to numeric accessions.
pub trait ConsequenceTypeResolver: Send + Sync {
    fn accession(&self, term: &str) -> Result<u32>;
}

/// Short id used by the search index for a canonical study id, e.g.
/// `user@project:S1` becomes `S1`.
pub fn study_search_id(study: &str) -> &str {
    study.rsplit(':').next().unwrap_or(study)
}

/// Study catalog backed by a fixed list of ids such as `user@project:study`.
///
/// An empty catalog accepts any name as its own canonical id.
#[derive(Debug, Clone, Default)]
pub struct StaticStudyResolver {
    studies: Vec<String>,
}

impl StaticStudyResolver {
    pub fn new<I, S>(studies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            studies: studies.into_iter().map(Into::into).collect(),
        }
    }
}

impl StudyResolver for StaticStudyResolver {
    fn resolve(&self, name: &str) -> Result<String> {
        if self.studies.is_empty() {
            return Ok(name.to_string());
        }
        self.studies
            .iter()
            .find(|s| s.as_str() == name || study_search_id(s) == name)
            .cloned()
            .ok_or_else(|| Error::malformed("study", name, "unknown study"))
    }

    fn study_count(&self) -> usize {
        self.studies.len()
    }
}

/// Sequence Ontology terms for variant consequence types.
const SO_TERMS: &[(&str, u32)] = &[
    ("transcript_ablation", 1893),
    ("splice_acceptor_variant", 1574),
    ("splice_donor_variant", 1575),
    ("stop_gained", 1587),
    ("frameshift_variant", 1589),
    ("stop_lost", 1578),
    ("start_lost", 2012),
    ("transcript_amplification", 1889),
    ("inframe_insertion", 1821),
    ("inframe_deletion", 1822),
    ("missense_variant", 1583),
    ("protein_altering_variant", 1818),
    ("splice_region_variant", 1630),
    ("incomplete_terminal_codon_variant", 1626),
    ("start_retained_variant", 2019),
    ("stop_retained_variant", 1567),
    ("synonymous_variant", 1819),
    ("initiator_codon_variant", 1582),
    ("coding_sequence_variant", 1580),
    ("mature_miRNA_variant", 1620),
    ("5_prime_UTR_variant", 1623),
    ("3_prime_UTR_variant", 1624),
    ("non_coding_transcript_exon_variant", 1792),
    ("intron_variant", 1627),
    ("NMD_transcript_variant", 1621),
    ("non_coding_transcript_variant", 1619),
    ("2KB_upstream_variant", 1636),
    ("upstream_gene_variant", 1631),
    ("downstream_gene_variant", 1632),
    ("2KB_downstream_variant", 2083),
    ("TFBS_ablation", 1895),
    ("TFBS_amplification", 1892),
    ("TF_binding_site_variant", 1782),
    ("regulatory_region_ablation", 1894),
    ("regulatory_region_amplification", 1891),
    ("feature_elongation", 1907),
    ("regulatory_region_variant", 1566),
    ("feature_truncation", 1906),
    ("intergenic_variant", 1628),
];

/// Resolves Sequence Ontology consequence terms and `SO:0001583` accessions.
#[derive(Debug, Clone)]
pub struct SoTermResolver {
    terms: HashMap<String, u32>,
}

impl Default for SoTermResolver {
    fn default() -> Self {
        Self {
            terms: SO_TERMS
                .iter()
                .map(|(term, acc)| (term.to_lowercase(), *acc))
                .collect(),
        }
    }
}

impl ConsequenceTypeResolver for SoTermResolver {
    fn accession(&self, term: &str) -> Result<u32> {
        let term = term.trim();
        let accession = match term.get(..3) {
            Some(prefix) if prefix.eq_ignore_ascii_case("SO:") => term[3..].parse().ok(),
            _ => self.terms.get(&term.to_lowercase()).copied(),
        };
        accession.ok_or_else(|| {
            Error::malformed(
                "annotationConsequenceType",
                term,
                "unknown consequence type",
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_study_search_id() {
        assert_eq!(study_search_id("user@project:S1"), "S1");
        assert_eq!(study_search_id("S1"), "S1");
    }

    #[test]
    fn test_static_resolver() {
        let resolver = StaticStudyResolver::new(["user@p:S1", "user@p:S2"]);
        assert_eq!(resolver.resolve("S1").unwrap(), "user@p:S1");
        assert_eq!(resolver.resolve("user@p:S2").unwrap(), "user@p:S2");
        assert!(resolver.resolve("S3").is_err());
        assert_eq!(resolver.study_count(), 2);
    }

    #[test]
    fn test_empty_catalog_is_identity() {
        let resolver = StaticStudyResolver::default();
        assert_eq!(resolver.resolve("S9").unwrap(), "S9");
        assert_eq!(resolver.study_count(), 0);
    }

    #[test]
    fn test_so_terms() {
        let resolver = SoTermResolver::default();
        assert_eq!(resolver.accession("missense_variant").unwrap(), 1583);
        assert_eq!(resolver.accession("Missense_Variant").unwrap(), 1583);
        assert_eq!(resolver.accession("SO:0001587").unwrap(), 1587);
        assert!(resolver.accession("SO:abc").is_err());
        assert!(resolver.accession("not_a_term").is_err());
    }
}
