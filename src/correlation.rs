//! Gene, cross-reference, region and consequence type correlation.
//!
//! These filters are not independent: a consequence type only makes sense
//! for the gene it was annotated on. The index models that pair as the
//! composite `geneToSoAcc` term, so the clause has the shape
//!
//! ```text
//! [((xrefs OR regions) AND cts) OR (genes AND cts)]
//! ```

use crate::expr::Expr;
use crate::grammar::{QueryOperation, split_value};
use crate::region::Region;
use crate::resolver::ConsequenceTypeResolver;
use crate::Result;

/// Consequence types of a request, resolved to SO accessions.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsequenceTypes {
    pub accessions: Vec<u32>,
    pub op: QueryOperation,
}

impl ConsequenceTypes {
    /// Resolves `value`. `;` means AND, but mixing `;` with `,` falls back to
    /// OR.
    pub fn parse(value: &str, resolver: &dyn ConsequenceTypeResolver) -> Result<Self> {
        let op = match QueryOperation::detect(value) {
            Some(QueryOperation::And) if value.contains(',') => {
                tracing::warn!(
                    value,
                    "consequence types mix ';' and ',', combining them with OR"
                );
                QueryOperation::Or
            }
            Some(op) => op,
            None => QueryOperation::Or,
        };
        let accessions = split_value(value)
            .into_iter()
            .map(|term| resolver.accession(term))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { accessions, op })
    }

    fn is_empty(&self) -> bool {
        self.accessions.is_empty()
    }
}

static NO_CONSEQUENCE_TYPES: ConsequenceTypes = ConsequenceTypes {
    accessions: Vec::new(),
    op: QueryOperation::Or,
};

impl Default for ConsequenceTypes {
    fn default() -> Self {
        NO_CONSEQUENCE_TYPES.clone()
    }
}

/// Inputs of the correlated clause.
#[derive(Debug)]
pub struct Correlation<'a> {
    pub genes: &'a [String],
    pub xrefs: &'a [String],
    pub regions: &'a [Region],
    pub consequence_types: &'a ConsequenceTypes,
}

impl Default for Correlation<'_> {
    fn default() -> Self {
        Self {
            genes: &[],
            xrefs: &[],
            regions: &[],
            consequence_types: &NO_CONSEQUENCE_TYPES,
        }
    }
}

impl Correlation<'_> {
    pub fn build(&self) -> Option<Expr> {
        let has_xrefs = !self.xrefs.is_empty() || !self.regions.is_empty();

        if self.consequence_types.is_empty() {
            return Expr::any(
                self.xref_terms()
                    .chain(self.region_terms())
                    .chain(self.genes.iter().map(|g| Expr::quoted("xrefs", g.as_str()))),
            );
        }

        let cts = self.consequence_type_terms();
        let xrefs_and_cts = if has_xrefs {
            let xrefs = Expr::any(self.xref_terms().chain(self.region_terms()));
            Expr::all(xrefs.into_iter().chain(cts))
        } else {
            cts
        };

        if self.genes.is_empty() {
            xrefs_and_cts
        } else if has_xrefs {
            Expr::any(xrefs_and_cts.into_iter().chain(self.gene_terms()))
        } else {
            self.gene_terms()
        }
    }

    fn xref_terms(&self) -> impl Iterator<Item = Expr> + '_ {
        self.xrefs.iter().map(|x| Expr::quoted("xrefs", x.as_str()))
    }

    fn region_terms(&self) -> impl Iterator<Item = Expr> + '_ {
        self.regions.iter().map(Region::to_expr)
    }

    fn consequence_type_terms(&self) -> Option<Expr> {
        let cts = self.consequence_types;
        Expr::combine(
            cts.op,
            cts.accessions
                .iter()
                .map(|acc| Expr::quoted("soAcc", acc.to_string())),
        )
    }

    /// `geneToSoAcc:"<gene>_<acc>"` over genes × consequence types.
    fn gene_terms(&self) -> Option<Expr> {
        let cts = self.consequence_types;
        Expr::any(self.genes.iter().filter_map(|gene| {
            Expr::combine(
                cts.op,
                cts.accessions
                    .iter()
                    .map(|acc| Expr::quoted("geneToSoAcc", format!("{}_{}", gene, acc))),
            )
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::SoTermResolver;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn cts(value: &str) -> ConsequenceTypes {
        ConsequenceTypes::parse(value, &SoTermResolver::default()).unwrap()
    }

    fn render(c: Correlation<'_>) -> Option<String> {
        c.build().map(|e| e.to_string())
    }

    #[test]
    fn test_consequence_type_operator() {
        assert_eq!(cts("missense_variant").op, QueryOperation::Or);
        assert_eq!(cts("missense_variant;stop_gained").op, QueryOperation::And);
        let mixed = cts("missense_variant,stop_gained;stop_lost");
        assert_eq!(mixed.op, QueryOperation::Or);
        assert_eq!(mixed.accessions, vec![1583, 1587, 1578]);
    }

    #[test]
    fn test_nothing() {
        assert_eq!(render(Correlation::default()), None);
        assert!(Correlation::default().consequence_types.is_empty());
    }

    #[test]
    fn test_regions_only_with_default_cts() {
        let regions = vec![Region::parse("region", "3:100").unwrap()];
        let c = Correlation {
            regions: &regions,
            ..Default::default()
        };
        assert_eq!(render(c).unwrap(), r#"chromosome:"3" AND start:100"#);
    }

    #[test]
    fn test_cts_only() {
        let cts = cts("missense_variant,stop_gained");
        let c = Correlation {
            consequence_types: &cts,
            ..Default::default()
        };
        assert_eq!(
            render(c).unwrap(),
            r#"soAcc:"1583" OR soAcc:"1587""#
        );
    }

    #[test]
    fn test_xrefs_and_regions_without_cts() {
        let xrefs = strings(&["rs123"]);
        let regions = vec![Region::parse("region", "1:10-20").unwrap()];
        let none = ConsequenceTypes::default();
        let c = Correlation {
            xrefs: &xrefs,
            regions: &regions,
            consequence_types: &none,
            ..Default::default()
        };
        assert_eq!(
            render(c).unwrap(),
            r#"xrefs:"rs123" OR (chromosome:"1" AND start:[10 TO *] AND end:[* TO 20])"#
        );
    }

    #[test]
    fn test_xrefs_and_cts() {
        let xrefs = strings(&["rs1", "rs2"]);
        let cts = cts("missense_variant");
        let c = Correlation {
            xrefs: &xrefs,
            consequence_types: &cts,
            ..Default::default()
        };
        assert_eq!(
            render(c).unwrap(),
            r#"(xrefs:"rs1" OR xrefs:"rs2") AND soAcc:"1583""#
        );
    }

    #[test]
    fn test_genes_and_cts() {
        let genes = strings(&["BRCA2"]);
        let cts = cts("missense_variant");
        let c = Correlation {
            genes: &genes,
            consequence_types: &cts,
            ..Default::default()
        };
        assert_eq!(render(c).unwrap(), r#"geneToSoAcc:"BRCA2_1583""#);
    }

    #[test]
    fn test_gene_cross_product() {
        let genes = strings(&["BRCA1", "BRCA2"]);
        let cts = cts("missense_variant,stop_gained");
        let c = Correlation {
            genes: &genes,
            consequence_types: &cts,
            ..Default::default()
        };
        assert_eq!(
            render(c).unwrap(),
            r#"geneToSoAcc:"BRCA1_1583" OR geneToSoAcc:"BRCA1_1587" OR geneToSoAcc:"BRCA2_1583" OR geneToSoAcc:"BRCA2_1587""#
        );
    }

    #[test]
    fn test_gene_cts_with_and() {
        let genes = strings(&["BRCA1", "BRCA2"]);
        let cts = cts("missense_variant;stop_gained");
        let c = Correlation {
            genes: &genes,
            consequence_types: &cts,
            ..Default::default()
        };
        assert_eq!(
            render(c).unwrap(),
            r#"(geneToSoAcc:"BRCA1_1583" AND geneToSoAcc:"BRCA1_1587") OR (geneToSoAcc:"BRCA2_1583" AND geneToSoAcc:"BRCA2_1587")"#
        );
    }

    #[test]
    fn test_genes_xrefs_and_cts() {
        let genes = strings(&["BRCA2"]);
        let xrefs = strings(&["rs1"]);
        let cts = cts("missense_variant");
        let c = Correlation {
            genes: &genes,
            xrefs: &xrefs,
            consequence_types: &cts,
            ..Default::default()
        };
        assert_eq!(
            render(c).unwrap(),
            r#"(xrefs:"rs1" AND soAcc:"1583") OR geneToSoAcc:"BRCA2_1583""#
        );
    }

    #[test]
    fn test_genes_without_cts() {
        let genes = strings(&["BRCA2"]);
        let xrefs = strings(&["rs1"]);
        let regions = vec![Region::parse("region", "2").unwrap()];
        let none = ConsequenceTypes::default();
        let c = Correlation {
            genes: &genes,
            xrefs: &xrefs,
            regions: &regions,
            consequence_types: &none,
        };
        assert_eq!(
            render(c).unwrap(),
            r#"xrefs:"rs1" OR chromosome:"2" OR xrefs:"BRCA2""#
        );
    }
}
