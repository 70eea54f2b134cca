//! Gene/xref classification and genomic region parsing.

use crate::expr::{Bound, Expr};
use crate::{Error, Result};
use noodles::core::Region as NoodlesRegion;

/// Open end coordinate of a region.
pub const OPEN_END: u64 = u64::MAX;

/// A parsed `chrom[:start[-end]]` region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    pub chromosome: String,
    pub start: u64,
    pub end: u64,
}

impl Region {
    /// Parses a single region, stripping `chr`-style prefixes from the name.
    pub fn parse(key: &str, s: &str) -> Result<Self> {
        let s = s.trim();
        if let Some((name, end)) = split_zero_start(s) {
            return Self::from_zero_start(key, s, name, end);
        }

        let parsed: NoodlesRegion = s
            .parse()
            .map_err(|e| Error::malformed(key, s, format!("invalid region: {}", e)))?;

        let name = String::from_utf8_lossy(parsed.name().as_ref()).into_owned();
        if name.contains(':') {
            return Err(Error::malformed(key, s, "invalid region coordinates"));
        }

        let interval = parsed.interval();
        let start = interval.start().map_or(0, |p| usize::from(p) as u64);
        let end = interval.end().map_or(OPEN_END, |p| usize::from(p) as u64);
        if end < start {
            return Err(Error::malformed(key, s, "region end precedes its start"));
        }

        Ok(Region {
            chromosome: clean_chromosome(&name),
            start,
            end,
        })
    }

    /// noodles positions start at 1, so `chrom:0` and `chrom:0-end` are
    /// taken apart here. `chrom:0` covers the whole chromosome.
    fn from_zero_start(key: &str, s: &str, name: &str, end: Option<&str>) -> Result<Self> {
        if name.is_empty() || name.contains(':') {
            return Err(Error::malformed(key, s, "invalid region coordinates"));
        }
        let end = match end {
            Some(end) => end
                .parse::<u64>()
                .map_err(|_| Error::malformed(key, s, "invalid region end"))?,
            None => OPEN_END,
        };
        Ok(Region {
            chromosome: clean_chromosome(name),
            start: 0,
            end,
        })
    }

    /// Parses a comma separated region list.
    pub fn parse_list(key: &str, value: &str) -> Result<Vec<Self>> {
        value
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| Region::parse(key, s))
            .collect()
    }

    pub fn is_whole_chromosome(&self) -> bool {
        self.start == 0 && self.end == OPEN_END
    }

    /// `chromosome:"C"`, narrowed by start and end when present.
    pub fn to_expr(&self) -> Expr {
        let chromosome = Expr::quoted("chromosome", self.chromosome.as_str());
        if self.is_whole_chromosome() {
            chromosome
        } else if self.end == OPEN_END {
            Expr::And(vec![chromosome, Expr::number("start", self.start.to_string())])
        } else {
            Expr::And(vec![
                chromosome,
                Expr::range(
                    "start",
                    Bound::Inclusive(self.start.to_string()),
                    Bound::Unbounded,
                ),
                Expr::range(
                    "end",
                    Bound::Unbounded,
                    Bound::Inclusive(self.end.to_string()),
                ),
            ])
        }
    }
}

/// `(name, end)` of a region whose start is `0`.
fn split_zero_start(s: &str) -> Option<(&str, Option<&str>)> {
    let (name, interval) = s.rsplit_once(':')?;
    match interval.strip_prefix('0')? {
        "" => Some((name, None)),
        rest => rest.strip_prefix('-').map(|end| (name, Some(end))),
    }
}

fn clean_chromosome(name: &str) -> String {
    name.replace("chrom", "")
        .replace("chrm", "")
        .replace("chr", "")
        .replace("ch", "")
}

/// Whether an identifier is a gene symbol rather than a cross-reference.
///
/// Every non-empty identifier currently counts as a gene, namespaced ones
/// included.
pub fn is_gene(id: &str) -> bool {
    !id.is_empty()
}

/// Identifiers gathered from the gene-like filter keys.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Identifiers {
    pub genes: Vec<String>,
    pub xrefs: Vec<String>,
}

impl Identifiers {
    /// Splits `value` on `,`/`;` and files every token as gene or xref.
    pub fn classify(&mut self, value: &str) {
        for id in crate::grammar::split_value(value) {
            if is_gene(id) {
                self.genes.push(id.to_string());
            } else {
                self.xrefs.push(id.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_whole_chromosome() {
        let r = Region::parse("region", "chr22").unwrap();
        assert_eq!(r.chromosome, "22");
        assert!(r.is_whole_chromosome());
        assert_eq!(r.to_expr().to_string(), r#"chromosome:"22""#);
    }

    #[test]
    fn test_parse_start_only() {
        let r = Region::parse("region", "1:1000").unwrap();
        assert_eq!((r.start, r.end), (1000, OPEN_END));
        assert_eq!(
            r.to_expr().to_string(),
            r#"chromosome:"1" AND start:1000"#
        );
    }

    #[test]
    fn test_parse_interval() {
        let r = Region::parse("region", "X:100-2000").unwrap();
        assert_eq!(r.chromosome, "X");
        assert_eq!((r.start, r.end), (100, 2000));
        assert_eq!(
            r.to_expr().to_string(),
            r#"chromosome:"X" AND start:[100 TO *] AND end:[* TO 2000]"#
        );
    }

    #[test]
    fn test_parse_zero_start() {
        let r = Region::parse("region", "1:0").unwrap();
        assert!(r.is_whole_chromosome());
        assert_eq!(r.to_expr().to_string(), r#"chromosome:"1""#);

        let r = Region::parse("region", "chr1:0-100").unwrap();
        assert_eq!((r.chromosome.as_str(), r.start, r.end), ("1", 0, 100));
        assert_eq!(
            r.to_expr().to_string(),
            r#"chromosome:"1" AND start:[0 TO *] AND end:[* TO 100]"#
        );

        assert!(Region::parse("region", "1:0-abc").is_err());
        assert!(Region::parse("region", ":0-10").is_err());
    }

    #[test]
    fn test_parse_list() {
        let regions = Region::parse_list("region", "1:10-20, chrMT").unwrap();
        assert_eq!(regions.len(), 2);
        assert_eq!(regions[1].chromosome, "MT");
    }

    #[test]
    fn test_parse_rejects_inverted_interval() {
        let err = Region::parse("region", "1:200-100").unwrap_err();
        assert!(matches!(err, Error::MalformedFilterExpression { .. }));
    }

    #[test]
    fn test_classify_everything_is_a_gene() {
        let mut ids = Identifiers::default();
        ids.classify("BRCA2,rs123;COSM1:2");
        assert_eq!(ids.genes, vec!["BRCA2", "rs123", "COSM1:2"]);
        assert!(ids.xrefs.is_empty());
    }
}
