use super::field_name;
use super::range::{MissingValues, numeric};
use crate::expr::{Bound, Expr};
use crate::grammar::{QueryOperation, split_quoted, split_value};
use crate::{Error, Result};

/// File presence, QUAL and FILTER conditions of one request.
///
/// QUAL and FILTER are stored per file, so they need the files in context:
/// the `file` filter, or the projected files when no file filter is given.
#[derive(Debug, Default)]
pub struct FileFilters<'a> {
    /// Search id of the study in context.
    pub study: Option<&'a str>,
    pub file: Option<&'a str>,
    pub include_files: Option<&'a [String]>,
    pub qual: Option<&'a str>,
    pub filter: Option<&'a str>,
}

impl FileFilters<'_> {
    /// Builds the clauses. AND between files yields one clause per file, OR
    /// yields a single clause spanning all files.
    pub fn build(&self) -> Result<Vec<Expr>> {
        let mut clauses = Vec::new();

        let mut files: Option<Vec<String>> = None;
        let mut file_op = QueryOperation::Or;
        if let Some(file) = self.file {
            let study = self.study("file")?;
            let names: Vec<String> = split_value(file).into_iter().map(String::from).collect();
            file_op = QueryOperation::detect_or_and(file);

            let present = names.iter().map(|f| {
                Expr::range(
                    field_name(&["fileInfo", study, f.as_str()]),
                    Bound::Unbounded,
                    Bound::Unbounded,
                )
            });
            clauses.extend(per_file(file_op, present));
            files = Some(names);
        } else if let Some(include) = self.include_files {
            files = Some(include.to_vec());
        }

        if let Some(qual) = self.qual {
            let files = files.as_deref().ok_or_else(|| Error::MissingFileContext {
                key: "qual".to_string(),
            })?;
            let study = self.study("qual")?;
            let conditions = files
                .iter()
                .map(|f| {
                    numeric(
                        "qual",
                        &field_name(&["qual", study, f.as_str()]),
                        qual,
                        MissingValues::Sentinel,
                    )
                })
                .collect::<Result<Vec<_>>>()?;
            clauses.extend(per_file(file_op, conditions));
        }

        if let Some(filter) = self.filter {
            let files = files.as_deref().ok_or_else(|| Error::MissingFileContext {
                key: "filter".to_string(),
            })?;
            let study = self.study("filter")?;
            let filter_op =
                QueryOperation::detect_unquoted(filter).unwrap_or(QueryOperation::And);
            let values = split_quoted(filter);

            let conditions = files.iter().filter_map(|f| {
                let field = field_name(&["filter", study, f.as_str()]);
                Expr::combine(
                    filter_op,
                    values
                        .iter()
                        .map(|v| Expr::pattern(field.as_str(), format!("/(.*)?{}(.*)?/", v))),
                )
            });
            clauses.extend(per_file(file_op, conditions.collect::<Vec<_>>()));
        }

        Ok(clauses)
    }

    fn study(&self, key: &str) -> Result<&str> {
        self.study.ok_or_else(|| Error::MissingStudyContext {
            key: key.to_string(),
        })
    }
}

fn per_file(op: QueryOperation, conditions: impl IntoIterator<Item = Expr>) -> Vec<Expr> {
    match op {
        QueryOperation::And => conditions.into_iter().collect(),
        QueryOperation::Or => Expr::any(conditions).into_iter().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(filters: FileFilters<'_>) -> Vec<String> {
        filters
            .build()
            .unwrap()
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    #[test]
    fn test_files_or() {
        let clauses = render(FileFilters {
            study: Some("S1"),
            file: Some("f1,f2"),
            ..Default::default()
        });
        assert_eq!(
            clauses,
            vec!["fileInfo__S1__f1:[* TO *] OR fileInfo__S1__f2:[* TO *]"]
        );
    }

    #[test]
    fn test_files_and_with_qual() {
        let clauses = render(FileFilters {
            study: Some("S1"),
            file: Some("f1;f2"),
            qual: Some(">30"),
            ..Default::default()
        });
        assert_eq!(
            clauses,
            vec![
                "fileInfo__S1__f1:[* TO *]",
                "fileInfo__S1__f2:[* TO *]",
                "qual__S1__f1:{30 TO *]",
                "qual__S1__f2:{30 TO *]",
            ]
        );
    }

    #[test]
    fn test_filter_across_files() {
        let clauses = render(FileFilters {
            study: Some("S1"),
            file: Some("f1,f2"),
            filter: Some("PASS"),
            ..Default::default()
        });
        assert_eq!(
            clauses[1],
            "filter__S1__f1:/(.*)?PASS(.*)?/ OR filter__S1__f2:/(.*)?PASS(.*)?/"
        );
    }

    #[test]
    fn test_filter_values_combined() {
        let clauses = render(FileFilters {
            study: Some("S1"),
            file: Some("f1"),
            filter: Some("LowGQ;LowDP"),
            ..Default::default()
        });
        assert_eq!(
            clauses,
            vec![
                "fileInfo__S1__f1:[* TO *]",
                "filter__S1__f1:/(.*)?LowGQ(.*)?/ AND filter__S1__f1:/(.*)?LowDP(.*)?/",
            ]
        );
    }

    #[test]
    fn test_quoted_filter_separator() {
        let clauses = render(FileFilters {
            study: Some("S1"),
            file: Some("f1"),
            filter: Some(r#""LowGQ;LowDP",PASS"#),
            ..Default::default()
        });
        assert_eq!(
            clauses[1],
            "filter__S1__f1:/(.*)?LowGQ;LowDP(.*)?/ OR filter__S1__f1:/(.*)?PASS(.*)?/"
        );

        let clauses = render(FileFilters {
            study: Some("S1"),
            file: Some("f1"),
            filter: Some(r#""LowGQ,LowDP";PASS"#),
            ..Default::default()
        });
        assert_eq!(
            clauses[1],
            "filter__S1__f1:/(.*)?LowGQ,LowDP(.*)?/ AND filter__S1__f1:/(.*)?PASS(.*)?/"
        );
    }

    #[test]
    fn test_include_files_fallback() {
        let include = vec!["f1".to_string(), "f2".to_string()];
        let clauses = render(FileFilters {
            study: Some("S1"),
            include_files: Some(include.as_slice()),
            qual: Some(">=10"),
            ..Default::default()
        });
        assert_eq!(
            clauses,
            vec!["qual__S1__f1:[10 TO *] OR qual__S1__f2:[10 TO *]"]
        );
    }

    #[test]
    fn test_qual_without_files() {
        let err = FileFilters {
            study: Some("S1"),
            qual: Some("20"),
            ..Default::default()
        }
        .build()
        .unwrap_err();
        assert!(matches!(err, Error::MissingFileContext { ref key } if key == "qual"));
    }

    #[test]
    fn test_file_without_study() {
        let err = FileFilters {
            file: Some("f1"),
            ..Default::default()
        }
        .build()
        .unwrap_err();
        assert!(matches!(err, Error::MissingStudyContext { .. }));
    }
}
