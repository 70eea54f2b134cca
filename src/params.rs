use std::fmt;
use std::str::FromStr;

/// Filter keys the compiler understands.
///
/// Any other key in a request is matched as a plain categorical filter on the
/// field of the same name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKey {
    Id,
    Xref,
    Gene,
    Region,
    AnnotationClinvar,
    AnnotationCosmic,
    AnnotationConsequenceType,
    Study,
    Type,
    AnnotationBiotype,
    AnnotationProteinSubstitution,
    AnnotationConservation,
    AnnotationFunctionalScore,
    AnnotationPopulationAltFrequency,
    AnnotationPopulationRefFrequency,
    AnnotationPopulationMaf,
    StatsMaf,
    AnnotationGoGenes,
    AnnotationExpressionGenes,
    AnnotationGeneTraitId,
    AnnotationGeneTraitName,
    AnnotationHpo,
    AnnotationTrait,
    AnnotationProteinKeyword,
    AnnotationClinicalSignificance,
    Genotype,
    Format,
    File,
    Qual,
    Filter,
    Info,
    IncludeStudy,
    IncludeFile,
    IncludeSample,
}

impl FilterKey {
    pub const ALL: [FilterKey; 34] = [
        FilterKey::Id,
        FilterKey::Xref,
        FilterKey::Gene,
        FilterKey::Region,
        FilterKey::AnnotationClinvar,
        FilterKey::AnnotationCosmic,
        FilterKey::AnnotationConsequenceType,
        FilterKey::Study,
        FilterKey::Type,
        FilterKey::AnnotationBiotype,
        FilterKey::AnnotationProteinSubstitution,
        FilterKey::AnnotationConservation,
        FilterKey::AnnotationFunctionalScore,
        FilterKey::AnnotationPopulationAltFrequency,
        FilterKey::AnnotationPopulationRefFrequency,
        FilterKey::AnnotationPopulationMaf,
        FilterKey::StatsMaf,
        FilterKey::AnnotationGoGenes,
        FilterKey::AnnotationExpressionGenes,
        FilterKey::AnnotationGeneTraitId,
        FilterKey::AnnotationGeneTraitName,
        FilterKey::AnnotationHpo,
        FilterKey::AnnotationTrait,
        FilterKey::AnnotationProteinKeyword,
        FilterKey::AnnotationClinicalSignificance,
        FilterKey::Genotype,
        FilterKey::Format,
        FilterKey::File,
        FilterKey::Qual,
        FilterKey::Filter,
        FilterKey::Info,
        FilterKey::IncludeStudy,
        FilterKey::IncludeFile,
        FilterKey::IncludeSample,
    ];

    /// Keys whose values are gene symbols or cross-references.
    pub const IDENTIFIERS: [FilterKey; 5] = [
        FilterKey::Xref,
        FilterKey::Id,
        FilterKey::Gene,
        FilterKey::AnnotationClinvar,
        FilterKey::AnnotationCosmic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FilterKey::Id => "id",
            FilterKey::Xref => "xref",
            FilterKey::Gene => "gene",
            FilterKey::Region => "region",
            FilterKey::AnnotationClinvar => "annotationClinvar",
            FilterKey::AnnotationCosmic => "annotationCosmic",
            FilterKey::AnnotationConsequenceType => "annotationConsequenceType",
            FilterKey::Study => "study",
            FilterKey::Type => "type",
            FilterKey::AnnotationBiotype => "annotationBiotype",
            FilterKey::AnnotationProteinSubstitution => "annotationProteinSubstitution",
            FilterKey::AnnotationConservation => "annotationConservation",
            FilterKey::AnnotationFunctionalScore => "annotationFunctionalScore",
            FilterKey::AnnotationPopulationAltFrequency => "annotationPopulationAltFrequency",
            FilterKey::AnnotationPopulationRefFrequency => "annotationPopulationRefFrequency",
            FilterKey::AnnotationPopulationMaf => "annotationPopulationMaf",
            FilterKey::StatsMaf => "statsMaf",
            FilterKey::AnnotationGoGenes => "annotationGoGenes",
            FilterKey::AnnotationExpressionGenes => "annotationExpressionGenes",
            FilterKey::AnnotationGeneTraitId => "annotationGeneTraitId",
            FilterKey::AnnotationGeneTraitName => "annotationGeneTraitName",
            FilterKey::AnnotationHpo => "annotationHpo",
            FilterKey::AnnotationTrait => "annotationTrait",
            FilterKey::AnnotationProteinKeyword => "annotationProteinKeyword",
            FilterKey::AnnotationClinicalSignificance => "annotationClinicalSignificance",
            FilterKey::Genotype => "genotype",
            FilterKey::Format => "format",
            FilterKey::File => "file",
            FilterKey::Qual => "qual",
            FilterKey::Filter => "filter",
            FilterKey::Info => "info",
            FilterKey::IncludeStudy => "includeStudy",
            FilterKey::IncludeFile => "includeFile",
            FilterKey::IncludeSample => "includeSample",
        }
    }
}

impl FromStr for FilterKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FilterKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| format!("unknown filter key '{}'", s))
    }
}

impl fmt::Display for FilterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
