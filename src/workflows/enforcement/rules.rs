use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::domain::Severity;

/// Reference entry in the municipal rule catalogue. Immutable once matched:
/// the decision engine copies what it needs into the violation's snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViolationRule {
    pub code: String,
    pub title: String,
    pub category: String,
    pub entity_types: Vec<String>,
    pub act: String,
    pub section: String,
    pub authority: String,
    pub severity: Severity,
    pub compoundable: bool,
    pub description: String,
    pub keywords: Vec<String>,
}

/// Read-only catalogue seam so the decision engine can be exercised against
/// stubs in tests.
pub trait RuleRepository: Send + Sync {
    fn find_by_code(&self, code: &str) -> Result<Option<ViolationRule>, RuleLookupError>;

    /// Fallback lookup: first rule whose category or entity types intersect
    /// the hints and whose keywords intersect the supplied tokens.
    fn find_by_category_and_keywords(
        &self,
        category: &str,
        entity_type: &str,
        tokens: &[String],
    ) -> Result<Option<ViolationRule>, RuleLookupError>;
}

/// Catalogue lookup failure. Infrastructure-class: a code with no matching
/// rule is not an error, it is the review fallback.
#[derive(Debug, thiserror::Error)]
pub enum RuleLookupError {
    #[error("rule catalogue unavailable: {0}")]
    Unavailable(String),
}

/// Lowercased alphanumeric tokens used for keyword derivation and free-text
/// matching.
pub(crate) fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// In-memory rule catalogue bundled with the service. Real deployments load
/// the municipal `rules.csv` export; `standard()` seeds a representative set.
#[derive(Debug, Default, Clone)]
pub struct RuleCatalog {
    rules: Vec<ViolationRule>,
}

impl RuleCatalog {
    pub fn new(rules: Vec<ViolationRule>) -> Self {
        Self { rules }
    }

    pub fn standard() -> Self {
        Self::new(standard_rules())
    }

    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self, CatalogImportError> {
        let file = File::open(path)?;
        Self::from_csv_reader(file)
    }

    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, CatalogImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut rules: Vec<ViolationRule> = Vec::new();
        for row in csv_reader.deserialize::<CatalogRow>() {
            let rule = row?.into_rule()?;
            if rules.iter().any(|existing| existing.code == rule.code) {
                return Err(CatalogImportError::DuplicateCode(rule.code));
            }
            rules.push(rule);
        }

        Ok(Self::new(rules))
    }

    pub fn rules(&self) -> &[ViolationRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl RuleRepository for RuleCatalog {
    fn find_by_code(&self, code: &str) -> Result<Option<ViolationRule>, RuleLookupError> {
        Ok(self
            .rules
            .iter()
            .find(|rule| rule.code.eq_ignore_ascii_case(code))
            .cloned())
    }

    fn find_by_category_and_keywords(
        &self,
        category: &str,
        entity_type: &str,
        tokens: &[String],
    ) -> Result<Option<ViolationRule>, RuleLookupError> {
        let found = self.rules.iter().find(|rule| {
            let scope_matches = rule.category.eq_ignore_ascii_case(category)
                || rule
                    .entity_types
                    .iter()
                    .any(|entity| entity.eq_ignore_ascii_case(entity_type));
            scope_matches && rule.keywords.iter().any(|keyword| tokens.contains(keyword))
        });

        Ok(found.cloned())
    }
}

/// Error enumeration for catalogue imports.
#[derive(Debug, thiserror::Error)]
pub enum CatalogImportError {
    #[error("failed to read rule catalogue: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed rule catalogue row: {0}")]
    Csv(#[from] csv::Error),
    #[error("rule catalogue row is missing a violation code")]
    MissingCode,
    #[error("rule catalogue has duplicate code {0}")]
    DuplicateCode(String),
}

/// Row shape of the municipal `rules.csv` export. Entity types are
/// pipe-separated, compoundability is a yes/no column.
#[derive(Debug, Deserialize)]
struct CatalogRow {
    violation_code: String,
    title: String,
    category: String,
    #[serde(default)]
    entity_type: String,
    #[serde(default)]
    act: String,
    #[serde(default)]
    section: String,
    #[serde(default)]
    authority: String,
    #[serde(default)]
    severity: String,
    #[serde(default)]
    compoundable: String,
    #[serde(default)]
    description: String,
}

impl CatalogRow {
    fn into_rule(self) -> Result<ViolationRule, CatalogImportError> {
        if self.violation_code.is_empty() {
            return Err(CatalogImportError::MissingCode);
        }

        let keywords = tokenize(&format!(
            "{} {} {}",
            self.title, self.category, self.description
        ));

        Ok(ViolationRule {
            code: self.violation_code,
            title: self.title,
            category: self.category,
            entity_types: self
                .entity_type
                .split('|')
                .map(str::trim)
                .filter(|entity| !entity.is_empty())
                .map(str::to_string)
                .collect(),
            act: self.act,
            section: self.section,
            authority: self.authority,
            severity: normalize_severity(&self.severity),
            compoundable: self.compoundable.eq_ignore_ascii_case("yes"),
            description: self.description,
            keywords,
        })
    }
}

/// Unknown severity labels degrade to Low rather than rejecting the row,
/// matching how the catalogue has historically been curated.
fn normalize_severity(raw: &str) -> Severity {
    match raw.to_ascii_lowercase().as_str() {
        "high" => Severity::High,
        "medium" => Severity::Medium,
        _ => Severity::Low,
    }
}

fn standard_rules() -> Vec<ViolationRule> {
    fn rule(
        code: &str,
        title: &str,
        category: &str,
        entity_types: &[&str],
        act: &str,
        section: &str,
        authority: &str,
        severity: Severity,
        compoundable: bool,
        description: &str,
    ) -> ViolationRule {
        let keywords = tokenize(&format!("{title} {category} {description}"));
        ViolationRule {
            code: code.to_string(),
            title: title.to_string(),
            category: category.to_string(),
            entity_types: entity_types.iter().map(|e| e.to_string()).collect(),
            act: act.to_string(),
            section: section.to_string(),
            authority: authority.to_string(),
            severity,
            compoundable,
            description: description.to_string(),
            keywords,
        }
    }

    vec![
        rule(
            "WASTE-002",
            "Unsegregated waste disposal",
            "Sanitation",
            &["Shop", "Industry"],
            "Municipal Solid Waste Management Act",
            "12(1)",
            "Sanitation Department",
            Severity::Low,
            true,
            "Mixed dry and wet waste left at the kerbside without segregation",
        ),
        rule(
            "NOISE-001",
            "Construction noise outside permitted hours",
            "Noise",
            &["Industry", "Shop"],
            "Noise Pollution Control Rules",
            "5(3)",
            "Pollution Control Board",
            Severity::Medium,
            true,
            "Machinery or construction noise between 22:00 and 06:00",
        ),
        rule(
            "EFFLUENT-003",
            "Untreated effluent discharge",
            "Pollution",
            &["Industry"],
            "Water (Prevention and Control of Pollution) Act",
            "24",
            "Pollution Control Board",
            Severity::High,
            false,
            "Industrial effluent released into a storm drain or water body",
        ),
        rule(
            "TRADE-010",
            "Trading without a renewed licence",
            "Licensing",
            &["Shop"],
            "Municipal Trade Licensing By-laws",
            "7(2)",
            "Licensing Office",
            Severity::Low,
            false,
            "Commercial activity continuing past the licence renewal date",
        ),
        rule(
            "SIGN-007",
            "Oversized signage without approval",
            "Signage",
            &["Shop"],
            "Outdoor Advertising Regulations",
            "9",
            "Town Planning Department",
            Severity::Medium,
            true,
            "Hoarding or shopfront signage exceeding the sanctioned dimensions",
        ),
        rule(
            "FARM-015",
            "Open burning of crop residue",
            "Sanitation",
            &["Farm"],
            "Air (Prevention and Control of Pollution) Act",
            "19(5)",
            "Pollution Control Board",
            Severity::High,
            false,
            "Stubble or residue burning in open fields",
        ),
    ]
}
