//! # Format Predicates
//!
//! Named semantic validators that extend the schema engine's primitive
//! type system. A schema node declaring `"format": "<name>"` is checked
//! by the predicate registered under `<name>`.
//!
//! The registry is an explicit value constructed once at startup and
//! passed into schema loading — not hidden global state. Registration
//! completes before any evaluation reads it, so no locking is needed.

use std::collections::HashMap;
use std::sync::Arc;

use jsonschema::ValidationOptions;
use serde_json::Value;

/// Name under which the country-code format is registered. Schemas
/// reference it verbatim in their `format` keyword.
pub const COUNTRY_CODE_FORMAT: &str = "ISO 3166-1 alpha-3";

/// ISO 3166-1 alpha-3 country codes, uppercase, sorted for binary search.
const ISO3166_ALPHA3: &[&str] = &[
    "ABW", "AFG", "AGO", "AIA", "ALA", "ALB", "AND", "ARE", "ARG", "ARM", "ASM", "ATA", "ATF",
    "ATG", "AUS", "AUT", "AZE", "BDI", "BEL", "BEN", "BES", "BFA", "BGD", "BGR", "BHR", "BHS",
    "BIH", "BLM", "BLR", "BLZ", "BMU", "BOL", "BRA", "BRB", "BRN", "BTN", "BVT", "BWA", "CAF",
    "CAN", "CCK", "CHE", "CHL", "CHN", "CIV", "CMR", "COD", "COG", "COK", "COL", "COM", "CPV",
    "CRI", "CUB", "CUW", "CXR", "CYM", "CYP", "CZE", "DEU", "DJI", "DMA", "DNK", "DOM", "DZA",
    "ECU", "EGY", "ERI", "ESH", "ESP", "EST", "ETH", "FIN", "FJI", "FLK", "FRA", "FRO", "FSM",
    "GAB", "GBR", "GEO", "GGY", "GHA", "GIB", "GIN", "GLP", "GMB", "GNB", "GNQ", "GRC", "GRD",
    "GRL", "GTM", "GUF", "GUM", "GUY", "HKG", "HMD", "HND", "HRV", "HTI", "HUN", "IDN", "IMN",
    "IND", "IOT", "IRL", "IRN", "IRQ", "ISL", "ISR", "ITA", "JAM", "JEY", "JOR", "JPN", "KAZ",
    "KEN", "KGZ", "KHM", "KIR", "KNA", "KOR", "KWT", "LAO", "LBN", "LBR", "LBY", "LCA", "LIE",
    "LKA", "LSO", "LTU", "LUX", "LVA", "MAC", "MAF", "MAR", "MCO", "MDA", "MDG", "MDV", "MEX",
    "MHL", "MKD", "MLI", "MLT", "MMR", "MNE", "MNG", "MNP", "MOZ", "MRT", "MSR", "MTQ", "MUS",
    "MWI", "MYS", "MYT", "NAM", "NCL", "NER", "NFK", "NGA", "NIC", "NIU", "NLD", "NOR", "NPL",
    "NRU", "NZL", "OMN", "PAK", "PAN", "PCN", "PER", "PHL", "PLW", "PNG", "POL", "PRI", "PRK",
    "PRT", "PRY", "PSE", "PYF", "QAT", "REU", "ROU", "RUS", "RWA", "SAU", "SDN", "SEN", "SGP",
    "SGS", "SHN", "SJM", "SLB", "SLE", "SLV", "SMR", "SOM", "SPM", "SRB", "SSD", "STP", "SUR",
    "SVK", "SVN", "SWE", "SWZ", "SXM", "SYC", "SYR", "TCA", "TCD", "TGO", "THA", "TJK", "TKL",
    "TKM", "TLS", "TON", "TTO", "TUN", "TUR", "TUV", "TWN", "TZA", "UGA", "UKR", "UMI", "URY",
    "USA", "UZB", "VAT", "VCT", "VEN", "VGB", "VIR", "VNM", "VUT", "WLF", "WSM", "YEM", "ZAF",
    "ZMB", "ZWE",
];

/// Check function type: full predicate contract over a document value.
///
/// Returns `Ok(())` for a valid value, or a human-readable message
/// identifying the specific reason for rejection.
type FormatCheck = Arc<dyn Fn(&Value) -> Result<(), String> + Send + Sync>;

/// A named, pure semantic validator for scalar values.
#[derive(Clone)]
pub struct FormatPredicate {
    name: String,
    check: FormatCheck,
}

impl FormatPredicate {
    /// Create a predicate from a name and a check function.
    pub fn new(
        name: impl Into<String>,
        check: impl Fn(&Value) -> Result<(), String> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            check: Arc::new(check),
        }
    }

    /// The name schemas use to reference this predicate.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Apply the predicate to a document value.
    pub fn check(&self, value: &Value) -> Result<(), String> {
        (self.check)(value)
    }
}

impl std::fmt::Debug for FormatPredicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormatPredicate")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Registry of format predicates, keyed by name.
///
/// Built once at startup and passed by reference into
/// [`GameSchema::load`](crate::validate::GameSchema::load); read-only
/// for the remainder of the run.
#[derive(Debug, Default)]
pub struct FormatRegistry {
    predicates: HashMap<String, FormatPredicate>,
}

impl FormatRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry pre-loaded with the built-in domain predicates.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(country_code());
        registry
    }

    /// Register a predicate under its name. Registering the same name
    /// twice overwrites the earlier entry (last-write-wins). There is
    /// no removal operation.
    pub fn register(&mut self, predicate: FormatPredicate) {
        self.predicates
            .insert(predicate.name().to_string(), predicate);
    }

    /// Look up a predicate by name.
    pub fn get(&self, name: &str) -> Option<&FormatPredicate> {
        self.predicates.get(name)
    }

    /// Whether a predicate is registered under the given name.
    pub fn contains(&self, name: &str) -> bool {
        self.predicates.contains_key(name)
    }

    /// Names of all registered predicates, sorted alphabetically.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.predicates.keys().map(|s| s.as_str()).collect();
        names.sort();
        names
    }

    /// Returns the number of registered predicates.
    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    /// Returns true if no predicates are registered.
    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// Install every registered predicate into the schema engine's
    /// validation options.
    ///
    /// The engine only hands strings to format validators, so the
    /// non-string arm of each predicate never fires through this path;
    /// it exists for direct callers of [`FormatPredicate::check`].
    pub fn install(&self, opts: &mut ValidationOptions) {
        for (name, predicate) in &self.predicates {
            let predicate = predicate.clone();
            opts.with_format(name.clone(), move |s: &str| {
                predicate.check(&Value::String(s.to_string())).is_ok()
            });
        }
    }
}

/// The ISO 3166-1 alpha-3 country-code predicate.
///
/// Valid iff the value is a string that case-insensitively matches one
/// of the ~250 assigned three-letter country codes.
pub fn country_code() -> FormatPredicate {
    FormatPredicate::new(COUNTRY_CODE_FORMAT, |value| match value {
        Value::String(s) => {
            if is_country_code(s) {
                Ok(())
            } else {
                Err(format!(
                    "'{s}' is not a valid ISO 3166-1 alpha-3 country code"
                ))
            }
        }
        other => Err(format!(
            "expected a string, got {}",
            value_kind(other)
        )),
    })
}

/// Case-insensitive membership test against the reference table.
fn is_country_code(s: &str) -> bool {
    if s.len() != 3 || !s.is_ascii() {
        return false;
    }
    let upper = s.to_ascii_uppercase();
    ISO3166_ALPHA3.binary_search(&upper.as_str()).is_ok()
}

/// Human-readable name for a JSON value's kind.
fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reference_table_is_sorted_and_unique() {
        for pair in ISO3166_ALPHA3.windows(2) {
            assert!(pair[0] < pair[1], "{} >= {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn country_code_accepts_known_code() {
        let predicate = country_code();
        assert!(predicate.check(&json!("USA")).is_ok());
        assert!(predicate.check(&json!("DEU")).is_ok());
        assert!(predicate.check(&json!("ZWE")).is_ok());
    }

    #[test]
    fn country_code_is_case_insensitive() {
        let predicate = country_code();
        for variant in ["usa", "UsA", "uSa", "USA"] {
            assert!(predicate.check(&json!(variant)).is_ok(), "{variant}");
        }
    }

    #[test]
    fn country_code_rejects_unknown_code() {
        let predicate = country_code();
        let message = predicate.check(&json!("ZZZ")).unwrap_err();
        assert!(message.contains("ZZZ"), "message should echo the value: {message}");
        assert!(message.contains("ISO 3166-1 alpha-3"));
    }

    #[test]
    fn country_code_rejects_non_string() {
        let predicate = country_code();
        let message = predicate.check(&json!(840)).unwrap_err();
        assert!(message.contains("a number"), "message should name the kind: {message}");
        let message = predicate.check(&json!(["USA"])).unwrap_err();
        assert!(message.contains("an array"));
    }

    #[test]
    fn country_code_rejects_wrong_length_and_non_ascii() {
        let predicate = country_code();
        assert!(predicate.check(&json!("US")).is_err());
        assert!(predicate.check(&json!("USAA")).is_err());
        assert!(predicate.check(&json!("ÜSA")).is_err());
    }

    #[test]
    fn registry_register_and_lookup() {
        let mut registry = FormatRegistry::new();
        assert!(registry.is_empty());
        registry.register(country_code());
        assert_eq!(registry.len(), 1);
        assert!(registry.contains(COUNTRY_CODE_FORMAT));
        assert!(registry.get(COUNTRY_CODE_FORMAT).is_some());
        assert!(registry.get("no-such-format").is_none());
    }

    #[test]
    fn registry_last_write_wins() {
        let mut registry = FormatRegistry::new();
        registry.register(FormatPredicate::new("f", |_| Ok(())));
        registry.register(FormatPredicate::new("f", |_| Err("always".to_string())));
        assert_eq!(registry.len(), 1);
        let err = registry.get("f").unwrap().check(&json!("x")).unwrap_err();
        assert_eq!(err, "always");
    }

    #[test]
    fn registry_with_defaults_has_country_code() {
        let registry = FormatRegistry::with_defaults();
        assert_eq!(registry.names(), vec![COUNTRY_CODE_FORMAT]);
    }
}
