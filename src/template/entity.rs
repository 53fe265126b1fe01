//! Entity pools, semantic value generators, and numeric specs
//!
//! These are the value sources behind `{{entityN}}`, `{{semanticN:kind}}`,
//! and `{{numberN:min:max[:format]}}` placeholders. Pools and generators are
//! deliberately wide so repeated generation passes rarely produce the same
//! question twice.

use crate::error::{ResolveError, ResolveResult};
use rand::rngs::StdRng;
use rand::Rng;
use std::collections::HashMap;

/// The legacy default pool, used by bare `{{entityN}}` placeholders. Kept
/// large on purpose: narrow pools make generated questions memorizable.
const DEFAULT_POOL: &[&str] = &[
    "falcon", "harbor", "quartz", "meadow", "lantern", "summit", "willow", "garnet", "breeze",
    "anchor", "maple", "cedar", "onyx", "prairie", "beacon", "canyon", "drift", "ember", "fjord",
    "grove", "hazel", "inlet", "juniper", "kestrel", "ledger", "mosaic", "nectar", "orchard",
    "pebble", "quarry", "ridge", "saffron", "thicket", "umber", "vertex", "wharf", "yarrow",
    "zenith", "aspen", "basil", "dune", "elm", "fern", "gale", "heron", "iris", "jade", "kelp",
    "lagoon", "marsh", "osprey", "pine", "quill", "reef", "sage", "tide", "vale", "wren", "alder",
    "birch", "cliff", "delta", "eddy", "flint", "glen", "hollow", "isle", "knoll", "loch", "mesa",
    "nook", "oasis", "plume", "rapids", "shoal", "tarn", "upland", "vista", "wold", "bay", "cape",
    "dell", "fen", "gorge", "heath", "moor", "peak", "shore", "trail", "crest", "brook",
];

const COLORS: &[&str] = &[
    "red", "blue", "green", "yellow", "purple", "orange", "teal", "crimson", "indigo", "amber",
    "violet", "maroon",
];

const METALS: &[&str] = &[
    "iron", "copper", "silver", "gold", "titanium", "nickel", "cobalt", "zinc", "platinum", "tin",
];

const GEMS: &[&str] = &[
    "ruby", "emerald", "sapphire", "topaz", "opal", "amethyst", "pearl", "jasper", "peridot",
    "citrine", "beryl", "zircon",
];

/// Named entity pools plus the legacy default pool
#[derive(Debug, Clone)]
pub struct EntityPools {
    default_pool: Vec<String>,
    named: HashMap<String, Vec<String>>,
}

impl Default for EntityPools {
    fn default() -> Self {
        Self::builtin()
    }
}

impl EntityPools {
    /// The built-in pool set: the legacy default pool plus `colors`,
    /// `metals`, and `gems`
    pub fn builtin() -> Self {
        let mut named = HashMap::new();
        named.insert("colors".to_string(), to_owned(COLORS));
        named.insert("metals".to_string(), to_owned(METALS));
        named.insert("gems".to_string(), to_owned(GEMS));
        Self {
            default_pool: to_owned(DEFAULT_POOL),
            named,
        }
    }

    /// A pool set with no members, for callers that supply everything
    pub fn empty() -> Self {
        Self {
            default_pool: Vec::new(),
            named: HashMap::new(),
        }
    }

    /// Add or replace a named pool
    pub fn insert(&mut self, name: impl Into<String>, members: Vec<String>) {
        self.named.insert(name.into(), members);
    }

    /// Replace the default pool
    pub fn set_default(&mut self, members: Vec<String>) {
        self.default_pool = members;
    }

    /// Members of the named pool, or of the default pool when `pool` is
    /// `None`. Unknown or empty pools are argument errors.
    pub fn members(&self, pool: Option<&str>) -> ResolveResult<&[String]> {
        let (label, members) = match pool {
            None => ("default", self.default_pool.as_slice()),
            Some(name) => match self.named.get(name) {
                Some(members) => (name, members.as_slice()),
                None => {
                    return Err(ResolveError::Argument {
                        function: "entity".to_string(),
                        reason: format!(
                            "unknown entity pool '{}' (known: {})",
                            name,
                            self.pool_names().join(", ")
                        ),
                    })
                }
            },
        };
        if members.is_empty() {
            return Err(ResolveError::Argument {
                function: "entity".to_string(),
                reason: format!("entity pool '{label}' has no members"),
            });
        }
        Ok(members)
    }

    /// Names of all registered pools, sorted
    pub fn pool_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.named.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

fn to_owned(members: &[&str]) -> Vec<String> {
    members.iter().map(|s| s.to_string()).collect()
}

const FIRST_NAMES: &[&str] = &[
    "James", "Mary", "Robert", "Patricia", "John", "Jennifer", "Michael", "Linda", "David",
    "Elizabeth", "William", "Barbara", "Richard", "Susan", "Joseph", "Jessica", "Thomas",
    "Sarah", "Carlos", "Nancy", "Daniel", "Karen", "Wei", "Amara", "Henry", "Priya", "Omar",
    "Sofia",
];

const LAST_NAMES: &[&str] = &[
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller", "Davis", "Rodriguez",
    "Martinez", "Hernandez", "Lopez", "Gonzalez", "Wilson", "Anderson", "Thomas", "Taylor",
    "Moore", "Jackson", "Martin", "Lee", "Perez", "Thompson", "White", "Nguyen", "Chen", "Patel",
    "Kim",
];

const CITIES: &[&str] = &[
    "Portland", "Austin", "Denver", "Madison", "Raleigh", "Boise", "Tucson", "Omaha",
    "Savannah", "Tacoma", "Fresno", "Albany", "Wichita", "Reno", "Durham", "Spokane",
    "Richmond", "Mobile", "Toledo", "Lincoln", "Norfolk", "Laredo", "Chandler", "Glendale",
];

const DEPARTMENTS: &[&str] = &[
    "Engineering", "Marketing", "Sales", "Finance", "Operations", "Legal", "Support",
    "Research", "Logistics", "Procurement", "Design", "Security",
];

const COMPANIES: &[&str] = &[
    "Northwind Trading", "Contoso Labs", "Fabrikam Industries", "Lamna Healthcare",
    "Tailspin Toys", "Wingtip Logistics", "Proseware Systems", "Adventure Works",
    "Woodgrove Bank", "Litware Analytics", "Fourth Coffee", "Trey Research",
];

const PRODUCTS: &[&str] = &[
    "stapler", "monitor", "keyboard", "notebook", "projector", "whiteboard", "headset",
    "scanner", "printer", "webcam", "desk lamp", "office chair",
];

/// A kind of realistic value a `{{semanticN:kind}}` placeholder resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SemanticKind {
    Person,
    FirstName,
    LastName,
    City,
    Department,
    Company,
    Product,
}

impl SemanticKind {
    /// Parse a kind tag from a placeholder
    pub fn parse(kind: &str) -> ResolveResult<Self> {
        match kind {
            "person" => Ok(SemanticKind::Person),
            "first_name" => Ok(SemanticKind::FirstName),
            "last_name" => Ok(SemanticKind::LastName),
            "city" => Ok(SemanticKind::City),
            "department" => Ok(SemanticKind::Department),
            "company" => Ok(SemanticKind::Company),
            "product" => Ok(SemanticKind::Product),
            other => Err(ResolveError::Argument {
                function: "semantic".to_string(),
                reason: format!(
                    "unknown semantic kind '{other}' (known: person, first_name, last_name, \
                     city, department, company, product)"
                ),
            }),
        }
    }

    /// Draw a plausible value of this kind
    pub fn generate(&self, rng: &mut StdRng) -> String {
        match self {
            SemanticKind::Person => {
                format!("{} {}", pick(FIRST_NAMES, rng), pick(LAST_NAMES, rng))
            }
            SemanticKind::FirstName => pick(FIRST_NAMES, rng).to_string(),
            SemanticKind::LastName => pick(LAST_NAMES, rng).to_string(),
            SemanticKind::City => pick(CITIES, rng).to_string(),
            SemanticKind::Department => pick(DEPARTMENTS, rng).to_string(),
            SemanticKind::Company => pick(COMPANIES, rng).to_string(),
            SemanticKind::Product => pick(PRODUCTS, rng).to_string(),
        }
    }
}

fn pick<'a>(candidates: &'a [&'a str], rng: &mut StdRng) -> &'a str {
    candidates[rng.random_range(0..candidates.len())]
}

/// Output format for a numeric placeholder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NumericFormat {
    #[default]
    Integer,
    Decimal,
    Currency,
    Percentage,
}

impl NumericFormat {
    pub fn parse(tag: &str) -> ResolveResult<Self> {
        match tag {
            "integer" => Ok(NumericFormat::Integer),
            "decimal" => Ok(NumericFormat::Decimal),
            "currency" => Ok(NumericFormat::Currency),
            "percentage" => Ok(NumericFormat::Percentage),
            other => Err(ResolveError::Argument {
                function: "number".to_string(),
                reason: format!(
                    "unknown numeric format '{other}' (known: integer, decimal, currency, \
                     percentage)"
                ),
            }),
        }
    }

    fn requires_integer_bounds(&self) -> bool {
        matches!(self, NumericFormat::Integer | NumericFormat::Percentage)
    }
}

/// A parsed `{{numberN:min:max[:format]}}` spec
#[derive(Debug, Clone, PartialEq)]
pub struct NumericSpec {
    min: f64,
    max: f64,
    format: NumericFormat,
}

impl NumericSpec {
    /// Parse bounds and an optional format tag. Integer and percentage
    /// formats require integer bounds; decimal and currency accept
    /// fractional bounds.
    pub fn parse(min: &str, max: &str, format: Option<&str>) -> ResolveResult<Self> {
        let format = match format {
            Some(tag) => NumericFormat::parse(tag)?,
            None => NumericFormat::default(),
        };
        let min = parse_bound(min, format)?;
        let max = parse_bound(max, format)?;
        if min > max {
            return Err(ResolveError::Argument {
                function: "number".to_string(),
                reason: format!("min {min} exceeds max {max}"),
            });
        }
        Ok(Self { min, max, format })
    }

    /// Sample uniformly in `[min, max]` and render per the format
    pub fn sample(&self, rng: &mut StdRng) -> String {
        match self.format {
            NumericFormat::Integer => {
                let value = rng.random_range(self.min as i64..=self.max as i64);
                value.to_string()
            }
            NumericFormat::Percentage => {
                let value = rng.random_range(self.min as i64..=self.max as i64);
                format!("{value}%")
            }
            NumericFormat::Decimal => {
                let value = rng.random_range(self.min..=self.max);
                format!("{value:.2}")
            }
            NumericFormat::Currency => {
                let value = rng.random_range(self.min..=self.max);
                format!("${value:.2}")
            }
        }
    }
}

fn parse_bound(raw: &str, format: NumericFormat) -> ResolveResult<f64> {
    let value: f64 = raw.trim().parse().map_err(|_| ResolveError::Argument {
        function: "number".to_string(),
        reason: format!("bound '{raw}' is not a number"),
    })?;
    if format.requires_integer_bounds() && value.fract() != 0.0 {
        return Err(ResolveError::Argument {
            function: "number".to_string(),
            reason: format!("format requires integer bounds, got '{raw}'"),
        });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(11)
    }

    #[test]
    fn test_default_pool_is_wide() {
        let pools = EntityPools::builtin();
        let members = pools.members(None).unwrap();
        // Narrow pools defeat the anti-memorization goal.
        assert!(members.len() >= 80);
    }

    #[test]
    fn test_named_pool_lookup() {
        let pools = EntityPools::builtin();
        let colors = pools.members(Some("colors")).unwrap();
        assert!(colors.contains(&"teal".to_string()));
    }

    #[test]
    fn test_unknown_pool_is_argument_error() {
        let pools = EntityPools::builtin();
        let err = pools.members(Some("planets")).unwrap_err();
        assert_eq!(err.kind(), "argument");
        assert!(err.to_string().contains("planets"));
    }

    #[test]
    fn test_custom_pool_insert() {
        let mut pools = EntityPools::builtin();
        pools.insert("planets", vec!["mars".to_string(), "venus".to_string()]);
        assert_eq!(pools.members(Some("planets")).unwrap().len(), 2);
    }

    #[test]
    fn test_semantic_person_has_first_and_last() {
        let mut rng = rng();
        let value = SemanticKind::Person.generate(&mut rng);
        assert_eq!(value.split_whitespace().count(), 2);
    }

    #[test]
    fn test_semantic_unknown_kind() {
        let err = SemanticKind::parse("spaceship").unwrap_err();
        assert_eq!(err.kind(), "argument");
    }

    #[test]
    fn test_numeric_integer_in_range() {
        let spec = NumericSpec::parse("10", "20", None).unwrap();
        let mut rng = rng();
        for _ in 0..200 {
            let value: i64 = spec.sample(&mut rng).parse().unwrap();
            assert!((10..=20).contains(&value));
        }
    }

    #[test]
    fn test_numeric_formats() {
        let mut rng = rng();

        let currency = NumericSpec::parse("5", "9", Some("currency")).unwrap();
        let rendered = currency.sample(&mut rng);
        assert!(rendered.starts_with('$'));
        assert!(rendered.contains('.'));

        let percentage = NumericSpec::parse("1", "99", Some("percentage")).unwrap();
        assert!(percentage.sample(&mut rng).ends_with('%'));

        let decimal = NumericSpec::parse("0.5", "1.5", Some("decimal")).unwrap();
        let value: f64 = decimal.sample(&mut rng).parse().unwrap();
        assert!((0.5..=1.5).contains(&value));
    }

    #[test]
    fn test_numeric_bad_bounds() {
        assert_eq!(
            NumericSpec::parse("20", "10", None).unwrap_err().kind(),
            "argument"
        );
        assert_eq!(
            NumericSpec::parse("1.5", "3", None).unwrap_err().kind(),
            "argument"
        );
        assert_eq!(
            NumericSpec::parse("abc", "10", None).unwrap_err().kind(),
            "argument"
        );
    }
}
