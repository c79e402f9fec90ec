// The allow-list is the gate in front of every registration.
// Only names that appear here can ever be persisted, and the spelling
// that gets stored is the one written below, never the user's typing.

use std::collections::HashMap;
use std::fmt;

/// Guild roster of approved IGNs. Order matters: when two entries normalize
/// to the same key, the first one decides the canonical casing.
pub const GUILD_ROSTER: &[&str] = &[
    "xMads",
    "SolarieL",
    "Fatee",
    "xShoo",
    "Eput1",
    "xLOGZ",
    "Venzo",
    "BoszJeff",
    "Fize",
    "06",
    "Spotter",
    "Cassie4",
    "Jibunメ",
    "Val258",
    "Avenged7Fold",
    "Nanahoshi",
    "dE",
    "Walangheal",
    "MatKage",
    "Feyt",
    "TESTEROSSAA",
    "Juollide",
    "Schneiz",
    "Spades",
    "Notwell",
    "Joe平",
    "Akosipiso",
    "Hachiiiii",
    "HorySheyt",
    "GREIIGH",
    "RMdSlayer",
    "RoseAnne",
    "NTrigger",
    "HadesX",
    "TAMPALPUKE69",
    "MiSSiiAH",
    "Pierced",
    "Ahuehue",
    "冬",
];

/// Lookup key for a name: surrounding whitespace removed, lowercased.
pub fn normalize_ign(name: &str) -> String {
    name.trim().to_lowercase()
}

/// An IGN that has passed the allow-list.
///
/// There is no public constructor: the only way to get one is
/// [`AllowList::canonical_of`], so anything that accepts a `CanonicalIgn`
/// can trust it was approved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalIgn {
    name: String,
    key: String,
}

impl CanonicalIgn {
    /// Officially-cased spelling.
    pub fn as_str(&self) -> &str {
        &self.name
    }

    /// Normalized storage key.
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl fmt::Display for CanonicalIgn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Case-insensitive set of approved names, built once at startup.
#[derive(Debug, Clone)]
pub struct AllowList {
    canonical: HashMap<String, String>,
    ordered: Vec<String>,
}

impl AllowList {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut canonical = HashMap::new();
        let mut ordered = Vec::new();

        for name in names {
            let trimmed = name.as_ref().trim();
            if trimmed.is_empty() {
                continue;
            }
            let key = normalize_ign(trimmed);
            if canonical.contains_key(&key) {
                continue;
            }
            canonical.insert(key, trimmed.to_string());
            ordered.push(trimmed.to_string());
        }

        Self { canonical, ordered }
    }

    pub fn is_allowed(&self, name: &str) -> bool {
        self.canonical.contains_key(&normalize_ign(name))
    }

    /// Resolve user input to its canonical spelling. `None` means reject;
    /// callers must not fall back to the raw input.
    pub fn canonical_of(&self, name: &str) -> Option<CanonicalIgn> {
        let key = normalize_ign(name);
        self.canonical.get(&key).map(|canonical| CanonicalIgn {
            name: canonical.clone(),
            key,
        })
    }

    /// Canonical names in roster order.
    pub fn names(&self) -> &[String] {
        &self.ordered
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }
}

impl Default for AllowList {
    fn default() -> Self {
        Self::new(GUILD_ROSTER.iter().copied())
    }
}
