// Location alias resolution.
use std::collections::{BTreeMap, HashMap};

/// Maps known historical municipality names to the current municipality.
///
/// Names absent from the table are trusted as already canonical and pass
/// through unchanged; there is no validation step here.
#[derive(Debug, Clone, Default)]
pub struct LocationNormalizer {
    aliases: HashMap<String, String>,
}

impl LocationNormalizer {
    pub fn new(aliases: &BTreeMap<String, String>) -> Self {
        Self {
            aliases: aliases.clone().into_iter().collect(),
        }
    }

    pub fn resolve<'a>(&'a self, raw: &'a str) -> &'a str {
        self.aliases.get(raw).map(String::as_str).unwrap_or(raw)
    }
}
