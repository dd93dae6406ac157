use std::fmt;
use strum::IntoEnumIterator;

use super::types::TrendPeriod;

/// Route-shaped key a cached backend read is stored under
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    Jars,
    Jar(String),
    Stats(String),
    Trend(String, TrendPeriod),
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryKey::Jars => write!(f, "swearjar"),
            QueryKey::Jar(id) => write!(f, "swearjar?id={}", id),
            QueryKey::Stats(id) => write!(f, "swearjar/stats?id={}", id),
            QueryKey::Trend(id, period) => write!(f, "swearjar/trend?id={}&period={}", id, period),
        }
    }
}

/// Writes that make cached reads stale
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    AddSwear { jar_id: String },
    CreateJar,
    UpdateJar { jar_id: String },
}

impl Mutation {
    /// Literal keys to drop; nothing is matched by prefix
    pub fn invalidates(&self) -> Vec<QueryKey> {
        match self {
            Mutation::AddSwear { jar_id } => {
                let mut keys = vec![QueryKey::Jar(jar_id.clone()), QueryKey::Stats(jar_id.clone())];
                keys.extend(TrendPeriod::iter().map(|period| QueryKey::Trend(jar_id.clone(), period)));
                keys
            }
            Mutation::CreateJar => vec![QueryKey::Jars],
            Mutation::UpdateJar { jar_id } => vec![QueryKey::Jars, QueryKey::Jar(jar_id.clone())],
        }
    }

    pub fn invalidated_keys(&self) -> Vec<String> {
        self.invalidates().iter().map(QueryKey::to_string).collect()
    }
}
