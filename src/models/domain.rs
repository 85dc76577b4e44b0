use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Dog description parsed from the vision model's reply
///
/// The model is asked for `height`, `weight`, `lifespan`, `breed`, `breed_group`,
/// `shed_level`, `temperament`, `energy_level` and `common_health_concerns`, but
/// nothing is enforced: any field may be missing and extra fields are kept as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BreedRecord(Map<String, Value>);

impl BreedRecord {
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn breed(&self) -> Option<&str> {
        self.non_empty_str("breed")
    }

    pub fn breed_group(&self) -> Option<&str> {
        self.non_empty_str("breed_group")
    }

    /// The (breed, breed_group) pair used to key statistics, when both are usable
    pub fn stat_key(&self) -> Option<(&str, &str)> {
        Some((self.breed()?, self.breed_group()?))
    }

    pub fn temperament(&self) -> Vec<&str> {
        self.str_list("temperament")
    }

    pub fn common_health_concerns(&self) -> Vec<&str> {
        self.str_list("common_health_concerns")
    }

    fn non_empty_str(&self, field: &str) -> Option<&str> {
        self.0
            .get(field)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    fn str_list(&self, field: &str) -> Vec<&str> {
        self.0
            .get(field)
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }
}

/// Number of successful analyses for one (breed, breed_group) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreedStat {
    pub breed: String,
    pub breed_group: String,
    pub count: i64,
}

/// Aggregated count for a single breed or breed group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreedCount {
    #[serde(rename = "_id")]
    pub id: String,
    pub count: i64,
}
