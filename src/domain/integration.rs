use std::collections::BTreeMap;
use std::fmt;

/// One unit of work: the integration display name as written in the sheet and
/// the Convoso list id it should point at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegrationRecord {
    name: String,
    list_id: String,
}

impl IntegrationRecord {
    /// Builds a record from raw cells. Returns `None` unless both values are
    /// non-empty after trimming.
    pub fn new(name: &str, list_id: &str) -> Option<Self> {
        let name = name.trim();
        let list_id = list_id.trim();

        if name.is_empty() || list_id.is_empty() {
            return None;
        }

        Some(Self {
            name: name.to_owned(),
            list_id: list_id.to_owned(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn list_id(&self) -> &str {
        &self.list_id
    }
}

impl fmt::Display for IntegrationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} → list_id={}", self.name, self.list_id)
    }
}

/// Integration names grouped by the list id they share. Only used for logging.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IntegrationGroups(BTreeMap<String, Vec<String>>);

impl IntegrationGroups {
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a IntegrationRecord>) -> Self {
        let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for record in records {
            groups
                .entry(record.list_id().to_owned())
                .or_default()
                .push(record.name().to_owned());
        }
        Self(groups)
    }

    pub fn names_for(&self, list_id: &str) -> Option<&[String]> {
        self.0.get(list_id).map(Vec::as_slice)
    }

    /// Groups where more than one integration points at the same list.
    pub fn shared(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0
            .iter()
            .filter(|(_, names)| names.len() > 1)
            .map(|(list_id, names)| (list_id.as_str(), names.as_slice()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0
            .iter()
            .map(|(list_id, names)| (list_id.as_str(), names.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
