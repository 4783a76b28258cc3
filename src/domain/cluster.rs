use std::fmt;

/// Empty means every index for health, nothing to do for create and delete.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceList {
    names: Vec<String>,
}

impl ResourceList {
    pub fn parse(segment: &str) -> Self {
        Self {
            names: segment
                .split(',')
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn joined(&self) -> String {
        self.names.join(",")
    }
}

impl fmt::Display for ResourceList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.joined())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthLevel {
    Cluster,
    Indices,
    Shards,
}

impl HealthLevel {
    pub fn as_param(self) -> Option<&'static str> {
        match self {
            HealthLevel::Cluster => None,
            HealthLevel::Indices => Some("indices"),
            HealthLevel::Shards => Some("shards"),
        }
    }
}
