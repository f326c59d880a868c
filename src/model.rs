use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    #[default]
    #[serde(other)]
    Other,
}

/// One person as supplied by the upstream data source. Dates are display
/// strings and are never parsed.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyMember {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub death_date: Option<String>,
    #[serde(default)]
    pub parent_ids: Vec<String>,
    #[serde(default)]
    pub spouse_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occupation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl FamilyMember {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_parents<I, S>(mut self, parents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parent_ids = parents.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_root_candidate(&self) -> bool {
        self.parent_ids.is_empty()
    }

    pub fn has_parent(&self, id: &str) -> bool {
        self.parent_ids.iter().any(|parent| parent == id)
    }

    /// `"b. <birth> - d. <death>"`, dropping whichever half is missing.
    pub fn lifespan_label(&self) -> Option<String> {
        match (self.birth_date.as_deref(), self.death_date.as_deref()) {
            (Some(birth), Some(death)) => Some(format!("b. {birth} - d. {death}")),
            (Some(birth), None) => Some(format!("b. {birth}")),
            (None, Some(death)) => Some(format!("d. {death}")),
            (None, None) => None,
        }
    }
}

/// Insertion-ordered member store. A repeated id replaces the earlier record
/// but keeps the earlier position.
#[derive(Debug, Clone, Default)]
pub struct FamilyGraph {
    members: IndexMap<String, FamilyMember>,
}

impl FamilyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_members(members: impl IntoIterator<Item = FamilyMember>) -> Self {
        let mut graph = Self::new();
        for member in members {
            graph.insert(member);
        }
        graph
    }

    pub fn insert(&mut self, member: FamilyMember) {
        self.members.insert(member.id.clone(), member);
    }

    pub fn get(&self, id: &str) -> Option<&FamilyMember> {
        self.members.get(id)
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.members.get_index_of(id)
    }

    pub fn member_at(&self, index: usize) -> Option<&FamilyMember> {
        self.members.get_index(index).map(|(_, member)| member)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FamilyMember> {
        self.members.values()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn clear(&mut self) {
        self.members.clear();
    }
}

/// Accepts either a bare JSON array of members or `{ "members": [...] }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum MembersFile {
    List(Vec<FamilyMember>),
    Wrapped { members: Vec<FamilyMember> },
}

impl MembersFile {
    pub fn into_members(self) -> Vec<FamilyMember> {
        match self {
            MembersFile::List(members) | MembersFile::Wrapped { members } => members,
        }
    }
}

pub fn parse_members(input: &str) -> serde_json::Result<Vec<FamilyMember>> {
    serde_json::from_str::<MembersFile>(input).map(MembersFile::into_members)
}
