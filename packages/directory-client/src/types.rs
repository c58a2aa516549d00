use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Membership entry type as reported by the Directory API.
///
/// Unrecognised tags are kept verbatim in `Other` and treated as terminal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MemberType {
    #[default]
    User,
    Group,
    Customer,
    External,
    Other(String),
}

impl MemberType {
    pub fn as_str(&self) -> &str {
        match self {
            MemberType::User => "USER",
            MemberType::Group => "GROUP",
            MemberType::Customer => "CUSTOMER",
            MemberType::External => "EXTERNAL",
            MemberType::Other(tag) => tag,
        }
    }
}

impl From<String> for MemberType {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "USER" => MemberType::User,
            "GROUP" => MemberType::Group,
            "CUSTOMER" => MemberType::Customer,
            "EXTERNAL" => MemberType::External,
            _ => MemberType::Other(tag),
        }
    }
}

impl From<MemberType> for String {
    fn from(kind: MemberType) -> Self {
        kind.as_str().to_string()
    }
}

/// A single group member from `members.list`.
///
/// Fields the client does not model (`kind`, `etag`, `delivery_settings`, ...)
/// are kept in `metadata` and serialized back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    #[serde(default)]
    pub email: String,
    #[serde(rename = "type", default)]
    pub member_type: MemberType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

impl Member {
    /// Build a terminal user entry.
    pub fn user(email: impl Into<String>) -> Self {
        Self::with_type(email, MemberType::User)
    }

    /// Build a nested group entry.
    pub fn group(email: impl Into<String>) -> Self {
        Self::with_type(email, MemberType::Group)
    }

    pub fn with_type(email: impl Into<String>, member_type: MemberType) -> Self {
        Self {
            email: email.into(),
            member_type,
            id: None,
            role: None,
            status: None,
            metadata: Map::new(),
        }
    }

    pub fn is_group(&self) -> bool {
        self.member_type == MemberType::Group
    }
}

/// One page of `members.list`.
#[derive(Debug, Clone, Deserialize)]
pub struct MembersPage {
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(rename = "nextPageToken")]
    pub next_page_token: Option<String>,
}
