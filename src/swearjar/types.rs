use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum_macros::{Display, EnumIter, EnumString};

use crate::shared::AppError;
use crate::validation::{join_path, FromBody, Validator};

/// Window a jar's swear counts are bucketed by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, Display, EnumIter, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TrendPeriod {
    Days,
    Weeks,
    Months,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct User {
    pub user_id: String,
    pub email: String,
    pub name: String,
}

impl User {
    fn parse(v: &mut Validator, value: &Value, path: &str) -> Option<Self> {
        let object = v.object(value, path)?;

        let user_id = v.required_str(object, path, "UserId", "UserId is required");
        if let Some(user_id) = &user_id {
            v.non_empty(&join_path(path, "UserId"), user_id, "UserId is required");
        }
        let email = v.required_str(object, path, "Email", "Invalid email format");
        if let Some(email) = &email {
            v.email(&join_path(path, "Email"), email, "Invalid email format");
        }
        let name = v.required_str(object, path, "Name", "Name is required");
        if let Some(name) = &name {
            v.non_empty(&join_path(path, "Name"), name, "Name is required");
        }

        Some(Self {
            user_id: user_id?,
            email: email?,
            name: name?,
        })
    }

    fn parse_optional(v: &mut Validator, object: &Value, key: &str) -> Option<Self> {
        match object.get(key) {
            None | Some(Value::Null) => None,
            Some(value) => Self::parse(v, value, key),
        }
    }

    fn parse_list(v: &mut Validator, object: &Value, key: &str) -> Option<Vec<Self>> {
        let items = v.array(object, "", key)?;
        let users: Vec<Option<Self>> = items
            .iter()
            .enumerate()
            .map(|(index, item)| Self::parse(v, item, &join_path(key, &index.to_string())))
            .collect();
        users.into_iter().collect()
    }
}

fn jar_name(v: &mut Validator, body: &Value) -> Option<String> {
    let name = v.required_str(body, "", "Name", "Title is required")?;
    v.non_empty("Name", &name, "Title is required");
    Some(name)
}

/// Keeps the first occurrence of each id
fn unique_ids<I>(ids: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut unique: Vec<String> = Vec::new();
    for id in ids {
        if !unique.contains(&id) {
            unique.push(id);
        }
    }
    unique
}

/// Jar creation form as submitted by the browser; `owners` excludes the submitter
#[derive(Debug, Clone, PartialEq)]
pub struct CreateJarRequest {
    pub swear_jar_id: Option<String>,
    pub name: String,
    pub desc: Option<String>,
    pub owners: Vec<User>,
    pub created_by: Option<User>,
    pub last_updated_by: Option<User>,
}

impl FromBody for CreateJarRequest {
    fn from_body(body: &Value) -> Result<Self, AppError> {
        let mut v = Validator::new();
        let swear_jar_id = v.optional_str(body, "", "SwearJarId");
        let name = jar_name(&mut v, body);
        let desc = v.optional_str(body, "", "Desc");
        let owners = User::parse_list(&mut v, body, "Owners");
        let created_by = User::parse_optional(&mut v, body, "CreatedBy");
        let last_updated_by = User::parse_optional(&mut v, body, "LastUpdatedBy");
        v.finish()?;

        Ok(Self {
            swear_jar_id,
            name: name.unwrap_or_default(),
            desc,
            owners: owners.unwrap_or_default(),
            created_by,
            last_updated_by,
        })
    }
}

impl CreateJarRequest {
    /// Body for the backend: the submitter is always appended as an owner
    pub fn into_body(self, caller_id: &str) -> JarBody {
        let owners = unique_ids(
            self.owners
                .into_iter()
                .map(|user| user.user_id)
                .chain(std::iter::once(caller_id.to_string())),
        );

        JarBody {
            swear_jar_id: None,
            name: self.name,
            desc: self.desc.filter(|desc| !desc.is_empty()),
            owners,
        }
    }
}

/// Jar edit form; the owner list is complete and must still contain the submitter
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateJarRequest {
    pub swear_jar_id: String,
    pub name: String,
    pub desc: Option<String>,
    pub owners: Vec<User>,
}

impl UpdateJarRequest {
    pub fn parse(body: &Value, caller_id: &str) -> Result<Self, AppError> {
        let mut v = Validator::new();
        let swear_jar_id = v.required_str(body, "", "SwearJarId", "SwearJarId is required");
        if let Some(id) = &swear_jar_id {
            v.non_empty("SwearJarId", id, "SwearJarId is required");
        }
        let name = jar_name(&mut v, body);
        let desc = v.optional_str(body, "", "Desc");
        let owners = User::parse_list(&mut v, body, "Owners");
        if let Some(owners) = &owners {
            v.check("Owners", !owners.is_empty(), "At least one owner is required");
            v.check(
                "Owners",
                owners.iter().any(|owner| owner.user_id == caller_id),
                "User making the request cannot be removed as an owner",
            );
        }
        v.finish()?;

        Ok(Self {
            swear_jar_id: swear_jar_id.unwrap_or_default(),
            name: name.unwrap_or_default(),
            desc,
            owners: owners.unwrap_or_default(),
        })
    }

    pub fn into_body(self) -> JarBody {
        JarBody {
            swear_jar_id: Some(self.swear_jar_id),
            name: self.name,
            desc: self.desc.filter(|desc| !desc.is_empty()),
            owners: unique_ids(self.owners.into_iter().map(|user| user.user_id)),
        }
    }
}

/// Jar as the backend accepts it on create and update
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct JarBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub swear_jar_id: Option<String>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    pub owners: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AddSwearRequest {
    pub swear_jar_id: String,
}

impl FromBody for AddSwearRequest {
    fn from_body(body: &Value) -> Result<Self, AppError> {
        let mut v = Validator::new();
        let id = v.required_str(body, "", "swearJarId", "swearJarId is required");
        if let Some(id) = &id {
            v.non_empty("swearJarId", id, "swearJarId is required");
        }
        v.finish()?;

        Ok(Self {
            swear_jar_id: id.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SwearBody {
    pub swear_jar_id: String,
    pub swear_description: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatsQuery {
    pub id: String,
}

impl FromBody for StatsQuery {
    fn from_body(body: &Value) -> Result<Self, AppError> {
        let mut v = Validator::new();
        let id = v.required_str(body, "", "id", "Required");
        v.finish()?;

        Ok(Self {
            id: id.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrendQuery {
    pub id: String,
    pub period: TrendPeriod,
}

impl FromBody for TrendQuery {
    fn from_body(body: &Value) -> Result<Self, AppError> {
        let mut v = Validator::new();
        let id = v.required_str(body, "", "id", "Required");
        let period = v.one_of::<TrendPeriod>(body, "", "period");
        v.finish()?;

        match (id, period) {
            (Some(id), Some(period)) => Ok(Self { id, period }),
            _ => Err(AppError::Internal),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct JarQuery {
    pub id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SearchQuery {
    pub query: Option<String>,
}
