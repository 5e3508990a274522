//! Record families exposed by the feedback contract

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;

/// Which paged view of the feedback list to read
///
/// Parses from `all`, `company:<id>`, `user:<id>` and `parent:<id>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum RecordFamily {
    /// Every feedback, newest first
    #[default]
    All,
    /// Active feedback left for one company
    ByCompany(u64),
    /// Active feedback written by one user
    ByUser(u64),
    /// Active replies to one feedback
    ByParent(u64),
}

impl RecordFamily {
    /// Contract view method serving this family
    pub fn method_name(&self) -> &'static str {
        match self {
            Self::All => "get_feedbacks",
            Self::ByCompany(_) => "get_feedbacks_by_company_id_paging",
            Self::ByUser(_) => "get_feedbacks_by_user_id_paging",
            Self::ByParent(_) => "get_feedbacks_by_parent_id_paging",
        }
    }

    /// View arguments for a zero-based page index
    pub fn args(&self, page_index: u64, size: u32) -> Value {
        match self {
            Self::All => json!({ "page": page_index, "size": size }),
            Self::ByCompany(id) => json!({ "company_id": id, "page": page_index, "size": size }),
            Self::ByUser(id) => json!({ "user_id": id, "page": page_index, "size": size }),
            Self::ByParent(id) => json!({ "parent_id": id, "page": page_index, "size": size }),
        }
    }
}

impl fmt::Display for RecordFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::ByCompany(id) => write!(f, "company:{id}"),
            Self::ByUser(id) => write!(f, "user:{id}"),
            Self::ByParent(id) => write!(f, "parent:{id}"),
        }
    }
}

impl FromStr for RecordFamily {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }

        let (kind, id) = s.split_once(':').ok_or_else(|| {
            Error::invalid_value(
                "family",
                format!("'{s}' is not one of all, company:<id>, user:<id>, parent:<id>"),
            )
        })?;
        let id: u64 = id
            .trim()
            .parse()
            .map_err(|e| Error::invalid_value("family", format!("bad id in '{s}': {e}")))?;

        match kind.trim().to_ascii_lowercase().as_str() {
            "company" => Ok(Self::ByCompany(id)),
            "user" => Ok(Self::ByUser(id)),
            "parent" => Ok(Self::ByParent(id)),
            other => Err(Error::invalid_value(
                "family",
                format!("unknown family '{other}'"),
            )),
        }
    }
}

impl TryFrom<String> for RecordFamily {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<RecordFamily> for String {
    fn from(family: RecordFamily) -> Self {
        family.to_string()
    }
}
