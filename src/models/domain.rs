use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Entity giving a rating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RespondentClass {
    Realtor,
    Seller,
}

/// Bridge table linking one respondent class to its surveys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BridgeTable {
    pub table: &'static str,
    pub respondent_column: &'static str,
    pub respondent_table: &'static str,
}

const REALTOR_BRIDGE: BridgeTable = BridgeTable {
    table: "realtor_surveys",
    respondent_column: "realtor_id",
    respondent_table: "realtors",
};

const SELLER_BRIDGE: BridgeTable = BridgeTable {
    table: "seller_surveys",
    respondent_column: "seller_id",
    respondent_table: "sellers",
};

impl RespondentClass {
    pub const ALL: [RespondentClass; 2] = [RespondentClass::Realtor, RespondentClass::Seller];

    pub fn as_str(self) -> &'static str {
        match self {
            RespondentClass::Realtor => "realtor",
            RespondentClass::Seller => "seller",
        }
    }

    /// Static bridge description for this class.
    ///
    /// Table and column names only ever come from this lookup, never from
    /// request input.
    pub fn bridge(self) -> &'static BridgeTable {
        match self {
            RespondentClass::Realtor => &REALTOR_BRIDGE,
            RespondentClass::Seller => &SELLER_BRIDGE,
        }
    }
}

impl fmt::Display for RespondentClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RespondentClass {
    type Err = UnknownClass;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "realtor" => Ok(RespondentClass::Realtor),
            "seller" => Ok(RespondentClass::Seller),
            _ => Err(UnknownClass(s.to_string())),
        }
    }
}

/// Entity being rated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectClass {
    Realtor,
    Deal,
    Property,
}

impl ObjectClass {
    pub const ALL: [ObjectClass; 3] = [ObjectClass::Realtor, ObjectClass::Deal, ObjectClass::Property];

    pub fn as_str(self) -> &'static str {
        match self {
            ObjectClass::Realtor => "realtor",
            ObjectClass::Deal => "deal",
            ObjectClass::Property => "property",
        }
    }

    /// Table holding rows of this class
    pub fn table(self) -> &'static str {
        match self {
            ObjectClass::Realtor => "realtors",
            ObjectClass::Deal => "deals",
            ObjectClass::Property => "properties",
        }
    }
}

impl fmt::Display for ObjectClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObjectClass {
    type Err = UnknownClass;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "realtor" => Ok(ObjectClass::Realtor),
            "deal" => Ok(ObjectClass::Deal),
            "property" => Ok(ObjectClass::Property),
            _ => Err(UnknownClass(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown class: {0}")]
pub struct UnknownClass(pub String);

/// Stored survey response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Survey {
    pub id: i64,
    pub touchpoint: String,
    pub respondent_id: i64,
    pub object_id: i64,
    pub respondent_class: RespondentClass,
    pub object_class: ObjectClass,
    pub score: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The respondent/object pair a survey belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurveyIdentity {
    pub respondent_id: i64,
    pub object_id: i64,
    pub respondent_class: RespondentClass,
    pub object_class: ObjectClass,
}

impl SurveyIdentity {
    pub fn matches(&self, survey: &Survey) -> bool {
        survey.respondent_id == self.respondent_id
            && survey.object_id == self.object_id
            && survey.respondent_class == self.respondent_class
            && survey.object_class == self.object_class
    }
}

/// Survey about to be inserted
#[derive(Debug, Clone, PartialEq)]
pub struct NewSurvey {
    pub touchpoint: String,
    pub identity: SurveyIdentity,
    pub score: i32,
}

/// Filter for the touchpoint lookup.
///
/// An empty class list matches nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct TouchpointFilter {
    pub touchpoint: String,
    pub respondent_classes: Vec<RespondentClass>,
    pub object_classes: Vec<ObjectClass>,
}

impl TouchpointFilter {
    pub fn matches(&self, survey: &Survey) -> bool {
        survey.touchpoint == self.touchpoint
            && self.respondent_classes.contains(&survey.respondent_class)
            && self.object_classes.contains(&survey.object_class)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_respondent_class_is_case_insensitive() {
        assert_eq!("SELLER".parse::<RespondentClass>(), Ok(RespondentClass::Seller));
        assert_eq!("Realtor".parse::<RespondentClass>(), Ok(RespondentClass::Realtor));
        assert!("deal".parse::<RespondentClass>().is_err());
    }

    #[test]
    fn test_bridge_lookup() {
        let bridge = RespondentClass::Seller.bridge();
        assert_eq!(bridge.table, "seller_surveys");
        assert_eq!(bridge.respondent_column, "seller_id");
        assert_eq!(RespondentClass::Realtor.bridge().respondent_table, "realtors");
    }

    #[test]
    fn test_object_tables() {
        assert_eq!("Property".parse::<ObjectClass>().map(ObjectClass::table), Ok("properties"));
        assert_eq!(ObjectClass::Deal.to_string(), "deal");
        assert!("seller".parse::<ObjectClass>().is_err());
    }
}
