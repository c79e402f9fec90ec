use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Classes a member can pick from the button row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerClass {
    Berserker,
    Warlord,
    Archer,
    Skald,
}

impl PlayerClass {
    pub const ALL: [PlayerClass; 4] = [
        PlayerClass::Berserker,
        PlayerClass::Warlord,
        PlayerClass::Archer,
        PlayerClass::Skald,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            PlayerClass::Berserker => "Berserker",
            PlayerClass::Warlord => "Warlord",
            PlayerClass::Archer => "Archer",
            PlayerClass::Skald => "Skald",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            PlayerClass::Berserker => "🪓",
            PlayerClass::Warlord => "🛡️",
            PlayerClass::Archer => "🏹",
            PlayerClass::Skald => "🎵",
        }
    }
}

impl fmt::Display for PlayerClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown class: {0}")]
pub struct UnknownClass(pub String);

impl FromStr for PlayerClass {
    type Err = UnknownClass;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PlayerClass::ALL
            .into_iter()
            .find(|class| class.label() == s)
            .ok_or_else(|| UnknownClass(s.to_string()))
    }
}

/// One row of the registration table, keyed elsewhere by the normalized IGN.
///
/// The class is kept as a plain string so that a record written with a
/// class we no longer offer still loads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRecord {
    pub ign: String,
    pub user_id: String,
    pub class_name: String,
    pub updated_at: DateTime<Utc>,
}

/// The whole persisted document: normalized IGN -> record.
pub type RegistrationTable = BTreeMap<String, RegistrationRecord>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_labels_parse_back() {
        for class in PlayerClass::ALL {
            assert_eq!(class.label().parse::<PlayerClass>(), Ok(class));
        }
        assert!("Mage".parse::<PlayerClass>().is_err());
        assert!("berserker".parse::<PlayerClass>().is_err());
    }

    #[test]
    fn record_uses_camel_case_fields() {
        let record = RegistrationRecord {
            ign: "xMads".into(),
            user_id: "user1".into(),
            class_name: "Berserker".into(),
            updated_at: "2024-05-01T12:00:00Z".parse().unwrap(),
        };

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["ign"], "xMads");
        assert_eq!(value["userId"], "user1");
        assert_eq!(value["className"], "Berserker");
        assert_eq!(value["updatedAt"], "2024-05-01T12:00:00Z");
    }

    #[test]
    fn record_reads_millisecond_timestamps() {
        let raw = r#"{"ign":"Fize","userId":"42","className":"Skald","updatedAt":"2024-05-01T12:00:00.123Z"}"#;
        let record: RegistrationRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(record.ign, "Fize");
        assert_eq!(record.updated_at.timestamp_subsec_millis(), 123);
    }
}
