//! Insight categories.
//!
//! Categories mirror the wellness domains, except that haircare insights are
//! filed under `"hair care"`.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InsightCategory {
    #[serde(rename = "skincare")]
    Skincare,
    #[serde(rename = "hair care")]
    HairCare,
    #[serde(rename = "fashion")]
    Fashion,
    #[serde(rename = "workout")]
    Workout,
    #[serde(rename = "quit porn")]
    QuitPorn,
    #[serde(rename = "diet")]
    Diet,
    #[serde(rename = "height")]
    Height,
    #[serde(rename = "facial")]
    Facial,
}

impl InsightCategory {
    pub const ALL: [InsightCategory; 8] = [
        Self::Skincare,
        Self::HairCare,
        Self::Fashion,
        Self::Workout,
        Self::QuitPorn,
        Self::Diet,
        Self::Height,
        Self::Facial,
    ];

    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| CoreError::Validation(format!("Invalid insight category '{s}'")))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Skincare => "skincare",
            Self::HairCare => "hair care",
            Self::Fashion => "fashion",
            Self::Workout => "workout",
            Self::QuitPorn => "quit porn",
            Self::Diet => "diet",
            Self::Height => "height",
            Self::Facial => "facial",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_with_spaces() {
        let c: InsightCategory = serde_json::from_str("\"hair care\"").unwrap();
        assert_eq!(c, InsightCategory::HairCare);
        assert_eq!(serde_json::to_string(&InsightCategory::QuitPorn).unwrap(), "\"quit porn\"");
        assert!(serde_json::from_str::<InsightCategory>("\"haircare\"").is_err());
    }

    #[test]
    fn db_roundtrip() {
        for c in InsightCategory::ALL {
            assert_eq!(InsightCategory::from_str_db(c.as_str()).unwrap(), c);
        }
    }
}
