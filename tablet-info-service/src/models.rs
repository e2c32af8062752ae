use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Who the summary is written for; selects the prompt template.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserType {
    #[default]
    #[serde(rename = "Normal User")]
    NormalUser,
    #[serde(rename = "Medical Specialist")]
    MedicalSpecialist,
}

impl UserType {
    pub fn label(&self) -> &'static str {
        match self {
            Self::NormalUser => "Normal User",
            Self::MedicalSpecialist => "Medical Specialist",
        }
    }
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for UserType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "normal user" | "normal" => Ok(Self::NormalUser),
            "medical specialist" | "specialist" => Ok(Self::MedicalSpecialist),
            other => Err(format!("Unknown user type: {}", other)),
        }
    }
}

/// An uploaded tablet photo, ready to be sent inline to the model.
#[derive(Debug, Clone)]
pub struct TabletImage {
    pub mime_type: String,
    pub data: Vec<u8>,
}

/// Working record passed between the analysis tasks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TabletAnalysis {
    pub note: String,
    pub user_type: UserType,
    pub tablet_name: Option<String>,
    pub summary: Option<String>,
    pub who_info: Option<String>,
    pub rxnorm_info: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub session_id: String,
    pub tablet_name: String,
    pub user_type: UserType,
    pub summary: String,
    pub who_info: String,
    pub rxnorm_info: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    pub session_id: String,
    pub summary: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_type_parsing() {
        assert_eq!("Normal User".parse::<UserType>(), Ok(UserType::NormalUser));
        assert_eq!("".parse::<UserType>(), Ok(UserType::NormalUser));
        assert_eq!(
            " medical specialist ".parse::<UserType>(),
            Ok(UserType::MedicalSpecialist)
        );
        assert_eq!("Specialist".parse::<UserType>(), Ok(UserType::MedicalSpecialist));
        assert!("pharmacist".parse::<UserType>().is_err());
    }

    #[test]
    fn test_user_type_serializes_as_label() {
        let json = serde_json::to_string(&UserType::MedicalSpecialist).unwrap();
        assert_eq!(json, "\"Medical Specialist\"");
    }
}
