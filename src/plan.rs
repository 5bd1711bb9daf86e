use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// ## Structure
/// This module contains the data structures for the plan file.
///
/// ```text
/// Plan
///   ├── meta: Option<PlanMeta>
///   ├── import: ImportConfig
///   │   └── profiles: Vec<ImportProfile>
///   │       └── filename: String
///   └── export: ExportProfile
///       └── profiles: Vec<ExportProfileItem>
///           ├── filename: String
///           └── exporter: ExportFileType
///               ├── JSON
///               ├── CSVRows
///               ├── Text
///               └── Custom(CustomExportProfile)
/// ```
///

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Plan {
    pub meta: Option<PlanMeta>,
    pub import: ImportConfig,
    pub export: ExportProfile,
}

impl Default for Plan {
    fn default() -> Self {
        Plan {
            meta: Some(PlanMeta {
                name: Some("transcript feedback report".to_string()),
            }),
            import: ImportConfig {
                profiles: vec![ImportProfile {
                    filename: "conversationtranscripts.csv".to_string(),
                }],
            },
            export: ExportProfile {
                profiles: vec![
                    ExportProfileItem {
                        filename: "report.json".to_string(),
                        exporter: ExportFileType::JSON,
                    },
                    ExportProfileItem {
                        filename: "rows.csv".to_string(),
                        exporter: ExportFileType::CSVRows,
                    },
                ],
            },
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct PlanMeta {
    pub name: Option<String>,
}

//
// Import configuration
//

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct ImportConfig {
    pub profiles: Vec<ImportProfile>,
}

/// Transcript CSVs are concatenated in profile order; row indices are global
/// across the resulting dataset.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ImportProfile {
    pub filename: String,
}

//
// Export configuration
//

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct ExportProfile {
    pub profiles: Vec<ExportProfileItem>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ExportProfileItem {
    pub filename: String,
    pub exporter: ExportFileType,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct CustomExportProfile {
    pub template: String,
    pub partials: Option<HashMap<String, String>>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub enum ExportFileType {
    /// Full snapshot report: rows, classifications, feedback map, totals.
    JSON,
    /// Per-row classification column, one line per transcript row.
    CSVRows,
    /// Readable transcript rendering of every row.
    Text,
    /// User-supplied handlebars template.
    Custom(CustomExportProfile),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialization() {
        let config = ImportConfig {
            profiles: vec![ImportProfile {
                filename: "transcripts.csv".to_string(),
            }],
        };

        let yaml_str = serde_yaml::to_string(&config).unwrap();
        println!("{}", yaml_str);
        assert!(yaml_str.contains("profiles"));
        assert!(yaml_str.contains("transcripts.csv"));
    }

    #[test]
    fn test_deserialization() {
        let yaml_str = r#"
meta:
  name: weekly review
import:
  profiles:
    - filename: transcripts.csv
export:
  profiles:
    - filename: report.json
      exporter: JSON
    - filename: rows.csv
      exporter: CSVRows
    - filename: chats.txt
      exporter: Text
"#;
        let plan: Plan = serde_yaml::from_str(yaml_str).unwrap();
        assert_eq!(plan.import.profiles.len(), 1);
        assert_eq!(plan.export.profiles.len(), 3);
        assert!(matches!(plan.export.profiles[0].exporter, ExportFileType::JSON));
        assert!(matches!(plan.export.profiles[2].exporter, ExportFileType::Text));
    }

    #[test]
    fn test_default_plan_round_trips() {
        let plan = Plan::default();
        let yaml_str = serde_yaml::to_string(&plan).unwrap();
        let parsed: Plan = serde_yaml::from_str(&yaml_str).unwrap();
        assert_eq!(parsed.import.profiles[0].filename, "conversationtranscripts.csv");
        assert_eq!(parsed.export.profiles.len(), 2);
    }
}
