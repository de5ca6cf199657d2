use serde::{Deserialize, Serialize};

use crate::generate::RewrittenFile;
use crate::target::RewriteTarget;

/// A file the analysis pass found declarations in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileJson {
    pub path: String,
    /// Offset just past the package name
    pub package_end: usize,
}

/// One declaration to rewrite
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetJson {
    /// Path of the file, matching an entry in `files`
    pub file: String,
    pub start: usize,
    pub end: usize,
    pub keys: Vec<String>,
}

impl From<TargetJson> for RewriteTarget {
    fn from(target: TargetJson) -> Self {
        RewriteTarget::new(target.file, target.start, target.end, target.keys)
    }
}

/// Input handed over by the analysis pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewriteRequest {
    /// Identifier echoed in the response; `"auto"` generates one
    #[serde(default = "auto_execution_id")]
    pub execution_id: String,
    #[serde(default)]
    pub import_path: Option<String>,
    #[serde(default)]
    pub alias: Option<String>,
    pub files: Vec<FileJson>,
    pub targets: Vec<TargetJson>,
}

fn auto_execution_id() -> String {
    "auto".to_string()
}

/// Report for one rewritten file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileReportJson {
    pub path: String,
    pub original_checksum: String,
    pub checksum: String,
    pub replacements: usize,
    /// Where the rewritten text was written, if it was
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<String>,
}

impl FileReportJson {
    pub fn new(file: &RewrittenFile, output_path: Option<String>) -> Self {
        Self {
            path: file.path.clone(),
            original_checksum: file.original_checksum.clone(),
            checksum: file.checksum.clone(),
            replacements: file.replacements,
            output_path,
        }
    }
}

/// Outcome of a generation pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewriteResponse {
    pub execution_id: String,
    pub success: bool,
    pub files: Vec<FileReportJson>,
    /// Total number of declarations rewritten
    pub rewritten_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RewriteResponse {
    pub fn success(execution_id: String, files: Vec<FileReportJson>) -> Self {
        let rewritten_count = files.iter().map(|f| f.replacements).sum();
        Self {
            execution_id,
            success: true,
            files,
            rewritten_count,
            error: None,
        }
    }

    pub fn failure(execution_id: String, error: impl Into<String>) -> Self {
        Self {
            execution_id,
            success: false,
            files: Vec::new(),
            rewritten_count: 0,
            error: Some(error.into()),
        }
    }
}

/// Generate a fresh execution id (UUID v4)
pub fn generate_execution_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Resolve `"auto"` to a generated id, keep anything else
pub fn resolve_execution_id(requested: &str) -> String {
    if requested == "auto" {
        generate_execution_id()
    } else {
        requested.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_defaults() {
        let request: RewriteRequest = serde_json::from_str(
            r#"{
                "files": [{ "path": "a.go", "package_end": 9 }],
                "targets": [{ "file": "a.go", "start": 16, "end": 24, "keys": ["K", "L"] }]
            }"#,
        )
        .unwrap();

        assert_eq!(request.execution_id, "auto");
        assert_eq!(request.import_path, None);
        assert_eq!(request.alias, None);

        let target: RewriteTarget = request.targets[0].clone().into();
        assert_eq!(target, RewriteTarget::new("a.go", 16, 24, ["K", "L"]));
    }

    #[test]
    fn test_execution_id() {
        let generated = resolve_execution_id("auto");
        assert!(uuid::Uuid::parse_str(&generated).is_ok());
        assert_ne!(generated, resolve_execution_id("auto"));
        assert_eq!(resolve_execution_id("run-7"), "run-7");
    }

    #[test]
    fn test_response_serialization() {
        let file = RewrittenFile {
            path: "a.go".to_string(),
            content: b"package a\n".to_vec(),
            original_checksum: "old".to_string(),
            checksum: "new".to_string(),
            replacements: 2,
        };
        let response = RewriteResponse::success(
            "run-1".to_string(),
            vec![FileReportJson::new(&file, None)],
        );
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["success"], true);
        assert_eq!(json["rewritten_count"], 2);
        assert_eq!(json["files"][0]["checksum"], "new");
        assert!(json.get("error").is_none());
        assert!(json["files"][0].get("output_path").is_none());

        let failed = serde_json::to_value(RewriteResponse::failure("run-2".to_string(), "boom")).unwrap();
        assert_eq!(failed["success"], false);
        assert_eq!(failed["error"], "boom");
    }
}
