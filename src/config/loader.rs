// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fs;
use std::path::Path;

use crate::config::definition::DefinitionDocument;
use crate::errors::DefinitionError;
use crate::observability::messages::interpreter::DefinitionLoaded;

/// Serialization format of a definition document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefinitionFormat {
    Yaml,
    Json,
    Toml,
}

impl DefinitionFormat {
    /// Pick the format from a file extension (`.yaml`, `.yml`, `.json`, `.toml`).
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "yaml" | "yml" => Some(DefinitionFormat::Yaml),
            "json" => Some(DefinitionFormat::Json),
            "toml" => Some(DefinitionFormat::Toml),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DefinitionFormat::Yaml => "yaml",
            DefinitionFormat::Json => "json",
            DefinitionFormat::Toml => "toml",
        }
    }
}

/// Parse definition text in the given format.
pub fn parse_definition(
    content: &str,
    format: DefinitionFormat,
) -> Result<DefinitionDocument, DefinitionError> {
    let document = match format {
        DefinitionFormat::Yaml => serde_yaml::from_str(content)?,
        DefinitionFormat::Json => serde_json::from_str(content)?,
        DefinitionFormat::Toml => toml::from_str(content)?,
    };
    Ok(document)
}

/// Load a definition file, choosing the parser from its extension.
pub fn load_definition<P: AsRef<Path>>(path: P) -> Result<DefinitionDocument, DefinitionError> {
    let path = path.as_ref();
    let format = DefinitionFormat::from_path(path).ok_or_else(|| DefinitionError::UnsupportedFormat {
        path: path.to_path_buf(),
    })?;

    let content = fs::read_to_string(path).map_err(|source| DefinitionError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let document = parse_definition(&content, format)?;

    tracing::debug!(
        "{}",
        DefinitionLoaded {
            path,
            format: format.name(),
        }
    );
    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp(suffix: &str, content: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_format_from_extension() {
        struct TestCase {
            name: &'static str,
            path: &'static str,
            expected: Option<DefinitionFormat>,
        }

        let test_cases = vec![
            TestCase { name: "yaml", path: "p.yaml", expected: Some(DefinitionFormat::Yaml) },
            TestCase { name: "yml", path: "dir/p.yml", expected: Some(DefinitionFormat::Yaml) },
            TestCase { name: "upper json", path: "P.JSON", expected: Some(DefinitionFormat::Json) },
            TestCase { name: "toml", path: "p.toml", expected: Some(DefinitionFormat::Toml) },
            TestCase { name: "python", path: "p.py", expected: None },
            TestCase { name: "no extension", path: "pipeline", expected: None },
        ];

        for case in test_cases {
            assert_eq!(DefinitionFormat::from_path(Path::new(case.path)), case.expected, "{}", case.name);
        }
    }

    #[test]
    fn test_load_yaml_file() {
        let file = write_temp(
            ".yaml",
            r#"
pipeline:
  name: FromFile
  channels:
    - { name: x, type: int }
  nodes: []
"#,
        );

        let document = load_definition(file.path()).unwrap();
        let pipeline = document.pipeline.unwrap();

        assert_eq!(pipeline.name.as_deref(), Some("FromFile"));
        assert_eq!(pipeline.channels.unwrap()[0].value_type.as_deref(), Some("int"));
    }

    #[test]
    fn test_load_toml_file() {
        let file = write_temp(
            ".toml",
            r#"
[pipeline]
name = "Toml"
nodes = []

[[pipeline.channels]]
name = "x"
type = "float"

[pipeline.initial_data]
x = 1.5
"#,
        );

        let document = load_definition(file.path()).unwrap();
        let pipeline = document.pipeline.unwrap();

        assert_eq!(pipeline.name.as_deref(), Some("Toml"));
        assert!(pipeline.initial_data.unwrap().contains_key("x"));
    }

    #[test]
    fn test_unsupported_extension_is_rejected_before_reading() {
        let err = load_definition("does/not/exist.ini").unwrap_err();
        assert!(matches!(err, DefinitionError::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = load_definition("does/not/exist.yaml").unwrap_err();
        match err {
            DefinitionError::Io { path, .. } => assert!(path.ends_with("exist.yaml")),
            other => panic!("expected io error, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_json_is_a_parse_error() {
        let err = parse_definition("{ \"pipeline\": ", DefinitionFormat::Json).unwrap_err();
        assert!(matches!(err, DefinitionError::Json(_)));
    }
}
