//! LR-004: Manifest parsing and validation.
//!
//! `labrun.yaml` is optional. When present it is parsed and validated:
//! - Version must be "1.0"
//! - `cores` must be at least 1
//! - Environment and image names must be plain identifiers
//! - Path overrides must be relative to the project root

use super::error::{DispatchError, DispatchResult};
use super::types::Manifest;
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

/// Validation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

fn name_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_.-]*$").expect("static regex"))
}

/// Load the manifest at `path`, falling back to defaults when it is absent.
pub fn load_manifest(path: &Path) -> DispatchResult<Manifest> {
    if !path.exists() {
        log::debug!("no manifest at {}, using conventions", path.display());
        return Ok(Manifest::default());
    }
    let content = std::fs::read_to_string(path).map_err(|e| DispatchError::io(path, e))?;
    let manifest = parse_manifest(&content).map_err(|source| DispatchError::Manifest {
        path: path.to_path_buf(),
        source,
    })?;
    let errors = validate_manifest(&manifest);
    if errors.is_empty() {
        return Ok(manifest);
    }
    for e in &errors {
        log::error!("{}: {}", path.display(), e);
    }
    Err(DispatchError::Invalid(
        errors.into_iter().map(|e| e.message).collect(),
    ))
}

/// Parse a manifest from a string.
pub fn parse_manifest(yaml: &str) -> Result<Manifest, serde_yaml_ng::Error> {
    // An empty document means "all defaults".
    if yaml.trim().is_empty() {
        return Ok(Manifest::default());
    }
    serde_yaml_ng::from_str(yaml)
}

/// Validate a parsed manifest. Returns a list of errors (empty = valid).
pub fn validate_manifest(manifest: &Manifest) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if manifest.version != "1.0" {
        errors.push(ValidationError {
            message: format!("version must be \"1.0\", got \"{}\"", manifest.version),
        });
    }

    if manifest.cores == 0 {
        errors.push(ValidationError {
            message: "cores must be at least 1".to_string(),
        });
    }

    for (field, value) in [
        ("env_name", &manifest.env_name),
        ("env_manager", &manifest.env_manager),
        ("image", &manifest.image),
    ] {
        if !name_pattern().is_match(value) {
            errors.push(ValidationError {
                message: format!("{} '{}' is not a valid name", field, value),
            });
        }
    }

    if manifest.container_command.is_empty() {
        errors.push(ValidationError {
            message: "container_command must not be empty".to_string(),
        });
    }

    for (field, path) in manifest.paths.iter() {
        if path.is_absolute() {
            errors.push(ValidationError {
                message: format!(
                    "paths.{} must be relative to the project root, got {}",
                    field,
                    path.display()
                ),
            });
        }
    }

    errors
}
