//! Model file resolution
//!
//! Files are looked up in `<model_dir>/<dir_name>/` first. Anything missing is
//! fetched from the Hugging Face hub (cached by `hf-hub`) unless the models
//! config is offline.

use hf_hub::api::sync::{ApiBuilder, ApiRepo};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::{AnalysisError, ModelSpec, ModelsConfig, Result};

/// Local paths of one model's files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedModel {
    pub model: PathBuf,
    pub tokenizer: Option<PathBuf>,
    pub config: Option<PathBuf>,
}

impl ResolvedModel {
    pub fn tokenizer_path(&self) -> Result<&Path> {
        self.tokenizer
            .as_deref()
            .ok_or_else(|| AnalysisError::ModelNotFound("tokenizer.json".to_string()))
    }

    pub fn config_path(&self) -> Result<&Path> {
        self.config
            .as_deref()
            .ok_or_else(|| AnalysisError::ModelNotFound("config.json".to_string()))
    }
}

/// Resolve every file named by `spec`
pub fn resolve_model(models: &ModelsConfig, spec: &ModelSpec) -> Result<ResolvedModel> {
    let local_dir = models.model_dir.join(&spec.dir_name);
    let mut resolver = FileResolver {
        local_dir: &local_dir,
        spec,
        offline: models.offline,
        repo: None,
    };

    let model = resolver.resolve(&spec.model_file)?;
    let tokenizer = spec
        .tokenizer_file
        .as_deref()
        .map(|file| resolver.resolve(file))
        .transpose()?;
    let config = spec
        .config_file
        .as_deref()
        .map(|file| resolver.resolve(file))
        .transpose()?;

    Ok(ResolvedModel {
        model,
        tokenizer,
        config,
    })
}

struct FileResolver<'a> {
    local_dir: &'a Path,
    spec: &'a ModelSpec,
    offline: bool,
    repo: Option<ApiRepo>,
}

impl FileResolver<'_> {
    fn resolve(&mut self, file: &str) -> Result<PathBuf> {
        let local = self.local_dir.join(file);
        if local.exists() {
            debug!("Using local model file {}", local.display());
            return Ok(local);
        }

        let repo_id = match (&self.spec.repo, self.offline) {
            (Some(repo_id), false) => repo_id.clone(),
            _ => return Err(AnalysisError::ModelNotFound(local.display().to_string())),
        };

        if self.repo.is_none() {
            let api = ApiBuilder::new()
                .with_progress(false)
                .build()
                .map_err(|e| AnalysisError::Network(format!("Failed to create hub API: {e}")))?;
            self.repo = Some(api.model(repo_id.clone()));
        }
        let repo = self
            .repo
            .as_ref()
            .ok_or_else(|| AnalysisError::Other("hub repository not initialized".to_string()))?;

        info!("Fetching {} from {}", file, repo_id);
        repo.get(file)
            .map_err(|e| AnalysisError::Network(format!("Failed to download {repo_id}/{file}: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> ModelSpec {
        ModelSpec {
            repo: Some("example/never-fetched".to_string()),
            dir_name: "stub".to_string(),
            model_file: "model.onnx".to_string(),
            tokenizer_file: Some("tokenizer.json".to_string()),
            config_file: None,
        }
    }

    #[test]
    fn test_resolves_local_files() {
        let dir = tempfile::tempdir().unwrap();
        let model_dir = dir.path().join("stub");
        std::fs::create_dir_all(&model_dir).unwrap();
        std::fs::write(model_dir.join("model.onnx"), b"onnx").unwrap();
        std::fs::write(model_dir.join("tokenizer.json"), b"{}").unwrap();

        let models = ModelsConfig {
            model_dir: dir.path().to_path_buf(),
            offline: true,
            ..Default::default()
        };
        let resolved = resolve_model(&models, &spec()).unwrap();
        assert_eq!(resolved.model, model_dir.join("model.onnx"));
        assert_eq!(resolved.tokenizer, Some(model_dir.join("tokenizer.json")));
        assert!(resolved.config.is_none());
        assert!(resolved.config_path().is_err());
    }

    #[test]
    fn test_offline_missing_file_is_model_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let models = ModelsConfig {
            model_dir: dir.path().to_path_buf(),
            offline: true,
            ..Default::default()
        };
        let err = resolve_model(&models, &spec()).unwrap_err();
        assert!(matches!(err, AnalysisError::ModelNotFound(_)));
    }
}
