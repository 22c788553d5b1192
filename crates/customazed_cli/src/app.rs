//! Command context: resolved configuration, uploader selection and I/O.

use std::io::{IsTerminal, Read, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use customazed_config::{Environment, LoadedConfig, STDIN_PATH};
use customazed_storage::{
    ArtifactUploader, BlobContainer, BlobTransport, BlobUploader, DisabledUploader,
    HttpBlobTransport,
};
use customazed_template::{Rendering, TemplateSession};
use dialoguer::{theme::ColorfulTheme, Confirm};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::commands::GlobalArgs;

/// Input that could not be used as given.
#[derive(Debug, Error)]
#[error("Invalid input: {0}")]
pub struct InvalidInput(pub String);

/// State shared by the commands of one invocation.
pub struct App {
    pub loaded: LoadedConfig,
    no_login: bool,
    assume_yes: bool,
    quiet: bool,
    storage_token: Option<String>,
}

impl App {
    /// Load and resolve the configuration named by the global options.
    pub fn load(global: &GlobalArgs) -> Result<Self> {
        let loaded =
            LoadedConfig::load(&global.config_file, &global.overrides(), Environment::Process)?;
        Ok(Self::new(loaded, global))
    }

    pub fn new(loaded: LoadedConfig, global: &GlobalArgs) -> Self {
        Self {
            loaded,
            no_login: global.no_login,
            assume_yes: global.yes,
            quiet: global.quiet,
            storage_token: global.storage_token.clone(),
        }
    }

    /// Uploader for the configured storage, or a disabled one when the
    /// storage section is incomplete.
    pub fn uploader(&self) -> Result<Box<dyn ArtifactUploader>> {
        if !self.loaded.config.storage.is_complete() {
            info!("Storage: missing configuration");
            return Ok(Box::new(DisabledUploader::new(
                "upload: no storage configuration",
            )));
        }
        let transport = HttpBlobTransport::new()?.with_bearer_token(self.storage_token.clone());
        self.blob_uploader(Arc::new(transport))
    }

    pub fn blob_uploader(&self, transport: Arc<dyn BlobTransport>) -> Result<Box<dyn ArtifactUploader>> {
        let storage = &self.loaded.config.storage;
        let container = if storage.blob_endpoint.is_empty() {
            BlobContainer::for_account(&storage.account_name, &storage.container_name)?
        } else {
            BlobContainer::new(&storage.blob_endpoint, &storage.container_name)?
        };
        let uploader = BlobUploader::new(container, self.loaded.namespace.upload_prefix(), transport)
            .with_online(!self.no_login);
        Ok(Box::new(uploader))
    }

    /// Template session over the resolved configuration.
    pub fn session<'a>(
        &self,
        lookup: &'a customazed_config::ConfigLookup,
        uploader: &'a mut dyn ArtifactUploader,
    ) -> TemplateSession<'a> {
        TemplateSession::standard(lookup, uploader.as_registry(), self.loaded.namespace)
    }

    /// Transfer everything the uploader planned, after confirmation.
    pub async fn run_uploads(&self, uploader: &mut dyn ArtifactUploader) -> Result<()> {
        let files = uploader.file_count();
        info!("Files to upload: {}", files);
        if !uploader.is_enabled() || uploader.pending_count() == 0 {
            return Ok(());
        }
        if !self.confirm(&format!("Upload {} files?", files))? {
            anyhow::bail!(customazed_storage::StorageError::Cancelled);
        }
        let sent = uploader
            .execute()
            .await
            .context("uploading artifacts")?;
        info!("Uploaded {} files", sent);
        Ok(())
    }

    fn confirm(&self, prompt: &str) -> Result<bool> {
        if self.assume_yes || self.quiet {
            return Ok(true);
        }
        if !std::io::stdin().is_terminal() {
            debug!("No terminal, proceeding without confirmation");
            return Ok(true);
        }
        Ok(Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .default(true)
            .interact()?)
    }
}

/// Output of a rendering, or its terminal error. The marker-bearing output
/// of a failed rendering is only logged.
pub fn finish_rendering(rendering: Rendering<String>) -> Result<String> {
    match rendering.error {
        None => Ok(rendering.output),
        Some(err) => {
            warn!("Rendered with errors:\n{}", rendering.output);
            Err(err.into())
        }
    }
}

/// Read a whole file, or stdin for `-`.
pub fn read_input(path: &str) -> Result<String> {
    if path == STDIN_PATH {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("reading stdin")?;
        return Ok(text);
    }
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path))
}

/// Write `text` to a file, or stdout for `-`.
pub fn write_output(path: &str, text: &str) -> Result<()> {
    if path == STDIN_PATH {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(text.as_bytes())?;
        stdout.flush()?;
        return Ok(());
    }
    info!("Writing to {}", path);
    std::fs::write(path, text).with_context(|| format!("writing {}", path))
}
