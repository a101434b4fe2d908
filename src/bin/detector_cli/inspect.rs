//! Inspect command - load an exported artifact and show its metadata

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use detector_sandbox::{EntityInvoker, EntityMetadata};
use std::path::PathBuf;

use super::output::{format_error, format_report};
use super::Session;

#[derive(Parser, Debug)]
pub struct InspectCmd {
    /// Path to an artifact written by `export --out`
    pub artifact: PathBuf,
}

impl InspectCmd {
    pub async fn execute(&self, session: &Session, json_output: bool) -> Result<()> {
        let invoker = match self.load(session).await {
            Ok(invoker) => invoker,
            Err(e) => {
                eprintln!("{}", format_error(&e, json_output));
                return Err(e);
            }
        };

        println!("{}", format_report(&invoker, json_output));

        if invoker.is_compilation_successful() {
            Ok(())
        } else {
            Err(anyhow!(
                "{} could not be loaded (state: {})",
                self.artifact.display(),
                invoker.state()
            ))
        }
    }

    async fn load(&self, session: &Session) -> Result<EntityInvoker> {
        let bytes = tokio::fs::read(&self.artifact)
            .await
            .with_context(|| format!("failed to read artifact {}", self.artifact.display()))?;
        let name = self
            .artifact
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let image = session.compiler().load_image(&name, &bytes)?;
        let mut invoker = session.invoker(EntityMetadata::new("").with_location(&self.artifact));
        invoker.initialize_from_executable(image)?;
        Ok(invoker)
    }
}
