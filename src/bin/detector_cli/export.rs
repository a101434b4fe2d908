//! Export command - save a compiled detector artifact

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use super::output::{format_bytes, format_error, format_saved};
use super::Session;

#[derive(Parser, Debug)]
pub struct ExportCmd {
    /// Path to the detector manifest (JSON)
    pub manifest: PathBuf,

    /// Where to write the artifact
    #[arg(long, required_unless_present = "bytes")]
    pub out: Option<PathBuf>,

    /// Print the artifact name and base64 payload instead of writing a file
    #[arg(long, conflicts_with = "out")]
    pub bytes: bool,
}

impl ExportCmd {
    pub async fn execute(&self, session: &Session, json_output: bool) -> Result<()> {
        match self.execute_inner(session, json_output).await {
            Ok(text) => {
                println!("{}", text);
                Ok(())
            }
            Err(e) => {
                eprintln!("{}", format_error(&e, json_output));
                Err(e)
            }
        }
    }

    async fn execute_inner(&self, session: &Session, json_output: bool) -> Result<String> {
        let invoker = session.compile(&self.manifest).await?;

        match &self.out {
            Some(path) if !self.bytes => {
                let saved = invoker.save_to_disk(path).await?;
                Ok(format_saved(&saved, json_output))
            }
            _ => {
                let artifact = invoker.get_bytes().await?;
                Ok(format_bytes(&artifact, json_output))
            }
        }
    }
}
