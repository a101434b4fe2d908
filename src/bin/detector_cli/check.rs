//! Check command - compile and validate a detector manifest

use anyhow::{anyhow, Result};
use clap::Parser;
use std::path::PathBuf;

use super::output::{format_error, format_report};
use super::Session;

#[derive(Parser, Debug)]
pub struct CheckCmd {
    /// Path to the detector manifest (JSON)
    pub manifest: PathBuf,
}

impl CheckCmd {
    pub async fn execute(&self, session: &Session, json_output: bool) -> Result<()> {
        let invoker = match session.compile(&self.manifest).await {
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
                "{} is not ready (state: {})",
                self.manifest.display(),
                invoker.state()
            ))
        }
    }
}
