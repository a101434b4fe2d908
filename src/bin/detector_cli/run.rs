//! Run command - initialize a detector and invoke its entry point

use anyhow::Result;
use clap::Parser;
use detector_sandbox::DetectorOutput;
use serde_json::Value;
use std::path::PathBuf;

use super::output::{format_error, format_output};
use super::Session;

#[derive(Parser, Debug)]
pub struct RunCmd {
    /// Path to the detector manifest (JSON)
    pub manifest: PathBuf,

    /// Arguments, in order. Parsed as JSON; anything that is not valid JSON
    /// is passed as a string.
    #[arg(long = "arg", num_args(1..))]
    pub args: Vec<String>,
}

impl RunCmd {
    pub async fn execute(&self, session: &Session, json_output: bool) -> Result<()> {
        match self.execute_inner(session).await {
            Ok(output) => {
                println!("{}", format_output(&output, json_output));
                Ok(())
            }
            Err(e) => {
                eprintln!("{}", format_error(&e, json_output));
                Err(e)
            }
        }
    }

    async fn execute_inner(&self, session: &Session) -> Result<DetectorOutput> {
        let invoker = session.compile(&self.manifest).await?;
        let args = self.args.iter().map(|raw| parse_arg(raw)).collect();
        Ok(invoker.invoke(args).await?)
    }
}

fn parse_arg(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}
