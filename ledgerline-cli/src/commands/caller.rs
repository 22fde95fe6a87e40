//! Caller command - resolve the caller's identity and affiliation

use std::path::PathBuf;

use anyhow::{Context, Result};
use colored::Colorize;

use ledgerline_core::{CallerData, Operation};

use super::{get_context, invocation_context, run_logged};
use crate::output;

pub fn run(cert: Option<PathBuf>, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let invocation = invocation_context(&ctx, cert.as_deref())?;
    let result = run_logged(&ctx, Operation::GetCallerData, &[], &invocation, "caller");

    let payload = match result {
        Ok(payload) => payload,
        Err(e) if json => {
            println!("{}", e.to_json());
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    };

    let data: CallerData =
        serde_json::from_slice(&payload).context("Unexpected caller data payload")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&data)?);
        return Ok(());
    }

    println!("{}", "Caller".bold());
    let mut table = output::create_table();
    table.add_row(vec!["User", data.username.as_str()]);
    table.add_row(vec!["Affiliation", &data.affiliation.to_string()]);
    println!("{}", table);
    Ok(())
}
