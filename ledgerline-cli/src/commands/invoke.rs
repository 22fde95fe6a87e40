//! Invoke command - raw dispatch by operation name
//!
//! Prints the payload on success and the `{"Error": ...}` document on
//! failure, the same shape an embedding host would hand back. With
//! `--json` both outcomes are wrapped in an `OperationResult`.

use std::path::PathBuf;
use std::process::exit;

use anyhow::Result;
use ledgerline_core::{LogEvent, Operation, OperationResult};

use super::{get_context, get_logger, invocation_context, log_event, run_logged};
use crate::output;

pub fn run(operation: &str, args: Vec<String>, cert: Option<PathBuf>, json: bool) -> Result<()> {
    let outcome = match operation.parse::<Operation>() {
        Ok(operation) => {
            let ctx = get_context()?;
            let invocation = invocation_context(&ctx, cert.as_deref())?;
            run_logged(&ctx, operation, &args, &invocation, "invoke")
        }
        Err(e) => {
            log_event(
                &get_logger(),
                LogEvent::new("operation_failed")
                    .with_command("invoke")
                    .with_error(&e),
            );
            Err(e)
        }
    };

    if json {
        let failed = outcome.is_err();
        let result: OperationResult<String> =
            outcome.map(|payload| output::render_bytes(&payload)).into();
        println!("{}", serde_json::to_string_pretty(&result)?);
        if failed {
            exit(1);
        }
        return Ok(());
    }

    match outcome {
        Ok(payload) => {
            if !payload.is_empty() {
                println!("{}", output::render_bytes(&payload));
            }
            Ok(())
        }
        Err(e) => {
            println!("{}", e.to_json());
            exit(1);
        }
    }
}
