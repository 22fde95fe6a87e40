//! Account commands - init, transfer, delete, query

use anyhow::Result;
use colored::Colorize;

use ledgerline_core::{InvocationContext, Operation};

use super::{get_context, run_logged};
use crate::output;

pub fn init(args: Vec<String>) -> Result<()> {
    let ctx = get_context()?;
    run_logged(&ctx, Operation::Initialize, &args, &InvocationContext::new(), "init")?;

    output::success(&format!(
        "Initialized {} = {}, {} = {}",
        args[0], args[1], args[2], args[3]
    ));
    Ok(())
}

pub fn transfer(args: Vec<String>) -> Result<()> {
    let ctx = get_context()?;
    run_logged(&ctx, Operation::Transfer, &args, &InvocationContext::new(), "transfer")?;

    output::success(&format!("Transferred {} from {} to {}", args[2], args[0], args[1]));
    for key in [&args[0], &args[1]] {
        if let Ok(balance) = ctx.account_service.query_balance(key) {
            println!("  {}: {}", balance.name, balance.amount.bold());
        }
    }
    Ok(())
}

pub fn delete(key: String) -> Result<()> {
    let ctx = get_context()?;
    let args = vec![key];
    run_logged(&ctx, Operation::Delete, &args, &InvocationContext::new(), "delete")?;

    output::success(&format!("Deleted {}", args[0]));
    Ok(())
}

pub fn query(key: String, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let args = vec![key];
    let result = run_logged(&ctx, Operation::Query, &args, &InvocationContext::new(), "query");

    if json {
        match result {
            Ok(bytes) => {
                let balance = ledgerline_core::AccountBalance {
                    name: args[0].clone(),
                    amount: output::render_bytes(&bytes),
                };
                println!("{}", serde_json::to_string_pretty(&balance)?);
            }
            Err(e) => {
                println!("{}", e.to_json());
                std::process::exit(1);
            }
        }
        return Ok(());
    }

    println!("{}", output::render_bytes(&result?));
    Ok(())
}
