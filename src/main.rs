use clap::Parser;
use gigpay::application::engine::PaymentEngine;
use gigpay::domain::Amount;
use gigpay::error::PaymentError;
use gigpay::infrastructure::in_memory::MemoryLedger;
use gigpay::interfaces::csv::balance_writer::BalanceWriter;
use gigpay::interfaces::csv::operation_reader::{Operation, OperationReader, OperationType};
use gigpay::interfaces::seed::SeedData;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Seed fixture with profiles, contracts and jobs (JSON)
    seed: PathBuf,

    /// Operations CSV file (op, profile, job, amount)
    operations: PathBuf,

    /// Row-lock wait window in milliseconds
    #[arg(long, default_value_t = 5000)]
    lock_wait_ms: u64,

    /// Attempts for operations that fail with a transient lock timeout
    #[arg(long, default_value_t = 3)]
    max_attempts: u32,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let ledger = MemoryLedger::with_lock_wait(Duration::from_millis(cli.lock_wait_ms));
    let seed_file = File::open(&cli.seed).into_diagnostic()?;
    SeedData::from_reader(seed_file)
        .into_diagnostic()?
        .load_into(&ledger)
        .await
        .into_diagnostic()?;

    let engine = PaymentEngine::with_retry(
        Arc::new(ledger.clone()),
        cli.max_attempts,
        Duration::from_millis(10),
    );

    // Process operations
    let file = File::open(&cli.operations).into_diagnostic()?;
    let reader = OperationReader::new(file);
    for op_result in reader.operations() {
        match op_result {
            Ok(op) => {
                if let Err(e) = run_operation(&engine, op).await {
                    eprintln!("Error processing operation: {e}");
                }
            }
            Err(e) => {
                eprintln!("Error reading operation: {e}");
            }
        }
    }

    // Output final balances
    let stdout = io::stdout();
    let mut writer = BalanceWriter::new(stdout.lock());
    writer
        .write_profiles(ledger.profiles().await)
        .into_diagnostic()?;

    Ok(())
}

async fn run_operation(engine: &PaymentEngine, op: Operation) -> gigpay::error::Result<()> {
    match op.op {
        OperationType::Deposit => {
            let amount = op
                .amount
                .ok_or_else(|| PaymentError::Validation("deposit missing amount".to_string()))?;
            engine
                .deposit_balance(op.profile, Amount::new(amount)?)
                .await?;
        }
        OperationType::Pay => {
            let job = op
                .job
                .ok_or_else(|| PaymentError::Validation("pay missing job id".to_string()))?;
            engine.pay_for_job(op.profile, job).await?;
        }
    }
    Ok(())
}
