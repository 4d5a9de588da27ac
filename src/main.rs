use anyhow::Context;
use charity_select::utils::error::ErrorSeverity;
use charity_select::utils::{logger, validation::Validate};
use charity_select::{
    CliConfig, CsvRecordSource, LocalStorage, SelectError, SelectionEngine, SelectionResult,
    SelectionRunner,
};
use clap::Parser;
use std::io::Write;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    if config.log_json {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::debug!("CLI config: {:?}", config);

    let engine = match config
        .validate()
        .and_then(|_| config.load_constraints())
        .and_then(SelectionEngine::new)
    {
        Ok(engine) => engine,
        Err(e) => {
            tracing::error!("Configuration validation failed: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    let source = CsvRecordSource::new(
        LocalStorage::default(),
        config.candidates.clone(),
        config.profile.clone(),
    );
    let runner = SelectionRunner::new(source, engine);

    let selection = runner
        .run()
        .await
        .and_then(|result| Ok((result.json_lines()?, result)));

    match selection {
        Ok((lines, result)) => {
            print_result(&lines, &result).context("failed to write selection to stdout")?;
        }
        Err(e) => {
            tracing::error!(
                "Selection failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(exit_code(&e));
        }
    }

    Ok(())
}

fn exit_code(error: &SelectError) -> i32 {
    match error.severity() {
        ErrorSeverity::High => 1,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::Critical => 3,
    }
}

fn print_result(lines: &[String], result: &SelectionResult) -> anyhow::Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    for line in lines {
        writeln!(out, "{}", line)?;
    }

    let summary = &result.summary;
    let shortfalls: Vec<String> = summary
        .rules
        .iter()
        .filter(|outcome| outcome.is_shortfall())
        .map(|outcome| {
            format!(
                "{} {}/{} {}",
                outcome.rule, outcome.achieved, outcome.required, outcome.category
            )
        })
        .collect();

    write!(
        out,
        "Selected {} of {} charities for {} ({} regional, {} national)",
        summary.selected,
        summary.total_count,
        summary.user_id,
        summary.regional_selected,
        summary.national_selected
    )?;
    if !shortfalls.is_empty() {
        write!(out, "; unmet minimums: {}", shortfalls.join(", "))?;
    }
    writeln!(out)?;
    Ok(())
}
