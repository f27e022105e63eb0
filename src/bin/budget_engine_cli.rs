use std::{env, process};

use budget_engine::{
    config::{ConfigManager, EngineConfig},
    core::{
        services::{BudgetStatus, RankedSummary},
        BudgetCoordinator, BudgetEngine, Clock, FixedClock, RefreshReport, SystemClock,
    },
    init_with_filter,
    ledger::Ledger,
    storage::{json_backend, JsonStorage},
    EngineError,
};
use chrono::NaiveDate;
use colored::Colorize;
use uuid::Uuid;

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

fn main() {
    if let Err(err) = run() {
        eprintln!("{} {err}", "Error:".red().bold());
        process::exit(1);
    }
}

fn run() -> CliResult<()> {
    let manager = ConfigManager::new()?;
    let config = manager.load()?;
    init_with_filter(&config.log_filter);

    let mut args = env::args().skip(1);
    let Some(command) = args.next() else {
        print_usage();
        process::exit(1);
    };
    let rest: Vec<String> = args.collect();

    match command.as_str() {
        "refresh" => {
            let (owner, clock) = target_and_clock(&rest)?;
            let coordinator = open(&manager, &config, clock)?;
            print_refresh(&coordinator.refresh_owner(owner)?);
        }
        "overview" => {
            let (owner, clock) = target_and_clock(&rest)?;
            let coordinator = open(&manager, &config, clock)?;
            print_overview(&coordinator.overview(owner)?);
        }
        "reset" => {
            let (budget_id, clock) = target_and_clock(&rest)?;
            let coordinator = open(&manager, &config, clock)?;
            let budget = coordinator.reset_alerts(budget_id)?;
            println!(
                "Re-armed {} threshold(s) on {}",
                budget.alerts.thresholds.len(),
                budget.name.bold()
            );
        }
        "close" => {
            let (budget_id, clock) = target_and_clock(&rest)?;
            let coordinator = open(&manager, &config, clock)?;
            let (budget, outcome) = coordinator.close_period(budget_id)?;
            println!(
                "Closed {}: spent {:.2} of {:.2}, carried over {:.2}",
                budget.name.bold(),
                outcome.snapshot.actual_spent,
                outcome.snapshot.budget_amount,
                outcome.carryover
            );
            println!("Next period: {}", budget.window);
        }
        "config" => {
            println!("{}", manager.path().display());
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        _ => {
            print_usage();
            process::exit(1);
        }
    }

    Ok(())
}

/// Parses `<uuid> [--date YYYY-MM-DD]`; without a date the system clock is used.
fn target_and_clock(args: &[String]) -> CliResult<(Uuid, Box<dyn Clock>)> {
    let Some(raw_id) = args.first() else {
        print_usage();
        process::exit(1);
    };
    let id = Uuid::parse_str(raw_id).map_err(|err| format!("invalid id `{raw_id}`: {err}"))?;
    let clock: Box<dyn Clock> = match args.get(1).map(String::as_str) {
        Some("--date") => {
            let raw = args.get(2).ok_or("--date needs a value")?;
            let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map_err(|err| format!("invalid date `{raw}`: {err}"))?;
            Box::new(FixedClock::at_date(date))
        }
        Some(other) => return Err(format!("unexpected argument `{other}`").into()),
        None => Box::new(SystemClock),
    };
    Ok((id, clock))
}

fn open(
    manager: &ConfigManager,
    config: &EngineConfig,
    clock: Box<dyn Clock>,
) -> Result<BudgetCoordinator<JsonStorage, Ledger, Box<dyn Clock>>, EngineError> {
    let ledger_path = manager.ledger_path(config);
    let ledger = if ledger_path.exists() {
        json_backend::load_ledger_from_path(&ledger_path)?
    } else {
        Ledger::new("Ledger")
    };
    let storage = JsonStorage::new(Some(manager.base_dir().to_path_buf()))?;
    Ok(BudgetCoordinator::new(storage, BudgetEngine::new(ledger, clock)))
}

fn print_refresh(report: &RefreshReport) {
    for outcome in &report.outcomes {
        let period = &outcome.budget.current_period;
        println!(
            "{:<24} spent {:>10.2}  remaining {:>10.2}",
            outcome.budget.name, period.spent, period.remaining
        );
    }
    for alert in report.alerts() {
        println!(
            "{} {} reached {}% (threshold {}%)",
            "ALERT".yellow().bold(),
            alert.budget_name,
            alert.current_utilization,
            alert.threshold_percentage
        );
    }
    for failure in &report.failures {
        println!("{} {}: {}", "FAILED".red().bold(), failure.budget_id, failure.error);
    }
    if report.outcomes.is_empty() && report.failures.is_empty() {
        println!("No active budgets.");
    }
}

fn print_overview(ranked: &RankedSummary) {
    for entry in &ranked.budgets {
        let metrics = &entry.report.metrics;
        println!(
            "{:<24} {:>4}%  {:>10.2} / {:<10.2} {}",
            entry.report.name,
            metrics.utilization_percentage,
            metrics.spent,
            entry.report.effective_amount,
            paint(metrics.status)
        );
    }
    let summary = &ranked.summary;
    println!(
        "{} budgets, {:.2} of {:.2} spent, average utilisation {:.1}%",
        summary.budget_count, summary.total_spent, summary.total_amount, summary.average_utilization
    );
}

fn paint(status: BudgetStatus) -> colored::ColoredString {
    let label = status.to_string();
    match status {
        BudgetStatus::OnTrack => label.green(),
        BudgetStatus::Warning => label.yellow(),
        BudgetStatus::Critical => label.red(),
        BudgetStatus::OverBudget => label.red().bold(),
    }
}

fn print_usage() {
    eprintln!(
        "Usage: budget_engine_cli <command>\n\
         Commands:\n  \
         refresh <owner-id> [--date YYYY-MM-DD]\n  \
         overview <owner-id> [--date YYYY-MM-DD]\n  \
         reset <budget-id>\n  \
         close <budget-id> [--date YYYY-MM-DD]\n  \
         config"
    );
}
