use anyhow::Context;
use chrono::NaiveDate;
use clap::Subcommand;
use std::sync::Arc;

use spendlog_core::api_client::ExpenseApiClient;
use spendlog_core::config::Settings;
use spendlog_core::domain::expense::ExpenseRecord;
use spendlog_core::submit::handler::{ChannelNotifier, FormFields, SubmitHandler, SubmitOutcome};
use spendlog_core::submit::http::RecordExpenseClient;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Record one expense through the submission handler.
    Submit {
        /// Expense date (YYYY-MM-DD), sent exactly as given.
        #[arg(long)]
        date: String,

        #[arg(long)]
        amount: Option<String>,

        #[arg(long)]
        category: Option<String>,

        #[arg(long)]
        description: Option<String>,
    },

    /// Create an expense category.
    AddCategory {
        #[arg(long)]
        name: String,
    },

    /// Per-category totals for one month.
    MonthlyReport {
        #[arg(long)]
        year: i32,

        #[arg(long)]
        month: u32,
    },

    /// Total recorded for one category.
    CategoryTotal {
        #[arg(long)]
        name: String,
    },

    /// Expenses between two dates, inclusive.
    Expenses {
        #[arg(long)]
        start: NaiveDate,

        #[arg(long)]
        end: NaiveDate,
    },

    /// Highest-spending categories.
    TopCategories {
        #[arg(long, default_value_t = 3)]
        count: usize,
    },
}

pub async fn run(command: Command, settings: &Settings) -> anyhow::Result<()> {
    match command {
        Command::Submit {
            date,
            amount,
            category,
            description,
        } => {
            submit(
                settings,
                FormFields {
                    date,
                    amount,
                    category,
                    description,
                },
            )
            .await
        }
        Command::AddCategory { name } => {
            let client = ExpenseApiClient::from_settings(settings)?;
            client.create_category(&name).await?;
            println!("Category added successfully.");
            Ok(())
        }
        Command::MonthlyReport { year, month } => {
            let client = ExpenseApiClient::from_settings(settings)?;
            let report = client.monthly_report(year, month).await?;
            println!("Monthly Expense Report - {:02}/{}", report.month, report.year);
            for total in &report.totals {
                println!("{}: ${:.2}", total.category, total.total);
            }
            Ok(())
        }
        Command::CategoryTotal { name } => {
            let client = ExpenseApiClient::from_settings(settings)?;
            let total = client.category_total(&name).await?;
            println!("{}: ${:.2}", total.category, total.total);
            Ok(())
        }
        Command::Expenses { start, end } => {
            let client = ExpenseApiClient::from_settings(settings)?;
            let expenses = client.expenses_in_range(start, end).await?;
            for expense in &expenses {
                println!("{}", render_expense(expense));
            }
            Ok(())
        }
        Command::TopCategories { count } => {
            anyhow::ensure!(count >= 1, "count must be at least 1");
            let client = ExpenseApiClient::from_settings(settings)?;
            let top = client.top_categories(count).await?;
            for total in &top {
                println!("{}: ${:.2}", total.category, total.total);
            }
            Ok(())
        }
    }
}

/// The expense form: register the handler, fire one submit intent, await its
/// terminal outcome, then unbind during shutdown.
async fn submit(settings: &Settings, fields: FormFields) -> anyhow::Result<()> {
    let client = RecordExpenseClient::from_settings(settings);
    let (notifier, mut outcomes) = ChannelNotifier::new();
    let handler = SubmitHandler::new(Arc::new(client), Arc::new(notifier));
    let (form, binding) = handler.register();

    form.submit(fields)?;

    let outcome = outcomes
        .recv()
        .await
        .context("submission handler stopped before reporting an outcome")?;

    binding.unbind();

    match outcome {
        SubmitOutcome::Success(status) => {
            tracing::info!(%status, "expense recorded");
            println!("Expense recorded successfully.");
            Ok(())
        }
        SubmitOutcome::Failed { cause } => {
            anyhow::bail!("expense submission failed: {cause}")
        }
    }
}

fn render_expense(expense: &ExpenseRecord) -> String {
    let mut out = expense.date.clone();
    if let Some(amount) = expense.amount {
        out.push_str(&format!("  ${amount:.2}"));
    }
    if let Some(category) = expense.category.as_deref() {
        out.push_str(&format!("  [{category}]"));
    }
    if let Some(description) = expense.description.as_deref() {
        out.push_str(&format!("  {description}"));
    }
    out
}
