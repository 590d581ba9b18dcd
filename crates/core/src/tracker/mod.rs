use crate::domain::expense::ExpenseRecord;
use crate::domain::report::{CategoryTotal, MonthlyReport};
use chrono::{Datelike, NaiveDate};
use std::fmt;

/// Bucket for records that arrive without a category. Created lazily on first
/// use; named categories must be created explicitly before they accept
/// records.
pub const DEFAULT_CATEGORY: &str = "uncategorized";

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug)]
pub enum TrackerError {
    CategoryNotFound(String),
}

impl fmt::Display for TrackerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackerError::CategoryNotFound(name) => {
                write!(f, "category not found: {name}; create the category first")
            }
        }
    }
}

impl std::error::Error for TrackerError {}

/// Process-local expense ledger. Categories keep insertion order and match by
/// name case-insensitively.
#[derive(Debug, Default)]
pub struct ExpenseTracker {
    categories: Vec<CategoryBucket>,
}

#[derive(Debug)]
struct CategoryBucket {
    name: String,
    expenses: Vec<ExpenseRecord>,
}

impl ExpenseTracker {
    pub fn new() -> Self {
        Self {
            categories: Vec::new(),
        }
    }

    /// Returns false when the category already exists.
    pub fn add_category(&mut self, name: &str) -> bool {
        if self.position(name).is_some() {
            return false;
        }
        self.categories.push(CategoryBucket {
            name: name.to_string(),
            expenses: Vec::new(),
        });
        true
    }

    pub fn record(&mut self, record: ExpenseRecord) -> Result<(), TrackerError> {
        let idx = match record.category.as_deref() {
            Some(name) => self
                .position(name)
                .ok_or_else(|| TrackerError::CategoryNotFound(name.to_string()))?,
            None => match self.position(DEFAULT_CATEGORY) {
                Some(idx) => idx,
                None => {
                    self.categories.push(CategoryBucket {
                        name: DEFAULT_CATEGORY.to_string(),
                        expenses: Vec::new(),
                    });
                    self.categories.len() - 1
                }
            },
        };

        self.categories[idx].expenses.push(record);
        Ok(())
    }

    /// Sum of amounts recorded for one category; a missing amount counts as
    /// zero. `None` for an unknown category.
    pub fn category_total(&self, name: &str) -> Option<f64> {
        let bucket = &self.categories[self.position(name)?];
        Some(bucket.expenses.iter().map(amount_or_zero).sum())
    }

    /// Per-category totals for one calendar month. Every category appears,
    /// with 0.0 when it recorded nothing in the month.
    pub fn monthly_report(&self, year: i32, month: u32) -> MonthlyReport {
        let mut totals = Vec::with_capacity(self.categories.len());
        for bucket in &self.categories {
            let mut total = 0.0;
            for expense in &bucket.expenses {
                let Some(date) = parse_date(&expense.date) else {
                    continue;
                };
                if date.year() == year && date.month() == month {
                    total += amount_or_zero(expense);
                }
            }
            totals.push(CategoryTotal {
                category: bucket.name.clone(),
                total,
            });
        }

        MonthlyReport {
            year,
            month,
            totals,
        }
    }

    /// Expenses dated within `start..=end`. Records whose stored date does not
    /// parse are skipped.
    pub fn expenses_in_range(&self, start: NaiveDate, end: NaiveDate) -> Vec<ExpenseRecord> {
        let mut out = Vec::new();
        for bucket in &self.categories {
            for expense in &bucket.expenses {
                let Some(date) = parse_date(&expense.date) else {
                    continue;
                };
                if date >= start && date <= end {
                    out.push(expense.clone());
                }
            }
        }
        out
    }

    /// Categories sorted by total spend descending (name ascending on ties),
    /// truncated to `count`.
    pub fn top_categories(&self, count: usize) -> Vec<CategoryTotal> {
        let mut totals: Vec<CategoryTotal> = self
            .categories
            .iter()
            .map(|bucket| CategoryTotal {
                category: bucket.name.clone(),
                total: bucket.expenses.iter().map(amount_or_zero).sum(),
            })
            .collect();

        totals.sort_by(|a, b| {
            b.total
                .partial_cmp(&a.total)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.category.cmp(&b.category))
        });
        totals.truncate(count);
        totals
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.categories
            .iter()
            .position(|c| c.name.eq_ignore_ascii_case(name))
    }
}

fn amount_or_zero(expense: &ExpenseRecord) -> f64 {
    expense.amount.unwrap_or(0.0)
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    match NaiveDate::parse_from_str(s, DATE_FORMAT) {
        Ok(date) => Some(date),
        Err(error) => {
            tracing::warn!(date = %s, %error, "skipping expense with unparseable date");
            None
        }
    }
}
