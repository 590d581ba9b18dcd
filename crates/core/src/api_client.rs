use crate::config::Settings;
use crate::domain::expense::ExpenseRecord;
use crate::domain::report::{CategoryTotal, MonthlyReport};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "http://localhost:8080";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Client for the tracker's category and report routes.
///
/// The submission path has its own client with a stricter contract; everything
/// else goes through here.
#[derive(Debug, Clone)]
pub struct ExpenseApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ExpenseApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .context("failed to build expense api http client")?;

        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let base_url = settings
            .api_base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Self::new(base_url)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    pub async fn create_category(&self, name: &str) -> Result<()> {
        let res = self
            .http
            .post(self.url("/categories"))
            .json(&serde_json::json!({ "name": name }))
            .send()
            .await
            .context("create category request failed")?;

        let status = res.status();
        if !status.is_success() {
            let text = res.text().await.unwrap_or_default();
            anyhow::bail!("create category HTTP {status}: {text}");
        }
        Ok(())
    }

    pub async fn monthly_report(&self, year: i32, month: u32) -> Result<MonthlyReport> {
        self.get_json(&format!("/reports/monthly/{year}/{month}"), &[])
            .await
    }

    pub async fn category_total(&self, name: &str) -> Result<CategoryTotal> {
        self.get_json("/reports/category-total", &[("name", name)])
            .await
    }

    pub async fn expenses_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ExpenseRecord>> {
        self.get_json(&format!("/expenses/{start}/{end}"), &[]).await
    }

    pub async fn top_categories(&self, count: usize) -> Result<Vec<CategoryTotal>> {
        self.get_json(&format!("/reports/top/{count}"), &[]).await
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        let res = self
            .http
            .get(self.url(path))
            .query(query)
            .send()
            .await
            .context("expense api request failed")?;

        let status = res.status();
        let text = res
            .text()
            .await
            .context("failed to read expense api response")?;
        if !status.is_success() {
            anyhow::bail!("expense api HTTP {status}: {text}");
        }

        serde_json::from_str::<T>(&text)
            .with_context(|| format!("failed to parse expense api response: {text}"))
    }
}
