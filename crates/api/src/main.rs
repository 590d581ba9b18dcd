use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use spendlog_core::domain::expense::ExpenseRecord;
use spendlog_core::domain::report::{CategoryTotal, MonthlyReport};
use spendlog_core::tracker::{ExpenseTracker, TrackerError};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = spendlog_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let app = app(AppState::new());

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(8080);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(%addr, "api listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

#[derive(Debug, Clone)]
struct AppState {
    tracker: Arc<RwLock<ExpenseTracker>>,
}

impl AppState {
    fn new() -> Self {
        Self {
            tracker: Arc::new(RwLock::new(ExpenseTracker::new())),
        }
    }
}

fn app(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/recordExpense", post(record_expense))
        .route("/categories", post(create_category))
        .route("/reports/monthly/:year/:month", get(monthly_report))
        .route("/reports/category-total", get(category_total))
        .route("/reports/top/:count", get(top_categories))
        .route("/expenses/:start/:end", get(expenses_in_range))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn healthz() -> &'static str {
    "ok"
}

async fn record_expense(
    State(state): State<AppState>,
    Json(record): Json<ExpenseRecord>,
) -> Result<&'static str, StatusCode> {
    let mut tracker = state.tracker.write().await;
    match tracker.record(record) {
        Ok(()) => Ok("Expense recorded successfully."),
        Err(TrackerError::CategoryNotFound(name)) => {
            tracing::warn!(category = %name, "rejected expense for unknown category");
            Err(StatusCode::UNPROCESSABLE_ENTITY)
        }
    }
}

#[derive(Debug, Deserialize)]
struct NewCategory {
    name: String,
}

async fn create_category(
    State(state): State<AppState>,
    Json(req): Json<NewCategory>,
) -> Result<&'static str, StatusCode> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }

    let mut tracker = state.tracker.write().await;
    if tracker.add_category(name) {
        tracing::info!(category = %name, "category added");
    }

    // Duplicate adds are accepted and ignored.
    Ok("Category added successfully.")
}

async fn monthly_report(
    State(state): State<AppState>,
    Path((year, month)): Path<(i32, u32)>,
) -> Result<Json<MonthlyReport>, StatusCode> {
    if !(1..=12).contains(&month) {
        return Err(StatusCode::BAD_REQUEST);
    }

    let tracker = state.tracker.read().await;
    Ok(Json(tracker.monthly_report(year, month)))
}

#[derive(Debug, Deserialize)]
struct CategoryTotalParams {
    name: String,
}

async fn category_total(
    State(state): State<AppState>,
    Query(params): Query<CategoryTotalParams>,
) -> Result<Json<CategoryTotal>, StatusCode> {
    let tracker = state.tracker.read().await;
    let total = tracker
        .category_total(&params.name)
        .ok_or(StatusCode::NOT_FOUND)?;

    Ok(Json(CategoryTotal {
        category: params.name,
        total,
    }))
}

async fn top_categories(
    State(state): State<AppState>,
    Path(count): Path<usize>,
) -> Result<Json<Vec<CategoryTotal>>, StatusCode> {
    if count == 0 {
        return Err(StatusCode::BAD_REQUEST);
    }

    let tracker = state.tracker.read().await;
    Ok(Json(tracker.top_categories(count)))
}

async fn expenses_in_range(
    State(state): State<AppState>,
    Path((start, end)): Path<(String, String)>,
) -> Result<Json<Vec<ExpenseRecord>>, StatusCode> {
    let start =
        NaiveDate::parse_from_str(&start, "%Y-%m-%d").map_err(|_| StatusCode::BAD_REQUEST)?;
    let end = NaiveDate::parse_from_str(&end, "%Y-%m-%d").map_err(|_| StatusCode::BAD_REQUEST)?;

    let tracker = state.tracker.read().await;
    Ok(Json(tracker.expenses_in_range(start, end)))
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

fn init_sentry(settings: &spendlog_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use spendlog_core::api_client::ExpenseApiClient;
    use spendlog_core::submit::error::SubmitError;
    use spendlog_core::submit::http::RecordExpenseClient;
    use spendlog_core::submit::ExpenseSubmitter;

    async fn spawn_app() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = app(AppState::new());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn record(date: &str, amount: Option<f64>, category: Option<&str>) -> ExpenseRecord {
        ExpenseRecord {
            date: date.to_string(),
            amount,
            category: category.map(|s| s.to_string()),
            description: None,
        }
    }

    #[tokio::test]
    async fn healthz_answers_ok() {
        let base = spawn_app().await;
        let res = reqwest::get(format!("{base}/healthz")).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.text().await.unwrap(), "ok");
    }

    #[tokio::test]
    async fn record_then_query_full_flow() {
        let base = spawn_app().await;
        let submit = RecordExpenseClient::new(base.clone());
        let query = ExpenseApiClient::new(base).unwrap();

        query.create_category("food").await.unwrap();

        let status = submit
            .submit(&record("2024-03-01", Some(12.5), Some("food")))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::OK);
        submit
            .submit(&record("2024-03-15", Some(7.5), Some("food")))
            .await
            .unwrap();
        // The guaranteed-field-only payload records too.
        submit.submit(&record("2024-03-20", None, None)).await.unwrap();

        let total = query.category_total("food").await.unwrap();
        assert_eq!(total.total, 20.0);

        let report = query.monthly_report(2024, 3).await.unwrap();
        let food = report
            .totals
            .iter()
            .find(|t| t.category == "food")
            .unwrap();
        assert_eq!(food.total, 20.0);
        assert!(report.totals.iter().any(|t| t.category == "uncategorized"));

        let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let hits = query.expenses_in_range(start, end).await.unwrap();
        assert_eq!(hits.len(), 2);

        let top = query.top_categories(1).await.unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].category, "food");
    }

    #[tokio::test]
    async fn unknown_category_is_rejected_with_422() {
        let base = spawn_app().await;
        let submit = RecordExpenseClient::new(base);

        let err = submit
            .submit(&record("2024-03-01", Some(5.0), Some("travel")))
            .await
            .unwrap_err();
        match err {
            SubmitError::Status(status) => {
                assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY)
            }
            SubmitError::Transport(_) => panic!("expected a status error"),
        }
    }

    #[tokio::test]
    async fn record_expense_rejects_malformed_bodies() {
        let base = spawn_app().await;
        let http = reqwest::Client::new();

        let res = http
            .post(format!("{base}/recordExpense"))
            .header("Content-Type", "application/json")
            .body("not json")
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let res = http
            .post(format!("{base}/recordExpense"))
            .header("Content-Type", "application/json")
            .body("{}")
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn query_routes_validate_their_inputs() {
        let base = spawn_app().await;
        let query = ExpenseApiClient::new(base.clone()).unwrap();

        assert!(query.monthly_report(2024, 13).await.is_err());
        assert!(query.top_categories(0).await.is_err());
        assert!(query.category_total("nope").await.is_err());

        let res = reqwest::get(format!("{base}/expenses/01-03-2024/2024-03-31"))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_routes_fall_back_to_404() {
        let base = spawn_app().await;
        let res = reqwest::get(format!("{base}/nothing-here")).await.unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}
