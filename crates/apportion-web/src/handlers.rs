use crate::AppState;
use crate::error::{WebError, WebResult};
use crate::session_store::SessionId;
use crate::views::{IndexPage, Notice, ResultsPage};
use apportion_calculator::{AllocationReport, SalespersonSummary};
use apportion_io::{Ingested, export_file_name, ingest_bytes, parse_amount, write_export};
use apportion_types::IngestionSummary;
use askama::Template;
use axum::extract::{Form, Multipart, Query, State};
use axum::http::StatusCode;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::{Html, IntoResponse, Json, Redirect, Response};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};

#[derive(Debug, Deserialize)]
pub struct FixedIncomeForm {
    pub salesperson: String,
    #[serde(default)]
    pub salary: String,
    #[serde(default)]
    pub stipend: String,
}

#[derive(Debug, Deserialize)]
pub struct ResultsQuery {
    pub salesperson: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SalespersonQuery {
    pub salesperson: String,
}

#[derive(Debug, Serialize)]
pub struct SessionView {
    pub ingestion: IngestionSummary,
    pub salespeople: Vec<SalespersonSummary>,
}

#[instrument(skip_all, fields(session_id = %session.id))]
pub async fn index(State(state): State<Arc<AppState>>, session: SessionId) -> WebResult<Response> {
    let page = state.sessions.read_session(&session.id, |s| IndexPage::build(s, Vec::new()));
    Ok(session.attach(Html(page.render()?)))
}

#[instrument(skip_all, fields(session_id = %session.id))]
pub async fn upload(
    State(state): State<Arc<AppState>>,
    session: SessionId,
    mut multipart: Multipart,
) -> WebResult<Response> {
    let (file_name, bytes) = match read_upload(&mut multipart).await {
        Ok(upload) => upload,
        Err(err) => {
            // Nothing was uploaded, so the loaded contracts stay as they are.
            warn!(error = %err, "upload without a file");
            let notice = Notice::error(format!(
                "Nothing was uploaded ({err}). Choose a contract spreadsheet first."
            ));
            let page =
                state.sessions.read_session(&session.id, |s| IndexPage::build(s, vec![notice]));
            return Ok(session.attach((err.status_code(), Html(page.render()?))));
        }
    };
    let ingested = ingest_bytes(&file_name, &bytes, &state.config.columns);

    let (status, page) = state.sessions.with_session(&session.id, |s| match ingested {
        Ok(Ingested { records, summary }) => {
            s.load_contracts(records, summary.dropped_rows);
            let mut notice = format!(
                "Loaded {} contracts for {} salespeople.",
                summary.accepted_rows,
                summary.salespeople.len()
            );
            if summary.dropped_rows > 0 {
                notice.push_str(&format!(
                    " {} rows were skipped because a required field was empty or not a number.",
                    summary.dropped_rows
                ));
            }
            (StatusCode::OK, IndexPage::build(s, vec![Notice::success(notice)]))
        }
        Err(err) => {
            warn!(error = %err, "upload rejected");
            s.reset();
            let err = WebError::from(err);
            let notice = Notice::error(format!(
                "The file could not be read. Check that it has the expected layout. {err}"
            ));
            (err.status_code(), IndexPage::build(s, vec![notice]))
        }
    });

    Ok(session.attach((status, Html(page.render()?))))
}

async fn read_upload(multipart: &mut Multipart) -> WebResult<(String, Vec<u8>)> {
    while let Some(field) =
        multipart.next_field().await.map_err(|e| WebError::validation("file", e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await.map_err(|e| WebError::validation("file", e.to_string()))?;
        if file_name.is_empty() && bytes.is_empty() {
            break;
        }
        return Ok((file_name, bytes.to_vec()));
    }
    Err(WebError::validation("file", "no file was selected"))
}

#[instrument(skip_all, fields(session_id = %session.id, salesperson = %form.salesperson))]
pub async fn fixed_income(
    State(state): State<Arc<AppState>>,
    session: SessionId,
    Form(form): Form<FixedIncomeForm>,
) -> WebResult<Response> {
    let amounts = parse_money("salary", &form.salary)
        .and_then(|salary| Ok((salary, parse_money("stipend", &form.stipend)?)));

    let (status, page) = state.sessions.with_session(&session.id, |s| {
        let outcome = amounts.and_then(|(salary, stipend)| {
            s.set_fixed_income(&form.salesperson, salary, stipend).map_err(WebError::from)
        });
        match outcome {
            Ok(()) => {
                info!("fixed income updated");
                let notice = Notice::success(format!(
                    "Saved fixed income for {}.",
                    apportion_io::title_case(&form.salesperson)
                ));
                (StatusCode::OK, IndexPage::build(s, vec![notice]))
            }
            Err(err) => {
                warn!(error = %err, "fixed income rejected");
                (err.status_code(), IndexPage::build(s, vec![Notice::error(err.to_string())]))
            }
        }
    });

    Ok(session.attach((status, Html(page.render()?))))
}

/// Empty inputs count as zero, like an untouched number field.
fn parse_money(field: &str, raw: &str) -> WebResult<f64> {
    if raw.trim().is_empty() {
        return Ok(0.0);
    }
    parse_amount(raw).ok_or_else(|| WebError::validation(field, format!("'{raw}' is not a number")))
}

#[instrument(skip_all, fields(session_id = %session.id))]
pub async fn results(
    State(state): State<Arc<AppState>>,
    session: SessionId,
    Query(query): Query<ResultsQuery>,
) -> WebResult<Response> {
    let requested = query.salesperson.filter(|s| !s.is_empty());
    let page =
        state.sessions.read_session(&session.id, |s| ResultsPage::build(s, requested.as_deref()));
    Ok(session.attach(Html(page.render()?)))
}

#[instrument(skip_all, fields(session_id = %session.id, salesperson = %query.salesperson))]
pub async fn export(
    State(state): State<Arc<AppState>>,
    session: SessionId,
    Query(query): Query<SalespersonQuery>,
) -> WebResult<Response> {
    let report = state.sessions.read_session(&session.id, |s| s.report(&query.salesperson))?;
    let bytes = write_export(&report.results)?;
    info!(rows = report.results.len(), bytes = bytes.len(), "exported allocation");

    let disposition = format!("attachment; filename=\"{}\"", export_file_name(&query.salesperson));
    let headers = [(CONTENT_TYPE, "text/csv; charset=utf-8".to_string()), (CONTENT_DISPOSITION, disposition)];
    Ok(session.attach((headers, bytes)))
}

#[instrument(skip_all, fields(session_id = %session.id))]
pub async fn api_session(State(state): State<Arc<AppState>>, session: SessionId) -> Response {
    let view = state.sessions.read_session(&session.id, |s| SessionView {
        ingestion: s.ingestion_summary(),
        salespeople: s.summaries(),
    });
    session.attach(Json(view))
}

#[instrument(skip_all, fields(session_id = %session.id, salesperson = %query.salesperson))]
pub async fn api_report(
    State(state): State<Arc<AppState>>,
    session: SessionId,
    Query(query): Query<SalespersonQuery>,
) -> WebResult<Response> {
    let report: AllocationReport =
        state.sessions.read_session(&session.id, |s| s.report(&query.salesperson))?;
    Ok(session.attach(Json(report)))
}

#[instrument(skip_all, fields(session_id = %session.id))]
pub async fn reset(State(state): State<Arc<AppState>>, session: SessionId) -> Response {
    state.sessions.remove(&session.id);
    session.attach(Redirect::to("/"))
}

pub async fn health() -> impl IntoResponse {
    "OK"
}
