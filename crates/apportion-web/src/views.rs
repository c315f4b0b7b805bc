//! Page models rendered by askama.
//!
//! Everything a template shows is formatted here, from the raw numbers held by
//! the session. Templates never see an `f64`.

use apportion_calculator::{AllocationReport, Session};
use apportion_io::{format_currency, format_percent, title_case};
use askama::Template;

#[derive(Debug, Clone)]
pub struct Notice {
    pub kind: &'static str,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self { kind: "success", message: message.into() }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self { kind: "info", message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { kind: "error", message: message.into() }
    }
}

#[derive(Debug, Clone)]
pub struct UploadView {
    pub accepted_rows: usize,
    pub dropped_rows: usize,
    pub salespeople: usize,
}

#[derive(Debug, Clone)]
pub struct ContractRow {
    pub salesperson: String,
    pub contract_id: String,
    pub amount: String,
}

/// Fixed-income inputs and running totals for one salesperson.
#[derive(Debug, Clone)]
pub struct SalespersonInput {
    pub name: String,
    pub display_name: String,
    pub contract_count: usize,
    pub contract_total: String,
    /// Plain `1234.50` form for `<input type="number">`.
    pub salary: String,
    pub stipend: String,
    pub fixed_total: String,
    pub grand_total: String,
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexPage {
    pub notices: Vec<Notice>,
    pub upload: Option<UploadView>,
    pub contracts: Vec<ContractRow>,
    pub inputs: Vec<SalespersonInput>,
}

impl IndexPage {
    pub fn build(session: &Session, notices: Vec<Notice>) -> Self {
        if !session.has_contracts() {
            return Self { notices, upload: None, contracts: Vec::new(), inputs: Vec::new() };
        }

        let summary = session.ingestion_summary();
        let upload = UploadView {
            accepted_rows: summary.accepted_rows,
            dropped_rows: summary.dropped_rows,
            salespeople: summary.salespeople.len(),
        };
        let contracts = session
            .contracts()
            .iter()
            .map(|c| ContractRow {
                salesperson: c.salesperson.clone(),
                contract_id: c.contract_id.clone(),
                amount: format_currency(c.amount),
            })
            .collect();
        let inputs = session
            .summaries()
            .into_iter()
            .map(|s| SalespersonInput {
                display_name: title_case(&s.salesperson),
                name: s.salesperson,
                contract_count: s.contract_count,
                contract_total: format_currency(s.contract_total),
                salary: format!("{:.2}", s.fixed_income.salary),
                stipend: format!("{:.2}", s.fixed_income.stipend),
                fixed_total: format_currency(s.fixed_income.total()),
                grand_total: format_currency(s.grand_total),
            })
            .collect();

        Self { notices, upload: Some(upload), contracts, inputs }
    }
}

#[derive(Debug, Clone)]
pub struct SelectOption {
    pub name: String,
    pub display_name: String,
    pub selected: bool,
}

#[derive(Debug, Clone)]
pub struct ResultRow {
    pub contract_id: String,
    pub amount: String,
    pub proportion: String,
    pub allocated: String,
}

#[derive(Debug, Clone)]
pub struct ReportView {
    pub name: String,
    pub display_name: String,
    pub salary: String,
    pub stipend: String,
    pub fixed_total: String,
    pub contract_total: String,
    pub grand_total: String,
    pub rows: Vec<ResultRow>,
    pub allocated_sum: String,
}

impl ReportView {
    fn from_report(report: &AllocationReport) -> Self {
        let summary = &report.summary;
        Self {
            name: summary.salesperson.clone(),
            display_name: title_case(&summary.salesperson),
            salary: format_currency(summary.fixed_income.salary),
            stipend: format_currency(summary.fixed_income.stipend),
            fixed_total: format_currency(summary.fixed_income.total()),
            contract_total: format_currency(summary.contract_total),
            grand_total: format_currency(summary.grand_total),
            rows: report
                .results
                .iter()
                .map(|r| ResultRow {
                    contract_id: r.contract_id.clone(),
                    amount: format_currency(r.contract_amount),
                    proportion: format_percent(r.proportion),
                    allocated: format_currency(r.allocated_amount),
                })
                .collect(),
            allocated_sum: format_currency(report.allocated_sum),
        }
    }
}

#[derive(Template)]
#[template(path = "results.html")]
pub struct ResultsPage {
    pub notices: Vec<Notice>,
    pub options: Vec<SelectOption>,
    pub report: Option<ReportView>,
}

impl ResultsPage {
    /// Results for `requested`, or for the first salesperson when none is given.
    pub fn build(session: &Session, requested: Option<&str>) -> Self {
        let salespeople = session.salespeople();
        if salespeople.is_empty() {
            return Self {
                notices: vec![Notice::info(
                    "Waiting for a contract spreadsheet. Upload one on the first page.",
                )],
                options: Vec::new(),
                report: None,
            };
        }

        let selected = requested
            .map(str::to_string)
            .or_else(|| salespeople.first().cloned())
            .unwrap_or_default();
        let options = salespeople
            .iter()
            .map(|name| SelectOption {
                name: name.clone(),
                display_name: title_case(name),
                selected: *name == selected,
            })
            .collect();

        match session.report(&selected) {
            Ok(report) => {
                Self { notices: Vec::new(), options, report: Some(ReportView::from_report(&report)) }
            }
            Err(err) => Self {
                notices: vec![Notice::info(format!(
                    "Salesperson '{selected}' has no contracts with a positive total, so there \
                     is nothing to allocate ({err})."
                ))],
                options,
                report: None,
            },
        }
    }
}
