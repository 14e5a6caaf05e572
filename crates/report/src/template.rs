//! HTML rendering of the estimate report.

use priceopt_core::comps::{days_ago, select_report_comps};
use priceopt_core::format::{
    format_baths, format_distance_km, format_money, format_optional_money, format_range,
    format_timestamp,
};
use priceopt_core::types::{Comp, EstimateResult, Timestamp, PLACEHOLDER_ADDRESS};
use serde::Serialize;
use tera::{Context, Tera};

use crate::error::ReportError;

const TEMPLATE_NAME: &str = "report.html";
const TEMPLATE: &str = include_str!("../templates/report.html");

pub const REPORT_TITLE: &str = "Price Optimizer Report";
pub const BRAND: &str = "Price Optimizer";
pub const FOOTNOTE: &str = "Adjustments are made for size, condition, and recency to provide a \
fair market estimate. This report is for informational purposes only.";

/// Fully formatted values fed to the template.
#[derive(Debug, Serialize)]
pub struct ReportView {
    pub title: &'static str,
    pub brand: &'static str,
    pub address: String,
    pub created_at: String,
    pub range: String,
    pub point_estimate: String,
    pub confidence_level: &'static str,
    pub confidence_label: &'static str,
    pub comps: Vec<CompRow>,
    pub footnote: &'static str,
}

/// One row of the comparables table.
#[derive(Debug, Serialize)]
pub struct CompRow {
    pub address: String,
    pub distance_km: String,
    pub beds: i64,
    pub baths: String,
    pub sqft: i64,
    pub adjusted_price: String,
    pub days_ago: i64,
}

impl CompRow {
    fn new(comp: &Comp, now: Timestamp) -> Self {
        Self {
            address: comp.address.clone(),
            distance_km: format_distance_km(comp.distance_km),
            beds: comp.beds,
            baths: format_baths(comp.baths),
            sqft: comp.sqft,
            adjusted_price: format_optional_money(comp.adjusted_price),
            days_ago: days_ago(comp.closed_or_listed_date, now),
        }
    }
}

impl ReportView {
    /// Build the view for `result`, with "days ago" measured from `now`.
    pub fn new(result: &EstimateResult, now: Timestamp) -> Self {
        Self {
            title: REPORT_TITLE,
            brand: BRAND,
            address: result
                .primary_address()
                .map(str::to_string)
                .unwrap_or_else(|| capitalize(PLACEHOLDER_ADDRESS)),
            created_at: format_timestamp(result.created_at),
            range: format_range(result.range_low, result.range_high),
            point_estimate: format_money(result.point_estimate),
            confidence_level: result.confidence.as_str(),
            confidence_label: result.confidence.badge_label(),
            comps: select_report_comps(&result.comps)
                .iter()
                .map(|c| CompRow::new(c, now))
                .collect(),
            footnote: FOOTNOTE,
        }
    }
}

/// Render the report HTML for `result`.
///
/// Values are HTML-escaped by the template engine.
pub fn render_report_html(result: &EstimateResult, now: Timestamp) -> Result<String, ReportError> {
    let mut tera = Tera::default();
    tera.add_raw_template(TEMPLATE_NAME, TEMPLATE)?;

    let context = Context::from_serialize(ReportView::new(result, now))?;
    Ok(tera.render(TEMPLATE_NAME, &context)?)
}

/// Upper-case the first character, for the placeholder shown as a heading.
fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
