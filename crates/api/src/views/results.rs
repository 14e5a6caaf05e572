use priceopt_core::booking::booking_link;
use priceopt_core::comps::days_ago;
use priceopt_core::format::{
    format_baths, format_distance_km, format_money, format_optional_money, format_range,
    format_timestamp, range_position_pct,
};
use priceopt_core::types::{Comp, EstimateResult, Timestamp, PLACEHOLDER_ADDRESS};
use serde::Serialize;

use super::pdf_path;

/// Message of the results error state.
pub const NOT_FOUND_MESSAGE: &str = "Estimate not found.";

/// Content of the results panel: exactly one of the error and populated
/// states. The loading state is the page shell itself.
#[derive(Debug, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PanelView {
    Error { message: &'static str },
    Ready(ResultsView),
}

/// Populated results, fully formatted.
#[derive(Debug, Serialize)]
pub struct ResultsView {
    pub id: String,
    pub address: String,
    pub created_at: String,
    pub range: String,
    pub range_low: String,
    pub range_high: String,
    pub point_estimate: String,
    pub confidence_level: &'static str,
    pub confidence_label: &'static str,
    /// Median marker position on the price-insight bar, in percent.
    pub marker_pct: String,
    pub comps: Vec<CompView>,
    pub booking_url: String,
    pub pdf_url: String,
}

#[derive(Debug, Serialize)]
pub struct CompView {
    pub address: String,
    pub distance_km: String,
    pub beds: i64,
    pub baths: String,
    pub sqft: i64,
    pub adjusted_price: String,
    pub days_ago: i64,
}

impl CompView {
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

impl ResultsView {
    pub fn new(result: &EstimateResult, booking_base_url: Option<&str>, now: Timestamp) -> Self {
        let address = result.primary_address().unwrap_or(PLACEHOLDER_ADDRESS);
        let pct = range_position_pct(result.range_low, result.range_high, result.point_estimate);

        Self {
            id: result.id.clone(),
            address: address.to_string(),
            created_at: format_timestamp(result.created_at),
            range: format_range(result.range_low, result.range_high),
            range_low: format_money(result.range_low),
            range_high: format_money(result.range_high),
            point_estimate: format_money(result.point_estimate),
            confidence_level: result.confidence.as_str(),
            confidence_label: result.confidence.badge_label(),
            marker_pct: format!("{pct:.1}"),
            comps: result.comps.iter().map(|c| CompView::new(c, now)).collect(),
            booking_url: booking_link(booking_base_url, address),
            pdf_url: pdf_path(&result.id),
        }
    }
}
