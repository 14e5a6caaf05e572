//! Server-rendered pages.
//!
//! Templates live in `crates/api/templates/` and are compiled into the
//! binary. All interpolated values are HTML-escaped by Tera.

mod form;
mod results;

use std::sync::Arc;

use serde::Serialize;
use tera::{Context, Tera};

pub use form::{FormView, InputField, SelectField, SelectOption};
pub use results::{CompView, PanelView, ResultsView, NOT_FOUND_MESSAGE};

const TEMPLATES: [(&str, &str); 5] = [
    ("layout.html", include_str!("../../templates/layout.html")),
    ("home.html", include_str!("../../templates/home.html")),
    ("estimate_form.html", include_str!("../../templates/estimate_form.html")),
    ("results.html", include_str!("../../templates/results.html")),
    ("results_panel.html", include_str!("../../templates/results_panel.html")),
];

/// Compiled page templates.
#[derive(Clone)]
pub struct Views {
    tera: Arc<Tera>,
}

/// Context of the results page shell.
#[derive(Serialize)]
struct ResultsShell<'a> {
    id: &'a str,
    panel_url: String,
}

impl Views {
    pub fn new() -> Result<Self, tera::Error> {
        let mut tera = Tera::default();
        tera.add_raw_templates(TEMPLATES)?;
        Ok(Self {
            tera: Arc::new(tera),
        })
    }

    pub fn home(&self) -> Result<String, tera::Error> {
        self.tera.render("home.html", &Context::new())
    }

    pub fn estimate_form(&self, form: &FormView) -> Result<String, tera::Error> {
        self.render("estimate_form.html", form)
    }

    /// Results page in its loading state; the content is fetched from
    /// `/results/{id}/panel` by the page script.
    pub fn results_page(&self, id: &str) -> Result<String, tera::Error> {
        let shell = ResultsShell {
            id,
            panel_url: format!("{}/panel", results_path(id)),
        };
        self.render("results.html", &shell)
    }

    pub fn results_panel(&self, panel: &PanelView) -> Result<String, tera::Error> {
        self.render("results_panel.html", panel)
    }

    fn render<T: Serialize>(&self, name: &str, value: &T) -> Result<String, tera::Error> {
        self.tera.render(name, &Context::from_serialize(value)?)
    }
}

/// `/results/{id}` with the id percent-encoded as a path segment.
pub fn results_path(id: &str) -> String {
    format!("/results/{}", priceopt_core::booking::encode_component(id))
}

/// `/api/pdf/{id}` with the id percent-encoded as a path segment.
pub fn pdf_path(id: &str) -> String {
    format!("/api/pdf/{}", priceopt_core::booking::encode_component(id))
}
