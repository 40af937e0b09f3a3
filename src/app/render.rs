//! Plain-text rendering of catalog state for the terminal.

use std::fmt::Write as _;

use serde::Serialize;

use culture_read_core::catalog::{Card, CatalogView, Facet, FacetSummary, FilterState, PageControls};
use culture_read_core::record::{DateLocale, FacetDimension};
use culture_read_core::session::{CatalogSession, RenderState};

pub(crate) const LOADING_TEXT: &str = "กำลังโหลด…";
pub(crate) const NO_RESULTS_TEXT: &str = "ไม่พบรายการที่ตรงกับเงื่อนไข";

const DESCRIPTION_PREVIEW_CHARS: usize = 160;

/// Error banner shown in place of the grid.
pub(crate) fn error_text(message: &str) -> String {
    format!("เกิดข้อผิดพลาด: {message}")
}

/// "N results" header, with thousands separators.
pub(crate) fn result_count_line(total: usize) -> String {
    format!("พบผลลัพธ์ทั้งหมด {} รายการ", group_thousands(total))
}

pub(crate) fn group_thousands(value: usize) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

fn facet_title(dimension: FacetDimension) -> &'static str {
    match dimension {
        FacetDimension::Category => "ประเภทเอกสาร",
        FacetDimension::Language => "ภาษา",
        FacetDimension::Source => "แหล่งข้อมูล",
    }
}

fn preview(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(DESCRIPTION_PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}…")
    } else {
        head
    }
}

pub(crate) fn render_card(card: &Card, out: &mut String) {
    let id = card.id.as_deref().unwrap_or("-");
    let _ = writeln!(out, "[{id}] {}", card.title);
    let _ = writeln!(out, "    {}", card.created);
    if !card.description.is_empty() {
        let _ = writeln!(out, "    {}", preview(&card.description));
    }
    let _ = writeln!(
        out,
        "    thumbnail: {}",
        card.thumbnail.as_deref().unwrap_or("-")
    );
    if card.has_file {
        let _ = writeln!(out, "    open: culture-read open {id}");
    }
}

/// `< 1 [2] 3 4 >` with arrows blanked when disabled.
pub(crate) fn render_pagination(controls: &PageControls) -> String {
    let mut line = String::new();
    line.push_str(if controls.has_previous { "<" } else { " " });
    for number in &controls.numbers {
        if *number == controls.page {
            let _ = write!(line, " [{number}]");
        } else {
            let _ = write!(line, " {number}");
        }
    }
    line.push(' ');
    line.push_str(if controls.has_next { ">" } else { " " });
    let _ = write!(line, "   ({}/{})", controls.page, controls.total_pages);
    line
}

fn render_facet_list(
    out: &mut String,
    dimension: FacetDimension,
    facets: &[Facet],
    filter: Option<&FilterState>,
) {
    let _ = writeln!(out, "{} ({dimension})", facet_title(dimension));
    if facets.is_empty() {
        let _ = writeln!(out, "  -");
        return;
    }
    for facet in facets {
        let marker = match filter {
            Some(filter) if filter.is_selected(dimension, &facet.name) => "[x]",
            Some(_) => "[ ]",
            None => "-",
        };
        let _ = writeln!(
            out,
            "  {marker} {} ({})",
            facet.name,
            group_thousands(facet.count)
        );
    }
}

/// All three facet panels; selected labels are ticked when `filter` is given.
pub(crate) fn render_facets(summary: &FacetSummary, filter: Option<&FilterState>) -> String {
    let mut out = String::new();
    for (index, dimension) in FacetDimension::ALL.iter().enumerate() {
        if index > 0 {
            out.push('\n');
        }
        render_facet_list(&mut out, *dimension, summary.get(*dimension), filter);
    }
    out
}

fn render_grid(view: &CatalogView, locale: DateLocale) -> String {
    let mut out = String::new();
    for (index, card) in view.cards(locale).iter().enumerate() {
        if index > 0 {
            out.push('\n');
        }
        render_card(card, &mut out);
    }
    if let Some(controls) = view.page_controls() {
        out.push('\n');
        out.push_str(&render_pagination(&controls));
        out.push('\n');
    }
    out
}

/// Machine-readable form of one rendered page.
#[derive(Debug, Serialize)]
pub(crate) struct ViewSnapshot<'a> {
    view: &'static str,
    total: usize,
    search: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pagination: Option<PageControls>,
    #[serde(skip_serializing_if = "Option::is_none")]
    facets: Option<&'a FacetSummary>,
    cards: Vec<Card>,
}

impl<'a> ViewSnapshot<'a> {
    pub(crate) fn new(view: &'a CatalogView, locale: DateLocale) -> Self {
        Self {
            view: view.profile().name,
            total: view.filtered().len(),
            search: view.filter().search(),
            pagination: view.page_controls(),
            facets: view.profile().facets_enabled.then(|| view.facets()),
            cards: view.cards(locale),
        }
    }
}

/// The current page as pretty-printed JSON.
pub(crate) fn render_view_json(
    view: &CatalogView,
    locale: DateLocale,
) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&ViewSnapshot::new(view, locale))
}

/// Facet counts as pretty-printed JSON.
pub(crate) fn render_facets_json(summary: &FacetSummary) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(summary)
}

/// Renders the session's current state the way the page would.
pub(crate) fn render_session(session: &CatalogSession, locale: DateLocale) -> String {
    let state = session.render();
    match &state {
        RenderState::Idle => String::new(),
        RenderState::Loading => format!("{LOADING_TEXT}\n"),
        RenderState::Error(message) => format!("{}\n", error_text(message)),
        RenderState::NoResults | RenderState::Grid(_) => {
            let Some(view) = session.view() else {
                return format!("{NO_RESULTS_TEXT}\n");
            };
            let mut out = String::new();
            let _ = writeln!(out, "{}", result_count_line(view.filtered().len()));
            if view.profile().facets_enabled {
                out.push('\n');
                out.push_str(&render_facets(view.facets(), Some(view.filter())));
            }
            out.push('\n');
            if matches!(state, RenderState::NoResults) {
                let _ = writeln!(out, "{NO_RESULTS_TEXT}");
            } else {
                out.push_str(&render_grid(view, locale));
            }
            out
        }
    }
}
