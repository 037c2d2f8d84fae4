//! Top-level preparation orchestration: seed the context, open every data
//! source, drive each page definition's band pass over a shared
//! [`PageLayouter`], then resolve every deferred `${ }` text once
//! `page_count` is known.
//!
//! Grounded on original_source `Report.prepare` (`reptile/_engine.py`):
//! reset state, seed `date`/`time`/`report`/`params`, open every
//! registered data source and bind its full record list under its own
//! name, then call `Page.prepare()` for each non-subreport page in turn,
//! finally resolving `self._pending_objects` against the finished
//! `page_count` — modeled here as [`crate::layout::DeferredEntry`].

use std::sync::Arc;

use chrono::Local;

use crate::context::Context;
use crate::driver;
use crate::error::Result;
use crate::expr::RenderMode;
use crate::layout::PageLayouter;
use crate::model::band::Band;
use crate::model::style::Font;
use crate::model::{Page, Report};
use crate::prepared::{Document, PreparedObject};
use crate::render::{self, CompiledObject};
use crate::units::{Margins, PaperSize};
use crate::value::Value;

/// How much detail a preparation run produces: level 1 only needs row
/// and group counts (no layout, no page breaks, no grow/shrink
/// measurement); `Full` produces a completely laid-out, rendered
/// document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrepareLevel {
    /// Drive every data source and band pass for counts only. The
    /// layouter never breaks pages at this level (see `DESIGN.md`), so
    /// the whole run collapses onto a single physical page per page
    /// definition.
    Counts,
    /// Full layout, pagination, and rendering.
    Full,
}

/// Font metrics callback used for `can_grow`/`can_shrink` text height:
/// `measure(text, font, available_width) -> (width, height)`. Left
/// unset, grow/shrink text keeps its definition height: font metrics are
/// host-injected, not bundled.
pub type MeasureFn = Arc<dyn Fn(&str, &Font, f64) -> (f64, f64) + Send + Sync>;

/// Knobs for a [`prepare`] run.
#[derive(Clone)]
pub struct PrepareOptions {
    /// Substituted for any `{{ }}`/`${ }` segment that fails to
    /// evaluate — missing name, type error, or a helper error. Expression
    /// errors are recoverable, never fatal.
    pub error_placeholder: String,
    pub level: PrepareLevel,
    pub measure: Option<MeasureFn>,
}

impl PrepareOptions {
    pub fn new() -> Self {
        Self {
            error_placeholder: String::from("-"),
            level: PrepareLevel::Full,
            measure: None,
        }
    }

    pub fn with_level(mut self, level: PrepareLevel) -> Self {
        self.level = level;
        self
    }

    pub fn with_measure(mut self, measure: MeasureFn) -> Self {
        self.measure = Some(measure);
        self
    }
}

impl Default for PrepareOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Run a full preparation pass over `report`, producing a paginated,
/// rendered [`Document`]. Idempotent: calling this twice on an untouched
/// `report` with the same `options` and the same host clock tick
/// produces equal documents.
pub fn prepare(report: &mut Report, options: &PrepareOptions) -> Result<Document> {
    report.finalize()?;

    let mut ctx = Context::new();
    seed_context(&mut ctx, report);
    open_data_sources(report, &mut ctx);

    let result = run(report, &mut ctx, options);

    for source in report.data_sources_mut() {
        source.close();
    }

    result
}

fn seed_context(ctx: &mut Context, report: &Report) {
    let now = Local::now().naive_local();
    ctx.seed_report(
        report.name.clone(),
        Value::Date(now.date()),
        Value::DateTime(now),
        report.variables.clone(),
    );
}

/// Bind every registered data source's full record list under its own
/// name. A source with an empty name is never auto-bound (silent skip)
/// — it exists only to be addressed explicitly by a host-registered
/// helper.
fn open_data_sources(report: &mut Report, ctx: &mut Context) {
    for source in report.data_sources_mut() {
        let name = source.name().to_string();
        if name.is_empty() {
            source.open();
            continue;
        }
        let records = source.records().to_vec();
        ctx.set(name, Value::List(records));
    }
}

/// The part of `prepare` that only needs shared access to `report` —
/// split out so the data-source close-out in [`prepare`] can reclaim a
/// `&mut Report` once every borrow taken here has gone out of scope.
fn run(report: &Report, ctx: &mut Context, options: &PrepareOptions) -> Result<Document> {
    let compiled: Vec<Vec<Vec<CompiledObject>>> = report
        .pages()
        .iter()
        .map(|page| {
            page.bands()
                .iter()
                .map(|band| render::compile_band_objects(&band.common().objects))
                .collect::<Result<Vec<_>>>()
        })
        .collect::<Result<Vec<_>>>()?;

    let (content, margins, title_before_header) = report
        .pages()
        .iter()
        .find(|p| !p.is_subreport_target())
        .map(|p| (p.content_size(), p.margins, p.title_before_header))
        .unwrap_or((PaperSize::default(), Margins::default(), false));

    let mut layouter = PageLayouter::new(
        content,
        margins,
        title_before_header,
        options.level != PrepareLevel::Counts,
    );

    for page_index in 0..report.pages().len() {
        if report.page(page_index).is_subreport_target() {
            continue;
        }
        prepare_page(report, page_index, &compiled, &mut layouter, ctx, options)?;
    }

    let (mut document, deferred) = layouter.finish(ctx)?;

    ctx.set_page_count(document.page_count() as i64);
    for entry in deferred {
        // `page_index` must reflect the page the deferred text actually
        // landed on, not whatever page was current when preparation
        // finished — the context is a single mutable scope reused across
        // the whole run (page 7's deferred text must read "Page 7 of
        // 11", not "Page <last> of 11").
        ctx.set_page_index(entry.page_index as i64 + 1);
        let (rendered, errored) = entry.template.render(&*ctx, RenderMode::All, &options.error_placeholder);
        if let Some(page) = document.pages_mut().get_mut(entry.page_index) {
            if let Some(band) = page.bands_mut().get_mut(entry.band_index) {
                if let Some(PreparedObject::Text(text)) = band.objects.get_mut(entry.object_index) {
                    text.text = rendered;
                    text.error |= errored;
                }
            }
        }
    }

    Ok(document)
}

fn prepare_page<'ctx>(
    report: &'ctx Report,
    page_index: usize,
    compiled: &'ctx [Vec<Vec<CompiledObject>>],
    layouter: &mut PageLayouter<'ctx>,
    ctx: &mut Context,
    options: &'ctx PrepareOptions,
) -> Result<()> {
    let page = report.page(page_index);
    layouter.reset_for_page(
        ctx,
        page.content_size(),
        page.margins,
        page.title_before_header,
        options.level != PrepareLevel::Counts,
    )?;
    layouter.set_watermark(page.watermark.clone());

    if let Some(index) = find_singleton(page, |b| matches!(b, Band::PageHeader(_))) {
        layouter.set_page_header(driver::make_producer(page, index, &compiled[page_index][index], options));
    }
    if let Some(index) = find_singleton(page, |b| matches!(b, Band::PageFooter(_))) {
        let height = page.band(index).height();
        layouter.set_page_footer(
            driver::make_producer(page, index, &compiled[page_index][index], options),
            height,
        );
    }
    if let Some(index) = find_singleton(page, |b| matches!(b, Band::ReportTitle(_))) {
        layouter.set_report_title(driver::make_producer(page, index, &compiled[page_index][index], options));
    }

    driver::drive_page_roots(report, page_index, compiled, layouter, ctx, options)
}

fn find_singleton(page: &Page, pred: impl Fn(&Band) -> bool) -> Option<usize> {
    page.bands().iter().position(|b| pred(b))
}
