//! The data driver and grouping pass: turning a page's root bands, a data
//! source's record list, and a consecutive-equal grouping expression into
//! a sequence of placed bands.
//!
//! Grounded on original_source `Band.prepare`/`GroupHeader.prepare_group`
//! (`reptile/_engine.py`): a root band is either driven once (ordinary
//! bands, `ReportSummary`), once per row of its data source (`DataBand`),
//! or once per consecutive run of an equal grouping value (`GroupHeader`,
//! recursively for nested groups), plus the `&mut dyn FnMut` closure-based
//! placement idiom already established in `layout::page_layouter`.

use crate::context::Context;
use crate::engine::PrepareOptions;
use crate::error::{ReportError, Result};
use crate::expr::{RenderMode, Template};
use crate::layout::PageLayouter;
use crate::model::band::{Band, DataBand, DataBandSource};
use crate::model::{BandObject, Page, Report};
use crate::prepared::PreparedBand;
use crate::render::{self, CompiledObject};
use crate::subreport;
use crate::value::Value;

/// Every band on `page` that the top-level pass drives directly: not
/// referenced as another band's header/footer/child/group target, not a
/// page-singleton producer (`PageHeader`/`PageFooter`/`ReportTitle`,
/// handled separately as layouter producers), and, for a `DataBand`,
/// not owned by a `GroupHeader`. `ReportSummary` is deliberately treated
/// as an ordinary root rather than folded into the singleton-producer
/// mechanism: `Band::is_page_singleton()` groups print cardinality, not
/// placement mechanism, and `ReportSummary` is placed in its declared
/// position like any other band.
pub(crate) fn classify_roots(page: &Page) -> Vec<usize> {
    let mut owned = vec![false; page.len()];
    for band in page.bands() {
        match band {
            Band::DataBand(d) => {
                if let Some(h) = d.header {
                    owned[h] = true;
                }
                if let Some(f) = d.footer {
                    owned[f] = true;
                }
            }
            Band::GroupHeader(g) => {
                if let Some(c) = g.child {
                    owned[c] = true;
                }
                if let Some(f) = g.footer {
                    owned[f] = true;
                }
            }
            _ => {}
        }
        if let Some(child) = band.common().child_band {
            owned[child] = true;
        }
    }

    (0..page.len())
        .filter(|&index| {
            if owned[index] {
                return false;
            }
            match page.band(index) {
                Band::PageHeader(_) | Band::PageFooter(_) | Band::ReportTitle(_) => false,
                Band::Header(_) | Band::Footer(_) | Band::GroupFooter(_) | Band::ChildBand(_) => false,
                Band::DataBand(d) => d.group_header.is_none(),
                _ => true,
            }
        })
        .collect()
}

/// Drive every root band of a page, in declaration order.
pub(crate) fn drive_page_roots(
    report: &Report,
    page_index: usize,
    all_compiled: &[Vec<Vec<CompiledObject>>],
    layouter: &mut PageLayouter,
    ctx: &mut Context,
    options: &PrepareOptions,
) -> Result<()> {
    let page = report.page(page_index);
    for root in classify_roots(page) {
        drive_root(report, page_index, all_compiled, root, layouter, ctx, options)?;
    }
    Ok(())
}

fn drive_root(
    report: &Report,
    page_index: usize,
    all_compiled: &[Vec<Vec<CompiledObject>>],
    band_index: usize,
    layouter: &mut PageLayouter,
    ctx: &mut Context,
    options: &PrepareOptions,
) -> Result<()> {
    let page = report.page(page_index);
    match page.band(band_index) {
        Band::DataBand(_) => drive_data_band(report, page_index, all_compiled, band_index, layouter, ctx, options),
        Band::GroupHeader(_) => drive_group(report, page_index, all_compiled, band_index, None, layouter, ctx, options),
        _ => place_band_by_index(report, page_index, all_compiled, band_index, layouter, ctx, options),
    }
}

fn drive_data_band(
    report: &Report,
    page_index: usize,
    all_compiled: &[Vec<Vec<CompiledObject>>],
    band_index: usize,
    layouter: &mut PageLayouter,
    ctx: &mut Context,
    options: &PrepareOptions,
) -> Result<()> {
    let page = report.page(page_index);
    let Band::DataBand(data_band) = page.band(band_index) else {
        unreachable!("drive_data_band only ever runs for a DataBand index")
    };
    let records = records_for_source(&data_band.source, ctx);
    let header = data_band.header;
    let footer = data_band.footer;
    let child_band = page.band(band_index).common().child_band;
    drive_rows(
        report, page_index, all_compiled, band_index, header, footer, child_band, &records, layouter, ctx, options,
    )
}

/// Place `data_band_index` once per element of `records`, binding
/// `record`/`row`/`line`/`even`/`odd` for each, wrapped by a header
/// (once, before the first row) and a footer (once, after the last);
/// neither prints when `records` is empty. `child_band`, if set, is
/// placed right after the data band itself on every row.
#[allow(clippy::too_many_arguments)]
fn drive_rows(
    report: &Report,
    page_index: usize,
    all_compiled: &[Vec<Vec<CompiledObject>>],
    data_band_index: usize,
    header: Option<usize>,
    footer: Option<usize>,
    child_band: Option<usize>,
    records: &[Value],
    layouter: &mut PageLayouter,
    ctx: &mut Context,
    options: &PrepareOptions,
) -> Result<()> {
    if records.is_empty() {
        return Ok(());
    }

    if let Some(header_index) = header {
        place_band_by_index(report, page_index, all_compiled, header_index, layouter, ctx, options)?;
    }

    for (i, record) in records.iter().enumerate() {
        ctx.bind_record(record.clone(), (i + 1) as i64);
        place_band_by_index(report, page_index, all_compiled, data_band_index, layouter, ctx, options)?;
        if let Some(child_index) = child_band {
            place_band_by_index(report, page_index, all_compiled, child_index, layouter, ctx, options)?;
        }
    }

    if let Some(footer_index) = footer {
        place_band_by_index(report, page_index, all_compiled, footer_index, layouter, ctx, options)?;
    }

    Ok(())
}

/// Walk through nested group headers to the `DataBand` that ultimately
/// drives them, so the outermost group's grouping source can be
/// resolved without a caller-supplied scope.
fn resolve_data_band<'p>(page: &'p Page, mut index: usize) -> Result<&'p DataBand> {
    loop {
        match page.band(index) {
            Band::DataBand(d) => return Ok(d),
            Band::GroupHeader(g) => {
                index = g.child.expect("finalize() rejects orphan group headers")
            }
            other => {
                return Err(ReportError::UnknownBandReference(
                    other.common().name.clone().unwrap_or_default(),
                    "data band".to_string(),
                ))
            }
        }
    }
}

fn records_for_source(source: &DataBandSource, ctx: &Context) -> Vec<Value> {
    match source {
        DataBandSource::RowCount(n) => (0..*n).map(|_| Value::Null).collect(),
        DataBandSource::DataSource(name) => match ctx.get(name) {
            Some(Value::List(items)) => items.clone(),
            Some(other) => vec![other.clone()],
            None => Vec::new(),
        },
    }
}

/// Render a grouping expression against a single candidate record and
/// return its text form, used as the equality key for a consecutive run.
/// Leaves `record`/`row`/`line` bound to `record` as a side effect, safe
/// since every subsequent consumer rebinds before reading them.
fn group_key(expr: &Template, record: &Value, ctx: &mut Context) -> String {
    ctx.bind_record(record.clone(), 1);
    let (text, _) = expr.render(&*ctx, RenderMode::All, "");
    text
}

/// Build a group-header reprint callback that owns every piece of data
/// it needs (cloned compiled objects, a cloned [`PrepareOptions`]), so it
/// can be registered with the layouter, which holds new-page callbacks
/// for as long as it lives, without tying `drive_group`'s borrow of
/// `report`/`all_compiled` to the layouter's lifetime. Grounded on
/// original_source `GroupHeader.prepare_group`'s `new_page_callback`,
/// which closes over the group header's own `prepare()` bound method.
fn make_reprint_callback<'ctx>(
    kind: &'static str,
    height: f64,
    width: f64,
    background: Option<crate::graphics::Color>,
    compiled: Vec<CompiledObject>,
    options: PrepareOptions,
) -> crate::layout::NewPageCallback<'ctx> {
    Box::new(move |layouter: &mut PageLayouter<'ctx>, ctx: &mut Context| {
        let mut producer = |ctx: &mut Context| {
            let mut deferred = Vec::new();
            let objects = render::render_objects(&compiled, ctx, &options, &mut deferred);
            let mut prepared = PreparedBand::new(kind, 0.0, 0.0, width, height);
            if let Some(color) = background {
                prepared = prepared.with_background(color);
            }
            prepared.objects = objects;
            Ok((prepared, deferred))
        };
        layouter.place_band(ctx, &mut producer)
    })
}

/// Drive a `GroupHeader`: partition `scope` (or, for the outermost call,
/// the full record list of the data source it eventually owns) into
/// consecutive-equal runs by its grouping expression, printing the group
/// header once per run, then driving the run through the owned child
/// (another nested `GroupHeader`, recursively, or the terminal
/// `DataBand`), then the group footer once per run.
///
/// Before the header itself is placed, a run whose header-plus-first-row
/// wouldn't fit the remaining page forces a page break first (an
/// orphaned group header is never printed alone at the
/// bottom of a page), and a new-page callback is registered for the
/// duration of the run so the header reprints atop any continuation page
/// the run's children spill onto.
#[allow(clippy::too_many_arguments)]
fn drive_group(
    report: &Report,
    page_index: usize,
    all_compiled: &[Vec<Vec<CompiledObject>>],
    group_index: usize,
    scope: Option<Vec<Value>>,
    layouter: &mut PageLayouter,
    ctx: &mut Context,
    options: &PrepareOptions,
) -> Result<()> {
    let page = report.page(page_index);
    let Band::GroupHeader(group) = page.band(group_index) else {
        unreachable!("drive_group only ever runs for a GroupHeader index")
    };
    let child = group.child.expect("finalize() rejects orphan group headers");
    let footer = group.footer;
    let grouping_source = group
        .grouping_source()
        .expect("finalize() rejects a group header with neither expression nor field");
    let expr = Template::compile(&format!("{{{{ {grouping_source} }}}}"))?;
    let header_height = page.band(group_index).height();
    let first_row_height = page.band(child).height();

    let is_outermost = scope.is_none();
    let records = match scope {
        Some(records) => records,
        None => records_for_source(&resolve_data_band(page, child)?.source, ctx),
    };

    let mut start = 0usize;
    while start < records.len() {
        let key = group_key(&expr, &records[start], ctx);
        let mut end = start + 1;
        while end < records.len() && group_key(&expr, &records[end], ctx) == key {
            end += 1;
        }
        let run = records[start..end].to_vec();

        ctx.bind_group(run.clone());
        ctx.bind_record(run[0].clone(), 1);

        if !layouter.would_fit(header_height + first_row_height) {
            layouter.new_page(ctx)?;
        }

        let reprint = make_reprint_callback(
            band_kind_name(page.band(group_index)),
            header_height,
            page.band(group_index).common().width.unwrap_or_else(|| default_band_width(page)),
            page.band(group_index).common().background,
            all_compiled[page_index][group_index].clone(),
            options.clone(),
        );
        let callback_handle = layouter.add_new_page_callback(reprint);

        place_band_by_index(report, page_index, all_compiled, group_index, layouter, ctx, options)?;

        match page.band(child) {
            // A group-driven `DataBand` never prints its own header/footer
            // per run: those only print when the band has no group header.
            // Its footer prints exactly once, after the outermost group
            // finishes, not once per run, handled below the loop.
            Band::DataBand(_) => {
                let nested_child = page.band(child).common().child_band;
                drive_rows(
                    report, page_index, all_compiled, child, None, None, nested_child, &run, layouter, ctx, options,
                )?;
            }
            Band::GroupHeader(_) => {
                drive_group(report, page_index, all_compiled, child, Some(run.clone()), layouter, ctx, options)?;
            }
            _ => {}
        }

        layouter.remove_new_page_callback(callback_handle);

        if let Some(footer_index) = footer {
            place_band_by_index(report, page_index, all_compiled, footer_index, layouter, ctx, options)?;
        }

        start = end;
    }

    // Outermost group only: the terminal data band's own footer (if any)
    // prints once here, after every run of every nested group has been
    // driven, not per run, which `drive_rows` would otherwise do.
    if is_outermost {
        if let Some(footer_index) = resolve_data_band(page, child)?.footer {
            place_band_by_index(report, page_index, all_compiled, footer_index, layouter, ctx, options)?;
        }
    }

    Ok(())
}

fn band_kind_name(band: &Band) -> &'static str {
    match band {
        Band::PageHeader(_) => "PageHeader",
        Band::PageFooter(_) => "PageFooter",
        Band::ReportTitle(_) => "ReportTitle",
        Band::ReportSummary(_) => "ReportSummary",
        Band::Header(_) => "Header",
        Band::Footer(_) => "Footer",
        Band::DataBand(_) => "DataBand",
        Band::GroupHeader(_) => "GroupHeader",
        Band::GroupFooter(_) => "GroupFooter",
        Band::ChildBand(_) => "ChildBand",
    }
}

fn default_band_width(page: &Page) -> f64 {
    let content = page.content_size();
    (content.width - page.margins.left - page.margins.right).max(0.0)
}

/// Build a one-shot or reusable producer for `page.band(index)`. Reused
/// both for per-row/per-group placement (short borrow, through
/// [`place_band_by_index`]) and for the layouter's page-singleton
/// producers (page header/footer/report title), which borrow `page` and
/// `compiled` for as long as the layouter itself lives.
pub(crate) fn make_producer<'a>(
    page: &'a Page,
    index: usize,
    compiled: &'a [CompiledObject],
    options: &'a PrepareOptions,
) -> crate::layout::BandProducer<'a> {
    let band = page.band(index);
    let common = band.common();
    let kind = band_kind_name(band);
    let height = common.height;
    let width = common.width.unwrap_or_else(|| default_band_width(page));
    let background = common.background;

    Box::new(move |ctx: &mut Context| {
        let mut deferred = Vec::new();
        let objects = render::render_objects(compiled, ctx, options, &mut deferred);
        let mut prepared = PreparedBand::new(kind, 0.0, 0.0, width, height);
        if let Some(color) = background {
            prepared = prepared.with_background(color);
        }
        prepared.objects = objects;
        Ok((prepared, deferred))
    })
}

/// Place a single band, then drive any `Subreport` object it carries at
/// its own bounds offset from the band's placed position, restoring the
/// host cursor once the target page's root bands have been driven.
fn place_band_by_index(
    report: &Report,
    page_index: usize,
    all_compiled: &[Vec<Vec<CompiledObject>>],
    band_index: usize,
    layouter: &mut PageLayouter,
    ctx: &mut Context,
    options: &PrepareOptions,
) -> Result<()> {
    let page = report.page(page_index);
    let compiled = &all_compiled[page_index][band_index];
    let mut producer = make_producer(page, band_index, compiled, options);
    if page.band(band_index).common().print_on_bottom {
        layouter.place_band_bottom(ctx, &mut producer)?;
    } else {
        layouter.place_band(ctx, &mut producer)?;
    }

    for object in &page.band(band_index).common().objects {
        if let BandObject::Subreport(sub) = object {
            let target_index = report
                .page_index_by_name(&sub.page_name)
                .ok_or_else(|| ReportError::UnknownSubreportPage(sub.page_name.clone()))?;
            let (parent_left, parent_top) = layouter
                .last_band_bounds()
                .expect("the band just placed above is always the most recent one");
            let cursor = (sub.bounds.left + parent_left, sub.bounds.top + parent_top);
            subreport::drive(report, all_compiled, target_index, cursor, layouter, ctx, options)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::band::{BandCommon, DataBand, DataBandSource, GroupFooterBand, GroupHeaderBand};
    use crate::model::object::{BandObject, ObjectBox, TextObject};
    use crate::model::Page;

    fn text_band(height: f64, template: &str) -> BandCommon {
        BandCommon::new(height).with_objects(vec![BandObject::Text(TextObject::new(
            ObjectBox::new(0.0, 0.0, 100.0, height),
            template,
        ))])
    }

    #[test]
    fn classify_roots_excludes_owned_and_singleton_bands() {
        let mut page = Page::new();
        page.add_band(Band::PageHeader(BandCommon::new(10.0)));
        let data_band = page.add_band(Band::DataBand(DataBand {
            common: text_band(10.0, "{{ line }}").named("DB1"),
            source: DataBandSource::RowCount(1),
            header: None,
            footer: None,
            group_header: None,
        }));
        let header = page.add_band(Band::Header(BandCommon::new(5.0)));
        page.link_header(data_band, header).unwrap();

        let roots = classify_roots(&page);
        assert_eq!(roots, vec![data_band]);
    }

    #[test]
    fn classify_roots_treats_report_summary_as_an_ordinary_root() {
        let mut page = Page::new();
        let summary = page.add_band(Band::ReportSummary(BandCommon::new(10.0)));
        let roots = classify_roots(&page);
        assert_eq!(roots, vec![summary]);
    }

    #[test]
    fn classify_roots_excludes_data_band_owned_by_group_header() {
        let mut page = Page::new();
        let data_band = page.add_band(Band::DataBand(DataBand {
            common: text_band(10.0, "{{ record }}").named("DB1"),
            source: DataBandSource::DataSource("orders".to_string()),
            header: None,
            footer: None,
            group_header: None,
        }));
        let group_header = page.add_band(Band::GroupHeader(GroupHeaderBand {
            common: BandCommon::new(15.0).named("GH1"),
            expression: Some("record".to_string()),
            field: None,
            child: None,
            footer: None,
        }));
        page.link_group_header(data_band, group_header).unwrap();

        let roots = classify_roots(&page);
        assert_eq!(roots, vec![group_header]);
    }

    #[test]
    fn grouping_splits_into_consecutive_equal_runs() {
        let mut page = Page::new();
        page.size = crate::units::PaperSize::new(200.0, 400.0);
        page.margins = crate::units::Margins::new(0.0, 0.0, 0.0, 0.0);

        let data_band = page.add_band(Band::DataBand(DataBand {
            common: text_band(10.0, "{{ record.category }}").named("DB1"),
            source: DataBandSource::DataSource("items".to_string()),
            header: None,
            footer: None,
            group_header: None,
        }));
        let group_header = page.add_band(Band::GroupHeader(GroupHeaderBand {
            common: text_band(10.0, "{{ record.category }}").named("GH1"),
            expression: Some("record.category".to_string()),
            field: None,
            child: None,
            footer: None,
        }));
        let group_footer = page.add_band(Band::GroupFooter(GroupFooterBand {
            common: BandCommon::new(5.0),
            group_header: None,
        }));
        page.link_group_header(data_band, group_header).unwrap();
        page.link_group_footer(group_header, group_footer).unwrap();

        let mut report = Report::new("grouped");
        report.add_page(page);
        report.register_data_source(Box::new(crate::data::VecDataSource::new(
            "items",
            vec![
                Value::Map(one_field("category", Value::from("A"))),
                Value::Map(one_field("category", Value::from("A"))),
                Value::Map(one_field("category", Value::from("B"))),
            ],
        )));

        let document = crate::engine::prepare(&mut report, &crate::engine::PrepareOptions::new()).unwrap();
        let kinds: Vec<&str> = document.pages()[0].bands().iter().map(|b| b.kind.as_str()).collect();
        assert_eq!(
            kinds,
            vec!["GroupHeader", "DataBand", "DataBand", "GroupFooter", "GroupHeader", "DataBand", "GroupFooter"]
        );
    }

    fn one_field(key: &str, value: Value) -> std::collections::HashMap<String, Value> {
        let mut map = std::collections::HashMap::new();
        map.insert(key.to_string(), value);
        map
    }

    #[test]
    fn grouped_data_band_footer_prints_once_after_the_outermost_group() {
        let mut page = Page::new();
        page.size = crate::units::PaperSize::new(200.0, 400.0);
        page.margins = crate::units::Margins::new(0.0, 0.0, 0.0, 0.0);

        let data_footer = page.add_band(Band::Footer(text_band(5.0, "total")));
        let data_band = page.add_band(Band::DataBand(DataBand {
            common: text_band(10.0, "{{ record.category }}").named("DB1"),
            source: DataBandSource::DataSource("items".to_string()),
            header: None,
            footer: None,
            group_header: None,
        }));
        page.link_footer(data_band, data_footer).unwrap();

        let group_header = page.add_band(Band::GroupHeader(GroupHeaderBand {
            common: text_band(10.0, "{{ record.category }}").named("GH1"),
            expression: Some("record.category".to_string()),
            field: None,
            child: None,
            footer: None,
        }));
        page.link_group_header(data_band, group_header).unwrap();

        let mut report = Report::new("grouped-with-footer");
        report.add_page(page);
        report.register_data_source(Box::new(crate::data::VecDataSource::new(
            "items",
            vec![
                Value::Map(one_field("category", Value::from("A"))),
                Value::Map(one_field("category", Value::from("A"))),
                Value::Map(one_field("category", Value::from("B"))),
            ],
        )));

        let document = crate::engine::prepare(&mut report, &crate::engine::PrepareOptions::new()).unwrap();
        let kinds: Vec<&str> = document.pages()[0].bands().iter().map(|b| b.kind.as_str()).collect();
        // The data band's own footer must not appear after each group run,
        // only once, at the very end.
        assert_eq!(
            kinds,
            vec!["GroupHeader", "DataBand", "DataBand", "GroupHeader", "DataBand", "Footer"]
        );
    }
}
