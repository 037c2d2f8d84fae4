//! End-to-end scenarios covering the report engine's numbered use cases:
//! build a small report definition through the public model API,
//! prepare it, and assert on the resulting prepared document.

use std::collections::HashMap;

use banded_reports::context::Context;
use banded_reports::data::VecDataSource;
use banded_reports::model::band::{
    Band, BandCommon, DataBand, DataBandSource, GroupFooterBand, GroupHeaderBand,
};
use banded_reports::model::object::{BandObject, ObjectBox, TextObject};
use banded_reports::model::{Page, Report};
use banded_reports::units::{Margins, PaperSize};
use banded_reports::value::Value;
use banded_reports::{prepare, PrepareOptions};

fn text(left: f64, top: f64, width: f64, height: f64, template: &str) -> BandObject {
    BandObject::Text(TextObject::new(ObjectBox::new(left, top, width, height), template))
}

fn flat_page(width: f64, height: f64) -> Page {
    let mut page = Page::new();
    page.size = PaperSize::new(width, height);
    page.margins = Margins::new(0.0, 0.0, 0.0, 0.0);
    page
}

fn record_map(fields: &[(&str, Value)]) -> Value {
    let mut map = HashMap::new();
    for (k, v) in fields {
        map.insert(k.to_string(), v.clone());
    }
    Value::Map(map)
}

/// Scenario 1: DataBand by row count.
#[test]
fn scenario_1_data_band_by_row_count() {
    let mut page = flat_page(400.0, 1000.0);
    page.add_band(Band::DataBand(DataBand {
        common: BandCommon::new(10.0).with_objects(vec![text(0.0, 0.0, 100.0, 10.0, "Line: {{ line }}")]),
        source: DataBandSource::RowCount(10),
        header: None,
        footer: None,
        group_header: None,
    }));
    let mut report = Report::new("row-count");
    report.add_page(page);

    let document = prepare(&mut report, &PrepareOptions::new()).unwrap();
    let bands: Vec<_> = document.pages()[0]
        .bands()
        .iter()
        .filter(|b| b.kind == "DataBand")
        .collect();
    assert_eq!(bands.len(), 10);
    let text_of = |i: usize| match &bands[i].objects[0] {
        banded_reports::prepared::PreparedObject::Text(t) => t.text.clone(),
        _ => panic!("expected text object"),
    };
    assert_eq!(text_of(0), "Line: 1");
    assert_eq!(text_of(9), "Line: 10");
}

/// Scenario 2: dict datasource, two text objects per row.
#[test]
fn scenario_2_dict_datasource_two_texts() {
    let mut page = flat_page(400.0, 1000.0);
    page.add_band(Band::DataBand(DataBand {
        common: BandCommon::new(10.0).with_objects(vec![
            text(0.0, 0.0, 50.0, 10.0, "Line: {{ line }}"),
            text(50.0, 0.0, 150.0, 10.0, "{{ record['id'] }} - {{ record['name'] }}"),
        ]),
        source: DataBandSource::DataSource("orders".to_string()),
        header: None,
        footer: None,
        group_header: None,
    }));
    let mut report = Report::new("dict-source");
    report.add_page(page);

    let records: Vec<Value> = (1..=10)
        .map(|i| record_map(&[("id", Value::Integer(i)), ("name", Value::from(format!("Value {i}")))]))
        .collect();
    report.register_data_source(Box::new(VecDataSource::new("orders", records)));

    let document = prepare(&mut report, &PrepareOptions::new()).unwrap();
    let bands: Vec<_> = document.pages()[0]
        .bands()
        .iter()
        .filter(|b| b.kind == "DataBand")
        .collect();
    assert_eq!(bands.len(), 10);
    let banded_reports::prepared::PreparedObject::Text(last) = &bands[9].objects[1] else {
        panic!("expected text object");
    };
    assert_eq!(last.text, "10 - Value 10");
}

/// Scenario 3: nested grouping — outer on category, inner on first digit
/// of id.
#[test]
fn scenario_3_nested_grouping() {
    let mut page = flat_page(400.0, 100_000.0);

    let data_band = page.add_band(Band::DataBand(DataBand {
        common: BandCommon::new(10.0)
            .named("DB1")
            .with_objects(vec![text(0.0, 0.0, 100.0, 10.0, "{{ record.id }}")]),
        source: DataBandSource::DataSource("items".to_string()),
        header: None,
        footer: None,
        group_header: None,
    }));
    let inner_group = page.add_band(Band::GroupHeader(GroupHeaderBand {
        common: BandCommon::new(10.0).named("InnerGH").with_objects(vec![text(
            0.0,
            0.0,
            200.0,
            10.0,
            "Sub grouping by: {{ record.digit }}",
        )]),
        expression: Some("record.digit".to_string()),
        field: None,
        child: None,
        footer: None,
    }));
    let outer_group = page.add_band(Band::GroupHeader(GroupHeaderBand {
        common: BandCommon::new(10.0).named("OuterGH").with_objects(vec![text(
            0.0,
            0.0,
            200.0,
            10.0,
            "Grouping by: {{ record.category }}",
        )]),
        expression: Some("record.category".to_string()),
        field: None,
        child: None,
        footer: None,
    }));

    page.link_group_header(data_band, inner_group).unwrap();
    page.link_nested_group(outer_group, inner_group).unwrap();

    let mut report = Report::new("nested-grouping");

    let digit_of = |i: i64| i.to_string().chars().next().unwrap().to_string();
    let mut records = Vec::new();
    for i in 0..100 {
        records.push(record_map(&[
            ("category", Value::from("Category 1")),
            ("id", Value::Integer(i)),
            ("digit", Value::from(digit_of(i))),
        ]));
    }
    for i in 0..100 {
        records.push(record_map(&[
            ("category", Value::from("2nd Category")),
            ("id", Value::Integer(i)),
            ("digit", Value::from(digit_of(i))),
        ]));
    }
    report.register_data_source(Box::new(VecDataSource::new("items", records)));
    report.add_page(page);

    let document = prepare(&mut report, &PrepareOptions::new()).unwrap();
    let bands = document.pages()[0].bands();
    let text_of = |i: usize| match &bands[i].objects[0] {
        banded_reports::prepared::PreparedObject::Text(t) => t.text.clone(),
        _ => panic!("expected text object"),
    };
    assert_eq!(bands[0].kind, "GroupHeader");
    assert_eq!(text_of(0), "Grouping by: Category 1");
    assert_eq!(bands[1].kind, "GroupHeader");
    assert_eq!(text_of(1), "Sub grouping by: 0");
}

/// Scenario 4: deferred page count resolves after pagination.
#[test]
fn scenario_4_deferred_page_count() {
    let mut page = flat_page(300.0, 100.0);
    page.add_band(Band::DataBand(DataBand {
        common: BandCommon::new(50.0)
            .with_objects(vec![text(0.0, 0.0, 200.0, 50.0, "Page ${ page_index } of ${ page_count }")]),
        source: DataBandSource::RowCount(22),
        header: None,
        footer: None,
        group_header: None,
    }));
    let mut report = Report::new("deferred-count");
    report.add_page(page);

    let document = prepare(&mut report, &PrepareOptions::new()).unwrap();
    assert_eq!(document.page_count(), 11);
    let banded_reports::prepared::PreparedObject::Text(t) = &document.pages()[6].bands()[0].objects[0] else {
        panic!("expected text object");
    };
    assert_eq!(t.text, "Page 7 of 11");
}

/// Scenario 6: page overflow spreads a data band's rows across two
/// pages and the page footer appears on both.
#[test]
fn scenario_6_page_overflow_spreads_rows_with_footer_on_both_pages() {
    let mut page = flat_page(300.0, 300.0);
    page.add_band(Band::PageFooter(BandCommon::new(10.0).with_objects(vec![text(
        0.0,
        0.0,
        100.0,
        10.0,
        "Footer",
    )])));
    page.add_band(Band::DataBand(DataBand {
        common: BandCommon::new(40.0).with_objects(vec![text(0.0, 0.0, 100.0, 40.0, "Row {{ line }}")]),
        source: DataBandSource::RowCount(10),
        header: None,
        footer: None,
        group_header: None,
    }));
    let mut report = Report::new("overflow");
    report.add_page(page);

    let document = prepare(&mut report, &PrepareOptions::new()).unwrap();
    assert!(document.page_count() >= 2);
    for p in document.pages() {
        assert!(p.bands().iter().any(|b| b.kind == "PageFooter"));
    }
    let total_rows: usize = document
        .pages()
        .iter()
        .map(|p| p.bands().iter().filter(|b| b.kind == "DataBand").count())
        .sum();
    assert_eq!(total_rows, 10);
}

/// Empty page yields exactly one page with header/footer still printed.
#[test]
fn empty_page_yields_one_page_with_header_and_footer() {
    let mut page = flat_page(200.0, 200.0);
    page.add_band(Band::PageHeader(BandCommon::new(10.0)));
    page.add_band(Band::PageFooter(BandCommon::new(10.0)));
    let mut report = Report::new("empty");
    report.add_page(page);

    let document = prepare(&mut report, &PrepareOptions::new()).unwrap();
    assert_eq!(document.page_count(), 1);
    let kinds: Vec<&str> = document.pages()[0].bands().iter().map(|b| b.kind.as_str()).collect();
    assert_eq!(kinds, vec!["PageHeader", "PageFooter"]);
}

/// Preparing twice with the same definition produces an equal page count
/// and band layout.
#[test]
fn preparation_twice_is_idempotent_in_shape() {
    let mut report = Report::new("idempotent");
    let mut page = flat_page(300.0, 300.0);
    page.add_band(Band::DataBand(DataBand {
        common: BandCommon::new(20.0).with_objects(vec![text(0.0, 0.0, 100.0, 20.0, "Row {{ line }}")]),
        source: DataBandSource::RowCount(7),
        header: None,
        footer: None,
        group_header: None,
    }));
    report.add_page(page);

    let first = prepare(&mut report, &PrepareOptions::new()).unwrap();
    let second = prepare(&mut report, &PrepareOptions::new()).unwrap();
    assert_eq!(first.page_count(), second.page_count());
    for (a, b) in first.pages().iter().zip(second.pages().iter()) {
        assert_eq!(a.bands().len(), b.bands().len());
    }
}

/// Grouping restarts from empty each time a data band is re-driven: a
/// fresh [`Context`] run over the same consecutive-equal records always
/// yields the same number of group headers.
#[test]
fn regrouping_from_scratch_yields_consistent_group_count() {
    let _ctx = Context::new();
    let mut page = flat_page(400.0, 100_000.0);
    let data_band = page.add_band(Band::DataBand(DataBand {
        common: BandCommon::new(10.0).with_objects(vec![text(0.0, 0.0, 100.0, 10.0, "{{ record.k }}")]),
        source: DataBandSource::DataSource("recs".to_string()),
        header: None,
        footer: None,
        group_header: None,
    }));
    let group_header = page.add_band(Band::GroupHeader(GroupHeaderBand {
        common: BandCommon::new(10.0).with_objects(vec![text(0.0, 0.0, 100.0, 10.0, "{{ record.k }}")]),
        expression: Some("record.k".to_string()),
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

    let mut report = Report::new("sorted-groups");
    let records: Vec<Value> = vec!["a", "a", "b", "b", "b", "c"]
        .into_iter()
        .map(|k| record_map(&[("k", Value::from(k))]))
        .collect();
    report.register_data_source(Box::new(VecDataSource::new("recs", records)));
    report.add_page(page);

    let document = prepare(&mut report, &PrepareOptions::new()).unwrap();
    let headers = document.pages()[0]
        .bands()
        .iter()
        .filter(|b| b.kind == "GroupHeader")
        .count();
    let footers = document.pages()[0]
        .bands()
        .iter()
        .filter(|b| b.kind == "GroupFooter")
        .count();
    assert_eq!(headers, 3);
    assert_eq!(footers, 3);
}
