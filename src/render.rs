//! Band object preparation: compiling a band's [`BandObject`]s once per
//! page definition, then rendering them against a live [`Context`] for
//! every band instance.
//!
//! Grounded on original_source `reptile/bands/widgets.py` (`Text.process`/
//! `Image.prepare`/`Line.prepare`): a `Text` renders its template with
//! `RenderMode::PrimaryOnly`, re-parses the *output* as a new template and
//! defers it when the output still contains `${` (the original's
//! `template2()`/`_pending_objects` mechanism — see `crate::expr::template`),
//! applies its highlight only when the condition renders to the literal
//! `"True"`, and measures can-grow/can-shrink height through an injected
//! callback rather than a bundled font metrics table.

use crate::context::Context;
use crate::engine::{PrepareLevel, PrepareOptions};
use crate::error::Result;
use crate::expr::{RenderMode, Template};
use crate::model::style::BrushStyle;
use crate::model::{
    BandObject, BarcodeObject, BarcodeSource, ImageObject, ImageSource, LineObject, TableObject,
    TextObject,
};
use crate::prepared::{
    color_to_hex, PreparedBarcode, PreparedImage, PreparedLine, PreparedObject, PreparedTable,
    PreparedText,
};
use crate::value::Value;

/// A text object with its template(s) parsed once, reused across every
/// row/instance a band is placed for.
#[derive(Clone)]
pub struct CompiledText {
    source: TextObject,
    template: Template,
    highlight_condition: Option<Template>,
}

#[derive(Clone)]
pub struct CompiledBarcode {
    source: BarcodeObject,
    template: Option<Template>,
}

/// One band object, precompiled. `Subreport` carries no renderable
/// output of its own — driving the referenced page is a band-placement
/// side effect handled by [`crate::subreport`], not a leaf object.
#[derive(Clone)]
pub enum CompiledObject {
    Text(CompiledText),
    Image(ImageObject),
    Line(LineObject),
    Barcode(CompiledBarcode),
    Table(TableObject),
    Subreport,
}

/// Compile every object on a band once, at page-definition time.
pub fn compile_band_objects(objects: &[BandObject]) -> Result<Vec<CompiledObject>> {
    objects.iter().map(compile_object).collect()
}

fn compile_object(object: &BandObject) -> Result<CompiledObject> {
    match object {
        BandObject::Text(text) => {
            let template = Template::compile(&text.template)?;
            let highlight_condition = match &text.highlight {
                Some(h) => Some(Template::compile(&h.condition)?),
                None => None,
            };
            Ok(CompiledObject::Text(CompiledText {
                source: text.clone(),
                template,
                highlight_condition,
            }))
        }
        BandObject::Image(image) => Ok(CompiledObject::Image(image.clone())),
        BandObject::Line(line) => Ok(CompiledObject::Line(line.clone())),
        BandObject::Barcode(barcode) => {
            let template = match &barcode.source {
                BarcodeSource::Template(source) => Some(Template::compile(source)?),
                _ => None,
            };
            Ok(CompiledObject::Barcode(CompiledBarcode {
                source: barcode.clone(),
                template,
            }))
        }
        BandObject::Table(table) => Ok(CompiledObject::Table(table.clone())),
        BandObject::Subreport(_) => Ok(CompiledObject::Subreport),
    }
}

/// Render every compiled object on a band instance against `ctx`.
///
/// `deferred` collects `(index-into-the-returned-vec, template)` pairs for
/// any text whose `PrimaryOnly` output still contains `${` — the caller
/// threads the band's position through so the final deferred pass over
/// the finished document can find and overwrite them.
pub fn render_objects(
    compiled: &[CompiledObject],
    ctx: &Context,
    options: &PrepareOptions,
    deferred: &mut Vec<(usize, Template)>,
) -> Vec<PreparedObject> {
    let mut out = Vec::with_capacity(compiled.len());
    for object in compiled {
        match object {
            CompiledObject::Text(text) => {
                let prepared = render_text(text, ctx, options);
                if prepared.text.contains("${") {
                    if let Ok(template) = Template::compile(&prepared.text) {
                        deferred.push((out.len(), template));
                    }
                }
                out.push(PreparedObject::Text(prepared));
            }
            CompiledObject::Image(image) => {
                out.push(PreparedObject::Image(render_image(image, ctx)));
            }
            CompiledObject::Line(line) => {
                out.push(PreparedObject::Line(render_line(line)));
            }
            CompiledObject::Barcode(barcode) => {
                if let Some(prepared) = render_barcode(barcode, ctx, options) {
                    out.push(PreparedObject::Barcode(prepared));
                }
                // Absent datasource: warning already logged, no object
                // produced.
            }
            CompiledObject::Table(table) => {
                out.push(PreparedObject::Table(render_table(table, ctx)));
            }
            CompiledObject::Subreport => {}
        }
    }
    out
}

fn render_text(compiled: &CompiledText, ctx: &Context, options: &PrepareOptions) -> PreparedText {
    let source = &compiled.source;
    let (text, mut errored) =
        compiled
            .template
            .render(ctx, RenderMode::PrimaryOnly, &options.error_placeholder);

    let mut background = source.background.as_ref().map(color_to_hex);
    let mut brush_style = BrushStyle::None;

    if let (Some(highlight), Some(condition)) = (&source.highlight, &compiled.highlight_condition)
    {
        let (rendered, cond_errored) =
            condition.render(ctx, RenderMode::All, &options.error_placeholder);
        errored |= cond_errored;
        if rendered.trim() == "True" {
            if let Some(color) = &highlight.background {
                background = Some(color_to_hex(color));
            }
            if let Some(style) = highlight.brush_style {
                brush_style = style;
            }
        }
    }

    let mut height = source.bounds.height;
    if (source.can_grow || source.can_shrink) && options.level != PrepareLevel::Counts {
        if let Some(measure) = &options.measure {
            let (_, measured) = measure(&text, &source.font, source.bounds.width);
            if source.can_shrink {
                height = height.min(measured);
            }
            if source.can_grow {
                height = height.max(measured);
            }
        }
    }

    PreparedText {
        left: source.bounds.left,
        top: source.bounds.top,
        width: source.bounds.width,
        height,
        text,
        font_name: source.font.name.clone(),
        font_size: source.font.size,
        font_bold: source.font.bold,
        font_italic: source.font.italic,
        color: color_to_hex(&source.font.color),
        background,
        brush_style,
        halign: source.halign,
        valign: source.valign,
        wrap: source.word_wrap,
        can_grow: source.can_grow,
        error: errored,
    }
}

fn value_to_bytes(value: &Value) -> Option<std::sync::Arc<[u8]>> {
    match value {
        Value::Bytes(bytes) => Some(bytes.clone()),
        _ => None,
    }
}

fn render_image(image: &ImageObject, ctx: &Context) -> PreparedImage {
    let picture = match &image.source {
        ImageSource::Bytes(bytes) => Some(bytes.clone()),
        ImageSource::Field(field) => ctx
            .get("record")
            .and_then(|record| record.get(field))
            .as_ref()
            .and_then(value_to_bytes),
        ImageSource::Variable(name) => ctx.get(name).and_then(value_to_bytes),
    };
    PreparedImage {
        left: image.bounds.left,
        top: image.bounds.top,
        width: image.bounds.width,
        height: image.bounds.height,
        size_mode: image.size_mode,
        picture,
    }
}

fn render_line(line: &LineObject) -> PreparedLine {
    PreparedLine {
        left: line.bounds.left,
        top: line.bounds.top,
        width: line.bounds.width,
        height: line.bounds.height,
        direction: line.direction,
        line_width: line.stroke_width,
        color: color_to_hex(&line.stroke_color),
    }
}

/// Render a barcode's value. Returns `None` (with a logged warning) when
/// the object reads from a field and that field is absent — this
/// produces no object rather than an errored placeholder.
fn render_barcode(
    compiled: &CompiledBarcode,
    ctx: &Context,
    options: &PrepareOptions,
) -> Option<PreparedBarcode> {
    let source = &compiled.source;
    let data = match &source.source {
        BarcodeSource::Literal(literal) => literal.clone(),
        BarcodeSource::Field(field) => match ctx.get("record").and_then(|record| record.get(field))
        {
            Some(value) => value.to_string(),
            None => {
                tracing::warn!(
                    object = source.bounds.name.as_deref().unwrap_or("<unnamed>"),
                    field,
                    "barcode field absent from record, skipping object"
                );
                return None;
            }
        },
        BarcodeSource::Template(_) => {
            let template = compiled
                .template
                .as_ref()
                .expect("template-sourced barcode always compiles a template");
            let (text, _) = template.render(ctx, RenderMode::All, &options.error_placeholder);
            text
        }
    };
    Some(PreparedBarcode {
        left: source.bounds.left,
        top: source.bounds.top,
        width: source.bounds.width,
        height: source.bounds.height,
        symbology: source.symbology,
        data,
    })
}

/// Render a table's rows from its bound data source (or, absent one, a
/// single row from whatever `record` is currently bound).
fn render_table(table: &TableObject, ctx: &Context) -> PreparedTable {
    let records: Vec<Value> = match &table.data_source {
        Some(name) => match ctx.get(name) {
            Some(Value::List(items)) => items.clone(),
            Some(other) => vec![other.clone()],
            None => Vec::new(),
        },
        None => ctx.get("record").cloned().into_iter().collect(),
    };

    let headers = table
        .columns
        .iter()
        .map(|column| column.header.clone().unwrap_or_default())
        .collect();
    let rows = records
        .iter()
        .map(|record| {
            table
                .columns
                .iter()
                .map(|column| {
                    record
                        .get(&column.field)
                        .map(|v| v.to_string())
                        .unwrap_or_default()
                })
                .collect()
        })
        .collect();

    PreparedTable {
        left: table.bounds.left,
        top: table.bounds.top,
        width: table.bounds.width,
        height: table.bounds.height,
        headers,
        rows,
    }
}
