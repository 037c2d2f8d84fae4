//! Subreport band objects: driving another page definition's root bands
//! in place, at the current cursor, rather than as a separate document.
//!
//! Grounded on original_source `Subreport.prepare` (`reptile/bands/subreport.py`)
//! and `Page.prepare` (`reptile/_engine.py`): a subreport is just another
//! page definition whose root-band pass is invoked mid-flow, sharing the
//! host page's cursor and document instead of opening its own.

use crate::context::Context;
use crate::driver;
use crate::engine::PrepareOptions;
use crate::error::Result;
use crate::layout::PageLayouter;
use crate::model::Report;
use crate::render::CompiledObject;

/// Drive every root band of `report.page(target_index)` through the
/// current layouter/context, at `(self.left + parent.x, self.top +
/// parent.y)`; `cursor` is that sum, already computed by the caller from
/// the subreport object's own bounds and its parent band's placed
/// position. The original cursor is captured before driving and restored
/// on exit, so the host band's own flow continues unaffected. The target
/// page is expected to be marked
/// [`crate::model::Page::mark_as_subreport_target`] by the host building
/// the report, so the top-level page pass in `engine::prepare` never
/// also drives it as an ordinary page.
pub(crate) fn drive(
    report: &Report,
    all_compiled: &[Vec<Vec<CompiledObject>>],
    target_index: usize,
    cursor: (f64, f64),
    layouter: &mut PageLayouter,
    ctx: &mut Context,
    options: &PrepareOptions,
) -> Result<()> {
    let original_cursor = layouter.cursor();
    layouter.set_cursor(cursor.0, cursor.1);
    let result = driver::drive_page_roots(report, target_index, all_compiled, layouter, ctx, options);
    if let Some((x, y)) = original_cursor {
        layouter.set_cursor(x, y);
    }
    result
}
