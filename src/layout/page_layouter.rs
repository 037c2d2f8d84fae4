//! Page geometry allocation: the cursor, the bottom stack, and page-break
//! decisions, kept separate from band *content* production.
//!
//! Grounded on original_source `Page.new_page`/`Page.end_page`/
//! `Band.prepare_objects` (`reptile/_engine.py`): a page tracks a cursor
//! `x, y` and an effective bottom `ay`; placing a band advances `y`;
//! overflow starts a new page; `print_on_bottom` bands are placed against
//! `ay` instead, which is then decremented (a bottom stack that is simply
//! never built back up once a page ends, since the next page starts with
//! a fresh `ay`).

use crate::context::Context;
use crate::error::Result;
use crate::expr::Template;
use crate::prepared::{Document, PreparedBand, PreparedPage};
use crate::units::{Margins, PaperSize};

/// A band producer renders one band's objects against the current
/// context and returns the band (with `left`/`top` left at whatever the
/// producer happened to set, the layouter overwrites them once it knows
/// where the band lands, but `height` already final) plus any
/// locally-deferred `${ }` texts it found, as `(object_index, Template)`
/// pairs local to the band's own object list.
pub type BandProducer<'ctx> =
    Box<dyn FnMut(&mut Context) -> Result<(PreparedBand, Vec<(usize, Template)>)> + 'ctx>;

/// Invoked once per new page, in registration order, so a group header
/// can reprint itself at the top of a continuation page. Takes the
/// layouter itself (not just the page) so the callback can place a band
/// through the normal placement path.
pub type NewPageCallback<'ctx> =
    Box<dyn FnMut(&mut PageLayouter<'ctx>, &mut Context) -> Result<()> + 'ctx>;

#[derive(Debug, Clone, Copy)]
pub struct PageState {
    pub x: f64,
    pub y: f64,
    pub ay: f64,
}

/// A `${ }` text whose resolution was postponed until `page_count` (and
/// similar end-of-preparation values) are known, located by where it
/// ended up in the finished document.
pub struct DeferredEntry {
    pub page_index: usize,
    pub band_index: usize,
    pub object_index: usize,
    pub template: Template,
}

pub struct PageLayouter<'ctx> {
    content: PaperSize,
    margins: Margins,
    /// Static (definition-time) footer height, reserved out of `ay` the
    /// moment a page opens, mirrors the original reserving
    /// `self._page_footer.height` rather than a measured value.
    footer_height: f64,
    title_before_header: bool,
    title_printed: bool,
    watermark: Option<String>,
    /// Whether band placement may trigger a page break at all. False at
    /// `PrepareLevel::Counts`, which never breaks pages; see `DESIGN.md`.
    break_pages: bool,
    page_header: Option<BandProducer<'ctx>>,
    page_footer: Option<BandProducer<'ctx>>,
    report_title: Option<BandProducer<'ctx>>,
    new_page_callbacks: Vec<Option<NewPageCallback<'ctx>>>,
    document: Document,
    state: Option<PageState>,
    deferred: Vec<DeferredEntry>,
}

impl<'ctx> PageLayouter<'ctx> {
    pub fn new(content: PaperSize, margins: Margins, title_before_header: bool, break_pages: bool) -> Self {
        Self {
            content,
            margins,
            footer_height: 0.0,
            title_before_header,
            title_printed: false,
            watermark: None,
            break_pages,
            page_header: None,
            page_footer: None,
            report_title: None,
            new_page_callbacks: Vec::new(),
            document: Document::new(),
            state: None,
            deferred: Vec::new(),
        }
    }

    pub fn set_page_header(&mut self, producer: BandProducer<'ctx>) -> &mut Self {
        self.page_header = Some(producer);
        self
    }

    pub fn set_page_footer(&mut self, producer: BandProducer<'ctx>, footer_height: f64) -> &mut Self {
        self.page_footer = Some(producer);
        self.footer_height = footer_height;
        self
    }

    pub fn set_report_title(&mut self, producer: BandProducer<'ctx>) -> &mut Self {
        self.report_title = Some(producer);
        self
    }

    pub fn set_watermark(&mut self, watermark: Option<String>) -> &mut Self {
        self.watermark = watermark;
        self
    }

    /// Register a new-page callback, returning a handle for later
    /// removal. Mirrors `Page.add_new_page_callback`/`remove_new_page_callback`:
    /// a `GroupHeader` registers one while it owns the cursor and
    /// deregisters it once its group processing completes.
    pub fn add_new_page_callback(&mut self, cb: NewPageCallback<'ctx>) -> usize {
        self.new_page_callbacks.push(Some(cb));
        self.new_page_callbacks.len() - 1
    }

    pub fn remove_new_page_callback(&mut self, handle: usize) {
        if let Some(slot) = self.new_page_callbacks.get_mut(handle) {
            *slot = None;
        }
    }

    pub fn state(&self) -> Option<PageState> {
        self.state
    }

    /// Remaining usable height on the current page, or 0 if no page is
    /// open yet.
    pub fn remaining_height(&self) -> f64 {
        self.state.map(|s| (s.ay - s.y).max(0.0)).unwrap_or(0.0)
    }

    /// Whether a band of the given height fits without starting a new
    /// page. Used by group-header placement to avoid an orphaned header:
    /// a group header whose first data-band row would not fit either
    /// also triggers a new page.
    pub fn would_fit(&self, height: f64) -> bool {
        !self.break_pages || self.remaining_height() >= height
    }

    pub fn current_page_index(&self) -> usize {
        self.document.page_count()
    }

    /// The live cursor `(x, y)`, or `None` if no page is open yet.
    pub fn cursor(&self) -> Option<(f64, f64)> {
        self.state.map(|s| (s.x, s.y))
    }

    /// Overwrite the live cursor without touching `ay`. Used by a
    /// subreport object to reposition the cursor onto its target page
    /// before driving it, then restore the host's cursor on exit.
    pub fn set_cursor(&mut self, x: f64, y: f64) {
        if let Some(state) = self.state.as_mut() {
            state.x = x;
            state.y = y;
        }
    }

    /// The absolute `(left, top)` of the most recently placed band, or
    /// `None` if nothing has been placed yet. Used by a subreport object
    /// to find its parent band's page-relative position.
    pub fn last_band_bounds(&self) -> Option<(f64, f64)> {
        let page = self.document.pages().last()?;
        let band = page.bands().last()?;
        Some((band.left, band.top))
    }

    /// The `(page index, band index)` of the most recently placed band,
    /// or `None` if nothing has been placed yet. Used by the preparation
    /// engine to remember where a deferred (`${ }`) text landed so the
    /// final resolution pass can find it again.
    pub fn last_band_location(&self) -> Option<(usize, usize)> {
        let page = self.document.pages().last()?;
        if page.bands().is_empty() {
            return None;
        }
        Some((page.index, page.bands().len() - 1))
    }

    /// Close the current page (printing its pinned footer) without
    /// opening a new one. Exposed so the preparation engine can flush a
    /// page definition's last page before moving on to the next one.
    pub fn close_current_page(&mut self, ctx: &mut Context) -> Result<()> {
        self.end_current_page(ctx)
    }

    /// Reconfigure the layouter for a new top-level page definition,
    /// closing whatever page the previous definition left open first.
    /// The document and page counter are shared across definitions
    /// (mirroring the original's single `report.page_count`/
    /// `report.stream` carried across successive `Page.prepare()` calls);
    /// only the per-definition geometry and producers reset.
    pub fn reset_for_page(
        &mut self,
        ctx: &mut Context,
        content: PaperSize,
        margins: Margins,
        title_before_header: bool,
        break_pages: bool,
    ) -> Result<()> {
        self.end_current_page(ctx)?;
        self.content = content;
        self.margins = margins;
        self.footer_height = 0.0;
        self.title_before_header = title_before_header;
        self.title_printed = false;
        self.break_pages = break_pages;
        self.page_header = None;
        self.page_footer = None;
        self.report_title = None;
        self.new_page_callbacks.clear();
        Ok(())
    }

    fn record_deferred(&mut self, page_index: usize, band_index: usize, local: Vec<(usize, Template)>) {
        self.deferred.extend(local.into_iter().map(|(object_index, template)| DeferredEntry {
            page_index,
            band_index,
            object_index,
            template,
        }));
    }

    /// Close the current page (if any) and open a new one: prints the
    /// pinned footer of the old page, then the header (and, on the very
    /// first page, the report title) of the new one, reserves footer
    /// space, and fires every registered new-page callback in order.
    pub fn new_page(&mut self, ctx: &mut Context) -> Result<()> {
        self.end_current_page(ctx)?;

        let content = self.content;
        let margins = self.margins;
        let index = self.document.page_count();
        let mut page = PreparedPage::new(index, content.width, content.height)
            .with_watermark(self.watermark.clone());

        let mut state = PageState {
            x: margins.left,
            y: margins.top,
            ay: content.height - margins.bottom,
        };

        ctx.set_page_index(index as i64 + 1);

        if !self.title_printed && self.title_before_header {
            if let Some(title) = self.report_title.as_mut() {
                let (mut band, local) = title(ctx)?;
                band.left = state.x;
                band.top = state.y;
                state.y = band.bottom();
                let band_index = page.bands().len();
                page.push_band(band);
                self.record_deferred(index, band_index, local);
            }
            self.title_printed = true;
        }

        if let Some(header) = self.page_header.as_mut() {
            let (mut band, local) = header(ctx)?;
            band.left = state.x;
            band.top = state.y;
            state.y = band.bottom();
            let band_index = page.bands().len();
            page.push_band(band);
            self.record_deferred(index, band_index, local);
        }

        if self.page_footer.is_some() {
            state.ay -= self.footer_height;
        }

        self.document.push_page(page);
        self.state = Some(state);

        let mut callbacks = std::mem::take(&mut self.new_page_callbacks);
        for slot in callbacks.iter_mut() {
            if let Some(cb) = slot {
                cb(self, ctx)?;
            }
        }
        self.new_page_callbacks = callbacks;

        Ok(())
    }

    fn end_current_page(&mut self, ctx: &mut Context) -> Result<()> {
        let Some(mut state) = self.state.take() else {
            return Ok(());
        };
        if let Some(footer) = self.page_footer.as_mut() {
            state.ay += self.footer_height;
            state.y = state.ay - self.footer_height;
            let (mut band, local) = footer(ctx)?;
            band.left = state.x;
            band.top = state.y;
            if let Some(page) = self.document.pages_mut().last_mut() {
                let page_index = page.index;
                let band_index = page.bands().len();
                page.push_band(band);
                self.record_deferred(page_index, band_index, local);
            }
        }
        Ok(())
    }

    /// Place a band at the current cursor, starting a new page first if
    /// it would overflow `ay`.
    pub fn place_band(
        &mut self,
        ctx: &mut Context,
        producer: &mut dyn FnMut(&mut Context) -> Result<(PreparedBand, Vec<(usize, Template)>)>,
    ) -> Result<()> {
        if self.state.is_none() {
            self.new_page(ctx)?;
        }
        let (mut band, local) = producer(ctx)?;
        let mut state = self.state.expect("page opened above");
        band.left = state.x;
        band.top = state.y;

        if self.break_pages && band.bottom() > state.ay {
            self.new_page(ctx)?;
            state = self.state.expect("new_page always opens a page");
            band.left = state.x;
            band.top = state.y;
        }

        state.y = band.bottom();
        self.state = Some(state);
        if let Some(page) = self.document.pages_mut().last_mut() {
            let page_index = page.index;
            let band_index = page.bands().len();
            page.push_band(band);
            self.record_deferred(page_index, band_index, local);
        }
        Ok(())
    }

    /// Place a `print_on_bottom` band against the current `ay`, then
    /// shrink `ay` by its height.
    pub fn place_band_bottom(
        &mut self,
        ctx: &mut Context,
        producer: &mut dyn FnMut(&mut Context) -> Result<(PreparedBand, Vec<(usize, Template)>)>,
    ) -> Result<()> {
        if self.state.is_none() {
            self.new_page(ctx)?;
        }
        let (mut band, local) = producer(ctx)?;
        let mut state = self.state.expect("page opened above");
        band.top = state.ay - band.height;
        band.left = state.x;
        state.ay -= band.height;
        self.state = Some(state);
        if let Some(page) = self.document.pages_mut().last_mut() {
            let page_index = page.index;
            let band_index = page.bands().len();
            page.push_band(band);
            self.record_deferred(page_index, band_index, local);
        }
        Ok(())
    }

    /// Close the final page and return the finished document along with
    /// every deferred `${ }` text collected while filling it.
    pub fn finish(mut self, ctx: &mut Context) -> Result<(Document, Vec<DeferredEntry>)> {
        self.end_current_page(ctx)?;
        Ok((self.document, self.deferred))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;

    fn layouter<'a>() -> PageLayouter<'a> {
        PageLayouter::new(PaperSize::new(200.0, 300.0), Margins::new(0.0, 0.0, 0.0, 0.0), false, true)
    }

    fn band(height: f64) -> PreparedBand {
        PreparedBand::new("DataBand", 0.0, 0.0, 200.0, height)
    }

    #[test]
    fn first_place_band_opens_a_page() {
        let mut layouter = layouter();
        let mut ctx = Context::new();
        layouter
            .place_band(&mut ctx, &mut |_ctx| Ok((band(40.0), Vec::new())))
            .unwrap();
        assert_eq!(layouter.current_page_index(), 1);
        assert_eq!(layouter.state().unwrap().y, 40.0);
    }

    #[test]
    fn overflow_starts_a_new_page() {
        let mut layouter = layouter();
        let mut ctx = Context::new();
        for _ in 0..8 {
            layouter
                .place_band(&mut ctx, &mut |_ctx| Ok((band(40.0), Vec::new())))
                .unwrap();
        }
        // 8 * 40 = 320 > 300, so the 8th band must have started page 2.
        assert_eq!(layouter.current_page_index(), 2);
    }

    #[test]
    fn bottom_band_reserves_ay() {
        let mut layouter = layouter();
        let mut ctx = Context::new();
        layouter.new_page(&mut ctx).unwrap();
        layouter
            .place_band_bottom(&mut ctx, &mut |_ctx| Ok((band(20.0), Vec::new())))
            .unwrap();
        assert_eq!(layouter.state().unwrap().ay, 280.0);
    }

    #[test]
    fn would_fit_respects_break_pages_flag() {
        let mut layouter = layouter();
        let mut ctx = Context::new();
        layouter.new_page(&mut ctx).unwrap();
        assert!(!layouter.would_fit(10_000.0));

        let never_breaks = PageLayouter::new(
            PaperSize::new(200.0, 300.0),
            Margins::new(0.0, 0.0, 0.0, 0.0),
            false,
            false,
        );
        assert!(never_breaks.would_fit(10_000.0));
    }

    #[test]
    fn last_band_location_tracks_the_most_recent_push() {
        let mut layouter = layouter();
        let mut ctx = Context::new();
        assert!(layouter.last_band_location().is_none());
        layouter
            .place_band(&mut ctx, &mut |_ctx| Ok((band(10.0), Vec::new())))
            .unwrap();
        assert_eq!(layouter.last_band_location(), Some((0, 0)));
        layouter
            .place_band(&mut ctx, &mut |_ctx| Ok((band(10.0), Vec::new())))
            .unwrap();
        assert_eq!(layouter.last_band_location(), Some((0, 1)));
    }

    #[test]
    fn deferred_entries_are_collected_with_their_location() {
        let mut layouter = layouter();
        let mut ctx = Context::new();
        layouter
            .place_band(&mut ctx, &mut |_ctx| {
                let template = Template::compile("${ page_count }").unwrap();
                Ok((band(10.0), vec![(0, template)]))
            })
            .unwrap();
        let (_, deferred) = layouter.finish(&mut ctx).unwrap();
        assert_eq!(deferred.len(), 1);
        assert_eq!(deferred[0].page_index, 0);
        assert_eq!(deferred[0].band_index, 0);
        assert_eq!(deferred[0].object_index, 0);
    }
}
