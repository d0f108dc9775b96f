use scraper::{ElementRef, Html, Selector};
use tracing::trace;

/// One table row: the raw text of each `<td>`, in order.
pub type Row = Vec<String>;

/// Locates the rows of the historical-data table within a parsed page.
///
/// Callers only ever see rows of cell text, so the way the table is found
/// can change with the upstream markup without touching the worker.
pub trait RowLocator: Send + Sync {
    fn rows(&self, document: &Html) -> Vec<Row>;
}

/// Every `<tr>` in the document, less the first `skip`.
///
/// The history page has served two chrome rows ahead of the data for a long
/// time; if that changes, this silently drops or keeps the wrong rows.
#[derive(Debug, Clone)]
pub struct HeaderSkip {
    pub skip: usize,
}

impl Default for HeaderSkip {
    fn default() -> Self {
        Self { skip: 2 }
    }
}

impl RowLocator for HeaderSkip {
    fn rows(&self, document: &Html) -> Vec<Row> {
        document
            .select(&selector("tr"))
            .skip(self.skip)
            .map(cells)
            .collect()
    }
}

/// The `<tr>` rows of the first table matching a CSS selector, e.g.
/// `table[data-test="historical-prices"]`.
#[derive(Debug, Clone)]
pub struct TableMarker {
    table: Selector,
}

impl TableMarker {
    /// `None` if `selector` is not valid CSS.
    pub fn new(selector: &str) -> Option<Self> {
        Selector::parse(selector)
            .ok()
            .map(|table| Self { table })
    }
}

impl RowLocator for TableMarker {
    fn rows(&self, document: &Html) -> Vec<Row> {
        match document.select(&self.table).next() {
            Some(table) => table.select(&selector("tr")).map(cells).collect(),
            None => {
                trace!("no table matched the marker selector");
                vec![]
            }
        }
    }
}

/// Parse `html` and hand back the data rows found by `locator`. A page
/// without the expected table yields no rows, never an error.
pub fn parse_rows<L>(html: &str, locator: &L) -> Vec<Row>
where
    L: RowLocator + ?Sized,
{
    let document = Html::parse_document(html);
    locator.rows(&document)
}

fn cells(row: ElementRef<'_>) -> Row {
    row.select(&selector("td"))
        .map(|cell| cell.text().collect::<String>())
        .collect()
}

fn selector(css: &'static str) -> Selector {
    Selector::parse(css).unwrap_or_else(|err| panic!("invalid static selector {css}: {err:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
        <table><tr><td>nav</td></tr></table>
        <table data-test="historical-prices">
            <thead><tr><th>Date</th><th>Open</th></tr></thead>
            <tbody>
                <tr><td>Oct 16, 2026</td><td>1</td><td>2</td><td>3</td><td>4</td><td>5</td><td>6</td></tr>
                <tr><td>Aug 12, 2026</td><td><strong>0.26</strong> Dividend</td></tr>
            </tbody>
        </table>
        </body></html>
    "#;

    #[test]
    fn header_skip_drops_the_first_two_rows() {
        let rows = parse_rows(PAGE, &HeaderSkip::default());
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].len(), 7);
        assert_eq!(rows[0][0], "Oct 16, 2026");
    }

    #[test]
    fn cell_text_joins_nested_nodes_untrimmed() {
        let rows = parse_rows(PAGE, &HeaderSkip::default());
        assert_eq!(rows[1], vec!["Aug 12, 2026", "0.26 Dividend"]);
    }

    #[test]
    fn marker_finds_only_the_marked_table() {
        let marker = TableMarker::new(r#"table[data-test="historical-prices"]"#).unwrap();
        let rows = parse_rows(PAGE, &marker);
        // the <th> header row has no <td> cells
        assert_eq!(rows.len(), 3);
        assert!(rows[0].is_empty());
        assert_eq!(rows[1][0], "Oct 16, 2026");
    }

    #[test]
    fn missing_table_is_zero_rows() {
        let marker = TableMarker::new("table.history").unwrap();
        assert!(parse_rows("<html><p>blocked</p></html>", &marker).is_empty());
        assert!(parse_rows("<html><p>blocked</p></html>", &HeaderSkip::default()).is_empty());
    }

    #[test]
    fn invalid_marker_css_is_rejected() {
        assert!(TableMarker::new("table[").is_none());
    }
}
