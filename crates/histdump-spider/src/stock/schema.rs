use serde::{Deserialize, Serialize};
use std::fmt;

/// Cell count of a price row: Date, Open, High, Low, Close, Adj Close, Volume.
pub const PRICE_CELLS: usize = 7;

/// Cell count of a dividend row: Date, "<amount> Dividend".
pub const DIVIDEND_CELLS: usize = 2;

const DIVIDEND_SUFFIX: &str = " Dividend";

// ticker
// ----------------------------------------------------------------------------

/// A ticker symbol, as read from one line of the ticker list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ticker(String);

impl Ticker {
    /// Trim `line`; blank lines are not tickers.
    pub fn parse(line: &str) -> Option<Self> {
        let symbol = line.trim();
        match symbol.is_empty() {
            true => None,
            false => Some(Self(symbol.to_string())),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the symbol can name a file directly under the output root:
    /// no path separators, and not `.` or `..`.
    pub fn is_file_safe(&self) -> bool {
        !matches!(self.0.as_str(), "." | "..")
            && !self.0.contains(|c: char| c == '/' || c == '\\' || c == '\0')
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// records
// ----------------------------------------------------------------------------
//
// Every field is the raw text of its table cell; nothing is parsed or trimmed.

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PriceRecord {
    pub date: String,
    pub open: String,
    pub high: String,
    pub low: String,
    pub close: String,
    pub adj_close: String,
    pub volume: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DividendRecord {
    pub date: String,
    pub amount: String,
}

/// The outcome of classifying a single table row by its cell count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classified {
    Price(PriceRecord),
    Dividend(DividendRecord),
    Discarded,
}

/// Classify one row's cells: 7 cells are prices, 2 cells are a dividend,
/// anything else (section dividers, notes, ads) is noise.
pub fn classify(cells: Vec<String>) -> Classified {
    match cells.len() {
        PRICE_CELLS => {
            let [date, open, high, low, close, adj_close, volume]: [String; PRICE_CELLS] =
                match cells.try_into() {
                    Ok(cells) => cells,
                    Err(_) => return Classified::Discarded,
                };
            Classified::Price(PriceRecord {
                date,
                open,
                high,
                low,
                close,
                adj_close,
                volume,
            })
        }
        DIVIDEND_CELLS => {
            let mut cells = cells.into_iter();
            let date = cells.next().unwrap_or_default();
            let amount = cells.next().unwrap_or_default();
            Classified::Dividend(DividendRecord {
                date,
                amount: strip_dividend_suffix(&amount).to_string(),
            })
        }
        _ => Classified::Discarded,
    }
}

/// `"$0.42 Dividend"` -> `"$0.42"`; exact, case-sensitive, trailing only.
pub fn strip_dividend_suffix(amount: &str) -> &str {
    amount.strip_suffix(DIVIDEND_SUFFIX).unwrap_or(amount)
}

// datasets
// ----------------------------------------------------------------------------

/// All price rows of one ticker, in table order (newest first, as served).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "PriceColumns", from = "PriceColumns")]
pub struct HistoricalDataset(pub Vec<PriceRecord>);

/// All dividend rows of one ticker, in table order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "DividendColumns", from = "DividendColumns")]
pub struct DividendDataset(pub Vec<DividendRecord>);

/// Both datasets extracted from one history page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extracted {
    pub prices: HistoricalDataset,
    pub dividends: DividendDataset,
}

/// Classify every row, keeping price and dividend records in row order.
pub fn extract<I>(rows: I) -> Extracted
where
    I: IntoIterator<Item = Vec<String>>,
{
    let mut extracted = Extracted::default();
    for row in rows {
        match classify(row) {
            Classified::Price(price) => extracted.prices.0.push(price),
            Classified::Dividend(dividend) => extracted.dividends.0.push(dividend),
            Classified::Discarded => continue,
        }
    }
    extracted
}

// output
// ----------------------------------------------------------------------------
//
// On disk, each dataset is one object of parallel arrays, e.g.
// {
//     "Date": ["Oct 16, 2026", ...],
//     "Open": ["231.10", ...],
//     ...
//     "Volume": ["45,120,300", ...]
// }

#[derive(Debug, Default, Serialize, Deserialize)]
struct PriceColumns {
    #[serde(rename = "Date")]
    date: Vec<String>,
    #[serde(rename = "Open")]
    open: Vec<String>,
    #[serde(rename = "High")]
    high: Vec<String>,
    #[serde(rename = "Low")]
    low: Vec<String>,
    #[serde(rename = "Close")]
    close: Vec<String>,
    #[serde(rename = "Adj Close")]
    adj_close: Vec<String>,
    #[serde(rename = "Volume", default)]
    volume: Vec<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct DividendColumns {
    #[serde(rename = "Date")]
    date: Vec<String>,
    #[serde(rename = "Amount")]
    amount: Vec<String>,
}

impl From<HistoricalDataset> for PriceColumns {
    fn from(dataset: HistoricalDataset) -> Self {
        let mut columns = PriceColumns::default();
        for price in dataset.0 {
            columns.date.push(price.date);
            columns.open.push(price.open);
            columns.high.push(price.high);
            columns.low.push(price.low);
            columns.close.push(price.close);
            columns.adj_close.push(price.adj_close);
            columns.volume.push(price.volume);
        }
        columns
    }
}

// short columns (e.g. files written without a Volume column) read as empty cells
impl From<PriceColumns> for HistoricalDataset {
    fn from(columns: PriceColumns) -> Self {
        let cell = |column: &Vec<String>, i: usize| column.get(i).cloned().unwrap_or_default();
        let prices = (0..columns.date.len())
            .map(|i| PriceRecord {
                date: cell(&columns.date, i),
                open: cell(&columns.open, i),
                high: cell(&columns.high, i),
                low: cell(&columns.low, i),
                close: cell(&columns.close, i),
                adj_close: cell(&columns.adj_close, i),
                volume: cell(&columns.volume, i),
            })
            .collect();
        HistoricalDataset(prices)
    }
}

impl From<DividendDataset> for DividendColumns {
    fn from(dataset: DividendDataset) -> Self {
        let (date, amount) = dataset
            .0
            .into_iter()
            .map(|dividend| (dividend.date, dividend.amount))
            .unzip();
        DividendColumns { date, amount }
    }
}

impl From<DividendColumns> for DividendDataset {
    fn from(columns: DividendColumns) -> Self {
        let dividends = columns
            .date
            .into_iter()
            .zip(columns.amount)
            .map(|(date, amount)| DividendRecord { date, amount })
            .collect();
        DividendDataset(dividends)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|text| text.to_string()).collect()
    }

    #[test]
    fn ticker_is_trimmed_and_never_blank() {
        assert_eq!(Ticker::parse("  AAPL \r").unwrap().as_str(), "AAPL");
        assert!(Ticker::parse("   ").is_none());
        assert!(Ticker::parse("").is_none());
    }

    #[test]
    fn ticker_file_safety() {
        for symbol in ["AAPL", "BRK.B", "^GSPC", "..A"] {
            assert!(Ticker::parse(symbol).unwrap().is_file_safe(), "{symbol}");
        }
        for symbol in ["../ESCAPED", "a/b", "a\\b", ".", ".."] {
            assert!(!Ticker::parse(symbol).unwrap().is_file_safe(), "{symbol}");
        }
    }

    #[test]
    fn seven_cells_is_a_price_row() {
        let row = cells(&[
            "Oct 16, 2026",
            "231.10",
            "233.00",
            "229.85",
            "232.40",
            "232.40",
            "45,120,300",
        ]);
        let Classified::Price(price) = classify(row) else {
            panic!("expected a price row");
        };
        assert_eq!(price.date, "Oct 16, 2026");
        assert_eq!(price.open, "231.10");
        assert_eq!(price.high, "233.00");
        assert_eq!(price.low, "229.85");
        assert_eq!(price.close, "232.40");
        assert_eq!(price.adj_close, "232.40");
    }

    // The scraper this replaced declared Volume but never filled it in; it is
    // now taken from the seventh cell.
    #[test]
    fn price_row_captures_volume() {
        let row = cells(&["d", "o", "h", "l", "c", "a", "45,120,300"]);
        match classify(row) {
            Classified::Price(price) => assert_eq!(price.volume, "45,120,300"),
            other => panic!("expected a price row, got {other:?}"),
        }
    }

    #[test]
    fn two_cells_is_a_dividend_row() {
        let row = cells(&["Aug 12, 2026", "$0.42 Dividend"]);
        assert_eq!(
            classify(row),
            Classified::Dividend(DividendRecord {
                date: "Aug 12, 2026".to_string(),
                amount: "$0.42".to_string(),
            })
        );
    }

    #[test]
    fn dividend_suffix_is_exact_and_trailing() {
        assert_eq!(strip_dividend_suffix("$0.42 Dividend"), "$0.42");
        assert_eq!(strip_dividend_suffix("$0.42"), "$0.42");
        assert_eq!(strip_dividend_suffix("$0.42 dividend"), "$0.42 dividend");
        assert_eq!(strip_dividend_suffix("$0.42 Dividend "), "$0.42 Dividend ");
        assert_eq!(strip_dividend_suffix(" $0.42  Dividend"), " $0.42 ");
    }

    #[test]
    fn other_cell_counts_are_discarded() {
        for n in [0, 1, 3, 4, 5, 6, 8, 12] {
            let row = vec!["x".to_string(); n];
            assert_eq!(classify(row), Classified::Discarded, "{n} cells");
        }
    }

    #[test]
    fn extract_keeps_row_order_and_splits_datasets() {
        let rows = vec![
            cells(&["d1", "1", "2", "3", "4", "5", "6"]),
            cells(&["d2", "$0.10 Dividend"]),
            cells(&["*Close price adjusted for splits."]),
            cells(&["d3", "7", "8", "9", "10", "11", "12"]),
        ];
        let extracted = extract(rows);
        let dates: Vec<_> = extracted.prices.0.iter().map(|p| p.date.as_str()).collect();
        assert_eq!(dates, vec!["d1", "d3"]);
        assert_eq!(extracted.dividends.0.len(), 1);
        assert_eq!(extracted.dividends.0[0].amount, "$0.10");
    }

    #[test]
    fn historical_dataset_serializes_as_ordered_columns() {
        let dataset = HistoricalDataset(vec![PriceRecord {
            date: "d".into(),
            open: "o".into(),
            high: "h".into(),
            low: "l".into(),
            close: "c".into(),
            adj_close: "a".into(),
            volume: "v".into(),
        }]);
        let json = serde_json::to_string(&dataset).unwrap();
        assert_eq!(
            json,
            r#"{"Date":["d"],"Open":["o"],"High":["h"],"Low":["l"],"Close":["c"],"Adj Close":["a"],"Volume":["v"]}"#
        );
    }

    #[test]
    fn empty_datasets_still_carry_every_key() {
        let prices = serde_json::to_string(&HistoricalDataset::default()).unwrap();
        assert_eq!(
            prices,
            r#"{"Date":[],"Open":[],"High":[],"Low":[],"Close":[],"Adj Close":[],"Volume":[]}"#
        );
        let dividends = serde_json::to_string(&DividendDataset::default()).unwrap();
        assert_eq!(dividends, r#"{"Date":[],"Amount":[]}"#);
    }

    #[test]
    fn missing_volume_column_reads_as_blank() {
        let json = r#"{"Date":["d"],"Open":["o"],"High":["h"],"Low":["l"],"Close":["c"],"Adj Close":["a"],"Volume":[]}"#;
        let dataset: HistoricalDataset = serde_json::from_str(json).unwrap();
        assert_eq!(dataset.0.len(), 1);
        assert_eq!(dataset.0[0].volume, "");
    }
}
