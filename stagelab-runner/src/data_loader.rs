//! CSV loading for prices, quarterly financials and earnings surprises.
//!
//! Layout on disk:
//! - `<price_dir>/<SYMBOL>.csv` with Date/Open/High/Low/Close/Volume
//! - `<fundamentals_dir>/<SYMBOL>/financials.csv` with date, revenue,
//!   net income and EPS columns
//! - `<fundamentals_dir>/<SYMBOL>/surprises.csv` (or `earningsdates.csv`)
//!   with date, estimate, reported EPS and surprise columns
//!
//! Header names are matched loosely (lower/title case, common vendor
//! spellings). Unparseable rows are skipped and counted; what survives is
//! sorted, de-duplicated by date and validated by the core types.

use chrono::NaiveDate;
use serde::Deserialize;
use stagelab_core::domain::{
    validate_financials, validate_surprises, BarError, EarningsSurprise, FinancialError, PriceBar,
    PriceSeries, QuarterlyFinancial,
};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse CSV '{}': {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("no usable rows in '{}'", path.display())]
    NoData { path: PathBuf },

    #[error("invalid price data in '{}': {source}", path.display())]
    Bars {
        path: PathBuf,
        #[source]
        source: BarError,
    },

    #[error("invalid fundamentals in '{}': {source}", path.display())]
    Financial {
        path: PathBuf,
        #[source]
        source: FinancialError,
    },
}

/// Raw price row with flexible header names.
#[derive(Debug, Deserialize)]
struct PriceRow {
    #[serde(alias = "Date", alias = "date", alias = "Datetime", alias = "timestamp")]
    date: String,
    #[serde(alias = "Open", alias = "open", alias = "o")]
    open: Option<f64>,
    #[serde(alias = "High", alias = "high", alias = "h")]
    high: Option<f64>,
    #[serde(alias = "Low", alias = "low", alias = "l")]
    low: Option<f64>,
    #[serde(alias = "Close", alias = "close", alias = "c")]
    close: Option<f64>,
    #[serde(alias = "Volume", alias = "volume", alias = "v", default)]
    volume: Option<f64>,
}

/// Raw quarterly financial row.
#[derive(Debug, Deserialize)]
struct FinancialRow {
    #[serde(alias = "Date", alias = "date", alias = "fiscal_date", alias = "Quarter")]
    date: String,
    #[serde(
        alias = "Total Revenue",
        alias = "revenue",
        alias = "Revenue",
        alias = "total_revenue",
        default
    )]
    revenue: Option<f64>,
    #[serde(alias = "Net Income", alias = "net_income", alias = "NetIncome", default)]
    net_income: Option<f64>,
    #[serde(alias = "Diluted EPS", alias = "eps", alias = "EPS", default)]
    eps: Option<f64>,
    #[serde(alias = "Basic EPS", default)]
    basic_eps: Option<f64>,
}

/// Raw earnings-surprise row.
#[derive(Debug, Deserialize)]
struct SurpriseRow {
    #[serde(alias = "Earnings Date", alias = "Date", alias = "date")]
    date: String,
    #[serde(alias = "EPS Estimate", alias = "eps_estimate", alias = "estimate", default)]
    eps_estimate: Option<f64>,
    #[serde(alias = "Reported EPS", alias = "eps_actual", alias = "actual", default)]
    eps_actual: Option<f64>,
    #[serde(
        alias = "Surprise(%)",
        alias = "surprise_percent",
        alias = "Surprise",
        alias = "surprise",
        default
    )]
    surprise_percent: Option<f64>,
}

/// Parse a calendar date, ignoring any time-of-day or offset suffix.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    for fmt in ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d-%m-%Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    // "2024-01-02 00:00:00-05:00", "2024-01-02T16:00:00Z"
    s.get(..10)
        .and_then(|head| NaiveDate::parse_from_str(head, "%Y-%m-%d").ok())
}

/// Missing or non-finite cells become `None`.
fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

fn read_rows<T, R>(path: &Path, mut convert: impl FnMut(T) -> Option<R>) -> Result<Vec<R>, LoadError>
where
    T: for<'de> Deserialize<'de>,
{
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|source| LoadError::Csv {
            path: path.to_path_buf(),
            source,
        })?;

    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for (row_num, result) in reader.deserialize::<T>().enumerate() {
        match result {
            Ok(raw) => match convert(raw) {
                Some(row) => rows.push(row),
                None => {
                    debug!(path = %path.display(), row = row_num + 1, "skipping incomplete row");
                    skipped += 1;
                }
            },
            Err(e) => {
                debug!(path = %path.display(), row = row_num + 1, error = %e, "skipping row");
                skipped += 1;
            }
        }
    }

    if skipped > 0 {
        warn!(path = %path.display(), skipped, "skipped invalid rows");
    }
    if rows.is_empty() {
        return Err(LoadError::NoData {
            path: path.to_path_buf(),
        });
    }
    Ok(rows)
}

/// Sort by date and keep the first record of each date.
fn sort_dedup<T>(rows: &mut Vec<T>, date: impl Fn(&T) -> NaiveDate, path: &Path) {
    rows.sort_by_key(|r| date(r));
    let before = rows.len();
    rows.dedup_by_key(|r| date(r));
    if rows.len() < before {
        warn!(path = %path.display(), removed = before - rows.len(), "removed duplicate dates");
    }
}

/// Load a validated daily price series.
pub fn load_price_csv(path: impl AsRef<Path>) -> Result<PriceSeries, LoadError> {
    let path = path.as_ref();
    let mut bars = read_rows(path, |row: PriceRow| {
        let bar = PriceBar {
            date: parse_date(&row.date)?,
            open: finite(row.open)?,
            high: finite(row.high)?,
            low: finite(row.low)?,
            close: finite(row.close)?,
            volume: finite(row.volume).unwrap_or(0.0),
        };
        bar.validate(0).is_ok().then_some(bar)
    })?;
    sort_dedup(&mut bars, |b| b.date, path);

    let series = PriceSeries::new(bars).map_err(|source| LoadError::Bars {
        path: path.to_path_buf(),
        source,
    })?;
    info!(
        path = %path.display(),
        bars = series.len(),
        from = %series.first().date,
        to = %series.last().date,
        "loaded prices"
    );
    Ok(series)
}

/// Load quarterly financials, oldest first.
pub fn load_financials_csv(path: impl AsRef<Path>) -> Result<Vec<QuarterlyFinancial>, LoadError> {
    let path = path.as_ref();
    let mut records = read_rows(path, |row: FinancialRow| {
        Some(QuarterlyFinancial {
            date: parse_date(&row.date)?,
            revenue: finite(row.revenue),
            net_income: finite(row.net_income),
            eps: finite(row.eps).or(finite(row.basic_eps)),
        })
    })?;
    sort_dedup(&mut records, |r| r.date, path);
    validate_financials(&records).map_err(|source| LoadError::Financial {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), quarters = records.len(), "loaded financials");
    Ok(records)
}

/// Load earnings surprises, oldest first.
///
/// Upcoming reports (no reported EPS and no surprise yet) are dropped.
pub fn load_surprises_csv(path: impl AsRef<Path>) -> Result<Vec<EarningsSurprise>, LoadError> {
    let path = path.as_ref();
    let mut records = read_rows(path, |row: SurpriseRow| {
        let record = EarningsSurprise {
            date: parse_date(&row.date)?,
            eps_estimate: finite(row.eps_estimate),
            eps_actual: finite(row.eps_actual),
            surprise_percent: finite(row.surprise_percent),
        };
        (record.eps_actual.is_some() || record.surprise_percent.is_some()).then_some(record)
    })?;
    sort_dedup(&mut records, |r| r.date, path);
    validate_surprises(&records).map_err(|source| LoadError::Financial {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), reports = records.len(), "loaded surprises");
    Ok(records)
}

/// Fundamentals for one symbol, when both files are present.
#[derive(Debug, Clone, PartialEq)]
pub struct Fundamentals {
    pub financials: Vec<QuarterlyFinancial>,
    pub surprises: Vec<EarningsSurprise>,
}

/// Load `<dir>/<symbol>/financials.csv` and its surprise file.
///
/// `Ok(None)` when either file is absent; a symbol without fundamentals is
/// still screened on price alone.
pub fn load_fundamentals(dir: &Path, symbol: &str) -> Result<Option<Fundamentals>, LoadError> {
    let base = dir.join(symbol);
    let financials_path = base.join("financials.csv");
    let surprise_path = ["surprises.csv", "earningsdates.csv"]
        .iter()
        .map(|name| base.join(name))
        .find(|p| p.is_file());

    let Some(surprise_path) = surprise_path.filter(|_| financials_path.is_file()) else {
        debug!(symbol, dir = %dir.display(), "no fundamentals on disk");
        return Ok(None);
    };

    Ok(Some(Fundamentals {
        financials: load_financials_csv(&financials_path)?,
        surprises: load_surprises_csv(&surprise_path)?,
    }))
}

/// Symbols with a `<SYMBOL>.csv` file in `dir`, sorted by name.
pub fn discover_symbols(dir: &Path) -> Result<Vec<String>, LoadError> {
    let io_err = |source| LoadError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut symbols = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        let is_csv = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        if path.is_file() && is_csv {
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                symbols.push(stem.to_string());
            }
        }
    }
    symbols.sort();
    info!(dir = %dir.display(), count = symbols.len(), "discovered symbols");
    Ok(symbols)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn parse_date_accepts_vendor_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 2);
        assert_eq!(parse_date("2024-01-02"), expected);
        assert_eq!(parse_date("2024/01/02"), expected);
        assert_eq!(parse_date("01/02/2024"), expected);
        assert_eq!(parse_date("2024-01-02 00:00:00-05:00"), expected);
        assert_eq!(parse_date(" 2024-01-02T16:00:00Z "), expected);
        assert_eq!(parse_date("yesterday"), None);
    }

    #[test]
    fn price_csv_sorted_deduped_and_skips_bad_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "AAA.csv",
            "Date,Open,High,Low,Close,Volume\n\
             2024-01-03,11,12,10,11.5,1000\n\
             2024-01-02,10,11,9,10.5,900\n\
             2024-01-03,11,12,10,11.5,1000\n\
             2024-01-04,,13,11,12.5,1100\n\
             not-a-date,1,2,0.5,1.5,10\n\
             2024-01-05,12,11,13,12,1000\n\
             2024-01-08,12.5,13.5,12,13,1200\n",
        );

        let series = load_price_csv(&path).unwrap();
        let dates: Vec<String> = series.bars().iter().map(|b| b.date.to_string()).collect();
        assert_eq!(dates, vec!["2024-01-02", "2024-01-03", "2024-01-08"]);
        assert_eq!(series.last().close, 13.0);
    }

    #[test]
    fn lowercase_headers_and_missing_volume() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "BBB.csv",
            "date,open,high,low,close\n2024-02-01,5,6,4,5.5\n2024-02-02,5.5,6.5,5,6\n",
        );
        let series = load_price_csv(&path).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.first().volume, 0.0);
    }

    #[test]
    fn empty_price_file_is_no_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "CCC.csv", "Date,Open,High,Low,Close,Volume\n");
        assert!(matches!(
            load_price_csv(&path),
            Err(LoadError::NoData { .. })
        ));
    }

    #[test]
    fn financials_keep_missing_cells_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "financials.csv",
            "date,Total Revenue,Net Income,Diluted EPS\n\
             2024-06-30,130,13,1.3\n\
             2024-03-31,120,,1.2\n\
             2023-12-31,110,11,NaN\n",
        );
        let records = load_financials_csv(&path).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].date, NaiveDate::from_ymd_opt(2023, 12, 31).unwrap());
        assert_eq!(records[0].eps, None);
        assert_eq!(records[1].net_income, None);
        assert_eq!(records[2].revenue, Some(130.0));
    }

    #[test]
    fn surprises_drop_upcoming_reports() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "earningsdates.csv",
            "Earnings Date,EPS Estimate,Reported EPS,Surprise(%)\n\
             2024-10-30 16:00:00-04:00,1.4,,\n\
             2024-07-30 16:00:00-04:00,1.2,1.3,8.33\n\
             2024-04-30 16:00:00-04:00,1.1,1.2,9.09\n",
        );
        let records = load_surprises_csv(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].surprise_percent, Some(8.33));
    }

    #[test]
    fn fundamentals_absent_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(load_fundamentals(dir.path(), "ZZZ").unwrap(), None);
    }

    #[test]
    fn discover_lists_csv_stems_sorted() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "MSFT.csv", "");
        write_file(dir.path(), "AAPL.csv", "");
        write_file(dir.path(), "notes.txt", "");
        std::fs::create_dir(dir.path().join("NVDA")).unwrap();
        assert_eq!(discover_symbols(dir.path()).unwrap(), vec!["AAPL", "MSFT"]);
    }
}
