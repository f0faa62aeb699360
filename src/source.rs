use csv::StringRecord;
use tracing::info;

use crate::error::{ParseError, PipelineError};

/// Fetch the CSV at `url` and return the raw body.
///
/// Transport failures and non-success statuses are both reported as
/// [`PipelineError::Fetch`].
pub async fn fetch_csv(client: &reqwest::Client, url: &str) -> Result<Vec<u8>, PipelineError> {
    let fetch_err = |source: reqwest::Error| PipelineError::Fetch {
        url: url.to_string(),
        source,
    };

    info!("Fetching CSV: {}", url);
    let response = client
        .get(url)
        .send()
        .await
        .map_err(fetch_err)?
        .error_for_status()
        .map_err(fetch_err)?;
    let body = response.bytes().await.map_err(fetch_err)?;

    info!("Fetched {} bytes", body.len());
    Ok(body.to_vec())
}

/// Parse CSV bytes into rows. The header is returned as an ordinary row.
///
/// Field counts must match the first row, and quoting must be well formed.
pub fn parse_records(bytes: &[u8]) -> Result<Vec<StringRecord>, PipelineError> {
    check_quotes(bytes)?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_reader(bytes);

    let records = reader
        .records()
        .collect::<Result<Vec<_>, _>>()
        .map_err(ParseError::from)?;
    info!("Parsed {} CSV rows (including header)", records.len());
    Ok(records)
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum QuoteState {
    FieldStart,
    Unquoted,
    Quoted,
    /// Saw `"` inside a quoted field: either `""` or the closing quote.
    QuoteInQuoted,
}

/// Reject quoting the csv reader would otherwise accept silently: a `"`
/// inside an unquoted field, text after a closing quote, and a quoted field
/// still open at end of input.
fn check_quotes(bytes: &[u8]) -> Result<(), ParseError> {
    use QuoteState::*;

    let mut state = FieldStart;
    let mut line = 1u64;
    let mut quote_line = 1u64;

    for &b in bytes {
        state = match (state, b) {
            (FieldStart, b'"') => {
                quote_line = line;
                Quoted
            }
            (FieldStart | Unquoted, b',' | b'\n' | b'\r') => FieldStart,
            (Unquoted, b'"') => return Err(ParseError::BareQuote { line }),
            (FieldStart | Unquoted, _) => Unquoted,
            (Quoted, b'"') => QuoteInQuoted,
            (Quoted, _) => Quoted,
            (QuoteInQuoted, b'"') => Quoted,
            (QuoteInQuoted, b',' | b'\n' | b'\r') => FieldStart,
            (QuoteInQuoted, _) => return Err(ParseError::BareQuote { line }),
        };
        if b == b'\n' {
            line += 1;
        }
    }

    if state == Quoted {
        return Err(ParseError::UnterminatedQuote { line: quote_line });
    }
    Ok(())
}

pub async fn load_records(
    client: &reqwest::Client,
    url: &str,
) -> Result<Vec<StringRecord>, PipelineError> {
    let body = fetch_csv(client, url).await?;
    parse_records(&body)
}
