use anyhow::{anyhow, bail};
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};

/// One line of the screener result table, copied verbatim from the cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockRow {
    #[serde(rename = "Symbol")]
    pub symbol: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Price")]
    pub price: String,
}

fn cell_text(cell: &ElementRef) -> String {
    cell.text().collect::<String>().trim().to_string()
}

fn parse_row(tr: ElementRef, td_selector: &Selector) -> Option<StockRow> {
    let cols: Vec<ElementRef> = tr.select(td_selector).collect();
    match cols.as_slice() {
        [symbol, name, price, ..] => Some(StockRow {
            symbol: cell_text(symbol),
            name: cell_text(name),
            price: cell_text(price),
        }),
        _ => None,
    }
}

/// Extracts the result rows from the screener page source.
///
/// The page must carry a real `<tbody>` tag: html5ever adds one to every
/// table, so the check runs on the raw source. The results table is the
/// first body with a data row (three or more cells); when no body has one,
/// the first body is used and yields no rows. Shorter rows are skipped. A
/// page without any table body is an error rather than an empty result, so
/// a layout change on the screener does not pass for "no stocks".
pub fn parse_data(html: &str) -> anyhow::Result<Vec<StockRow>> {
    let tbody_selector = Selector::parse("tbody").unwrap();
    let tr_selector = Selector::parse("tr").unwrap();
    let td_selector = Selector::parse("td").unwrap();

    if !html.to_ascii_lowercase().contains("<tbody") {
        bail!("no table body found in page source");
    }

    let html_document = Html::parse_document(html);
    let bodies: Vec<ElementRef> = html_document.select(&tbody_selector).collect();
    let table = bodies
        .iter()
        .find(|tbody| {
            tbody
                .select(&tr_selector)
                .any(|tr| parse_row(tr, &td_selector).is_some())
        })
        .or_else(|| bodies.first())
        .ok_or_else(|| anyhow!("no table body found in page source"))?;

    let rows = table
        .select(&tr_selector)
        .filter_map(|tr| parse_row(tr, &td_selector))
        .collect();

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::{parse_data, StockRow};

    #[test]
    fn parse_data_valid_html() {
        let html = r#"
        <table>
            <tbody>
                <tr><td>AAPL</td><td>Apple Inc.</td><td>150.00</td></tr>
            </tbody>
        </table>
        "#;

        let data = parse_data(html).unwrap();

        assert_eq!(
            data,
            vec![StockRow {
                symbol: "AAPL".to_string(),
                name: "Apple Inc.".to_string(),
                price: "150.00".to_string(),
            }]
        );
    }

    #[test]
    fn parse_data_skips_short_rows() {
        let html = r#"
        <table>
            <thead><tr><th>Symbol</th><th>Name</th><th>Price</th></tr></thead>
            <tbody>
                <tr><td>MSFT</td><td>Microsoft Corporation</td><td>410.12</td><td>+1.2%</td></tr>
                <tr><td>ad slot</td></tr>
                <tr><td>NVDA</td><td>NVIDIA Corporation</td><td>120.55</td></tr>
                <tr><td>only</td><td>two</td></tr>
                <tr><td>  ORCL </td><td>
                    <a href="/quote/ORCL">Oracle Corporation</a>
                </td><td>140.01</td></tr>
                <tr></tr>
            </tbody>
        </table>
        "#;

        let data = parse_data(html).unwrap();

        assert_eq!(data.len(), 3);
        assert_eq!(data[0].symbol, "MSFT");
        assert_eq!(data[0].price, "410.12");
        assert_eq!(data[2].symbol, "ORCL");
        assert_eq!(data[2].name, "Oracle Corporation");
    }

    #[test]
    fn parse_data_reads_only_the_first_results_body() {
        let html = r#"
        <table><tbody><tr><td>A</td><td>Alpha</td><td>1</td></tr></tbody></table>
        <table><tbody><tr><td>B</td><td>Beta</td><td>2</td></tr></tbody></table>
        "#;

        let data = parse_data(html).unwrap();

        assert_eq!(data.len(), 1);
        assert_eq!(data[0].symbol, "A");
    }

    #[test]
    fn parse_data_skips_layout_table_before_results() {
        let html = r#"
        <table><tr><td>nav</td></tr></table>
        <table><tbody><tr><td>A</td><td>Alpha</td><td>1</td></tr></tbody></table>
        "#;

        let data = parse_data(html).unwrap();

        assert_eq!(
            data,
            vec![StockRow {
                symbol: "A".to_string(),
                name: "Alpha".to_string(),
                price: "1".to_string(),
            }]
        );
    }

    #[test]
    fn parse_data_table_without_body_tag_fails() {
        let html = "<table><tr><td>A</td><td>Alpha</td><td>1</td></tr></table>";

        let error = parse_data(html).unwrap_err();

        assert_eq!(error.to_string(), "no table body found in page source");
    }

    #[test]
    fn parse_data_empty_body_is_empty_list() {
        let html = "<table><tbody><tr><td>x</td></tr></tbody></table>";

        assert!(parse_data(html).unwrap().is_empty());
    }

    #[test]
    fn parse_data_without_table_body_fails() {
        let html = "<html><body><div>Something went wrong</div></body></html>";

        let error = parse_data(html).unwrap_err();

        assert_eq!(error.to_string(), "no table body found in page source");
    }
}
