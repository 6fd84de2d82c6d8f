//! Extract table rows and links from raw HTML pages.
//!
//! Both the dataset catalog and the directory listings are plain HTML
//! tables. Parsing uses the `scraper` crate with CSS selectors; tables,
//! rows, cells, and anchors are matched in document order, nested markup
//! included.

use scraper::{ElementRef, Html, Selector};

use crate::types::{DatasetError, DatasetResult};

/// Where the data rows live on a page and how much chrome surrounds them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableLayout {
    /// Zero-based index of the table among all tables in the document.
    pub table_index: usize,
    /// Rows to drop at the top (headers, separators, parent links).
    pub skip_leading: usize,
    /// Rows to drop at the bottom (footers).
    pub skip_trailing: usize,
}

impl TableLayout {
    /// Auto-generated directory listing: header, separator, and parent-directory
    /// rows at the top, a separator row at the bottom.
    pub const LISTING: TableLayout = TableLayout {
        table_index: 0,
        skip_leading: 3,
        skip_trailing: 1,
    };

    /// Dataset catalog page: the sixth table, one header row.
    pub const CATALOG: TableLayout = TableLayout {
        table_index: 5,
        skip_leading: 1,
        skip_trailing: 0,
    };
}

/// An anchor with an `href`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub href: String,
    pub text: String,
}

/// One data row of a table.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Row {
    /// Anchors with an `href`, in document order.
    pub links: Vec<Link>,
    /// Trimmed text of every `<td>`, in document order.
    pub cells: Vec<String>,
}

impl Row {
    /// The first link target of the row, if any.
    pub fn href(&self) -> Option<&str> {
        self.links.first().map(|l| l.href.as_str())
    }
}

fn selector(css: &str, url: &str) -> DatasetResult<Selector> {
    Selector::parse(css).map_err(|e| DatasetError::parse(url, format!("bad selector {css}: {e}")))
}

fn element_text(el: &ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// Parse the data rows of the table selected by `layout`.
///
/// `url` only tags errors. A missing table is a parse error; a table that
/// holds nothing but chrome yields no rows.
pub fn parse_rows(html: &str, url: &str, layout: TableLayout) -> DatasetResult<Vec<Row>> {
    let document = Html::parse_document(html);
    let table_sel = selector("table", url)?;
    let tr_sel = selector("tr", url)?;
    let td_sel = selector("td", url)?;
    let a_sel = selector("a[href]", url)?;

    let table = document
        .select(&table_sel)
        .nth(layout.table_index)
        .ok_or_else(|| {
            DatasetError::parse(url, format!("no table at index {}", layout.table_index))
        })?;

    let rows: Vec<ElementRef<'_>> = table.select(&tr_sel).collect();
    let end = rows.len().saturating_sub(layout.skip_trailing);
    if layout.skip_leading >= end {
        return Ok(Vec::new());
    }

    let parsed = rows[layout.skip_leading..end]
        .iter()
        .map(|row| Row {
            links: row
                .select(&a_sel)
                .map(|a| Link {
                    href: a.value().attr("href").unwrap_or_default().to_string(),
                    text: element_text(&a),
                })
                .collect(),
            cells: row.select(&td_sel).map(|td| element_text(&td)).collect(),
        })
        .collect();

    Ok(parsed)
}

/// Find the first anchor whose trimmed text equals `text`, ignoring case.
pub fn find_link_by_text(html: &str, text: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let sel = Selector::parse("a[href]").ok()?;
    document
        .select(&sel)
        .find(|a| element_text(a).eq_ignore_ascii_case(text))
        .and_then(|a| a.value().attr("href"))
        .map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING_HTML: &str = r#"
    <html><body><h1>Index of /ml/machine-learning-databases/iris</h1>
    <table>
      <tr><th valign="top"><img src="/icons/blank.gif" alt="[ICO]"></th><th><a href="?C=N;O=D">Name</a></th><th><a href="?C=M;O=A">Last modified</a></th><th><a href="?C=S;O=A">Size</a></th><th><a href="?C=D;O=A">Description</a></th></tr>
      <tr><th colspan="5"><hr></th></tr>
      <tr><td valign="top"><img src="/icons/back.gif" alt="[PARENTDIR]"></td><td><a href="/ml/machine-learning-databases/">Parent Directory</a></td><td>&nbsp;</td><td align="right">  - </td><td>&nbsp;</td></tr>
      <tr><td valign="top"><img src="/icons/text.gif" alt="[TXT]"></td><td><a href="Index">Index</a></td><td align="right">2019-12-05 10:49  </td><td align="right">105 </td><td>&nbsp;</td></tr>
      <tr><td valign="top"><img src="/icons/folder.gif" alt="[DIR]"></td><td><a href="old/">old/</a></td><td align="right">2020-01-02 11:00  </td><td align="right">  - </td><td>&nbsp;</td></tr>
      <tr><td valign="top"><img src="/icons/unknown.gif" alt="[   ]"></td><td><a href="iris.data">iris.data</a></td><td align="right">2019-12-05 10:49  </td><td align="right">4.4K</td><td>Fisher data</td></tr>
      <tr><th colspan="5"><hr></th></tr>
    </table>
    </body></html>
    "#;

    #[test]
    fn test_listing_skips_chrome_rows() {
        let rows = parse_rows(LISTING_HTML, "https://x/", TableLayout::LISTING).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].href(), Some("Index"));
        assert_eq!(rows[1].href(), Some("old/"));
        assert_eq!(rows[2].href(), Some("iris.data"));
    }

    #[test]
    fn test_listing_cells_are_trimmed() {
        let rows = parse_rows(LISTING_HTML, "https://x/", TableLayout::LISTING).unwrap();
        let cells = &rows[2].cells;
        assert_eq!(cells.len(), 5);
        assert_eq!(cells[0], "");
        assert_eq!(cells[1], "iris.data");
        assert_eq!(cells[2], "2019-12-05 10:49");
        assert_eq!(cells[3], "4.4K");
        assert_eq!(cells[4], "Fisher data");
        // &nbsp; collapses to an empty description
        assert_eq!(rows[0].cells[4], "");
    }

    #[test]
    fn test_missing_table_is_parse_error() {
        let html = "<html><body>nothing</body></html>";
        let err = parse_rows(html, "https://x/page", TableLayout::LISTING).unwrap_err();
        assert!(matches!(err, DatasetError::Parse { ref url, .. } if url == "https://x/page"));
    }

    #[test]
    fn test_chrome_only_table_yields_no_rows() {
        let html = "<table><tr><th>a</th></tr><tr><th>b</th></tr><tr><td>c</td></tr><tr><td>d</td></tr></table>";
        let rows = parse_rows(html, "https://x/", TableLayout::LISTING).unwrap();
        assert!(rows.is_empty());

        let rows = parse_rows("<table></table>", "https://x/", TableLayout::LISTING).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_table_index_selects_nth_table() {
        let html = r#"
        <table><tr><td>zero</td></tr></table>
        <table>
          <tr><td>header</td></tr>
          <tr><td><a href="a.html">img</a><a href="datasets/Iris">Iris</a></td></tr>
        </table>"#;
        let layout = TableLayout {
            table_index: 1,
            skip_leading: 1,
            skip_trailing: 0,
        };
        let rows = parse_rows(html, "https://x/", layout).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].links.len(), 2);
        assert_eq!(rows[0].links[1].text, "Iris");
        assert_eq!(rows[0].links[1].href, "datasets/Iris");
    }

    #[test]
    fn test_find_link_by_text() {
        let html = r#"<p><a href="../machine-learning-databases/iris/"><font size="4">Data Folder</font></a>
            <a href="../other">Data Set Description</a></p>"#;
        assert_eq!(
            find_link_by_text(html, "data folder").as_deref(),
            Some("../machine-learning-databases/iris/")
        );
        assert_eq!(find_link_by_text(html, "Download"), None);
    }

    #[test]
    fn test_no_panic_on_malformed_html() {
        let inputs = ["", "<", "<table", "<table><tr><td>", "<<<>>>", "\x00\x01"];
        for input in &inputs {
            let _ = parse_rows(input, "https://x/", TableLayout::LISTING);
            let _ = parse_rows(input, "https://x/", TableLayout::CATALOG);
            let _ = find_link_by_text(input, "Data Folder");
        }
    }
}
