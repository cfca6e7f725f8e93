use scraper::{ElementRef, Html, Selector};

use crate::{Error, Result};

/// Canonical candidate fields a report column can map onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    BallotName,
    Locality,
    District,
    Group,
    GroupName,
    Party,
    Phone,
    Mobile,
    Website,
    Email,
}

/// Header token → canonical field, one dictionary per report.
pub type HeaderMap = [(&'static str, Field)];

/// A parsed row. Every field is always present; anything the row did not
/// provide is an empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateFields {
    pub ballot_name: String,
    pub locality: String,
    pub district: String,
    pub group: String,
    pub group_name: String,
    pub party: String,
    pub phone: String,
    pub mobile: String,
    pub website: String,
    pub email: String,
}

impl CandidateFields {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::BallotName => &self.ballot_name,
            Field::Locality => &self.locality,
            Field::District => &self.district,
            Field::Group => &self.group,
            Field::GroupName => &self.group_name,
            Field::Party => &self.party,
            Field::Phone => &self.phone,
            Field::Mobile => &self.mobile,
            Field::Website => &self.website,
            Field::Email => &self.email,
        }
    }

    fn slot(&mut self, field: Field) -> &mut String {
        match field {
            Field::BallotName => &mut self.ballot_name,
            Field::Locality => &mut self.locality,
            Field::District => &mut self.district,
            Field::Group => &mut self.group,
            Field::GroupName => &mut self.group_name,
            Field::Party => &mut self.party,
            Field::Phone => &mut self.phone,
            Field::Mobile => &mut self.mobile,
            Field::Website => &mut self.website,
            Field::Email => &mut self.email,
        }
    }
}

/// One cell of a table row, tagged with its `headers` attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCell {
    pub header: String,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    pub cells: Vec<RawCell>,
}

impl RawRow {
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            cells: pairs
                .into_iter()
                .map(|(header, text)| RawCell {
                    header: header.to_owned(),
                    text: text.to_owned(),
                })
                .collect(),
        }
    }
}

/// Maps the recognised, non-empty cells of `row` onto canonical fields.
/// Unknown headers are skipped and column order does not matter.
pub fn parse_row(row: &RawRow, header_map: &HeaderMap) -> CandidateFields {
    let mut fields = CandidateFields::default();
    for cell in &row.cells {
        let Some(&(_, field)) = header_map.iter().find(|(token, _)| *token == cell.header) else {
            continue;
        };
        let text = cell.text.trim();
        if !text.is_empty() {
            *fields.slot(field) = text.to_owned();
        }
    }
    fields
}

/// Snapshot of the rendered candidate page.
pub struct RenderedTable {
    doc: Html,
    row_selector: Selector,
    cell_selector: Selector,
}

impl RenderedTable {
    pub fn parse(source: &str, row_selector: &str, cell_selector: &str) -> Result<Self> {
        Ok(Self {
            doc: Html::parse_document(source),
            row_selector: create_selector(row_selector)?,
            cell_selector: create_selector(cell_selector)?,
        })
    }

    /// Rows in document order. The iterator is single-pass; cells are read as
    /// each row is reached.
    pub fn rows(&self) -> impl Iterator<Item = RawRow> + '_ {
        self.doc
            .select(&self.row_selector)
            .map(|row| read_cells(row, &self.cell_selector))
    }
}

fn read_cells(row: ElementRef<'_>, cell_selector: &Selector) -> RawRow {
    RawRow {
        cells: row
            .select(cell_selector)
            .filter_map(|cell| {
                let header = cell.value().attr("headers")?;
                Some(RawCell {
                    header: header.to_owned(),
                    text: rendered_text(cell),
                })
            })
            .collect(),
    }
}

/// Collapses whitespace the way a browser renders inline text.
fn rendered_text(el: ElementRef<'_>) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

#[inline]
pub(crate) fn create_selector(sel_str: &str) -> Result<Selector> {
    Selector::parse(sel_str).map_err(|_| Error::InvalidSelector(sel_str.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAP: &HeaderMap = &[
        ("CANDIDATEBALLOTNAME", Field::BallotName),
        ("LOCALITY", Field::Locality),
        ("EMAIL", Field::Email),
    ];

    #[test]
    fn missing_fields_default_to_empty() {
        let row = RawRow::from_pairs([("CANDIDATEBALLOTNAME", "Jane Doe")]);
        let fields = parse_row(&row, MAP);

        assert_eq!(fields.ballot_name, "Jane Doe");
        assert_eq!(fields.email, "");
        assert_eq!(fields.get(Field::Locality), "");
    }

    #[test]
    fn unknown_headers_are_ignored() {
        let row = RawRow::from_pairs([
            ("BALLOTPOSITION", "3"),
            ("LOCALITY", "Townsville"),
            ("CANDIDATEBALLOTNAME", "Jane Doe"),
        ]);
        let fields = parse_row(&row, MAP);

        assert_eq!(fields.ballot_name, "Jane Doe");
        assert_eq!(fields.locality, "Townsville");
    }

    #[test]
    fn blank_cells_do_not_overwrite() {
        let row = RawRow::from_pairs([("EMAIL", "jane@example.com"), ("EMAIL", "  ")]);
        assert_eq!(parse_row(&row, MAP).email, "jane@example.com");
    }

    #[test]
    fn table_rows_keep_header_tokens() {
        let html = r#"
            <table>
              <tr id="x_rptCandidatesBySurnameRow_0">
                <td headers="CANDIDATEBALLOTNAME">DOE
                    Jane</td>
                <td>no header</td>
                <td headers="EMAIL"><a href="mailto:j@x">j@x</a></td>
              </tr>
              <tr id="footer"><td headers="LOCALITY">nope</td></tr>
            </table>"#;
        let table =
            RenderedTable::parse(html, "tr[id*='_rptCandidatesBySurnameRow_']", "td[headers]")
                .unwrap();
        let rows: Vec<_> = table.rows().collect();

        assert_eq!(rows.len(), 1);
        assert_eq!(
            rows[0],
            RawRow::from_pairs([("CANDIDATEBALLOTNAME", "DOE Jane"), ("EMAIL", "j@x")])
        );
    }

    #[test]
    fn bad_selector_is_reported() {
        assert!(matches!(
            RenderedTable::parse("", "tr[", "td"),
            Err(Error::InvalidSelector(_))
        ));
    }
}
