use std::io::Read;

use super::normalizer::{normalize_cell, normalize_header};

/// One sheet export held as normalized text: a header row plus data rows.
#[derive(Debug, Clone)]
pub(crate) struct Sheet {
    pub(crate) name: &'static str,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Sheet {
    pub(crate) fn headers(&self) -> &[String] {
        &self.headers
    }

    pub(crate) fn column(&self, header: &str) -> Option<usize> {
        let wanted = normalize_header(header);
        self.headers.iter().position(|candidate| *candidate == wanted)
    }

    pub(crate) fn rows(&self) -> impl Iterator<Item = SheetRow<'_>> {
        self.rows.iter().map(move |cells| SheetRow {
            sheet: self,
            cells,
        })
    }

    pub(crate) fn len(&self) -> usize {
        self.rows.len()
    }
}

/// Borrowed view of one data row with header-based lookup.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SheetRow<'a> {
    sheet: &'a Sheet,
    cells: &'a [String],
}

impl<'a> SheetRow<'a> {
    /// Cell under `header`; an absent column or a short row reads as empty.
    pub(crate) fn get(&self, header: &str) -> &'a str {
        self.sheet
            .column(header)
            .map(|index| self.at(index))
            .unwrap_or("")
    }

    pub(crate) fn at(&self, index: usize) -> &'a str {
        self.cells.get(index).map(String::as_str).unwrap_or("")
    }

    /// Non-empty cells starting at the column named `first`, up to `count` columns wide.
    pub(crate) fn run_from(&self, first: &str, count: usize) -> Vec<String> {
        let Some(start) = self.sheet.column(first) else {
            return Vec::new();
        };
        (start..start + count)
            .map(|index| self.at(index))
            .filter(|value| !value.is_empty())
            .map(str::to_string)
            .collect()
    }
}

pub(crate) fn parse_sheet<R: Read>(name: &'static str, reader: R) -> Result<Sheet, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader
        .headers()?
        .iter()
        .map(normalize_header)
        .collect();

    let mut rows = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        let cells: Vec<String> = record.iter().map(normalize_cell).collect();
        if cells.iter().all(String::is_empty) {
            continue;
        }
        rows.push(cells);
    }

    Ok(Sheet {
        name,
        headers,
        rows,
    })
}
