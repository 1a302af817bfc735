//! Paged list view with optimistic edits and CSV export

use std::cmp::Ordering;

use serde_json::Value;
use shared::fields::{lookup, text_of};
use shared::{extract_page, ListQuery, Page, RecordId};

use crate::error::AppResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Rows currently shown in a list table
#[derive(Debug, Clone, Default)]
pub struct RecordList {
    query: ListQuery,
    page: Page<Value>,
}

impl RecordList {
    pub fn new(query: ListQuery) -> Self {
        Self {
            query,
            page: Page::default(),
        }
    }

    /// Replace the rows from a list response in any known envelope
    pub fn set_page(&mut self, query: ListQuery, body: &Value) {
        self.query = query;
        self.page = extract_page(body);
    }

    pub fn rows(&self) -> &[Value] {
        &self.page.results
    }

    pub fn count(&self) -> u64 {
        self.page.count
    }

    pub fn query(&self) -> &ListQuery {
        &self.query
    }

    pub fn total_pages(&self) -> u64 {
        let size = u64::from(self.query.page_size.max(1));
        self.page.count.div_ceil(size).max(1)
    }

    fn position(&self, id: &RecordId) -> Option<usize> {
        self.page
            .results
            .iter()
            .position(|row| row.get("id").and_then(RecordId::from_value).as_ref() == Some(id))
    }

    /// Take a row out ahead of the server confirming the delete
    pub fn remove(&mut self, id: &RecordId) -> Option<(usize, Value)> {
        let index = self.position(id)?;
        let row = self.page.results.remove(index);
        self.page.count = self.page.count.saturating_sub(1);
        Some((index, row))
    }

    /// Put back a row taken by [`RecordList::remove`]
    pub fn restore(&mut self, index: usize, row: Value) {
        let index = index.min(self.page.results.len());
        self.page.results.insert(index, row);
        self.page.count += 1;
    }

    /// Replace the row with the same id, or prepend a new one
    pub fn upsert(&mut self, row: Value) {
        let id = row.get("id").and_then(RecordId::from_value);
        match id.and_then(|id| self.position(&id)) {
            Some(index) => self.page.results[index] = row,
            None => {
                self.page.results.insert(0, row);
                self.page.count += 1;
            }
        }
    }

    /// Client-side sort of the current page. Numbers sort numerically, text
    /// case-insensitively, missing values last in either direction.
    pub fn sort_by(&mut self, key: &str, direction: SortDirection) {
        self.page.results.sort_by(|a, b| {
            let left = lookup(a, key).filter(|v| !v.is_null());
            let right = lookup(b, key).filter(|v| !v.is_null());
            match (left, right) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(x), Some(y)) => {
                    let ordering = compare_values(x, y);
                    match direction {
                        SortDirection::Ascending => ordering,
                        SortDirection::Descending => ordering.reverse(),
                    }
                }
            }
        });
    }

    /// Current rows as CSV. `columns` pairs a header with a dotted field path.
    pub fn export_csv(&self, columns: &[(&str, &str)]) -> AppResult<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        wtr.write_record(columns.iter().map(|(header, _)| *header))?;
        for row in &self.page.results {
            wtr.write_record(columns.iter().map(|(_, path)| cell(row, path)))?;
        }
        let bytes = wtr
            .into_inner()
            .map_err(|e| crate::error::AppError::Export(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| crate::error::AppError::Export(e.to_string()))
    }
}

fn compare_values(x: &Value, y: &Value) -> Ordering {
    match (x.as_f64(), y.as_f64()) {
        (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
        _ => {
            let a = text_of(x).unwrap_or_default().to_lowercase();
            let b = text_of(y).unwrap_or_default().to_lowercase();
            a.cmp(&b)
        }
    }
}

fn cell(row: &Value, path: &str) -> String {
    match lookup(row, path) {
        Some(Value::Bool(b)) => b.to_string(),
        Some(value) => text_of(value).unwrap_or_default(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> RecordList {
        let mut list = RecordList::new(ListQuery::with_page_size(2));
        list.set_page(
            ListQuery::with_page_size(2),
            &json!({"data": {"results": [
                {"id": 1, "name": "bravo", "total_amount": 120.5, "supplier": {"name": "Agro"}},
                {"id": 2, "name": "Alpha", "total_amount": 99, "supplier": null},
                {"id": 3, "name": "charlie", "supplier": {"name": "Chem, Ltd"}}
            ], "count": 3}}),
        );
        list
    }

    #[test]
    fn test_set_page_reads_envelope() {
        let list = sample();
        assert_eq!(list.rows().len(), 3);
        assert_eq!(list.count(), 3);
        assert_eq!(list.total_pages(), 2);
    }

    #[test]
    fn test_remove_and_restore_keep_position() {
        let mut list = sample();
        let (index, row) = list.remove(&RecordId::Int(2)).unwrap();
        assert_eq!(index, 1);
        assert_eq!(list.count(), 2);
        assert!(list.remove(&RecordId::Int(42)).is_none());

        list.restore(index, row);
        assert_eq!(list.rows()[1]["id"], json!(2));
        assert_eq!(list.count(), 3);
    }

    #[test]
    fn test_upsert_replaces_or_prepends() {
        let mut list = sample();
        list.upsert(json!({"id": 3, "name": "charlie v2"}));
        assert_eq!(list.rows()[2]["name"], json!("charlie v2"));
        list.upsert(json!({"id": 9, "name": "new"}));
        assert_eq!(list.rows()[0]["id"], json!(9));
        assert_eq!(list.count(), 4);
    }

    #[test]
    fn test_sort_puts_missing_values_last() {
        let mut list = sample();
        list.sort_by("total_amount", SortDirection::Ascending);
        let ids: Vec<_> = list.rows().iter().map(|r| r["id"].clone()).collect();
        assert_eq!(ids, vec![json!(2), json!(1), json!(3)]);

        list.sort_by("total_amount", SortDirection::Descending);
        let ids: Vec<_> = list.rows().iter().map(|r| r["id"].clone()).collect();
        assert_eq!(ids, vec![json!(1), json!(2), json!(3)]);

        list.sort_by("name", SortDirection::Ascending);
        assert_eq!(list.rows()[0]["name"], json!("Alpha"));
    }

    #[test]
    fn test_export_csv_quotes_and_nested_paths() {
        let list = sample();
        let csv = list
            .export_csv(&[("ID", "id"), ("Supplier", "supplier.name")])
            .unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "ID,Supplier");
        assert_eq!(lines[1], "1,Agro");
        assert_eq!(lines[2], "2,");
        assert_eq!(lines[3], "3,\"Chem, Ltd\"");
    }
}
