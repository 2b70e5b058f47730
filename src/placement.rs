//! Signature placement records
//!
//! Placements arrive as a JSON list of `{page, x, y, width, height}` records.
//! Coordinates are normalized to the page and measured from the top-left
//! corner.

use serde_json::Value;

use crate::error::{PlacementError, ScanError, ScanResult};

/// A normalized signature rectangle on one page
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Zero-based page index (range-checked against the document later)
    pub page: i64,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Placement {
    pub fn new(page: i64, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            page,
            x,
            y,
            width,
            height,
        }
    }

    /// Resolve the page index against a document's page count
    pub fn page_index(&self, page_count: usize) -> Result<usize, PlacementError> {
        usize::try_from(self.page)
            .ok()
            .filter(|&index| index < page_count)
            .ok_or(PlacementError::PageOutOfRange {
                page: self.page,
                page_count,
            })
    }

    /// Check the normalized coordinates
    ///
    /// `x` and `y` must lie in `[0, 1]`, `width` and `height` in `(0, 1]`.
    pub fn validate_bounds(&self) -> Result<(), PlacementError> {
        let origin = [("x", self.x), ("y", self.y)];
        for (field, value) in origin {
            if !(0.0..=1.0).contains(&value) {
                return Err(PlacementError::ValueOutOfRange { field, value });
            }
        }

        let extent = [("width", self.width), ("height", self.height)];
        for (field, value) in extent {
            if !(value > 0.0 && value <= 1.0) {
                return Err(PlacementError::ValueOutOfRange { field, value });
            }
        }

        Ok(())
    }
}

/// Parse the placement payload
///
/// An empty or whitespace-only payload is an empty list.
pub fn parse_placements(payload: &str) -> ScanResult<Vec<Placement>> {
    if payload.trim().is_empty() {
        return Ok(Vec::new());
    }

    let value: Value = serde_json::from_str(payload)
        .map_err(|e| ScanError::MalformedPlacementList(e.to_string()))?;

    let records = value.as_array().ok_or_else(|| {
        ScanError::MalformedPlacementList("expected a JSON list of placements".to_string())
    })?;

    records
        .iter()
        .enumerate()
        .map(|(index, record)| parse_record(index, record))
        .collect()
}

fn parse_record(index: usize, record: &Value) -> ScanResult<Placement> {
    let fields = record.as_object().ok_or_else(|| {
        ScanError::MalformedPlacementList(format!("placement {} is not an object", index))
    })?;

    let page = match fields.get("page") {
        None | Some(Value::Null) => {
            return Err(PlacementError::MissingField {
                index,
                field: "page",
            }
            .into())
        }
        Some(value) => value.as_i64().ok_or(PlacementError::NotNumeric {
            index,
            field: "page",
        })?,
    };

    let number = |field: &'static str| -> Result<f64, PlacementError> {
        match fields.get(field) {
            None | Some(Value::Null) => Err(PlacementError::MissingField { index, field }),
            Some(Value::Number(n)) => n.as_f64().ok_or(PlacementError::NotNumeric { index, field }),
            Some(Value::String(s)) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| PlacementError::NotNumeric { index, field }),
            Some(_) => Err(PlacementError::NotNumeric { index, field }),
        }
    };

    Ok(Placement {
        page,
        x: number("x")?,
        y: number("y")?,
        width: number("width")?,
        height: number("height")?,
    })
}
