//! GTFS `stops.txt` parsing.

use std::num::ParseFloatError;

use csv::StringRecord;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::error::FeedError;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Columns that must be present in the header.
const REQUIRED_COLUMNS: [&str; 4] = ["stop_id", "stop_name", "stop_lat", "stop_lon"];

/// A transit stop as served to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    pub id: String,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

/// A single row that could not be turned into a [`Stop`].
#[derive(Debug, thiserror::Error)]
enum RowError {
    #[error("unreadable record: {0}")]
    Record(#[from] csv::Error),

    #[error("{column} is not a number ({value:?}): {source}")]
    Coordinate {
        column: &'static str,
        value: String,
        source: ParseFloatError,
    },
}

/// Column positions resolved from the header row.
struct Columns {
    id: usize,
    name: usize,
    lat: usize,
    lon: usize,
}

impl Columns {
    fn resolve(headers: &StringRecord) -> Result<Self, FeedError> {
        let positions = REQUIRED_COLUMNS.map(|name| headers.iter().position(|h| h == name));

        match positions {
            [Some(id), Some(name), Some(lat), Some(lon)] => Ok(Self { id, name, lat, lon }),
            _ => Err(FeedError::MalformedFeed {
                missing: REQUIRED_COLUMNS
                    .into_iter()
                    .zip(positions)
                    .filter(|(_, pos)| pos.is_none())
                    .map(|(name, _)| name)
                    .collect(),
            }),
        }
    }
}

/// Parse the contents of a GTFS `stops.txt` file.
///
/// A leading UTF-8 byte-order mark is ignored. A header lacking any of
/// `stop_id`, `stop_name`, `stop_lat` or `stop_lon` fails the whole parse.
/// Rows with unparseable coordinates are logged and skipped; a coordinate
/// field missing from a short row reads as `0`. Row order is preserved and
/// duplicate ids are kept.
pub fn parse_stops(data: &[u8]) -> Result<Vec<Stop>, FeedError> {
    let data = data.strip_prefix(UTF8_BOM).unwrap_or(data);

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(data);

    let columns = Columns::resolve(reader.headers()?)?;

    let mut stops = Vec::new();
    for (index, result) in reader.records().enumerate() {
        match result
            .map_err(RowError::from)
            .and_then(|record| parse_row(&record, &columns))
        {
            Ok(stop) => stops.push(stop),
            // Data rows start on line 2, after the header.
            Err(e) => warn!(line = index + 2, error = %e, "Skipping invalid stop row"),
        }
    }

    Ok(stops)
}

fn parse_row(record: &StringRecord, columns: &Columns) -> Result<Stop, RowError> {
    let text = |idx: usize| record.get(idx).unwrap_or("").trim().to_string();

    Ok(Stop {
        id: text(columns.id),
        name: text(columns.name),
        lat: parse_coordinate(record, columns.lat, "stop_lat")?,
        lon: parse_coordinate(record, columns.lon, "stop_lon")?,
    })
}

fn parse_coordinate(
    record: &StringRecord,
    idx: usize,
    column: &'static str,
) -> Result<f64, RowError> {
    let raw = record.get(idx).unwrap_or("0");
    raw.trim()
        .parse::<f64>()
        .map_err(|source| RowError::Coordinate {
            column,
            value: raw.to_string(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stop(id: &str, name: &str, lat: f64, lon: f64) -> Stop {
        Stop {
            id: id.to_string(),
            name: name.to_string(),
            lat,
            lon,
        }
    }

    #[test]
    fn parses_rows_in_order() {
        let data = b"stop_id,stop_name,stop_lat,stop_lon\n\
                     1,Alpha,59.1,17.1\n\
                     2,Beta,59.2,17.2\n";

        let stops = parse_stops(data).unwrap();
        assert_eq!(
            stops,
            vec![stop("1", "Alpha", 59.1, 17.1), stop("2", "Beta", 59.2, 17.2)]
        );
    }

    #[test]
    fn strips_byte_order_mark() {
        let data = b"\xEF\xBB\xBFstop_id,stop_name,stop_lat,stop_lon\n1,Alpha,59.1,17.1\n";

        let stops = parse_stops(data).unwrap();
        assert_eq!(stops, vec![stop("1", "Alpha", 59.1, 17.1)]);
    }

    #[test]
    fn columns_may_appear_in_any_order_among_others() {
        let data = b"stop_lon,location_type,stop_name,stop_id,stop_lat\n\
                     18.06,1,Stockholm C,740000001,59.33\n";

        let stops = parse_stops(data).unwrap();
        assert_eq!(stops, vec![stop("740000001", "Stockholm C", 59.33, 18.06)]);
    }

    #[test]
    fn trims_id_and_name() {
        let data = b"stop_id,stop_name,stop_lat,stop_lon\n  7 ,  Flogsta  , 59.85 ,17.59\n";

        let stops = parse_stops(data).unwrap();
        assert_eq!(stops, vec![stop("7", "Flogsta", 59.85, 17.59)]);
    }

    #[test]
    fn empty_id_and_name_are_kept() {
        let data = b"stop_id,stop_name,stop_lat,stop_lon\n,,1.0,2.0\n";

        let stops = parse_stops(data).unwrap();
        assert_eq!(stops, vec![stop("", "", 1.0, 2.0)]);
    }

    #[test]
    fn skips_rows_with_bad_coordinates() {
        let data = b"stop_id,stop_name,stop_lat,stop_lon\n\
                     1,Alpha,59.1,17.1\n\
                     2,Broken,north,17.2\n\
                     3,Blank,,17.3\n\
                     4,Gamma,59.4,17.4\n";

        let stops = parse_stops(data).unwrap();
        let ids: Vec<&str> = stops.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "4"]);
    }

    #[test]
    fn missing_coordinate_field_reads_as_zero() {
        let data = b"stop_id,stop_name,stop_lat,stop_lon\n\
                     1,Short,59.1\n";

        let stops = parse_stops(data).unwrap();
        assert_eq!(stops, vec![stop("1", "Short", 59.1, 0.0)]);
    }

    #[test]
    fn keeps_duplicate_ids() {
        let data = b"stop_id,stop_name,stop_lat,stop_lon\n\
                     1,Alpha,59.1,17.1\n\
                     1,Alpha again,59.1,17.1\n";

        let stops = parse_stops(data).unwrap();
        assert_eq!(stops.len(), 2);
    }

    #[test]
    fn missing_column_is_fatal() {
        let data = b"stop_id,stop_name,stop_lat\n1,Alpha,59.1\n";

        let err = parse_stops(data).unwrap_err();
        match err {
            FeedError::MalformedFeed { missing } => assert_eq!(missing, vec!["stop_lon"]),
            other => panic!("expected MalformedFeed, got {other:?}"),
        }
    }

    #[test]
    fn empty_input_is_malformed() {
        let err = parse_stops(b"").unwrap_err();
        assert!(matches!(err, FeedError::MalformedFeed { .. }));
    }

    #[test]
    fn header_only_yields_no_stops() {
        let stops = parse_stops(b"stop_id,stop_name,stop_lat,stop_lon\n").unwrap();
        assert!(stops.is_empty());
    }

    #[test]
    fn skips_rows_that_are_not_utf8() {
        let data = b"stop_id,stop_name,stop_lat,stop_lon\n\
                     1,A,1.0,2.0\n\
                     2,\xFF\xFE,3.0,4.0\n\
                     3,C,5.0,6.0\n";
        let stops = parse_stops(data).unwrap();

        let ids: Vec<&str> = stops.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
    }
}
