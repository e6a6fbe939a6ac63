use std::str::FromStr;

use siege_grid_core::{CellCoord, TowerKind};
use thiserror::Error;

/// Separates the structure kind from its coordinates.
const KIND_DELIMITER: char = '@';
/// Separates the column from the row.
const AXIS_DELIMITER: char = ',';

/// Structure requested on the command line as `<kind>@<column>,<row>`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct PlacementRequest {
    pub(crate) kind: TowerKind,
    pub(crate) cell: CellCoord,
}

/// Errors that can occur while parsing a placement request.
#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum PlacementParseError {
    #[error("placement is empty")]
    Empty,
    #[error("missing `@` between kind and cell in `{0}`")]
    MissingCell(String),
    #[error("unknown structure kind `{0}` (expected primary, slow, area or wall)")]
    UnknownKind(String),
    #[error("cell `{0}` must be written as <column>,<row>")]
    MalformedCell(String),
    #[error("invalid coordinate `{0}`")]
    InvalidCoordinate(String),
}

impl FromStr for PlacementRequest {
    type Err = PlacementParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(PlacementParseError::Empty);
        }

        let (kind, cell) = trimmed
            .split_once(KIND_DELIMITER)
            .ok_or_else(|| PlacementParseError::MissingCell(trimmed.to_owned()))?;
        let kind = TowerKind::from_name(kind.trim())
            .ok_or_else(|| PlacementParseError::UnknownKind(kind.trim().to_owned()))?;

        let (column, row) = cell
            .split_once(AXIS_DELIMITER)
            .ok_or_else(|| PlacementParseError::MalformedCell(cell.to_owned()))?;

        Ok(Self {
            kind,
            cell: CellCoord::new(parse_axis(column)?, parse_axis(row)?),
        })
    }
}

fn parse_axis(value: &str) -> Result<u32, PlacementParseError> {
    let trimmed = value.trim();
    trimmed
        .parse()
        .map_err(|_| PlacementParseError::InvalidCoordinate(trimmed.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_kind_and_cell() {
        assert_eq!(
            "slow@3,14".parse::<PlacementRequest>(),
            Ok(PlacementRequest {
                kind: TowerKind::Slow,
                cell: CellCoord::new(3, 14),
            })
        );
        assert_eq!(
            " Wall @ 0 , 2 ".parse::<PlacementRequest>(),
            Ok(PlacementRequest {
                kind: TowerKind::Wall,
                cell: CellCoord::new(0, 2),
            })
        );
    }

    #[test]
    fn rejects_malformed_requests() {
        assert_eq!(
            "".parse::<PlacementRequest>(),
            Err(PlacementParseError::Empty)
        );
        assert_eq!(
            "primary".parse::<PlacementRequest>(),
            Err(PlacementParseError::MissingCell("primary".to_owned()))
        );
        assert_eq!(
            "laser@1,1".parse::<PlacementRequest>(),
            Err(PlacementParseError::UnknownKind("laser".to_owned()))
        );
        assert_eq!(
            "area@5".parse::<PlacementRequest>(),
            Err(PlacementParseError::MalformedCell("5".to_owned()))
        );
        assert_eq!(
            "area@5,-1".parse::<PlacementRequest>(),
            Err(PlacementParseError::InvalidCoordinate("-1".to_owned()))
        );
    }
}
