//! Closed set of cities a school can be located in.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Location {
    Budapest,
    Miskolc,
    Warsaw,
    Krakow,
    Bucharest,
}

impl Location {
    pub const ALL: [Location; 5] = [
        Location::Budapest,
        Location::Miskolc,
        Location::Warsaw,
        Location::Krakow,
        Location::Bucharest,
    ];

    /// Storage representation written to `schools.location`.
    pub fn as_db_str(self) -> &'static str {
        match self {
            Self::Budapest => "budapest",
            Self::Miskolc => "miskolc",
            Self::Warsaw => "warsaw",
            Self::Krakow => "krakow",
            Self::Bucharest => "bucharest",
        }
    }

    pub fn from_db_str(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|location| location.as_db_str() == value)
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_db_str())
    }
}

#[cfg(test)]
mod tests {
    use super::Location;

    #[test]
    fn db_representation_is_reversible_for_every_city() {
        for location in Location::ALL {
            assert_eq!(Location::from_db_str(location.as_db_str()), Some(location));
        }
        assert_eq!(Location::from_db_str("BUDAPEST"), None);
    }
}
