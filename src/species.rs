use crate::config::BASE_CREATURE_SIZE;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The kinds of creature that can live in the zoo
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Species {
    Dog,
    Cat,
    Rabbit,
    Bear,
    Panda,
    Pig,
    Unicorn,
    Frog,
    Penguin,
    Tiger,
    Fish,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown species `{0}`")]
pub struct UnknownSpecies(pub String);

impl Species {
    pub const ALL: [Species; 11] = [
        Species::Dog,
        Species::Cat,
        Species::Rabbit,
        Species::Bear,
        Species::Panda,
        Species::Pig,
        Species::Unicorn,
        Species::Frog,
        Species::Penguin,
        Species::Tiger,
        Species::Fish,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Species::Dog => "dog",
            Species::Cat => "cat",
            Species::Rabbit => "rabbit",
            Species::Bear => "bear",
            Species::Panda => "panda",
            Species::Pig => "pig",
            Species::Unicorn => "unicorn",
            Species::Frog => "frog",
            Species::Penguin => "penguin",
            Species::Tiger => "tiger",
            Species::Fish => "fish",
        }
    }

    /// Relative body size; bears are big, fish are small
    pub fn size_factor(self) -> f32 {
        match self {
            Species::Dog => 1.2,
            Species::Cat => 1.0,
            Species::Rabbit => 0.9,
            Species::Bear => 1.5,
            Species::Panda => 1.3,
            Species::Pig => 1.1,
            Species::Unicorn => 1.2,
            Species::Frog => 0.8,
            Species::Penguin => 1.0,
            Species::Tiger => 1.4,
            Species::Fish => 0.7,
        }
    }

    /// Rendered size in canvas units. Also the wall margin for this species.
    pub fn size(self) -> f32 {
        BASE_CREATURE_SIZE * self.size_factor()
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Species {
    type Err = UnknownSpecies;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Species::ALL
            .into_iter()
            .find(|species| species.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownSpecies(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_parse_back() {
        for species in Species::ALL {
            assert_eq!(species.name().parse::<Species>(), Ok(species));
        }
        assert_eq!(" Tiger ".parse::<Species>(), Ok(Species::Tiger));
    }

    #[test]
    fn unknown_name_is_rejected() {
        let err = "dragon".parse::<Species>().unwrap_err();
        assert_eq!(err.to_string(), "unknown species `dragon`");
    }

    #[test]
    fn size_scales_with_factor() {
        assert!((Species::Bear.size() - 48.0).abs() < 1e-4);
        assert!((Species::Fish.size() - 22.4).abs() < 1e-4);
    }
}
