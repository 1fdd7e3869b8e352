//! Sidebar feedback rating.

use anyhow::{anyhow, Result};
use serde::Serialize;

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;
pub const DEFAULT_RATING: u8 = 3;

pub const PROFILE_LINK: &str = "https://github.com/MohamedFarhun";

/// A star rating in `MIN_RATING..=MAX_RATING`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Rating(u8);

impl Default for Rating {
    fn default() -> Self {
        Rating(DEFAULT_RATING)
    }
}

impl Rating {
    pub fn new(stars: u8) -> Result<Self> {
        if !(MIN_RATING..=MAX_RATING).contains(&stars) {
            return Err(anyhow!(
                "rating must be between {} and {}, got {}",
                MIN_RATING,
                MAX_RATING,
                stars
            ));
        }
        Ok(Rating(stars))
    }

    pub fn parse(raw: &str) -> Result<Self> {
        let stars: u8 = raw
            .trim()
            .parse()
            .map_err(|_| anyhow!("rating must be a number, got '{}'", raw))?;
        Self::new(stars)
    }

    pub fn stars(self) -> u8 {
        self.0
    }

    pub fn acknowledgement(self) -> String {
        format!("Thanks for rating us {} stars! 🌟", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_one_through_five() {
        for stars in 1..=5 {
            assert_eq!(Rating::new(stars).unwrap().stars(), stars);
        }
        assert_eq!(Rating::default().stars(), 3);
    }

    #[test]
    fn rejects_out_of_range_and_garbage() {
        assert!(Rating::new(0).is_err());
        assert!(Rating::new(6).is_err());
        assert!(Rating::parse("five").is_err());
        assert!(Rating::parse("-1").is_err());
    }

    #[test]
    fn acknowledgement_names_stars() {
        let rating = Rating::parse(" 4 ").unwrap();
        assert_eq!(rating.acknowledgement(), "Thanks for rating us 4 stars! 🌟");
    }
}
