//! Billing route names

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown route: {0}")]
pub struct UnknownRoute(pub String);

/// A provable billing route
///
/// Each route has a `bsrun<Name>` launcher and a matching `bsprove<Name>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Route {
    Adjustment,
    Advance,
    Daily,
    Metered,
    Monthly,
    Subscription,
    Updown,
}

impl Route {
    pub const ALL: [Route; 7] = [
        Route::Adjustment,
        Route::Advance,
        Route::Daily,
        Route::Metered,
        Route::Monthly,
        Route::Subscription,
        Route::Updown,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Route::Adjustment => "Adjustment",
            Route::Advance => "Advance",
            Route::Daily => "Daily",
            Route::Metered => "Metered",
            Route::Monthly => "Monthly",
            Route::Subscription => "Subscription",
            Route::Updown => "Updown",
        }
    }
}

impl FromStr for Route {
    type Err = UnknownRoute;

    /// Case-insensitive: the input is normalized to capitalized words first
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = capitalize_words(s);
        Route::ALL
            .into_iter()
            .find(|route| route.name() == normalized)
            .ok_or_else(|| UnknownRoute(s.to_string()))
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn capitalize_words(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let lower = word.to_lowercase();
            let mut chars = lower.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_any_case() {
        assert_eq!("monthly".parse::<Route>().unwrap(), Route::Monthly);
        assert_eq!("MONTHLY".parse::<Route>().unwrap(), Route::Monthly);
        assert_eq!("uPdOwN".parse::<Route>().unwrap(), Route::Updown);
        assert_eq!("  daily ".parse::<Route>().unwrap(), Route::Daily);
    }

    #[test]
    fn test_parse_unknown() {
        let err = "weekly".parse::<Route>().unwrap_err();
        assert_eq!(err.to_string(), "Unknown route: weekly");
        assert!("up down".parse::<Route>().is_err());
        assert!("".parse::<Route>().is_err());
    }

    #[test]
    fn test_all_routes_round_trip_names() {
        for route in Route::ALL {
            assert_eq!(route.name().parse::<Route>().unwrap(), route);
        }
    }
}
