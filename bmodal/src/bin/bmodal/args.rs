//! Command-line argument parsing.

use std::fmt;

/// Scripted scenario to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scenario {
    /// Confirmation answered with "Yes".
    #[default]
    Confirm,
    /// Three notices stacked, the middle one closed.
    Stack,
    /// Loading overlay anchored to an element that scrolls and resizes.
    Loading,
}

impl Scenario {
    fn parse(arg: &str) -> Option<Self> {
        match arg {
            "confirm" => Some(Self::Confirm),
            "stack" => Some(Self::Stack),
            "loading" => Some(Self::Loading),
            _ => None,
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Confirm => "confirm",
            Self::Stack => "stack",
            Self::Loading => "loading",
        })
    }
}

/// Parse command-line arguments and determine the scenario.
pub fn parse_args() -> Scenario {
    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.as_slice() {
        [] => Scenario::default(),
        [arg] => Scenario::parse(arg).unwrap_or_else(|| {
            log::warn!("Unknown scenario {arg:?}, expected confirm, stack or loading");
            Scenario::default()
        }),
        [arg, ..] => {
            log::warn!("Ignoring extra arguments after {arg:?}");
            Scenario::parse(arg).unwrap_or_default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for scenario in [Scenario::Confirm, Scenario::Stack, Scenario::Loading] {
            assert_eq!(Scenario::parse(&scenario.to_string()), Some(scenario));
        }
        assert_eq!(Scenario::parse("modal"), None);
    }
}
