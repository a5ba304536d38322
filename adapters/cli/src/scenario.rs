//! Declarative TOML scenarios for headless runs.
//!
//! A scenario schedules player actions by frame index so a full defense can
//! replay deterministically from the command line.

use serde::Deserialize;

/// Scripted run configuration loaded from a TOML file.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub(crate) struct Scenario {
    /// Overrides the RNG seed passed to the wave controller.
    pub(crate) seed: Option<u64>,
    /// Overrides the number of frames to simulate.
    pub(crate) frames: Option<u32>,
    /// Overrides the fixed frame delta in milliseconds.
    pub(crate) dt_ms: Option<u64>,
    /// Tower placements to attempt, keyed by frame.
    #[serde(default)]
    pub(crate) placements: Vec<Placement>,
    /// Tower upgrades to attempt, keyed by frame.
    #[serde(default)]
    pub(crate) upgrades: Vec<Upgrade>,
}

impl Scenario {
    /// Parses a scenario from TOML text.
    pub(crate) fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }
}

/// One scheduled tower placement.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
pub(crate) struct Placement {
    /// Frame index at which the placement is submitted.
    pub(crate) frame: u32,
    /// Tower selection index: 0 sniper, 1 freezing, 2 cannon.
    pub(crate) tower: u8,
    /// World-space x coordinate of the requested position.
    pub(crate) x: f32,
    /// World-space y coordinate of the requested position.
    pub(crate) y: f32,
}

/// One scheduled upgrade of an already-placed tower.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
pub(crate) struct Upgrade {
    /// Frame index at which the upgrade is submitted.
    pub(crate) frame: u32,
    /// Index into the towers in placement order.
    pub(crate) tower_index: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_full_scenario() {
        let text = r#"
seed = 42
frames = 1200
dt_ms = 16

[[placements]]
frame = 10
tower = 2
x = 264.0
y = 120.0

[[upgrades]]
frame = 400
tower_index = 0
"#;
        let scenario = Scenario::parse(text).expect("scenario parses");
        assert_eq!(scenario.seed, Some(42));
        assert_eq!(scenario.frames, Some(1200));
        assert_eq!(scenario.dt_ms, Some(16));
        assert_eq!(
            scenario.placements,
            vec![Placement {
                frame: 10,
                tower: 2,
                x: 264.0,
                y: 120.0,
            }]
        );
        assert_eq!(
            scenario.upgrades,
            vec![Upgrade {
                frame: 400,
                tower_index: 0,
            }]
        );
    }

    #[test]
    fn empty_scenarios_are_valid() {
        let scenario = Scenario::parse("").expect("empty scenario parses");
        assert_eq!(scenario, Scenario::default());
    }

    #[test]
    fn malformed_scenarios_are_rejected() {
        assert!(Scenario::parse("frames = \"lots\"").is_err());
    }
}
