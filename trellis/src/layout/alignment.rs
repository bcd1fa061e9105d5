//! Alignment modes.
//!
//! Names are accepted leniently: an unknown name logs a warning once and falls
//! back to `Start` rather than failing the layout.

use serde::{Deserialize, Serialize};

use crate::log_once::warn_once;

/// Placement of a child along one axis inside a larger extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Align {
    #[default]
    Start,
    Center,
    End,
    /// Fill the extent. Offset math treats it as `Start`.
    Stretch,
}

impl Align {
    pub fn try_from_name(name: &str) -> Option<Self> {
        match normalize(name).as_str() {
            "start" => Some(Align::Start),
            "center" => Some(Align::Center),
            "end" => Some(Align::End),
            "stretch" => Some(Align::Stretch),
            _ => None,
        }
    }

    pub fn from_name(name: &str) -> Self {
        Self::try_from_name(name).unwrap_or_else(|| {
            warn_once(
                &format!("align.unknown:{name}"),
                format_args!("unknown alignment '{name}', defaulting to 'start'"),
            );
            Align::Start
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Align::Start => "start",
            Align::Center => "center",
            Align::End => "end",
            Align::Stretch => "stretch",
        }
    }
}

impl From<&str> for Align {
    fn from(name: &str) -> Self {
        Align::from_name(name)
    }
}

/// Horizontal and vertical alignment of a child inside a box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct AlignPair {
    pub horizontal: Align,
    pub vertical: Align,
}

impl AlignPair {
    pub const TOP_LEFT: Self = Self::new(Align::Start, Align::Start);
    pub const CENTER: Self = Self::new(Align::Center, Align::Center);

    #[inline]
    pub const fn new(horizontal: Align, vertical: Align) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }

    /// Same alignment on both axes.
    #[inline]
    pub const fn uniform(align: Align) -> Self {
        Self::new(align, align)
    }

    /// Parse a nine-point alias (`top-left` … `bottom-right`) or a single
    /// alignment name applied to both axes.
    pub fn from_name(name: &str) -> Self {
        let (h, v) = match normalize(name).as_str() {
            "top-left" => (Align::Start, Align::Start),
            "top-center" => (Align::Center, Align::Start),
            "top-right" => (Align::End, Align::Start),
            "center-left" => (Align::Start, Align::Center),
            "center" => (Align::Center, Align::Center),
            "center-right" => (Align::End, Align::Center),
            "bottom-left" => (Align::Start, Align::End),
            "bottom-center" => (Align::Center, Align::End),
            "bottom-right" => (Align::End, Align::End),
            _ => {
                let single = Align::from_name(name);
                (single, single)
            }
        };
        Self::new(h, v)
    }
}

impl From<Align> for AlignPair {
    fn from(align: Align) -> Self {
        Self::uniform(align)
    }
}

impl From<(Align, Align)> for AlignPair {
    fn from((horizontal, vertical): (Align, Align)) -> Self {
        Self::new(horizontal, vertical)
    }
}

impl From<&str> for AlignPair {
    fn from(name: &str) -> Self {
        Self::from_name(name)
    }
}

impl From<(&str, &str)> for AlignPair {
    fn from((h, v): (&str, &str)) -> Self {
        Self::new(Align::from_name(h), Align::from_name(v))
    }
}

/// Distribution of children along a main axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MainAxisAlignment {
    #[default]
    Start,
    Center,
    End,
    SpaceBetween,
    SpaceAround,
    SpaceEvenly,
}

impl MainAxisAlignment {
    pub fn from_name(name: &str) -> Self {
        match normalize(name).as_str() {
            "start" => MainAxisAlignment::Start,
            "center" => MainAxisAlignment::Center,
            "end" => MainAxisAlignment::End,
            "space-between" => MainAxisAlignment::SpaceBetween,
            "space-around" => MainAxisAlignment::SpaceAround,
            "space-evenly" => MainAxisAlignment::SpaceEvenly,
            _ => {
                warn_once(
                    &format!("main_align.unknown:{name}"),
                    format_args!("unknown main-axis alignment '{name}', defaulting to 'start'"),
                );
                MainAxisAlignment::Start
            }
        }
    }

    /// The single-child equivalent, for offset math on one extent.
    pub fn as_align(&self) -> Align {
        match self {
            MainAxisAlignment::Center => Align::Center,
            MainAxisAlignment::End => Align::End,
            _ => Align::Start,
        }
    }
}

impl From<&str> for MainAxisAlignment {
    fn from(name: &str) -> Self {
        MainAxisAlignment::from_name(name)
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase().replace('_', "-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_align_names() {
        assert_eq!(Align::from_name("center"), Align::Center);
        assert_eq!(Align::from_name(" END "), Align::End);
        assert_eq!(Align::from_name("stretch"), Align::Stretch);
        assert_eq!(Align::try_from_name("middle"), None);
        assert_eq!(Align::from_name("middle"), Align::Start);
    }

    #[test]
    fn test_nine_point_aliases() {
        assert_eq!(AlignPair::from_name("top-left"), AlignPair::TOP_LEFT);
        assert_eq!(
            AlignPair::from_name("bottom_center"),
            AlignPair::new(Align::Center, Align::End)
        );
        assert_eq!(
            AlignPair::from_name("Center-Right"),
            AlignPair::new(Align::End, Align::Center)
        );
        assert_eq!(AlignPair::from_name("end"), AlignPair::uniform(Align::End));
    }

    #[test]
    fn test_pair_from_tuple() {
        let pair: AlignPair = ("center", "end").into();
        assert_eq!(pair, AlignPair::new(Align::Center, Align::End));
    }

    #[test]
    fn test_main_axis_names() {
        assert_eq!(
            MainAxisAlignment::from_name("space-between"),
            MainAxisAlignment::SpaceBetween
        );
        assert_eq!(
            MainAxisAlignment::from_name("space_evenly"),
            MainAxisAlignment::SpaceEvenly
        );
        assert_eq!(MainAxisAlignment::from_name("wat"), MainAxisAlignment::Start);
        assert_eq!(MainAxisAlignment::End.as_align(), Align::End);
    }

    #[test]
    fn test_serde_names() {
        let m: MainAxisAlignment = serde_json::from_str("\"space-around\"").unwrap();
        assert_eq!(m, MainAxisAlignment::SpaceAround);
        assert_eq!(serde_json::to_string(&Align::Center).unwrap(), "\"center\"");
    }
}
