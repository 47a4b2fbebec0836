//! Fluorescence detection channels.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// A detection channel reported by the instrument.
///
/// The PCR export carries one row per (specimen, channel); after the pivot
/// every channel owns a family of `"<CHANNEL>-<field>"` columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Channel {
    Fam,
    Hex,
    Rox,
    Red647,
    /// Internal control.
    Ic,
}

impl Channel {
    /// Every channel, in instrument order.
    pub const ALL: [Channel; 5] = [
        Channel::Fam,
        Channel::Hex,
        Channel::Rox,
        Channel::Red647,
        Channel::Ic,
    ];

    /// Returns the channel name as written in the `Channel` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Fam => "FAM",
            Channel::Hex => "HEX",
            Channel::Rox => "ROX",
            Channel::Red647 => "RED647",
            Channel::Ic => "IC",
        }
    }

    /// Name of a pivoted PCR column for this channel, e.g. `FAM-EstimatedBaseline`.
    pub fn prefixed(&self, field: &str) -> String {
        format!("{}-{field}", self.as_str())
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Channel {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "FAM" => Ok(Channel::Fam),
            "HEX" => Ok(Channel::Hex),
            "ROX" => Ok(Channel::Rox),
            "RED647" => Ok(Channel::Red647),
            "IC" => Ok(Channel::Ic),
            _ => Err(ModelError::UnknownChannel(s.to_string())),
        }
    }
}

/// Whether a channel reports an analyte or the internal control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelRole {
    Target,
    Internal,
}

impl ChannelRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChannelRole::Target => "target",
            ChannelRole::Internal => "internal",
        }
    }
}

impl fmt::Display for ChannelRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_from_str() {
        assert_eq!("FAM".parse::<Channel>().unwrap(), Channel::Fam);
        assert_eq!(" red647 ".parse::<Channel>().unwrap(), Channel::Red647);
        assert_eq!("ic".parse::<Channel>().unwrap(), Channel::Ic);
        assert!(matches!(
            "CY5".parse::<Channel>(),
            Err(ModelError::UnknownChannel(name)) if name == "CY5"
        ));
    }

    #[test]
    fn test_channel_round_trips_through_display() {
        for channel in Channel::ALL {
            assert_eq!(channel.to_string().parse::<Channel>().unwrap(), channel);
        }
    }

    #[test]
    fn test_prefixed_column() {
        assert_eq!(
            Channel::Rox.prefixed("Unrounded RFU Range"),
            "ROX-Unrounded RFU Range"
        );
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&Channel::Red647).unwrap();
        assert_eq!(json, "\"RED647\"");
        let role: ChannelRole = serde_json::from_str("\"internal\"").unwrap();
        assert_eq!(role, ChannelRole::Internal);
    }
}
