//! Cloud regions and the region-specific machine image table
//!
//! Cluster instances boot from a container-optimized machine image that is
//! published per region. The table below is static process-wide data; it is
//! updated by hand when a new image generation ships. Regions the image has
//! not been published to are still representable so that network references
//! from other layers can name them, but resolving an image for one of them
//! fails the whole build.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{Error, Result};

/// Cloud region codes known to this crate
///
/// The enum is closed on purpose: adding a region means adding a variant,
/// which forces the image table match below to be revisited at compile time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Region {
    /// US East (Ohio)
    UsEast2,
    /// US East (N. Virginia)
    UsEast1,
    /// US West (Oregon)
    UsWest2,
    /// US West (N. California)
    UsWest1,
    /// EU (London)
    EuWest2,
    /// EU (Ireland)
    EuWest1,
    /// EU (Frankfurt)
    EuCentral1,
    /// Asia Pacific (Seoul)
    ApNortheast2,
    /// Asia Pacific (Tokyo)
    ApNortheast1,
    /// Asia Pacific (Sydney)
    ApSoutheast2,
    /// Asia Pacific (Singapore)
    ApSoutheast1,
    /// Canada (Central)
    CaCentral1,
    /// South America (São Paulo) - no published machine image
    SaEast1,
    /// Asia Pacific (Mumbai) - no published machine image
    ApSouth1,
    /// AWS GovCloud (US) - no published machine image
    UsGovWest1,
    /// China (Beijing) - no published machine image
    CnNorth1,
}

impl Region {
    /// Resolve the container-optimized machine image for this region
    ///
    /// Returns [`Error::UnsupportedRegion`] for regions the image has not
    /// been published to. This is fatal for the calling build; there is no
    /// fallback image.
    pub fn machine_image(&self) -> Result<&'static str> {
        match self {
            Self::UsEast2 => Ok("ami-34032e51"),
            Self::UsEast1 => Ok("ami-ec33cc96"),
            Self::UsWest2 => Ok("ami-29f80351"),
            Self::UsWest1 => Ok("ami-d5d0e0b5"),
            Self::EuWest2 => Ok("ami-eb62708f"),
            Self::EuWest1 => Ok("ami-13f7226a"),
            Self::EuCentral1 => Ok("ami-40d5672f"),
            Self::ApNortheast2 => Ok("ami-7ee13b10"),
            Self::ApNortheast1 => Ok("ami-21815747"),
            Self::ApSoutheast2 => Ok("ami-4f08e82d"),
            Self::ApSoutheast1 => Ok("ami-99f588fa"),
            Self::CaCentral1 => Ok("ami-9b54edff"),
            Self::SaEast1 | Self::ApSouth1 | Self::UsGovWest1 | Self::CnNorth1 => {
                Err(Error::unsupported_region(self))
            }
        }
    }

    /// All regions a machine image is published to
    pub fn supported() -> &'static [Region] {
        &[
            Self::UsEast2,
            Self::UsEast1,
            Self::UsWest2,
            Self::UsWest1,
            Self::EuWest2,
            Self::EuWest1,
            Self::EuCentral1,
            Self::ApNortheast2,
            Self::ApNortheast1,
            Self::ApSoutheast2,
            Self::ApSoutheast1,
            Self::CaCentral1,
        ]
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UsEast2 => write!(f, "Us-east-2"),
            Self::UsEast1 => write!(f, "Us-east-1"),
            Self::UsWest2 => write!(f, "Us-west-2"),
            Self::UsWest1 => write!(f, "Us-west-1"),
            Self::EuWest2 => write!(f, "Eu-west-2"),
            Self::EuWest1 => write!(f, "Eu-west-1"),
            Self::EuCentral1 => write!(f, "Eu-central-1"),
            Self::ApNortheast2 => write!(f, "Ap-northeast-2"),
            Self::ApNortheast1 => write!(f, "Ap-northeast-1"),
            Self::ApSoutheast2 => write!(f, "Ap-southeast-2"),
            Self::ApSoutheast1 => write!(f, "Ap-southeast-1"),
            Self::CaCentral1 => write!(f, "Ca-central-1"),
            Self::SaEast1 => write!(f, "Sa-east-1"),
            Self::ApSouth1 => write!(f, "Ap-south-1"),
            Self::UsGovWest1 => write!(f, "Us-gov-west-1"),
            Self::CnNorth1 => write!(f, "Cn-north-1"),
        }
    }
}

impl std::str::FromStr for Region {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "us-east-2" => Ok(Self::UsEast2),
            "us-east-1" => Ok(Self::UsEast1),
            "us-west-2" => Ok(Self::UsWest2),
            "us-west-1" => Ok(Self::UsWest1),
            "eu-west-2" => Ok(Self::EuWest2),
            "eu-west-1" => Ok(Self::EuWest1),
            "eu-central-1" => Ok(Self::EuCentral1),
            "ap-northeast-2" => Ok(Self::ApNortheast2),
            "ap-northeast-1" => Ok(Self::ApNortheast1),
            "ap-southeast-2" => Ok(Self::ApSoutheast2),
            "ap-southeast-1" => Ok(Self::ApSoutheast1),
            "ca-central-1" => Ok(Self::CaCentral1),
            "sa-east-1" => Ok(Self::SaEast1),
            "ap-south-1" => Ok(Self::ApSouth1),
            "us-gov-west-1" => Ok(Self::UsGovWest1),
            "cn-north-1" => Ok(Self::CnNorth1),
            _ => Err(Error::validation(format!("unknown region code: {s}"))),
        }
    }
}

impl Serialize for Region {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Region {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}
