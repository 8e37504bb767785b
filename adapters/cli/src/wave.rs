//! Wave descriptor parsing for the command line.

use std::str::FromStr;

use thiserror::Error;

/// Failure to parse a `COUNTxHEALTH@SPEED` wave descriptor.
#[derive(Debug, Error, PartialEq)]
pub(crate) enum WaveParseError {
    #[error("wave descriptor must look like COUNTxHEALTH@SPEED, got `{0}`")]
    Malformed(String),
    #[error("wave field `{field}` is not a valid number: {value}")]
    BadNumber { field: &'static str, value: String },
    #[error("wave field `{0}` must be positive")]
    NonPositive(&'static str),
}

/// One homogeneous group of enemies to release.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Wave {
    pub(crate) count: u32,
    pub(crate) health: f32,
    pub(crate) speed: f32,
}

impl FromStr for Wave {
    type Err = WaveParseError;

    fn from_str(descriptor: &str) -> Result<Self, Self::Err> {
        let malformed = || WaveParseError::Malformed(descriptor.to_owned());
        let (count, rest) = descriptor.split_once('x').ok_or_else(malformed)?;
        let (health, speed) = rest.split_once('@').ok_or_else(malformed)?;

        let count: u32 = count.parse().map_err(|_| WaveParseError::BadNumber {
            field: "count",
            value: count.to_owned(),
        })?;
        let health: f32 = health.parse().map_err(|_| WaveParseError::BadNumber {
            field: "health",
            value: health.to_owned(),
        })?;
        let speed: f32 = speed.parse().map_err(|_| WaveParseError::BadNumber {
            field: "speed",
            value: speed.to_owned(),
        })?;

        if count == 0 {
            return Err(WaveParseError::NonPositive("count"));
        }
        if health <= 0.0 {
            return Err(WaveParseError::NonPositive("health"));
        }
        if speed <= 0.0 {
            return Err(WaveParseError::NonPositive("speed"));
        }

        Ok(Self {
            count,
            health,
            speed,
        })
    }
}
