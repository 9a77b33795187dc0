use std::{fmt, str::FromStr};

use thiserror::Error;

/// When the kubelet pulls the image of a container.
///
/// An unset policy is represented by `None` wherever the field is optional.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PullPolicy {
    Always,
    IfNotPresent,
    Never,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unsupported image pull policy: \"{0}\"")]
pub struct UnsupportedPullPolicy(pub String);

impl PullPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            PullPolicy::Always => "Always",
            PullPolicy::IfNotPresent => "IfNotPresent",
            PullPolicy::Never => "Never",
        }
    }
}

impl fmt::Display for PullPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PullPolicy {
    type Err = UnsupportedPullPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Always" => Ok(PullPolicy::Always),
            "IfNotPresent" => Ok(PullPolicy::IfNotPresent),
            "Never" => Ok(PullPolicy::Never),
            _ => Err(UnsupportedPullPolicy(s.to_string())),
        }
    }
}
