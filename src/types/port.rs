// ABOUTME: TCP port newtype built from untrusted integers.
// ABOUTME: Mutators accept i32 so that out-of-range values can be reported.

use super::UsageError;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Port(u16);

impl Port {
    pub fn new(value: i64) -> Result<Self, UsageError> {
        u16::try_from(value)
            .map(Self)
            .map_err(|_| UsageError::PortOutOfRange(value))
    }

    pub fn get(self) -> u16 {
        self.0
    }
}

impl TryFrom<i32> for Port {
    type Error = UsageError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(i64::from(value))
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
