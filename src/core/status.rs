//! Tri-state outcome of the most recent fetch.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    Success,
    Fail,
    /// No URL entered.
    #[default]
    Empty,
}

impl Status {
    /// Text shown in the status label.
    pub fn label(self) -> &'static str {
        match self {
            Status::Success => "Success",
            Status::Fail => "Fail",
            Status::Empty => "",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_exhaustive() {
        assert_eq!(Status::Success.to_string(), "Success");
        assert_eq!(Status::Fail.to_string(), "Fail");
        assert_eq!(Status::Empty.to_string(), "");
        assert_eq!(Status::default(), Status::Empty);
    }
}
