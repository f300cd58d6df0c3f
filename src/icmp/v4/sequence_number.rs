type SequenceNumberInnerType = u16;

/// Sequence number shared by every echo request of one ping round.
#[derive(Copy, Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct SequenceNumber(SequenceNumberInnerType);

impl SequenceNumber {
    pub(crate) fn next(self) -> Self {
        SequenceNumber(self.0.wrapping_add(1))
    }
}

impl From<SequenceNumber> for SequenceNumberInnerType {
    fn from(value: SequenceNumber) -> Self {
        value.0
    }
}

impl From<SequenceNumberInnerType> for SequenceNumber {
    fn from(value: SequenceNumberInnerType) -> Self {
        SequenceNumber(value)
    }
}

impl std::fmt::Display for SequenceNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_increments() {
        assert_eq!(SequenceNumber::from(8), SequenceNumber::from(7).next());
    }

    #[test]
    fn next_wraps_to_zero() {
        assert_eq!(SequenceNumber::from(0), SequenceNumber::from(u16::MAX).next());
    }

    #[test]
    fn fmt() {
        assert_eq!("42", format!("{}", SequenceNumber::from(42)));
    }
}
