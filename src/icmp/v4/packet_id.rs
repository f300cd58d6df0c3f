type PacketIdInnerType = u16;

/// ICMP identifier used to correlate an echo reply with its request.
#[derive(Copy, Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct PacketId(PacketIdInnerType);

impl PacketId {
    pub(crate) fn next(self) -> Self {
        PacketId(self.0.wrapping_add(1))
    }
}

impl From<PacketId> for PacketIdInnerType {
    fn from(value: PacketId) -> Self {
        value.0
    }
}

impl From<PacketIdInnerType> for PacketId {
    fn from(value: PacketIdInnerType) -> Self {
        PacketId(value)
    }
}

impl std::fmt::Display for PacketId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
