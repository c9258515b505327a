#[derive(Debug, PartialEq, Eq)]
pub enum AllocatorError {
    Overflow,
    SubnetMissing,
    SuffixMissing,
    PortAlreadyAllocated,
}

impl std::error::Error for AllocatorError {}

impl std::fmt::Display for AllocatorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Overflow => write!(f, "subnet has no free suffix left"),
            Self::SubnetMissing => write!(f, "subnet does not exist"),
            Self::SuffixMissing => write!(f, "suffix does not exist"),
            Self::PortAlreadyAllocated => write!(f, "port already allocated"),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct ParseAddressError;

impl std::error::Error for ParseAddressError {}

impl std::fmt::Display for ParseAddressError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "malformed address")
    }
}
