#[derive(Debug)]
pub enum Error {
    ClientDoesNotExist,
    UnimplementedOperation,
}

impl std::error::Error for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ClientDoesNotExist => write!(f, "client does not exist"),
            Self::UnimplementedOperation => write!(f, "unimplemented operation"),
        }
    }
}

impl From<codec::Error> for Error {
    fn from(_: codec::Error) -> Self {
        Self::UnimplementedOperation
    }
}
