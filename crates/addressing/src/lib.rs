//! Virtual address space for the signaling overlay.
//!
//! An [`Id`] names a client (`subnet.suffix`, e.g. `127.0.0.0`); an [`Alias`]
//! names a bound or connection endpoint on a client (`id:port`). The
//! [`SubnetTable`] hands out the smallest unused suffix within a subnet and
//! the smallest unused port within a `(subnet, suffix)` pair, so that a
//! released identifier is reused before any identifier grows the space.

mod address;
mod error;
mod table;

pub use address::{Alias, Id};
pub use error::{AllocatorError, ParseAddressError};
pub use table::SubnetTable;
