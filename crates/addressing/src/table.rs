use parking_lot::Mutex;
use std::collections::HashMap;

use crate::{Alias, AllocatorError, Id};

const MAX_SUFFIX: u16 = 256;

/// Ports allocated under a single `(subnet, suffix)` pair, kept sorted.
#[derive(Default)]
struct Member {
    ports: Vec<u32>,
}

/// Suffixes allocated within a single subnet, kept sorted.
#[derive(Default)]
struct Subnet {
    suffixes: Vec<u16>,
    members: HashMap<u16, Member>,
}

/// The virtual address space: subnets, each holding suffixes, each holding ports.
///
/// All five operations take the same lock for their entire body, so no two
/// allocations can observe or act on an inconsistent gap.
#[derive(Default)]
pub struct SubnetTable {
    inner: Mutex<HashMap<String, Subnet>>,
}

/// The smallest non-negative integer not present in the sorted input.
///
/// # Test
///
/// ```
/// use signaling_addressing::SubnetTable;
///
/// assert_eq!(SubnetTable::first_gap(&[]), 0);
/// assert_eq!(SubnetTable::first_gap(&[0, 1, 2]), 3);
/// assert_eq!(SubnetTable::first_gap(&[0, 2, 3]), 1);
/// ```
impl SubnetTable {
    pub fn first_gap(sorted: &[u16]) -> u16 {
        for (index, value) in sorted.iter().enumerate() {
            if *value != index as u16 {
                return index as u16;
            }
        }

        sorted.len() as u16
    }

    fn first_gap_port(sorted: &[u32]) -> u32 {
        for (index, value) in sorted.iter().enumerate() {
            if *value != index as u32 {
                return index as u32;
            }
        }

        sorted.len() as u32
    }

    /// Allocate the smallest free suffix in `subnet`, creating the subnet on first use.
    ///
    /// # Test
    ///
    /// ```
    /// use signaling_addressing::SubnetTable;
    ///
    /// let table = SubnetTable::default();
    /// let a = table.create_ip("127.0.0").unwrap();
    /// let b = table.create_ip("127.0.0").unwrap();
    /// assert_eq!(a.to_string(), "127.0.0.0");
    /// assert_eq!(b.to_string(), "127.0.0.1");
    /// ```
    pub fn create_ip(&self, subnet: &str) -> Result<Id, AllocatorError> {
        let mut table = self.inner.lock();
        let entry = table.entry(subnet.to_string()).or_default();

        let suffix = Self::first_gap(&entry.suffixes);
        if suffix >= MAX_SUFFIX {
            return Err(AllocatorError::Overflow);
        }

        let position = entry.suffixes.partition_point(|&s| s < suffix);
        entry.suffixes.insert(position, suffix);
        entry.members.entry(suffix).or_default();

        Ok(Id::new(subnet, suffix))
    }

    /// Allocate the smallest free port under `id`'s `(subnet, suffix)` pair.
    ///
    /// # Test
    ///
    /// ```
    /// use signaling_addressing::SubnetTable;
    ///
    /// let table = SubnetTable::default();
    /// let id = table.create_ip("127.0.0").unwrap();
    /// let first = table.create_port(&id).unwrap();
    /// let second = table.create_port(&id).unwrap();
    /// assert_eq!(first.port(), 0);
    /// assert_eq!(second.port(), 1);
    /// ```
    pub fn create_port(&self, id: &Id) -> Result<Alias, AllocatorError> {
        let mut table = self.inner.lock();
        let subnet = table.get_mut(id.subnet()).ok_or(AllocatorError::SubnetMissing)?;
        let member = subnet.members.get_mut(&id.suffix()).ok_or(AllocatorError::SuffixMissing)?;

        let port = Self::first_gap_port(&member.ports);
        let position = member.ports.partition_point(|&p| p < port);
        member.ports.insert(position, port);

        Ok(Alias::new(id.clone(), port))
    }

    /// Insert a specific port explicitly, creating the `(subnet, suffix)` bucket if needed.
    ///
    /// # Test
    ///
    /// ```
    /// use signaling_addressing::{SubnetTable, AllocatorError};
    ///
    /// let table = SubnetTable::default();
    /// let alias = "127.0.0.0:0".parse().unwrap();
    /// table.claim_port(&alias).unwrap();
    /// assert_eq!(table.claim_port(&alias), Err(AllocatorError::PortAlreadyAllocated));
    /// ```
    pub fn claim_port(&self, alias: &Alias) -> Result<(), AllocatorError> {
        let mut table = self.inner.lock();
        let subnet = table.entry(alias.id().subnet().to_string()).or_default();
        let member = subnet.members.entry(alias.id().suffix()).or_default();

        let position = member.ports.partition_point(|&p| p < alias.port());
        if member.ports.get(position) == Some(&alias.port()) {
            return Err(AllocatorError::PortAlreadyAllocated);
        }

        member.ports.insert(position, alias.port());
        Ok(())
    }

    /// Release a suffix, deleting its bucket. No-ops if absent.
    pub fn release_ip(&self, id: &Id) {
        let mut table = self.inner.lock();
        if let Some(subnet) = table.get_mut(id.subnet()) {
            subnet.suffixes.retain(|&s| s != id.suffix());
            subnet.members.remove(&id.suffix());
        }
    }

    /// Release a port from its `(subnet, suffix)` bucket. No-ops if absent.
    pub fn release_port(&self, alias: &Alias) {
        let mut table = self.inner.lock();
        if let Some(subnet) = table.get_mut(alias.id().subnet()) {
            if let Some(member) = subnet.members.get_mut(&alias.id().suffix()) {
                member.ports.retain(|&p| p != alias.port());
            }
        }
    }
}
