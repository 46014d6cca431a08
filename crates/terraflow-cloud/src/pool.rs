//! Static IPv4 address allocation
//!
//! Providers without an address-assignment service (VMware) hand out
//! addresses from a fixed contiguous range. [`AddressPool`] owns that
//! allocation state; [`SharedAddressPool`] serializes access to it when
//! resource tasks of one batch allocate concurrently.

use crate::error::{CloudError, Result};
use crate::ip::Ip4;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Allocator over the closed range `[first, last]`.
///
/// `next` is the lowest unallocated address, or `last` once a forward scan
/// ran off the end of the range. Only [`allocate`](Self::allocate) decides
/// whether the pool is actually full.
///
/// Releasing rescans the range from `first`, which is linear in the range
/// size. Pools cover a handful of subnets' worth of hosts at most.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PoolSnapshot")]
pub struct AddressPool {
    first: Ip4,
    last: Ip4,
    next: Ip4,
    allocated: BTreeSet<Ip4>,
}

impl AddressPool {
    pub fn new(first: Ip4, last: Ip4) -> Result<Self> {
        if last < first {
            return Err(CloudError::RangeInvalid { first, last });
        }
        Ok(Self {
            first,
            last,
            next: first,
            allocated: BTreeSet::new(),
        })
    }

    /// Build a pool from dotted-quad bounds such as `"10.0.0.10"`.
    pub fn new_from_str(first: &str, last: &str) -> Result<Self> {
        Self::new(first.parse()?, last.parse()?)
    }

    pub fn first(&self) -> Ip4 {
        self.first
    }

    pub fn last(&self) -> Ip4 {
        self.last
    }

    pub fn next(&self) -> Ip4 {
        self.next
    }

    pub fn allocated(&self) -> &BTreeSet<Ip4> {
        &self.allocated
    }

    pub fn contains(&self, addr: Ip4) -> bool {
        self.first <= addr && addr <= self.last
    }

    /// Total number of addresses in the range.
    pub fn capacity(&self) -> u64 {
        self.first.span_to(self.last)
    }

    /// Number of addresses not yet allocated.
    pub fn available(&self) -> u64 {
        self.capacity() - self.allocated.len() as u64
    }

    /// Hand out the next free address.
    pub fn allocate(&mut self) -> Result<Ip4> {
        let start = self.next;
        let mut candidate = start;
        while self.allocated.contains(&candidate) {
            candidate = self.wrapping_successor(candidate);
            if candidate == start {
                return Err(CloudError::PoolExhausted {
                    first: self.first,
                    last: self.last,
                });
            }
        }

        self.allocated.insert(candidate);
        self.next = candidate;
        self.advance_next();
        tracing::debug!(address = %candidate, next = %self.next, "Allocated address");
        Ok(candidate)
    }

    /// Mark a specific address as taken.
    pub fn reserve(&mut self, addr: Ip4) -> Result<()> {
        if !self.contains(addr) {
            return Err(CloudError::AddressOutOfRange {
                address: addr,
                first: self.first,
                last: self.last,
            });
        }
        if self.allocated.contains(&addr) {
            return Err(CloudError::AddressInUse(addr));
        }

        self.allocated.insert(addr);
        if addr == self.next {
            self.advance_next();
        }
        tracing::debug!(address = %addr, "Reserved address");
        Ok(())
    }

    /// Return an address to the pool. Unknown addresses are ignored.
    pub fn release(&mut self, addr: Ip4) {
        self.allocated.remove(&addr);
        self.rescan();
    }

    /// Return several addresses, rescanning once at the end.
    pub fn release_all<I>(&mut self, addrs: I)
    where
        I: IntoIterator<Item = Ip4>,
    {
        for addr in addrs {
            self.allocated.remove(&addr);
        }
        self.rescan();
    }

    fn wrapping_successor(&self, addr: Ip4) -> Ip4 {
        match addr.advance(1) {
            Some(succ) if succ <= self.last => succ,
            _ => self.first,
        }
    }

    /// Move `next` forward past allocated addresses, clamping at `last`.
    fn advance_next(&mut self) {
        let mut candidate = self.next;
        loop {
            candidate = match candidate.advance(1) {
                Some(succ) if succ <= self.last => succ,
                _ => {
                    self.next = self.last;
                    return;
                }
            };
            if !self.allocated.contains(&candidate) {
                self.next = candidate;
                return;
            }
        }
    }

    /// Point `next` at the lowest free address, scanning from `first`.
    fn rescan(&mut self) {
        let mut candidate = self.first;
        while self.allocated.contains(&candidate) {
            match candidate.advance(1) {
                Some(succ) if succ <= self.last => candidate = succ,
                _ => {
                    candidate = self.last;
                    break;
                }
            }
        }
        self.next = candidate;
    }
}

/// Serialized form of a pool; `next` is always recomputed on load.
#[derive(Deserialize)]
struct PoolSnapshot {
    first: Ip4,
    last: Ip4,
    #[serde(default)]
    allocated: BTreeSet<Ip4>,
}

impl TryFrom<PoolSnapshot> for AddressPool {
    type Error = CloudError;

    fn try_from(snapshot: PoolSnapshot) -> Result<Self> {
        let mut pool = AddressPool::new(snapshot.first, snapshot.last)?;
        if let Some(stray) = snapshot.allocated.iter().find(|a| !pool.contains(**a)) {
            return Err(CloudError::AddressOutOfRange {
                address: *stray,
                first: pool.first,
                last: pool.last,
            });
        }
        pool.allocated = snapshot.allocated;
        pool.rescan();
        Ok(pool)
    }
}

/// An [`AddressPool`] behind a mutex, cloned into every task that needs it.
///
/// Each method holds the lock for exactly one pool operation.
#[derive(Debug, Clone)]
pub struct SharedAddressPool {
    inner: Arc<Mutex<AddressPool>>,
}

impl SharedAddressPool {
    pub fn new(pool: AddressPool) -> Self {
        Self {
            inner: Arc::new(Mutex::new(pool)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, AddressPool> {
        // Pool operations either fully apply or return early, so a poisoned
        // guard still holds consistent state.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn allocate(&self) -> Result<Ip4> {
        self.lock().allocate()
    }

    pub fn reserve(&self, addr: Ip4) -> Result<()> {
        self.lock().reserve(addr)
    }

    pub fn release(&self, addr: Ip4) {
        self.lock().release(addr)
    }

    pub fn release_all<I>(&self, addrs: I)
    where
        I: IntoIterator<Item = Ip4>,
    {
        self.lock().release_all(addrs)
    }

    /// Copy of the current pool state.
    pub fn snapshot(&self) -> AddressPool {
        self.lock().clone()
    }
}

impl From<AddressPool> for SharedAddressPool {
    fn from(pool: AddressPool) -> Self {
        Self::new(pool)
    }
}
