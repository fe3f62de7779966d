//! Distributed ID allocator
//!
//! Identifiers are 63-bit integers laid out as
//!
//! ```text
//! | 39 bits: 10ms ticks since epoch | 8 bits: sequence | 16 bits: machine id |
//! ```
//!
//! The machine id is leased once per process from a shared counter in the
//! cache tier. Leases are never returned, so after 65,535 process starts the
//! counter must be reset out of band before another process can start.

use crate::core::traits::CacheBackend;
use crate::utils::error::{Result, WardenError};
use parking_lot::Mutex;
use std::time::Duration;
use tracing::info;

const BIT_LEN_TIME: u32 = 39;
const BIT_LEN_SEQUENCE: u32 = 8;
const BIT_LEN_MACHINE_ID: u32 = 63 - BIT_LEN_TIME - BIT_LEN_SEQUENCE;

const SEQUENCE_MASK: u16 = (1 << BIT_LEN_SEQUENCE) - 1;
/// Largest valid machine lease
pub const MAX_MACHINE_ID: i64 = (1 << BIT_LEN_MACHINE_ID) - 1;

/// Length of one time tick in milliseconds
const TIME_UNIT_MS: i64 = 10;

#[derive(Debug)]
struct State {
    elapsed: i64,
    sequence: u16,
}

/// Components of an allocated identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdParts {
    /// Ticks since the epoch
    pub time: i64,
    pub sequence: u16,
    pub machine_id: u16,
}

/// Sonyflake-style identifier allocator
#[derive(Debug)]
pub struct IdAllocator {
    machine_id: u16,
    epoch_ms: i64,
    state: Mutex<State>,
}

impl IdAllocator {
    /// Lease a machine id by incrementing `lease_key` and build the allocator
    ///
    /// Fails when the lease is outside `1..=65535`; the process must not
    /// serve with an invalid lease.
    pub async fn lease(cache: &dyn CacheBackend, lease_key: &str, epoch_ms: i64) -> Result<Self> {
        let lease = cache.incr(lease_key).await?;
        let allocator = Self::with_machine_id(lease, epoch_ms)?;
        info!("Leased machine id {} from {}", lease, lease_key);
        Ok(allocator)
    }

    /// Build with an explicit machine id
    pub fn with_machine_id(machine_id: i64, epoch_ms: i64) -> Result<Self> {
        if machine_id > MAX_MACHINE_ID {
            return Err(WardenError::exhaustion(format!(
                "machine lease {} exceeds {}; reset the lease counter",
                machine_id, MAX_MACHINE_ID
            )));
        }
        if machine_id <= 0 {
            return Err(WardenError::validation(format!(
                "invalid machine lease {}",
                machine_id
            )));
        }

        let now = chrono::Utc::now().timestamp_millis();
        if epoch_ms > now {
            return Err(WardenError::validation("allocator epoch is in the future"));
        }

        Ok(Self {
            machine_id: machine_id as u16,
            epoch_ms,
            state: Mutex::new(State {
                elapsed: 0,
                sequence: SEQUENCE_MASK,
            }),
        })
    }

    pub fn machine_id(&self) -> u16 {
        self.machine_id
    }

    fn current_elapsed(&self) -> i64 {
        (chrono::Utc::now().timestamp_millis() - self.epoch_ms) / TIME_UNIT_MS
    }

    /// Allocate the next identifier
    ///
    /// When the 256 identifiers of the current tick are used up the id is
    /// taken from the next tick, and the caller sleeps until that tick
    /// starts. The sleep happens after the lock is released, so other callers
    /// keep allocating. It is still a blocking sleep of at most one tick on
    /// the calling thread, async callers included.
    pub fn next_id(&self) -> Result<i64> {
        let (id, wait_ms) = {
            let mut state = self.state.lock();

            let current = self.current_elapsed();
            if state.elapsed < current {
                state.elapsed = current;
                state.sequence = 0;
            } else {
                state.sequence = (state.sequence + 1) & SEQUENCE_MASK;
                if state.sequence == 0 {
                    state.elapsed += 1;
                }
            }

            if state.elapsed >= 1 << BIT_LEN_TIME {
                return Err(WardenError::exhaustion("allocator time range exhausted"));
            }

            let wait_ms = if state.elapsed > current {
                let now_ms = chrono::Utc::now().timestamp_millis() - self.epoch_ms;
                (state.elapsed - current) * TIME_UNIT_MS - now_ms % TIME_UNIT_MS
            } else {
                0
            };
            let id = (state.elapsed << (BIT_LEN_SEQUENCE + BIT_LEN_MACHINE_ID))
                | ((state.sequence as i64) << BIT_LEN_MACHINE_ID)
                | self.machine_id as i64;
            (id, wait_ms)
        };

        if wait_ms > 0 {
            std::thread::sleep(Duration::from_millis(wait_ms as u64));
        }
        Ok(id)
    }

    /// Split an identifier into its components
    pub fn decompose(id: i64) -> IdParts {
        IdParts {
            time: id >> (BIT_LEN_SEQUENCE + BIT_LEN_MACHINE_ID),
            sequence: ((id >> BIT_LEN_MACHINE_ID) as u16) & SEQUENCE_MASK,
            machine_id: (id & MAX_MACHINE_ID) as u16,
        }
    }
}
