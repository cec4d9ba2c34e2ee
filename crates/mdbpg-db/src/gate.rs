//! Connection gate
//!
//! Bounds how many backend round trips a store has in flight at once. A
//! bounded gate wraps a `Semaphore`; an unlimited gate hands out empty
//! permits without waiting. Permits are released when dropped, so an
//! operation gives its slot back on every exit path, including a dropped
//! future.

use crate::error::BackendError;
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Capacity used when none (or a non-positive one) is requested
pub const DEFAULT_CAPACITY: usize = 10;

/// Gate configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateConfig {
	/// Skip gating entirely
	pub unlimited: bool,
	/// Maximum concurrent round trips when bounded
	pub capacity: usize,
}

impl GateConfig {
	/// Bounded gate; `max_conns <= 0` falls back to [`DEFAULT_CAPACITY`]
	///
	/// # Examples
	///
	/// ```
	/// use mdbpg_db::gate::{GateConfig, DEFAULT_CAPACITY};
	///
	/// assert_eq!(GateConfig::bounded(4).capacity, 4);
	/// assert_eq!(GateConfig::bounded(0).capacity, DEFAULT_CAPACITY);
	/// assert_eq!(GateConfig::bounded(-3).capacity, DEFAULT_CAPACITY);
	/// ```
	pub fn bounded(max_conns: i64) -> Self {
		let capacity = usize::try_from(max_conns)
			.ok()
			.filter(|c| *c > 0)
			.unwrap_or(DEFAULT_CAPACITY);
		Self {
			unlimited: false,
			capacity,
		}
	}

	pub fn unlimited() -> Self {
		Self {
			unlimited: true,
			capacity: DEFAULT_CAPACITY,
		}
	}
}

impl Default for GateConfig {
	fn default() -> Self {
		Self::bounded(DEFAULT_CAPACITY as i64)
	}
}

/// Counting admission control shared by every operation of one store
#[derive(Debug, Clone)]
pub struct ConnectionGate {
	semaphore: Option<Arc<Semaphore>>,
	capacity: usize,
}

impl ConnectionGate {
	pub fn new(config: GateConfig) -> Self {
		if config.unlimited {
			return Self {
				semaphore: None,
				capacity: 0,
			};
		}
		let capacity = match config.capacity {
			0 => DEFAULT_CAPACITY,
			c => c.min(Semaphore::MAX_PERMITS),
		};
		Self {
			semaphore: Some(Arc::new(Semaphore::new(capacity))),
			capacity,
		}
	}

	pub fn unlimited() -> Self {
		Self::new(GateConfig::unlimited())
	}

	pub fn is_unlimited(&self) -> bool {
		self.semaphore.is_none()
	}

	/// Configured capacity, `None` when unlimited
	pub fn capacity(&self) -> Option<usize> {
		self.semaphore.as_ref().map(|_| self.capacity)
	}

	/// Permits currently free, `None` when unlimited
	pub fn available(&self) -> Option<usize> {
		self.semaphore.as_ref().map(|s| s.available_permits())
	}

	/// Wait for a slot
	///
	/// Never times out. The semaphore is owned by the gate and never closed,
	/// so the error branch is unreachable in practice.
	pub async fn acquire(&self) -> Result<GatePermit, BackendError> {
		let Some(semaphore) = &self.semaphore else {
			return Ok(GatePermit { permit: None });
		};
		let permit = semaphore
			.clone()
			.acquire_owned()
			.await
			.map_err(|_| BackendError::GateClosed)?;
		Ok(GatePermit {
			permit: Some(permit),
		})
	}
}

impl Default for ConnectionGate {
	fn default() -> Self {
		Self::new(GateConfig::default())
	}
}

/// One admitted round trip; dropping it frees the slot
#[derive(Debug)]
#[must_use = "dropping the permit immediately releases the gate slot"]
pub struct GatePermit {
	permit: Option<OwnedSemaphorePermit>,
}

impl GatePermit {
	/// Whether this permit holds a semaphore slot (false when unlimited)
	pub fn is_gated(&self) -> bool {
		self.permit.is_some()
	}
}
