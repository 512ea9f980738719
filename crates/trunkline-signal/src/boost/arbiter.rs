use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use trunkline_core::SetupId;
use trunkline_pdus::boost::BoostEvent;

use crate::channel::Channel;

/// Highest usable setup id; id 0 means "no setup id"
pub const MAX_REQ_ID: usize = 6000;

/// Physical grid bounds for the per-slot setup-id map
pub const MAX_PHYSICAL_SPANS: usize = 16;
pub const MAX_PHYSICAL_CHANS: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestStatus {
    #[default]
    Free,
    Waiting,
    Ready,
    Fail,
}

#[derive(Default)]
struct RequestSlot {
    status: RequestStatus,
    /// Snapshot of the resolving event, release cause already normalized
    event: Option<BoostEvent>,
    chan: Option<Arc<Channel>>,
}

struct ArbiterInner {
    last_req: usize,
    /// Setup id in use
    req_map: Vec<bool>,
    /// Setup id was nacked locally; a late ack for it must be ignored
    nack_map: Vec<bool>,
    /// Setup id currently owning a physical slot, indexed 0-based like the wire
    setup_grid: Vec<Vec<SetupId>>,
    requests: Vec<RequestSlot>,
}

/// Allocates outbound call-setup ids and parks requesters until the peer
/// acks, nacks, or the sanity deadline passes. One instance per span, so
/// spans cannot cross-talk. Lock order: this mutex is a leaf, taken below
/// the channel mutex and never around it.
pub struct RequestArbiter {
    inner: Mutex<ArbiterInner>,
    wake: Condvar,
}

impl RequestArbiter {
    pub fn new() -> Self {
        let mut requests = Vec::with_capacity(MAX_REQ_ID + 1);
        requests.resize_with(MAX_REQ_ID + 1, RequestSlot::default);
        Self {
            inner: Mutex::new(ArbiterInner {
                last_req: 0,
                req_map: vec![false; MAX_REQ_ID + 1],
                nack_map: vec![false; MAX_REQ_ID + 1],
                setup_grid: vec![vec![0; MAX_PHYSICAL_CHANS + 1]; MAX_PHYSICAL_SPANS + 1],
                requests,
            }),
            wake: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ArbiterInner> {
        self.inner.lock().expect("arbiter mutex blocked")
    }

    /// Allocates the next free setup id with a rotating cursor, wrapping to
    /// 1. Returns None when a full scan finds every id busy.
    pub fn next_request_id(&self) -> Option<SetupId> {
        let mut inner = self.lock();
        for _ in 1..=MAX_REQ_ID {
            inner.last_req += 1;
            if inner.last_req >= MAX_REQ_ID {
                inner.last_req = 1;
            }
            let r = inner.last_req;
            if inner.req_map[r] {
                continue;
            }
            inner.req_map[r] = true;
            return Some(r as SetupId);
        }
        None
    }

    /// Frees a setup id
    pub fn release(&self, id: SetupId) {
        if id as usize > MAX_REQ_ID {
            return;
        }
        let mut inner = self.lock();
        inner.req_map[id as usize] = false;
    }

    /// Frees whatever setup id owns the physical slot (0-based wire coords)
    pub fn release_span_chan(&self, span: usize, chan: usize) {
        if span > MAX_PHYSICAL_SPANS || chan > MAX_PHYSICAL_CHANS {
            return;
        }
        let mut inner = self.lock();
        let id = inner.setup_grid[span][chan] as usize;
        if id != 0 {
            debug_assert!(id <= MAX_REQ_ID);
            inner.req_map[id] = false;
            inner.setup_grid[span][chan] = 0;
        }
    }

    /// Records which setup id owns a physical slot
    pub fn bind_grid(&self, span: usize, chan: usize, id: SetupId) {
        if span > MAX_PHYSICAL_SPANS || chan > MAX_PHYSICAL_CHANS {
            tracing::warn!("setup grid coordinates out of range: {}:{}", span, chan);
            return;
        }
        self.lock().setup_grid[span][chan] = id;
    }

    pub fn id_in_use(&self, id: SetupId) -> bool {
        self.lock().req_map[id as usize]
    }

    pub fn is_nacked(&self, id: SetupId) -> bool {
        self.lock().nack_map[id as usize]
    }

    pub fn set_nacked(&self, id: SetupId, on: bool) {
        if id == 0 {
            return;
        }
        self.lock().nack_map[id as usize] = on;
    }

    /// Parks the request slot. Must be called before the setup event is
    /// written: an ack racing the write may only complete a WAITING slot.
    pub fn begin_waiting(&self, id: SetupId) {
        let mut inner = self.lock();
        let slot = &mut inner.requests[id as usize];
        slot.status = RequestStatus::Waiting;
        slot.event = None;
        slot.chan = None;
    }

    /// Completes a parked request with the assigned channel
    pub fn resolve_ready(&self, id: SetupId, chan: Arc<Channel>, event: BoostEvent) {
        let mut inner = self.lock();
        let slot = &mut inner.requests[id as usize];
        if slot.status != RequestStatus::Waiting {
            tracing::warn!("resolve_ready for setup id {} in status {:?}", id, slot.status);
            return;
        }
        slot.status = RequestStatus::Ready;
        slot.event = Some(event);
        slot.chan = Some(chan);
        drop(inner);
        self.wake.notify_all();
    }

    /// Fails a parked request, keeping the nack event for the requester
    pub fn resolve_fail(&self, id: SetupId, event: Option<BoostEvent>) {
        let mut inner = self.lock();
        let slot = &mut inner.requests[id as usize];
        if slot.status != RequestStatus::Waiting {
            tracing::warn!("resolve_fail for setup id {} in status {:?}", id, slot.status);
            return;
        }
        slot.status = RequestStatus::Fail;
        slot.event = event;
        slot.chan = None;
        drop(inner);
        self.wake.notify_all();
    }

    /// Blocks until the slot leaves WAITING or the deadline passes
    pub fn wait(&self, id: SetupId, deadline: Duration) -> RequestStatus {
        let expires = Instant::now() + deadline;
        let mut inner = self.lock();
        loop {
            let status = inner.requests[id as usize].status;
            if status != RequestStatus::Waiting {
                return status;
            }
            let now = Instant::now();
            if now >= expires {
                return RequestStatus::Waiting;
            }
            let (guard, _timeout) = self
                .wake
                .wait_timeout(inner, expires - now)
                .expect("arbiter condvar blocked");
            inner = guard;
        }
    }

    /// Takes the terminal outcome of a request and frees the slot
    pub fn finish(&self, id: SetupId) -> (RequestStatus, Option<Arc<Channel>>, Option<BoostEvent>) {
        let mut inner = self.lock();
        let slot = &mut inner.requests[id as usize];
        let status = slot.status;
        slot.status = RequestStatus::Free;
        (status, slot.chan.take(), slot.event.take())
    }

    /// Re-initializes the outbound request table after a restart cycle
    pub fn reset(&self) {
        let mut inner = self.lock();
        inner.last_req = 0;
        inner.req_map.fill(false);
        inner.nack_map.fill(false);
        for row in inner.setup_grid.iter_mut() {
            row.fill(0);
        }
        for slot in inner.requests.iter_mut() {
            *slot = RequestSlot::default();
        }
        drop(inner);
        // Unblock any requester still parked from before the restart
        self.wake.notify_all();
    }

    /// Invariant check used by the tests: a slot owning grid entry implies
    /// the id is marked busy
    pub fn grid_consistent(&self) -> bool {
        let inner = self.lock();
        inner
            .setup_grid
            .iter()
            .flatten()
            .all(|&id| id == 0 || inner.req_map[id as usize])
    }
}

impl Default for RequestArbiter {
    fn default() -> Self {
        Self::new()
    }
}
