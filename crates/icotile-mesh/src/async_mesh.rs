//! Background tile meshing on a worker pool.
//!
//! Requests go out over a bounded channel, results come back over an
//! unbounded one so workers never block on an undrained pool. They are
//! collected once per frame with [`AsyncTileMesher::drain_results`].
//! A cancelled request that is already building still finishes and lands in
//! the shared cache, but its result is dropped instead of delivered.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread::JoinHandle;

use crossbeam_channel::{Receiver, Sender, bounded, unbounded};
use dashmap::DashMap;
use icotile_sphere::TileId;
use tracing::{debug, trace};

use crate::{MeshBuildError, TileMesh, TileMeshBuilder};

/// A tile mesh to build in the background.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MeshRequest {
    /// Tile to mesh.
    pub tile: TileId,
    /// Lattice resolution.
    pub resolution: u32,
}

/// Outcome of a background build.
#[derive(Debug)]
pub struct MeshedTile {
    /// The request this answers.
    pub request: MeshRequest,
    /// The built (or cached) mesh, or why it could not be built.
    pub result: Result<Arc<TileMesh>, MeshBuildError>,
    /// Wall time spent in the builder, in microseconds.
    pub build_time_us: u64,
}

struct QueuedRequest {
    request: MeshRequest,
    cancelled: Arc<AtomicBool>,
}

/// Builds tile meshes on a pool of worker threads.
pub struct AsyncTileMesher {
    task_sender: Option<Sender<QueuedRequest>>,
    result_receiver: Receiver<MeshedTile>,
    active: Arc<DashMap<MeshRequest, Arc<AtomicBool>>>,
    in_flight: Arc<AtomicU64>,
    workers: Vec<JoinHandle<()>>,
}

impl AsyncTileMesher {
    /// Spawn `thread_count` workers sharing `builder`.
    ///
    /// At most `max_queued` requests wait in the queue; further submissions
    /// are rejected until workers catch up.
    ///
    /// # Errors
    ///
    /// Returns an error if a worker thread cannot be spawned.
    pub fn new(
        builder: TileMeshBuilder,
        thread_count: usize,
        max_queued: usize,
    ) -> std::io::Result<Self> {
        let (task_sender, task_receiver) = bounded::<QueuedRequest>(max_queued.max(1));
        let (result_sender, result_receiver) = unbounded::<MeshedTile>();
        let in_flight = Arc::new(AtomicU64::new(0));

        let mut workers = Vec::with_capacity(thread_count);
        for index in 0..thread_count.max(1) {
            let receiver = task_receiver.clone();
            let sender = result_sender.clone();
            let in_flight = Arc::clone(&in_flight);
            let builder = builder.clone();

            let handle = std::thread::Builder::new()
                .name(format!("tile-mesh-worker-{index}"))
                .spawn(move || {
                    while let Ok(queued) = receiver.recv() {
                        if queued.cancelled.load(Ordering::Relaxed) {
                            trace!("Skipping cancelled mesh request {:?}", queued.request);
                            in_flight.fetch_sub(1, Ordering::Relaxed);
                            continue;
                        }

                        let start = std::time::Instant::now();
                        let MeshRequest { tile, resolution } = queued.request;
                        let result = builder.build(tile, resolution);
                        let elapsed = start.elapsed().as_micros() as u64;

                        if !queued.cancelled.load(Ordering::Relaxed) {
                            let _ = sender.send(MeshedTile {
                                request: queued.request,
                                result,
                                build_time_us: elapsed,
                            });
                        }
                        in_flight.fetch_sub(1, Ordering::Relaxed);
                    }
                })?;
            workers.push(handle);
        }
        debug!("Started {} tile mesh workers", workers.len());

        Ok(Self {
            task_sender: Some(task_sender),
            result_receiver,
            active: Arc::new(DashMap::new()),
            in_flight,
            workers,
        })
    }

    /// Create a pool sized from the number of CPU cores.
    ///
    /// # Errors
    ///
    /// Returns an error if a worker thread cannot be spawned.
    pub fn with_defaults(builder: TileMeshBuilder) -> std::io::Result<Self> {
        let cpus = num_cpus::get().max(2);
        let threads = (cpus - 1).max(1);
        Self::new(builder, threads, 256)
    }

    /// Queue a build.
    ///
    /// Submitting a request that is already pending is a no-op. Returns
    /// `Err(request)` if the queue is full or the pool has shut down.
    pub fn submit(&self, request: MeshRequest) -> Result<(), MeshRequest> {
        let Some(sender) = &self.task_sender else {
            return Err(request);
        };
        if self.active.contains_key(&request) {
            return Ok(());
        }

        let cancelled = Arc::new(AtomicBool::new(false));
        self.active.insert(request, Arc::clone(&cancelled));
        self.in_flight.fetch_add(1, Ordering::Relaxed);

        sender
            .try_send(QueuedRequest { request, cancelled })
            .map_err(|e| {
                self.in_flight.fetch_sub(1, Ordering::Relaxed);
                let request = e.into_inner().request;
                self.active.remove(&request);
                request
            })
    }

    /// Cancel a pending build. Returns whether the request was pending.
    pub fn cancel(&self, request: &MeshRequest) -> bool {
        match self.active.remove(request) {
            Some((_, cancelled)) => {
                cancelled.store(true, Ordering::Relaxed);
                true
            }
            None => false,
        }
    }

    /// Collect every result finished since the last call.
    pub fn drain_results(&self) -> Vec<MeshedTile> {
        let mut results = Vec::new();
        while let Ok(done) = self.result_receiver.try_recv() {
            self.active.remove(&done.request);
            results.push(done);
        }
        results
    }

    /// Requests queued or building.
    pub fn in_flight_count(&self) -> u64 {
        self.in_flight.load(Ordering::Relaxed)
    }

    /// Whether `request` has been submitted and neither delivered nor cancelled.
    pub fn is_pending(&self, request: &MeshRequest) -> bool {
        self.active.contains_key(request)
    }

    /// Stop accepting work and join the workers after the queue drains.
    ///
    /// Undelivered results are kept and can still be drained afterwards.
    pub fn shutdown(&mut self) {
        self.task_sender.take();
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
    }
}

impl Drop for AsyncTileMesher {
    fn drop(&mut self) {
        self.shutdown();
    }
}
