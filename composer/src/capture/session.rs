use std::sync::mpsc::Receiver;
use std::sync::Arc;

use indexmap::IndexMap;
use log::{debug, info, warn};

use crate::accumulator::VertexAccumulator;
use crate::capture::bake_job::{BakeJob, BakeOutcome};
use crate::capture::events::EventBus;
use crate::capture::gates::{self, Rejection};
use crate::capture::ring_buffer::RingBuffer;
use crate::capture::state::{self, Transition};
use crate::capture::{CapabilityProbe, CaptureParams};
use crate::capture::{SessionEvent, SessionState};
use crate::frame::{ColorFrame, GeometrySample};
use crate::mesh::Mesh;
use crate::misc::Isometry3;
use crate::texturing::BakeParams;

#[derive(Clone, Debug, PartialEq)]
pub enum SampleOutcome {
    /// The session is not capturing.
    Ignored,
    Accepted,
    Rejected(Rejection),
    /// The capture duration elapsed; the sample itself was not used.
    Finished,
}

/// A single face capture session.
///
/// Driven by one producer through `on_tick` (or the finer-grained
/// `on_geometry_sample` and `on_color_frame`). Once finished with enough
/// accepted samples, the averaged mesh is published right away and a texture
/// bake is started in the background; `poll_bake` or `wait_bake` applies its
/// result to the published mesh in place.
pub struct Capture<P: CapabilityProbe> {
    probe: P,
    params: CaptureParams,
    bake_params: BakeParams,
    thresholds: IndexMap<String, f32>,

    state: SessionState,
    start_time: f64,
    accumulator: VertexAccumulator,
    topology: Option<Arc<[u32]>>,
    last_accepted: Option<Isometry3>,
    accepted_count: usize,
    last_color_count: usize,
    bake_frames: RingBuffer<Arc<ColorFrame>>,
    cloud_frames: RingBuffer<Arc<ColorFrame>>,

    mesh: Option<Mesh>,
    bake: Option<BakeJob>,
    generation: u64,
    events: EventBus,
}

impl<P: CapabilityProbe> Capture<P> {
    pub fn new(
        probe: P,
        params: CaptureParams,
        bake_params: BakeParams,
    ) -> Capture<P> {
        let thresholds = params.thresholds();
        let bake_frames = RingBuffer::new(params.bake_capacity);
        let cloud_frames = RingBuffer::new(params.cloud_capacity);
        Capture {
            probe,
            params,
            bake_params,
            thresholds,
            state: SessionState::Idle,
            start_time: 0.0,
            accumulator: VertexAccumulator::default(),
            topology: None,
            last_accepted: None,
            accepted_count: 0,
            last_color_count: 0,
            bake_frames,
            cloud_frames,
            mesh: None,
            bake: None,
            generation: 0,
            events: EventBus::default(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn accepted_count(&self) -> usize {
        self.accepted_count
    }

    pub fn mesh(&self) -> Option<&Mesh> {
        self.mesh.as_ref()
    }

    /// Color frames kept for upload, oldest first.
    pub fn cloud_frames(&self) -> &RingBuffer<Arc<ColorFrame>> {
        &self.cloud_frames
    }

    /// Whether a bake for the current mesh is still pending.
    pub fn is_baking(&self) -> bool {
        self.bake
            .as_ref()
            .map_or(false, |job| job.generation == self.generation)
    }

    pub fn subscribe(&mut self) -> Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Begins a session at time `now` (seconds, same clock as sample
    /// timestamps). Returns whether capturing actually started.
    pub fn start(&mut self, now: f64) -> bool {
        if !self.probe.is_supported() {
            warn!("face tracking is not supported, capture not started");
            return false;
        }
        if self.state != SessionState::Idle {
            warn!("cannot start capture in {} state", self.state);
            return false;
        }

        self.clear_buffers();
        self.start_time = now;
        info!("starting capture at {:.3}s", now);
        self.transition(Transition::Start);
        true
    }

    /// Feeds one tracker update together with the camera frame captured
    /// alongside it, if any.
    pub fn on_tick(
        &mut self,
        sample: GeometrySample,
        frame: Option<ColorFrame>,
    ) -> SampleOutcome {
        let outcome = self.on_geometry_sample(sample);
        if let Some(frame) = frame {
            self.on_color_frame(frame);
        }
        outcome
    }

    pub fn on_geometry_sample(
        &mut self,
        sample: GeometrySample,
    ) -> SampleOutcome {
        if self.state != SessionState::Capturing {
            return SampleOutcome::Ignored;
        }

        let elapsed = sample.timestamp - self.start_time;
        if elapsed >= self.params.duration {
            debug!("capture duration elapsed after {:.3}s", elapsed);
            self.finish();
            return SampleOutcome::Finished;
        }

        if let Err(rejection) = gates::evaluate(
            &sample,
            &self.thresholds,
            self.params.motion_threshold,
            self.last_accepted.as_ref(),
        ) {
            debug!("sample at {:.3}s rejected: {}", elapsed, rejection);
            return SampleOutcome::Rejected(rejection);
        }

        if self.topology.is_none() {
            debug!(
                "captured topology of {} triangles",
                sample.topology.len() / 3
            );
            self.topology = Some(sample.topology.clone());
        }
        self.last_accepted = Some(sample.transform);
        self.accumulator.push(sample.vertices);
        self.accepted_count += 1;
        SampleOutcome::Accepted
    }

    /// Buffers a color frame each time the accepted count reaches a new
    /// multiple of the color stride. Returns whether the frame was kept.
    pub fn on_color_frame(&mut self, frame: ColorFrame) -> bool {
        if self.state != SessionState::Capturing {
            return false;
        }

        let stride = self.params.color_stride.max(1);
        if self.accepted_count == 0
            || self.accepted_count % stride != 0
            || self.accepted_count == self.last_color_count
        {
            return false;
        }
        self.last_color_count = self.accepted_count;

        let frame = Arc::new(frame);
        self.bake_frames.push(frame.clone());
        self.cloud_frames.push(frame);
        true
    }

    /// Ends capturing and builds the mesh. Does nothing outside of capturing.
    pub fn finish(&mut self) {
        if self.state != SessionState::Capturing {
            debug!("nothing to finish in {} state", self.state);
            return;
        }
        self.transition(Transition::Finish);

        let vertices = match self.accumulator.average() {
            Some(vertices)
                if self.accepted_count >= self.params.min_accepted_frames =>
            {
                vertices
            }
            _ => {
                info!(
                    "capture rejected with {} of {} required samples",
                    self.accepted_count, self.params.min_accepted_frames
                );
                self.clear_buffers();
                self.transition(Transition::Fail);
                return;
            }
        };
        let indices = self
            .topology
            .as_ref()
            .map(|topology| topology.to_vec())
            .unwrap_or_default();

        let mesh = Mesh::new(vertices, indices);
        if let Err(err) = mesh.validate() {
            warn!("published mesh will not export: {}", err);
        }
        info!(
            "built mesh {} from {} samples ({} vertices, {} triangles)",
            mesh.id,
            self.accepted_count,
            mesh.vertices.len(),
            mesh.num_triangles()
        );

        self.accumulator.clear();
        let frames = self.bake_frames.to_vec();
        self.bake_frames.clear();

        self.bake = Some(BakeJob::spawn(
            self.generation,
            mesh.id,
            mesh.vertices.clone(),
            mesh.uvs.clone(),
            frames,
            self.bake_params.clone(),
        ));
        let id = mesh.id;
        self.mesh = Some(mesh);
        self.events.publish(SessionEvent::MeshPublished(id));
        self.transition(Transition::Complete);
    }

    /// Returns to idle from any state, dropping the mesh. A bake in flight is
    /// cancelled and its result, if one still arrives, is discarded.
    pub fn reset(&mut self) {
        if let Some(job) = &self.bake {
            if job.generation == self.generation {
                debug!("cancelling bake for mesh {}", job.mesh_id);
                job.cancel();
            }
        }
        self.generation += 1;
        self.mesh = None;
        self.clear_buffers();
        if self.state != SessionState::Idle {
            self.transition(Transition::Reset);
        }
    }

    /// Applies the bake result if it is ready. Returns whether a result was
    /// consumed.
    pub fn poll_bake(&mut self) -> bool {
        let outcome = match self.bake.as_ref().and_then(|job| job.try_take()) {
            Some(outcome) => outcome,
            None => return false,
        };
        if let Some(job) = self.bake.take() {
            self.apply_bake(&job, outcome);
        }
        true
    }

    /// Blocks until the bake in flight, if any, delivers its result.
    pub fn wait_bake(&mut self) -> bool {
        match self.bake.take() {
            Some(job) => {
                let outcome = job.wait();
                self.apply_bake(&job, outcome);
                true
            }
            None => false,
        }
    }

    fn apply_bake(&mut self, job: &BakeJob, outcome: BakeOutcome) {
        let mesh = match self.mesh.as_mut() {
            Some(mesh) if job.generation == self.generation => mesh,
            _ => {
                debug!("discarding stale bake for mesh {}", job.mesh_id);
                return;
            }
        };

        let event = match outcome {
            BakeOutcome::Texture(texture) => {
                info!(
                    "applied {}x{} texture to mesh {}",
                    texture.image.width(),
                    texture.image.height(),
                    mesh.id
                );
                mesh.texture = Some(texture);
                SessionEvent::TextureApplied(mesh.id)
            }
            BakeOutcome::NoTexture => {
                info!("mesh {} stays untextured", mesh.id);
                SessionEvent::TextureUnavailable(mesh.id)
            }
            BakeOutcome::Failed(err) => {
                warn!("failed to bake texture for mesh {}: {}", mesh.id, err);
                SessionEvent::BakeFailed(mesh.id, err.to_string())
            }
        };
        self.events.publish(event);
    }

    fn transition(&mut self, transition: Transition) {
        match state::next(self.state, transition) {
            Some(next) => {
                debug!("session {} -> {}", self.state, next);
                self.state = next;
                self.events.publish(SessionEvent::StateChanged(next));
            }
            None => {
                warn!("ignoring {:?} in {} state", transition, self.state)
            }
        }
    }

    fn clear_buffers(&mut self) {
        self.accumulator.clear();
        self.topology = None;
        self.last_accepted = None;
        self.accepted_count = 0;
        self.last_color_count = 0;
        self.bake_frames.clear();
        self.cloud_frames.clear();
    }
}
