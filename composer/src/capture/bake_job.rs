use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver, TryRecvError};
use std::sync::Arc;

use log::debug;
use uuid::Uuid;

use crate::frame::ColorFrame;
use crate::mesh::Texture;
use crate::misc::{Point2, Point3};
use crate::texturing::{bake_texture, BakeParams};
use base::defs::{Error, ErrorKind::*};

pub enum BakeOutcome {
    Texture(Texture),
    NoTexture,
    Failed(Error),
}

/// Texture bake running on the rayon pool for one published mesh.
pub struct BakeJob {
    pub generation: u64,
    pub mesh_id: Uuid,
    cancelled: Arc<AtomicBool>,
    receiver: Receiver<BakeOutcome>,
}

impl BakeJob {
    pub fn spawn(
        generation: u64,
        mesh_id: Uuid,
        vertices: Vec<Point3>,
        uvs: Vec<Point2>,
        frames: Vec<Arc<ColorFrame>>,
        params: BakeParams,
    ) -> BakeJob {
        let (sender, receiver) = channel();
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = cancelled.clone();

        rayon::spawn(move || {
            if flag.load(Ordering::Acquire) {
                debug!("bake for mesh {} cancelled before start", mesh_id);
                return;
            }
            let outcome = match bake_texture(&vertices, &uvs, &frames, &params)
            {
                Some(image) => match Texture::from_image(image) {
                    Ok(texture) => BakeOutcome::Texture(texture),
                    Err(err) => BakeOutcome::Failed(err),
                },
                None => BakeOutcome::NoTexture,
            };
            if !flag.load(Ordering::Acquire) {
                // The owner may be gone already.
                let _ = sender.send(outcome);
            }
        });

        BakeJob {
            generation,
            mesh_id,
            cancelled,
            receiver,
        }
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn try_take(&self) -> Option<BakeOutcome> {
        match self.receiver.try_recv() {
            Ok(outcome) => Some(outcome),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(lost()),
        }
    }

    pub fn wait(&self) -> BakeOutcome {
        self.receiver.recv().unwrap_or_else(|_| lost())
    }
}

fn lost() -> BakeOutcome {
    let desc = "bake job ended without a result".to_string();
    BakeOutcome::Failed(Error::new(InconsistentState, desc))
}
