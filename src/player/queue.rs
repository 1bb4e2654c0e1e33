use std::collections::VecDeque;
use tracing::{debug, info};

use super::error::QueueError;
use super::track::TrackDescriptor;

/// Cola FIFO de una sesión: el orden de inserción es el orden de
/// reproducción. Sin eliminación de duplicados ni reordenamiento.
#[derive(Debug)]
pub struct SessionQueue {
    items: VecDeque<TrackDescriptor>,
    max_size: usize,
}

impl SessionQueue {
    pub fn new(max_size: usize) -> Self {
        Self {
            items: VecDeque::new(),
            max_size,
        }
    }

    /// Agrega un track al final de la cola y devuelve su posición (base 1).
    pub fn enqueue(&mut self, track: TrackDescriptor) -> Result<usize, QueueError> {
        if self.items.len() >= self.max_size {
            return Err(QueueError::Full(self.max_size));
        }

        info!("➕ Agregado a la cola: {}", track.title);
        self.items.push_back(track);
        Ok(self.items.len())
    }

    /// Saca el primer track de la cola (estricto FIFO).
    pub fn dequeue_front(&mut self) -> Option<TrackDescriptor> {
        let next = self.items.pop_front();
        if let Some(ref track) = next {
            debug!("➡️ Siguiente en cola (FIFO): {}", track.title);
        }
        next
    }

    /// Vista ordenada de solo lectura. Solo para el comando de cola.
    pub fn tracks(&self) -> Vec<TrackDescriptor> {
        self.items.iter().cloned().collect()
    }

    /// Vacía la cola. Solo la usa una petición de stop explícita, nunca el
    /// avance normal de reproducción.
    pub fn clear(&mut self) {
        if !self.items.is_empty() {
            info!("🗑️ Cola limpiada ({} canciones)", self.items.len());
        }
        self.items.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
