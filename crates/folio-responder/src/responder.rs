use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use std::fmt;
use tracing::debug;

use crate::builtin::DEFAULT_OWNER;
use crate::table::{ResponseTable, Topic};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub topic: Topic,
    pub text: String,
}

/// Picks a canned reply for an utterance.
///
/// The table is fixed at construction. The random source can be swapped for a
/// seeded one so tests see a deterministic sequence.
pub struct Responder {
    table: ResponseTable,
    rng: Mutex<Box<dyn RngCore + Send>>,
}

impl Responder {
    pub fn new(table: ResponseTable) -> Self {
        Self {
            table,
            rng: Mutex::new(Box::new(StdRng::from_entropy())),
        }
    }

    pub fn with_rng<R: RngCore + Send + 'static>(mut self, rng: R) -> Self {
        self.rng = Mutex::new(Box::new(rng));
        self
    }

    pub fn with_seed(self, seed: u64) -> Self {
        self.with_rng(StdRng::seed_from_u64(seed))
    }

    pub fn table(&self) -> &ResponseTable {
        &self.table
    }

    pub fn classify(&self, utterance: &str) -> Topic {
        self.table.classify(utterance)
    }

    pub fn respond(&self, utterance: &str) -> Reply {
        let topic = self.table.classify(utterance);
        let replies = self.table.replies(topic);
        let index = self.rng.lock().gen_range(0..replies.len());
        debug!("Rule-based reply: topic={}, variant={}", topic, index);

        Reply {
            topic,
            text: replies[index].clone(),
        }
    }
}

impl Default for Responder {
    fn default() -> Self {
        Self::new(ResponseTable::builtin(DEFAULT_OWNER))
    }
}

impl fmt::Debug for Responder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Responder")
            .field("table", &self.table)
            .finish_non_exhaustive()
    }
}
