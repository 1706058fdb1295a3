use super::evolution_engine::{ProgressCallback, TerminationReason};
use super::history::GenerationStats;
use std::sync::mpsc::Sender;

/// Logs a progress line every `log_frequency` generations
pub struct ConsoleProgressCallback {
    log_frequency: usize,
}

impl ConsoleProgressCallback {
    pub fn new(log_frequency: usize) -> Self {
        Self {
            log_frequency: log_frequency.max(1),
        }
    }
}

impl Default for ConsoleProgressCallback {
    fn default() -> Self {
        Self::new(10)
    }
}

impl ProgressCallback for ConsoleProgressCallback {
    fn on_generation_start(&mut self, generation: usize) {
        log::trace!("Generation {} starting", generation);
    }

    fn on_generation_complete(&mut self, stats: &GenerationStats) {
        if stats.generation % self.log_frequency == 0 {
            log::info!(
                "Generation {}: best {:.2} (so far {:.2}), mean {:.2}, hard {}, feasible {}, \
                 diversity {:.2}",
                stats.generation,
                stats.best_fitness,
                stats.best_so_far,
                stats.mean_fitness,
                stats.best_hard_violations,
                stats.feasible_count,
                stats.diversity
            );
        }
    }

    fn on_terminated(&mut self, reason: TerminationReason) {
        log::info!("Evolution stopped: {}", reason);
    }
}

/// For driving a UI or another thread through a channel
pub struct ChannelProgressCallback {
    sender: Sender<ProgressMessage>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProgressMessage {
    GenerationStart(usize),
    GenerationComplete(GenerationStats),
    Terminated(TerminationReason),
}

impl ChannelProgressCallback {
    pub fn new(sender: Sender<ProgressMessage>) -> Self {
        Self { sender }
    }
}

impl ProgressCallback for ChannelProgressCallback {
    fn on_generation_start(&mut self, generation: usize) {
        let _ = self.sender.send(ProgressMessage::GenerationStart(generation));
    }

    fn on_generation_complete(&mut self, stats: &GenerationStats) {
        let _ = self.sender.send(ProgressMessage::GenerationComplete(stats.clone()));
    }

    fn on_terminated(&mut self, reason: TerminationReason) {
        let _ = self.sender.send(ProgressMessage::Terminated(reason));
    }
}

/// Discards all progress
pub struct NoopProgressCallback;

impl ProgressCallback for NoopProgressCallback {
    fn on_generation_start(&mut self, _generation: usize) {}

    fn on_generation_complete(&mut self, _stats: &GenerationStats) {}

    fn on_terminated(&mut self, _reason: TerminationReason) {}
}
