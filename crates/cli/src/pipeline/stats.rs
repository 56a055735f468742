//! Run statistics.

use std::time::Duration;

use observability::PublishSummary;

/// Statistics from a `run` invocation
#[derive(Debug, Clone, Default)]
pub struct RunStats {
    /// Events handed to the output
    pub events_sent: u64,

    /// Input lines that were not valid events
    pub events_skipped: u64,

    /// Wall time including the final drain
    pub duration: Duration,

    /// Per-topic publish counts
    pub publish: PublishSummary,
}

impl RunStats {
    /// Events per second
    pub fn events_per_sec(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.events_sent as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n=== Run Statistics ===");
        println!("Duration: {:.2}s", self.duration.as_secs_f64());
        println!("Events sent: {}", self.events_sent);
        println!("Events skipped: {}", self.events_skipped);
        println!("Throughput: {:.2} events/s\n", self.events_per_sec());
        print!("{}", self.publish);
        println!();
    }
}
