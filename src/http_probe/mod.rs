pub mod barrier;
pub mod concurrent;
pub mod probe;
pub mod result;

pub mod prelude {
    pub use super::barrier::{Completion, JoinBarrier};
    pub use super::concurrent::ConcurrentProbe;
    pub use super::probe::probe_url;
    pub use super::result::{LaunchStamp, ProbeOutcome, ProbeResult, ProbeTask};
}
