//! Pure core of the team draft: score validation and aggregation, calendar
//! days in a fixed reference zone, the daily voting gate, and the serpentine
//! team allocator.
//!
//! Nothing in this crate touches storage. Callers gather a snapshot of the
//! candidates and ratings and pass it in.

pub mod allocate;
pub mod day;
pub mod gate;
pub mod score;

pub use allocate::{allocate, Ranked, Team, TEAM_COUNT};
pub use day::VotingDay;
pub use gate::{has_completed, remaining_for, Entrant, Progress};
pub use score::{InvalidScore, Score, ScoreTally};
