//! Judge panel selection.
//!
//! Panels are drawn by reputation-weighted sampling without replacement from
//! the registry's eligible pool. A drawn candidate is skipped and the draw
//! repeated when they are already seated, are the case's poster or worker,
//! or form a friendly pair with someone already seated. Failing to fill the
//! panel within the attempt budget is a hard error; there are no partial panels.

pub mod error;
pub mod pair_history;
pub mod selector;

pub use error::PanelError;
pub use pair_history::{PairHistory, PairRecord};
pub use selector::{PanelDraw, PanelSelector, SelectionRequest};
