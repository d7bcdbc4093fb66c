pub mod evaluation;
pub mod lookup;
pub mod recommendation;
pub mod serving;
