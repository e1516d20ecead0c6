pub mod generation;
pub mod pes_id;
