//! Routing backend for the tanker dispatcher built on `vrp-core`.
//!
//! [`VrpRoutingSolver`] implements [`RoutingSolver`](tanker_core::RoutingSolver)
//! by translating each single-trip [`RoundProblem`](tanker_core::RoundProblem)
//! into a capacitated VRP with time windows. Droppable deliveries become
//! optional jobs whose unassignment cost is their penalty; mandatory
//! deliveries carry a much larger cost so the search only drops them when
//! no feasible insertion exists. Lunch is expressed by splitting each
//! service window around the break and by making legs that would be driven
//! through it wait the break out.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod solver;
mod vrp;

pub use solver::{VrpRoutingSolver, VrpSolverConfig};
