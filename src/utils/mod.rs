//! Internal helpers shared by the promise engine.

mod take;

pub(crate) use take::TakeCell;
