// Copyright 2025-2026 CEMAXECUTER LLC

pub mod iq;
pub mod plot;
pub mod report;

pub use iq::IqWriter;
pub use plot::PlotOptions;
pub use report::SweepRecord;
