pub(crate) mod enrichment;
pub(crate) mod export;
pub(crate) mod pivot;
pub(crate) mod roster;
pub(crate) mod scoring;
pub(crate) mod sorting;
