pub mod alignment;
pub mod approx;
pub mod cigar;
