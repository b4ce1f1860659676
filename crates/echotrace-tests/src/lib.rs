//! End-to-end scenarios for EchoTrace.
//!
//! Masks go through extraction, seeds through the tracker and worker, and
//! results through the contour file format, using the library crates together.

#[cfg(test)]
mod extraction;

#[cfg(test)]
mod tracking;

#[cfg(test)]
mod files;
