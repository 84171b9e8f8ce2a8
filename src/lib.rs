//! Geometric summaries of populated point sets, served over HTTP.
//!
//! Given places with a latitude, longitude and population this crate computes a
//! padded bounding box, the mean center, a concave hull, a Voronoi partition
//! clipped to the box, and the "optimal point": the centroid of the Voronoi cell
//! that belongs to the most populated place.

pub mod types;
pub mod config;
pub mod error;
pub mod parse;
pub mod summary;
pub mod geometry;
pub mod optimal;
pub mod pipeline;
pub mod server;
