/*!
 * Segmentation of structured text into translation units.
 *
 * - `strategy`: sentence / paragraph / regex movers
 * - `engine`: the structural walk that places delimiters
 */

pub mod engine;
pub mod strategy;

pub use engine::{SegmentationPlan, Segmenter, validate_delimiter};
pub use strategy::{PAGE_DELIMITER, SegmentMover, SegmentationStrategy};
