//! Storage services for the listing sync worker
//!
//! This crate wraps the AWS collaborators the worker talks to: the SQS listing
//! queue, the Dynamo DB table recording published listings, and the S3 bucket
//! holding listing images.

pub mod image_storage;
pub mod queue;
pub mod sync_record;
