#![deny(unused_variables)]
#![deny(dead_code)]
#![deny(unused_imports)]
#![deny(clippy::no_effect_underscore_binding)]
pub mod attributes;
pub mod batch;
pub mod columns;
pub mod config;
pub mod contributions;
pub mod dataset;
pub mod engine;
pub mod features;
pub mod form;
pub mod model;
pub mod report;
