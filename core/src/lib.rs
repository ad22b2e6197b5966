pub mod appeal_stage;
pub mod campaign_stage;
pub mod catalog;
pub mod config;
pub mod constituent_stage;
pub mod dataset;
pub mod engine;
pub mod error;
pub mod event;
pub mod household_stage;
pub mod metrics_stage;
pub mod model;
pub mod name_generator;
pub mod pledge_stage;
pub mod rng;
pub mod segmentation_stage;
pub mod stage;
pub mod store;
pub mod transaction_stage;
pub mod types;
pub mod weighted;
