pub mod adapter;
pub mod analyzers;
pub mod city;
pub mod condense;
pub mod config;
pub mod errors;
pub mod input;
pub mod report;
