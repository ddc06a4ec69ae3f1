//! CSV adapters: seed files in, balance sheet out.

pub mod balance_writer;
pub mod seed_reader;
