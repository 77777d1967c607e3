//! A flat-file record store: named tables with a fixed schema, each kept as
//! a JSON document, driven from a line-oriented console.

#[macro_use]
extern crate lazy_static;

pub mod catalog;
pub mod cli;
pub mod config;
pub mod core;
pub mod storage;
pub mod table;
pub mod util;
