// Copyright (c) 2018-2025 The Botho Foundation

#![doc = include_str!("../README.md")]
#![deny(missing_docs)]
#![allow(non_snake_case)]

pub mod domain_separators;
pub mod onetime_keys;
mod ring_signature;

pub use crate::ring_signature::*;
