// Copyright (c) 2018-2025 The Botho Foundation

#![deny(missing_docs)]

//! Shared utilities for the privacy transaction engine.

pub mod logger;
