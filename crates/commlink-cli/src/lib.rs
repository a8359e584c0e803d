// Copyright 2026 Commlink Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! # Commlink CLI
//!
//! Command-line driver for Commlink: runs command scripts against an
//! in-process local group, one OS thread per rank.
//!
//! This crate provides two operating modes:
//!
//! - **run**: one script file per rank, rank assigned by position; the
//!   ranks execute concurrently and point-to-point commands pair up
//!   across scripts
//! - **eval**: a fixed command sequence executed identically on every
//!   rank (useful for `size`/`rank`/`barrier` smoke tests)
//!
//! Replies are printed as one JSON object per line so output can be
//! piped into unix tools.

pub mod driver;
pub mod script;
