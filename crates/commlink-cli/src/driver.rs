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

//! Local group script driver.
//!
//! Spawns one OS thread per rank over a shared [`LocalGroup`], gives
//! each thread its own [`Session`], and executes that rank's command
//! lines in order. Replies are printed live (one JSON object per line)
//! and also collected for the caller.
//!
//! A rank stops executing its remaining lines after its first failed
//! command: with point-to-point pairing between scripts, pressing on
//! after a failed send or receive would usually just deadlock the peer.

use crate::script;
use anyhow::{anyhow, Context};
use commlink_backend::LocalGroup;
use commlink_common::protocol::Reply;
use commlink_engine::Session;
use serde::Serialize;
use std::path::Path;
use std::thread;

/// One printed reply: the rank that executed the command, the command
/// name, and the reply envelope flattened alongside.
#[derive(Debug, Clone, Serialize)]
pub struct RankReply {
    pub rank: usize,
    pub command: String,
    #[serde(flatten)]
    pub reply: Reply,
}

/// Executes one program (a list of script lines) per rank.
///
/// Returns every reply, in per-rank execution order, ranks
/// concatenated in rank order. Printing happens as commands complete;
/// pass `quiet` to suppress it.
pub fn run_group(programs: Vec<Vec<String>>, quiet: bool) -> anyhow::Result<Vec<RankReply>> {
    if programs.is_empty() {
        return Err(anyhow!("at least one rank script is required"));
    }

    let endpoints = LocalGroup::connect(programs.len());
    tracing::info!(ranks = programs.len(), "local group starting");

    let mut collected = Vec::new();
    thread::scope(|scope| -> anyhow::Result<()> {
        let mut handles = Vec::new();
        for (rank, (endpoint, lines)) in endpoints.into_iter().zip(programs).enumerate() {
            handles.push(scope.spawn(move || run_rank(rank, Session::new(endpoint), lines, quiet)));
        }
        for handle in handles {
            let replies = handle
                .join()
                .map_err(|_| anyhow!("a rank thread panicked"))?;
            collected.extend(replies);
        }
        Ok(())
    })?;

    Ok(collected)
}

fn run_rank(rank: usize, mut session: Session, lines: Vec<String>, quiet: bool) -> Vec<RankReply> {
    let mut replies = Vec::new();
    for line in lines {
        let Some(call) = script::parse_line(&line) else {
            continue;
        };
        let outcome = session.dispatch(&call.name, &call.args);
        let failed = outcome.is_err();
        let entry = RankReply {
            rank,
            command: call.name,
            reply: Reply::from_outcome(outcome),
        };
        if !quiet {
            // One JSON object per line; serialization of this shape
            // cannot fail.
            if let Ok(rendered) = serde_json::to_string(&entry) {
                println!("{rendered}");
            }
        }
        replies.push(entry);
        if failed {
            tracing::warn!(rank, "stopping rank after failed command");
            break;
        }
    }
    replies
}

/// Reads one script file per rank and runs them as a group.
pub fn run_script_files(paths: &[impl AsRef<Path>], quiet: bool) -> anyhow::Result<Vec<RankReply>> {
    let mut programs = Vec::with_capacity(paths.len());
    for path in paths {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read script {}", path.display()))?;
        programs.push(text.lines().map(str::to_string).collect());
    }
    run_group(programs, quiet)
}

/// Runs the same command sequence on every rank of an n-rank group.
pub fn eval_on_ranks(
    commands: &[String],
    ranks: usize,
    quiet: bool,
) -> anyhow::Result<Vec<RankReply>> {
    if ranks == 0 {
        return Err(anyhow!("--ranks must be at least 1"));
    }
    let programs = vec![commands.to_vec(); ranks];
    run_group(programs, quiet)
}

/// Number of failed replies, the driver's contribution to the process
/// exit code.
pub fn failure_count(replies: &[RankReply]) -> usize {
    replies.iter().filter(|r| !r.reply.success).count()
}
