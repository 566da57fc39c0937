//! Request -> coordinator translation.
//!
//! Pure plumbing: every command maps to exactly one coordinator call, and
//! every coordinator error re-encodes as a wire error reply. No validation
//! happens here; the coordinator owns policy.

use std::path::PathBuf;

use gforge_core::{Coordinator, CoordinatorError, SpawnRequest};
use gforge_protocol::{OkReply, Reply, Request};
use tracing::info;

/// Apply one command against the coordinator. Blocking: run on a blocking
/// task from async context.
pub fn apply(coordinator: &Coordinator, request: Request) -> Reply {
    match request {
        Request::Spawn {
            name,
            agent,
            project,
            branch,
        } => reply(coordinator.spawn(SpawnRequest {
            name,
            agent_key: agent,
            project_path: PathBuf::from(project),
            branch,
        })
        .map(|goblin| OkReply::with_goblin(goblin.summary()))),

        Request::List => Reply::Ok(OkReply::with_goblins(
            coordinator.list().iter().map(|g| g.summary()).collect(),
        )),

        Request::Status { name } => reply(
            coordinator
                .get(&name)
                .map(|goblin| OkReply::with_goblin(goblin.summary())),
        ),

        Request::Send { name, text } => {
            reply(coordinator.send_task(&name, &text).map(|()| OkReply::empty()))
        }

        Request::Capture { name, lines } => reply(
            coordinator
                .output(&name, lines)
                .map(OkReply::with_output),
        ),

        Request::Stop { name } => reply(
            coordinator
                .stop(&name)
                .map(|goblin| OkReply::with_goblin(goblin.summary())),
        ),

        Request::Kill { name } => reply(coordinator.kill(&name).map(|()| OkReply::empty())),

        Request::Stats => Reply::Ok(OkReply::with_stats(coordinator.stats())),

        // Request is non_exhaustive: future actions from newer clients get a
        // structured rejection instead of a dropped connection.
        other => Reply::error(
            gforge_protocol::ErrorCode::BadInput,
            format!("unsupported action: {:?}", other),
        ),
    }
}

fn reply(result: Result<OkReply, CoordinatorError>) -> Reply {
    match result {
        Ok(ok) => Reply::Ok(ok),
        Err(e) => {
            info!(
                event = "daemon.facade.command_failed",
                code = %e.wire_code(),
                error = %e
            );
            Reply::error(e.wire_code(), e.to_string())
        }
    }
}
