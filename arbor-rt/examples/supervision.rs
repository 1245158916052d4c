//! Supervision example: a parent that resets a flaky child on every fault.
//!
//! Run with:
//!
//! ```bash
//! cargo run --example supervision
//! ```

use std::time::Duration;

use arbor_rt::prelude::*;

#[derive(Debug, Clone)]
enum JobMsg {
    Run(u32),
    Report(ReplyRef<u32>),
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "arbor_rt=debug".into()),
        )
        .init();

    let system = ActorSystem::new("demo");

    let supervisor = spawn(
        &system,
        |state: (), _message: (), _ctx| async move { Ok(state) },
        Props::new()
            .with_name("supervisor")
            .with_initial_state(())
            .with_on_crash(|fault: Fault, ctx: SupervisionContext| async move {
                let child = ctx.child().map(|child| child.path().to_string());
                println!("supervisor saw a fault from {child:?}: {}", fault.error());
                Directive::ResetChild
            }),
    )?;

    let worker = spawn(
        &supervisor,
        |state: u32, message: JobMsg, _ctx| async move {
            match message {
                JobMsg::Run(job) if job % 3 == 0 => Err(format!("job {job} is cursed").into()),
                JobMsg::Run(_) => Ok(state + 1),
                JobMsg::Report(reply) => {
                    reply.resolve(state);
                    Ok(state)
                }
            }
        },
        Props::new()
            .with_name("worker")
            .with_initial_state_fn(|_ctx| async { Ok(0) }),
    )?;

    for job in 1..=7 {
        worker.dispatch(JobMsg::Run(job))?;
    }

    let completed = worker
        .query(JobMsg::Report, Duration::from_millis(200))
        .await?;
    println!("worker completed {completed} job(s) since its last reset");

    system.shutdown()?;
    Ok(())
}
