//! Basic actor example: spawn a counter, dispatch messages, query it.
//!
//! Run with:
//!
//! ```bash
//! cargo run --example counter
//! ```

use std::time::Duration;

use arbor_rt::prelude::*;

#[derive(Debug, Clone)]
enum CounterMsg {
    Add(i64),
    Get(ReplyRef<i64>),
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

    let counter = spawn(
        &system,
        |state: i64, message: CounterMsg, _ctx| async move {
            match message {
                CounterMsg::Add(delta) => Ok(state + delta),
                CounterMsg::Get(reply) => {
                    reply.resolve(state);
                    Ok(state)
                }
            }
        },
        Props::new().with_name("counter").with_initial_state(0),
    )?;

    for delta in [1, 2, 3] {
        counter.dispatch(CounterMsg::Add(delta))?;
    }

    let total = counter
        .query(CounterMsg::Get, Duration::from_millis(100))
        .await?;
    println!("total = {total}");

    system.shutdown()?;
    Ok(())
}
