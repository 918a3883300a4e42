//! Minimal actor runtime: a bounded mailbox per actor, one message handled
//! at a time, cooperative stop.

use anyhow::Result;
use tokio::{sync::mpsc, task::JoinHandle};

/// Minimal actor trait. `Self: Sized` avoids object-safety issues when
/// using `Context<Self>`.
#[async_trait::async_trait]
pub trait Actor: Send + Sized + 'static {
    type Msg: Send + 'static;

    /// Handle a single message. Return `Err` to stop the actor.
    async fn handle(&mut self, msg: Self::Msg, ctx: &mut Context<Self>) -> Result<()>;
}

/// Runtime context for an actor instance.
pub struct Context<A: Actor> {
    addr: Addr<A>,
    pub stop: bool,
}

impl<A: Actor> Context<A> {
    /// Get a clone of this actor's `Addr`, e.g. to post follow-up work
    /// back into the mailbox from a spawned task.
    pub fn addr(&self) -> Addr<A> {
        self.addr.clone()
    }

    /// Request a graceful stop after processing the current message.
    pub fn stop(&mut self) {
        self.stop = true;
    }
}

/// Address for sending messages to an actor.
pub struct Addr<A: Actor>(mpsc::Sender<A::Msg>);

/// Manual Clone to avoid unnecessary bounds on `A`/`A::Msg`.
impl<A: Actor> Clone for Addr<A> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<A: Actor> Addr<A> {
    /// Async send; awaits backpressure. Returns the message if the
    /// receiver is dropped.
    pub async fn send(&self, msg: A::Msg) -> std::result::Result<(), A::Msg> {
        self.0.send(msg).await.map_err(|e| e.0)
    }

    /// Try to send without waiting. Returns the message if the mailbox is
    /// full or closed.
    pub fn try_send(&self, msg: A::Msg) -> std::result::Result<(), A::Msg> {
        self.0.try_send(msg).map_err(|e| e.into_inner())
    }
}

/// Handle to a running actor task.
pub struct ActorHandle<A: Actor> {
    pub addr: Addr<A>,
    pub task: JoinHandle<anyhow::Result<()>>,
}

/// Spawn an actor with a bounded mailbox.
///
/// Stop conditions:
/// - `handle` returns `Err`
/// - all senders are dropped
/// - `ctx.stop()` is called
pub fn spawn_actor<A: Actor>(mut actor: A, capacity: usize) -> ActorHandle<A> {
    let (tx, mut rx) = mpsc::channel::<A::Msg>(capacity);
    let addr = Addr(tx);
    let addr_for_ctx = addr.clone();

    let task = tokio::spawn(async move {
        let mut ctx = Context {
            addr: addr_for_ctx,
            stop: false,
        };

        while let Some(msg) = rx.recv().await {
            if let Err(e) = actor.handle(msg, &mut ctx).await {
                tracing::error!(target: "argdec-engine", error = ?e, "actor returned error; stopping");
                return Err(e);
            }
            if ctx.stop {
                break;
            }
        }
        Ok(())
    });

    ActorHandle { addr, task }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Accumulator {
        total: u8,
    }

    #[async_trait::async_trait]
    impl Actor for Accumulator {
        type Msg = u8;

        async fn handle(&mut self, msg: Self::Msg, ctx: &mut Context<Self>) -> Result<()> {
            self.total += msg;
            if self.total >= 5 {
                ctx.stop();
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn actor_processes_until_stop() {
        let ActorHandle { addr, task } = spawn_actor(Accumulator { total: 0 }, 8);
        addr.send(2).await.unwrap();
        addr.send(3).await.unwrap();
        drop(addr);
        task.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn actor_drains_mailbox_after_senders_drop() {
        let ActorHandle { addr, task } = spawn_actor(Accumulator { total: 0 }, 4);
        addr.try_send(1).unwrap();
        drop(addr);
        task.await.unwrap().unwrap();
    }
}
