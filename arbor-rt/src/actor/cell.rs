//! The actor cell: per-actor lifecycle, dispatch loop, and fault handling.
//!
//! One cell owns one actor's mailbox, state slot, children, and scheduling
//! handles. The `busy` flag strictly governs message handling: at most one
//! behavior invocation is in flight per actor at any time, and the mailbox is
//! guaranteed empty whenever `busy` goes false. The cell's lock is only ever
//! held for short critical sections, never across an await; cross-cell calls
//! (parent notification, child stop) are made after releasing it.

// Layer 1: Standard library imports
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Weak};
use std::time::Duration;

// Layer 2: Third-party crate imports
use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use futures::FutureExt;
use parking_lot::Mutex;
use thiserror::Error;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, error, trace, warn};

// Layer 3: Internal module imports
use super::actor_ref::UntypedRef;
use super::behavior::{AfterStopFn, AnyState, BehaviorFn, InitFn};
use super::context::{Context, SupervisionContext};
use super::path::ActorPath;
use crate::error::{panic_to_error, ActorError, BehaviorError};
use crate::mailbox::Mailbox;
use crate::message::AnyMessage;
use crate::supervisor::policy::PolicyFn;
use crate::supervisor::{Directive, Fault};
use crate::system::shared::SystemShared;
use crate::util::ids::ActorId;
use crate::util::schedule;

/// Initialization never produced a state for this actor, but a message was
/// scheduled against it anyway (initialization failed and supervision chose
/// to resume).
#[derive(Debug, Error)]
#[error("actor state is unavailable: initialization did not produce a state")]
struct StateUnavailable;

/// Who owns the actor's processing turn when a fault is being handled.
///
/// `OwnTurn`: the fault was raised by this actor's in-flight run, which is
/// suspended inside the fault path; resuming may take the next message
/// directly. `External`: the fault arrived from outside the actor's own turn
/// (escalated from a child, routed from a stateless execution, raised by
/// initialization); resuming may only start a turn if the actor is idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FaultOrigin {
    OwnTurn,
    External,
}

/// The escalating child attached to a fault, with its turn ownership so a
/// `ResetChild` decision can resume it correctly.
#[derive(Clone)]
pub(crate) struct FaultSource {
    pub(crate) cell: Arc<ActorCell>,
    pub(crate) origin: FaultOrigin,
}

/// The cell's link to its parent. Nulled on stop.
#[derive(Clone)]
pub(crate) enum ParentLink {
    /// Parent is the system root guardian.
    Root,
    /// Parent is another actor.
    Cell(Weak<ActorCell>),
}

enum InitStatus {
    Pending,
    Ready,
    Failed(Arc<BehaviorError>),
}

/// Owned outcome of [`ActorCell::take_init`], so the lock guard used to
/// compute it never needs to outlive the call.
enum TakeInit {
    Stopped,
    Retry,
    Failed(Arc<BehaviorError>),
    Ready(AnyState, u64, Context),
    MissingState,
}

struct CellInner {
    mailbox: Mailbox,
    busy: bool,
    stopped: bool,
    state: Option<AnyState>,
    init_status: InitStatus,
    init_epoch: u64,
    children: HashMap<String, Arc<ActorCell>>,
    child_refs: HashMap<String, UntypedRef>,
    immediate: Option<JoinHandle<()>>,
    idle_timer: Option<JoinHandle<()>>,
}

/// Everything a cell needs at construction.
pub(crate) struct CellSpec {
    pub(crate) id: ActorId,
    pub(crate) name: String,
    pub(crate) path: ActorPath,
    pub(crate) system: Arc<SystemShared>,
    pub(crate) parent_link: ParentLink,
    pub(crate) parent_ref: UntypedRef,
    pub(crate) behavior: BehaviorFn,
    pub(crate) on_crash: PolicyFn,
    pub(crate) after_stop: Option<AfterStopFn>,
    pub(crate) init: InitFn,
    pub(crate) shutdown_after: Option<Duration>,
}

pub(crate) struct ActorCell {
    id: ActorId,
    name: String,
    path: ActorPath,
    spawned_at: DateTime<Utc>,
    system: Arc<SystemShared>,
    parent: Mutex<Option<ParentLink>>,
    parent_ref: UntypedRef,
    behavior: BehaviorFn,
    on_crash: PolicyFn,
    after_stop: Option<AfterStopFn>,
    init: InitFn,
    shutdown_after: Option<Duration>,
    inner: Mutex<CellInner>,
    init_notify: Notify,
}

impl ActorCell {
    pub(crate) fn new(spec: CellSpec) -> Arc<Self> {
        Arc::new(Self {
            id: spec.id,
            name: spec.name,
            path: spec.path,
            spawned_at: Utc::now(),
            system: spec.system,
            parent: Mutex::new(Some(spec.parent_link)),
            parent_ref: spec.parent_ref,
            behavior: spec.behavior,
            on_crash: spec.on_crash,
            after_stop: spec.after_stop,
            init: spec.init,
            shutdown_after: spec.shutdown_after.map(schedule::clamp_delay),
            inner: Mutex::new(CellInner {
                mailbox: Mailbox::new(),
                busy: false,
                stopped: false,
                state: None,
                init_status: InitStatus::Pending,
                init_epoch: 0,
                children: HashMap::new(),
                child_refs: HashMap::new(),
                immediate: None,
                idle_timer: None,
            }),
            init_notify: Notify::new(),
        })
    }

    pub(crate) fn id(&self) -> ActorId {
        self.id
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn path(&self) -> &ActorPath {
        &self.path
    }

    pub(crate) fn spawned_at(&self) -> DateTime<Utc> {
        self.spawned_at
    }

    pub(crate) fn is_stopped(&self) -> bool {
        self.inner.lock().stopped
    }

    pub(crate) fn untyped_ref(&self) -> UntypedRef {
        UntypedRef::new(self.id, self.path.clone(), Arc::downgrade(&self.system))
    }

    // ------------------------------------------------------------------
    // Dispatch loop
    // ------------------------------------------------------------------

    /// Accept a message. Clears the idle timer, then either takes the
    /// processing turn immediately or queues behind the in-flight one.
    pub(crate) fn dispatch(self: &Arc<Self>, message: AnyMessage) -> Result<(), ActorError> {
        let mut inner = self.inner.lock();
        if inner.stopped {
            return Err(ActorError::Stopped {
                path: self.path.clone(),
            });
        }
        if let Some(timer) = inner.idle_timer.take() {
            timer.abort();
        }
        if inner.busy {
            inner.mailbox.push(message);
        } else {
            self.schedule_run(&mut inner, message);
        }
        Ok(())
    }

    /// Take the turn: mark busy and schedule one macrotask for `message`.
    fn schedule_run(self: &Arc<Self>, inner: &mut CellInner, message: AnyMessage) {
        inner.busy = true;
        let cell = Arc::clone(self);
        inner.immediate = Some(schedule::macrotask(async move {
            cell.run_message(message).await;
        }));
    }

    /// Synchronous half of the init gate: locks, inspects init status, and
    /// returns an owned outcome so the lock guard never spans an `.await`.
    fn take_init(self: &Arc<Self>) -> TakeInit {
        let mut inner = self.inner.lock();
        if inner.stopped {
            return TakeInit::Stopped;
        }
        // A reset slipped in between the gate and the lock.
        if matches!(inner.init_status, InitStatus::Pending) {
            return TakeInit::Retry;
        }
        if let InitStatus::Failed(ref failure) = inner.init_status {
            return TakeInit::Failed(Arc::clone(failure));
        }
        match inner.state.take() {
            Some(state) => {
                let epoch = inner.init_epoch;
                let ctx = self.context_from(&inner);
                TakeInit::Ready(state, epoch, ctx)
            }
            None => TakeInit::MissingState,
        }
    }

    /// One full behavior invocation: await initialization, run the behavior,
    /// store the next state, drain.
    async fn run_message(self: Arc<Self>, message: AnyMessage) {
        let (state, epoch, ctx) = loop {
            self.wait_init_settled().await;
            match self.take_init() {
                TakeInit::Stopped => return,
                TakeInit::Retry => continue,
                TakeInit::Failed(failure) => {
                    self.handle_fault(Some(message), failure, None, FaultOrigin::OwnTurn)
                        .await;
                    return;
                }
                TakeInit::MissingState => {
                    let failure: Arc<BehaviorError> = Arc::new(Box::new(StateUnavailable));
                    self.handle_fault(Some(message), failure, None, FaultOrigin::OwnTurn)
                        .await;
                    return;
                }
                TakeInit::Ready(state, epoch, ctx) => break (state, epoch, ctx),
            }
        };

        let invocation = (*self.behavior)(state, message.clone(), ctx);
        match AssertUnwindSafe(invocation).catch_unwind().await {
            Ok(Ok(next_state)) => {
                let proceed = {
                    let mut inner = self.inner.lock();
                    if inner.stopped {
                        false
                    } else {
                        if inner.init_epoch == epoch {
                            inner.state = Some(next_state);
                        }
                        // On a mismatch a reset reinitialized the actor while
                        // this invocation was in flight; its result is stale.
                        true
                    }
                };
                if proceed {
                    self.after_message(&message);
                    self.process_next();
                }
            }
            Ok(Err(failure)) => {
                self.handle_fault(Some(message), Arc::new(failure), None, FaultOrigin::OwnTurn)
                    .await;
            }
            Err(payload) => {
                let failure: Arc<BehaviorError> = Arc::new(panic_to_error(payload));
                self.handle_fault(Some(message), failure, None, FaultOrigin::OwnTurn)
                    .await;
            }
        }
    }

    /// Hook point after each successfully processed message.
    fn after_message(&self, message: &AnyMessage) {
        trace!(path = %self.path, message = ?message, "message processed");
    }

    /// End of a turn: pop the next message or go idle. Caller must own the
    /// turn (`busy` is true and no other run is scheduled).
    fn process_next(self: &Arc<Self>) {
        let mut inner = self.inner.lock();
        if inner.stopped {
            return;
        }
        match inner.mailbox.shift() {
            Some(message) => self.schedule_run(&mut inner, message),
            None => {
                inner.busy = false;
                self.arm_idle_timer(&mut inner);
            }
        }
    }

    /// Start a turn only if the actor is idle. Safe to call from outside the
    /// actor's own processing turn.
    fn wake(self: &Arc<Self>) {
        let mut inner = self.inner.lock();
        if inner.stopped || inner.busy {
            return;
        }
        match inner.mailbox.shift() {
            Some(message) => self.schedule_run(&mut inner, message),
            None => self.arm_idle_timer(&mut inner),
        }
    }

    fn resume(self: &Arc<Self>, origin: FaultOrigin) {
        match origin {
            FaultOrigin::OwnTurn => self.process_next(),
            FaultOrigin::External => self.wake(),
        }
    }

    /// Arm the idle self-stop timer, when configured. Only called while the
    /// actor is idle; any previous timer is replaced.
    fn arm_idle_timer(self: &Arc<Self>, inner: &mut CellInner) {
        let Some(period) = self.shutdown_after else {
            return;
        };
        if let Some(previous) = inner.idle_timer.take() {
            previous.abort();
        }
        let weak = Arc::downgrade(self);
        inner.idle_timer = Some(schedule::after(period, async move {
            if let Some(cell) = weak.upgrade() {
                debug!(path = %cell.path, "idle period elapsed, stopping actor");
                cell.stop();
            }
        }));
    }

    /// Arm the idle timer right after construction, before any dispatch.
    pub(crate) fn arm_initial_idle(self: &Arc<Self>) {
        let mut inner = self.inner.lock();
        if !inner.stopped && !inner.busy {
            self.arm_idle_timer(&mut inner);
        }
    }

    // ------------------------------------------------------------------
    // State initialization
    // ------------------------------------------------------------------

    /// (Re)start state initialization. Messages handled while the new epoch
    /// is pending park on the init gate; a behavior invocation still in
    /// flight from the previous epoch has its result discarded.
    pub(crate) fn start_init(self: &Arc<Self>) {
        let (epoch, ctx) = {
            let mut inner = self.inner.lock();
            if inner.stopped {
                return;
            }
            inner.init_epoch += 1;
            inner.init_status = InitStatus::Pending;
            inner.state = None;
            (inner.init_epoch, self.context_from(&inner))
        };
        let cell = Arc::clone(self);
        schedule::macrotask(async move {
            let invocation = (*cell.init)(ctx);
            let outcome = match AssertUnwindSafe(invocation).catch_unwind().await {
                Ok(Ok(state)) => Ok(state),
                Ok(Err(failure)) => Err(Arc::new(failure)),
                Err(payload) => Err(Arc::new(panic_to_error(payload))),
            };
            let failure = {
                let mut inner = cell.inner.lock();
                if inner.stopped || inner.init_epoch != epoch {
                    return; // superseded by a reset or a stop
                }
                match outcome {
                    Ok(state) => {
                        inner.state = Some(state);
                        inner.init_status = InitStatus::Ready;
                        None
                    }
                    Err(failure) => {
                        inner.init_status = InitStatus::Failed(Arc::clone(&failure));
                        Some(failure)
                    }
                }
            };
            cell.init_notify.notify_waiters();
            if let Some(failure) = failure {
                cell.handle_fault(None, failure, None, FaultOrigin::External)
                    .await;
            }
        });
    }

    /// Wait until initialization is no longer pending.
    async fn wait_init_settled(&self) {
        loop {
            let notified = self.init_notify.notified();
            tokio::pin!(notified);
            // Register with the notifier before checking the status, so a
            // notify_waiters between check and await cannot be missed.
            notified.as_mut().enable();
            if !matches!(self.inner.lock().init_status, InitStatus::Pending) {
                return;
            }
            notified.await;
        }
    }

    // ------------------------------------------------------------------
    // Fault handling
    // ------------------------------------------------------------------

    /// Consult this actor's supervision policy about a fault and apply its
    /// decision. Boxed so escalation can recurse up the tree.
    pub(crate) fn handle_fault(
        self: &Arc<Self>,
        message: Option<AnyMessage>,
        failure: Arc<BehaviorError>,
        child: Option<FaultSource>,
        origin: FaultOrigin,
    ) -> BoxFuture<'static, ()> {
        let cell = Arc::clone(self);
        Box::pin(async move {
            if cell.is_stopped() {
                return;
            }
            let fault = Fault::new(message.clone(), Arc::clone(&failure));
            warn!(path = %cell.path, fault = %fault, "handling behavior fault");
            let supervision_ctx = SupervisionContext::new(
                cell.context_snapshot(),
                child.as_ref().map(|source| source.cell.untyped_ref()),
            );
            let decision = (*cell.on_crash)(fault, supervision_ctx);
            let directive = match AssertUnwindSafe(decision).catch_unwind().await {
                Ok(directive) => directive,
                Err(_) => {
                    error!(path = %cell.path, "supervision policy panicked, escalating");
                    Directive::Escalate
                }
            };
            cell.apply_directive(directive, message, failure, child, origin)
                .await;
        })
    }

    async fn apply_directive(
        self: Arc<Self>,
        directive: Directive,
        message: Option<AnyMessage>,
        failure: Arc<BehaviorError>,
        child: Option<FaultSource>,
        origin: FaultOrigin,
    ) {
        match directive {
            Directive::Stop => self.stop(),
            Directive::StopAll => {
                for peer in self.peers() {
                    peer.stop();
                }
            }
            Directive::StopChild => match child {
                Some(source) => source.cell.stop(),
                None => self.missing_child(message, failure, origin).await,
            },
            Directive::StopAllChildren => {
                for cell in self.child_cells() {
                    cell.stop();
                }
            }
            Directive::Resume => self.resume(origin),
            Directive::Reset => {
                self.reset();
                self.resume(origin);
            }
            Directive::ResetAll => {
                for peer in self.peers() {
                    peer.reset();
                    if Arc::ptr_eq(&peer, &self) {
                        peer.resume(origin);
                    } else {
                        peer.resume(FaultOrigin::External);
                    }
                }
            }
            Directive::ResetChild => match child {
                Some(source) => {
                    source.cell.reset();
                    source.cell.resume(source.origin);
                }
                None => self.missing_child(message, failure, origin).await,
            },
            Directive::Escalate => self.escalate(message, failure, origin).await,
        }
    }

    /// A child-directed directive was returned for a fault with no child
    /// attached. Policy bug; report loudly and fall back to escalation.
    async fn missing_child(
        self: &Arc<Self>,
        message: Option<AnyMessage>,
        failure: Arc<BehaviorError>,
        origin: FaultOrigin,
    ) {
        error!(
            path = %self.path,
            "supervision directive requires a child but the fault has none; escalating"
        );
        self.escalate(message, failure, origin).await;
    }

    /// Delegate the fault, unchanged, to the parent. An escalation that
    /// reaches the root stops the offending top-level actor.
    async fn escalate(
        self: &Arc<Self>,
        message: Option<AnyMessage>,
        failure: Arc<BehaviorError>,
        origin: FaultOrigin,
    ) {
        let link = self.parent.lock().clone();
        match link {
            Some(ParentLink::Cell(weak)) => match weak.upgrade() {
                Some(parent) => {
                    let source = FaultSource {
                        cell: Arc::clone(self),
                        origin,
                    };
                    parent
                        .handle_fault(message, failure, Some(source), FaultOrigin::External)
                        .await;
                }
                None => {
                    error!(
                        path = %self.path,
                        error = %failure,
                        "fault escalated past a vanished parent, stopping actor"
                    );
                    self.stop();
                }
            },
            Some(ParentLink::Root) => {
                error!(
                    path = %self.path,
                    error = %failure,
                    "fault escalated to the system root, stopping top-level actor"
                );
                self.stop();
            }
            None => {
                // Parent already forgotten; the actor is stopping.
            }
        }
    }

    /// Stop all children, rerun state initialization. The mailbox is
    /// preserved; the caller resumes processing.
    pub(crate) fn reset(self: &Arc<Self>) {
        let children: Vec<Arc<ActorCell>> = {
            let mut inner = self.inner.lock();
            if inner.stopped {
                return;
            }
            inner.child_refs.clear();
            inner.children.drain().map(|(_, child)| child).collect()
        };
        for child in children {
            child.stop();
        }
        debug!(path = %self.path, "resetting actor");
        self.start_init();
    }

    // ------------------------------------------------------------------
    // Stop
    // ------------------------------------------------------------------

    /// Stop this actor: cancel scheduled work, deregister from the parent,
    /// recursively stop children, release the mailbox, and schedule the
    /// `after_stop` hook. Idempotent internally; external callers go through
    /// the guard, which rejects a second stop.
    pub(crate) fn stop(self: &Arc<Self>) {
        let (ctx, immediate, idle_timer, state, children) = {
            let mut inner = self.inner.lock();
            if inner.stopped {
                return;
            }
            // Final context snapshot, taken before teardown.
            let ctx = self.context_from(&inner);
            inner.stopped = true;
            let immediate = inner.immediate.take();
            let idle_timer = inner.idle_timer.take();
            let state = inner.state.take();
            inner.child_refs.clear();
            let children: Vec<Arc<ActorCell>> =
                inner.children.drain().map(|(_, child)| child).collect();
            inner.mailbox.clear();
            (ctx, immediate, idle_timer, state, children)
        };

        if let Some(handle) = immediate {
            handle.abort();
        }
        if let Some(handle) = idle_timer {
            handle.abort();
        }

        // Deregister from the parent before stopping our own children, so a
        // live actor appears in its parent's children exactly as long as it
        // is live.
        let link = self.parent.lock().take();
        match link {
            Some(ParentLink::Cell(weak)) => {
                if let Some(parent) = weak.upgrade() {
                    parent.child_stopped(&self.name);
                }
            }
            Some(ParentLink::Root) => {
                self.system.root_child_stopped(&self.name);
            }
            None => {}
        }

        for child in children {
            child.stop();
        }

        self.system.deregister(self.id);
        debug!(path = %self.path, "actor stopped");

        if let Some(hook) = self.after_stop.as_ref().map(Arc::clone) {
            let path = self.path.clone();
            schedule::macrotask(async move {
                let invocation = (*hook)(state, ctx);
                if AssertUnwindSafe(invocation).catch_unwind().await.is_err() {
                    warn!(path = %path, "after_stop hook panicked, ignoring");
                }
            });
        }
    }

    // ------------------------------------------------------------------
    // Child accounting
    // ------------------------------------------------------------------

    /// Register a freshly spawned child. Fails loudly on a name collision.
    pub(crate) fn child_spawned(&self, child: &Arc<ActorCell>) -> Result<(), ActorError> {
        let mut inner = self.inner.lock();
        if inner.stopped {
            return Err(ActorError::Stopped {
                path: self.path.clone(),
            });
        }
        if inner.children.contains_key(child.name()) {
            return Err(ActorError::DuplicateName {
                name: child.name().to_owned(),
                parent: self.path.clone(),
            });
        }
        inner
            .child_refs
            .insert(child.name().to_owned(), child.untyped_ref());
        inner
            .children
            .insert(child.name().to_owned(), Arc::clone(child));
        Ok(())
    }

    /// Remove a stopped child from both mappings.
    pub(crate) fn child_stopped(&self, name: &str) {
        let mut inner = self.inner.lock();
        inner.children.remove(name);
        inner.child_refs.remove(name);
    }

    fn child_cells(&self) -> Vec<Arc<ActorCell>> {
        self.inner
            .lock()
            .children
            .values()
            .map(Arc::clone)
            .collect()
    }

    /// This actor's peers: its parent's children (including itself).
    fn peers(self: &Arc<Self>) -> Vec<Arc<ActorCell>> {
        let link = self.parent.lock().clone();
        match link {
            Some(ParentLink::Cell(weak)) => weak
                .upgrade()
                .map(|parent| parent.child_cells())
                .unwrap_or_default(),
            Some(ParentLink::Root) => self.system.root_child_cells(),
            None => Vec::new(),
        }
    }

    // ------------------------------------------------------------------
    // Context
    // ------------------------------------------------------------------

    fn context_from(&self, inner: &CellInner) -> Context {
        Context::new(
            self.untyped_ref(),
            self.parent_ref.clone(),
            self.path.clone(),
            self.name.clone(),
            inner.child_refs.clone(),
            inner.mailbox.len(),
        )
    }

    pub(crate) fn context_snapshot(&self) -> Context {
        let inner = self.inner.lock();
        self.context_from(&inner)
    }
}
