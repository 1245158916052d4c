// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
// (none for this module)

// Layer 3: Internal module imports
// (none)

/// Recovery decision returned by a supervision policy.
///
/// Every variant names the actor whose policy produced it: `Stop` stops
/// *that* actor, `StopAll` stops it together with its peers (its parent's
/// children), `StopChild` stops the child involved in the fault, and so on.
/// Resetting stops an actor's children, reruns its state initialization, and
/// resumes message processing; the mailbox is preserved.
///
/// # Examples
///
/// ```rust
/// use arbor_rt::supervisor::Directive;
///
/// // The default supervision decision is to escalate to the parent.
/// assert_eq!(Directive::default(), Directive::Escalate);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Directive {
    /// Stop this actor.
    Stop,

    /// Stop this actor and all of its peers (its parent's children).
    StopAll,

    /// Stop the child involved in the fault.
    StopChild,

    /// Stop every child of this actor.
    StopAllChildren,

    /// Continue: drain the next queued message, or go idle.
    Resume,

    /// Stop all children, rerun state initialization, then resume.
    Reset,

    /// Reset this actor and all of its peers.
    ResetAll,

    /// Reset the child involved in the fault.
    ResetChild,

    /// Delegate the same fault to the parent. This is the default.
    #[default]
    Escalate,
}
