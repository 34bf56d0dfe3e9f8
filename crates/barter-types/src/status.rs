use crate::models::ProposalStatus;

/// Why a requested status change left the proposal untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    NotDecider,
    /// Only `Accepted` and `Rejected` can be requested.
    NotADecision,
    AlreadyDecided,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Applied(ProposalStatus),
    Ignored(IgnoreReason),
}

/// Proposal lifecycle: `Pending -> Accepted | Rejected`, both terminal.
///
/// Anything other than those two edges, taken by the decider, is absorbed.
/// Callers never see an error from here; they get the outcome and move on.
pub fn transition(
    current: ProposalStatus,
    requested: Option<ProposalStatus>,
    is_authorized_decider: bool,
) -> Transition {
    if !is_authorized_decider {
        return Transition::Ignored(IgnoreReason::NotDecider);
    }

    let requested = match requested {
        Some(status @ (ProposalStatus::Accepted | ProposalStatus::Rejected)) => status,
        _ => return Transition::Ignored(IgnoreReason::NotADecision),
    };

    if current.is_terminal() {
        return Transition::Ignored(IgnoreReason::AlreadyDecided);
    }

    Transition::Applied(requested)
}
