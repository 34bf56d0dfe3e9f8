//! Who may change what. Every mutation of an ad or a proposal is gated
//! on one of these checks before anything touches storage.

use crate::models::{Ad, ExchangeProposal, UserRef};

/// Only the owner may edit or delete an ad.
pub fn can_mutate_ad(user: &UserRef, ad: &Ad) -> bool {
    user.id == ad.owner.id
}

/// Only the owner of the receiving ad decides on a proposal.
pub fn can_decide_proposal(user: &UserRef, proposal: &ExchangeProposal) -> bool {
    user.id == proposal.ad_receiver.owner.id
}
