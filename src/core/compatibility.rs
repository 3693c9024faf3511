use crate::models::BloodGroup;
use crate::models::BloodGroup::*;

/// Donor groups that may give to the given recipient group, including itself.
///
/// O- is the universal donor and AB+ the universal recipient.
pub fn compatible_donors(recipient: BloodGroup) -> &'static [BloodGroup] {
    match recipient {
        ONeg => &[ONeg],
        OPos => &[OPos, ONeg],
        ANeg => &[ANeg, ONeg],
        APos => &[APos, ANeg, OPos, ONeg],
        BNeg => &[BNeg, ONeg],
        BPos => &[BPos, BNeg, OPos, ONeg],
        AbNeg => &[AbNeg, ANeg, BNeg, ONeg],
        AbPos => &[AbPos, AbNeg, APos, ANeg, BPos, BNeg, OPos, ONeg],
    }
}

/// Whether a donor of group `donor` may give to a recipient of group `recipient`
#[inline]
pub fn can_donate(donor: BloodGroup, recipient: BloodGroup) -> bool {
    compatible_donors(recipient).contains(&donor)
}
