use std::collections::{BTreeMap, HashSet};

use ptc_types::Participant;
use rand::RngCore;

use crate::error::{StoreError, StoreResult};

/// Participant ID to six-digit login code. Entries are never removed, so a
/// participant who is dropped and later re-imported gets their old code.
pub type LoginCodes = BTreeMap<String, String>;

/// Random draws tried per participant before giving up.
pub const MAX_CODE_ATTEMPTS: usize = 10_000;

/// Give every participant a login code.
///
/// Participants already in `codes` keep their code. Others get a random
/// code in `100000..=999998` that is not assigned to anyone else, and the
/// assignment is recorded in `codes`.
pub fn assign_login_codes(
    codes: &mut LoginCodes,
    participants: &mut [Participant],
    rng: &mut impl RngCore,
) -> StoreResult<()> {
    let mut assigned: HashSet<String> = codes.values().cloned().collect();

    for p in participants.iter_mut() {
        if let Some(code) = codes.get(&p.id) {
            p.login_code = code.clone();
            continue;
        }
        let code = (0..MAX_CODE_ATTEMPTS)
            .map(|_| {
                let mut b = [0u8; 4];
                rng.fill_bytes(&mut b);
                (u32::from_le_bytes(b) % 899_999 + 100_000).to_string()
            })
            .find(|code| !assigned.contains(code))
            .ok_or(StoreError::CodeExhausted)?;
        assigned.insert(code.clone());
        codes.insert(p.id.clone(), code.clone());
        p.login_code = code;
    }
    Ok(())
}
