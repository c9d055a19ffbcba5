//! Anonymous voter identity.

use satya_common::IdGenerator;

use crate::error::ClientResult;
use crate::store::LocalStore;

/// Store key holding this device's voter id.
pub const VOTER_ID_KEY: &str = "satya_voter_id";

/// Return the device's voter id, generating and persisting one on first use.
pub fn voter_id(store: &dyn LocalStore) -> ClientResult<String> {
    if let Some(id) = store.get(VOTER_ID_KEY)?
        && !id.trim().is_empty()
    {
        return Ok(id);
    }

    let id = IdGenerator::new().generate_voter_id();
    store.set(VOTER_ID_KEY, &id)?;
    tracing::debug!(voter_id = %id, "Generated voter id");
    Ok(id)
}
