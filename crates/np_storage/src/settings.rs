//! Persisted dashboard settings: the payout rate set and the logged-in user.
//!
//! Loads never fail. A missing or unreadable entry falls back to the
//! default rate set or a logged-out session, with a warning in the log.

use np_core::{KeyValueStore, PayoutRate, RateSet, Result, Session, UserRecord};
use tracing::{info, warn};

pub const RATES_KEY: &str = "payout_rates";
pub const USER_KEY: &str = "user";

pub async fn load_rates(store: &dyn KeyValueStore) -> RateSet {
    let raw = match store.get(RATES_KEY).await {
        Ok(Some(raw)) => raw,
        Ok(None) => return RateSet::default(),
        Err(e) => {
            warn!("⚠️ Could not read stored rates, using defaults: {}", e);
            return RateSet::default();
        }
    };

    let parsed = serde_json::from_str::<Vec<PayoutRate>>(&raw)
        .map_err(np_core::Error::from)
        .and_then(RateSet::validated);
    match parsed {
        Ok(rates) => rates,
        Err(e) => {
            warn!("⚠️ Stored rates are corrupt, using defaults: {}", e);
            RateSet::default()
        }
    }
}

pub async fn save_rates(store: &dyn KeyValueStore, rates: &RateSet) -> Result<()> {
    let raw = serde_json::to_string(rates)?;
    store.set(RATES_KEY, &raw).await?;
    info!("💾 Saved payout rates");
    Ok(())
}

pub async fn load_session(store: &dyn KeyValueStore) -> Session {
    let user = match store.get(USER_KEY).await {
        Ok(Some(raw)) => match serde_json::from_str::<UserRecord>(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                warn!("⚠️ Stored user record is corrupt, starting logged out: {}", e);
                None
            }
        },
        Ok(None) => None,
        Err(e) => {
            warn!("⚠️ Could not read stored user record, starting logged out: {}", e);
            None
        }
    };
    Session { user }
}

pub async fn save_user(store: &dyn KeyValueStore, user: &UserRecord) -> Result<()> {
    let raw = serde_json::to_string(user)?;
    store.set(USER_KEY, &raw).await
}

pub async fn clear_user(store: &dyn KeyValueStore) -> Result<()> {
    store.remove(USER_KEY).await
}
