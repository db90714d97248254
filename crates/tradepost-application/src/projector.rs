//! Change feed projection.
//!
//! Keeps a shared [`MarketState`] current by folding store notifications
//! into it on a background task. Reads go straight to the state container;
//! the store is only touched again to rebuild after a lost subscription.

use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use tradepost_core::ad::AdRepository;
use tradepost_core::error::Result;
use tradepost_core::event::ChangeFeed;
use tradepost_core::message::MessageRepository;
use tradepost_core::offer::OfferRepository;
use tradepost_core::state::MarketState;
use tradepost_core::taxonomy::{TaxonomyRepository, TaxonomySeed};
use tradepost_core::user::UserRepository;

/// Builds a full state snapshot straight from storage.
///
/// Used at startup and to resynchronize after the projector reports a
/// lagged subscription.
pub async fn load_market_state<S>(store: &S, seed: &TaxonomySeed) -> Result<MarketState>
where
    S: UserRepository
        + OfferRepository
        + MessageRepository
        + AdRepository
        + TaxonomyRepository,
{
    let mut state = MarketState::default();

    for user in UserRepository::list_all(store).await? {
        state.users.insert(user.id.clone(), user);
    }
    for offer in OfferRepository::list_all(store).await? {
        state.offers.insert(offer.id.clone(), offer);
    }
    for message in MessageRepository::list_all(store).await? {
        state.messages.insert(message.id.clone(), message);
    }
    for ad in AdRepository::list_all(store).await? {
        state.ads.insert(ad.id.clone(), ad);
    }
    state.taxonomy = TaxonomyRepository::load_or_seed(store, seed).await?;

    Ok(state)
}

/// Background task folding change notifications into a shared state.
///
/// The task exits when the feed closes or [`StateProjector::shutdown`] is
/// called. A lagged subscription is logged and skipped over; callers who
/// need exact state after a lag rebuild it with [`load_market_state`].
pub struct StateProjector {
    state: Arc<RwLock<MarketState>>,
    shutdown: CancellationToken,
    task: JoinHandle<()>,
}

impl StateProjector {
    /// Starts projecting `feed` onto `initial`.
    pub fn spawn(initial: MarketState, feed: &dyn ChangeFeed) -> Self {
        let state = Arc::new(RwLock::new(initial));
        let shutdown = CancellationToken::new();

        let mut events = feed.subscribe();
        let task_state = Arc::clone(&state);
        let task_shutdown = shutdown.clone();

        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = task_shutdown.cancelled() => break,
                    received = events.recv() => match received {
                        Ok(event) => {
                            task_state.write().await.apply(event);
                        }
                        Err(RecvError::Lagged(skipped)) => {
                            tracing::warn!(
                                "[StateProjector] feed lagged, {} event(s) skipped; state is stale until rebuilt",
                                skipped
                            );
                        }
                        Err(RecvError::Closed) => break,
                    },
                }
            }
            tracing::debug!("[StateProjector] projection task stopped");
        });

        Self {
            state,
            shutdown,
            task,
        }
    }

    /// Handle to the continuously updated state.
    pub fn state(&self) -> Arc<RwLock<MarketState>> {
        Arc::clone(&self.state)
    }

    /// Stops the projection task and waits for it to finish.
    pub async fn shutdown(self) {
        self.shutdown.cancel();
        let _ = self.task.await;
    }
}
