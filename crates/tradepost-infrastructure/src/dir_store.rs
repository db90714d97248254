//! Directory-backed document store.
//!
//! Persists every collection as a directory of JSON documents under one
//! root, with the shared taxonomy as a single file:
//!
//! ```text
//! <root>/
//! ├── users/<id>.json
//! ├── offers/<id>.json
//! ├── messages/<id>.json
//! ├── system_ads/<id>.json
//! ├── taxonomy.json
//! └── .store.lock
//! ```
//!
//! Every write is atomic at the file level (tmp + fsync + rename), and all
//! read-modify-write sequences run under the store's advisory lock, so two
//! processes sharing the root never interleave a batch. File I/O runs on
//! the blocking pool.

use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::broadcast;
use tokio::task;

use tradepost_core::ad::{AdRepository, SystemAd};
use tradepost_core::error::{MarketError, Result};
use tradepost_core::event::{ChangeEvent, ChangeFeed};
use tradepost_core::message::{Message, MessageRepository};
use tradepost_core::offer::{BarterOffer, OfferRepository, OfferStatus, Rating};
use tradepost_core::taxonomy::{Taxonomy, TaxonomyChange, TaxonomyRepository, TaxonomySeed};
use tradepost_core::user::{ProfilePatch, UserProfile, UserRepository};

use crate::storage::{AtomicJsonFile, DirLock};

const USERS_DIR: &str = "users";
const OFFERS_DIR: &str = "offers";
const MESSAGES_DIR: &str = "messages";
const ADS_DIR: &str = "system_ads";
const TAXONOMY_FILE: &str = "taxonomy.json";

/// A document store rooted at a local directory.
pub struct DirStore {
    root: PathBuf,
    events: broadcast::Sender<ChangeEvent>,
}

impl DirStore {
    /// Opens (or initializes) a store under `root`.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        let (events, _) = broadcast::channel(256);
        Ok(Self { root, events })
    }

    fn publish(&self, event: ChangeEvent) {
        let _ = self.events.send(event);
    }

    /// Runs blocking file work on the blocking pool.
    async fn run<T, F>(&self, operation: &'static str, work: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(PathBuf) -> Result<T> + Send + 'static,
    {
        let root = self.root.clone();
        task::spawn_blocking(move || work(root))
            .await
            .map_err(|error| MarketError::storage(operation, format!("task join: {error}")))?
    }
}

/// Document ids become file names; keep them on one path level.
fn checked_id(id: &str) -> Result<&str> {
    if id.is_empty() || id.contains(['/', '\\', '\0']) || id.starts_with('.') {
        return Err(MarketError::validation(format!(
            "'{id}' is not a valid document id"
        )));
    }
    Ok(id)
}

fn doc_file<T>(root: &Path, collection: &str, id: &str) -> Result<AtomicJsonFile<T>>
where
    T: Serialize + DeserializeOwned,
{
    let id = checked_id(id)?;
    Ok(AtomicJsonFile::new(
        root.join(collection).join(format!("{id}.json")),
    ))
}

fn load_collection<T>(root: &Path, collection: &str) -> Result<Vec<T>>
where
    T: Serialize + DeserializeOwned,
{
    let dir = root.join(collection);
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut documents = Vec::new();
    let mut entries: Vec<PathBuf> = fs::read_dir(&dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .filter(|path| {
            !path
                .file_name()
                .is_some_and(|name| name.to_string_lossy().starts_with('.'))
        })
        .collect();
    entries.sort();

    for path in entries {
        match AtomicJsonFile::<T>::new(path.clone()).load() {
            Ok(Some(document)) => documents.push(document),
            Ok(None) => {}
            Err(error) => {
                // one corrupt document must not hide the whole collection
                tracing::warn!(
                    "[DirStore] skipping unreadable document {}: {}",
                    path.display(),
                    error
                );
            }
        }
    }
    Ok(documents)
}

impl ChangeFeed for DirStore {
    fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.events.subscribe()
    }
}

#[async_trait]
impl UserRepository for DirStore {
    async fn find_by_id(&self, id: &str) -> Result<Option<UserProfile>> {
        let id = checked_id(id)?.to_string();
        self.run("find user", move |root| {
            doc_file::<UserProfile>(&root, USERS_DIR, &id)?.load()
        })
        .await
    }

    async fn list_all(&self) -> Result<Vec<UserProfile>> {
        self.run("list users", |root| load_collection(&root, USERS_DIR))
            .await
    }

    async fn save(&self, user: &UserProfile) -> Result<()> {
        let user = user.clone();
        let stored = self
            .run("save user", move |root| {
                let _lock = DirLock::acquire(&root)?;
                doc_file(&root, USERS_DIR, &user.id)?.save(&user)?;
                Ok(user)
            })
            .await?;
        self.publish(ChangeEvent::UserPut { user: stored });
        Ok(())
    }

    async fn apply_patch(&self, user_id: &str, patch: &ProfilePatch) -> Result<UserProfile> {
        let user_id = checked_id(user_id)?.to_string();
        let patch = patch.clone();
        let merged = self
            .run("apply profile patch", move |root| {
                let _lock = DirLock::acquire(&root)?;
                let file = doc_file::<UserProfile>(&root, USERS_DIR, &user_id)?;
                let user = file
                    .load()?
                    .ok_or_else(|| MarketError::not_found("User", user_id.clone()))?;
                let merged = user.with_patch_applied(&patch);
                file.save(&merged)?;
                Ok(merged)
            })
            .await?;
        self.publish(ChangeEvent::UserPut {
            user: merged.clone(),
        });
        Ok(merged)
    }

    async fn stage_pending_update(&self, user_id: &str, patch: &ProfilePatch) -> Result<()> {
        let user_id = checked_id(user_id)?.to_string();
        let patch = patch.clone();
        let staged = self
            .run("stage profile patch", move |root| {
                let _lock = DirLock::acquire(&root)?;
                let file = doc_file::<UserProfile>(&root, USERS_DIR, &user_id)?;
                let mut user = file
                    .load()?
                    .ok_or_else(|| MarketError::not_found("User", user_id.clone()))?;
                user.pending_update = Some(patch);
                file.save(&user)?;
                Ok(user)
            })
            .await?;
        self.publish(ChangeEvent::UserPut { user: staged });
        Ok(())
    }

    async fn clear_pending_update(&self, user_id: &str) -> Result<()> {
        let user_id = checked_id(user_id)?.to_string();
        let cleared = self
            .run("clear profile patch", move |root| {
                let _lock = DirLock::acquire(&root)?;
                let file = doc_file::<UserProfile>(&root, USERS_DIR, &user_id)?;
                let mut user = file
                    .load()?
                    .ok_or_else(|| MarketError::not_found("User", user_id.clone()))?;
                user.pending_update = None;
                file.save(&user)?;
                Ok(user)
            })
            .await?;
        self.publish(ChangeEvent::UserPut { user: cleared });
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let id = checked_id(id)?.to_string();
        let existed = {
            let id = id.clone();
            self.run("delete user", move |root| {
                let _lock = DirLock::acquire(&root)?;
                let file = doc_file::<UserProfile>(&root, USERS_DIR, &id)?;
                let existed = file.path().exists();
                file.delete()?;
                Ok(existed)
            })
            .await?
        };
        if existed {
            self.publish(ChangeEvent::UserRemoved { id });
        }
        Ok(())
    }

    async fn find_by_main_field(&self, main_field: &str) -> Result<Vec<UserProfile>> {
        let main_field = main_field.to_string();
        self.run("query users by field", move |root| {
            let users: Vec<UserProfile> = load_collection(&root, USERS_DIR)?;
            Ok(users
                .into_iter()
                .filter(|u| u.main_field == main_field)
                .collect())
        })
        .await
    }

    async fn set_main_field(&self, user_ids: &[String], new_field: &str) -> Result<()> {
        let user_ids = user_ids.to_vec();
        let new_field = new_field.to_string();
        let updated = self
            .run("batch update main field", move |root| {
                let _lock = DirLock::acquire(&root)?;

                // phase 1: load and rewrite everything in memory; a missing
                // document aborts before any file changes
                let mut rewritten = Vec::with_capacity(user_ids.len());
                for id in &user_ids {
                    let file = doc_file::<UserProfile>(&root, USERS_DIR, id)?;
                    let mut user = file
                        .load()?
                        .ok_or_else(|| MarketError::not_found("User", id.clone()))?;
                    user.main_field = new_field.clone();
                    rewritten.push((file, user));
                }

                // phase 2: commit; each write is individually atomic and
                // the held lock keeps the batch invisible until done
                for (file, user) in &rewritten {
                    file.save(user)?;
                }

                Ok(rewritten.into_iter().map(|(_, user)| user).collect::<Vec<_>>())
            })
            .await?;

        for user in updated {
            self.publish(ChangeEvent::UserPut { user });
        }
        Ok(())
    }
}

#[async_trait]
impl OfferRepository for DirStore {
    async fn find_by_id(&self, id: &str) -> Result<Option<BarterOffer>> {
        let id = checked_id(id)?.to_string();
        self.run("find offer", move |root| {
            doc_file::<BarterOffer>(&root, OFFERS_DIR, &id)?.load()
        })
        .await
    }

    async fn list_all(&self) -> Result<Vec<BarterOffer>> {
        self.run("list offers", |root| load_collection(&root, OFFERS_DIR))
            .await
    }

    async fn save(&self, offer: &BarterOffer) -> Result<()> {
        let offer = offer.clone();
        let stored = self
            .run("save offer", move |root| {
                let _lock = DirLock::acquire(&root)?;
                doc_file(&root, OFFERS_DIR, &offer.id)?.save(&offer)?;
                Ok(offer)
            })
            .await?;
        self.publish(ChangeEvent::OfferPut { offer: stored });
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let id = checked_id(id)?.to_string();
        let existed = {
            let id = id.clone();
            self.run("delete offer", move |root| {
                let _lock = DirLock::acquire(&root)?;
                let file = doc_file::<BarterOffer>(&root, OFFERS_DIR, &id)?;
                let existed = file.path().exists();
                file.delete()?;
                Ok(existed)
            })
            .await?
        };
        if existed {
            self.publish(ChangeEvent::OfferRemoved { id });
        }
        Ok(())
    }

    async fn set_status(&self, id: &str, status: OfferStatus) -> Result<()> {
        let id = checked_id(id)?.to_string();
        let updated = self
            .run("set offer status", move |root| {
                let _lock = DirLock::acquire(&root)?;
                let file = doc_file::<BarterOffer>(&root, OFFERS_DIR, &id)?;
                let mut offer = file
                    .load()?
                    .ok_or_else(|| MarketError::not_found("Offer", id.clone()))?;
                offer.status = status;
                file.save(&offer)?;
                Ok(offer)
            })
            .await?;
        self.publish(ChangeEvent::OfferPut { offer: updated });
        Ok(())
    }

    async fn set_ratings(&self, id: &str, ratings: &[Rating], average: f64) -> Result<()> {
        let id = checked_id(id)?.to_string();
        let ratings = ratings.to_vec();
        let updated = self
            .run("set offer ratings", move |root| {
                let _lock = DirLock::acquire(&root)?;
                let file = doc_file::<BarterOffer>(&root, OFFERS_DIR, &id)?;
                let mut offer = file
                    .load()?
                    .ok_or_else(|| MarketError::not_found("Offer", id.clone()))?;
                offer.ratings = ratings;
                offer.average_rating = average;
                file.save(&offer)?;
                Ok(offer)
            })
            .await?;
        self.publish(ChangeEvent::OfferPut { offer: updated });
        Ok(())
    }

    async fn find_created_before(&self, threshold: DateTime<Utc>) -> Result<Vec<BarterOffer>> {
        self.run("query stale offers", move |root| {
            let mut stale: Vec<BarterOffer> = load_collection(&root, OFFERS_DIR)?
                .into_iter()
                .filter(|o: &BarterOffer| o.created_at < threshold)
                .collect();
            stale.sort_by_key(|o| o.created_at);
            Ok(stale)
        })
        .await
    }
}

#[async_trait]
impl MessageRepository for DirStore {
    async fn find_by_id(&self, id: &str) -> Result<Option<Message>> {
        let id = checked_id(id)?.to_string();
        self.run("find message", move |root| {
            doc_file::<Message>(&root, MESSAGES_DIR, &id)?.load()
        })
        .await
    }

    async fn list_all(&self) -> Result<Vec<Message>> {
        self.run("list messages", |root| load_collection(&root, MESSAGES_DIR))
            .await
    }

    async fn save(&self, message: &Message) -> Result<()> {
        let message = message.clone();
        let stored = self
            .run("save message", move |root| {
                let _lock = DirLock::acquire(&root)?;
                doc_file(&root, MESSAGES_DIR, &message.id)?.save(&message)?;
                Ok(message)
            })
            .await?;
        self.publish(ChangeEvent::MessagePut { message: stored });
        Ok(())
    }

    async fn mark_read(&self, id: &str) -> Result<()> {
        let id = checked_id(id)?.to_string();
        let updated = self
            .run("mark message read", move |root| {
                let _lock = DirLock::acquire(&root)?;
                let file = doc_file::<Message>(&root, MESSAGES_DIR, &id)?;
                let mut message = file
                    .load()?
                    .ok_or_else(|| MarketError::not_found("Message", id.clone()))?;
                message.is_read = true;
                file.save(&message)?;
                Ok(message)
            })
            .await?;
        self.publish(ChangeEvent::MessagePut { message: updated });
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let id = checked_id(id)?.to_string();
        let existed = {
            let id = id.clone();
            self.run("delete message", move |root| {
                let _lock = DirLock::acquire(&root)?;
                let file = doc_file::<Message>(&root, MESSAGES_DIR, &id)?;
                let existed = file.path().exists();
                file.delete()?;
                Ok(existed)
            })
            .await?
        };
        if existed {
            self.publish(ChangeEvent::MessageRemoved { id });
        }
        Ok(())
    }
}

#[async_trait]
impl AdRepository for DirStore {
    async fn find_by_id(&self, id: &str) -> Result<Option<SystemAd>> {
        let id = checked_id(id)?.to_string();
        self.run("find ad", move |root| {
            doc_file::<SystemAd>(&root, ADS_DIR, &id)?.load()
        })
        .await
    }

    async fn list_all(&self) -> Result<Vec<SystemAd>> {
        self.run("list ads", |root| load_collection(&root, ADS_DIR))
            .await
    }

    async fn save(&self, ad: &SystemAd) -> Result<()> {
        let ad = ad.clone();
        let stored = self
            .run("save ad", move |root| {
                let _lock = DirLock::acquire(&root)?;
                doc_file(&root, ADS_DIR, &ad.id)?.save(&ad)?;
                Ok(ad)
            })
            .await?;
        self.publish(ChangeEvent::AdPut { ad: stored });
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let id = checked_id(id)?.to_string();
        let existed = {
            let id = id.clone();
            self.run("delete ad", move |root| {
                let _lock = DirLock::acquire(&root)?;
                let file = doc_file::<SystemAd>(&root, ADS_DIR, &id)?;
                let existed = file.path().exists();
                file.delete()?;
                Ok(existed)
            })
            .await?
        };
        if existed {
            self.publish(ChangeEvent::AdRemoved { id });
        }
        Ok(())
    }
}

#[async_trait]
impl TaxonomyRepository for DirStore {
    async fn load_or_seed(&self, seed: &TaxonomySeed) -> Result<Taxonomy> {
        let seed = seed.clone();
        let (taxonomy, seeded) = self
            .run("load taxonomy", move |root| {
                let _lock = DirLock::acquire(&root)?;
                let file = AtomicJsonFile::<Taxonomy>::new(root.join(TAXONOMY_FILE));
                if let Some(existing) = file.load()? {
                    return Ok((existing, false));
                }
                let fresh = seed.into_taxonomy();
                file.save(&fresh)?;
                Ok((fresh, true))
            })
            .await?;

        if seeded {
            tracing::info!("[DirStore] taxonomy document seeded");
            self.publish(ChangeEvent::TaxonomySet {
                taxonomy: taxonomy.clone(),
            });
        }
        Ok(taxonomy)
    }

    async fn apply(&self, changes: &[TaxonomyChange]) -> Result<Taxonomy> {
        let changes = changes.to_vec();
        let taxonomy = self
            .run("apply taxonomy changes", move |root| {
                let _lock = DirLock::acquire(&root)?;
                let file = AtomicJsonFile::<Taxonomy>::new(root.join(TAXONOMY_FILE));
                let mut taxonomy = file.load()?.unwrap_or_default();
                taxonomy.apply(&changes);
                file.save(&taxonomy)?;
                Ok(taxonomy)
            })
            .await?;

        self.publish(ChangeEvent::TaxonomySet {
            taxonomy: taxonomy.clone(),
        });
        Ok(taxonomy)
    }
}
