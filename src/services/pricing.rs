use chrono::Utc;
use mongodb::bson::doc;
use mongodb::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

use crate::models::booking::PricingSettings;

pub const DEFAULT_MARKUP: f64 = 130.0;
const POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Process-wide markup percentage. One writer path publishes into a
/// watch channel (admin updates push immediately, a 10s poll covers a
/// write that bypassed this process); every reader sees the latest
/// value without its own polling. Last write observed wins.
#[derive(Clone)]
pub struct MarkupStore {
    tx: watch::Sender<f64>,
    rx: watch::Receiver<f64>,
}

impl MarkupStore {
    pub fn new(initial: f64) -> Self {
        let (tx, rx) = watch::channel(initial);
        MarkupStore { tx, rx }
    }

    pub fn current(&self) -> f64 {
        *self.rx.borrow()
    }

    pub fn publish(&self, markup: f64) {
        // send only fails when all receivers are gone; we hold one.
        let _ = self.tx.send(markup);
    }
}

fn settings_collection(client: &Client) -> mongodb::Collection<PricingSettings> {
    client.database("Travel").collection("PricingSettings")
}

/// One-time fetch used at startup and by the poll loop.
pub async fn fetch_markup(client: &Client) -> Option<f64> {
    match settings_collection(client).find_one(doc! {}).await {
        Ok(Some(settings)) => Some(settings.markup_value),
        Ok(None) => None,
        Err(err) => {
            eprintln!("Failed to fetch pricing settings: {:?}", err);
            None
        }
    }
}

/// Build the store from the database, falling back to the default when
/// no settings row exists yet.
pub async fn init_markup_store(client: &Client) -> MarkupStore {
    let markup = fetch_markup(client).await.unwrap_or(DEFAULT_MARKUP);
    println!("Pricing markup initialized at {}%", markup);
    MarkupStore::new(markup)
}

/// Fallback poll: re-read the settings row every 10 seconds in case a
/// write happened outside this process. Push updates through
/// `update_markup` land faster; whichever arrives first wins.
pub fn spawn_markup_poller(client: Arc<Client>, store: MarkupStore) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(POLL_INTERVAL);
        loop {
            interval.tick().await;
            if let Some(markup) = fetch_markup(&client).await {
                if markup != store.current() {
                    println!("Pricing markup poll picked up {}%", markup);
                    store.publish(markup);
                }
            }
        }
    });
}

/// Admin write path: persist the new markup and publish it to every
/// live reader in the same process.
pub async fn update_markup(
    client: &Client,
    store: &MarkupStore,
    markup: f64,
) -> Result<(), mongodb::error::Error> {
    let update = doc! {
        "$set": {
            "markup_value": markup,
            "updated_at": Utc::now().to_rfc3339(),
        }
    };
    settings_collection(client)
        .update_one(doc! {}, update)
        .upsert(true)
        .await?;
    store.publish(markup);
    Ok(())
}
