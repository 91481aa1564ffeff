//! Progress notification for crawl lifecycle events
//!
//! The crawler never logs lifecycle events directly. It broadcasts a
//! [`CrawlEvent`] to every registered [`Observer`]. The default observer writes
//! to `tracing`. A [`ChannelObserver`] forwards events to an async consumer.
//!
//! Events are delivered synchronously, in the order the traversal produces
//! them.

use crate::crawler::FetcherKind;
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc;

/// A lifecycle event emitted by the crawler
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlEvent {
    CrawlStarted { domains: usize },
    DomainStarted { domain: String, fetcher: FetcherKind },
    NoContent { domain: String, url: String },
    ProductFound { domain: String, url: String },
    NextPage { domain: String, url: String },
    /// Fallback discovery confirmed URLs that match no known product shape
    NewUrlPattern { domain: String, urls: usize },
    DomainFinished { domain: String, products: usize, pages: usize },
    DomainFailed { domain: String, error: String },
    CrawlFinished { succeeded: usize, total: usize },
}

impl fmt::Display for CrawlEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CrawlStarted { domains } => {
                write!(f, "Starting crawl of {} domains", domains)
            }
            Self::DomainStarted { domain, fetcher } => {
                write!(f, "Crawling {} with {} fetcher", domain, fetcher)
            }
            Self::NoContent { url, .. } => write!(f, "No content found for URL: {}", url),
            Self::ProductFound { url, .. } => write!(f, "Found product URL: {}", url),
            Self::NextPage { url, .. } => write!(f, "Found next page: {}", url),
            Self::NewUrlPattern { domain, urls } => write!(
                f,
                "Detected new URL patterns for domain {} ({} URLs)",
                domain, urls
            ),
            Self::DomainFinished {
                domain,
                products,
                pages,
            } => write!(
                f,
                "Finished crawling {}. Found {} product URLs across {} pages",
                domain, products, pages
            ),
            Self::DomainFailed { domain, error } => {
                write!(f, "Error crawling {}: {}", domain, error)
            }
            Self::CrawlFinished { succeeded, total } => write!(
                f,
                "Crawl completed. Successfully crawled {} of {} domains",
                succeeded, total
            ),
        }
    }
}

/// Receives crawl lifecycle events
pub trait Observer: Send + Sync {
    fn update(&self, event: &CrawlEvent);
}

/// Writes every event to the `tracing` log sink
#[derive(Debug, Default)]
pub struct TracingObserver;

impl Observer for TracingObserver {
    fn update(&self, event: &CrawlEvent) {
        match event {
            CrawlEvent::DomainFailed { .. } => tracing::error!("{}", event),
            CrawlEvent::NoContent { .. } => tracing::warn!("{}", event),
            CrawlEvent::ProductFound { .. } => tracing::debug!("{}", event),
            _ => tracing::info!("{}", event),
        }
    }
}

/// Forwards events over an unbounded channel
///
/// Events sent after the receiver is dropped are discarded.
#[derive(Debug, Clone)]
pub struct ChannelObserver {
    sender: mpsc::UnboundedSender<CrawlEvent>,
}

impl ChannelObserver {
    /// Creates an observer together with the receiving end of its channel
    pub fn new() -> (Self, mpsc::UnboundedReceiver<CrawlEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl Observer for ChannelObserver {
    fn update(&self, event: &CrawlEvent) {
        let _ = self.sender.send(event.clone());
    }
}

/// Broadcasts events to a registration list of observers
#[derive(Clone, Default)]
pub struct Notifier {
    observers: Vec<Arc<dyn Observer>>,
}

impl Notifier {
    /// Creates a notifier with no observers
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a notifier with the tracing log sink attached
    pub fn with_default_observer() -> Self {
        let mut notifier = Self::new();
        notifier.attach(Arc::new(TracingObserver));
        notifier
    }

    pub fn attach(&mut self, observer: Arc<dyn Observer>) {
        self.observers.push(observer);
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    pub fn notify(&self, event: CrawlEvent) {
        for observer in &self.observers {
            observer.update(&event);
        }
    }
}

impl fmt::Debug for Notifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notifier")
            .field("observers", &self.observers.len())
            .finish()
    }
}
