//! Domain library for the link card list of the URL Shortener front end.
//!
//! Holds the card types, the ports (traits) a card's swipe-to-delete
//! controller talks to, and error definitions. Rendering, toolkit bindings and
//! IO stay out of this crate; hosts plug them in through the ports.

use std::cell::Cell;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::geometry::CardLayout;
use crate::validate::validate_original_url;

/// Key identifying a short link (and its card) within the list.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LinkKey(String);

impl LinkKey {
    /// Key of the root link of a domain (e.g. `https://dub.sh`).
    pub const ROOT: &'static str = "_root";

    pub fn new<S: Into<String>>(s: S) -> Result<Self, CoreError> {
        let val = s.into();
        if val.is_empty() {
            return Err(CoreError::InvalidKey("empty".into()));
        }
        if !val
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(CoreError::InvalidKey("invalid characters".into()));
        }
        Ok(Self(val))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0 == Self::ROOT
    }
}

impl TryFrom<String> for LinkKey {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        LinkKey::new(value)
    }
}

impl From<LinkKey> for String {
    fn from(key: LinkKey) -> Self {
        key.0
    }
}

impl Display for LinkKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A link shown as a draggable card in the list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkCard {
    pub key: LinkKey,
    pub url: String,
    /// Click count; `None` while it has not been loaded yet.
    #[serde(default)]
    pub clicks: Option<u64>,
}

impl LinkCard {
    pub fn new<S: Into<String>>(key: LinkKey, url: S) -> Result<Self, CoreError> {
        let url = url.into();
        validate_original_url(&url)?;
        Ok(Self {
            key,
            url: url.trim().to_string(),
            clicks: None,
        })
    }
}

/// Owner of the list of cards. The controller only ever asks it to drop one.
pub trait ListDataSource {
    fn remove_item(&self, key: &LinkKey) -> Result<(), CoreError>;
}

/// User-visible confirmation channel (toasts, status line, ...).
pub trait NotificationSink {
    fn notify(&self, message: &str);
}

/// Bounding-box measurement of a card and its container.
///
/// Returns `None` when layout is not available, e.g. the card is no longer
/// attached to a container.
pub trait LayoutProbe {
    fn measure(&self) -> Option<CardLayout>;
}

/// Callback invoked with the new horizontal offset whenever it changes.
pub type PositionListener = Box<dyn FnMut(f64)>;

/// Imperative control over a card's horizontal offset.
pub trait AnimationDriver {
    /// Jump to `offset`, notifying position listeners.
    fn set_position(&self, offset: f64);
    /// Current offset.
    fn position(&self) -> f64;
    /// Current velocity sample, if the driver has one.
    fn velocity(&self) -> Option<f64>;
    /// Start animating towards `offset`. Completion is reported through the
    /// handle and through position notifications.
    fn animate_to(&self, offset: f64) -> AnimationHandle;
    /// Register a position listener. Dropping the returned subscription
    /// unregisters it. Listeners may be unregistered from inside their own
    /// callback.
    fn subscribe(&self, listener: PositionListener) -> Subscription;
}

/// Scoped registration of a position listener.
///
/// Released exactly once: on the first `unsubscribe` call or on drop.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new<F: FnOnce() + 'static>(cancel: F) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    pub fn unsubscribe(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }

    pub fn is_active(&self) -> bool {
        self.cancel.is_some()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}

/// Handle to a running animation. Nothing in the controller waits on it.
#[derive(Clone, Debug)]
pub struct AnimationHandle {
    target: f64,
    finished: Rc<Cell<bool>>,
}

impl AnimationHandle {
    pub fn new(target: f64) -> Self {
        Self {
            target,
            finished: Rc::new(Cell::new(false)),
        }
    }

    /// Handle for an animation that already reached its target.
    pub fn finished(target: f64) -> Self {
        let handle = Self::new(target);
        handle.complete();
        handle
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn is_finished(&self) -> bool {
        self.finished.get()
    }

    /// Mark the animation complete. Called by drivers.
    pub fn complete(&self) {
        self.finished.set(true);
    }
}

impl<T: ListDataSource + ?Sized> ListDataSource for Rc<T> {
    fn remove_item(&self, key: &LinkKey) -> Result<(), CoreError> {
        (**self).remove_item(key)
    }
}

impl<T: NotificationSink + ?Sized> NotificationSink for Rc<T> {
    fn notify(&self, message: &str) {
        (**self).notify(message)
    }
}

impl<T: LayoutProbe + ?Sized> LayoutProbe for Rc<T> {
    fn measure(&self) -> Option<CardLayout> {
        (**self).measure()
    }
}

impl<T: AnimationDriver + ?Sized> AnimationDriver for Rc<T> {
    fn set_position(&self, offset: f64) {
        (**self).set_position(offset)
    }

    fn position(&self) -> f64 {
        (**self).position()
    }

    fn velocity(&self) -> Option<f64> {
        (**self).velocity()
    }

    fn animate_to(&self, offset: f64) -> AnimationHandle {
        (**self).animate_to(offset)
    }

    fn subscribe(&self, listener: PositionListener) -> Subscription {
        (**self).subscribe(listener)
    }
}

/// Core domain errors (no external error crates).
#[derive(Debug)]
pub enum CoreError {
    InvalidUrl(String),
    InvalidKey(String),
    NotFound,
    DataSource(String),
}

impl Display for CoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CoreError::InvalidUrl(msg) => write!(f, "invalid url: {}", msg),
            CoreError::InvalidKey(msg) => write!(f, "invalid key: {}", msg),
            CoreError::NotFound => write!(f, "not found"),
            CoreError::DataSource(msg) => write!(f, "data source error: {}", msg),
        }
    }
}

impl Error for CoreError {}

/// Return a short about/version line for binaries to print.
pub fn about() -> String {
    let pkg = env!("CARGO_PKG_NAME");
    let ver = env!("CARGO_PKG_VERSION");
    format!("{} v{} - link card domain loaded", pkg, ver)
}

pub mod adapters;
pub mod geometry;
pub mod gesture;
pub mod validate;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_new_accepts_simple_values() {
        let k = LinkKey::new("github").expect("valid key");
        assert_eq!(k.as_str(), "github");
        assert!(!k.is_root());
        assert!(LinkKey::new(LinkKey::ROOT).unwrap().is_root());
    }

    #[test]
    fn key_rejects_empty() {
        let err = LinkKey::new("").unwrap_err();
        match err {
            CoreError::InvalidKey(_) => {}
            _ => panic!("expected InvalidKey"),
        }
        assert!(LinkKey::new("bad/key").is_err());
    }

    #[test]
    fn card_validates_url() {
        let key = LinkKey::new("docs").unwrap();
        let card = LinkCard::new(key.clone(), " https://dub.sh/docs ").unwrap();
        assert_eq!(card.url, "https://dub.sh/docs");
        assert_eq!(card.clicks, None);
        assert!(matches!(
            LinkCard::new(key, "ftp://example.com"),
            Err(CoreError::InvalidUrl(_))
        ));
    }

    #[test]
    fn card_deserializes_and_validates_key() {
        let card: LinkCard =
            serde_json::from_str(r#"{"key":"github","url":"https://github.com","clicks":12}"#)
                .unwrap();
        assert_eq!(card.key.as_str(), "github");
        assert_eq!(card.clicks, Some(12));

        let bad = serde_json::from_str::<LinkCard>(r#"{"key":"a b","url":"https://x.io"}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn subscription_releases_once() {
        let count = Rc::new(Cell::new(0));
        let c = Rc::clone(&count);
        let mut sub = Subscription::new(move || c.set(c.get() + 1));
        assert!(sub.is_active());
        sub.unsubscribe();
        sub.unsubscribe();
        assert!(!sub.is_active());
        drop(sub);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn subscription_releases_on_drop() {
        let count = Rc::new(Cell::new(0));
        let c = Rc::clone(&count);
        {
            let _sub = Subscription::new(move || c.set(c.get() + 1));
        }
        assert_eq!(count.get(), 1);
    }
}
