use std::cell::Cell;
use std::sync::Mutex;

use crate::geometry::CardLayout;
use crate::{CoreError, LayoutProbe, LinkCard, LinkKey, ListDataSource, NotificationSink};

/// Ordered in-memory list of cards. Remembers which keys were removed.
pub struct InMemoryList {
    cards: Mutex<Vec<LinkCard>>,
    removed: Mutex<Vec<LinkKey>>,
}

/// Notification sink that keeps every message it receives.
pub struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

/// Layout probe returning a fixed measurement, or nothing once detached.
pub struct FixedLayout {
    layout: Cell<Option<CardLayout>>,
}

impl InMemoryList {
    pub fn new() -> Self {
        Self {
            cards: Mutex::new(Vec::new()),
            removed: Mutex::new(Vec::new()),
        }
    }

    pub fn from_cards<I: IntoIterator<Item = LinkCard>>(cards: I) -> Result<Self, CoreError> {
        let list = Self::new();
        for card in cards {
            list.push(card)?;
        }
        Ok(list)
    }

    /// Append a card. Keys are unique within the list.
    pub fn push(&self, card: LinkCard) -> Result<(), CoreError> {
        let mut cards = self
            .cards
            .lock()
            .map_err(|_| CoreError::DataSource("mutex poisoned".into()))?;
        if cards.iter().any(|c| c.key == card.key) {
            return Err(CoreError::DataSource(format!(
                "duplicate key: {}",
                card.key
            )));
        }
        cards.push(card);
        Ok(())
    }

    pub fn cards(&self) -> Result<Vec<LinkCard>, CoreError> {
        let cards = self
            .cards
            .lock()
            .map_err(|_| CoreError::DataSource("mutex poisoned".into()))?;
        Ok(cards.clone())
    }

    pub fn keys(&self) -> Result<Vec<LinkKey>, CoreError> {
        Ok(self.cards()?.into_iter().map(|c| c.key).collect())
    }

    /// Keys removed so far, in removal order.
    pub fn removed(&self) -> Result<Vec<LinkKey>, CoreError> {
        let removed = self
            .removed
            .lock()
            .map_err(|_| CoreError::DataSource("mutex poisoned".into()))?;
        Ok(removed.clone())
    }
}

impl Default for InMemoryList {
    fn default() -> Self {
        Self::new()
    }
}

impl ListDataSource for InMemoryList {
    fn remove_item(&self, key: &LinkKey) -> Result<(), CoreError> {
        let mut cards = self
            .cards
            .lock()
            .map_err(|_| CoreError::DataSource("mutex poisoned".into()))?;
        let before = cards.len();
        cards.retain(|c| &c.key != key);
        if cards.len() == before {
            return Err(CoreError::NotFound);
        }
        self.removed
            .lock()
            .map_err(|_| CoreError::DataSource("mutex poisoned".into()))?
            .push(key.clone());
        Ok(())
    }
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self {
            messages: Mutex::new(Vec::new()),
        }
    }

    pub fn messages(&self) -> Vec<String> {
        match self.messages.lock() {
            Ok(m) => m.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl Default for RecordingNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationSink for RecordingNotifier {
    fn notify(&self, message: &str) {
        match self.messages.lock() {
            Ok(mut m) => m.push(message.to_string()),
            Err(poisoned) => poisoned.into_inner().push(message.to_string()),
        }
    }
}

impl FixedLayout {
    pub fn new(layout: CardLayout) -> Self {
        Self {
            layout: Cell::new(Some(layout)),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            layout: Cell::new(None),
        }
    }

    /// Replace the measurement; `None` simulates a detached card.
    pub fn set(&self, layout: Option<CardLayout>) {
        self.layout.set(layout);
    }
}

impl LayoutProbe for FixedLayout {
    fn measure(&self) -> Option<CardLayout> {
        self.layout.get()
    }
}
