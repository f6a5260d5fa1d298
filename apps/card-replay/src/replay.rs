//! Script-driven replay of swipe gestures against a list of link cards.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;
use std::time::SystemTime;

use card_common::{
    apex_domain, build_short_url, clicks_label, favicon_url, system_time_to_rfc3339,
};
use card_domain::adapters::memory::{FixedLayout, InMemoryList, RecordingNotifier};
use card_domain::adapters::scripted_driver::ScriptedDriver;
use card_domain::geometry::CardLayout;
use card_domain::gesture::SwipeToDelete;
use card_domain::validate::validate_original_url;
use card_domain::{AnimationDriver, CoreError, LinkCard, LinkKey, NotificationSink};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::Config;

/// A list of cards and the gestures to play against them.
#[derive(Debug, Deserialize)]
pub struct Script {
    pub cards: Vec<LinkCard>,
    #[serde(default)]
    pub steps: Vec<ScriptStep>,
}

impl Script {
    pub fn from_json(raw: &str) -> Result<Self, ReplayError> {
        serde_json::from_str(raw).map_err(ReplayError::Parse)
    }
}

#[derive(Debug, Deserialize)]
pub struct ScriptStep {
    pub key: LinkKey,
    pub action: Action,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    /// Pointer moved the card to `offset` with the given velocity sample.
    Drag {
        offset: f64,
        #[serde(default)]
        velocity: Option<f64>,
    },
    /// The toolkit moved the card; the controller samples the driver.
    DragFromDriver {
        offset: f64,
        #[serde(default)]
        velocity: Option<f64>,
    },
    Release,
    /// Advance the card's animation by `count` frames.
    Frames { count: u32 },
    Unmount,
}

/// Outcome of a replay, printed as JSON.
#[derive(Debug, Serialize)]
pub struct Report {
    pub generated_at: String,
    pub remaining: Vec<CardView>,
    /// Whether the domain's root link card is still shown.
    pub default_link_shown: bool,
    pub removed: Vec<String>,
    pub notifications: Vec<String>,
    pub phases: BTreeMap<String, String>,
}

/// How a remaining card renders.
#[derive(Debug, Serialize)]
pub struct CardView {
    pub key: String,
    /// The domain's root link (`_root`), shown as the default card.
    pub default_link: bool,
    pub short_link: String,
    pub url: String,
    pub favicon: String,
    pub clicks: String,
}

#[derive(Debug)]
pub enum ReplayError {
    Parse(serde_json::Error),
    Domain(CoreError),
    UnknownKey(String),
}

impl fmt::Display for ReplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplayError::Parse(e) => write!(f, "invalid script: {}", e),
            ReplayError::Domain(e) => write!(f, "{}", e),
            ReplayError::UnknownKey(k) => write!(f, "step refers to unknown card '{}'", k),
        }
    }
}

impl std::error::Error for ReplayError {}

impl From<CoreError> for ReplayError {
    fn from(e: CoreError) -> Self {
        ReplayError::Domain(e)
    }
}

/// Toast notifications: logged, and kept for the report.
struct ToastNotifier {
    seen: RecordingNotifier,
}

impl NotificationSink for ToastNotifier {
    fn notify(&self, message: &str) {
        info!(%message, "toast");
        self.seen.notify(message);
    }
}

type Card = SwipeToDelete<Rc<ScriptedDriver>, Rc<InMemoryList>, Rc<ToastNotifier>, FixedLayout>;

struct Mounted {
    card: Card,
    driver: Rc<ScriptedDriver>,
}

/// Mount every card, play the steps in order, and summarize the list.
pub fn run(cfg: &Config, script: Script, now: SystemTime) -> Result<Report, ReplayError> {
    for card in &script.cards {
        validate_original_url(&card.url)?;
    }
    let list = Rc::new(InMemoryList::from_cards(script.cards)?);
    let toasts = Rc::new(ToastNotifier {
        seen: RecordingNotifier::new(),
    });
    let swipe = cfg.swipe();
    let layout = CardLayout::centered(cfg.container_width, cfg.card_width);

    let mut mounted: BTreeMap<LinkKey, Mounted> = BTreeMap::new();
    for key in list.keys()? {
        let driver = Rc::new(ScriptedDriver::new());
        let card = SwipeToDelete::mount(
            key.clone(),
            Rc::clone(&driver),
            Rc::clone(&list),
            Rc::clone(&toasts),
            FixedLayout::new(layout),
            &swipe,
        );
        mounted.insert(key, Mounted { card, driver });
    }
    info!(cards = mounted.len(), steps = script.steps.len(), "replay started");

    for (i, step) in script.steps.into_iter().enumerate() {
        let Some(m) = mounted.get_mut(&step.key) else {
            return Err(ReplayError::UnknownKey(step.key.to_string()));
        };
        debug!(step = i, key = %step.key, action = ?step.action, "step");
        match step.action {
            Action::Drag { offset, velocity } => m.card.on_drag_update(offset, velocity),
            Action::DragFromDriver { offset, velocity } => {
                m.driver.set_velocity(velocity);
                m.driver.set_position(offset);
                m.card.on_drag();
            }
            Action::Release => {
                if m.card.on_drag_release(swipe.min_fling_velocity).is_none() {
                    warn!(step = i, key = %step.key, "release without an active drag");
                }
            }
            Action::Frames { count } => m.driver.advance(count),
            Action::Unmount => m.card.unmount(),
        }
    }

    let phases = mounted
        .iter()
        .map(|(k, m)| (k.to_string(), format!("{:?}", m.card.phase())))
        .collect();
    drop(mounted);

    let remaining = list
        .cards()?
        .into_iter()
        .map(|card| CardView {
            default_link: card.key.is_root(),
            short_link: build_short_url(&cfg.shortlink_domain, card.key.as_str(), true),
            favicon: favicon_url(&apex_domain(&card.url)),
            clicks: clicks_label(card.clicks),
            key: card.key.into(),
            url: card.url,
        })
        .collect::<Vec<CardView>>();
    let removed = list.removed()?;
    if removed.iter().any(LinkKey::is_root) {
        info!(domain = %cfg.shortlink_domain, "default link hidden");
    }

    Ok(Report {
        generated_at: system_time_to_rfc3339(now),
        default_link_shown: remaining.iter().any(|card| card.default_link),
        remaining,
        removed: removed.into_iter().map(String::from).collect(),
        notifications: toasts.seen.messages(),
        phases,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config::from_lookup(|_| None).unwrap()
    }

    const CARDS: &str = r#"[
        {"key": "github", "url": "https://github.com/steven-tey/dub", "clicks": 1520},
        {"key": "docs", "url": "https://www.dub.sh/docs"}
    ]"#;

    fn script(steps: &str) -> Script {
        Script::from_json(&format!(r#"{{"cards": {CARDS}, "steps": {steps}}}"#)).unwrap()
    }

    #[test]
    fn fling_removes_card_and_snapback_keeps_it() {
        let s = script(
            r#"[
            {"key": "github", "action": {"type": "drag", "offset": 40, "velocity": 900}},
            {"key": "github", "action": {"type": "release"}},
            {"key": "github", "action": {"type": "frames", "count": 30}},
            {"key": "docs", "action": {"type": "drag", "offset": 90, "velocity": 120}},
            {"key": "docs", "action": {"type": "release"}},
            {"key": "docs", "action": {"type": "frames", "count": 30}}
        ]"#,
        );
        let report = run(&config(), s, SystemTime::UNIX_EPOCH).unwrap();
        assert_eq!(report.generated_at, "1970-01-01T00:00:00Z");
        assert_eq!(report.removed, vec!["github"]);
        assert_eq!(report.notifications, vec!["Link deleted."]);
        assert_eq!(report.phases["github"], "Removed");
        assert_eq!(report.phases["docs"], "Idle");

        assert_eq!(report.remaining.len(), 1);
        let docs = &report.remaining[0];
        assert_eq!(docs.key, "docs");
        assert_eq!(docs.short_link, "dub.sh/docs");
        assert_eq!(docs.clicks, "... clicks");
        assert_eq!(
            docs.favicon,
            "https://www.google.com/s2/favicons?sz=64&domain_url=dub.sh"
        );
    }

    #[test]
    fn drag_out_of_container_deletes_without_release() {
        // 640 container, 448 card: the card clears it at offset 544.
        let s = script(
            r#"[
            {"key": "docs", "action": {"type": "drag_from_driver", "offset": 300, "velocity": 50}},
            {"key": "docs", "action": {"type": "drag", "offset": 544, "velocity": 50}}
        ]"#,
        );
        let report = run(&config(), s, SystemTime::UNIX_EPOCH).unwrap();
        assert_eq!(report.removed, vec!["docs"]);
        assert_eq!(report.remaining[0].clicks, "1.5K clicks");
    }

    #[test]
    fn unmounted_card_is_never_removed() {
        let s = script(
            r#"[
            {"key": "github", "action": {"type": "drag", "offset": 100, "velocity": 900}},
            {"key": "github", "action": {"type": "unmount"}},
            {"key": "github", "action": {"type": "drag", "offset": 600, "velocity": 900}},
            {"key": "github", "action": {"type": "release"}}
        ]"#,
        );
        let report = run(&config(), s, SystemTime::UNIX_EPOCH).unwrap();
        assert!(report.removed.is_empty());
        assert!(report.notifications.is_empty());
        assert_eq!(report.remaining.len(), 2);
    }

    #[test]
    fn swiping_the_root_link_hides_the_default_card() {
        let raw = r#"{
            "cards": [
                {"key": "_root", "url": "https://dub.sh/home"},
                {"key": "github", "url": "https://github.com"}
            ],
            "steps": [
                {"key": "_root", "action": {"type": "drag", "offset": -20, "velocity": -900}},
                {"key": "_root", "action": {"type": "release"}},
                {"key": "_root", "action": {"type": "frames", "count": 30}}
            ]
        }"#;
        let report = run(&config(), Script::from_json(raw).unwrap(), SystemTime::UNIX_EPOCH).unwrap();
        assert!(!report.default_link_shown);
        assert_eq!(report.removed, vec!["_root"]);
        assert_eq!(report.remaining.len(), 1);
        assert!(!report.remaining[0].default_link);

        let idle = r#"{"cards": [{"key": "_root", "url": "https://dub.sh/home"}]}"#;
        let report = run(&config(), Script::from_json(idle).unwrap(), SystemTime::UNIX_EPOCH).unwrap();
        assert!(report.default_link_shown);
        assert_eq!(report.remaining[0].short_link, "dub.sh");
    }

    #[test]
    fn unknown_key_is_an_error() {
        let s = script(r#"[{"key": "nope", "action": {"type": "release"}}]"#);
        let err = run(&config(), s, SystemTime::UNIX_EPOCH).unwrap_err();
        assert!(matches!(err, ReplayError::UnknownKey(k) if k == "nope"));
    }

    #[test]
    fn invalid_urls_and_duplicates_are_rejected() {
        let bad = Script::from_json(r#"{"cards": [{"key": "a", "url": "ftp://x"}]}"#).unwrap();
        assert!(matches!(
            run(&config(), bad, SystemTime::UNIX_EPOCH),
            Err(ReplayError::Domain(CoreError::InvalidUrl(_)))
        ));

        let dup = Script::from_json(
            r#"{"cards": [{"key": "a", "url": "https://a.io"}, {"key": "a", "url": "https://b.io"}]}"#,
        )
        .unwrap();
        assert!(matches!(
            run(&config(), dup, SystemTime::UNIX_EPOCH),
            Err(ReplayError::Domain(CoreError::DataSource(_)))
        ));
    }

    #[test]
    fn malformed_script_is_a_parse_error() {
        assert!(matches!(
            Script::from_json(r#"{"cards": [{"key": "bad key", "url": "https://a.io"}]}"#),
            Err(ReplayError::Parse(_))
        ));
    }
}
