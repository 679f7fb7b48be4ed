//! Controller for the sign-up page.
//!
//! The board owns everything the page renders: the activity list, the
//! select options, the sign-up form, the outcome banner, and the set
//! of removals still in flight. Network work runs as spawned tasks
//! that report back over a channel; the single UI task folds those
//! completions into state with [`ActivityBoard::apply`], so no locking
//! is needed. In-flight requests are never serialized or cancelled;
//! completions race and the last catalog to arrive wins the render.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, error};

use crate::catalog::ActivityCatalog;
use crate::client::ActivityClient;
use crate::error::{BoardError, Result};

/// Static text for the list area when the catalog cannot be loaded.
pub const LOAD_FAILURE_TEXT: &str = "Failed to load activities. Please try again later.";
/// Placeholder rendered instead of the participants sub-list.
pub const NO_PARTICIPANTS_TEXT: &str = "No participants yet";
/// Placeholder entry of the select control.
pub const PLACEHOLDER_OPTION: &str = "-- Select an activity --";

/// Generic banner text when a signup request never produced a status.
pub const SIGNUP_TRANSPORT_TEXT: &str = "Failed to sign up. Please try again.";
/// Generic banner text when a removal request never produced a status.
pub const REMOVAL_TRANSPORT_TEXT: &str = "Network error while removing participant";

const SIGNUP_BANNER_TTL: Duration = Duration::from_secs(5);
const REMOVAL_BANNER_TTL: Duration = Duration::from_secs(4);

/// Completion of a spawned network request.
#[derive(Debug)]
pub enum BoardEvent {
    CatalogLoaded(Result<ActivityCatalog>),
    SignupSettled(Result<String>),
    RemovalSettled {
        activity: String,
        email: String,
        outcome: Result<Option<String>>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerKind {
    Success,
    Error,
}

/// Transient outcome banner. Showing a new message stores a fresh
/// expiry, replacing any pending one, so an older deadline can never
/// hide a newer text. Removal failures carry no expiry and stay up
/// until the next message.
#[derive(Debug, Clone)]
pub struct Banner {
    pub text: String,
    pub kind: BannerKind,
    pub expires_at: Option<Instant>,
}

/// One rendered activity card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityCard {
    pub name: String,
    pub description: String,
    pub schedule: String,
    pub spots_left: u32,
    pub participants: Vec<String>,
}

/// The list area: loading placeholder, static failure text, or cards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListArea {
    Loading,
    Failed,
    Cards(Vec<ActivityCard>),
}

/// The sign-up form. The email is taken verbatim (no local format
/// validation); `selected` indexes the select options, `None` being
/// the placeholder entry.
#[derive(Debug, Clone, Default)]
pub struct SignupForm {
    pub email: String,
    pub selected: Option<usize>,
}

impl SignupForm {
    pub fn reset(&mut self) {
        self.email.clear();
        self.selected = None;
    }
}

pub struct ActivityBoard {
    client: Arc<ActivityClient>,
    tx: UnboundedSender<BoardEvent>,
    pub list: ListArea,
    /// Select options; rebuilt together with the list on a successful
    /// load, untouched on a failed one.
    pub options: Vec<String>,
    pub form: SignupForm,
    pub banner: Option<Banner>,
    pending_removals: HashSet<(String, String)>,
}

impl ActivityBoard {
    pub fn new(client: Arc<ActivityClient>) -> (Self, UnboundedReceiver<BoardEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                client,
                tx,
                list: ListArea::Loading,
                options: Vec::new(),
                form: SignupForm::default(),
                banner: None,
                pending_removals: HashSet::new(),
            },
            rx,
        )
    }

    /// Requests the full catalog; the completion replaces the rendered
    /// list and select options wholesale. Never retries.
    pub fn load_and_render(&self) {
        let client = Arc::clone(&self.client);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let outcome = client.fetch_activities().await;
            let _ = tx.send(BoardEvent::CatalogLoaded(outcome));
        });
    }

    /// Submits the form as-is: an empty selection goes to the server
    /// for rejection, same as the page it replaces.
    pub fn submit_signup(&self) {
        let email = self.form.email.clone();
        let activity = self.selected_activity().unwrap_or_default().to_string();
        debug!(%activity, %email, "signup requested");
        let client = Arc::clone(&self.client);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let outcome = client.sign_up(&activity, &email).await;
            let _ = tx.send(BoardEvent::SignupSettled(outcome));
        });
    }

    /// Issues a removal for a rendered participant row. The row's
    /// control is disabled until the request settles; re-issuing while
    /// pending is a no-op.
    pub fn remove_participant(&mut self, activity: &str, email: &str) {
        let key = (activity.to_string(), email.to_string());
        if !self.pending_removals.insert(key) {
            return;
        }
        debug!(%activity, %email, "removal requested");
        let client = Arc::clone(&self.client);
        let tx = self.tx.clone();
        let activity = activity.to_string();
        let email = email.to_string();
        tokio::spawn(async move {
            let outcome = client.unregister(&activity, &email).await;
            let _ = tx.send(BoardEvent::RemovalSettled {
                activity,
                email,
                outcome,
            });
        });
    }

    pub fn is_removal_pending(&self, activity: &str, email: &str) -> bool {
        self.pending_removals
            .iter()
            .any(|(a, e)| a == activity && e == email)
    }

    pub fn selected_activity(&self) -> Option<&str> {
        self.form
            .selected
            .and_then(|i| self.options.get(i))
            .map(String::as_str)
    }

    /// Folds one completion into the board. Always runs on the UI
    /// task; every failure degrades to a visible message and leaves
    /// the UI interactive.
    pub fn apply(&mut self, event: BoardEvent) {
        match event {
            BoardEvent::CatalogLoaded(Ok(catalog)) => {
                self.list = ListArea::Cards(build_cards(&catalog));
                self.options = catalog.keys().cloned().collect();
                // the select control is rebuilt too, back to the placeholder
                self.form.selected = None;
            }
            BoardEvent::CatalogLoaded(Err(err)) => {
                error!(%err, "failed to load activities");
                self.list = ListArea::Failed;
            }
            BoardEvent::SignupSettled(Ok(message)) => {
                self.show_banner(message, BannerKind::Success, Some(SIGNUP_BANNER_TTL));
                self.form.reset();
                self.load_and_render();
            }
            BoardEvent::SignupSettled(Err(BoardError::Service { detail, .. })) => {
                self.show_banner(detail, BannerKind::Error, Some(SIGNUP_BANNER_TTL));
            }
            BoardEvent::SignupSettled(Err(err)) => {
                error!(%err, "signup request failed");
                self.show_banner(
                    SIGNUP_TRANSPORT_TEXT.to_string(),
                    BannerKind::Error,
                    Some(SIGNUP_BANNER_TTL),
                );
            }
            BoardEvent::RemovalSettled {
                activity,
                email,
                outcome,
            } => {
                // re-enable the control whatever the outcome was
                self.pending_removals
                    .remove(&(activity.clone(), email.clone()));
                match outcome {
                    Ok(message) => {
                        self.load_and_render();
                        let text =
                            message.unwrap_or_else(|| format!("{email} removed from {activity}"));
                        self.show_banner(text, BannerKind::Success, Some(REMOVAL_BANNER_TTL));
                    }
                    Err(BoardError::Service { detail, .. }) => {
                        self.show_banner(detail, BannerKind::Error, None);
                    }
                    Err(err) => {
                        error!(%err, "removal request failed");
                        self.show_banner(REMOVAL_TRANSPORT_TEXT.to_string(), BannerKind::Error, None);
                    }
                }
            }
        }
    }

    pub fn show_banner(&mut self, text: String, kind: BannerKind, ttl: Option<Duration>) {
        self.banner = Some(Banner {
            text,
            kind,
            expires_at: ttl.map(|t| Instant::now() + t),
        });
    }

    /// Hides the banner once its deadline passes. The deadline is a
    /// single replaceable instant, not a timer per message.
    pub fn tick(&mut self, now: Instant) {
        if let Some(banner) = &self.banner {
            if banner.expires_at.is_some_and(|at| at <= now) {
                self.banner = None;
            }
        }
    }
}

fn build_cards(catalog: &ActivityCatalog) -> Vec<ActivityCard> {
    catalog
        .iter()
        .map(|(name, activity)| ActivityCard {
            name: name.clone(),
            description: activity.description.clone(),
            schedule: activity.schedule.clone(),
            spots_left: activity.spots_left(),
            participants: activity.participants.clone(),
        })
        .collect()
}
