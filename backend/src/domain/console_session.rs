//! Per-user console navigation state.
//!
//! The whole state is a single serialisable value kept in the cookie session.
//! Handlers load it, apply one transition, and write it back; nothing else
//! holds UI state between requests.
//!
//! ```text
//! Landing --login--> App { section, selection, consent } --logout--> Landing
//!
//! App (admin), selection sub-state:
//!   filter=F, members unloaded, no focus
//!     --load_members--> members loaded for F
//!     --focus(c in members)--> client c focused
//!     --set_group_filter(G != F)--> filter=G, members unloaded, no focus
//!     --clear_focus--> no focus
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{ClientId, Error, GroupId, Principal, Role, Taxpayer};

/// Console screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    /// Group creation screen (admin).
    CreateGroup,
    /// Client upload screen.
    CreateClient,
    /// Client list (admin).
    Clients,
    /// User administration (admin).
    Users,
}

impl Section {
    /// Sections reachable by `role`.
    pub fn available_to(role: Role) -> &'static [Section] {
        match role {
            Role::Admin => &[
                Section::CreateGroup,
                Section::CreateClient,
                Section::Clients,
                Section::Users,
            ],
            Role::Client => &[Section::CreateClient],
        }
    }

    fn landing_for(role: Role) -> Self {
        match role {
            Role::Admin => Section::CreateGroup,
            Role::Client => Section::CreateClient,
        }
    }
}

/// Which clients the admin client list shows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GroupFilter {
    /// Clients with no group.
    #[default]
    Ungrouped,
    /// Members of one group.
    Group {
        /// Selected group.
        #[schema(value_type = String, format = Uuid)]
        group_id: GroupId,
    },
}

impl GroupFilter {
    /// Group named by the filter, if any.
    pub fn group_id(&self) -> Option<&GroupId> {
        match self {
            Self::Ungrouped => None,
            Self::Group { group_id } => Some(group_id),
        }
    }
}

/// The client confirmed for SAT workflows and the document viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Focus {
    /// Focused client.
    #[schema(value_type = String, format = Uuid)]
    pub client_id: ClientId,
    /// Group the client belonged to when focused.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, format = Uuid)]
    pub group_id: Option<GroupId>,
}

/// Admin selection sub-state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    /// Active client-list filter.
    pub group_filter: GroupFilter,
    /// Filter whose members were last loaded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub members_loaded_for: Option<GroupFilter>,
    /// Confirmed client, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focus: Option<Focus>,
}

impl Selection {
    fn members_loaded(&self) -> bool {
        self.members_loaded_for.as_ref() == Some(&self.group_filter)
    }
}

/// State held while a user is signed in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    /// Signed-in user.
    pub principal: Principal,
    /// Current screen.
    pub section: Section,
    /// Admin selection state.
    #[serde(default)]
    pub selection: Selection,
    /// Whether a client-role user accepted the notice.
    #[serde(default)]
    pub consent_confirmed: bool,
}

/// Console session state machine.
///
/// # Examples
/// ```
/// use satisfacture::domain::{ConsoleSession, GroupFilter, Principal, Role, UserId};
///
/// let principal = Principal {
///     user_id: UserId::random(),
///     username: "admin".into(),
///     role: Role::Admin,
///     group_id: None,
/// };
/// let mut session = ConsoleSession::login(principal);
/// session.load_members().unwrap();
/// session.set_group_filter(GroupFilter::Ungrouped).unwrap();
/// assert!(session.app().unwrap().selection.members_loaded_for.is_some());
/// session.logout();
/// assert_eq!(session, ConsoleSession::Landing);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum ConsoleSession {
    /// Signed out.
    #[default]
    Landing,
    /// Signed in.
    App(AppState),
}

/// Rejected transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionTransitionError {
    /// No user is signed in.
    NotAuthenticated,
    /// Only admins may do this.
    AdminOnly,
    /// Only client-role users may do this.
    ClientOnly,
    /// The role cannot open the section.
    SectionUnavailable {
        /// Requested section.
        section: Section,
    },
    /// Members must be loaded for the active filter first.
    MembersNotLoaded,
    /// The client is not among the loaded members.
    NotAMember {
        /// Requested client.
        client_id: ClientId,
    },
    /// No client has been confirmed.
    NoFocus,
    /// Both acknowledgements are required.
    ConsentIncomplete,
}

impl fmt::Display for SessionTransitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAuthenticated => write!(f, "login required"),
            Self::AdminOnly => write!(f, "admin role required"),
            Self::ClientOnly => write!(f, "client role required"),
            Self::SectionUnavailable { section } => {
                write!(f, "section {section:?} is not available for this role")
            }
            Self::MembersNotLoaded => write!(f, "load the client list before selecting"),
            Self::NotAMember { client_id } => {
                write!(f, "client {client_id} is not in the loaded list")
            }
            Self::NoFocus => write!(f, "select a client first"),
            Self::ConsentIncomplete => write!(f, "both acknowledgements are required"),
        }
    }
}

impl std::error::Error for SessionTransitionError {}

impl From<SessionTransitionError> for Error {
    fn from(err: SessionTransitionError) -> Self {
        let message = err.to_string();
        match err {
            SessionTransitionError::NotAuthenticated => Error::unauthorized(message),
            SessionTransitionError::AdminOnly
            | SessionTransitionError::ClientOnly
            | SessionTransitionError::SectionUnavailable { .. } => Error::forbidden(message),
            SessionTransitionError::MembersNotLoaded
            | SessionTransitionError::NotAMember { .. }
            | SessionTransitionError::NoFocus
            | SessionTransitionError::ConsentIncomplete => Error::invalid_request(message),
        }
    }
}

type Transition<T = ()> = Result<T, SessionTransitionError>;

impl ConsoleSession {
    /// Enter the app for a freshly authenticated principal.
    pub fn login(principal: Principal) -> Self {
        let section = Section::landing_for(principal.role);
        Self::App(AppState {
            principal,
            section,
            selection: Selection::default(),
            consent_confirmed: false,
        })
    }

    /// Drop every piece of state.
    pub fn logout(&mut self) {
        *self = Self::Landing;
    }

    /// Signed-in state.
    pub fn app(&self) -> Transition<&AppState> {
        match self {
            Self::App(state) => Ok(state),
            Self::Landing => Err(SessionTransitionError::NotAuthenticated),
        }
    }

    /// Signed-in principal of any role.
    pub fn principal(&self) -> Transition<&Principal> {
        self.app().map(|state| &state.principal)
    }

    /// Principal of a signed-in admin.
    pub fn require_admin(&self) -> Transition<&Principal> {
        let principal = self.principal()?;
        if principal.role == Role::Admin {
            Ok(principal)
        } else {
            Err(SessionTransitionError::AdminOnly)
        }
    }

    /// Principal of a signed-in client-role user.
    pub fn require_client(&self) -> Transition<&Principal> {
        let principal = self.principal()?;
        if principal.role == Role::Client {
            Ok(principal)
        } else {
            Err(SessionTransitionError::ClientOnly)
        }
    }

    fn app_mut(&mut self) -> Transition<&mut AppState> {
        match self {
            Self::App(state) => Ok(state),
            Self::Landing => Err(SessionTransitionError::NotAuthenticated),
        }
    }

    fn admin_mut(&mut self) -> Transition<&mut AppState> {
        let state = self.app_mut()?;
        if state.principal.role == Role::Admin {
            Ok(state)
        } else {
            Err(SessionTransitionError::AdminOnly)
        }
    }

    /// Switch screens when the role allows it.
    pub fn select_section(&mut self, section: Section) -> Transition {
        let state = self.app_mut()?;
        if !Section::available_to(state.principal.role).contains(&section) {
            return Err(SessionTransitionError::SectionUnavailable { section });
        }
        state.section = section;
        Ok(())
    }

    /// Change the group filter. A different filter invalidates the loaded
    /// member list and any focused client.
    pub fn set_group_filter(&mut self, filter: GroupFilter) -> Transition {
        let state = self.admin_mut()?;
        if state.selection.group_filter != filter {
            state.selection = Selection {
                group_filter: filter,
                members_loaded_for: None,
                focus: None,
            };
        }
        Ok(())
    }

    /// Record that the member list for the current filter has been shown and
    /// return that filter.
    pub fn load_members(&mut self) -> Transition<GroupFilter> {
        let state = self.admin_mut()?;
        let filter = state.selection.group_filter.clone();
        state.selection.members_loaded_for = Some(filter.clone());
        Ok(filter)
    }

    /// Focus `client_id`, which must appear in `members`, the freshly
    /// re-read member list for the current filter.
    pub fn focus_client(&mut self, client_id: &ClientId, members: &[Taxpayer]) -> Transition<&Focus> {
        let state = self.admin_mut()?;
        if !state.selection.members_loaded() {
            return Err(SessionTransitionError::MembersNotLoaded);
        }
        if !members.iter().any(|member| &member.id == client_id) {
            return Err(SessionTransitionError::NotAMember {
                client_id: client_id.clone(),
            });
        }
        let group_id = state.selection.group_filter.group_id().cloned();
        Ok(state.selection.focus.insert(Focus {
            client_id: client_id.clone(),
            group_id,
        }))
    }

    /// Forget the focused client.
    pub fn clear_focus(&mut self) -> Transition {
        self.admin_mut()?.selection.focus = None;
        Ok(())
    }

    /// Focused client of a signed-in admin.
    pub fn focus(&self) -> Transition<&Focus> {
        let state = self.app()?;
        if state.principal.role != Role::Admin {
            return Err(SessionTransitionError::AdminOnly);
        }
        state
            .selection
            .focus
            .as_ref()
            .ok_or(SessionTransitionError::NoFocus)
    }

    /// Accept the confidentiality notice; both acknowledgements must be set.
    pub fn accept_consent(&mut self, notice_read: bool, usage_understood: bool) -> Transition {
        let state = self.app_mut()?;
        if state.principal.role != Role::Client {
            return Err(SessionTransitionError::ClientOnly);
        }
        if !(notice_read && usage_understood) {
            return Err(SessionTransitionError::ConsentIncomplete);
        }
        state.consent_confirmed = true;
        Ok(())
    }

    /// Whether the notice has been accepted in this session.
    pub fn consent_confirmed(&self) -> bool {
        matches!(self, Self::App(state) if state.consent_confirmed)
    }
}

#[cfg(test)]
#[path = "console_session_tests.rs"]
mod tests;
